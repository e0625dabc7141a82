use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
};

use crate::domain::Config;
use crate::model::UIData;

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
// Status messages disappear from the statusline after this long
pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TableUI;

impl TableUI {
    pub fn new(_config: &Config) -> Self {
        Self
    }

    pub fn draw(&self, data: &UIData, frame: &mut Frame) {
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.draw_table(data, frame, table_area);
        self.draw_statusline(data, frame, status_area);
        if data.show_popup {
            self.draw_popup(data, frame);
        }
    }

    fn draw_table(&self, data: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(data.headers.iter().map(|h| Cell::from(h.as_str())))
            .style(Style::new().add_modifier(Modifier::BOLD));
        let rows = data
            .rows
            .iter()
            .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.as_str()))));
        let widths = [
            Constraint::Length(10),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(13),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !data.rows.is_empty() {
            state.select(Some(data.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut state);

        // Scrollbar tracks the position within the loaded window
        if data.nrows > 0 {
            let mut scrollbar_state =
                ScrollbarState::new(data.nrows).position(data.abs_selected_row);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }
    }

    fn draw_statusline(&self, data: &UIData, frame: &mut Frame, area: Rect) {
        let message = if data.last_status_message_update.elapsed() < STATUS_MESSAGE_TIMEOUT {
            data.status_message.as_str()
        } else {
            ""
        };
        let left = Line::from(vec![
            format!(" {} ", data.name).bold().reversed(),
            " ".into(),
            message.into(),
        ]);
        frame.render_widget(Paragraph::new(left), area);

        let right = if data.loading {
            Line::from("Loading more colleges ...".yellow())
        } else if data.fully_loaded {
            Line::from("No more colleges to load".dim())
        } else {
            Line::from(format!("{} of {} colleges", data.nrows, data.total_rows))
        };
        frame.render_widget(right.right_aligned(), area);
    }

    fn draw_popup(&self, data: &UIData, frame: &mut Frame) {
        let area = popup_area(frame.area(), 50, 70);
        let block = Block::bordered().title(Line::from(" Help ".bold()).centered());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(data.popup_message.as_str()).block(block),
            area,
        );
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}
