use std::cmp::Ordering;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::dataset::{College, Dataset};
use crate::domain::{Config, CrankError, HELP_TEXT, Message, SortColumn};
use crate::ui::{SCROLLBAR_WIDTH, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    POPUP,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationState {
    pub current_page: usize,
    pub has_more: bool,
    pub fully_loaded: bool,
}

impl PaginationState {
    fn reset() -> Self {
        PaginationState {
            current_page: 0,
            has_more: true,
            fully_loaded: false,
        }
    }
}

// The armed load timer for the next page. Only one exists at a time.
#[derive(Debug)]
struct PendingLoad {
    deadline: Instant,
}

pub struct UIData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<[String; 5]>,
    pub nrows: usize,      // Rows materialized into the visible window
    pub total_rows: usize, // Rows in the whole dataset
    pub selected_row: usize,
    pub abs_selected_row: usize,
    pub loading: bool,
    pub fully_loaded: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            total_rows: 0,
            selected_row: 0,
            abs_selected_row: 0,
            loading: false,
            fully_loaded: false,
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let table_width = ui_width.saturating_sub(SCROLLBAR_WIDTH);
        let table_height = ui_height.saturating_sub(STATUSLINE_HEIGHT + TABLE_HEADER_HEIGHT);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
            statusline_width: ui_width,
            statusline_height: STATUSLINE_HEIGHT,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: Config,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    colleges: Vec<College>,
    rows: Vec<usize>, // Mapping of sorted row index to dataset index
    visible_rows: usize, // Materialized prefix of rows, grows page by page
    sort: SortSpec,
    pagination: PaginationState,
    pending_load: Option<PendingLoad>,
    cursor_row: usize,
    offset_row: usize,
    uilayout: UILayout,
    uidata: UIData,
    popup_message: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &Config, ui_width: usize, ui_height: usize) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: String::new(),
            colleges: Vec::new(),
            rows: Vec::new(),
            visible_rows: 0,
            sort: SortSpec {
                column: SortColumn::Ranking,
                ascending: true,
            },
            pagination: PaginationState::reset(),
            pending_load: None,
            cursor_row: 0,
            offset_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            popup_message: String::new(),
            status_message: "Started crank!".to_string(),
            last_status_message_update: Instant::now(),
        };
        model.update_uidata();
        model
    }

    /// Replace the dataset. Pagination starts over at the first page
    /// unless a previous session already materialized everything, in
    /// which case the whole sorted view stays visible.
    pub fn set_dataset(&mut self, name: &str, dataset: Dataset) {
        info!("Dataset \"{}\" with {} colleges", name, dataset.len());
        self.name = name.to_string();
        self.colleges = dataset.colleges;
        self.pending_load = None;
        if !self.pagination.fully_loaded {
            self.pagination = PaginationState::reset();
        }
        self.resort();
        self.set_status_message(format!("Loaded {} colleges", self.colleges.len()));
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn quit(&mut self) {
        // Drop any armed load timer so it cannot fire into a dead view
        if self.pending_load.take().is_some() {
            trace!("Dropping pending page load on quit");
        }
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), CrankError> {
        self.poll_pending();

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MovePageDown => self.move_selection_down(self.uilayout.table_height),
                    Message::MovePageUp => self.move_selection_up(self.uilayout.table_height),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::Sort(column) => self.sort_column(column),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Help => self.show_help(),
                    Message::Exit => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.close_popup(),
                    _ => (),
                },
            }
        }

        Ok(())
    }

    // -------------------- Sorting ---------------------- //

    fn compare(a: &College, b: &College, column: SortColumn) -> Ordering {
        match column {
            SortColumn::Ranking => a.ranking.cmp(&b.ranking),
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Course => a.course.cmp(&b.course),
            SortColumn::Fees => a.fees.cmp(&b.fees),
            // total_cmp gives NaN a defined position instead of relying
            // on coercion rules
            SortColumn::UserRating => a.user_rating.total_cmp(&b.user_rating),
        }
    }

    fn sort_column(&mut self, column: SortColumn) {
        let ascending = if self.sort.column == column {
            !self.sort.ascending
        } else {
            true
        };
        self.sort = SortSpec { column, ascending };
        debug!("Sorting by {:?}, ascending {}", column, ascending);
        self.resort();
        self.set_status_message(format!(
            "Sorted by {} ({})",
            column.title(),
            if ascending { "ascending" } else { "descending" }
        ));
    }

    /// Rebuild the sorted view and re-slice the visible window to the
    /// extent implied by the current page. Sorting does not reset
    /// pagination.
    fn resort(&mut self) {
        let spec = self.sort;
        let colleges = &self.colleges;
        let mut rows: Vec<usize> = (0..colleges.len()).collect();
        // Unstable on purpose, equal keys carry no ordering guarantee
        rows.sort_unstable_by(|&a, &b| {
            let ord = Self::compare(&colleges[a], &colleges[b], spec.column);
            if spec.ascending { ord } else { ord.reverse() }
        });
        self.rows = rows;

        self.visible_rows = if self.pagination.fully_loaded {
            self.rows.len()
        } else {
            std::cmp::min(
                (self.pagination.current_page + 1) * self.config.page_size,
                self.rows.len(),
            )
        };

        self.offset_row = Self::rebase_offset(self.offset_row, self.rows.len(), self.colleges.len());
        self.update_table_data();
    }

    // Proportional rescale of the raw scroll offset after the sorted
    // view changed. Best-effort, assumes uniform row height.
    fn rebase_offset(offset: usize, sorted_len: usize, dataset_len: usize) -> usize {
        if dataset_len == 0 {
            return 0;
        }
        offset * sorted_len / dataset_len
    }

    // -------------------- Page loading ---------------------- //

    /// Arm the simulated-latency timer for the next page. At most one
    /// request is in flight; further ones are ignored until it settles.
    fn request_load(&mut self) {
        if !self.pagination.has_more || self.pagination.fully_loaded {
            return;
        }
        if self.pending_load.is_some() {
            trace!("Page load already pending");
            return;
        }
        self.pending_load = Some(PendingLoad {
            deadline: Instant::now() + self.config.load_delay,
        });
        trace!("Requested page {}", self.pagination.current_page + 1);
        self.set_status_message("Loading more colleges ...".to_string());
        self.update_table_data();
    }

    // Observe the load timer. Called on every update, so the event poll
    // timeout bounds how late a fired timer is noticed.
    fn poll_pending(&mut self) {
        if self.status == Status::QUITTING {
            return;
        }
        let fired = self
            .pending_load
            .as_ref()
            .is_some_and(|pending| Instant::now() >= pending.deadline);
        if fired {
            self.pending_load = None;
            self.apply_load();
        }
    }

    /// Append the next page-sized slice of the sorted view. The slice is
    /// taken from the sorted view as it is now, so a re-sort while the
    /// timer was pending still yields a prefix of the new order.
    fn apply_load(&mut self) {
        let next_page = self.pagination.current_page + 1;
        let begin = std::cmp::min(next_page * self.config.page_size, self.rows.len());
        let end = std::cmp::min(begin + self.config.page_size, self.rows.len());
        let appended = end - begin;

        self.pagination.current_page = next_page;
        self.visible_rows = std::cmp::min(
            (next_page + 1) * self.config.page_size,
            self.rows.len(),
        );
        if appended < self.config.page_size {
            self.pagination.has_more = false;
            if self.rows.len() == self.colleges.len() {
                self.pagination.fully_loaded = true;
            }
        }

        info!(
            "Loaded page {} ({} more colleges, {} of {} visible)",
            next_page,
            appended,
            self.visible_rows,
            self.rows.len()
        );
        self.set_status_message(if self.pagination.fully_loaded {
            "No more colleges to load".to_string()
        } else {
            format!("Showing {} of {} colleges", self.visible_rows, self.rows.len())
        });
        self.update_table_data();
    }

    // -------------------- View data ---------------------- //

    fn set_status_message(&mut self, message: String) {
        self.status_message = message;
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
    }

    /// Clamp the scroll state to the visible window and rebuild the
    /// rendered snapshot.
    fn update_table_data(&mut self) {
        let height = self.uilayout.table_height.max(1);
        if self.visible_rows == 0 {
            self.offset_row = 0;
            self.cursor_row = 0;
        } else {
            self.offset_row = std::cmp::min(self.offset_row, self.visible_rows - 1);
            let rend = std::cmp::min(self.offset_row + height, self.visible_rows);
            self.cursor_row = std::cmp::min(self.cursor_row, rend - self.offset_row - 1);
        }

        trace!(
            "Table: Cr {}, Or {}, visible {}, sorted {}, th {}",
            self.cursor_row,
            self.offset_row,
            self.visible_rows,
            self.rows.len(),
            self.uilayout.table_height,
        );
        self.update_uidata();
    }

    fn update_uidata(&mut self) {
        let height = self.uilayout.table_height.max(1);
        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + height, self.visible_rows);

        let rows = self.rows[rbegin..rend]
            .iter()
            .map(|&idx| {
                let college = &self.colleges[idx];
                [
                    format!("#{}", college.ranking),
                    college.name.clone(),
                    college.course.clone(),
                    format!("${}", college.fees),
                    format!("{:.1}", college.user_rating),
                ]
            })
            .collect();

        let headers = SortColumn::ALL
            .iter()
            .map(|column| {
                if *column == self.sort.column {
                    let glyph = if self.sort.ascending { "▲" } else { "▼" };
                    format!("{} {}", column.title(), glyph)
                } else {
                    column.title().to_string()
                }
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            headers,
            rows,
            nrows: self.visible_rows,
            total_rows: self.colleges.len(),
            selected_row: self.cursor_row,
            abs_selected_row: rbegin + self.cursor_row,
            loading: self.pending_load.is_some(),
            fully_loaded: self.pagination.fully_loaded,
            show_popup: matches!(self.modus, Modus::POPUP),
            popup_message: self.popup_message.clone(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        };
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.update_table_data();
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = HELP_TEXT.to_string();
        self.update_uidata();
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.update_uidata();
    }

    fn select_row(&mut self, row: usize) {
        let height = self.uilayout.table_height.max(1);
        if row >= self.offset_row && row < self.offset_row + height {
            self.cursor_row = row - self.offset_row;
        } else if row < self.offset_row {
            self.offset_row = row;
            self.cursor_row = 0;
        } else {
            self.offset_row = row + 1 - height;
            self.cursor_row = height - 1;
        }
        self.update_table_data();
    }

    fn move_selection_up(&mut self, size: usize) {
        if self.visible_rows == 0 {
            return;
        }
        let row = self.offset_row + self.cursor_row;
        self.select_row(row.saturating_sub(size));
    }

    fn move_selection_down(&mut self, size: usize) {
        if self.visible_rows == 0 {
            return;
        }
        let row = self.offset_row + self.cursor_row;
        let target = std::cmp::min(row.saturating_add(size), self.visible_rows - 1);
        self.select_row(target);
        // Reaching the last loaded row is the scroll-to-bottom event
        if target + 1 == self.visible_rows {
            self.request_load();
        }
    }

    fn move_selection_beginning(&mut self) {
        if self.visible_rows == 0 {
            return;
        }
        self.select_row(0);
    }

    fn move_selection_end(&mut self) {
        if self.visible_rows == 0 {
            return;
        }
        self.select_row(self.visible_rows - 1);
        self.request_load();
    }
}
