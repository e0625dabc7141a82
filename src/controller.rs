use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode};
use tracing::trace;

use crate::domain::{Config, CrankError, Message, SortColumn};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(config: &Config) -> Self {
        Self {
            event_poll_time: config.event_poll_time,
        }
    }

    pub fn handle_event(&self, _model: &Model) -> Result<Option<Message>, CrankError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('1') => Some(Message::Sort(SortColumn::Ranking)),
            KeyCode::Char('2') => Some(Message::Sort(SortColumn::Name)),
            KeyCode::Char('3') => Some(Message::Sort(SortColumn::Course)),
            KeyCode::Char('4') => Some(Message::Sort(SortColumn::Fees)),
            KeyCode::Char('5') => Some(Message::Sort(SortColumn::UserRating)),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    #[test]
    fn keys_map_to_messages() {
        let controller = Controller::new(&Config::default());
        let cases = [
            (KeyCode::Char('q'), Some(Message::Quit)),
            (KeyCode::Char('j'), Some(Message::MoveDown)),
            (KeyCode::Down, Some(Message::MoveDown)),
            (KeyCode::Char('k'), Some(Message::MoveUp)),
            (KeyCode::Char('G'), Some(Message::MoveEnd)),
            (KeyCode::Char('4'), Some(Message::Sort(SortColumn::Fees))),
            (KeyCode::Char('5'), Some(Message::Sort(SortColumn::UserRating))),
            (KeyCode::Char('?'), Some(Message::Help)),
            (KeyCode::Esc, Some(Message::Exit)),
            (KeyCode::Char('x'), None),
        ];
        for (code, expected) in cases {
            assert_eq!(controller.handle_key(KeyEvent::from(code)), expected);
        }
    }
}
