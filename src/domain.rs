use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;

#[derive(Debug)]
pub enum CrankError {
    IoError(Error),
    InvalidDataset(serde_json::Error),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for CrankError {
    fn from(err: Error) -> Self {
        CrankError::IoError(err)
    }
}

impl From<serde_json::Error> for CrankError {
    fn from(err: serde_json::Error) -> Self {
        CrankError::InvalidDataset(err)
    }
}

/// The column a table sort is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Ranking,
    Name,
    Course,
    Fees,
    UserRating,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Ranking,
        SortColumn::Name,
        SortColumn::Course,
        SortColumn::Fees,
        SortColumn::UserRating,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::Ranking => "CD Rank",
            SortColumn::Name => "College",
            SortColumn::Course => "Course",
            SortColumn::Fees => "Fees",
            SortColumn::UserRating => "User Rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Sort(SortColumn),
    Resize(usize, usize),
    Help,
    Exit,
}

#[derive(Debug, Clone, Setters)]
pub struct Config {
    /// Timeout for one terminal event poll in milliseconds. Bounds how
    /// late a fired load timer can be observed.
    pub event_poll_time: u64,
    pub page_size: usize,
    /// Simulated latency for materializing the next page.
    pub load_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: 20,
            load_delay: Duration::from_millis(500),
        }
    }
}

pub const HELP_TEXT: &str = "
crank - college ranking browser

  j / Down       move down
  k / Up         move up
  PageDown/Up    move a screen
  g / G          first / last loaded row
  1 .. 5         sort by the n-th column,
                 again to flip the direction
  ?              this help
  Esc            close popup
  q              quit

Scrolling past the last loaded row fetches
another page of colleges.
";
