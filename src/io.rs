//! File input/output.

pub mod field;
pub mod tractogram;
pub mod utils;

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// How to handle existing files when writing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteMode {
    Ask,
    Always,
    Never,
}

/// Which non-critical status messages to print.
#[derive(Clone)]
pub enum Verbosity {
    Quiet,
    Messages,
    Progress(ProgressStyle),
}

impl fmt::Debug for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quiet => "Quiet",
            Self::Messages => "Messages",
            Self::Progress(_) => "Progress",
        })
    }
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Whether a progress bar should be shown.
    pub fn show_progress(&self) -> bool {
        matches!(self, Self::Progress(_))
    }

    /// Creates a progress bar for the given number of steps, which is hidden
    /// unless progress should be shown.
    pub fn create_progress_bar(&self, len: usize) -> ProgressBar {
        match self {
            Self::Progress(style) => ProgressBar::new(len as u64).with_style(style.clone()),
            _ => ProgressBar::hidden(),
        }
    }
}
