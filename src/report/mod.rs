// Report module - formatters that listen to the runner's event stream

pub mod junit;

use crate::event::ReporterEvent;
use thiserror::Error;

pub use junit::{JunitFormatter, JunitOptions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// `output()` called before the suite received its `finish` event
    #[error("report requested before the suite finished")]
    SuiteNotFinished,
}

/// Formatter trait
pub trait Formatter {
    /// Called for every event in stream order
    fn update(&mut self, event: &ReporterEvent);

    /// The finished report
    fn output(&self) -> Result<String, ReportError>;
}
