pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod report;
pub mod state;
pub mod time;

pub use event::{Cause, EventReader, ExampleStatus, ReporterEvent, StatusSymbol};
pub use report::{Formatter, JunitFormatter, JunitOptions, ReportError};
pub use time::Elapsed;
