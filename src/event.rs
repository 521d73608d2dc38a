// Event stream contract - notifications emitted by a test runner

use crate::time::Elapsed;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::BufRead;

/// Status symbol reported for one executed example
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSymbol {
    /// `.`
    Pass,
    /// `*`
    Pending,
    /// `F`
    Failure,
    /// `E`
    Error,
    /// Anything the runner sent that we don't recognise
    Unknown(String),
}

impl StatusSymbol {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => ".",
            Self::Pending => "*",
            Self::Failure => "F",
            Self::Error => "E",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for StatusSymbol {
    fn from(s: &str) -> Self {
        match s {
            "." => Self::Pass,
            "*" => Self::Pending,
            "F" => Self::Failure,
            "E" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for StatusSymbol {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

// A missing or null symbol is kept as an empty unknown symbol
impl Default for StatusSymbol {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl<'de> Deserialize<'de> for StatusSymbol {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(|s| s.map(Self::from).unwrap_or_default())
    }
}

// Runners often send `null` for fields they have nothing to say about.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The exception (or error value) behind a non-passing example
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Cause {
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub type_name: String,
}

impl Cause {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// Outcome of a single example, exactly as the runner reported it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExampleStatus {
    #[serde(default)]
    pub symbol: StatusSymbol,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub trace: Option<String>,
    #[serde(default)]
    pub cause: Option<Cause>,
    #[serde(default)]
    pub time: Option<Elapsed>,
}

impl ExampleStatus {
    pub fn new(symbol: impl Into<StatusSymbol>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            message: String::new(),
            trace: None,
            cause: None,
            time: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_time(mut self, time: Elapsed) -> Self {
        self.time = Some(time);
        self
    }
}

/// One notification from the runner.
///
/// Wire form is a JSON object tagged by `kind`:
/// `{"kind": "status", "symbol": "F", "name": "example1", "time": "0.01"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReporterEvent {
    Start {
        #[serde(default, deserialize_with = "null_as_empty")]
        name: String,
        /// Wall-clock start as sent by the runner; accepted and ignored
        #[serde(default)]
        time: Option<Elapsed>,
    },
    Status(ExampleStatus),
    Finish {
        /// Echo of the suite name; accepted and ignored
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        time: Option<Elapsed>,
    },
}

impl ReporterEvent {
    pub fn start(name: impl Into<String>) -> Self {
        Self::Start {
            name: name.into(),
            time: None,
        }
    }

    pub fn status(status: ExampleStatus) -> Self {
        Self::Status(status)
    }

    pub fn finish() -> Self {
        Self::Finish {
            name: None,
            time: None,
        }
    }

    pub fn finish_with_time(time: Elapsed) -> Self {
        Self::Finish {
            name: None,
            time: Some(time),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Status(_) => "status",
            Self::Finish { .. } => "finish",
        }
    }
}

/// Reads newline-delimited JSON events
pub struct EventReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<ReporterEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(
                        Err(e).with_context(|| format!("Failed to read event line {}", self.line_no)),
                    );
                }
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid event on line {}", self.line_no)),
            );
        }
    }
}
