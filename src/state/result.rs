// Test case structures

use crate::event::StatusSymbol;
use crate::time::Elapsed;

/// Classification of one example
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Pending,
    Failed,
    Errored,
}

impl Outcome {
    /// Map a runner status symbol onto an outcome.
    ///
    /// Unrecognised symbols count as passed; callers decide whether to flag them.
    pub fn classify(symbol: &StatusSymbol) -> Self {
        match symbol {
            StatusSymbol::Pass => Self::Passed,
            StatusSymbol::Pending => Self::Pending,
            StatusSymbol::Failure => Self::Failed,
            StatusSymbol::Error => Self::Errored,
            StatusSymbol::Unknown(_) => Self::Passed,
        }
    }

    /// Label written after the example name in a failure body
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Passed => None,
            Self::Pending => Some("PENDING"),
            Self::Failed => Some("FAILED"),
            Self::Errored => Some("ERROR"),
        }
    }

    pub fn detail_kind(self) -> Option<FailureKind> {
        match self {
            Self::Passed => None,
            Self::Pending | Self::Failed => Some(FailureKind::Failure),
            Self::Errored => Some(FailureKind::Error),
        }
    }

    /// Pending examples don't carry their trace into the report
    pub fn includes_trace(self) -> bool {
        matches!(self, Self::Failed | Self::Errored)
    }
}

/// Which child node a non-passing case gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Failure,
    Error,
}

impl FailureKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub type_name: String,
    pub body: String,
}

impl FailureDetail {
    /// Build the detail for a non-passing outcome.
    ///
    /// Body layout: a blank first line, `"{name} ({LABEL})"`, the message, and
    /// for failures and errors the trace. Every line ends with `\n`.
    pub fn new(
        outcome: Outcome,
        name: &str,
        message: &str,
        trace: Option<&str>,
        type_name: impl Into<String>,
    ) -> Option<Self> {
        let kind = outcome.detail_kind()?;
        let label = outcome.label()?;

        let mut body = format!("\n{} ({})\n{}\n", name, label, message);
        if outcome.includes_trace() {
            body.push_str(trace.unwrap_or_default());
            body.push('\n');
        }

        Some(Self {
            kind,
            type_name: type_name.into(),
            body,
        })
    }
}

/// One example's entry in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub class: String,
    pub name: String,
    pub time: Elapsed,
    pub outcome: Outcome,
    pub detail: Option<FailureDetail>,
}
