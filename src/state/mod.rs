// State module - the suite being accumulated from the event stream

pub mod result;

pub use result::{Case, FailureDetail, FailureKind, Outcome};

use crate::time::Elapsed;

/// Aggregate tallies for a suite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub tests: usize,
    pub failures: usize,
    pub errors: usize,
}

impl Counters {
    fn record(&mut self, outcome: Outcome) {
        self.tests += 1;
        match outcome {
            Outcome::Passed => {}
            Outcome::Pending | Outcome::Failed => self.failures += 1,
            Outcome::Errored => self.errors += 1,
        }
    }
}

/// One test suite: an ordered, append-only list of cases plus tallies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suite {
    name: String,
    cases: Vec<Case>,
    counters: Counters,
    time: Option<Elapsed>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a case. Returns `false` and leaves the suite untouched once it is closed.
    pub fn push(&mut self, case: Case) -> bool {
        if self.is_closed() {
            return false;
        }
        self.counters.record(case.outcome);
        self.cases.push(case);
        true
    }

    /// Fix the suite time and stop accepting cases.
    ///
    /// Without an explicit time the suite takes the sum of its case times.
    /// Closing an already closed suite is a no-op.
    pub fn close(&mut self, time: Option<Elapsed>) {
        if self.is_closed() {
            return;
        }
        let time = time.unwrap_or_else(|| self.cases.iter().map(|c| &c.time).sum());
        self.time = Some(time);
    }

    pub fn is_closed(&self) -> bool {
        self.time.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Suite time, available once closed
    pub fn time(&self) -> Option<&Elapsed> {
        self.time.as_ref()
    }
}
