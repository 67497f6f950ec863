use serde::Serialize;

use crate::{session::SessionState, tracker::ResourceTracker};

/// Attempted/passed call counts. Only ever grow, and `passed <= attempted` holds by
/// construction since both move together in [`Counters::record`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counters {
    attempted: u64,
    passed: u64,
}

impl Counters {
    pub fn record(&mut self, passed: bool) {
        self.attempted += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.attempted
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.passed as f64 / self.attempted as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
}

/// Mutable state for one harness run, threaded through every scenario.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub session: SessionState,
    pub counters: Counters,
    pub tracker: ResourceTracker,
    pub password: String,
    outcomes: Vec<TestOutcome>,
}

impl RunContext {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            session: SessionState::new(),
            counters: Counters::default(),
            tracker: ResourceTracker::new(),
            password: password.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn record_outcome(&mut self, name: impl Into<String>, passed: bool) {
        self.outcomes.push(TestOutcome {
            name: name.into(),
            passed,
        });
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }
}
