use thiserror::Error;
use tracing::{error, info};

use crate::{context::RunContext, executor::RequestExecutor, suite, transport::Transport};

pub type ScenarioFn<T> = fn(&RequestExecutor<T>, &mut RunContext) -> bool;

/// Gate scenarios must pass for the run to continue; checks only contribute an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Gate,
    Check,
}

pub struct Scenario<T> {
    pub name: &'static str,
    pub stage: Stage,
    pub run: ScenarioFn<T>,
}

impl<T> Scenario<T> {
    pub fn gate(name: &'static str, run: ScenarioFn<T>) -> Self {
        Self {
            name,
            stage: Stage::Gate,
            run,
        }
    }

    pub fn check(name: &'static str, run: ScenarioFn<T>) -> Self {
        Self {
            name,
            stage: Stage::Check,
            run,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("{scenario} failed, stopping tests")]
    GateFailed { scenario: String },
}

/// Ordered scenario pipeline. Runs each scenario once, in order, recording an outcome
/// per scenario in the run context.
pub struct ScenarioRunner<T> {
    scenarios: Vec<Scenario<T>>,
}

impl<T: Transport> ScenarioRunner<T> {
    pub fn new(scenarios: Vec<Scenario<T>>) -> Self {
        Self { scenarios }
    }

    /// Auth gates followed by the CRUD, analytics and schedule checks.
    pub fn study_planner() -> Self {
        Self::new(vec![
            Scenario::gate("User Registration", suite::registration),
            Scenario::gate("User Login", suite::login),
            Scenario::check("Subjects CRUD", suite::subjects_crud),
            Scenario::check("Study Sessions CRUD", suite::study_sessions_crud),
            Scenario::check("Tasks CRUD", suite::tasks_crud),
            Scenario::check("Goals CRUD", suite::goals_crud),
            Scenario::check("Analytics Endpoints", suite::analytics_endpoints),
            Scenario::check("AI Schedule Generation", suite::ai_schedule_generation),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|scenario| scenario.name).collect()
    }

    pub fn run(&self, exec: &RequestExecutor<T>, ctx: &mut RunContext) -> Result<(), RunError> {
        for scenario in &self.scenarios {
            info!(scenario = scenario.name, "running scenario");
            let passed = (scenario.run)(exec, ctx);
            ctx.record_outcome(scenario.name, passed);
            if !passed && scenario.stage == Stage::Gate {
                error!(scenario = scenario.name, "gate scenario failed; aborting run");
                return Err(RunError::GateFailed {
                    scenario: scenario.name.to_owned(),
                });
            }
        }
        Ok(())
    }
}
