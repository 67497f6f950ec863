//! End-to-end smoke harness for the study planner REST API.
//!
//! A run authenticates, walks the CRUD, analytics and schedule scenarios in a fixed
//! order, deletes everything it created and summarises pass/fail counts.

pub mod cleanup;
pub mod config;
pub mod context;
pub mod executor;
pub mod payloads;
pub mod report;
pub mod scenario;
pub mod session;
pub mod suite;
pub mod tracker;
pub mod transport;

#[cfg(test)]
mod testing;

use tracing::info;

use crate::{
    config::HarnessConfig,
    context::RunContext,
    executor::RequestExecutor,
    report::RunSummary,
    scenario::ScenarioRunner,
    transport::{Transport, UreqTransport},
};

/// Run the scenarios, then cleanup, unless a gate scenario failed.
pub fn run<T: Transport>(
    exec: &RequestExecutor<T>,
    runner: &ScenarioRunner<T>,
    password: &str,
) -> RunSummary {
    let mut ctx = RunContext::new(password);
    if let Err(err) = runner.run(exec, &mut ctx) {
        return RunSummary::aborted(&ctx, &err);
    }
    let orphans = cleanup::drain(exec, &mut ctx);
    RunSummary::completed(&ctx, orphans)
}

pub fn run_with_config(config: &HarnessConfig) -> RunSummary {
    info!(base_url = %config.base_url, "starting study planner API tests");
    let exec = RequestExecutor::new(
        config.base_url.as_str(),
        UreqTransport::new(config.timeout()),
    );
    run(&exec, &ScenarioRunner::study_planner(), &config.password)
}
