use std::{fmt, fs};

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Serialize;

use crate::{
    context::{RunContext, TestOutcome},
    scenario::RunError,
    tracker::ResourceRecord,
};

const RULE: &str = "==================================================";

/// Final tally of a run: what the CLI prints and what `--report` writes to disk.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<TestOutcome>,
    pub attempted: u64,
    pub passed: u64,
    pub success_rate: f64,
    pub aborted: Option<String>,
    pub orphans: Vec<ResourceRecord>,
    pub exit_code: u8,
}

impl RunSummary {
    pub fn completed(ctx: &RunContext, orphans: Vec<ResourceRecord>) -> Self {
        let counters = ctx.counters;
        Self {
            outcomes: ctx.outcomes().to_vec(),
            attempted: counters.attempted(),
            passed: counters.passed(),
            success_rate: counters.success_rate(),
            aborted: None,
            orphans,
            exit_code: if counters.all_passed() { 0 } else { 1 },
        }
    }

    pub fn aborted(ctx: &RunContext, err: &RunError) -> Self {
        let counters = ctx.counters;
        Self {
            outcomes: ctx.outcomes().to_vec(),
            attempted: counters.attempted(),
            passed: counters.passed(),
            success_rate: counters.success_rate(),
            aborted: Some(err.to_string()),
            orphans: Vec::new(),
            exit_code: 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn write_json(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create report dir {parent}"))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write run report {path}"))?;
        Ok(())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.aborted {
            return writeln!(f, "{reason}");
        }

        writeln!(f, "{RULE}")?;
        writeln!(f, "TEST RESULTS SUMMARY")?;
        writeln!(f, "{RULE}")?;
        for outcome in &self.outcomes {
            let status = if outcome.passed { "PASSED" } else { "FAILED" };
            writeln!(f, "{}: {status}", outcome.name)?;
        }
        writeln!(f)?;
        writeln!(f, "Overall: {}/{} tests passed", self.passed, self.attempted)?;
        writeln!(f, "Success Rate: {:.1}%", self.success_rate)?;

        if !self.orphans.is_empty() {
            writeln!(f)?;
            writeln!(f, "Resources left behind after cleanup:")?;
            for orphan in &self.orphans {
                writeln!(f, "- {} {}", orphan.kind, orphan.id)?;
            }
        }
        Ok(())
    }
}
