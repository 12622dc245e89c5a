//! Output formatting for command results
//!
//! Results go to stdout in either JSON (machine-readable) or plain text.
//! Logs never pass through here.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::pipeline::{Gate, PlannedStage, RunReport, StageOutcome};
use crate::workspace::WorkspacePaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Human => Ok(self.report_human(report)),
        }
    }

    pub fn format_plan(&self, plan: &[PlannedStage]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&plan),
            OutputFormat::Human => Ok(self.plan_human(plan)),
        }
    }

    pub fn format_paths(&self, paths: &WorkspacePaths) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(paths),
            OutputFormat::Human => Ok(self.paths_human(paths)),
        }
    }

    fn report_human(&self, report: &RunReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Project: {}", report.project_root.display());
        let _ = writeln!(
            out,
            "Started: {}",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        out.push('\n');

        for stage in &report.stages {
            let line = match &stage.outcome {
                StageOutcome::Executed => {
                    format!("  ✓ {:<20} {} ms", stage.name, stage.duration_ms)
                }
                StageOutcome::Skipped { reason } => {
                    format!("  - {:<20} skipped ({})", stage.name, reason)
                }
                StageOutcome::Tolerated { error } => {
                    format!("  ! {:<20} failed, continued ({})", stage.name, error)
                }
            };
            let _ = writeln!(out, "{}", line);
        }

        out.push('\n');
        match &report.artifact {
            Some(path) => {
                let _ = writeln!(out, "Artifact: {}", path.display());
            }
            None => out.push_str("Artifact: none\n"),
        }
        out
    }

    fn plan_human(&self, plan: &[PlannedStage]) -> String {
        let mut out = String::new();
        for stage in plan {
            let _ = match &stage.gate {
                Gate::Run => writeln!(out, "  run   {}", stage.name),
                Gate::Skip(reason) => writeln!(out, "  skip  {} ({})", stage.name, reason),
            };
        }
        out
    }

    fn paths_human(&self, paths: &WorkspacePaths) -> String {
        let rows = [
            ("Project root", &paths.project_root),
            ("Work root", &paths.work_root),
            ("Toolchain", &paths.toolchain_root),
            ("Source tree", &paths.source_tree_root),
            ("Artifacts", &paths.artifacts_dir),
        ];

        let mut out = String::new();
        for (label, path) in rows {
            let _ = writeln!(out, "{:<14} {}", format!("{}:", label), path.display());
        }
        out
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}
