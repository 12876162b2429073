// Harvest pipeline: per-target processing, report rendering, and the run driver

pub mod orchestrator;
pub mod processing;
pub mod report;

pub use orchestrator::{fetch_all, Harvester, Pipeline, RunOutcome, RunSummary};
pub use report::{render, Artifact, Report, ReportRow};
