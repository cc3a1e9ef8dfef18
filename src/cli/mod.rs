//! Command-line workflow entry points.

pub mod orchestration;

pub use orchestration::{
    run_release_workflow, ReleaseOrchestrator, ReleaseOutcome, ReleaseSummary,
    ReleaseWorkflowArgs,
};
