//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod plan;
pub mod repository;
pub mod tag;

pub use branch::ReleaseBranches;
pub use plan::{ReleasePlan, ReleaseStage};
pub use repository::RepositoryId;
pub use tag::ReleaseTag;
