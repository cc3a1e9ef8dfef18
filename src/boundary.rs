use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met during a release run.
/// They are reported to the operator and the run carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A branch the cleanup step tried to delete was not on the remote
    BranchAbsent { repository: String, branch: String },
    /// The changelog had no open section for the maintenance line
    EmptyChangelog { file: String, heading: String },
    /// The version file held neither known placeholder, so the embedded version is unchanged
    VersionPlaceholderMissing { file: PathBuf, constant: String },
    /// The tag is not a four-segment release; the app stays pinned to it
    NonStableTag { tag: String },
    /// A configured sync path does not exist in the source checkout
    SyncPathMissing { path: PathBuf },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::BranchAbsent { repository, branch } => {
                write!(f, "Branch '{}' didn't exist in {}", branch, repository)
            }
            BoundaryWarning::EmptyChangelog { file, heading } => {
                write!(
                    f,
                    "No '{}' section found in {}; the release notes will be empty",
                    heading, file
                )
            }
            BoundaryWarning::VersionPlaceholderMissing { file, constant } => {
                write!(
                    f,
                    "No placeholder value for {} found in {}; the embedded version was not updated",
                    constant,
                    file.display()
                )
            }
            BoundaryWarning::NonStableTag { tag } => {
                write!(
                    f,
                    "Tag '{}' is not a stable release; the app dependency will stay pinned to it",
                    tag
                )
            }
            BoundaryWarning::SyncPathMissing { path } => {
                write!(
                    f,
                    "Configured sync path {} does not exist in the source checkout",
                    path.display()
                )
            }
        }
    }
}
