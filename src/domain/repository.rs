use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TaggerError};

/// `owner/name` identity of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Directory name of the local checkout of `branch`, e.g. `acme--app--master`.
    ///
    /// The same identity and branch always map to the same directory, so reruns
    /// land on the previous checkout.
    pub fn checkout_dir_name(&self, branch: &str) -> String {
        format!("{}--{}--{}", self.owner, self.name, branch)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepositoryId::new(owner, name))
            }
            _ => Err(TaggerError::config(format!(
                "Invalid repository '{}': expected owner/name",
                s
            ))),
        }
    }
}
