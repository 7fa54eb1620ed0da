//! Deployment decisions produced by the planner.

use std::fmt;

use crate::types::version::SemanticVersion;

/// Why the planner decided not to deploy anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoActionReason {
    /// The catalog holds no versions at all.
    EmptyCatalog,
    /// An alias is live and no newer undeployed version exists.
    UpToDate { current: SemanticVersion },
    /// The requested version already exists as a physical index.
    AlreadyCreated { version: SemanticVersion },
    /// No alias exists and nothing in the catalog is newer than the baseline.
    BaselineIsLatest,
}

impl fmt::Display for NoActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "the schema catalog is empty"),
            Self::UpToDate { current } => write!(
                f,
                "current version {} has no newer undeployed version",
                current
            ),
            Self::AlreadyCreated { version } => {
                write!(f, "version {} already exists as an index", version)
            }
            Self::BaselineIsLatest => {
                write!(f, "no version in the catalog is newer than the baseline")
            }
        }
    }
}

/// The single next step chosen by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentDecision {
    /// Deploy this version next.
    Deploy(SemanticVersion),
    /// Nothing to deploy.
    NoAction(NoActionReason),
}

impl DeploymentDecision {
    /// The version to deploy, if any.
    pub fn target(&self) -> Option<&SemanticVersion> {
        match self {
            Self::Deploy(version) => Some(version),
            Self::NoAction(_) => None,
        }
    }
}
