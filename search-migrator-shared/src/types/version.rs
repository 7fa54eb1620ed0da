//! Semantic version type for schema versions.
//!
//! Versions are dotted numeric tuples with an optional `-qualifier`, e.g. `1.2`,
//! `1.2.3` or `2.0.0-rc1`. Artifact filenames use `_` as the separator
//! (`1_2_3`), which is normalized to `.` before parsing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filename prefix that marks the baseline (version zero) artifact.
pub const BASELINE_PREFIX: &str = "baseline";

/// Errors produced when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty or whitespace only.
    #[error("Version string is empty")]
    Empty,

    /// One of the dotted components is not a non-negative integer.
    #[error("Invalid version component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },

    /// The `-qualifier` suffix is empty or contains unsupported characters.
    #[error("Invalid version qualifier in '{0}'")]
    InvalidQualifier(String),
}

/// A comparable schema version.
///
/// Comparison is component-wise and numeric. Missing trailing components count
/// as zero, so `1.0` and `1.0.0` are equal and hash identically. A version with
/// a qualifier sorts before the same version without one (`1.0.0-rc1 < 1.0.0`);
/// two qualifiers compare lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    components: Vec<u64>,
    qualifier: Option<String>,
}

impl SemanticVersion {
    /// The baseline sentinel used when no version has ever been deployed.
    pub fn zero() -> Self {
        Self {
            components: vec![0],
            qualifier: None,
        }
    }

    /// Parse a dotted or underscored version string.
    ///
    /// A single leading `v` is accepted (`v1.2` parses as `1.2`).
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let normalized = trimmed.replace('_', ".");
        let unprefixed = normalized
            .strip_prefix('v')
            .or_else(|| normalized.strip_prefix('V'))
            .unwrap_or(&normalized);

        let (numeric, qualifier) = match unprefixed.split_once('-') {
            Some((numeric, qualifier)) => {
                let valid = !qualifier.is_empty()
                    && qualifier
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '.');
                if !valid {
                    return Err(VersionParseError::InvalidQualifier(input.to_string()));
                }
                (numeric, Some(qualifier.to_string()))
            }
            None => (unprefixed, None),
        };

        let components = numeric
            .split('.')
            .map(|component| {
                if component.is_empty() || !component.chars().all(|c| c.is_ascii_digit()) {
                    return Err(VersionParseError::InvalidComponent {
                        input: input.to_string(),
                        component: component.to_string(),
                    });
                }
                component
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidComponent {
                        input: input.to_string(),
                        component: component.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            components,
            qualifier,
        })
    }

    /// Derive the version of a schema artifact from its file stem.
    ///
    /// Stems starting with `baseline` always map to [`SemanticVersion::zero`];
    /// anything else is parsed with `_` treated as the component separator.
    pub fn from_artifact_stem(stem: &str) -> Result<Self, VersionParseError> {
        if stem.starts_with(BASELINE_PREFIX) {
            return Ok(Self::zero());
        }
        Self::parse(stem)
    }

    /// Numeric components as parsed.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Optional pre-release qualifier.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Whether this is the baseline sentinel (all components zero, no qualifier).
    pub fn is_zero(&self) -> bool {
        self.qualifier.is_none() && self.significant_components().is_empty()
    }

    /// Strict `self > other` under the total order.
    pub fn is_greater_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }

    /// Components with trailing zeros removed, used for hashing.
    fn significant_components(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..end]
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let left = self.components.get(i).copied().unwrap_or(0);
            let right = other.components.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(left), Some(right)) => left.cmp(right),
        }
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_components().hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeric = self
            .components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}-{}", numeric, qualifier),
            None => write!(f, "{}", numeric),
        }
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}
