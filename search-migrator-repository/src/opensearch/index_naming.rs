//! Physical index naming.
//!
//! Each schema version gets its own physical index named `<alias>_<version>`.
//! The alias is the stable name clients query.

use search_migrator_shared::SemanticVersion;

/// Get the physical index name for a version behind an alias.
///
/// # Example
///
/// ```
/// use search_migrator_repository::versioned_index_name;
/// use search_migrator_shared::SemanticVersion;
///
/// let version = SemanticVersion::parse("1_2").unwrap();
/// assert_eq!(versioned_index_name("people", &version), "people_1.2");
/// ```
pub fn versioned_index_name(alias: &str, version: &SemanticVersion) -> String {
    format!("{}_{}", alias, version)
}

/// Recover the version from a physical index name.
///
/// Only names exactly as [`versioned_index_name`] builds them are accepted, so
/// the returned version always maps back to the same index. Returns `None` for
/// indices that do not belong to `alias` or whose suffix is not a canonical
/// version (`people_v1.1`, `people_1_1`).
pub fn version_from_index_name(alias: &str, index_name: &str) -> Option<SemanticVersion> {
    let suffix = index_name.strip_prefix(alias)?.strip_prefix('_')?;
    let version = SemanticVersion::parse(suffix).ok()?;
    (version.to_string() == suffix).then_some(version)
}
