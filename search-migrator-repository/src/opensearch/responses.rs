//! Request bodies and response parsing for the OpenSearch registry.
//!
//! Kept free of I/O so the alias and bulk handling can be tested without a
//! running cluster.

use serde_json::{json, Value};
use tracing::debug;

use search_migrator_shared::{Batch, DeployedIndexState, DocumentError, SemanticVersion};

use crate::errors::RegistryError;
use crate::opensearch::index_naming::version_from_index_name;

/// An index currently bound to the alias.
struct AliasMember<'a> {
    index_name: &'a str,
    version: Option<SemanticVersion>,
    is_write_index: bool,
}

/// Build the deployed state for `alias` from a `GET /_alias` response.
///
/// The response maps every index to its aliases:
/// `{"people_1.0": {"aliases": {"people": {"is_write_index": true}}}}`.
/// Indices named `<alias>_<version>` are reported as deployed versions. The
/// active version is the alias member flagged as write index when
/// `prefer_write_alias` is set and such a member exists; otherwise the highest
/// versioned member.
pub fn parse_alias_listing(
    alias: &str,
    prefer_write_alias: bool,
    body: &Value,
) -> Result<DeployedIndexState, RegistryError> {
    let indices = body
        .as_object()
        .ok_or_else(|| RegistryError::parse("alias listing is not a JSON object"))?;

    let mut state = DeployedIndexState::default();
    let mut members = Vec::new();

    for (index_name, entry) in indices {
        let version = version_from_index_name(alias, index_name);
        match &version {
            Some(v) => {
                state.deployed_versions.insert(v.clone());
            }
            None => debug!(index = %index_name, "Ignoring index without a version for alias"),
        }

        if let Some(settings) = entry.get("aliases").and_then(|a| a.get(alias)) {
            members.push(AliasMember {
                index_name,
                version,
                is_write_index: settings
                    .get("is_write_index")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            });
        }
    }

    let has_write_member = members.iter().any(|m| m.is_write_index);
    let mut current: Option<SemanticVersion> = None;
    for member in members
        .iter()
        .filter(|m| !prefer_write_alias || !has_write_member || m.is_write_index)
    {
        let version = member.version.clone().ok_or_else(|| {
            RegistryError::parse(format!(
                "index '{}' behind alias '{}' is not named '{}_<version>'",
                member.index_name, alias, alias
            ))
        })?;
        let is_newer = match &current {
            Some(existing) => version > *existing,
            None => true,
        };
        if is_newer {
            current = Some(version);
        }
    }
    state.current_version = current;

    Ok(state)
}

/// Names of the indices currently bound to an alias, from `GET /_alias/{alias}`.
pub fn alias_members(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|indices| indices.keys().cloned().collect())
        .unwrap_or_default()
}

/// Build the `_aliases` body that repoints `alias` to `target_index`.
///
/// All removals and the add travel in one request, which OpenSearch applies
/// atomically.
pub fn alias_update_actions(
    alias: &str,
    current_members: &[String],
    target_index: &str,
    write_alias: bool,
) -> Value {
    let mut actions: Vec<Value> = current_members
        .iter()
        .filter(|index| index.as_str() != target_index)
        .map(|index| json!({ "remove": { "index": index, "alias": alias } }))
        .collect();

    let mut add = json!({ "index": target_index, "alias": alias });
    if write_alias {
        add["is_write_index"] = json!(true);
    }
    actions.push(json!({ "add": add }));

    json!({ "actions": actions })
}

/// Extract per-document failures from a `_bulk` response.
///
/// Each item is `{"index": {"_id": ..., "status": ..., "error": {...}}}`; only
/// items carrying an `error` are failures.
pub fn parse_bulk_response(
    body: &Value,
    batch: &Batch,
) -> Result<Vec<DocumentError>, RegistryError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| RegistryError::parse("bulk response has no items array"))?;

    let mut errors = Vec::new();
    for item in items {
        let Some(result) = item.as_object().and_then(|o| o.values().next()) else {
            continue;
        };
        let Some(error) = result.get("error") else {
            continue;
        };

        let document_id = result
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let error_type = error
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let reason = match error.get("reason").and_then(Value::as_str) {
            Some(reason) => reason.to_string(),
            None => error.to_string(),
        };

        let source = batch.get(&document_id).cloned();
        errors.push(DocumentError::new(document_id, error_type, reason).with_source(source));
    }

    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_alias_listing_without_alias() {
        let body = json!({
            "people_1.0": { "aliases": {} },
            "people_1.1": { "aliases": {} },
            "places_3.0": { "aliases": { "places": {} } },
            ".kibana_1": { "aliases": { ".kibana": {} } }
        });

        let state = parse_alias_listing("people", false, &body).unwrap();
        assert_eq!(state.current_version, None);
        assert_eq!(
            state.deployed_versions.into_iter().collect::<Vec<_>>(),
            vec![v("1.0"), v("1.1")]
        );
    }

    #[test]
    fn test_alias_listing_with_current() {
        let body = json!({
            "people_1.0": { "aliases": { "people": {} } },
            "people_1.1": { "aliases": {} }
        });

        let state = parse_alias_listing("people", false, &body).unwrap();
        assert_eq!(state.current_version, Some(v("1.0")));
        assert!(state.is_deployed(&v("1.1")));
    }

    #[test]
    fn test_alias_listing_prefers_write_index() {
        let body = json!({
            "people_1.0": { "aliases": { "people": { "is_write_index": true } } },
            "people_1.1": { "aliases": { "people": { "is_write_index": false } } }
        });

        let write = parse_alias_listing("people", true, &body).unwrap();
        assert_eq!(write.current_version, Some(v("1.0")));

        let any = parse_alias_listing("people", false, &body).unwrap();
        assert_eq!(any.current_version, Some(v("1.1")));
    }

    #[test]
    fn test_alias_listing_prefer_write_falls_back_without_flag() {
        let body = json!({
            "people_2.0": { "aliases": { "people": {} } }
        });

        let state = parse_alias_listing("people", true, &body).unwrap();
        assert_eq!(state.current_version, Some(v("2.0")));
    }

    #[test]
    fn test_alias_on_unversioned_index_is_an_error() {
        let body = json!({
            "people-legacy": { "aliases": { "people": {} } }
        });

        let result = parse_alias_listing("people", false, &body);
        assert!(matches!(result, Err(RegistryError::ParseError(_))));
    }

    #[test]
    fn test_alias_on_non_canonical_index_name_is_an_error() {
        let body = json!({
            "people_v1.1": { "aliases": { "people": {} } },
            "people_1_2": { "aliases": {} }
        });

        let result = parse_alias_listing("people", false, &body);
        assert!(matches!(result, Err(RegistryError::ParseError(_))));

        let body = json!({
            "people_1.1": { "aliases": { "people": {} } },
            "people_v1.2": { "aliases": {} }
        });
        let state = parse_alias_listing("people", false, &body).unwrap();
        assert_eq!(state.current_version, Some(v("1.1")));
        assert!(!state.is_deployed(&v("1.2")));
    }

    #[test]
    fn test_alias_listing_rejects_non_object() {
        let result = parse_alias_listing("people", false, &json!([]));
        assert!(matches!(result, Err(RegistryError::ParseError(_))));
    }

    #[test]
    fn test_alias_members() {
        let body = json!({
            "people_1.0": { "aliases": { "people": {} } },
            "people_1.1": { "aliases": { "people": {} } }
        });
        let mut members = alias_members(&body);
        members.sort();
        assert_eq!(members, vec!["people_1.0", "people_1.1"]);
        assert!(alias_members(&json!({})).is_empty());
    }

    #[test]
    fn test_alias_update_actions_swap_in_one_request() {
        let body = alias_update_actions(
            "people",
            &["people_1.0".to_string()],
            "people_1.1",
            false,
        );

        assert_eq!(
            body,
            json!({
                "actions": [
                    { "remove": { "index": "people_1.0", "alias": "people" } },
                    { "add": { "index": "people_1.1", "alias": "people" } }
                ]
            })
        );
    }

    #[test]
    fn test_alias_update_actions_first_alias_with_write_flag() {
        let body = alias_update_actions("people", &[], "people_2.0", true);

        assert_eq!(
            body,
            json!({
                "actions": [
                    { "add": { "index": "people_2.0", "alias": "people", "is_write_index": true } }
                ]
            })
        );
    }

    #[test]
    fn test_alias_update_actions_skips_removing_target() {
        let body = alias_update_actions(
            "people",
            &["people_2.0".to_string()],
            "people_2.0",
            false,
        );
        assert_eq!(body["actions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_bulk_response_without_errors() {
        let batch: Batch = vec![("a".to_string(), json!({"n": 1}))].into_iter().collect();
        let body = json!({
            "took": 3,
            "errors": false,
            "items": [ { "index": { "_id": "a", "status": 201 } } ]
        });

        assert!(parse_bulk_response(&body, &batch).unwrap().is_empty());
    }

    #[test]
    fn test_bulk_response_with_failures() {
        let batch: Batch = vec![
            ("a".to_string(), json!({"n": 1})),
            ("b".to_string(), json!({"n": "oops"})),
        ]
        .into_iter()
        .collect();
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                { "index": {
                    "_id": "b",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [n]" }
                } }
            ]
        });

        let errors = parse_bulk_response(&body, &batch).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].document_id, "b");
        assert_eq!(errors[0].error_type, "mapper_parsing_exception");
        assert_eq!(errors[0].reason, "failed to parse field [n]");
        assert_eq!(errors[0].source, Some(json!({"n": "oops"})));
    }

    #[test]
    fn test_bulk_response_without_items() {
        let batch = Batch::new();
        let result = parse_bulk_response(&json!({"errors": false}), &batch);
        assert!(matches!(result, Err(RegistryError::ParseError(_))));
    }
}
