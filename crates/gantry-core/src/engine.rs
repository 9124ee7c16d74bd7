//! Validation engine
//!
//! One generic, depth-first walker interprets every declarative schema.
//! A single pass collects all violations: a missing field never suppresses
//! the violations of its siblings. On success the engine returns the
//! normalized (kind-coerced) document; there is no partial success.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::document::{Document, json_type_name};
use crate::error::{CoreError, Result, Violation, ViolationReport};
use crate::schema::{Check, Exclusivity, Field, Kind, ObjectCheck, Schema, UnionSchema};

/// Violation codes owned by the engine; field checks carry their own.
pub const CODE_REQUIRED: &str = "required";
pub const CODE_INVALID_TYPE: &str = "invalid_type";

/// Validate a document against a schema.
///
/// Returns the normalized document, or the full violation report. Unknown
/// fields are ignored; absent optional fields stay absent (defaults belong
/// to projection, not validation).
pub fn validate(document: &Document, schema: &Schema) -> Result<Document> {
    let mut normalized = document.clone();
    let mut report = ViolationReport::new();

    walk_object(
        normalized.object_mut(),
        &schema.fields,
        &schema.checks,
        schema.name,
        &mut report,
    );

    if report.is_empty() {
        Ok(normalized)
    } else {
        Err(CoreError::Violations {
            schema: schema.name,
            report,
        })
    }
}

/// Validate, then decode the normalized document into a typed value.
///
/// A decode failure after clean validation means the schema and the target
/// type disagree; that is an internal error, never a field violation.
pub fn validate_into<T: DeserializeOwned>(document: &Document, schema: &Schema) -> Result<T> {
    let normalized = validate(document, schema)?;
    serde_json::from_value(normalized.into_value()).map_err(CoreError::Decode)
}

fn walk_object(
    map: &mut Map<String, JsonValue>,
    fields: &[Field],
    checks: &[ObjectCheck],
    path: &str,
    report: &mut ViolationReport,
) {
    for field in fields {
        let field_path = format!("{path}.{}", field.name);
        match map.get_mut(field.name) {
            None => {
                if field.required {
                    report.push(required_violation(field_path));
                }
            }
            // Explicit null counts as absent for the required gate and is
            // preserved otherwise, so nullable fields carry "clear" intent
            // through to the typed decode.
            Some(JsonValue::Null) => {
                if field.required {
                    report.push(required_violation(field_path));
                }
            }
            Some(value) => check_value(value, &field.kind, &field.checks, &field_path, report),
        }
    }

    for check in checks {
        if !(check.test)(map) {
            report.push(Violation {
                path: path.to_string(),
                code: check.code,
                message: check.message.to_string(),
            });
        }
    }
}

fn check_value(
    value: &mut JsonValue,
    kind: &Kind,
    checks: &[Check],
    path: &str,
    report: &mut ViolationReport,
) {
    match kind {
        Kind::String => {
            if value.is_string() {
                run_checks(value, checks, path, report);
            } else {
                report.push(type_violation(path, "string", value));
            }
        }
        Kind::Integer => {
            if coerce_integer(value) {
                run_checks(value, checks, path, report);
            } else {
                report.push(type_violation(path, "integer", value));
            }
        }
        Kind::Boolean => {
            if coerce_boolean(value) {
                run_checks(value, checks, path, report);
            } else {
                report.push(type_violation(path, "boolean", value));
            }
        }
        Kind::Map => {
            if value.is_object() {
                run_checks(value, checks, path, report);
            } else {
                report.push(type_violation(path, "object", value));
            }
        }
        Kind::Object(schema) => match value.as_object_mut() {
            Some(map) => walk_object(map, &schema.fields, &schema.checks, path, report),
            None => report.push(type_violation(path, "object", value)),
        },
        Kind::List(inner) => match value {
            JsonValue::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    let item_path = format!("{path}[{index}]");
                    check_value(item, inner, checks, &item_path, report);
                }
            }
            _ => report.push(type_violation(path, "array", value)),
        },
        Kind::Union(union) => match value.as_object_mut() {
            Some(map) => check_union(map, union, path, report),
            None => report.push(type_violation(path, "object", value)),
        },
    }
}

fn check_union(
    map: &mut Map<String, JsonValue>,
    union: &UnionSchema,
    path: &str,
    report: &mut ViolationReport,
) {
    let populated = union
        .branches
        .iter()
        .filter(|branch| map.get(branch.name).is_some_and(|v| !v.is_null()))
        .count();

    let satisfied = match union.rule {
        Exclusivity::ExactlyOne => populated == 1,
        Exclusivity::AtMostOne => populated <= 1,
        Exclusivity::AtLeastOne => populated >= 1,
    };

    if !satisfied {
        report.push(Violation {
            path: path.to_string(),
            code: union.rule.code(),
            message: union_message(union),
        });
        // Once the union itself is broken there is no point descending; the
        // report stays scoped to the union, never its branches.
        return;
    }

    for branch in &union.branches {
        if let Some(value) = map.get_mut(branch.name) {
            if value.is_null() {
                continue;
            }
            let branch_path = format!("{path}.{}", branch.name);
            check_value(value, &branch.kind, &branch.checks, &branch_path, report);
        }
    }
}

fn union_message(union: &UnionSchema) -> String {
    let names = union
        .branches
        .iter()
        .map(|branch| format!("'{}'", branch.name))
        .collect::<Vec<_>>()
        .join(", ");

    match union.rule {
        Exclusivity::ExactlyOne => format!("exactly one of {names} must be provided"),
        Exclusivity::AtMostOne => format!("at most one of {names} may be provided"),
        Exclusivity::AtLeastOne => format!("at least one of {names} must be provided"),
    }
}

fn run_checks(value: &JsonValue, checks: &[Check], path: &str, report: &mut ViolationReport) {
    for check in checks {
        if !(check.test)(value) {
            report.push(Violation {
                path: path.to_string(),
                code: check.code,
                message: check.message.to_string(),
            });
        }
    }
}

fn required_violation(path: String) -> Violation {
    Violation {
        path,
        code: CODE_REQUIRED,
        message: "is required".to_string(),
    }
}

fn type_violation(path: &str, expected: &str, found: &JsonValue) -> Violation {
    Violation {
        path: path.to_string(),
        code: CODE_INVALID_TYPE,
        message: format!("must be of type {expected}, found {}", json_type_name(found)),
    }
}

/// Coerce in place to an integer. Strings parse (query/form documents carry
/// everything as strings); floats with fractional parts do not.
fn coerce_integer(value: &mut JsonValue) -> bool {
    match value {
        JsonValue::Number(n) => n.is_i64() || n.is_u64(),
        JsonValue::String(s) => match s.parse::<i64>() {
            Ok(n) => {
                *value = JsonValue::from(n);
                true
            }
            Err(_) => false,
        },
        _ => false,
    }
}

fn coerce_boolean(value: &mut JsonValue) -> bool {
    match value {
        JsonValue::Bool(_) => true,
        JsonValue::String(s) => match s.parse::<bool>() {
            Ok(b) => {
                *value = JsonValue::Bool(b);
                true
            }
            Err(_) => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators;
    use serde::Deserialize;
    use serde_json::json;

    fn doc(value: JsonValue) -> Document {
        Document::from_json_slice(value.to_string().as_bytes()).unwrap()
    }

    fn source_schema() -> Schema {
        Schema::new(
            "CreateModuleRequest",
            vec![
                Field::required("name", Kind::String).check(validators::DNS1123_SUBDOMAIN),
                Field::optional("namespace", Kind::String).check(validators::DNS1123_LABEL),
                Field::required(
                    "source",
                    Kind::Union(UnionSchema::new(
                        Exclusivity::ExactlyOne,
                        vec![
                            Field::optional("raw", Kind::String).check(validators::YAML_DOCUMENT),
                            Field::optional("httpURL", Kind::String).check(validators::HTTP_URL),
                        ],
                    )),
                ),
            ],
        )
    }

    #[test]
    fn test_valid_document_passes() {
        let document = doc(json!({
            "name": "redis",
            "source": {"raw": "kind: Helm"}
        }));

        assert!(validate(&document, &source_schema()).is_ok());
    }

    #[test]
    fn test_all_violations_collected_in_one_pass() {
        let document = doc(json!({
            "namespace": "Bad_Namespace",
            "source": {}
        }));

        let err = validate(&document, &source_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        // Missing name does not suppress the namespace or union violations.
        assert_eq!(report.len(), 3);
        assert!(report.contains("CreateModuleRequest.name", CODE_REQUIRED));
        assert!(report.contains("CreateModuleRequest.namespace", "dns1123_label"));
        assert!(report.contains("CreateModuleRequest.source", "exactly_one"));
    }

    #[test]
    fn test_union_two_branches_is_union_scoped_only() {
        let document = doc(json!({
            "name": "redis",
            "source": {"raw": "kind: Helm", "httpURL": "not a url"}
        }));

        let err = validate(&document, &source_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        // One violation at the union path; the bad URL in the branch is not
        // reported separately.
        assert_eq!(report.len(), 1);
        assert!(report.contains("CreateModuleRequest.source", "exactly_one"));
    }

    #[test]
    fn test_union_branch_violations_surface_when_rule_holds() {
        let document = doc(json!({
            "name": "redis",
            "source": {"httpURL": "ftp://example.com"}
        }));

        let err = validate(&document, &source_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        assert!(report.contains("CreateModuleRequest.source.httpURL", "http_url"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let document = doc(json!({
            "name": "redis",
            "source": {"raw": "kind: Helm"},
            "extra": {"anything": true}
        }));

        assert!(validate(&document, &source_schema()).is_ok());
    }

    #[test]
    fn test_string_coercion_for_query_documents() {
        let schema = Schema::new(
            "ListQuery",
            vec![
                Field::optional("limit", Kind::Integer).check(validators::PAGE_LIMIT),
                Field::optional("continueToken", Kind::String),
            ],
        );

        let document = Document::from_pairs([("limit", "25")]);
        let normalized = validate(&document, &schema).unwrap();
        assert_eq!(normalized.get("limit").unwrap(), 25);

        let document = Document::from_pairs([("limit", "twenty")]);
        let err = validate(&document, &schema).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };
        assert!(report.contains("ListQuery.limit", CODE_INVALID_TYPE));

        // Out of range is a violation, never clamped.
        let document = Document::from_pairs([("limit", "251")]);
        assert!(validate(&document, &schema).is_err());
    }

    #[test]
    fn test_null_on_required_field() {
        let document = doc(json!({"name": null, "source": {"raw": "a: 1"}}));

        let err = validate(&document, &source_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };
        assert!(report.contains("CreateModuleRequest.name", CODE_REQUIRED));
    }

    #[test]
    fn test_nullable_field_preserves_clear_intent() {
        #[derive(Deserialize)]
        struct Update {
            #[serde(default)]
            hibernated: crate::Patch<bool>,
        }

        let schema = Schema::new(
            "UpdateModuleRequest",
            vec![
                Field::required("name", Kind::String),
                Field::nullable("hibernated", Kind::Boolean),
            ],
        );

        let document = doc(json!({"name": "redis", "hibernated": null}));
        let update: Update = validate_into(&document, &schema).unwrap();
        assert_eq!(update.hibernated, crate::Patch::Null);
    }

    #[test]
    fn test_list_items_validated_with_indexed_paths() {
        let schema = Schema::new(
            "Request",
            vec![
                Field::optional(
                    "names",
                    Kind::List(Box::new(Kind::String)),
                )
                .check(validators::DNS1123_LABEL),
            ],
        );

        let document = doc(json!({"names": ["good", "-bad"]}));
        let err = validate(&document, &schema).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        assert_eq!(report.len(), 1);
        assert!(report.contains("Request.names[1]", "dns1123_label"));
    }

    #[test]
    fn test_object_check_scoped_to_object_path() {
        let schema = Schema::new(
            "CreateWorkspaceRequest",
            vec![Field::required(
                "connection",
                Kind::Object(
                    Schema::new(
                        "WorkspaceConnection",
                        vec![
                            Field::required("type", Kind::String)
                                .check(validators::CONNECTION_TYPE),
                            Field::optional("secret", Kind::Map),
                        ],
                    )
                    .check(validators::KUBECONFIG_SECRET_REQUIRED),
                ),
            )],
        );

        let document = doc(json!({"connection": {"type": "kubeconfig"}}));
        let err = validate(&document, &schema).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        assert!(report.contains("CreateWorkspaceRequest.connection", "secret_required"));
    }

    #[test]
    fn test_report_preserves_schema_order() {
        let document = doc(json!({}));
        let err = validate(&document, &source_schema()).unwrap_err();
        let CoreError::Violations { report, .. } = err else {
            panic!("expected violations");
        };

        let paths: Vec<&str> = report.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["CreateModuleRequest.name", "CreateModuleRequest.source"]
        );
    }

    #[test]
    fn test_typed_decode_after_validation() {
        #[derive(Deserialize)]
        struct Request {
            name: String,
            #[serde(default)]
            namespace: Option<String>,
        }

        let schema = Schema::new(
            "Request",
            vec![
                Field::required("name", Kind::String),
                Field::optional("namespace", Kind::String),
            ],
        );

        let document = doc(json!({"name": "redis"}));
        let request: Request = validate_into(&document, &schema).unwrap();
        assert_eq!(request.name, "redis");
        assert_eq!(request.namespace, None);
    }
}
