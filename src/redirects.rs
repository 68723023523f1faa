//! Redirect documents: validation, extraction and the host redirect files.
//!
//! Editors manage redirects as `redirect` documents. Enabled ones become
//! [`RedirectRule`]s, written both as a Netlify-style `_redirects` file
//!
//! ```text
//! /old-page /new-page 301
//! /campaign https://partner.example/offer 302
//! ```
//!
//! and as `redirects.json` for hosts configured from JSON.
//!
//! Path rules are shared by every site variant: a path starts with `/`,
//! uses word characters, `-`, `/` and `:`, and a `:` may only open a segment
//! (`/blog/:slug`) once.

use crate::cms::{CmsError, ContentSource, fetch_as};
use crate::query::QueryBuilder;
use crate::schema::{FieldSchema, FieldType, Issue, Preview, PreviewSpec, TypeSchema, lookup_text};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, info};

static INVALID_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-/:]").expect("static regex"));
static DOUBLE_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[^/]+:").expect("static regex"));

/// Check a redirect source, or an internal redirect destination.
pub fn is_valid_internal_path(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        Err("Value is required")
    } else if !value.starts_with('/') {
        Err("Internal paths must start with /")
    } else if INVALID_PATH_CHARS.is_match(value) {
        Err("Source path contains invalid characters")
    } else if DOUBLE_PARAMETER.is_match(value) {
        Err("Parameters can only contain one : directly after /")
    } else if value
        .split('/')
        .any(|segment| segment.contains(':') && !segment.starts_with(':'))
    {
        Err("The : character can only appear directly after /")
    } else {
        Ok(())
    }
}

/// A destination is an absolute URL or a valid internal path. On failure the
/// internal path message is reported.
pub fn is_valid_destination(value: &str) -> Result<(), &'static str> {
    if url::Url::parse(value).is_ok() {
        return Ok(());
    }
    is_valid_internal_path(value)
}

fn check_source(value: Option<&Value>, _: &Map<String, Value>) -> Result<(), String> {
    match value.and_then(Value::as_str) {
        Some(path) if !path.is_empty() => is_valid_internal_path(path).map_err(str::to_string),
        _ => Ok(()),
    }
}

fn check_destination(value: Option<&Value>, _: &Map<String, Value>) -> Result<(), String> {
    match value.and_then(Value::as_str) {
        Some(path) if !path.is_empty() => is_valid_destination(path).map_err(str::to_string),
        _ => Ok(()),
    }
}

/// `source == destination`, reported on both fields. Two missing ends
/// compare equal.
fn source_differs_from_destination(doc: &Map<String, Value>) -> Vec<Issue> {
    if doc.get("source") != doc.get("destination") {
        return Vec::new();
    }
    ["source", "destination"]
        .into_iter()
        .map(|field| Issue::error(field, "Source and destination cannot be the same"))
        .collect()
}

fn preview(doc: &Map<String, Value>) -> Preview {
    Preview {
        title: lookup_text(doc, "source").map(|s| format!("From {s}")),
        subtitle: lookup_text(doc, "destination").map(|d| format!("To {d}")),
    }
}

/// The `redirect` document type.
pub fn schema() -> TypeSchema {
    TypeSchema::document("redirect", "Redirects")
        .field(
            FieldSchema::new("source", "Source", FieldType::String)
                .required_with("Value is required")
                .custom(check_source),
        )
        .field(
            FieldSchema::new("destination", "Destination", FieldType::String)
                .required_with("Value is required")
                .custom(check_destination),
        )
        .field(FieldSchema::new("permanent", "Permanent", FieldType::Boolean))
        .field(FieldSchema::new("isEnabled", "Enabled", FieldType::Boolean))
        .document_rule(source_differs_from_destination)
        .preview(PreviewSpec::Custom(preview))
}

/// A redirect as returned by the redirects query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RedirectDocument {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub permanent: Option<bool>,
}

/// One redirect the host should serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub source: String,
    pub destination: String,
    pub permanent: bool,
}

impl RedirectRule {
    pub fn status(&self) -> u16 {
        if self.permanent { 301 } else { 302 }
    }
}

/// Keep documents with both ends set. `permanent` defaults to true.
pub fn to_rules(documents: &[RedirectDocument]) -> Vec<RedirectRule> {
    documents
        .iter()
        .filter_map(|doc| {
            let source = doc.source.as_deref().filter(|s| !s.is_empty())?;
            let destination = doc.destination.as_deref().filter(|d| !d.is_empty())?;
            Some(RedirectRule {
                source: source.to_string(),
                destination: destination.to_string(),
                permanent: doc.permanent.unwrap_or(true),
            })
        })
        .collect()
}

/// Fetch the enabled redirects.
pub fn fetch_redirects(
    source: &dyn ContentSource,
    queries: &QueryBuilder<'_>,
) -> Result<Vec<RedirectRule>, CmsError> {
    let documents: Option<Vec<Option<RedirectDocument>>> = fetch_as(source, &queries.redirects())?;
    let documents: Vec<RedirectDocument> = documents.into_iter().flatten().flatten().collect();
    let rules = to_rules(&documents);
    if rules.len() < documents.len() {
        debug!(
            skipped = documents.len() - rules.len(),
            "skipping redirects without source or destination"
        );
    }
    info!(count = rules.len(), "fetched redirects");
    Ok(rules)
}

/// The `_redirects` file: one `<source> <destination> <status>` per line.
pub fn render_redirects_file(rules: &[RedirectRule]) -> String {
    rules
        .iter()
        .map(|r| format!("{} {} {}\n", r.source, r.destination, r.status()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockRegistry;
    use crate::schema::{Level, SchemaRegistry};
    use crate::test_helpers::{StubSource, redirect};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("/old-page")]
    #[case("/")]
    #[case("/blog/:slug")]
    #[case("/a_b/c-d/:id/e")]
    fn valid_internal_paths(#[case] path: &str) {
        assert_eq!(is_valid_internal_path(path), Ok(()));
    }

    #[rstest]
    #[case("", "Value is required")]
    #[case("old-page", "Internal paths must start with /")]
    #[case("/old page", "Source path contains invalid characters")]
    #[case("/æble", "Source path contains invalid characters")]
    #[case("/:a:b", "Parameters can only contain one : directly after /")]
    #[case("/blog/x:slug", "The : character can only appear directly after /")]
    fn invalid_internal_paths(#[case] path: &str, #[case] message: &str) {
        assert_eq!(is_valid_internal_path(path), Err(message));
    }

    #[rstest]
    #[case("https://partner.example/offer", true)]
    #[case("/new-page", true)]
    #[case("new-page", false)]
    fn destinations(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_destination(value).is_ok(), valid);
    }

    fn schemas() -> SchemaRegistry {
        SchemaRegistry::standard(&BlockRegistry::all(), &["genericPage".to_string()])
    }

    #[test]
    fn same_source_and_destination_fails_on_both_fields() {
        let issues = schemas().validate(&json!({
            "_id": "r1",
            "_type": "redirect",
            "source": "/old-page",
            "destination": "/old-page",
            "permanent": true,
            "isEnabled": true
        }));
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["source", "destination"]);
        assert!(issues.iter().all(|i| i.level == Level::Error));
        assert!(issues[0].message.contains("cannot be the same"));
    }

    #[test]
    fn empty_redirect_fails_same_value_rule() {
        let issues = schemas().validate(&json!({"_id": "r1", "_type": "redirect"}));
        let same: Vec<&str> = issues
            .iter()
            .filter(|i| i.message.contains("cannot be the same"))
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(same, vec!["source", "destination"]);
        assert!(issues.iter().any(|i| i.message == "Value is required"));
    }

    #[test]
    fn missing_source_with_destination_is_not_same_value() {
        let issues = schemas().validate(&json!({"_id": "r1", "_type": "redirect", "destination": "/new-page"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "source");
        assert_eq!(issues[0].message, "Value is required");
    }

    #[test]
    fn valid_redirect_has_no_issues() {
        let issues = schemas().validate(&json!({
            "_id": "r1",
            "_type": "redirect",
            "source": "/old-page",
            "destination": "/new-page"
        }));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn invalid_source_is_reported_once() {
        let issues = schemas().validate(&json!({
            "_id": "r1",
            "_type": "redirect",
            "source": "old-page",
            "destination": "https://partner.example"
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "source");
        assert_eq!(issues[0].message, "Internal paths must start with /");
    }

    #[test]
    fn preview_shows_both_ends() {
        let preview = schemas()
            .preview(&json!({"_type": "redirect", "source": "/a", "destination": "/b"}))
            .unwrap();
        assert_eq!(preview.title.as_deref(), Some("From /a"));
        assert_eq!(preview.subtitle.as_deref(), Some("To /b"));
    }

    #[test]
    fn enabled_redirect_defaults_to_permanent() {
        let registry = BlockRegistry::all();
        let types = vec!["genericPage".to_string()];
        let queries = QueryBuilder::new(&registry, &types);
        let source = StubSource::new().with(
            "redirects",
            json!([
                redirect("/old-page", "/new-page", None),
                redirect("/campaign", "https://partner.example/offer", Some(false)),
                {"source": null, "destination": "/x"},
                null
            ]),
        );
        let rules = fetch_redirects(&source, &queries).unwrap();
        assert_eq!(
            rules[0],
            RedirectRule {
                source: "/old-page".into(),
                destination: "/new-page".into(),
                permanent: true,
            }
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(
            render_redirects_file(&rules),
            "/old-page /new-page 301\n/campaign https://partner.example/offer 302\n"
        );
    }

    #[test]
    fn no_redirects_is_empty() {
        let registry = BlockRegistry::all();
        let types = vec!["genericPage".to_string()];
        let queries = QueryBuilder::new(&registry, &types);
        assert!(fetch_redirects(&StubSource::new(), &queries).unwrap().is_empty());
        assert_eq!(render_redirects_file(&[]), "");
    }
}
