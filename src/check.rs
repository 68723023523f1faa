//! Dataset validation for the `check` command.
//!
//! Lists every document of every registered document type and runs it
//! through the [`SchemaRegistry`], then adds the cross-document slug check.
//! Only documents with findings are reported.

use crate::cms::{CmsError, ContentSource, fetch_as};
use crate::config::SiteConfig;
use crate::query::QueryBuilder;
use crate::schema::{Issue, Level, SchemaRegistry, duplicate_slugs};
use serde_json::Value;
use tracing::{debug, info};

/// Findings for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentIssues {
    pub id: String,
    pub doc_type: String,
    /// Preview title, when the type's preview yields one.
    pub title: Option<String>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    /// Number of documents validated.
    pub documents: usize,
    pub findings: Vec<DocumentIssues>,
}

impl CheckReport {
    fn count(&self, level: Level) -> usize {
        self.findings
            .iter()
            .flat_map(|f| &f.issues)
            .filter(|i| i.level == level)
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(Level::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Level::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }
}

fn text(doc: &Value, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Validate every stored document.
pub fn check(source: &dyn ContentSource, config: &SiteConfig) -> Result<CheckReport, CmsError> {
    let registry = config.block_registry();
    let schemas = SchemaRegistry::standard(&registry, &config.cms.page_types);
    let queries = QueryBuilder::new(&registry, &config.cms.page_types);

    let mut documents: Vec<Value> = Vec::new();
    for doc_type in schemas.document_types() {
        let found: Option<Vec<Value>> = fetch_as(source, &queries.documents_of_type(doc_type))?;
        let found = found.unwrap_or_default();
        debug!(doc_type, count = found.len(), "listed documents");
        documents.extend(found);
    }

    let mut findings: Vec<DocumentIssues> = documents
        .iter()
        .map(|doc| DocumentIssues {
            id: text(doc, "_id"),
            doc_type: text(doc, "_type"),
            title: schemas.preview(doc).and_then(|p| p.title),
            issues: schemas.validate(doc),
        })
        .collect();
    for (id, issue) in duplicate_slugs(&documents, &config.cms.page_types) {
        if let Some(entry) = findings.iter_mut().find(|f| f.id == id) {
            entry.issues.push(issue);
        }
    }
    findings.retain(|f| !f.issues.is_empty());

    let report = CheckReport {
        documents: documents.len(),
        findings,
    };
    info!(
        documents = report.documents,
        errors = report.errors(),
        warnings = report.warnings(),
        "checked dataset"
    );
    Ok(report)
}
