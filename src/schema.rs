//! Content schema registry and document validation.
//!
//! Every content type the CMS stores is declared here (or, for page-builder
//! modules, next to its renderer) as a [`TypeSchema`]: its fields, the rules
//! each field must satisfy, rules over the whole document, and how to label
//! it in listings. The `check` command runs [`SchemaRegistry::validate`] over
//! every fetched document; rendering never validates.
//!
//! ## Rule evaluation
//!
//! Field rules are pure functions of the field value and its sibling fields.
//! Named object fields (`seo`, `navigationLink`, module blocks, …) are
//! validated recursively with their own type's rules, and document rules run
//! after all field rules. Issue paths are dotted, with array members
//! addressed by `_key` when they have one:
//!
//! ```text
//! seo.description
//! pageBuilder[_key=="a1"].buttons
//! menu[2].url
//! ```

use crate::blocks::BlockRegistry;
use crate::types::{HOME_PAGE_ID, NOT_FOUND_PAGE_ID};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
    pub level: Level,
}

impl Issue {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            level: Level::Error,
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            level: Level::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Document,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Text,
    Boolean,
    Url,
    Slug,
    Reference,
    /// A plain image without alt text.
    Image,
    RichText,
    RichTextNoImages,
    /// A named object type, validated with that type's schema.
    Object(&'static str),
    /// Array whose members are all of one named object type.
    ArrayOf(&'static str),
    /// Array of anonymous objects.
    Array,
    /// Array of page-builder blocks, each validated by its own `_type`.
    Blocks,
}

/// A custom field check: `(value, siblings)` → error message on failure.
pub type FieldCheck = fn(Option<&Value>, &Map<String, Value>) -> Result<(), String>;

/// A rule over a whole document. Returned issue paths are relative to it.
pub type DocumentRule = fn(&Map<String, Value>) -> Vec<Issue>;

#[derive(Debug, Clone)]
pub enum Check {
    Required,
    MinItems(usize),
    MaxItems(usize),
    /// Character count bounds; only applies to non-empty strings.
    Length(usize, usize),
    OneOf(&'static [&'static str]),
    /// Array members must have one of these `_type`s.
    AllowedTypes(Vec<String>),
    Custom(FieldCheck),
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub check: Check,
    pub level: Level,
    pub message: Option<String>,
}

impl FieldRule {
    /// Run the rule. Returns the failure message, if any.
    pub fn evaluate(&self, value: Option<&Value>, siblings: &Map<String, Value>) -> Option<String> {
        let failure = match &self.check {
            Check::Required => is_blank(value).then(|| "This field is required".to_string()),
            Check::MinItems(min) => {
                let len = value.and_then(Value::as_array).map_or(0, Vec::len);
                (len < *min).then(|| format!("At least {min} item(s) required"))
            }
            Check::MaxItems(max) => {
                let len = value.and_then(Value::as_array).map_or(0, Vec::len);
                (len > *max).then(|| format!("At most {max} item(s) allowed"))
            }
            Check::Length(min, max) => value
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(|s| s.chars().count())
                .filter(|n| n < min || n > max)
                .map(|n| format!("Length {n} is outside {min}-{max}")),
            Check::OneOf(options) => value
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty() && !options.iter().any(|o| o == s))
                .map(|s| format!("'{s}' is not one of {}", options.join(", "))),
            Check::AllowedTypes(types) => value
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|member| member.get("_type").and_then(Value::as_str))
                .find(|t| !types.iter().any(|allowed| allowed == t))
                .map(|t| format!("Type '{t}' is not allowed here")),
            Check::Custom(check) => check(value, siblings).err(),
        };
        failure.map(|default| self.message.clone().unwrap_or(default))
    }
}

/// Missing, `null`, empty string and empty array all count as blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub title: &'static str,
    pub field_type: FieldType,
    pub rules: Vec<FieldRule>,
}

impl FieldSchema {
    pub fn new(name: &'static str, title: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            title,
            field_type,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, check: Check, level: Level, message: Option<&str>) -> Self {
        self.rules.push(FieldRule {
            check,
            level,
            message: message.map(str::to_string),
        });
        self
    }

    pub fn required(self) -> Self {
        self.rule(Check::Required, Level::Error, None)
    }

    pub fn required_with(self, message: &str) -> Self {
        self.rule(Check::Required, Level::Error, Some(message))
    }

    pub fn min_items(self, min: usize, message: &str) -> Self {
        self.rule(Check::MinItems(min), Level::Error, Some(message))
    }

    pub fn max_items(self, max: usize, message: &str) -> Self {
        self.rule(Check::MaxItems(max), Level::Error, Some(message))
    }

    pub fn one_of(self, options: &'static [&'static str]) -> Self {
        self.rule(Check::OneOf(options), Level::Error, None)
    }

    pub fn custom(self, check: FieldCheck) -> Self {
        self.rule(Check::Custom(check), Level::Error, None)
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.check, Check::Required) && r.level == Level::Error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

/// How a document or block is labelled in listings.
#[derive(Debug, Clone)]
pub enum PreviewSpec {
    /// Title from a dotted field path, fixed subtitle.
    Field {
        title: &'static str,
        subtitle: Option<&'static str>,
    },
    /// Title and subtitle from two dotted field paths.
    Fields {
        title: &'static str,
        subtitle: &'static str,
    },
    Fixed(&'static str),
    Custom(fn(&Map<String, Value>) -> Preview),
}

impl PreviewSpec {
    fn apply(&self, doc: &Map<String, Value>) -> Preview {
        match self {
            Self::Field { title, subtitle } => Preview {
                title: lookup_text(doc, title),
                subtitle: subtitle.map(str::to_string),
            },
            Self::Fields { title, subtitle } => Preview {
                title: lookup_text(doc, title),
                subtitle: lookup_text(doc, subtitle),
            },
            Self::Fixed(title) => Preview {
                title: Some(title.to_string()),
                subtitle: None,
            },
            Self::Custom(f) => f(doc),
        }
    }
}

/// Read a string at a dotted path (`slug.current`).
pub fn lookup_text(doc: &Map<String, Value>, path: &str) -> Option<String> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    current.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct TypeSchema {
    pub name: String,
    pub title: String,
    pub kind: TypeKind,
    pub fields: Vec<FieldSchema>,
    pub rules: Vec<DocumentRule>,
    pub preview: PreviewSpec,
}

impl TypeSchema {
    pub fn document(name: &str, title: &str) -> Self {
        Self::new(name, title, TypeKind::Document)
    }

    pub fn object(name: &str, title: &str) -> Self {
        Self::new(name, title, TypeKind::Object)
    }

    fn new(name: &str, title: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind,
            fields: Vec::new(),
            rules: Vec::new(),
            preview: PreviewSpec::Field {
                title: "title",
                subtitle: None,
            },
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn document_rule(mut self, rule: DocumentRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn preview(mut self, preview: PreviewSpec) -> Self {
        self.preview = preview;
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// Shared type definitions
// =============================================================================

pub fn seo_schema() -> TypeSchema {
    TypeSchema::object("seo", "SEO")
        .field(FieldSchema::new("title", "SEO title", FieldType::String).required_with("SEO title is required"))
        .field(
            FieldSchema::new("description", "SEO description", FieldType::Text)
                .required_with("SEO description is required")
                .rule(
                    Check::Length(150, 160),
                    Level::Warning,
                    Some("For optimal SEO, this summary should be between 150-160 characters"),
                ),
        )
        .field(FieldSchema::new("image", "SEO image", FieldType::Image))
        .field(FieldSchema::new("noIndex", "No index", FieldType::Boolean))
}

pub fn image_field_schema() -> TypeSchema {
    TypeSchema::object("imageFieldType", "Image")
        .field(FieldSchema::new("alt", "Alternative text", FieldType::String).required())
        .preview(PreviewSpec::Field {
            title: "alt",
            subtitle: None,
        })
}

fn url_required_for_external(value: Option<&Value>, siblings: &Map<String, Value>) -> Result<(), String> {
    if siblings.get("linkType").and_then(Value::as_str) == Some("external") && is_blank(value) {
        return Err("URL is required for external links".into());
    }
    Ok(())
}

fn page_required_for_internal(value: Option<&Value>, siblings: &Map<String, Value>) -> Result<(), String> {
    if siblings.get("linkType").and_then(Value::as_str) == Some("internal") && is_blank(value) {
        return Err("Page is required for internal links".into());
    }
    Ok(())
}

pub fn navigation_link_schema() -> TypeSchema {
    TypeSchema::object("navigationLink", "Navigation link")
        .field(FieldSchema::new("label", "Label", FieldType::String))
        .field(FieldSchema::new("linkType", "Link Type", FieldType::String).one_of(&["internal", "external"]))
        .field(FieldSchema::new("url", "URL", FieldType::Url).custom(url_required_for_external))
        .field(FieldSchema::new("page", "Page", FieldType::Reference).custom(page_required_for_internal))
        .preview(PreviewSpec::Fields {
            title: "label",
            subtitle: "linkType",
        })
}

pub fn rich_text_schema(name: &str, title: &str) -> TypeSchema {
    TypeSchema::object(name, title).preview(PreviewSpec::Fixed("Rich text"))
}

fn contact_info_schema() -> TypeSchema {
    TypeSchema::object("contactInfo", "Contact Info")
        .field(FieldSchema::new("phone", "Phone", FieldType::String).required())
        .field(FieldSchema::new("email", "Email", FieldType::String).required())
}

fn slug_unless_singleton(value: Option<&Value>, siblings: &Map<String, Value>) -> Result<(), String> {
    let is_singleton = |key: &str| {
        matches!(
            siblings.get(key).and_then(Value::as_str),
            Some(HOME_PAGE_ID | NOT_FOUND_PAGE_ID)
        )
    };
    if is_singleton("_type") || is_singleton("_id") {
        return Ok(());
    }
    let current = value.and_then(|v| v.get("current")).and_then(Value::as_str);
    if current.is_none_or(|s| s.trim().is_empty()) {
        return Err("Slug is required".into());
    }
    Ok(())
}

fn base_page(name: &str, title: &str) -> TypeSchema {
    TypeSchema::document(name, title)
        .field(FieldSchema::new("title", "Internal title", FieldType::String).required())
        .field(FieldSchema::new("slug", "Slug", FieldType::Slug).custom(slug_unless_singleton))
        .field(FieldSchema::new("seo", "SEO", FieldType::Object("seo")).required_with("SEO content is required"))
        .preview(PreviewSpec::Fields {
            title: "title",
            subtitle: "slug.current",
        })
}

/// A page-builder page type admitting the given modules.
pub fn page_schema(name: &str, title: &str, modules: &BlockRegistry) -> TypeSchema {
    base_page(name, title).field(
        FieldSchema::new("pageBuilder", "Modules", FieldType::Blocks)
            .min_items(1, "At least one module is required")
            .rule(Check::AllowedTypes(modules.names()), Level::Error, None),
    )
}

pub fn not_found_page_schema() -> TypeSchema {
    base_page(NOT_FOUND_PAGE_ID, "Not found page")
        .field(FieldSchema::new("heading", "Heading", FieldType::String))
        .field(FieldSchema::new("subheading", "Subheading", FieldType::Text))
}

pub fn global_settings_schema() -> TypeSchema {
    TypeSchema::document("globalSettings", "Global Settings")
        .field(FieldSchema::new("companyName", "Company Name", FieldType::String).required())
        .field(FieldSchema::new("favicon", "Favicon", FieldType::Image).required())
        .field(FieldSchema::new("contactInfo", "Contact Info", FieldType::Object("contactInfo")))
        .field(FieldSchema::new("address", "Address", FieldType::Object("address")).required())
        .field(FieldSchema::new("socialLinks", "Social links", FieldType::Object("socialLinks")))
        .field(FieldSchema::new("copyright", "Copyright text", FieldType::String).required())
        .field(FieldSchema::new("vatNumberObject", "VAT number", FieldType::Object("vatNumber")).required())
        .preview(PreviewSpec::Fixed("Global Settings"))
}

pub fn navigation_schema() -> TypeSchema {
    TypeSchema::document("navigation", "Navigation")
        .field(FieldSchema::new("logoText", "Logo text", FieldType::String))
        .field(
            FieldSchema::new("menu", "Menu", FieldType::ArrayOf("navigationLink"))
                .required()
                .max_items(6, "At most 6 links are allowed"),
        )
        .field(FieldSchema::new("contactButtonText", "Contact button text", FieldType::String).required())
        .preview(PreviewSpec::Fixed("Navigation"))
}

pub fn footer_schema() -> TypeSchema {
    TypeSchema::document("footer", "Footer")
        .field(
            FieldSchema::new("menu", "Menu", FieldType::ArrayOf("navigationLink"))
                .min_items(1, "At least 1 link is required"),
        )
        .preview(PreviewSpec::Fixed("Footer"))
}

// =============================================================================
// Registry
// =============================================================================

/// All content types known to a site variant, by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// The standard type set: shared objects, singletons, the given page
    /// types and the enabled modules. The first page type is `genericPage`
    /// unless configured otherwise.
    pub fn standard(modules: &BlockRegistry, page_types: &[String]) -> Self {
        let mut registry = Self::default();
        for schema in [
            seo_schema(),
            image_field_schema(),
            navigation_link_schema(),
            rich_text_schema("richText", "Rich Text"),
            rich_text_schema("richTextNoImages", "Rich Text (No Images)"),
            contact_info_schema(),
            TypeSchema::object("address", "Address"),
            TypeSchema::object("socialLinks", "Social links"),
            TypeSchema::object("vatNumber", "VAT number"),
            page_schema(HOME_PAGE_ID, "Homepage", modules),
            not_found_page_schema(),
            global_settings_schema(),
            navigation_schema(),
            footer_schema(),
            crate::redirects::schema(),
        ] {
            registry.register(schema);
        }
        for page_type in page_types {
            registry.register(page_schema(page_type, page_type, modules));
        }
        for definition in modules.iter() {
            registry.register((definition.schema)());
        }
        registry
    }

    pub fn register(&mut self, schema: TypeSchema) {
        self.types.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&TypeSchema> {
        self.types.get(name)
    }

    /// Names of every document type.
    pub fn document_types(&self) -> Vec<&str> {
        self.types
            .values()
            .filter(|t| t.kind == TypeKind::Document)
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Validate a document against its `_type`'s schema.
    ///
    /// Documents of unregistered types yield no issues.
    pub fn validate(&self, document: &Value) -> Vec<Issue> {
        let mut issues = Vec::new();
        if let Some(obj) = document.as_object()
            && let Some(schema) = obj
                .get("_type")
                .and_then(Value::as_str)
                .and_then(|t| self.get(t))
        {
            self.validate_object(schema, obj, "", &mut issues);
        }
        issues
    }

    fn validate_object(
        &self,
        schema: &TypeSchema,
        obj: &Map<String, Value>,
        prefix: &str,
        issues: &mut Vec<Issue>,
    ) {
        for field in &schema.fields {
            let value = obj.get(field.name);
            let path = join_path(prefix, field.name);
            for rule in &field.rules {
                if let Some(message) = rule.evaluate(value, obj) {
                    issues.push(Issue {
                        path: path.clone(),
                        message,
                        level: rule.level,
                    });
                }
            }
            match (&field.field_type, value) {
                (FieldType::Object(name), Some(Value::Object(nested))) => {
                    if let Some(nested_schema) = self.get(name) {
                        self.validate_object(nested_schema, nested, &path, issues);
                    }
                }
                (FieldType::ArrayOf(name), Some(Value::Array(members))) => {
                    if let Some(member_schema) = self.get(name) {
                        for (i, member) in members.iter().enumerate() {
                            if let Some(m) = member.as_object() {
                                let member_path = member_path(&path, i, m);
                                self.validate_object(member_schema, m, &member_path, issues);
                            }
                        }
                    }
                }
                (FieldType::Blocks, Some(Value::Array(members))) => {
                    for (i, member) in members.iter().enumerate() {
                        let Some(m) = member.as_object() else {
                            continue;
                        };
                        if let Some(block_schema) = m
                            .get("_type")
                            .and_then(Value::as_str)
                            .and_then(|t| self.get(t))
                        {
                            let member_path = member_path(&path, i, m);
                            self.validate_object(block_schema, m, &member_path, issues);
                        }
                    }
                }
                _ => {}
            }
        }
        for rule in &schema.rules {
            issues.extend(rule(obj).into_iter().map(|issue| Issue {
                path: join_path(prefix, &issue.path),
                ..issue
            }));
        }
    }

    /// Listing label for a document or block.
    pub fn preview(&self, document: &Value) -> Option<Preview> {
        let obj = document.as_object()?;
        let schema = self.get(obj.get("_type")?.as_str()?)?;
        Some(schema.preview.apply(obj))
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn member_path(path: &str, index: usize, member: &Map<String, Value>) -> String {
    match member.get("_key").and_then(Value::as_str) {
        Some(key) => format!("{path}[_key==\"{key}\"]"),
        None => format!("{path}[{index}]"),
    }
}

/// Find pages sharing a slug within the given page types.
///
/// Returns `(document id, issue)` for every page after the first one
/// claiming a slug.
pub fn duplicate_slugs(documents: &[Value], page_types: &[String]) -> Vec<(String, Issue)> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut duplicates = Vec::new();
    for doc in documents {
        let Some(obj) = doc.as_object() else {
            continue;
        };
        let doc_type = obj.get("_type").and_then(Value::as_str).unwrap_or_default();
        if !page_types.iter().any(|t| t == doc_type) {
            continue;
        }
        let id = obj.get("_id").and_then(Value::as_str).unwrap_or_default().to_string();
        let Some(slug) = lookup_text(obj, "slug.current") else {
            continue;
        };
        match seen.get(&slug) {
            Some(first) => duplicates.push((
                id,
                Issue::error("slug", format!("Slug '{slug}' is already used by {first}")),
            )),
            None => {
                seen.insert(slug, id);
            }
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::standard(&BlockRegistry::all(), &["genericPage".to_string()])
    }

    fn paths(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    fn valid_seo() -> Value {
        json!({"title": "About us", "description": "x".repeat(155)})
    }

    #[test]
    fn registers_documented_types() {
        let registry = registry();
        for name in [
            "homePage",
            "genericPage",
            "notFoundPage",
            "globalSettings",
            "navigation",
            "footer",
            "redirect",
            "seo",
            "imageFieldType",
            "navigationLink",
            "richText",
            "richTextNoImages",
            "homepageHero",
            "priceListModule",
        ] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
        assert!(registry.document_types().contains(&"redirect"));
        assert!(!registry.document_types().contains(&"seo"));
    }

    #[test]
    fn generic_page_requires_slug() {
        let issues = registry().validate(&json!({
            "_type": "genericPage",
            "_id": "p1",
            "title": "About",
            "seo": valid_seo(),
            "pageBuilder": [{"_type": "quoteModule", "_key": "q"}]
        }));
        assert_eq!(paths(&issues), vec!["slug"]);
        assert_eq!(issues[0].message, "Slug is required");
    }

    #[test]
    fn home_page_needs_no_slug() {
        let issues = registry().validate(&json!({
            "_type": "homePage",
            "_id": "homePage",
            "title": "Home",
            "seo": valid_seo(),
            "pageBuilder": [{"_type": "quoteModule", "_key": "q"}]
        }));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn page_requires_seo_and_modules() {
        let issues = registry().validate(&json!({
            "_type": "genericPage",
            "title": "About",
            "slug": {"current": "about"},
            "pageBuilder": []
        }));
        assert_eq!(paths(&issues), vec!["seo", "pageBuilder"]);
    }

    #[test]
    fn seo_description_length_is_a_warning() {
        let issues = registry().validate(&json!({
            "_type": "genericPage",
            "title": "About",
            "slug": {"current": "about"},
            "seo": {"title": "About", "description": "Too short"},
            "pageBuilder": [{"_type": "quoteModule", "_key": "q"}]
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "seo.description");
        assert_eq!(issues[0].level, Level::Warning);
    }

    #[test]
    fn page_builder_rejects_disabled_module() {
        let modules = BlockRegistry::with_modules(&["quoteModule".to_string()]);
        let registry = SchemaRegistry::standard(&modules, &["genericPage".to_string()]);
        let issues = registry.validate(&json!({
            "_type": "genericPage",
            "title": "About",
            "slug": {"current": "about"},
            "seo": valid_seo(),
            "pageBuilder": [{"_type": "ctaBlock", "_key": "c"}]
        }));
        assert_eq!(paths(&issues), vec!["pageBuilder"]);
        assert!(issues[0].message.contains("ctaBlock"));
    }

    #[test]
    fn nested_block_rules_use_key_paths() {
        let issues = registry().validate(&json!({
            "_type": "homePage",
            "title": "Home",
            "seo": valid_seo(),
            "pageBuilder": [{
                "_type": "homepageHero",
                "_key": "h1",
                "buttons": [{"_key": "b1"}, {"_key": "b2"}, {"_key": "b3"}]
            }]
        }));
        assert_eq!(paths(&issues), vec!["pageBuilder[_key==\"h1\"].buttons"]);
    }

    #[rstest]
    #[case(json!({"linkType": "external"}), Some("url"))]
    #[case(json!({"linkType": "external", "url": "https://a.example"}), None)]
    #[case(json!({"linkType": "internal"}), Some("page"))]
    #[case(json!({"linkType": "internal", "page": {"_ref": "p1", "_type": "reference"}}), None)]
    #[case(json!({"linkType": "sideways"}), Some("linkType"))]
    fn navigation_link_conditional_rules(#[case] link: Value, #[case] failing: Option<&str>) {
        let issues = registry().validate(&json!({
            "_type": "footer",
            "menu": [link]
        }));
        let expected: Vec<String> = failing.map(|f| format!("menu[0].{f}")).into_iter().collect();
        assert_eq!(
            issues.iter().map(|i| i.path.clone()).collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn navigation_menu_is_capped_at_six() {
        let links: Vec<Value> = (0..7)
            .map(|i| json!({"_key": format!("l{i}"), "linkType": "external", "url": "https://a.example"}))
            .collect();
        let issues = registry().validate(&json!({
            "_type": "navigation",
            "menu": links,
            "contactButtonText": "Contact"
        }));
        assert_eq!(paths(&issues), vec!["menu"]);
    }

    #[test]
    fn footer_needs_a_link() {
        let issues = registry().validate(&json!({"_type": "footer", "menu": []}));
        assert_eq!(paths(&issues), vec!["menu"]);
    }

    #[test]
    fn image_requires_alt() {
        let issues = registry().validate(&json!({
            "_type": "homePage",
            "title": "Home",
            "seo": valid_seo(),
            "pageBuilder": [{"_type": "textAndImage", "_key": "t", "image": {"asset": {"_ref": "image-a-1x1-png"}}}]
        }));
        assert_eq!(paths(&issues), vec!["pageBuilder[_key==\"t\"].image.alt"]);
    }

    #[test]
    fn global_settings_requirements() {
        let issues = registry().validate(&json!({
            "_type": "globalSettings",
            "contactInfo": {"phone": "123"}
        }));
        assert_eq!(
            paths(&issues),
            vec![
                "companyName",
                "favicon",
                "contactInfo.email",
                "address",
                "copyright",
                "vatNumberObject"
            ]
        );
    }

    #[test]
    fn grid_and_price_list_need_a_column() {
        for module in ["gridModule", "priceListModule"] {
            let issues = registry().validate(&json!({
                "_type": "homePage",
                "title": "Home",
                "seo": valid_seo(),
                "pageBuilder": [{"_type": module, "_key": "m"}]
            }));
            assert_eq!(paths(&issues), vec!["pageBuilder[_key==\"m\"].columns"], "{module}");
        }
    }

    #[test]
    fn unknown_types_are_not_validated() {
        assert!(registry().validate(&json!({"_type": "sanity.imageAsset"})).is_empty());
        assert!(registry().validate(&json!("not a document")).is_empty());
    }

    #[test]
    fn previews() {
        let registry = registry();
        let page = registry
            .preview(&json!({"_type": "genericPage", "title": "About", "slug": {"current": "about"}}))
            .unwrap();
        assert_eq!(page.title.as_deref(), Some("About"));
        assert_eq!(page.subtitle.as_deref(), Some("about"));

        let block = registry
            .preview(&json!({"_type": "quoteModule", "title": "Words"}))
            .unwrap();
        assert_eq!(block.title.as_deref(), Some("Words"));
        assert_eq!(block.subtitle.as_deref(), Some("Quote"));
    }

    #[test]
    fn duplicate_slugs_are_reported() {
        let docs = vec![
            json!({"_id": "a", "_type": "genericPage", "slug": {"current": "about"}}),
            json!({"_id": "b", "_type": "genericPage", "slug": {"current": "about"}}),
            json!({"_id": "c", "_type": "genericPage", "slug": {"current": "team"}}),
            json!({"_id": "d", "_type": "redirect", "slug": {"current": "about"}}),
        ];
        let dups = duplicate_slugs(&docs, &["genericPage".to_string()]);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].0, "b");
        assert!(dups[0].1.message.contains("'about'"));
    }
}
