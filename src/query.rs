//! Composed CMS queries.
//!
//! Every page query shares the same shape: the document, its SEO fields
//! flattened into `"seo"`, and the page-builder array with one projection
//! case per registered block type:
//!
//! ```text
//! pageBuilder[]{
//!   ...,
//!   _type == "homepageHero" => {..., image{...}, buttons[]{...}},
//!   _type == "textAndImage" => {..., image{...}}
//! }
//! ```
//!
//! Block types without resolved fields get no case and pass through as
//! stored via the leading `...`. Cases are emitted in registry order and
//! each case depends only on its own definition, so registering a block
//! never changes the projection of another.

use crate::blocks::{BlockDefinition, BlockRegistry, Resolution};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Image field projection: dereference the asset.
pub const IMAGE_PROJECTION: &str =
    "{..., alt, asset->{_id, _type, url, dimensions{aspectRatio, height, width}}}";

/// Navigation link projection: weak-resolve the referenced page.
pub const LINK_PROJECTION: &str =
    r#"{_key, _type, label, linkType, url, "page": page->{_id, _type, "slug": slug.current}}"#;

/// SEO fields, flattened into the document projection.
pub fn seo_projection() -> String {
    format!(
        r#""seo": {{"title": seo.title, "description": coalesce(seo.description, ""), "image": seo.image{IMAGE_PROJECTION}, "noIndex": seo.noIndex == true}}"#
    )
}

/// The projection of one resolved field.
fn field_projection(field: &str, resolution: Resolution) -> String {
    match resolution {
        Resolution::Image => format!("{field}{IMAGE_PROJECTION}"),
        Resolution::ImageArray => format!("{field}[]{IMAGE_PROJECTION}"),
        Resolution::Link => format!("{field}{LINK_PROJECTION}"),
        Resolution::LinkArray => format!("{field}[]{LINK_PROJECTION}"),
    }
}

/// The conditional projection case of one block type, or `None` when the
/// block has nothing to resolve.
pub fn block_case(definition: &BlockDefinition) -> Option<String> {
    if definition.projection.is_empty() {
        return None;
    }
    let fields: Vec<String> = definition
        .projection
        .iter()
        .map(|p| field_projection(p.field, p.resolution))
        .collect();
    Some(format!(
        r#"_type == "{}" => {{..., {}}}"#,
        definition.name,
        fields.join(", ")
    ))
}

/// The `pageBuilder[]{...}` projection for every block in `registry`.
pub fn content_projection(registry: &BlockRegistry) -> String {
    let mut out = String::from("pageBuilder[]{...");
    for case in registry.iter().filter_map(block_case) {
        let _ = write!(out, ", {case}");
    }
    out.push('}');
    out
}

/// A named query with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Short name used in logs and by `pagecraft query`.
    pub name: &'static str,
    pub groq: String,
    pub params: BTreeMap<String, Value>,
}

impl Query {
    pub fn new(name: &'static str, groq: impl Into<String>) -> Self {
        Self {
            name,
            groq: groq.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// String parameter value, if present.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Parameters the way the HTTP API takes them: `$name` keys with
    /// JSON-encoded values (`$slug="about"`).
    pub fn encoded_params(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(name, value)| (format!("${name}"), value.to_string()))
            .collect()
    }
}

/// Names accepted by [`QueryBuilder::by_name`].
pub const QUERY_NAMES: &[&str] = &[
    "page",
    "home",
    "not-found",
    "navigation",
    "footer",
    "settings",
    "redirects",
    "sitemap",
    "slugs",
];

/// Builds the site's queries for one block registry and page type list.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    registry: &'a BlockRegistry,
    page_types: &'a [String],
}

impl<'a> QueryBuilder<'a> {
    pub fn new(registry: &'a BlockRegistry, page_types: &'a [String]) -> Self {
        Self {
            registry,
            page_types,
        }
    }

    fn page_types_param(&self) -> Value {
        Value::from(self.page_types.to_vec())
    }

    fn page_body(&self) -> String {
        format!(
            "{{..., {}, {}}}",
            seo_projection(),
            content_projection(self.registry)
        )
    }

    /// A slug-addressed page of any queryable type.
    pub fn page(&self, slug: &str) -> Query {
        Query::new(
            "page",
            format!(
                "*[_type in $pageTypes && slug.current == $slug][0]{}",
                self.page_body()
            ),
        )
        .param("pageTypes", self.page_types_param())
        .param("slug", slug)
    }

    pub fn home_page(&self) -> Query {
        Query::new(
            "home",
            format!(r#"*[_id == "homePage"][0]{}"#, self.page_body()),
        )
    }

    pub fn not_found_page(&self) -> Query {
        Query::new(
            "not-found",
            format!(
                r#"*[_id == "notFoundPage"][0]{{..., {}, heading, subheading}}"#,
                seo_projection()
            ),
        )
    }

    pub fn navigation(&self) -> Query {
        Query::new(
            "navigation",
            format!(r#"*[_type == "navigation"][0]{{..., menu[]{LINK_PROJECTION}}}"#),
        )
    }

    pub fn footer(&self) -> Query {
        Query::new(
            "footer",
            format!(r#"*[_type == "footer"][0]{{..., menu[]{LINK_PROJECTION}}}"#),
        )
    }

    pub fn global_settings(&self) -> Query {
        Query::new(
            "settings",
            format!(r#"*[_type == "globalSettings"][0]{{..., favicon{IMAGE_PROJECTION}}}"#),
        )
    }

    /// Enabled redirects only.
    pub fn redirects(&self) -> Query {
        Query::new(
            "redirects",
            r#"*[_type == "redirect" && isEnabled == true]{source, destination, permanent}"#,
        )
    }

    /// Site paths of every queryable page. Pages of the primary type get a
    /// leading `/`; other types keep the raw slug.
    pub fn sitemap(&self) -> Query {
        Query::new(
            "sitemap",
            r#"*[_type in $pageTypes && defined(slug.current)]{"href": select(_type == $pageTypes[0] => "/" + slug.current, slug.current), _updatedAt}"#,
        )
        .param("pageTypes", self.page_types_param())
    }

    /// Slugs of every queryable page, for the static build.
    pub fn page_slugs(&self) -> Query {
        Query::new(
            "slugs",
            "*[_type in $pageTypes && defined(slug.current)].slug.current",
        )
        .param("pageTypes", self.page_types_param())
    }

    /// Every stored document of one type, unprojected.
    pub fn documents_of_type(&self, doc_type: &str) -> Query {
        Query::new("documents", "*[_type == $type]").param("type", doc_type)
    }

    /// Look a query up by its short name. `page` uses `slug`, or an empty
    /// slug when none is given.
    pub fn by_name(&self, name: &str, slug: Option<&str>) -> Option<Query> {
        Some(match name {
            "page" => self.page(slug.unwrap_or_default()),
            "home" => self.home_page(),
            "not-found" => self.not_found_page(),
            "navigation" => self.navigation(),
            "footer" => self.footer(),
            "settings" => self.global_settings(),
            "redirects" => self.redirects(),
            "sitemap" => self.sitemap(),
            "slugs" => self.page_slugs(),
            _ => return None,
        })
    }
}
