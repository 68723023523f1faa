//! Shared test utilities for the pagecraft test suite.
//!
//! Provides a ready-made render context, block constructors, an in-memory
//! [`ContentSource`] and builders for the CMS documents the stages read.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! let hero = block(json!({"_type": "genericHero", "_key": "h", "title": "Hi"}));
//! let html = (hero_definition.render)(&hero, &site.ctx());
//!
//! let source = StubSource::new()
//!     .with("home", home_page(json!([])))
//!     .with_page("about", page("p1", "about", json!([])));
//! ```

use crate::blocks::{BlockRegistry, ContentBlock};
use crate::cms::{CmsError, ContentSource};
use crate::config::{ImagesConfig, SiteSection};
use crate::context::{RenderContext, SiteContext};
use crate::image::ImageUrlBuilder;
use crate::query::Query;
use crate::types::{Footer, GlobalSettings, Navigation};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

// =========================================================================
// Render fixtures
// =========================================================================

/// Owns everything a [`RenderContext`] borrows.
pub struct TestSite {
    pub site: SiteContext,
    pub registry: BlockRegistry,
    pub images: ImageUrlBuilder,
    pub studio_url: Option<String>,
}

impl TestSite {
    pub fn new() -> Self {
        let section = SiteSection {
            name: "Test Studio".into(),
            base_url: "https://studio.example".into(),
            ..SiteSection::default()
        };
        Self {
            site: SiteContext::new(
                &section,
                GlobalSettings::default(),
                &Navigation::default(),
                &Footer::default(),
            ),
            registry: BlockRegistry::all(),
            images: ImageUrlBuilder::new("test-project", "production", &ImagesConfig::default()),
            studio_url: None,
        }
    }

    pub fn ctx(&self) -> RenderContext<'_> {
        RenderContext {
            site: &self.site,
            registry: &self.registry,
            images: &self.images,
            studio_url: self.studio_url.as_deref(),
        }
    }
}

/// Build a block from a JSON literal. Panics on non-objects.
pub fn block(value: Value) -> ContentBlock {
    ContentBlock::from_value(&value)
        .unwrap_or_else(|| panic!("test block must be a JSON object, got {value}"))
}

// =========================================================================
// In-memory CMS
// =========================================================================

/// A [`ContentSource`] answering from canned results.
///
/// Results are keyed by query name; `page` queries are keyed by
/// `page:<slug>`. Unknown queries answer `null`, like a CMS query that
/// matches nothing.
#[derive(Default)]
pub struct StubSource {
    results: HashMap<String, Value>,
    failing: HashSet<String>,
    fail_all: bool,
    calls: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every query fails.
    pub fn unreachable() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, name: &str, result: Value) -> Self {
        self.results.insert(name.to_string(), result);
        self
    }

    pub fn with_page(self, slug: &str, result: Value) -> Self {
        self.with(&format!("page:{slug}"), result)
    }

    /// Make one query fail.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Keys of the queries answered so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn key(query: &Query) -> String {
        match (query.name, query.param_str("slug")) {
            ("page", Some(slug)) => format!("page:{slug}"),
            ("documents", _) => format!("documents:{}", query.param_str("type").unwrap_or("")),
            (name, _) => name.to_string(),
        }
    }
}

impl ContentSource for StubSource {
    fn fetch(&self, query: &Query) -> Result<Value, CmsError> {
        let key = Self::key(query);
        self.calls.lock().unwrap().push(key.clone());
        if self.fail_all || self.failing.contains(&key) {
            return Err(CmsError::Status {
                query: key,
                status: 503,
                body: "service unavailable".into(),
            });
        }
        Ok(self.results.get(&key).cloned().unwrap_or(Value::Null))
    }
}

// =========================================================================
// Document builders
// =========================================================================

/// A slug-addressed page with a complete SEO object.
pub fn page(id: &str, slug: &str, blocks: Value) -> Value {
    json!({
        "_id": id,
        "_type": "genericPage",
        "_updatedAt": "2026-09-01T10:00:00Z",
        "title": slug,
        "slug": {"_type": "slug", "current": slug},
        "seo": {"title": format!("{slug} page"), "description": "", "image": null, "noIndex": false},
        "pageBuilder": blocks
    })
}

/// The home page singleton.
pub fn home_page(blocks: Value) -> Value {
    json!({
        "_id": "homePage",
        "_type": "homePage",
        "_updatedAt": "2026-09-02T10:00:00Z",
        "seo": {"title": "Welcome", "description": "A studio", "image": null, "noIndex": false},
        "pageBuilder": blocks
    })
}

/// An internal navigation link to a resolved page.
pub fn internal_link(label: &str, slug: &str) -> Value {
    json!({
        "_key": format!("link-{slug}"),
        "_type": "navigationLink",
        "label": label,
        "linkType": "internal",
        "page": {"_id": format!("page-{slug}"), "_type": "genericPage", "slug": slug}
    })
}

/// An external navigation link.
pub fn external_link(label: &str, url: &str) -> Value {
    json!({
        "_type": "navigationLink",
        "label": label,
        "linkType": "external",
        "url": url
    })
}

/// A redirect document as returned by the redirects query.
pub fn redirect(source: &str, destination: &str, permanent: Option<bool>) -> Value {
    json!({"source": source, "destination": destination, "permanent": permanent})
}

/// Global settings with every required field present.
pub fn global_settings() -> Value {
    json!({
        "_id": "globalSettings",
        "_type": "globalSettings",
        "companyName": "Test Studio",
        "contactInfo": {"phone": "+45 12 34 56 78", "email": "hello@studio.example"},
        "address": {"streetName": "Main Street", "streetNumber": "12", "zipCode": "1000", "city": "Copenhagen"},
        "copyright": "Test Studio ApS",
        "vatNumberObject": {"vatNumberHeading": "CVR", "vatNumber": "12345678"}
    })
}
