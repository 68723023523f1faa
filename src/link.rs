//! Navigation link normalization.
//!
//! A `navigationLink` arrives from the CMS in one of two shapes depending on
//! which query produced it:
//!
//! - **Resolved**: the query dereferenced the page, `{_id, _type, slug}`
//! - **Reference stub**: the raw field was passed through unprojected,
//!   `{_ref, _type: "reference", _weak}`
//!
//! [`normalize_links`] converges both on a single [`NavigationLink`] whose
//! page is always `{_ref, _type: "reference", _weak, slug?}`. Normalizing an
//! already-normalized link is a no-op, so links can be normalized wherever
//! they are consumed without tracking whether it already happened.
//!
//! Nothing here fails. Fields that are missing, `null`, empty, or of the
//! wrong JSON type are treated as not provided.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// The page side of a raw link, in either of its two CMS shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPageRef {
    Resolved {
        #[serde(rename = "_id")]
        id: String,
        #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
        doc_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slug: Option<String>,
    },
    Reference {
        #[serde(rename = "_ref")]
        reference: String,
        #[serde(rename = "_weak", default, skip_serializing_if = "Option::is_none")]
        weak: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slug: Option<String>,
    },
}

/// A link record as received from the CMS.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawNavigationLink {
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "linkType", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<RawPageRef>,
}

impl RawNavigationLink {
    /// Read a link out of arbitrary JSON. Never fails: anything that does not
    /// look like a link field is dropped.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let text = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            key: text("_key"),
            label: text("label"),
            link_type: obj
                .get("linkType")
                .and_then(Value::as_str)
                .and_then(LinkType::parse),
            url: text("url"),
            page: obj
                .get("page")
                .filter(|p| p.is_object())
                .and_then(|p| serde_json::from_value(p.clone()).ok()),
        }
    }
}

impl<'de> Deserialize<'de> for RawNavigationLink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// A page reference in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReference {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(rename = "_type")]
    pub ref_type: String,
    #[serde(rename = "_weak")]
    pub weak: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// A link in canonical form, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLink {
    #[serde(rename = "_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "linkType", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageReference>,
}

impl NavigationLink {
    /// The link destination.
    ///
    /// `/<slug>` for an internal link whose page slug is known, otherwise the
    /// URL, otherwise `/`. An internal link to a deleted or unpublished page
    /// therefore degrades to the home page instead of failing.
    pub fn href(&self) -> String {
        if self.link_type == Some(LinkType::Internal)
            && let Some(slug) = self
                .page
                .as_ref()
                .and_then(|p| p.slug.as_deref())
                .filter(|s| !s.is_empty())
        {
            return format!("/{}", slug.trim_start_matches('/'));
        }
        self.url.clone().unwrap_or_else(|| "/".to_string())
    }

    /// Whether the rendered anchor should open in a new tab.
    pub fn is_external(&self) -> bool {
        self.link_type == Some(LinkType::External) && self.url.is_some()
    }
}

/// Normalize one raw link.
pub fn normalize_link(raw: &RawNavigationLink) -> NavigationLink {
    let page = raw.page.as_ref().map(|page| match page {
        RawPageRef::Resolved { id, slug, .. } => PageReference {
            reference: id.clone(),
            ref_type: "reference".to_string(),
            weak: false,
            slug: slug.clone().filter(|s| !s.is_empty()),
        },
        RawPageRef::Reference {
            reference,
            weak,
            slug,
        } => PageReference {
            reference: reference.clone(),
            ref_type: "reference".to_string(),
            weak: weak.unwrap_or(false),
            slug: slug.clone().filter(|s| !s.is_empty()),
        },
    });
    NavigationLink {
        key: raw.key.clone(),
        label: raw.label.clone(),
        link_type: raw.link_type,
        url: raw.url.clone(),
        page,
    }
}

/// Normalize a link list, preserving order. Absent input yields no links.
pub fn normalize_links(links: Option<&[RawNavigationLink]>) -> Vec<NavigationLink> {
    links
        .unwrap_or_default()
        .iter()
        .map(normalize_link)
        .collect()
}

/// Normalize a single link field of a block (`link: navigationLink`).
pub fn normalize_value(value: Option<&Value>) -> Option<NavigationLink> {
    value
        .filter(|v| v.is_object())
        .map(|v| normalize_link(&RawNavigationLink::from_value(v)))
}
