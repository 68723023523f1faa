//! JSON-LD structured data.
//!
//! Every rendered block carries a `<script type="application/ld+json">`
//! describing it as a schema.org entity. Fragments are plain
//! [`serde_json::Value`] objects assembled through [`JsonLd`], which drops
//! absent values so the output never contains `null`.

use crate::link::NavigationLink;
use crate::types::{ImageField, Seo};
use maud::{Markup, PreEscaped, html};
use serde_json::{Map, Value, json};

pub const CONTEXT: &str = "https://schema.org";
/// `@id` of the page-level `WebPage` entity that block fragments point at.
pub const WEB_PAGE_ID: &str = "#webpage";

/// `camelCase` → `kebab-case`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Fragment id of a block: `#<block-type-kebab>-<key>`, or `-primary` when
/// the block has no key.
pub fn structured_data_id(block_type: &str, key: Option<&str>) -> String {
    let key = key.filter(|k| !k.is_empty()).unwrap_or("primary");
    format!("#{}-{}", kebab_case(block_type), key)
}

/// Builder for a JSON-LD object.
#[derive(Debug, Clone)]
pub struct JsonLd {
    map: Map<String, Value>,
}

impl JsonLd {
    /// A top-level entity with `@context`, `@type` and `@id`.
    pub fn entity(schema_type: &str, id: String) -> Self {
        let mut map = Map::new();
        map.insert("@context".into(), json!(CONTEXT));
        map.insert("@type".into(), json!(schema_type));
        map.insert("@id".into(), json!(id));
        Self { map }
    }

    /// A nested node with only `@type`.
    pub fn node(schema_type: &str) -> Self {
        let mut map = Map::new();
        map.insert("@type".into(), json!(schema_type));
        Self { map }
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    /// Set `key` only when `value` is present. Empty strings count as absent.
    pub fn maybe(mut self, key: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(v) = value.map(Into::into)
            && !v.is_null()
            && v.as_str() != Some("")
        {
            self.map.insert(key.into(), v);
        }
        self
    }

    /// Set an array only when it is non-empty.
    pub fn non_empty(mut self, key: &str, values: Vec<Value>) -> Self {
        if !values.is_empty() {
            self.map.insert(key.into(), Value::Array(values));
        }
        self
    }

    /// `isPartOf` and `mainEntityOfPage` pointing at the page entity.
    pub fn part_of_page(self) -> Self {
        self.set("isPartOf", json!({ "@id": WEB_PAGE_ID }))
            .set("mainEntityOfPage", json!({ "@id": WEB_PAGE_ID }))
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}

impl From<JsonLd> for Value {
    fn from(ld: JsonLd) -> Self {
        ld.build()
    }
}

/// `ImageObject` for an image with both a URL and alt text.
pub fn image_object(image: Option<&ImageField>, url: Option<String>) -> Option<Value> {
    let alt = image?.alt_text()?;
    let url = url?;
    Some(
        JsonLd::node("ImageObject")
            .set("contentUrl", url.clone())
            .set("url", url)
            .set("caption", alt)
            .set("alternateName", alt)
            .build(),
    )
}

/// `ReadAction` for a link with both an href and a label.
pub fn read_action(link: &NavigationLink) -> Option<Value> {
    let label = link.label.as_deref()?;
    let href = link.href();
    Some(
        JsonLd::node("ReadAction")
            .set("name", label)
            .set(
                "target",
                JsonLd::node("EntryPoint").set("urlTemplate", href).build(),
            )
            .build(),
    )
}

/// Number `ListItem` nodes from 1, in order.
pub fn list_items(items: impl IntoIterator<Item = JsonLd>) -> Vec<Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.set("position", i + 1).build())
        .collect()
}

/// Page-level `WebPage` entity.
pub fn web_page(seo: &Seo, url: &str, site_name: &str) -> Value {
    JsonLd::node("WebPage")
        .set("@context", CONTEXT)
        .set("@id", WEB_PAGE_ID)
        .set("url", url)
        .maybe("name", seo.title.clone())
        .maybe("description", seo.description.clone())
        .set(
            "isPartOf",
            JsonLd::node("WebSite").set("name", site_name).build(),
        )
        .build()
}

/// Serialize a fragment for inline embedding. `</` is escaped so content
/// can never close the surrounding script element.
pub fn to_script_body(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

pub fn script(value: &Value) -> Markup {
    html! {
        script type="application/ld+json" { (PreEscaped(to_script_body(value))) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{LinkType, NavigationLink};
    use crate::types::ImageAsset;

    #[test]
    fn kebab_case_splits_on_capitals() {
        assert_eq!(kebab_case("textAndLinkBlock"), "text-and-link-block");
        assert_eq!(kebab_case("ctaBlock"), "cta-block");
        assert_eq!(kebab_case("hero"), "hero");
    }

    #[test]
    fn id_uses_key_or_primary() {
        assert_eq!(structured_data_id("quoteModule", Some("k1")), "#quote-module-k1");
        assert_eq!(structured_data_id("quoteModule", None), "#quote-module-primary");
        assert_eq!(structured_data_id("quoteModule", Some("")), "#quote-module-primary");
    }

    #[test]
    fn maybe_omits_absent_and_empty() {
        let value = JsonLd::node("Thing")
            .maybe("name", None::<String>)
            .maybe("text", Some(""))
            .maybe("description", Some("here"))
            .build();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("name"));
        assert!(!obj.contains_key("text"));
        assert_eq!(obj["description"], "here");
    }

    #[test]
    fn image_object_requires_alt_and_url() {
        let image = ImageField {
            alt: Some("Hall".into()),
            asset: Some(ImageAsset::default()),
        };
        assert!(image_object(Some(&image), None).is_none());
        assert!(image_object(Some(&ImageField::default()), Some("u".into())).is_none());
        let obj = image_object(Some(&image), Some("https://cdn/x.jpg".into())).unwrap();
        assert_eq!(obj["@type"], "ImageObject");
        assert_eq!(obj["caption"], "Hall");
    }

    #[test]
    fn read_action_requires_label() {
        let mut link = NavigationLink {
            key: None,
            label: None,
            link_type: Some(LinkType::External),
            url: Some("https://x.example".into()),
            page: None,
        };
        assert!(read_action(&link).is_none());
        link.label = Some("Book".into());
        let action = read_action(&link).unwrap();
        assert_eq!(action["target"]["urlTemplate"], "https://x.example");
    }

    #[test]
    fn list_items_are_numbered_from_one() {
        let items = list_items(vec![
            JsonLd::node("ListItem").set("name", "a"),
            JsonLd::node("ListItem").set("name", "b"),
        ]);
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[1]["position"], 2);
    }

    #[test]
    fn script_escapes_closing_tags() {
        let value = json!({"text": "</script><script>alert(1)</script>"});
        let html = script(&value).into_string();
        assert!(!html.contains("</script><script>"));
        assert!(html.contains("<\\/script>"));
        assert!(html.starts_with("<script type=\"application/ld+json\">"));
    }
}
