//! Page-builder dispatch.
//!
//! Renders a page's block list in order. Each block is looked up in the
//! site's [`BlockRegistry`] by `_type`; known blocks are rendered, wrapped in
//! an element the visual editor can target, and followed by their JSON-LD.
//! Anything else becomes a visible placeholder and rendering carries on.
//!
//! ```html
//! <main data-sanity="id=homePage;type=homePage;path=pageBuilder">
//!   <div class="wrapper" data-sanity="id=homePage;type=homePage;path=content[_key==&quot;a1&quot;]" data-key="a1">
//!     <section class="module module--quote-module">...</section>
//!     <script type="application/ld+json">{...}</script>
//!   </div>
//!   <div class="block-missing" data-key="b2">Block not found: legacyBanner</div>
//! </main>
//! ```

use crate::blocks::{ContentBlock, coerce_blocks};
use crate::context::RenderContext;
use crate::jsonld;
use maud::{Markup, html};
use serde_json::Value;
use tracing::warn;

/// The document a block list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef<'a> {
    pub id: &'a str,
    pub doc_type: &'a str,
}

/// Rendered block list plus what the page layout reports about it.
#[derive(Debug, Clone)]
pub struct PageBuilderOutput {
    pub markup: Markup,
    /// JSON-LD of every rendered block, in block order.
    pub structured_data: Vec<Value>,
    /// Types of blocks rendered as placeholders, in block order.
    pub missing: Vec<String>,
}

/// Editor path of one block.
pub fn block_path(block: &ContentBlock, index: usize) -> String {
    match block.key() {
        Some(key) => format!("content[_key==\"{key}\"]"),
        None => format!("content[{index}]"),
    }
}

/// `data-sanity` value: `id=<id>;type=<type>;path=<path>`, plus
/// `;base=<studio>` when a studio URL is configured.
pub fn editor_attribute(document: DocumentRef<'_>, path: &str, studio_url: Option<&str>) -> String {
    let mut attribute = format!("id={};type={};path={path}", document.id, document.doc_type);
    if let Some(base) = studio_url.filter(|s| !s.is_empty()) {
        attribute.push_str(";base=");
        attribute.extend(url::form_urlencoded::byte_serialize(base.as_bytes()));
    }
    attribute
}

fn placeholder(block: &ContentBlock) -> Markup {
    html! {
        div.block-missing data-key=[block.key()] {
            "Block not found: " (block.block_type)
        }
    }
}

/// Render `blocks` as received. Anything that is not an array renders an
/// empty `<main>`.
pub fn render_page_builder(
    blocks: &Value,
    document: DocumentRef<'_>,
    ctx: &RenderContext<'_>,
) -> PageBuilderOutput {
    let blocks = coerce_blocks(blocks);
    let mut structured_data = Vec::new();
    let mut missing = Vec::new();
    let mut rendered = Vec::with_capacity(blocks.len());

    for (index, block) in &blocks {
        let Some(definition) = ctx.registry.lookup(&block.block_type) else {
            warn!(
                document = document.id,
                block_type = %block.block_type,
                key = block.key().unwrap_or("-"),
                "no renderer for block, rendering placeholder"
            );
            missing.push(block.block_type.clone());
            rendered.push(placeholder(block));
            continue;
        };
        let data = (definition.structured_data)(block, ctx);
        let attribute = editor_attribute(document, &block_path(block, *index), ctx.studio_url);
        rendered.push(html! {
            div.wrapper data-sanity=(attribute) data-key=[block.key()] {
                ((definition.render)(block, ctx))
                @if data.is_object() {
                    (jsonld::script(&data))
                }
            }
        });
        if data.is_object() {
            structured_data.push(data);
        }
    }

    let main_attribute = editor_attribute(document, "pageBuilder", ctx.studio_url);
    PageBuilderOutput {
        markup: html! {
            main data-sanity=(main_attribute) {
                @for block in &rendered {
                    (block)
                }
            }
        },
        structured_data,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockRegistry;
    use crate::test_helpers::TestSite;
    use serde_json::json;

    const HOME: DocumentRef<'static> = DocumentRef {
        id: "homePage",
        doc_type: "homePage",
    };

    fn blocks() -> Value {
        json!([
            {"_type": "quoteModule", "_key": "q1", "quote": "First"},
            {"_type": "legacyBanner", "_key": "x1"},
            {"_type": "genericHero", "_key": "h1", "title": "Second"},
            {"_type": "quoteModule", "_key": "q2", "quote": "Third"}
        ])
    }

    #[test]
    fn preserves_block_order() {
        let site = TestSite::new();
        let html = render_page_builder(&blocks(), HOME, &site.ctx()).markup.into_string();
        let first = html.find("First").unwrap();
        let missing = html.find("Block not found: legacyBanner").unwrap();
        let second = html.find("Second").unwrap();
        let third = html.find("Third").unwrap();
        assert!(first < missing && missing < second && second < third);
    }

    #[test]
    fn unknown_block_renders_placeholder_others_render() {
        let site = TestSite::new();
        let output = render_page_builder(&blocks(), HOME, &site.ctx());
        let html = output.markup.into_string();
        assert_eq!(output.missing, vec!["legacyBanner"]);
        assert!(html.contains(r#"<div class="block-missing" data-key="x1">Block not found: legacyBanner</div>"#));
        assert_eq!(html.matches("class=\"wrapper\"").count(), 3);
        assert_eq!(output.structured_data.len(), 3);
    }

    #[test]
    fn wrappers_carry_editor_attributes() {
        let site = TestSite::new();
        let html = render_page_builder(&blocks(), HOME, &site.ctx()).markup.into_string();
        assert!(html.starts_with(r#"<main data-sanity="id=homePage;type=homePage;path=pageBuilder">"#));
        assert!(html.contains(
            r#"data-sanity="id=homePage;type=homePage;path=content[_key==&quot;h1&quot;]" data-key="h1""#
        ));
    }

    #[test]
    fn structured_data_ids_are_unique_per_key() {
        let site = TestSite::new();
        let output = render_page_builder(
            &json!([
                {"_type": "quoteModule", "_key": "a"},
                {"_type": "quoteModule", "_key": "b"},
                {"_type": "quoteModule"}
            ]),
            HOME,
            &site.ctx(),
        );
        let ids: Vec<&str> = output
            .structured_data
            .iter()
            .map(|d| d["@id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["#quote-module-a", "#quote-module-b", "#quote-module-primary"]);
    }

    #[test]
    fn keyless_block_uses_index_path() {
        let site = TestSite::new();
        let html = render_page_builder(
            &json!([{"_type": "quoteModule", "quote": "Hi"}]),
            HOME,
            &site.ctx(),
        )
        .markup
        .into_string();
        assert!(html.contains("path=content[0]"));
        assert!(!html.contains("data-key"));
    }

    #[test]
    fn keyless_block_path_counts_skipped_members() {
        let site = TestSite::new();
        let html = render_page_builder(
            &json!([5, {"_type": "quoteModule", "quote": "Hi"}]),
            HOME,
            &site.ctx(),
        )
        .markup
        .into_string();
        assert!(html.contains("path=content[1]"));
        assert!(!html.contains("path=content[0]"));
    }

    #[test]
    fn disabled_module_renders_placeholder() {
        let mut site = TestSite::new();
        site.registry = BlockRegistry::with_modules(&["genericHero".to_string()]);
        let output = render_page_builder(&blocks(), HOME, &site.ctx());
        assert_eq!(output.missing, vec!["quoteModule", "legacyBanner", "quoteModule"]);
        assert_eq!(output.structured_data.len(), 1);
    }

    #[test]
    fn non_array_renders_empty_main() {
        let site = TestSite::new();
        for value in [Value::Null, json!({"_type": "quoteModule"}), json!("x")] {
            let output = render_page_builder(&value, HOME, &site.ctx());
            assert_eq!(
                output.markup.into_string(),
                r#"<main data-sanity="id=homePage;type=homePage;path=pageBuilder"></main>"#
            );
        }
    }

    #[test]
    fn studio_url_is_appended() {
        assert_eq!(
            editor_attribute(HOME, "pageBuilder", Some("https://studio.example/admin")),
            "id=homePage;type=homePage;path=pageBuilder;base=https%3A%2F%2Fstudio.example%2Fadmin"
        );
        assert_eq!(
            editor_attribute(HOME, "pageBuilder", Some("")),
            "id=homePage;type=homePage;path=pageBuilder"
        );
    }
}
