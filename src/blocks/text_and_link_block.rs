//! Heading and rich text with a single call-to-action link.

use super::{BlockDefinition, ContentBlock, FieldProjection, Resolution, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::link::normalize_value;
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "textAndLinkBlock",
    title: "Text and link block",
    projection: &[FieldProjection {
        field: "link",
        resolution: Resolution::Link,
    }],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextAndLinkBlock {
    pub title: Option<String>,
    pub description: Option<Value>,
    pub link: Option<Value>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: TextAndLinkBlock = block.fields_as();
    let link = normalize_value(fields.link.as_ref());
    html! {
        section.module.module--text-and-link-block {
            div.container.narrow {
                (components::heading(2, text(&fields.title)))
                @if !portable_text::is_empty(fields.description.as_ref()) {
                    div.rich-text {
                        (portable_text::render(fields.description.as_ref(), RichTextOptions::WITH_IMAGES, ctx.images))
                    }
                }
                @if let Some(link) = &link {
                    (components::text_link(link))
                }
            }
        }
    }
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: TextAndLinkBlock = block.fields_as();
    let action = normalize_value(fields.link.as_ref()).and_then(|l| jsonld::read_action(&l));
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .part_of_page()
        .maybe("potentialAction", action)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Description", FieldType::RichText))
        .field(FieldSchema::new("link", "Link", FieldType::Object("navigationLink")))
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
