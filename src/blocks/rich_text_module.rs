//! Free-form rich text under an optional title.

use super::{BlockDefinition, ContentBlock, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::JsonLd;
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "richTextModule",
    title: "Text module",
    projection: &[],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RichTextModule {
    pub title: Option<String>,
    pub description: Option<Value>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: RichTextModule = block.fields_as();
    components::section(
        DEFINITION.name,
        None,
        html! {
            div.narrow {
                (components::heading(2, text(&fields.title)))
                div.rich-text {
                    (portable_text::render(fields.description.as_ref(), RichTextOptions::WITH_IMAGES, ctx.images))
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: RichTextModule = block.fields_as();
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .part_of_page()
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Text", FieldType::RichText))
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
