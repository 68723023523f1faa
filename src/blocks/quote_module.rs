//! A pull quote with optional title and author.

use super::{BlockDefinition, ContentBlock, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::JsonLd;
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "quoteModule",
    title: "Quote",
    projection: &[],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuoteModule {
    pub title: Option<String>,
    pub quote: Option<String>,
    pub author: Option<String>,
}

fn render(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Markup {
    let fields: QuoteModule = block.fields_as();
    html! {
        section.module.module--quote-module {
            div.container.narrow {
                (components::heading(2, text(&fields.title)))
                @if let Some(quote) = text(&fields.quote) {
                    figure.quote {
                        blockquote { (components::paragraph(Some(quote))) }
                        @if let Some(author) = text(&fields.author) {
                            figcaption { (author) }
                        }
                    }
                }
            }
        }
    }
}

/// A `Quotation` carries only what the editor filled in: no name fallback.
fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: QuoteModule = block.fields_as();
    let author = text(&fields.author).map(|name| JsonLd::node("Person").set("name", name).build());
    JsonLd::entity("Quotation", block.structured_data_id())
        .maybe("name", text(&fields.title))
        .maybe("text", text(&fields.quote))
        .maybe("author", author)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("quote", "Quote", FieldType::Text))
        .field(FieldSchema::new("author", "Author", FieldType::String))
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
