//! Price list: columns of priced items.

use super::{BlockDefinition, ContentBlock, lenient_vec, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "priceListModule",
    title: "Price list",
    projection: &[],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PriceListModule {
    pub title: Option<String>,
    pub subtitle: Option<Value>,
    #[serde(deserialize_with = "lenient_vec")]
    pub columns: Vec<PriceColumn>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriceColumn {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub price_items: Vec<PriceItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PriceItem {
    pub title: Option<String>,
    /// The price, or a price with a short note.
    pub description: Option<String>,
}

impl PriceColumn {
    /// `"<column description> - <item>: <price>; <item>: <price>"`, skipping
    /// whatever is missing.
    pub fn summary(&self) -> Option<String> {
        let prices = self
            .price_items
            .iter()
            .filter_map(|item| Some(format!("{}: {}", text(&item.title)?, text(&item.description)?)))
            .collect::<Vec<_>>()
            .join("; ");
        let parts: Vec<&str> = [text(&self.description), Some(prices.as_str())]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" - "))
    }
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: PriceListModule = block.fields_as();
    components::section(
        DEFINITION.name,
        None,
        html! {
            div.intro {
                (components::heading(2, text(&fields.title)))
                @if !portable_text::is_empty(fields.subtitle.as_ref()) {
                    div.rich-text {
                        (portable_text::render(fields.subtitle.as_ref(), RichTextOptions::NO_IMAGES, ctx.images))
                    }
                }
            }
            @if !fields.columns.is_empty() {
                div.columns style={ "--columns: " (fields.columns.len()) } {
                    @for column in &fields.columns {
                        div.column.price-column {
                            (components::heading(3, text(&column.title)))
                            (components::paragraph(text(&column.description)))
                            @if !column.price_items.is_empty() {
                                dl.price-items {
                                    @for item in &column.price_items {
                                        div.price-item {
                                            dt { (text(&item.title).unwrap_or_default()) }
                                            dd { (text(&item.description).unwrap_or_default()) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: PriceListModule = block.fields_as();
    let items = jsonld::list_items(
        fields
            .columns
            .iter()
            .filter(|c| text(&c.title).is_some() || text(&c.description).is_some())
            .map(|c| {
                JsonLd::node("ListItem")
                    .maybe("name", text(&c.title))
                    .maybe("description", c.summary())
            }),
    );
    JsonLd::entity("ItemList", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .non_empty("itemListElement", items)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("subtitle", "Subtitle", FieldType::RichTextNoImages))
        .field(
            FieldSchema::new("columns", "Prices", FieldType::Array)
                .min_items(1, "At least 1 price is required"),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
