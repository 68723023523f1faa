//! Titled list of title/description items next to an image.

use super::{BlockDefinition, ContentBlock, FieldProjection, Item, Resolution, lenient_vec, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::ImageField;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "listModule",
    title: "List module",
    projection: &[FieldProjection {
        field: "image",
        resolution: Resolution::Image,
    }],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListModule {
    pub title: Option<String>,
    pub image: Option<ImageField>,
    #[serde(deserialize_with = "lenient_vec")]
    pub items: Vec<Item>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: ListModule = block.fields_as();
    html! {
        section.module.module--list-module {
            div.container.split {
                div.split-text {
                    (components::heading(2, text(&fields.title)))
                    @if !fields.items.is_empty() {
                        ol.item-list {
                            @for item in &fields.items {
                                li {
                                    (components::heading(3, text(&item.title)))
                                    (components::paragraph(text(&item.description)))
                                }
                            }
                        }
                    }
                }
                div.split-media {
                    (components::image(ctx.images, fields.image.as_ref(), 900, None))
                }
            }
        }
    }
}

/// `ListItem`s for items with both a title and a description.
pub(crate) fn complete_items(items: &[Item]) -> Vec<Value> {
    jsonld::list_items(items.iter().filter_map(|item| {
        let (title, description) = (text(&item.title)?, text(&item.description)?);
        Some(
            JsonLd::node("ListItem")
                .set("name", title)
                .set("description", description),
        )
    }))
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let fields: ListModule = block.fields_as();
    let image_url = fields.image.as_ref().and_then(|i| ctx.images.source_url(i));
    JsonLd::entity("ItemList", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .maybe("image", jsonld::image_object(fields.image.as_ref(), image_url))
        .non_empty("itemListElement", complete_items(&fields.items))
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("image", "Image", FieldType::Object("imageFieldType")))
        .field(
            FieldSchema::new("items", "Items", FieldType::Array)
                .min_items(1, "At least 1 list item is required"),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
