//! A titled gallery of images.

use super::{BlockDefinition, ContentBlock, FieldProjection, Resolution, lenient_vec, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::ImageField;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "imageGrid",
    title: "Image grid",
    projection: &[FieldProjection {
        field: "images",
        resolution: Resolution::ImageArray,
    }],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageGrid {
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub images: Vec<ImageField>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: ImageGrid = block.fields_as();
    components::section(
        DEFINITION.name,
        None,
        html! {
            (components::heading(2, text(&fields.title)))
            div.image-grid {
                @for image in &fields.images {
                    (components::image(ctx.images, Some(image), 600, None))
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let fields: ImageGrid = block.fields_as();
    let items = jsonld::list_items(
        fields
            .images
            .iter()
            .filter(|image| image.asset.is_some() && image.alt_text().is_some())
            .map(|image| {
                JsonLd::node("ListItem")
                    .maybe("name", image.alt_text())
                    .maybe(
                        "image",
                        jsonld::image_object(Some(image), ctx.images.source_url(image)),
                    )
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
        .field(
            FieldSchema::new("images", "Images", FieldType::ArrayOf("imageFieldType"))
                .min_items(1, "At least 1 image is required"),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
