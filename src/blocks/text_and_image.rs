//! A heading beside an image, image on either side.

use super::{BlockDefinition, ContentBlock, FieldProjection, Resolution, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::ImageField;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "textAndImage",
    title: "Text and image",
    projection: &[FieldProjection {
        field: "image",
        resolution: Resolution::Image,
    }],
    render,
    structured_data,
    schema,
};

const ORIENTATIONS: &[&str] = &["imageLeft", "imageRight"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextAndImage {
    pub orientation: Option<String>,
    pub title: Option<String>,
    pub image: Option<ImageField>,
}

impl TextAndImage {
    /// `imageLeft` or `imageRight`; anything else is `imageRight`.
    pub fn orientation(&self) -> &str {
        match self.orientation.as_deref() {
            Some("imageLeft") => "imageLeft",
            _ => "imageRight",
        }
    }
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: TextAndImage = block.fields_as();
    html! {
        section.module.module--text-and-image data-orientation=(fields.orientation()) {
            div.container.split {
                div.split-text {
                    (components::heading(2, text(&fields.title)))
                }
                div.split-media {
                    (components::image(ctx.images, fields.image.as_ref(), 900, Some("portrait")))
                }
            }
        }
    }
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let fields: TextAndImage = block.fields_as();
    let image_url = fields.image.as_ref().and_then(|i| ctx.images.source_url(i));
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .part_of_page()
        .maybe("image", jsonld::image_object(fields.image.as_ref(), image_url))
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("orientation", "Image placement", FieldType::String).one_of(ORIENTATIONS))
        .field(FieldSchema::new("title", "Title", FieldType::Text))
        .field(FieldSchema::new("image", "Image", FieldType::Object("imageFieldType")))
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
