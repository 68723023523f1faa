//! Call to action: title, short rich text and a button beside an image.

use super::feature_list::BUTTON_TYPES;
use super::{BlockDefinition, ContentBlock, FieldProjection, Resolution, text};
use crate::components::{self, ButtonVariant};
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::link::normalize_value;
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::ImageField;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "ctaBlock",
    title: "CTA block",
    projection: &[
        FieldProjection {
            field: "image",
            resolution: Resolution::Image,
        },
        FieldProjection {
            field: "link",
            resolution: Resolution::Link,
        },
    ],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaBlock {
    pub title: Option<String>,
    pub description: Option<Value>,
    pub image: Option<ImageField>,
    pub link: Option<Value>,
    pub button_type: Option<String>,
    pub image_position: Option<String>,
}

impl CtaBlock {
    /// `left` or `right`; defaults to `right`.
    pub fn image_position(&self) -> &str {
        match self.image_position.as_deref() {
            Some("left") => "left",
            _ => "right",
        }
    }
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: CtaBlock = block.fields_as();
    let link = normalize_value(fields.link.as_ref());
    let modifier = format!("image-{}", fields.image_position());
    components::section(
        DEFINITION.name,
        Some(&modifier),
        html! {
            div.split {
                div.split-text {
                    (components::heading(2, text(&fields.title)))
                    @if !portable_text::is_empty(fields.description.as_ref()) {
                        div.rich-text {
                            (portable_text::render(fields.description.as_ref(), RichTextOptions::NO_IMAGES, ctx.images))
                        }
                    }
                    @if let Some(link) = &link {
                        (components::button(link, ButtonVariant::parse(fields.button_type.as_deref())))
                    }
                }
                div.split-media {
                    (components::image(ctx.images, fields.image.as_ref(), 900, None))
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let fields: CtaBlock = block.fields_as();
    let image_url = fields.image.as_ref().and_then(|i| ctx.images.source_url(i));
    let action = normalize_value(fields.link.as_ref()).and_then(|l| jsonld::read_action(&l));
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .part_of_page()
        .maybe("image", jsonld::image_object(fields.image.as_ref(), image_url))
        .maybe("potentialAction", action)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Description", FieldType::RichTextNoImages))
        .field(FieldSchema::new("image", "Image", FieldType::Object("imageFieldType")))
        .field(FieldSchema::new("link", "Button link", FieldType::Object("navigationLink")))
        .field(FieldSchema::new("buttonType", "Button type", FieldType::String).one_of(BUTTON_TYPES))
        .field(
            FieldSchema::new("imagePosition", "Image placement", FieldType::String)
                .one_of(&["left", "right"]),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestSite, block};
    use serde_json::json;

    #[test]
    fn image_position_modifier() {
        let site = TestSite::new();
        let html = render(&block(json!({"_type": "ctaBlock", "imagePosition": "left"})), &site.ctx())
            .into_string();
        assert!(html.contains("module--image-left"));
        let html = render(&block(json!({"_type": "ctaBlock"})), &site.ctx()).into_string();
        assert!(html.contains("module--image-right"));
    }

    #[test]
    fn rich_text_drops_images() {
        let site = TestSite::new();
        let html = render(
            &block(json!({
                "_type": "ctaBlock",
                "description": [
                    {"_type": "block", "children": [{"_type": "span", "text": "Join"}]},
                    {"_type": "imageFieldType", "alt": "x", "asset": {"_ref": "image-a-1x1-png"}}
                ]
            })),
            &site.ctx(),
        )
        .into_string();
        assert!(html.contains("<p>Join</p>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn structured_data_action() {
        let site = TestSite::new();
        let data = structured_data(
            &block(json!({
                "_type": "ctaBlock",
                "_key": "c",
                "title": "Start",
                "link": {"label": "Sign up", "linkType": "internal", "page": {"_id": "p", "slug": "signup"}}
            })),
            &site.ctx(),
        );
        assert_eq!(data["@id"], "#cta-block-c");
        assert_eq!(data["description"], "CTA block: Start");
        assert_eq!(data["potentialAction"]["target"]["urlTemplate"], "/signup");
    }
}
