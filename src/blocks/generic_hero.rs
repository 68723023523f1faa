//! Hero at the top of a content page: title over an image.

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
    name: "genericHero",
    title: "Hero",
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
pub struct GenericHero {
    pub title: Option<String>,
    pub image: Option<ImageField>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let hero: GenericHero = block.fields_as();
    html! {
        section.hero.hero--generic {
            div.hero-media {
                (components::image(ctx.images, hero.image.as_ref(), 1920, Some("hero-image")))
                div.hero-overlay {}
            }
            div.container.hero-content {
                (components::heading(1, text(&hero.title)))
            }
        }
    }
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let hero: GenericHero = block.fields_as();
    let image_url = hero.image.as_ref().and_then(|i| ctx.images.source_url(i));
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .maybe("identifier", block.key())
        .set("name", DEFINITION.name_or_title(text(&hero.title)))
        .set("description", DEFINITION.describe(text(&hero.title)))
        .part_of_page()
        .maybe("image", jsonld::image_object(hero.image.as_ref(), image_url))
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String).required())
        .field(FieldSchema::new("image", "Image", FieldType::Object("imageFieldType")).required())
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
    fn renders_title_and_image() {
        let site = TestSite::new();
        let html = render(
            &block(json!({
                "_type": "genericHero",
                "_key": "g",
                "title": "About us",
                "image": {"alt": "Team", "asset": {"_ref": "image-abc-1200x800-jpg"}}
            })),
            &site.ctx(),
        )
        .into_string();
        assert!(html.contains("<h1 class=\"heading\">About us</h1>"));
        assert!(html.contains("alt=\"Team\""));
        assert!(html.contains("cdn.sanity.io/images/"));
    }

    #[test]
    fn image_without_alt_is_not_rendered_or_described() {
        let site = TestSite::new();
        let hero = block(json!({
            "_type": "genericHero",
            "_key": "g",
            "image": {"asset": {"_ref": "image-abc-1200x800-jpg"}}
        }));
        assert!(!render(&hero, &site.ctx()).into_string().contains("<img"));
        let data = structured_data(&hero, &site.ctx());
        assert!(data.get("image").is_none());
        assert_eq!(data["identifier"], "g");
        assert_eq!(data["@id"], "#generic-hero-g");
    }
}
