//! Full-bleed hero at the top of the home page: background image, title,
//! description and up to two buttons.

use super::{BlockDefinition, ContentBlock, FieldProjection, Resolution, lenient_vec, text};
use crate::components::{self, ButtonVariant};
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::link::{RawNavigationLink, normalize_links};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::ImageField;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "homepageHero",
    title: "Homepage hero",
    projection: &[
        FieldProjection {
            field: "image",
            resolution: Resolution::Image,
        },
        FieldProjection {
            field: "buttons",
            resolution: Resolution::LinkArray,
        },
    ],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HomepageHero {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageField>,
    #[serde(deserialize_with = "lenient_vec")]
    pub buttons: Vec<RawNavigationLink>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let hero: HomepageHero = block.fields_as();
    let buttons = normalize_links(Some(hero.buttons.as_slice()));
    html! {
        section.hero.hero--home {
            div.hero-media {
                (components::image(ctx.images, hero.image.as_ref(), 1920, Some("hero-image")))
                div.hero-overlay {}
            }
            div.container.hero-content {
                (components::heading(1, text(&hero.title)))
                (components::paragraph(text(&hero.description)))
                @if !buttons.is_empty() {
                    div.button-row {
                        @for (i, button) in buttons.iter().enumerate() {
                            @let variant = if i == 0 { ButtonVariant::Primary } else { ButtonVariant::Secondary };
                            (components::button(button, variant))
                        }
                    }
                }
            }
        }
    }
}

fn structured_data(block: &ContentBlock, ctx: &RenderContext<'_>) -> Value {
    let hero: HomepageHero = block.fields_as();
    let image_url = hero.image.as_ref().and_then(|i| ctx.images.source_url(i));
    let actions = normalize_links(Some(hero.buttons.as_slice()))
        .iter()
        .filter_map(jsonld::read_action)
        .collect();
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&hero.title)))
        .set(
            "description",
            text(&hero.description)
                .map(str::to_string)
                .unwrap_or_else(|| DEFINITION.describe(text(&hero.title))),
        )
        .part_of_page()
        .maybe("image", jsonld::image_object(hero.image.as_ref(), image_url))
        .non_empty("potentialAction", actions)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Description", FieldType::Text))
        .field(FieldSchema::new("image", "Image", FieldType::Object("imageFieldType")))
        .field(
            FieldSchema::new("buttons", "Buttons", FieldType::ArrayOf("navigationLink"))
                .max_items(2, "A maximum of 2 buttons is allowed"),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
