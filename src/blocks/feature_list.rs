//! Intro text, a grid of features and an optional button.

use super::list_module::complete_items;
use super::{BlockDefinition, ContentBlock, FieldProjection, Item, Resolution, lenient_vec, text};
use crate::components::{self, ButtonVariant};
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::link::normalize_value;
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "featureList",
    title: "Feature list",
    projection: &[FieldProjection {
        field: "link",
        resolution: Resolution::Link,
    }],
    render,
    structured_data,
    schema,
};

pub(crate) const BUTTON_TYPES: &[&str] = &["primary", "secondary"];

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureList {
    pub title: Option<String>,
    pub description: Option<Value>,
    pub link: Option<Value>,
    pub button_type: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub items: Vec<Item>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: FeatureList = block.fields_as();
    let link = normalize_value(fields.link.as_ref());
    html! {
        section.module.module--feature-list {
            div.container {
                div.intro {
                    (components::heading(2, text(&fields.title)))
                    @if !portable_text::is_empty(fields.description.as_ref()) {
                        div.rich-text {
                            (portable_text::render(fields.description.as_ref(), RichTextOptions::WITH_IMAGES, ctx.images))
                        }
                    }
                    @if let Some(link) = &link {
                        (components::button(link, ButtonVariant::parse(fields.button_type.as_deref())))
                    }
                }
                @if !fields.items.is_empty() {
                    ul.feature-grid {
                        @for item in &fields.items {
                            li.feature {
                                (components::heading(3, text(&item.title)))
                                (components::paragraph(text(&item.description)))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: FeatureList = block.fields_as();
    let action = normalize_value(fields.link.as_ref()).and_then(|l| jsonld::read_action(&l));
    JsonLd::entity("ItemList", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .non_empty("itemListElement", complete_items(&fields.items))
        .maybe("potentialAction", action)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Description", FieldType::RichText))
        .field(FieldSchema::new("link", "Button link", FieldType::Object("navigationLink")))
        .field(FieldSchema::new("buttonType", "Button type", FieldType::String).one_of(BUTTON_TYPES))
        .field(
            FieldSchema::new("items", "Features", FieldType::Array)
                .min_items(1, "At least 1 feature is required"),
        )
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
