//! Contact section: title, rich text and a mail button using the site's
//! contact email from global settings.

use super::{BlockDefinition, ContentBlock, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::JsonLd;
use crate::portable_text::{self, RichTextOptions};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use crate::types::null_default;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "contactModule",
    title: "Contact module",
    projection: &[],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactModule {
    pub title: Option<String>,
    pub description: Option<Value>,
    #[serde(deserialize_with = "null_default")]
    pub show_contact_button: bool,
    pub contact_button_text: Option<String>,
}

fn render(block: &ContentBlock, ctx: &RenderContext<'_>) -> Markup {
    let fields: ContactModule = block.fields_as();
    let settings = &ctx.site.settings;
    let phone = settings
        .contact_info
        .as_ref()
        .and_then(|c| c.phone.as_deref())
        .filter(|p| !p.is_empty());
    let button = match (fields.show_contact_button, settings.email(), text(&fields.contact_button_text)) {
        (true, Some(email), Some(label)) => Some((email, label)),
        _ => None,
    };
    components::section(
        DEFINITION.name,
        None,
        html! {
            div.split {
                div.split-text {
                    (components::heading(2, text(&fields.title)))
                }
                div.split-text {
                    @if !portable_text::is_empty(fields.description.as_ref()) {
                        div.rich-text {
                            (portable_text::render(fields.description.as_ref(), RichTextOptions::NO_IMAGES, ctx.images))
                        }
                    }
                    @if let Some((email, label)) = button {
                        div.contact-buttons {
                            a.button.button--primary href={ "mailto:" (email) } { (label) }
                            @if let Some(phone) = phone {
                                a.button.button--secondary href={ "tel:" (phone.replace(' ', "")) } { (phone) }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: ContactModule = block.fields_as();
    JsonLd::entity("WebPageElement", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", DEFINITION.describe(text(&fields.title)))
        .part_of_page()
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("description", "Description", FieldType::RichTextNoImages))
        .field(FieldSchema::new("showContactButton", "Show contact button", FieldType::Boolean))
        .field(FieldSchema::new("contactButtonText", "Contact button text", FieldType::String))
        .preview(PreviewSpec::Field {
            title: "title",
            subtitle: Some(DEFINITION.title),
        })
}
