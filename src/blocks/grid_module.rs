//! Title, subtitle and a row of text columns.

use super::{BlockDefinition, ContentBlock, Item, lenient_vec, text};
use crate::components;
use crate::context::RenderContext;
use crate::jsonld::{self, JsonLd};
use crate::schema::{FieldSchema, FieldType, PreviewSpec, TypeSchema};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

pub static DEFINITION: BlockDefinition = BlockDefinition {
    name: "gridModule",
    title: "Column module",
    projection: &[],
    render,
    structured_data,
    schema,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GridModule {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub columns: Vec<Item>,
}

fn render(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Markup {
    let fields: GridModule = block.fields_as();
    components::section(
        DEFINITION.name,
        None,
        html! {
            div.intro {
                (components::heading(2, text(&fields.title)))
                (components::paragraph(text(&fields.subtitle)))
            }
            @if !fields.columns.is_empty() {
                div.columns style={ "--columns: " (fields.columns.len()) } {
                    @for column in &fields.columns {
                        div.column {
                            (components::heading(3, text(&column.title)))
                            (components::paragraph(text(&column.description)))
                        }
                    }
                }
            }
        },
    )
}

fn structured_data(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Value {
    let fields: GridModule = block.fields_as();
    let items = jsonld::list_items(
        fields
            .columns
            .iter()
            .filter(|c| text(&c.title).is_some() || text(&c.description).is_some())
            .map(|c| {
                JsonLd::node("ListItem")
                    .maybe("name", text(&c.title))
                    .maybe("description", text(&c.description))
            }),
    );
    let description = text(&fields.subtitle)
        .map(str::to_string)
        .unwrap_or_else(|| DEFINITION.describe(text(&fields.title)));
    JsonLd::entity("ItemList", block.structured_data_id())
        .set("name", DEFINITION.name_or_title(text(&fields.title)))
        .set("description", description)
        .non_empty("itemListElement", items)
        .build()
}

fn schema() -> TypeSchema {
    TypeSchema::object(DEFINITION.name, DEFINITION.title)
        .field(FieldSchema::new("title", "Title", FieldType::String))
        .field(FieldSchema::new("subtitle", "Subtitle", FieldType::String))
        .field(
            FieldSchema::new("columns", "Columns", FieldType::Array)
                .min_items(1, "At least 1 column is required"),
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

    fn grid() -> ContentBlock {
        block(json!({
            "_type": "gridModule",
            "_key": "g",
            "title": "Levels",
            "columns": [
                {"title": "Beginner"},
                {},
                {"description": "For everyone"}
            ]
        }))
    }

    #[test]
    fn renders_all_columns() {
        let site = TestSite::new();
        let html = render(&grid(), &site.ctx()).into_string();
        assert_eq!(html.matches("class=\"column\"").count(), 3);
        assert!(html.contains("--columns: 3"));
    }

    #[test]
    fn structured_data_skips_empty_columns() {
        let site = TestSite::new();
        let data = structured_data(&grid(), &site.ctx());
        let items = data["itemListElement"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Beginner");
        assert!(items[0].get("description").is_none());
        assert_eq!(items[1]["position"], 2);
        assert_eq!(data["description"], "Column module: Levels");
    }

    #[test]
    fn subtitle_is_the_description() {
        let site = TestSite::new();
        let data = structured_data(
            &block(json!({"_type": "gridModule", "subtitle": "Pick one"})),
            &site.ctx(),
        );
        assert_eq!(data["description"], "Pick one");
    }
}
