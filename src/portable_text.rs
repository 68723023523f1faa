//! Portable Text → HTML.
//!
//! Rich-text fields are stored as an array of nodes. Text nodes are
//! `{"_type": "block", "style", "listItem"?, "children": [spans], "markDefs"}`
//! where each span carries its text and the marks applied to it. A mark is
//! either a decorator (`strong`, `em`) or the `_key` of a mark definition
//! (a `link` annotation with an `href`).
//!
//! Consecutive list-item blocks are grouped into one `<ul>`/`<ol>`. Unknown
//! styles render as paragraphs and unknown node types are skipped. Image
//! nodes are only rendered where the field allows images.

use crate::components;
use crate::image::ImageUrlBuilder;
use crate::types::ImageField;
use maud::{Markup, html};
use serde_json::{Map, Value};

/// Render width for images embedded in rich text.
const INLINE_IMAGE_WIDTH: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichTextOptions {
    pub allow_images: bool,
}

impl RichTextOptions {
    pub const WITH_IMAGES: Self = Self { allow_images: true };
    pub const NO_IMAGES: Self = Self { allow_images: false };
}

/// Whether a rich-text value has anything to render.
pub fn is_empty(value: Option<&Value>) -> bool {
    value.and_then(Value::as_array).is_none_or(Vec::is_empty)
}

pub fn render(value: Option<&Value>, options: RichTextOptions, images: &ImageUrlBuilder) -> Markup {
    let nodes: &[Value] = value.and_then(Value::as_array).map_or(&[], Vec::as_slice);
    let groups = group(nodes);
    html! {
        @for g in &groups {
            @match g {
                Group::List(kind, items) => {
                    @if *kind == "number" {
                        ol { @for item in items { li { (render_children(item)) } } }
                    } @else {
                        ul { @for item in items { li { (render_children(item)) } } }
                    }
                },
                Group::Block(block) => {
                    (render_block(block))
                },
                Group::Image(node) => {
                    @if options.allow_images {
                        (render_image(node, images))
                    }
                },
            }
        }
    }
}

enum Group<'a> {
    List(&'a str, Vec<&'a Map<String, Value>>),
    Block(&'a Map<String, Value>),
    Image(&'a Value),
}

fn group(nodes: &[Value]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for node in nodes {
        let Some(obj) = node.as_object() else {
            continue;
        };
        match obj.get("_type").and_then(Value::as_str) {
            Some("block") => {
                match obj.get("listItem").and_then(Value::as_str) {
                    Some(kind) => {
                        if let Some(Group::List(current, items)) = groups.last_mut()
                            && *current == kind
                        {
                            items.push(obj);
                        } else {
                            groups.push(Group::List(kind, vec![obj]));
                        }
                    }
                    None => groups.push(Group::Block(obj)),
                }
            }
            Some("image" | "imageFieldType") => groups.push(Group::Image(node)),
            _ => {}
        }
    }
    groups
}

fn render_block(block: &Map<String, Value>) -> Markup {
    let children = render_children(block);
    match block.get("style").and_then(Value::as_str).unwrap_or("normal") {
        "h2" => html! { h2 { (children) } },
        "h3" => html! { h3 { (children) } },
        "h4" => html! { h4 { (children) } },
        "blockquote" => html! { blockquote { (children) } },
        _ => html! { p { (children) } },
    }
}

fn render_children(block: &Map<String, Value>) -> Markup {
    let defs: &[Value] = block
        .get("markDefs")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice);
    let spans: &[Value] = block
        .get("children")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice);
    html! {
        @for span in spans {
            @if let Some(text) = span.get("text").and_then(Value::as_str) {
                @let marks: Vec<&str> = span
                    .get("marks")
                    .and_then(Value::as_array)
                    .map(|m| m.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                (render_span(text, &marks, defs))
            }
        }
    }
}

fn render_span(text: &str, marks: &[&str], defs: &[Value]) -> Markup {
    let Some((mark, rest)) = marks.split_first() else {
        return with_line_breaks(text);
    };
    let inner = render_span(text, rest, defs);
    match *mark {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        key => match link_href(defs, key) {
            Some(href) => {
                let external = href.starts_with("http://") || href.starts_with("https://");
                html! {
                    a href=(href)
                        target=[external.then_some("_blank")]
                        rel=[external.then_some("noopener noreferrer")] { (inner) }
                }
            }
            None => inner,
        },
    }
}

fn link_href<'a>(defs: &'a [Value], key: &str) -> Option<&'a str> {
    defs.iter()
        .find(|d| d.get("_key").and_then(Value::as_str) == Some(key))
        .filter(|d| d.get("_type").and_then(Value::as_str) == Some("link"))
        .and_then(|d| d.get("href"))
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
}

fn with_line_breaks(text: &str) -> Markup {
    html! {
        @for (i, line) in text.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

fn render_image(node: &Value, images: &ImageUrlBuilder) -> Markup {
    let Ok(field) = serde_json::from_value::<ImageField>(node.clone()) else {
        return html! {};
    };
    html! {
        figure.rich-text-image {
            (components::image(images, Some(&field), INLINE_IMAGE_WIDTH, None))
        }
    }
}
