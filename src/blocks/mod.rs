//! Page-builder blocks.
//!
//! A page is an ordered list of blocks, each tagged with its `_type`. Every
//! block type is described by one [`BlockDefinition`] which ties together the
//! four things the site needs to know about it:
//!
//! | Concern | Used by |
//! |---|---|
//! | projection (fields to resolve when querying) | [`crate::query`] |
//! | renderer | [`crate::builder`] |
//! | JSON-LD fragment | [`crate::builder`] |
//! | content schema | [`crate::schema`] |
//!
//! The [`BlockRegistry`] is the lookup table from tag to definition. Site
//! variants differ only in which definitions their registry holds.
//!
//! Block payloads are kept as raw JSON until a renderer asks for its typed
//! field struct via [`ContentBlock::fields_as`]. Field structs make every
//! field optional, so renderers only ever deal with present/absent.

pub mod contact_module;
pub mod cta_block;
pub mod feature_list;
pub mod generic_hero;
pub mod grid_module;
pub mod homepage_hero;
pub mod image_grid;
pub mod list_module;
pub mod price_list_module;
pub mod quote_module;
pub mod rich_text_module;
pub mod text_and_image;
pub mod text_and_link_block;

use crate::context::RenderContext;
use crate::jsonld;
use crate::schema::TypeSchema;
use maud::Markup;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// How a field is resolved by the block's projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Single image: dereference the asset.
    Image,
    /// Array of images.
    ImageArray,
    /// Single navigation link: dereference the page.
    Link,
    /// Array of navigation links.
    LinkArray,
}

/// A field that needs resolving when a block is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProjection {
    pub field: &'static str,
    pub resolution: Resolution,
}

pub type RenderFn = fn(&ContentBlock, &RenderContext<'_>) -> Markup;
pub type StructuredDataFn = fn(&ContentBlock, &RenderContext<'_>) -> Value;

/// Everything the site knows about one block type.
pub struct BlockDefinition {
    /// The `_type` tag.
    pub name: &'static str,
    /// Human-readable name. Doubles as the JSON-LD name fallback.
    pub title: &'static str,
    /// Fields resolved by the projection. Fields not listed are passed
    /// through as stored.
    pub projection: &'static [FieldProjection],
    pub render: RenderFn,
    pub structured_data: StructuredDataFn,
    pub schema: fn() -> TypeSchema,
}

impl BlockDefinition {
    /// Default JSON-LD description: `"<Title>: <title>"`, or
    /// `"<Title> module content"` when the block has no title.
    pub fn describe(&self, title: Option<&str>) -> String {
        match title.filter(|t| !t.is_empty()) {
            Some(t) => format!("{}: {t}", self.title),
            None => format!("{} module content", self.title),
        }
    }

    /// JSON-LD name: the block's title, falling back to the type title.
    pub fn name_or_title(&self, title: Option<&str>) -> String {
        title
            .filter(|t| !t.is_empty())
            .unwrap_or(self.title)
            .to_string()
    }
}

impl fmt::Debug for BlockDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDefinition")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}

static DEFINITIONS: [&BlockDefinition; 13] = [
    &homepage_hero::DEFINITION,
    &generic_hero::DEFINITION,
    &text_and_image::DEFINITION,
    &text_and_link_block::DEFINITION,
    &list_module::DEFINITION,
    &feature_list::DEFINITION,
    &quote_module::DEFINITION,
    &cta_block::DEFINITION,
    &contact_module::DEFINITION,
    &rich_text_module::DEFINITION,
    &grid_module::DEFINITION,
    &image_grid::DEFINITION,
    &price_list_module::DEFINITION,
];

/// Tag → definition lookup for the block types a site renders.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    definitions: Vec<&'static BlockDefinition>,
}

impl BlockRegistry {
    /// Every registered module.
    pub fn all() -> Self {
        Self {
            definitions: DEFINITIONS.to_vec(),
        }
    }

    /// Only the named modules. Unknown names are ignored; config validation
    /// rejects them before this is reached.
    pub fn with_modules(names: &[String]) -> Self {
        Self {
            definitions: DEFINITIONS
                .iter()
                .copied()
                .filter(|d| names.iter().any(|n| n == d.name))
                .collect(),
        }
    }

    /// Add (or replace) a definition.
    pub fn with_definition(mut self, definition: &'static BlockDefinition) -> Self {
        self.definitions.retain(|d| d.name != definition.name);
        self.definitions.push(definition);
        self
    }

    /// Whether `name` is a module this crate knows how to render.
    pub fn is_registered(name: &str) -> bool {
        DEFINITIONS.iter().any(|d| d.name == name)
    }

    pub fn lookup(&self, name: &str) -> Option<&'static BlockDefinition> {
        self.definitions.iter().copied().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static BlockDefinition> + '_ {
        self.definitions.iter().copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|d| d.name.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// One entry of a page's block list.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    /// `_key`, unique within the page.
    pub key: Option<String>,
    /// `_type`, the discriminant.
    pub block_type: String,
    /// The whole block object, tag fields included.
    pub fields: Map<String, Value>,
}

impl ContentBlock {
    /// Read a block. Non-objects are not blocks.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?.clone();
        let text = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            key: text("_key"),
            block_type: text("_type").unwrap_or_default(),
            fields,
        })
    }

    /// Deserialize the payload into the module's field struct.
    ///
    /// A payload that does not fit the struct renders as if every field were
    /// absent.
    pub fn fields_as<T: DeserializeOwned + Default>(&self) -> T {
        match serde_json::from_value(Value::Object(self.fields.clone())) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(
                    block_type = %self.block_type,
                    key = self.key.as_deref().unwrap_or("-"),
                    "block fields do not match the module shape, rendering empty: {e}"
                );
                T::default()
            }
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The JSON-LD `@id` of this block.
    pub fn structured_data_id(&self) -> String {
        jsonld::structured_data_id(&self.block_type, self.key())
    }
}

/// The block list of a page as received, each block with its position in
/// the original array. Anything that is not an array is an empty list;
/// members that are not objects are skipped.
pub fn coerce_blocks(value: &Value) -> Vec<(usize, ContentBlock)> {
    let Some(members) = value.as_array() else {
        if !value.is_null() {
            warn!("pageBuilder is not an array, rendering no blocks");
        }
        return Vec::new();
    };
    members
        .iter()
        .enumerate()
        .filter_map(|(i, member)| {
            let block = ContentBlock::from_value(member);
            if block.is_none() {
                warn!(index = i, "skipping pageBuilder member that is not an object");
            }
            block.map(|b| (i, b))
        })
        .collect()
}

/// Deserialize an array leniently: `null` is empty, and members that are
/// `null` or do not fit `T` are dropped.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let members = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(members
        .into_iter()
        .filter(|m| !m.is_null())
        .filter_map(|m| serde_json::from_value(m).ok())
        .collect())
}

/// Non-empty trimmed text.
pub(crate) fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// A title/description pair, the member shape of list-like modules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}
