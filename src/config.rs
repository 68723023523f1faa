//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top of it, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Site"
//! base_url = "http://localhost:3000"
//! language = "en"
//! modules = []              # Enabled page-builder modules (empty = all)
//! # studio_url = "https://example.sanity.studio"
//!
//! [cms]
//! project_id = ""
//! dataset = "production"
//! api_version = "2025-03-26"
//! use_cdn = true
//! perspective = "published"
//! timeout_secs = 30
//! page_types = ["genericPage"]
//!
//! [images]
//! quality = 90
//! default_width = 800
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#1a1a1a"
//! text_muted = "#5c5c5c"
//! border = "#d9d9d9"
//! brand = "#2f4f3a"
//! brand_contrast = "#ffffff"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! The CMS read token is deliberately absent: it is passed with `--token` or
//! the `SANITY_API_TOKEN` environment variable so it never lands in a file
//! that gets committed.
//!
//! Unknown keys are rejected to catch typos early.

use crate::blocks::BlockRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

static PROJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("static regex"));
static API_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}|1|X)$").expect("static regex"));

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity and the module set of this site variant.
    pub site: SiteSection,
    /// CMS connection settings.
    pub cms: CmsConfig,
    /// Image CDN URL parameters.
    pub images: ImagesConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel fetch/render settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.site.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(
                    "site.base_url must be an absolute http(s) URL".into(),
                ));
            }
        }
        if let Some(unknown) = self
            .site
            .modules
            .iter()
            .find(|m| !BlockRegistry::is_registered(m))
        {
            return Err(ConfigError::Validation(format!(
                "site.modules contains unknown module '{unknown}'"
            )));
        }
        if !self.cms.project_id.is_empty() && !PROJECT_ID.is_match(&self.cms.project_id) {
            return Err(ConfigError::Validation(
                "cms.project_id may only contain lowercase letters, digits and dashes".into(),
            ));
        }
        if self.cms.dataset.is_empty() {
            return Err(ConfigError::Validation(
                "cms.dataset must not be empty".into(),
            ));
        }
        if !API_VERSION.is_match(&self.cms.api_version) {
            return Err(ConfigError::Validation(
                "cms.api_version must be a YYYY-MM-DD date".into(),
            ));
        }
        if self.cms.page_types.is_empty() {
            return Err(ConfigError::Validation(
                "cms.page_types must not be empty".into(),
            ));
        }
        if self.cms.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "cms.timeout_secs must be positive".into(),
            ));
        }
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 0-100".into(),
            ));
        }
        if self.images.default_width == 0 {
            return Err(ConfigError::Validation(
                "images.default_width must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// The block registry for this site variant.
    pub fn block_registry(&self) -> BlockRegistry {
        if self.site.modules.is_empty() {
            BlockRegistry::all()
        } else {
            BlockRegistry::with_modules(&self.site.modules)
        }
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site name, used for the logo link and as the last-resort page title.
    pub name: String,
    /// Public origin of the deployed site (sitemap and canonical URLs).
    pub base_url: String,
    /// Value of the `<html lang>` attribute.
    pub language: String,
    /// Page-builder modules this site variant renders. Empty means all.
    pub modules: Vec<String>,
    /// Studio origin passed to the visual editor attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_url: Option<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "Site".to_string(),
            base_url: "http://localhost:3000".to_string(),
            language: "en".to_string(),
            modules: Vec::new(),
            studio_url: None,
        }
    }
}

/// CMS connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    /// Dated API version, e.g. `2025-03-26`.
    pub api_version: String,
    /// Query the edge-cached API host instead of the live one.
    pub use_cdn: bool,
    pub perspective: String,
    /// Per-request timeout for CMS queries.
    pub timeout_secs: u64,
    /// Document types that are addressable by slug. The first entry is the
    /// primary page type; its sitemap paths get a leading `/`.
    pub page_types: Vec<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2025-03-26".to_string(),
            use_cdn: true,
            perspective: "published".to_string(),
            timeout_secs: 30,
            page_types: vec!["genericPage".to_string()],
        }
    }
}

/// Image CDN URL parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Quality passed to the CDN (0 = worst, 100 = best).
    pub quality: u32,
    /// Width used when a renderer asks for an image without a size.
    pub default_width: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            default_width: 800,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel fetch/render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (captions, footer details).
    pub text_muted: String,
    pub border: String,
    /// Brand color for buttons and full-bleed sections.
    pub brand: String,
    /// Text color on top of `brand`.
    pub brand_contrast: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1a1a1a".to_string(),
            text_muted: "#5c5c5c".to_string(),
            border: "#d9d9d9".to_string(),
            brand: "#2f4f3a".to_string(),
            brand_contrast: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#101210".to_string(),
            text: "#ececec".to_string(),
            text_muted: "#a3a3a3".to_string(),
            border: "#3a3a3a".to_string(),
            brand: "#7fa68a".to_string(),
            brand_contrast: "#101210".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given `site.toml`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pagecraft configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.
#
# The CMS read token is not configured here: pass --token or set
# SANITY_API_TOKEN in the environment.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Used for the logo link and as the fallback page title.
name = "Site"

# Public origin of the deployed site. Sitemap URLs are built from it.
base_url = "http://localhost:3000"

# <html lang="..."> attribute.
language = "en"

# Page-builder modules rendered by this site variant. Blocks of any other
# type render a "Block not found" placeholder. Empty list = all modules.
# Available: homepageHero, genericHero, textAndImage, textAndLinkBlock,
#            listModule, featureList, quoteModule, ctaBlock, contactModule,
#            richTextModule, gridModule, imageGrid, priceListModule
modules = []

# Studio origin for visual-editing attributes (optional).
# studio_url = "https://example.sanity.studio"

# ---------------------------------------------------------------------------
# CMS connection
# ---------------------------------------------------------------------------
[cms]
project_id = ""
dataset = "production"
api_version = "2025-03-26"

# Query the CDN-cached API host (faster, may lag a few seconds behind).
use_cdn = true
perspective = "published"

# Per-request timeout in seconds.
timeout_secs = 30

# Document types addressable by slug. The first is the primary page type.
page_types = ["genericPage"]

# ---------------------------------------------------------------------------
# Image CDN parameters
# ---------------------------------------------------------------------------
[images]
# Quality passed to the image CDN (0 = worst, 100 = best).
quality = 90

# Width used when no explicit size is requested.
default_width = 800

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1a1a1a"
text_muted = "#5c5c5c"
border = "#d9d9d9"
brand = "#2f4f3a"
brand_contrast = "#ffffff"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#101210"
text = "#ececec"
text_muted = "#a3a3a3"
border = "#3a3a3a"
brand = "#7fa68a"
brand_contrast = "#101210"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel fetch/render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
{light}
}}

@media (prefers-color-scheme: dark) {{
    :root {{
{dark}
    }}
}}"#,
        light = scheme_properties(&colors.light, "    "),
        dark = scheme_properties(&colors.dark, "        "),
    )
}

fn scheme_properties(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("--color-bg", &scheme.background),
        ("--color-text", &scheme.text),
        ("--color-text-muted", &scheme.text_muted),
        ("--color-border", &scheme.border),
        ("--color-brand", &scheme.brand),
        ("--color-brand-contrast", &scheme.brand_contrast),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}{name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}
