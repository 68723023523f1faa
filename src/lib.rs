//! # pagecraft
//!
//! A static site builder for content-managed marketing sites. Content lives
//! in a hosted headless CMS (Sanity-compatible query API); every page is a
//! *page builder*: an ordered list of typed content blocks ("modules") that
//! pagecraft renders to plain HTML with inline JSON-LD.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     CMS       →  .pagecraft-temp/manifest.json   (composed queries → site manifest)
//! 2. Generate  manifest  →  dist/                           (HTML, 404, sitemap, redirects)
//! ```
//!
//! The manifest is human-readable JSON, so what the CMS returned can be
//! inspected independently of how it was rendered. Generate is a pure
//! function of the manifest and never talks to the CMS.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | Stage 1: runs the composed queries, produces the manifest |
//! | [`generate`] | Stage 2: renders pages, 404, sitemap, redirects and the stylesheet |
//! | [`blocks`] | One [`blocks::BlockDefinition`] per module type: projection, renderer, JSON-LD, schema |
//! | [`builder`] | Page-builder dispatch: block lookup, editor attributes, placeholders |
//! | [`query`] | GROQ composition from the enabled modules' projections |
//! | [`cms`] | The [`cms::ContentSource`] seam and its HTTP client |
//! | [`schema`] | Content schemas and document validation |
//! | [`check`] | Validates every stored document for the `check` command |
//! | [`link`] | Navigation link normalization and hrefs |
//! | [`jsonld`] | Structured-data fragments |
//! | [`redirects`] | Redirect rules, their path validation and host files |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` |
//! | [`portable_text`] | Rich text (Portable Text) to HTML |
//! | [`components`] | Shared HTML pieces: sections, headings, buttons, images |
//! | [`image`] | Image CDN URLs from asset references |
//! | [`context`] | The read-only site context every renderer sees |
//! | [`config`] | `site.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Documents shared between the stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Table of Block Definitions
//!
//! A module type is a single static [`blocks::BlockDefinition`] holding
//! everything about it. Query composition, rendering, structured data and
//! schema validation all iterate the same [`blocks::BlockRegistry`], so a
//! module enabled in `site.toml` is fetched, rendered and validated, and a
//! disabled one is none of these. Unknown block types never fail a page:
//! they render a visible placeholder.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Malformed markup
//! is a build error, and every interpolated CMS string is escaped.
//!
//! ## Rendering Never Validates
//!
//! Editors can publish incomplete documents. Rendering treats every field as
//! optional and omits what is missing; the rules editors are held to run only
//! in `pagecraft check`.

pub mod blocks;
pub mod builder;
pub mod check;
pub mod cms;
pub mod components;
pub mod config;
pub mod context;
pub mod fetch;
pub mod generate;
pub mod image;
pub mod jsonld;
pub mod link;
pub mod output;
pub mod portable_text;
pub mod query;
pub mod redirects;
pub mod schema;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
