//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the fetched manifest and writes the
//! final static site. Rendering is a pure function of the manifest: every
//! page sees the same read-only [`SiteContext`], and pages are rendered in
//! parallel.
//!
//! ## Generated Files
//!
//! - **Home page** (`/index.html`): the `homePage` singleton
//! - **Pages** (`/{slug}/index.html`): every fetched page
//! - **Not found page** (`/404.html`): the `notFoundPage` singleton, or a
//!   stock page when it does not exist
//! - **Sitemap** (`/sitemap.xml`) and `robots.txt`
//! - **Redirects** (`/_redirects`, `/redirects.json`)
//! - **Stylesheet** (`/style.{hash}.css`): colors from `site.toml` prepended
//!   to the embedded base styles, named by content hash
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── about/
//! │   └── index.html
//! ├── journal/first/
//! │   └── index.html
//! ├── style.3f9a1c2e.css
//! ├── sitemap.xml
//! ├── robots.txt
//! ├── _redirects
//! ├── redirects.json
//! └── favicon.svg            # copied from assets/
//! ```
//!
//! ## Page Layout
//!
//! Every page shares one document shell: head metadata from the page's SEO
//! fields plus the page-level `WebPage` JSON-LD, a header with the logo and
//! main menu, the page-builder output, and a footer built from global
//! settings and the footer menu.

use crate::builder::{DocumentRef, PageBuilderOutput, render_page_builder};
use crate::components;
use crate::config::{self, ColorConfig};
use crate::context::{RenderContext, SiteContext};
use crate::fetch::Manifest;
use crate::image::ImageUrlBuilder;
use crate::jsonld;
use crate::redirects::render_redirects_file;
use crate::sitemap;
use crate::types::{GlobalSettings, NOT_FOUND_PAGE_ID, NotFoundPage, PageDocument, Seo};
use chrono::{DateTime, Datelike};
use maud::{DOCTYPE, Markup, html};
use rayon::prelude::*;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid site.base_url: {0}")]
    Url(#[from] url::ParseError),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Shared, page-independent parts of the document shell.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Root-relative stylesheet href.
    pub stylesheet: String,
    pub favicon: Option<String>,
    /// Year shown in the copyright line.
    pub year: Option<i32>,
}

/// What was written for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub title: String,
    /// Output path relative to the output directory.
    pub path: String,
    pub blocks: usize,
    pub structured_data: usize,
    /// Block types rendered as placeholders.
    pub missing: Vec<String>,
}

/// Summary of a generate run, for CLI output.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Home page first, then pages in manifest order.
    pub pages: Vec<PageReport>,
    /// Slugs that could not be turned into an output path.
    pub skipped: Vec<String>,
    pub not_found: bool,
    pub stylesheet: String,
    pub redirects: usize,
    pub sitemap_entries: usize,
    pub assets: usize,
}

/// Head metadata of one page.
#[derive(Debug, Clone)]
struct PageHead {
    title: String,
    description: Option<String>,
    url: String,
    no_index: bool,
    og_image: Option<String>,
    web_page: Value,
}

impl PageHead {
    fn new(seo: &Seo, path: &str, ctx: &RenderContext<'_>) -> Self {
        let url = ctx.site.absolute_url(path);
        Self {
            title: seo
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| ctx.site.name.clone()),
            description: seo.description.clone().filter(|d| !d.trim().is_empty()),
            no_index: seo.no_index,
            og_image: seo.image.as_ref().and_then(|i| ctx.images.og_url(i)),
            web_page: jsonld::web_page(seo, &url, &ctx.site.name),
            url,
        }
    }
}

/// The stylesheet file name and content: `style.<sha256 prefix>.css`.
pub fn stylesheet(colors: &ColorConfig) -> (String, String) {
    let css = format!("{}\n\n{}", config::generate_color_css(colors), CSS_STATIC);
    let digest = format!("{:x}", Sha256::digest(css.as_bytes()));
    (format!("style.{}.css", &digest[..8]), css)
}

/// Files written at the top of the output directory. A page slug whose first
/// segment is one of these would turn it into a directory.
const RESERVED_NAMES: &[&str] = &[
    "index.html",
    "404.html",
    "sitemap.xml",
    "robots.txt",
    "_redirects",
    "redirects.json",
];

fn is_reserved(segment: &str) -> bool {
    RESERVED_NAMES.contains(&segment)
        || (segment.starts_with("style.") && segment.ends_with(".css"))
}

/// Output path of a page, relative to the output directory. `None` for
/// slugs that would escape it, name no directory, collide with another slug
/// after normalization, or shadow a generated file.
pub fn page_output_path(slug: &str) -> Option<PathBuf> {
    let trimmed = slug.trim_matches('/');
    if trimmed.is_empty() || trimmed.contains('\\') {
        return None;
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
        || is_reserved(segments[0])
    {
        return None;
    }
    let mut path: PathBuf = segments.iter().collect();
    path.push("index.html");
    Some(path)
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn generate(
    manifest: &Manifest,
    output_dir: &Path,
    assets_dir: Option<&Path>,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;
    let base = url::Url::parse(&config.site.base_url)?;
    let registry = config.block_registry();
    let site = SiteContext::new(
        &config.site,
        manifest.settings.clone(),
        &manifest.navigation,
        &manifest.footer,
    );
    let images = ImageUrlBuilder::new(&config.cms.project_id, &config.cms.dataset, &config.images);
    let ctx = RenderContext {
        site: &site,
        registry: &registry,
        images: &images,
        studio_url: config.site.studio_url.as_deref(),
    };

    fs::create_dir_all(output_dir)?;

    let (stylesheet_name, css) = stylesheet(&config.colors);
    fs::write(output_dir.join(&stylesheet_name), css)?;
    let layout = Layout {
        stylesheet: format!("/{stylesheet_name}"),
        favicon: manifest
            .settings
            .favicon
            .as_ref()
            .and_then(|f| images.url(f, Some(32), Some(32))),
        year: DateTime::parse_from_rfc3339(&manifest.fetched_at)
            .ok()
            .map(|t| t.year()),
    };

    let mut report = GenerateReport {
        stylesheet: stylesheet_name,
        ..GenerateReport::default()
    };

    report
        .pages
        .push(write_page(&manifest.home, Path::new("index.html"), &ctx, &layout, output_dir)?);

    let (routable, skipped): (Vec<_>, Vec<_>) = manifest
        .pages
        .iter()
        .map(|page| (page, page.slug().and_then(page_output_path)))
        .partition(|(_, path)| path.is_some());
    for (page, _) in &skipped {
        warn!(id = %page.id, slug = ?page.slug(), "page has no usable slug, skipping");
        report.skipped.push(page.slug().unwrap_or(&page.id).to_string());
    }
    let pages = routable
        .into_par_iter()
        .filter_map(|(page, path)| path.map(|p| (page, p)))
        .map(|(page, path)| write_page(page, &path, &ctx, &layout, output_dir))
        .collect::<Result<Vec<_>, _>>()?;
    report.pages.extend(pages);

    let not_found = render_not_found(manifest.not_found.as_ref(), &ctx, &layout);
    fs::write(output_dir.join("404.html"), not_found.into_string())?;
    report.not_found = manifest.not_found.is_some();

    fs::write(
        output_dir.join("sitemap.xml"),
        sitemap::render_xml(&manifest.sitemap).into_string(),
    )?;
    fs::write(output_dir.join("robots.txt"), sitemap::render_robots(&base))?;
    report.sitemap_entries = manifest.sitemap.len();

    fs::write(
        output_dir.join("_redirects"),
        render_redirects_file(&manifest.redirects),
    )?;
    fs::write(
        output_dir.join("redirects.json"),
        serde_json::to_string_pretty(&manifest.redirects)?,
    )?;
    report.redirects = manifest.redirects.len();

    if let Some(assets) = assets_dir.filter(|d| d.is_dir()) {
        report.assets = copy_assets(assets, output_dir)?;
    }

    info!(
        pages = report.pages.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

fn write_page(
    page: &PageDocument,
    relative: &Path,
    ctx: &RenderContext<'_>,
    layout: &Layout,
    output_dir: &Path,
) -> Result<PageReport, GenerateError> {
    let (markup, builder) = render_page(page, ctx, layout);
    let target = output_dir.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, markup.into_string())?;
    debug!(path = %target.display(), "wrote page");
    Ok(PageReport {
        title: page_title(page),
        path: path_string(relative),
        blocks: builder.blocks,
        structured_data: builder.structured_data,
        missing: builder.missing,
    })
}

fn page_title(page: &PageDocument) -> String {
    [page.seo.title.as_deref(), page.title.as_deref(), page.slug()]
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
        .unwrap_or(&page.id)
        .to_string()
}

/// Block statistics of a rendered page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuilderStats {
    pub blocks: usize,
    pub structured_data: usize,
    pub missing: Vec<String>,
}

/// Site path of a page: `/` for the home page, `/<slug>` otherwise.
pub fn page_path(page: &PageDocument) -> String {
    match page.slug() {
        Some(slug) if !page.is_home() => format!("/{}", slug.trim_matches('/')),
        _ => "/".to_string(),
    }
}

/// Render one page-builder page into the full document.
pub fn render_page(
    page: &PageDocument,
    ctx: &RenderContext<'_>,
    layout: &Layout,
) -> (Markup, BuilderStats) {
    let path = page_path(page);
    let head = PageHead::new(&page.seo, &path, ctx);
    let PageBuilderOutput {
        markup,
        structured_data,
        missing,
    } = render_page_builder(
        &page.page_builder,
        DocumentRef {
            id: &page.id,
            doc_type: &page.doc_type,
        },
        ctx,
    );
    let stats = BuilderStats {
        blocks: page.page_builder.as_array().map_or(0, Vec::len),
        structured_data: structured_data.len(),
        missing,
    };
    (base_document(&head, &path, ctx, layout, markup), stats)
}

/// Render `404.html`.
pub fn render_not_found(
    page: Option<&NotFoundPage>,
    ctx: &RenderContext<'_>,
    layout: &Layout,
) -> Markup {
    let seo = page.map(|p| p.seo.clone()).unwrap_or_default();
    let mut head = PageHead::new(&seo, "/404", ctx);
    head.no_index = true;
    let heading = page
        .and_then(|p| p.heading.as_deref())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or("Page not found");
    let subheading = page.and_then(|p| p.subheading.as_deref());
    let content = html! {
        main.not-found data-sanity=(format!("id={NOT_FOUND_PAGE_ID};type={NOT_FOUND_PAGE_ID};path=heading")) {
            section.module.module--not-found {
                div.container.narrow {
                    (components::heading(1, Some(heading)))
                    (components::paragraph(subheading))
                    a.button.button--primary href="/" { "Back to the front page" }
                }
            }
        }
    };
    base_document(&head, "/404", ctx, layout, content)
}

// ============================================================================
// Document shell
// ============================================================================

fn base_document(
    head: &PageHead,
    current_path: &str,
    ctx: &RenderContext<'_>,
    layout: &Layout,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(ctx.site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (head.title) }
                @if let Some(description) = &head.description {
                    meta name="description" content=(description);
                }
                @if head.no_index {
                    meta name="robots" content="noindex";
                }
                link rel="canonical" href=(head.url);
                meta property="og:title" content=(head.title);
                meta property="og:url" content=(head.url);
                meta property="og:site_name" content=(ctx.site.name);
                @if let Some(description) = &head.description {
                    meta property="og:description" content=(description);
                }
                @if let Some(image) = &head.og_image {
                    meta property="og:image" content=(image);
                }
                @if let Some(favicon) = &layout.favicon {
                    link rel="icon" href=(favicon);
                }
                link rel="stylesheet" href=(layout.stylesheet);
                (jsonld::script(&head.web_page))
            }
            body {
                (site_header(ctx.site, current_path))
                (content)
                (site_footer(ctx.site, layout.year))
            }
        }
    }
}

fn logo_text(site: &SiteContext) -> &str {
    site.logo_text
        .as_deref()
        .or(site.settings.company_name.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&site.name)
}

/// Header with logo, main menu and the optional contact button.
pub fn site_header(site: &SiteContext, current_path: &str) -> Markup {
    let contact = site.contact_button_text.as_deref().zip(site.settings.email());
    html! {
        header.site-header {
            div.container.header-inner {
                a.logo href="/" { (logo_text(site)) }
                @if !site.menu.is_empty() {
                    input.nav-toggle type="checkbox" id="nav-toggle";
                    label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                        span.hamburger-line {}
                        span.hamburger-line {}
                        span.hamburger-line {}
                    }
                    nav.site-nav aria-label="Main" {
                        ul {
                            @for link in &site.menu {
                                @let is_current = link.href() == current_path;
                                li class=[is_current.then_some("current")] {
                                    (components::text_link(link))
                                }
                            }
                        }
                    }
                }
                @if let Some((label, email)) = contact {
                    a.button.button--primary.header-contact href={ "mailto:" (email) } { (label) }
                }
            }
        }
    }
}

fn footer_company(settings: &GlobalSettings) -> Markup {
    let lines = settings
        .address
        .as_ref()
        .map(|a| a.lines())
        .unwrap_or_default();
    html! {
        div.footer-company {
            @if let Some(name) = settings.company_name.as_deref().filter(|n| !n.is_empty()) {
                p.footer-name { (name) }
            }
            @if !lines.is_empty() {
                address {
                    @for (i, line) in lines.iter().enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
        }
    }
}

fn footer_contact(settings: &GlobalSettings) -> Markup {
    let phone = settings
        .contact_info
        .as_ref()
        .and_then(|c| c.phone.as_deref())
        .filter(|p| !p.is_empty());
    let social = settings.social_links.clone().unwrap_or_default();
    html! {
        div.footer-contact {
            @if let Some(phone) = phone {
                a href={ "tel:" (phone.replace(' ', "")) } { (phone) }
            }
            @if let Some(email) = settings.email() {
                a href={ "mailto:" (email) } { (email) }
            }
            @if let Some(instagram) = social.instagram.as_deref().filter(|s| !s.is_empty()) {
                a href=(instagram) target="_blank" rel="noopener noreferrer" { "Instagram" }
            }
            @if let Some(linked_in) = social.linked_in.as_deref().filter(|s| !s.is_empty()) {
                a href=(linked_in) target="_blank" rel="noopener noreferrer" { "LinkedIn" }
            }
        }
    }
}

/// Footer: company details, contact, footer menu, copyright and VAT number.
pub fn site_footer(site: &SiteContext, year: Option<i32>) -> Markup {
    let settings = &site.settings;
    let vat = settings.vat_number_object.as_ref().and_then(|v| {
        let number = v.vat_number.as_deref().filter(|n| !n.is_empty())?;
        Some((v.vat_number_heading.as_deref(), number))
    });
    html! {
        footer.site-footer {
            div.container.footer-grid {
                (footer_company(settings))
                (footer_contact(settings))
                @if !site.footer_menu.is_empty() {
                    nav.footer-menu aria-label="Footer" {
                        ul {
                            @for link in &site.footer_menu {
                                li { (components::text_link(link)) }
                            }
                        }
                    }
                }
            }
            div.container.footer-bottom {
                @if let Some(copyright) = settings.copyright.as_deref().filter(|c| !c.is_empty()) {
                    p.copyright {
                        "© "
                        @if let Some(year) = year { (year) " " }
                        (copyright)
                    }
                }
                @if let Some((heading, number)) = vat {
                    p.vat {
                        @if let Some(heading) = heading.filter(|h| !h.is_empty()) { (heading) ": " }
                        (number)
                    }
                }
            }
        }
    }
}

/// Copy the project asset directory into the output root. Returns the number
/// of files copied.
pub fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(assets_dir).follow_links(true) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(assets_dir) else {
            continue;
        };
        let target = output_dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Tests
// ============================================================================
