//! `sitemap.xml` and `robots.txt`.
//!
//! The home page comes first with priority 1.0; every queryable page follows
//! with priority 0.8. Both change weekly. A CMS failure while listing pages
//! yields an empty sitemap rather than failing the build.

use crate::cms::{ContentSource, fetch_as};
use crate::query::QueryBuilder;
use crate::types::SitemapPath;
use chrono::{DateTime, SecondsFormat, Utc};
use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

pub const HOME_PRIORITY: f32 = 1.0;
pub const PAGE_PRIORITY: f32 = 0.8;
pub const CHANGE_FREQUENCY: &str = "weekly";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub change_frequency: String,
    pub priority: f32,
}

fn absolute(base: &Url, path: &str) -> String {
    base.join(path)
        .map(String::from)
        .unwrap_or_else(|_| path.to_string())
}

fn timestamp(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Sitemap entries for the listed page paths. Paths without an href are
/// skipped.
pub fn build_entries(base: &Url, paths: &[SitemapPath], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let home = SitemapEntry {
        url: absolute(base, "/"),
        last_modified: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        change_frequency: CHANGE_FREQUENCY.to_string(),
        priority: HOME_PRIORITY,
    };
    let pages = paths.iter().filter_map(|path| {
        let href = path.href.as_deref().filter(|h| !h.is_empty())?;
        Some(SitemapEntry {
            url: absolute(base, href),
            last_modified: path.updated_at.as_deref().and_then(timestamp),
            change_frequency: CHANGE_FREQUENCY.to_string(),
            priority: PAGE_PRIORITY,
        })
    });
    std::iter::once(home).chain(pages).collect()
}

/// Query the page list and build the sitemap.
///
/// Never fails: a CMS error is logged and yields no entries, as does a
/// `null` result.
pub fn fetch_sitemap(
    source: &dyn ContentSource,
    queries: &QueryBuilder<'_>,
    base: &Url,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    match fetch_as::<Option<Vec<SitemapPath>>>(source, &queries.sitemap()) {
        Ok(Some(paths)) => {
            let entries = build_entries(base, &paths, now);
            info!(count = entries.len(), "built sitemap");
            entries
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            error!("Failed to generate sitemap: {e}");
            Vec::new()
        }
    }
}

/// Render `sitemap.xml`.
pub fn render_xml(entries: &[SitemapEntry]) -> Markup {
    html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        "\n"
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for entry in entries {
                url {
                    loc { (entry.url) }
                    @if let Some(modified) = &entry.last_modified {
                        lastmod { (modified) }
                    }
                    changefreq { (entry.change_frequency) }
                    priority { (format!("{:.1}", entry.priority)) }
                }
            }
        }
    }
}

/// Render `robots.txt`, pointing crawlers at the sitemap.
pub fn render_robots(base: &Url) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        absolute(base, "/sitemap.xml")
    )
}
