//! Content fetching.
//!
//! Stage 1 of the build pipeline. Reads every document the site needs from
//! the CMS and writes a single manifest the generate stage renders from.
//!
//! ## Order of work
//!
//! 1. Site-wide singletons: global settings, navigation, footer, the home
//!    and not-found pages.
//! 2. The slug listing of every queryable page.
//! 3. Every listed page, fetched in parallel with [rayon].
//! 4. Enabled redirects and the sitemap paths.
//!
//! Missing singletons fall back to empty defaults, except the home page,
//! without which there is no site to build. A slug that no longer resolves
//! when its page is fetched is skipped. Sitemap failures never fail the
//! stage.
//!
//! ## Output
//!
//! ```text
//! .pagecraft-temp/
//! └── manifest.json
//! ```

use crate::cms::{CmsError, ContentSource, fetch_as};
use crate::config::SiteConfig;
use crate::query::QueryBuilder;
use crate::redirects::{self, RedirectRule};
use crate::sitemap::{self, SitemapEntry};
use crate::types::{Footer, GlobalSettings, Navigation, NotFoundPage, PageDocument};
use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid site.base_url: {0}")]
    Url(#[from] url::ParseError),
    #[error("the {0} document does not exist")]
    MissingDocument(&'static str),
}

/// Everything the generate stage needs, as fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// RFC 3339 time of the fetch.
    pub fetched_at: String,
    pub config: SiteConfig,
    pub settings: GlobalSettings,
    pub navigation: Navigation,
    pub footer: Footer,
    pub home: PageDocument,
    pub not_found: Option<NotFoundPage>,
    /// Slug-addressed pages in listing order.
    pub pages: Vec<PageDocument>,
    pub redirects: Vec<RedirectRule>,
    pub sitemap: Vec<SitemapEntry>,
}

fn singleton<T: DeserializeOwned + Default>(
    source: &dyn ContentSource,
    query: &crate::query::Query,
) -> Result<T, CmsError> {
    let found: Option<T> = fetch_as(source, query)?;
    if found.is_none() {
        warn!(query = query.name, "singleton not found, using defaults");
    }
    Ok(found.unwrap_or_default())
}

/// Listed slugs: blanks dropped, first occurrence wins.
fn unique_slugs(listed: Vec<Option<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    listed
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let fresh = seen.insert(s.clone());
            if !fresh {
                warn!(slug = %s, "slug listed more than once, keeping the first page");
            }
            fresh
        })
        .collect()
}

/// Fetch the whole site.
///
/// `now` stamps the manifest and the home page sitemap entry.
pub fn fetch(
    source: &dyn ContentSource,
    config: &SiteConfig,
    now: DateTime<Utc>,
) -> Result<Manifest, FetchError> {
    let registry = config.block_registry();
    let queries = QueryBuilder::new(&registry, &config.cms.page_types);
    let base = url::Url::parse(&config.site.base_url)?;

    let settings: GlobalSettings = singleton(source, &queries.global_settings())?;
    let navigation: Navigation = singleton(source, &queries.navigation())?;
    let footer: Footer = singleton(source, &queries.footer())?;
    let home: PageDocument = fetch_as::<Option<PageDocument>>(source, &queries.home_page())?
        .ok_or(FetchError::MissingDocument("homePage"))?;
    let not_found: Option<NotFoundPage> = fetch_as(source, &queries.not_found_page())?;

    let listed: Option<Vec<Option<String>>> = fetch_as(source, &queries.page_slugs())?;
    let slugs = unique_slugs(listed.unwrap_or_default());
    info!(count = slugs.len(), "fetching pages");

    let fetched: Vec<(String, Option<PageDocument>)> = slugs
        .into_par_iter()
        .map(|slug| -> Result<_, CmsError> {
            let page = fetch_as::<Option<PageDocument>>(source, &queries.page(&slug))?;
            Ok((slug, page))
        })
        .collect::<Result<_, CmsError>>()?;
    let pages = fetched
        .into_iter()
        .filter_map(|(slug, page)| {
            if page.is_none() {
                warn!(slug = %slug, "listed page not found, skipping");
            }
            page
        })
        .collect();

    let redirects = redirects::fetch_redirects(source, &queries)?;
    let sitemap = sitemap::fetch_sitemap(source, &queries, &base, now);

    Ok(Manifest {
        fetched_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        config: config.clone(),
        settings,
        navigation,
        footer,
        home,
        not_found,
        pages,
        redirects,
        sitemap,
    })
}

/// Write `manifest.json` into `temp_dir`.
pub fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<PathBuf, FetchError> {
    fs::create_dir_all(temp_dir)?;
    let path = temp_dir.join(MANIFEST_FILE);
    fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
    Ok(path)
}

pub fn read_manifest(path: &Path) -> Result<Manifest, FetchError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StubSource, global_settings, home_page, internal_link, page, redirect};
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    fn site() -> StubSource {
        StubSource::new()
            .with("settings", global_settings())
            .with("navigation", json!({"logoText": "Studio", "menu": [internal_link("About", "about")]}))
            .with("footer", json!({"menu": [internal_link("Privacy", "privacy")]}))
            .with("home", home_page(json!([{"_type": "quoteModule", "_key": "q"}])))
            .with("slugs", json!(["about", null, "team", "about", "gone"]))
            .with_page("about", page("p1", "about", json!([])))
            .with_page("team", page("p2", "team", json!([])))
            .with("redirects", json!([redirect("/old-page", "/new-page", None)]))
            .with("sitemap", json!([{"href": "/about", "_updatedAt": "2026-09-01T10:00:00Z"}]))
    }

    #[test]
    fn fetches_whole_site() {
        let manifest = fetch(&site(), &SiteConfig::default(), now()).unwrap();
        assert_eq!(manifest.fetched_at, "2026-10-01T12:00:00Z");
        assert_eq!(manifest.settings.company_name.as_deref(), Some("Test Studio"));
        assert_eq!(manifest.navigation.menu.as_ref().unwrap().len(), 1);
        assert!(manifest.home.is_home());
        assert!(manifest.not_found.is_none());
        let slugs: Vec<_> = manifest.pages.iter().map(|p| p.slug().unwrap()).collect();
        assert_eq!(slugs, vec!["about", "team"]);
        assert_eq!(manifest.redirects.len(), 1);
        assert_eq!(manifest.sitemap.len(), 2);
    }

    #[test]
    fn duplicate_slug_is_fetched_once() {
        let source = site();
        fetch(&source, &SiteConfig::default(), now()).unwrap();
        let about = source.calls().iter().filter(|c| *c == "page:about").count();
        assert_eq!(about, 1);
    }

    #[test]
    fn missing_home_page_fails() {
        let source = StubSource::new();
        let err = fetch(&source, &SiteConfig::default(), now()).unwrap_err();
        assert!(matches!(err, FetchError::MissingDocument("homePage")));
    }

    #[test]
    fn sitemap_failure_does_not_fail_fetch() {
        let source = site().failing("sitemap");
        let manifest = fetch(&source, &SiteConfig::default(), now()).unwrap();
        assert!(manifest.sitemap.is_empty());
    }

    #[test]
    fn page_failure_fails_fetch() {
        let source = site().failing("page:team");
        assert!(matches!(
            fetch(&source, &SiteConfig::default(), now()),
            Err(FetchError::Cms(CmsError::Status { status: 503, .. }))
        ));
    }

    #[test]
    fn manifest_round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let manifest = fetch(&site(), &SiteConfig::default(), now()).unwrap();
        let path = write_manifest(&manifest, &tmp.path().join("temp")).unwrap();
        assert!(path.ends_with(MANIFEST_FILE));
        let read = read_manifest(&path).unwrap();
        assert_eq!(read.pages, manifest.pages);
        assert_eq!(read.navigation, manifest.navigation);
        assert_eq!(read.redirects, manifest.redirects);
    }
}
