//! End-to-end build against an in-memory dataset: fetch → manifest on disk →
//! generate → dist/.

use chrono::{TimeZone, Utc};
use pagecraft::cms::{CmsError, ContentSource};
use pagecraft::config::SiteConfig;
use pagecraft::fetch::{self, MANIFEST_FILE};
use pagecraft::generate;
use pagecraft::query::Query;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

/// Answers queries from a fixed dataset keyed like the site's queries.
struct Dataset(HashMap<String, Value>);

impl ContentSource for Dataset {
    fn fetch(&self, query: &Query) -> Result<Value, CmsError> {
        let key = match query.param_str("slug") {
            Some(slug) if query.name == "page" => format!("page:{slug}"),
            _ => query.name.to_string(),
        };
        Ok(self.0.get(&key).cloned().unwrap_or(Value::Null))
    }
}

fn link(label: &str, slug: &str) -> Value {
    json!({
        "_key": slug,
        "_type": "navigationLink",
        "label": label,
        "linkType": "internal",
        "page": {"_id": format!("page-{slug}"), "_type": "genericPage", "slug": slug}
    })
}

fn dataset() -> Dataset {
    let entries = [
        (
            "settings",
            json!({
                "companyName": "Harbour Yoga",
                "contactInfo": {"phone": "+45 11 22 33 44", "email": "hello@harbour.example"},
                "address": {"streetName": "Quay", "streetNumber": "3", "zipCode": "8000", "city": "Aarhus"},
                "copyright": "Harbour Yoga ApS"
            }),
        ),
        (
            "navigation",
            json!({
                "logoText": "Harbour",
                "menu": [link("Classes", "classes"), {"label": "Broken", "linkType": "internal", "page": null}],
                "contactButtonText": "Book a class"
            }),
        ),
        ("footer", json!({"menu": [link("Privacy", "privacy")]})),
        (
            "home",
            json!({
                "_id": "homePage",
                "_type": "homePage",
                "seo": {"title": "Harbour Yoga", "description": "Yoga by the water", "noIndex": false},
                "pageBuilder": [
                    {"_type": "homepageHero", "_key": "hero", "title": "Breathe", "buttons": [link("See classes", "classes")]},
                    {"_type": "videoEmbed", "_key": "video"},
                    {"_type": "quoteModule", "_key": "q", "quote": "Calm & clear", "author": "A student"}
                ]
            }),
        ),
        (
            "not-found",
            json!({"_id": "notFoundPage", "heading": "Nothing here", "subheading": "Try the classes page"}),
        ),
        ("slugs", json!(["classes", "privacy"])),
        (
            "page:classes",
            json!({
                "_id": "page-classes",
                "_type": "genericPage",
                "title": "Classes",
                "slug": {"current": "classes"},
                "seo": {"title": "Classes", "description": "Weekly classes"},
                "pageBuilder": [
                    {"_type": "listModule", "_key": "l", "title": "This week", "items": [{"_key": "a", "title": "Morning flow"}]}
                ]
            }),
        ),
        (
            "page:privacy",
            json!({
                "_id": "page-privacy",
                "_type": "genericPage",
                "slug": {"current": "privacy"},
                "seo": {"title": "Privacy", "noIndex": true},
                "pageBuilder": null
            }),
        ),
        (
            "redirects",
            json!([
                {"source": "/schedule", "destination": "/classes", "permanent": null},
                {"source": "/shop", "destination": "https://shop.example", "permanent": false}
            ]),
        ),
        (
            "sitemap",
            json!([
                {"href": "/classes", "_updatedAt": "2026-09-20T08:00:00Z"},
                {"href": "/privacy", "_updatedAt": null}
            ]),
        ),
    ];
    Dataset(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.name = "Harbour Yoga".into();
    config.site.base_url = "https://harbour.example".into();
    config.cms.project_id = "abc123".into();
    config
}

#[test]
fn fetch_then_generate_builds_the_site() {
    let tmp = TempDir::new().unwrap();
    let temp_dir = tmp.path().join(".pagecraft-temp");
    let dist = tmp.path().join("dist");
    let now = Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap();

    let manifest = fetch::fetch(&dataset(), &config(), now).unwrap();
    let path = fetch::write_manifest(&manifest, &temp_dir).unwrap();
    assert_eq!(path, temp_dir.join(MANIFEST_FILE));

    let manifest = fetch::read_manifest(&path).unwrap();
    let report = generate::generate(&manifest, &dist, None).unwrap();
    let paths: Vec<&str> = report.pages.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(paths, vec!["index.html", "classes/index.html", "privacy/index.html"]);

    let home = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(home.contains("<title>Harbour Yoga</title>"));
    assert!(home.contains(r#"<link rel="canonical" href="https://harbour.example/">"#));
    assert!(home.contains("Breathe"));
    assert!(home.contains("Calm &amp; clear"));
    assert!(home.contains("Block not found: videoEmbed"));
    assert!(home.find("Breathe").unwrap() < home.find("Block not found").unwrap());
    assert!(home.find("Block not found").unwrap() < home.find("Calm &amp; clear").unwrap());
    assert!(home.contains(r#"<a href="/classes">Classes</a>"#));
    assert!(home.contains(r#"<a href="/">Broken</a>"#));
    assert!(home.contains(r#"href="mailto:hello@harbour.example">Book a class</a>"#));
    assert!(home.contains("© 2026 Harbour Yoga ApS"));
    assert!(home.contains(r##""@id":"#quote-module-q""##));

    let classes = fs::read_to_string(dist.join("classes/index.html")).unwrap();
    assert!(classes.contains("Morning flow"));
    assert!(classes.contains(r#"<li class="current"><a href="/classes">Classes</a></li>"#));

    let privacy = fs::read_to_string(dist.join("privacy/index.html")).unwrap();
    assert!(privacy.contains(r#"<meta name="robots" content="noindex">"#));

    let not_found = fs::read_to_string(dist.join("404.html")).unwrap();
    assert!(not_found.contains("Nothing here"));
    assert!(not_found.contains(r#"<meta name="robots" content="noindex">"#));

    assert_eq!(
        fs::read_to_string(dist.join("_redirects")).unwrap(),
        "/schedule /classes 301\n/shop https://shop.example 302\n"
    );

    let sitemap = fs::read_to_string(dist.join("sitemap.xml")).unwrap();
    let home_at = sitemap.find("<loc>https://harbour.example/</loc>").unwrap();
    let classes_at = sitemap.find("<loc>https://harbour.example/classes</loc>").unwrap();
    assert!(home_at < classes_at);
    assert!(sitemap.contains("<lastmod>2026-10-01T09:30:00Z</lastmod>"));

    assert!(dist.join(&report.stylesheet).exists());
    assert!(dist.join("robots.txt").exists());
}
