//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (page,
//! redirect, document) leads with its semantic identity (positional index and
//! title) and shows slugs, output paths and findings as indented context
//! lines. The output reads as a content inventory of the site.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Site
//!     Company: Studio ApS
//!     Menu: 4 links
//!     Footer: 2 links
//!
//! Pages
//! 000 Home
//!     Blocks: 5
//! 001 About us
//!     Slug: about
//!     Blocks: 3
//!
//! Redirects
//! 001 /old-page → /new-page (301)
//!
//! Fetched 1 page, 1 redirect, 2 sitemap entries
//! ```
//!
//! ## Generate
//!
//! ```text
//! 000 Home → index.html
//! 001 About us → about/index.html
//!     Missing: legacyBanner
//!
//! Not found page → 404.html
//! Stylesheet → style.3f9a1c2e.css
//!
//! Generated 2 pages, 1 redirect, 2 sitemap entries, 3 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! genericPage p2 (About us)
//!     error slug: Slug 'about' is already used by p1
//!     warning seo.description: For optimal SEO, ...
//!
//! Checked 14 documents: 1 error, 1 warning
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! with no I/O.

use crate::check::CheckReport;
use crate::fetch::Manifest;
use crate::generate::GenerateReport;
use crate::schema::Level;
use crate::types::PageDocument;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn plural(count: usize, noun: &str) -> String {
    match count {
        1 => format!("1 {noun}"),
        n if noun.ends_with('y') => format!("{n} {}ies", &noun[..noun.len() - 1]),
        n => format!("{n} {noun}s"),
    }
}

fn page_label(page: &PageDocument) -> String {
    if page.is_home() {
        return "Home".to_string();
    }
    [page.title.as_deref(), page.seo.title.as_deref(), page.slug()]
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
        .unwrap_or(&page.id)
        .to_string()
}

fn block_count(page: &PageDocument) -> usize {
    page.page_builder.as_array().map_or(0, Vec::len)
}

// ============================================================================
// Stage 1: Fetch output
// ============================================================================

/// Format fetch stage output: site singletons, pages, redirects.
pub fn format_fetch_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Site".to_string()];
    if let Some(company) = manifest.settings.company_name.as_deref() {
        lines.push(format!("{}Company: {}", indent(1), company));
    }
    let menu = manifest.navigation.menu.as_ref().map_or(0, Vec::len);
    let footer = manifest.footer.menu.as_ref().map_or(0, Vec::len);
    lines.push(format!("{}Menu: {}", indent(1), plural(menu, "link")));
    lines.push(format!("{}Footer: {}", indent(1), plural(footer, "link")));
    if manifest.not_found.is_none() {
        lines.push(format!("{}Not found page: stock", indent(1)));
    }

    lines.push(String::new());
    lines.push("Pages".to_string());
    lines.push(format!("{} {}", format_index(0), page_label(&manifest.home)));
    lines.push(format!("{}Blocks: {}", indent(1), block_count(&manifest.home)));
    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), page_label(page)));
        if let Some(slug) = page.slug() {
            lines.push(format!("{}Slug: {}", indent(1), slug));
        }
        lines.push(format!("{}Blocks: {}", indent(1), block_count(page)));
    }

    if !manifest.redirects.is_empty() {
        lines.push(String::new());
        lines.push("Redirects".to_string());
        for (i, rule) in manifest.redirects.iter().enumerate() {
            lines.push(format!(
                "{} {} → {} ({})",
                format_index(i + 1),
                rule.source,
                rule.destination,
                rule.status()
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Fetched {}, {}, {}",
        plural(manifest.pages.len(), "page"),
        plural(manifest.redirects.len(), "redirect"),
        plural(manifest.sitemap.len(), "sitemap entry"),
    ));
    lines
}

pub fn print_fetch_output(manifest: &Manifest) {
    for line in format_fetch_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output: one line per written page, placeholders
/// as context lines, then the supporting files.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i), page.title, page.path));
        if !page.missing.is_empty() {
            lines.push(format!("{}Missing: {}", indent(1), page.missing.join(", ")));
        }
    }
    for slug in &report.skipped {
        lines.push(format!("{}Skipped: {} (unusable slug)", indent(1), slug));
    }

    lines.push(String::new());
    let not_found = if report.not_found { "" } else { " (stock)" };
    lines.push(format!("Not found page → 404.html{not_found}"));
    lines.push(format!("Stylesheet → {}", report.stylesheet));

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}",
        plural(report.pages.len(), "page"),
        plural(report.redirects, "redirect"),
        plural(report.sitemap_entries, "sitemap entry"),
        plural(report.assets, "asset"),
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format validation findings, grouped by document.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();
    for finding in &report.findings {
        let header = match &finding.title {
            Some(title) => format!("{} {} ({})", finding.doc_type, finding.id, title),
            None => format!("{} {}", finding.doc_type, finding.id),
        };
        lines.push(header);
        for issue in &finding.issues {
            let level = match issue.level {
                Level::Error => "error",
                Level::Warning => "warning",
            };
            lines.push(format!("{}{} {}: {}", indent(1), level, issue.path, issue.message));
        }
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}: {}, {}",
        plural(report.documents, "document"),
        plural(report.errors(), "error"),
        plural(report.warnings(), "warning"),
    ));
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::DocumentIssues;
    use crate::generate::PageReport;
    use crate::schema::Issue;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(0, "page"), "0 pages");
        assert_eq!(plural(3, "redirect"), "3 redirects");
        assert_eq!(plural(2, "sitemap entry"), "2 sitemap entries");
    }

    fn report() -> GenerateReport {
        GenerateReport {
            pages: vec![
                PageReport {
                    title: "Welcome".into(),
                    path: "index.html".into(),
                    blocks: 2,
                    structured_data: 1,
                    missing: vec!["legacyBanner".into()],
                },
                PageReport {
                    title: "About".into(),
                    path: "about/index.html".into(),
                    blocks: 1,
                    structured_data: 1,
                    missing: vec![],
                },
            ],
            skipped: vec!["../escape".into()],
            not_found: false,
            stylesheet: "style.3f9a1c2e.css".into(),
            redirects: 1,
            sitemap_entries: 2,
            assets: 0,
        }
    }

    #[test]
    fn generate_output_lists_pages() {
        let lines = format_generate_output(&report());
        assert_eq!(lines[0], "000 Welcome → index.html");
        assert_eq!(lines[1], "    Missing: legacyBanner");
        assert_eq!(lines[2], "001 About → about/index.html");
        assert_eq!(lines[3], "    Skipped: ../escape (unusable slug)");
        assert!(lines.contains(&"Not found page → 404.html (stock)".to_string()));
        assert!(lines.contains(&"Stylesheet → style.3f9a1c2e.css".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 2 pages, 1 redirect, 2 sitemap entries, 0 assets"
        );
    }

    #[test]
    fn check_output_groups_by_document() {
        let report = CheckReport {
            documents: 4,
            findings: vec![DocumentIssues {
                id: "p2".into(),
                doc_type: "genericPage".into(),
                title: Some("About us".into()),
                issues: vec![
                    Issue::error("slug", "Slug 'about' is already used by p1"),
                    Issue::warning("seo.description", "Too short"),
                ],
            }],
        };
        let lines = format_check_output(&report);
        assert_eq!(
            lines,
            vec![
                "genericPage p2 (About us)",
                "    error slug: Slug 'about' is already used by p1",
                "    warning seo.description: Too short",
                "",
                "Checked 4 documents: 1 error, 1 warning",
            ]
        );
    }

    #[test]
    fn empty_check_output_is_summary_only() {
        let lines = format_check_output(&CheckReport::default());
        assert_eq!(lines, vec!["Checked 0 documents: 0 errors, 0 warnings"]);
    }
}
