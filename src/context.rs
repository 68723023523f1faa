//! Read-only data shared by every renderer.

use crate::blocks::BlockRegistry;
use crate::config::SiteSection;
use crate::image::ImageUrlBuilder;
use crate::link::{NavigationLink, normalize_links};
use crate::types::{Footer, GlobalSettings, Navigation};
use url::Url;

/// Site-wide singletons, loaded once and shared by every page.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    pub name: String,
    pub base_url: String,
    pub language: String,
    pub settings: GlobalSettings,
    pub menu: Vec<NavigationLink>,
    pub footer_menu: Vec<NavigationLink>,
    pub logo_text: Option<String>,
    pub contact_button_text: Option<String>,
}

impl SiteContext {
    pub fn new(
        site: &SiteSection,
        settings: GlobalSettings,
        navigation: &Navigation,
        footer: &Footer,
    ) -> Self {
        Self {
            name: site.name.clone(),
            base_url: site.base_url.clone(),
            language: site.language.clone(),
            settings,
            menu: normalize_links(navigation.menu.as_deref()),
            footer_menu: normalize_links(footer.menu.as_deref()),
            logo_text: navigation.logo_text.clone().filter(|t| !t.is_empty()),
            contact_button_text: navigation.contact_button_text.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Absolute URL of a site path. Falls back to the bare path when the
    /// base URL does not parse.
    pub fn absolute_url(&self, path: &str) -> String {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }
}

/// Everything a block renderer may read.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub site: &'a SiteContext,
    /// Block types this site variant renders.
    pub registry: &'a BlockRegistry,
    pub images: &'a ImageUrlBuilder,
    /// Studio origin appended to visual-editing attributes.
    pub studio_url: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RawNavigationLink;
    use serde_json::json;

    #[test]
    fn new_normalizes_menus() {
        let navigation = Navigation {
            logo_text: Some(String::new()),
            menu: Some(vec![RawNavigationLink::from_value(&json!({
                "label": "About",
                "linkType": "internal",
                "page": {"_id": "p1", "_type": "genericPage", "slug": "about"}
            }))]),
            contact_button_text: Some("Contact".into()),
        };
        let site = SiteContext::new(
            &SiteSection::default(),
            GlobalSettings::default(),
            &navigation,
            &Footer::default(),
        );
        assert_eq!(site.menu.len(), 1);
        assert_eq!(site.menu[0].href(), "/about");
        assert!(site.footer_menu.is_empty());
        assert_eq!(site.logo_text, None);
        assert_eq!(site.contact_button_text.as_deref(), Some("Contact"));
    }

    #[test]
    fn absolute_url_joins_base() {
        let site = SiteContext {
            base_url: "https://studio.example".into(),
            ..Default::default()
        };
        assert_eq!(site.absolute_url("/about"), "https://studio.example/about");
        assert_eq!(site.absolute_url("/"), "https://studio.example/");
    }
}
