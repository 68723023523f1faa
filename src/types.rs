//! Documents shared between the fetch and generate stages.
//!
//! These types are the JSON shape of what the CMS returns for the composed
//! queries, and are serialized unchanged into the stage 1 manifest. Every
//! field the editor can leave empty is an `Option`: the CMS returns `null`
//! for unset fields, and rendering must never fail on absent data.

use crate::link::RawNavigationLink;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize `null` the same way as a missing field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fixed document id of the home page singleton.
pub const HOME_PAGE_ID: &str = "homePage";
/// Fixed document id of the not-found page singleton.
pub const NOT_FOUND_PAGE_ID: &str = "notFoundPage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default)]
    pub current: Option<String>,
}

/// An image field: asset reference plus alternative text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<ImageAsset>,
}

impl ImageField {
    /// Alternative text, if non-empty.
    pub fn alt_text(&self) -> Option<&str> {
        self.alt.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// Either a resolved asset (`asset->{...}`) or an unresolved `_ref` stub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAsset {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: Option<f64>,
}

/// Per-page SEO fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageField>,
    #[serde(deserialize_with = "null_default")]
    pub no_index: bool,
}

/// A page-builder page: the home page singleton or any slug-addressed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Internal title, not shown on the site.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "null_default")]
    pub seo: Seo,
    /// The block array, kept as received. The dispatcher coerces anything
    /// that is not an array to an empty block list.
    #[serde(rename = "pageBuilder", default)]
    pub page_builder: Value,
}

impl PageDocument {
    /// The page slug, if set and non-empty.
    pub fn slug(&self) -> Option<&str> {
        self.slug
            .as_ref()
            .and_then(|s| s.current.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn is_home(&self) -> bool {
        self.id == HOME_PAGE_ID || self.doc_type == HOME_PAGE_ID
    }
}

/// The not-found singleton, rendered to `404.html`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotFoundPage {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub seo: Seo,
    pub heading: Option<String>,
    pub subheading: Option<String>,
}

/// Site-wide contact and company details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub company_name: Option<String>,
    pub favicon: Option<ImageField>,
    pub contact_info: Option<ContactInfo>,
    pub address: Option<Address>,
    pub social_links: Option<SocialLinks>,
    pub copyright: Option<String>,
    pub vat_number_object: Option<VatNumber>,
}

impl GlobalSettings {
    pub fn email(&self) -> Option<&str> {
        self.contact_info
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub floor: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
}

impl Address {
    /// Address as display lines, skipping anything unset.
    ///
    /// `["Main Street 12, 2.", "1000 Copenhagen"]`
    pub fn lines(&self) -> Vec<String> {
        let street = join_present(
            &[&self.street_name, &self.street_number],
            " ",
        );
        let street = match (street, self.floor.as_deref()) {
            (Some(s), Some(floor)) if !floor.is_empty() => Some(format!("{s}, {floor}")),
            (s, _) => s,
        };
        let city = join_present(&[&self.zip_code, &self.city], " ");
        street.into_iter().chain(city).collect()
    }
}

fn join_present(parts: &[&Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.as_deref())
        .filter(|p| !p.is_empty())
        .collect();
    (!present.is_empty()).then(|| present.join(sep))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub linked_in: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VatNumber {
    pub vat_number_heading: Option<String>,
    pub vat_number: Option<String>,
}

/// The navigation singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Navigation {
    pub logo_text: Option<String>,
    pub menu: Option<Vec<RawNavigationLink>>,
    pub contact_button_text: Option<String>,
}

/// The footer singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub menu: Option<Vec<RawNavigationLink>>,
}

/// One row of the sitemap query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapPath {
    pub href: Option<String>,
    #[serde(rename = "_updatedAt")]
    pub updated_at: Option<String>,
}
