//! Image CDN URLs.
//!
//! The CMS stores images as asset documents whose id encodes everything the
//! CDN needs: `image-<hash>-<width>x<height>-<ext>`. A projected image field
//! already carries the asset URL; an unprojected one only carries the `_ref`,
//! so both are accepted and the URL is rebuilt from the id when needed.
//!
//! Sizing, quality and format are requested through query parameters:
//!
//! ```text
//! https://cdn.sanity.io/images/<project>/<dataset>/<hash>-1600x900.jpg?w=800&h=450&q=90&fit=max&auto=format
//! ```

use crate::config::ImagesConfig;
use crate::types::{ImageDimensions, ImageField};
use url::Url;

const CDN_ORIGIN: &str = "https://cdn.sanity.io";

/// Open Graph preview size.
pub const OG_IMAGE_SIZE: (u32, u32) = (1200, 630);

/// Builds sized CDN URLs for image fields.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
    quality: u32,
    default_width: u32,
}

/// Parts of an asset id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId<'a> {
    pub hash: &'a str,
    pub width: u32,
    pub height: u32,
    pub extension: &'a str,
}

/// Parse `image-<hash>-<w>x<h>-<ext>`.
pub fn parse_asset_id(id: &str) -> Option<AssetId<'_>> {
    let rest = id.strip_prefix("image-")?;
    let (rest, extension) = rest.rsplit_once('-')?;
    let (hash, size) = rest.rsplit_once('-')?;
    let (w, h) = size.split_once('x')?;
    if hash.is_empty() || extension.is_empty() {
        return None;
    }
    Some(AssetId {
        hash,
        width: w.parse().ok()?,
        height: h.parse().ok()?,
        extension,
    })
}

impl ImageUrlBuilder {
    pub fn new(project_id: &str, dataset: &str, images: &ImagesConfig) -> Self {
        Self {
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            quality: images.quality,
            default_width: images.default_width,
        }
    }

    /// Unsized source URL of an image, if it can be determined.
    ///
    /// A projected asset URL wins; otherwise the URL is derived from the
    /// asset id or reference.
    pub fn source_url(&self, image: &ImageField) -> Option<String> {
        let asset = image.asset.as_ref()?;
        if let Some(url) = asset.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        if self.project_id.is_empty() {
            return None;
        }
        let id = asset.id.as_deref().or(asset.reference.as_deref())?;
        let parsed = parse_asset_id(id)?;
        Some(format!(
            "{CDN_ORIGIN}/images/{}/{}/{}-{}x{}.{}",
            self.project_id,
            self.dataset,
            parsed.hash,
            parsed.width,
            parsed.height,
            parsed.extension
        ))
    }

    /// Intrinsic dimensions of the image, from the projection or the asset id.
    pub fn dimensions(&self, image: &ImageField) -> Option<ImageDimensions> {
        let asset = image.asset.as_ref()?;
        if let Some(dims) = asset.dimensions.filter(|d| d.width > 0 && d.height > 0) {
            return Some(dims);
        }
        let id = asset.id.as_deref().or(asset.reference.as_deref())?;
        let parsed = parse_asset_id(id)?;
        Some(ImageDimensions {
            width: parsed.width,
            height: parsed.height,
            aspect_ratio: Some(parsed.width as f64 / parsed.height.max(1) as f64),
        })
    }

    /// Sized CDN URL. A missing width uses the configured default; a missing
    /// height lets the CDN keep the aspect ratio.
    pub fn url(&self, image: &ImageField, width: Option<u32>, height: Option<u32>) -> Option<String> {
        let source = self.source_url(image)?;
        let Ok(mut url) = Url::parse(&source) else {
            return Some(source);
        };
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("w", &width.unwrap_or(self.default_width).to_string());
            if let Some(h) = height {
                query.append_pair("h", &h.to_string());
            }
            query
                .append_pair("q", &self.quality.to_string())
                .append_pair("fit", "max")
                .append_pair("auto", "format");
        }
        Some(url.into())
    }

    /// Open Graph image URL (1200x630).
    pub fn og_url(&self, image: &ImageField) -> Option<String> {
        let (w, h) = OG_IMAGE_SIZE;
        self.url(image, Some(w), Some(h))
    }

    /// Width and height attributes for an `<img>` rendered at `width`.
    ///
    /// Falls back to 800x600 when the intrinsic size is unknown.
    pub fn display_size(&self, image: &ImageField, width: u32) -> (u32, u32) {
        match self.dimensions(image) {
            Some(d) if d.width > 0 => {
                let height = (width as f64 * d.height as f64 / d.width as f64).round() as u32;
                (width, height.max(1))
            }
            _ => (800, 600),
        }
    }
}
