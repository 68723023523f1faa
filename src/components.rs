//! Shared HTML building blocks for module renderers.
//!
//! Each helper renders nothing when its data is absent, so renderers can
//! call them unconditionally.

use crate::image::ImageUrlBuilder;
use crate::jsonld::kebab_case;
use crate::link::NavigationLink;
use crate::types::ImageField;
use maud::{Markup, html};

/// Outer wrapper of every module: `section.module.module--<type>`.
pub fn section(block_type: &str, modifier: Option<&str>, content: Markup) -> Markup {
    let class = match modifier {
        Some(m) => format!("module module--{} module--{m}", kebab_case(block_type)),
        None => format!("module module--{}", kebab_case(block_type)),
    };
    html! {
        section class=(class) {
            div.container {
                (content)
            }
        }
    }
}

/// A heading at `level` (1-4), or nothing for blank text.
pub fn heading(level: u8, text: Option<&str>) -> Markup {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return html! {};
    };
    match level {
        1 => html! { h1.heading { (text) } },
        2 => html! { h2.heading { (text) } },
        3 => html! { h3.heading { (text) } },
        _ => html! { h4.heading { (text) } },
    }
}

/// A paragraph, or nothing for blank text. Line breaks are kept.
pub fn paragraph(text: Option<&str>) -> Markup {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return html! {};
    };
    html! {
        p {
            @for (i, line) in text.lines().enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
}

impl ButtonVariant {
    /// `"secondary"` is secondary; anything else, including absent, primary.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("secondary") => Self::Secondary,
            _ => Self::Primary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// A link styled as a button. Links without a label render nothing.
pub fn button(link: &NavigationLink, variant: ButtonVariant) -> Markup {
    let Some(label) = link.label.as_deref().filter(|l| !l.trim().is_empty()) else {
        return html! {};
    };
    html! {
        a class={ "button button--" (variant.as_str()) } href=(link.href())
            target=[link.is_external().then_some("_blank")]
            rel=[link.is_external().then_some("noopener noreferrer")] {
            (label)
        }
    }
}

/// A plain text link. Links without a label render nothing.
pub fn text_link(link: &NavigationLink) -> Markup {
    let Some(label) = link.label.as_deref().filter(|l| !l.trim().is_empty()) else {
        return html! {};
    };
    html! {
        a href=(link.href())
            target=[link.is_external().then_some("_blank")]
            rel=[link.is_external().then_some("noopener noreferrer")] {
            (label)
        }
    }
}

/// A responsive image. Renders only when both a source URL and alt text are
/// available.
pub fn image(
    images: &ImageUrlBuilder,
    field: Option<&ImageField>,
    width: u32,
    class: Option<&str>,
) -> Markup {
    let Some(field) = field else {
        return html! {};
    };
    let (Some(alt), Some(src)) = (field.alt_text(), images.url(field, Some(width), None)) else {
        return html! {};
    };
    let srcset = images
        .url(field, Some(width * 2), None)
        .map(|retina| format!("{src} 1x, {retina} 2x"));
    let (w, h) = images.display_size(field, width);
    html! {
        img class=[class] src=(src) srcset=[srcset] alt=(alt) width=(w) height=(h) loading="lazy" decoding="async";
    }
}
