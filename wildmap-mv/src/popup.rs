//! Layer event handling: click-to-play popups and hover cursor

use serde::{Deserialize, Serialize};

use crate::feature::FeatureProperties;

/// Thumbnail width in the popup, pixels
const THUMBNAIL_WIDTH: u32 = 200;

/// An event the browser reports on the recordings layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerEvent {
    /// Click on a feature; `properties` are the top feature's
    Click {
        lng_lat: [f64; 2],
        properties: FeatureProperties,
    },
    MouseEnter,
    MouseLeave,
}

/// What the browser should do in response to a [`LayerEvent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum MapEffect {
    /// Open a new popup; earlier popups are left to the widget
    Popup { lng_lat: [f64; 2], html: String },
    /// Set the map canvas cursor; empty resets it
    Cursor { style: String },
}

pub fn effect_for(event: &LayerEvent) -> MapEffect {
    match event {
        LayerEvent::Click {
            lng_lat,
            properties,
        } => MapEffect::Popup {
            lng_lat: *lng_lat,
            html: render_popup_html(properties),
        },
        LayerEvent::MouseEnter => MapEffect::Cursor {
            style: "pointer".to_string(),
        },
        LayerEvent::MouseLeave => MapEffect::Cursor {
            style: String::new(),
        },
    }
}

/// Popup body: name, binomial, location, audio player, optional thumbnail
pub fn render_popup_html(p: &FeatureProperties) -> String {
    let mut html = format!(
        "<strong>{}</strong><br>\n<em>{} {}</em><br>\n{}<br><br>\n\
         <audio controls src=\"{}\" style=\"width:100%\"></audio><br>\n",
        escape_html(&p.en),
        escape_html(&p.gen),
        escape_html(&p.sp),
        escape_html(&p.loc),
        escape_html(&p.file),
    );

    if !p.image.is_empty() {
        html.push_str(&format!(
            "<img src=\"{}\" width=\"{}\">\n",
            escape_html(&p.image),
            THUMBNAIL_WIDTH
        ));
    }

    html
}

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
