//! Map widget abstraction
//!
//! [`MapSurface`] is the slice of a web map widget's API that the viewer
//! drives: one GeoJSON source, one circle layer, layer event handlers and
//! viewport fitting. [`CommandBuffer`] implements it by recording
//! serializable [`MapCommand`]s for a browser client to replay against the
//! real widget.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::LngLatBounds;
use crate::feature::FeatureCollection;

/// Id of the GeoJSON source holding the current dataset
pub const SOURCE_ID: &str = "recordings";

/// Id of the circle layer drawing [`SOURCE_ID`]
pub const LAYER_ID: &str = "recordings-layer";

/// Paint property that changes between datasets
pub const CIRCLE_COLOR: &str = "circle-color";

/// Padding in pixels around fitted data
pub const FIT_PADDING: u32 = 80;

/// Duration of the fit-to-data animation
pub const FIT_DURATION_MS: u64 = 1000;

/// Circle paint for the recordings layer.
///
/// Only the color varies per dataset; the rest is fixed for the layer's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirclePaint {
    #[serde(rename = "circle-radius")]
    pub radius: f64,
    #[serde(rename = "circle-color")]
    pub color: String,
    #[serde(rename = "circle-stroke-width")]
    pub stroke_width: f64,
    #[serde(rename = "circle-stroke-color")]
    pub stroke_color: String,
    #[serde(rename = "circle-opacity")]
    pub opacity: f64,
    #[serde(rename = "circle-stroke-opacity")]
    pub stroke_opacity: f64,
}

impl CirclePaint {
    pub fn with_color(color: impl Into<String>) -> Self {
        Self {
            radius: 6.0,
            color: color.into(),
            stroke_width: 1.5,
            stroke_color: "#fff".to_string(),
            opacity: 0.85,
            stroke_opacity: 0.9,
        }
    }
}

/// Layer definition as passed to the widget's `addLayer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub paint: CirclePaint,
}

impl LayerSpec {
    /// The recordings circle layer in the given color
    pub fn recordings(color: impl Into<String>) -> Self {
        Self {
            id: LAYER_ID.to_string(),
            kind: "circle".to_string(),
            source: SOURCE_ID.to_string(),
            paint: CirclePaint::with_color(color),
        }
    }
}

/// Layer events the viewer listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerEventKind {
    Click,
    MouseEnter,
    MouseLeave,
}

impl LayerEventKind {
    pub const ALL: [LayerEventKind; 3] = [
        LayerEventKind::Click,
        LayerEventKind::MouseEnter,
        LayerEventKind::MouseLeave,
    ];
}

/// Viewport animation settings for fit-to-bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    pub padding: u32,
    pub duration_ms: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: FIT_PADDING,
            duration_ms: FIT_DURATION_MS,
        }
    }
}

/// Operations the viewer performs on a map widget
pub trait MapSurface {
    fn add_source(&mut self, id: &str, data: &FeatureCollection);

    /// Replace a source's data in place
    fn set_source_data(&mut self, id: &str, data: &FeatureCollection);

    fn add_layer(&mut self, layer: &LayerSpec);

    fn set_paint_property(&mut self, layer_id: &str, property: &str, value: Value);

    /// Register the handler for `kind` events on a layer
    fn on_layer_event(&mut self, layer_id: &str, kind: LayerEventKind);

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions);
}

/// One recorded widget call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCommand {
    AddSource {
        id: String,
        data: FeatureCollection,
    },
    SetSourceData {
        id: String,
        data: FeatureCollection,
    },
    AddLayer {
        layer: LayerSpec,
    },
    SetPaintProperty {
        layer: String,
        property: String,
        value: Value,
    },
    OnLayerEvent {
        layer: String,
        event: LayerEventKind,
    },
    FitBounds {
        bounds: [[f64; 2]; 2],
        padding: u32,
        duration: u64,
    },
}

/// Surface that queues commands until drained
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<MapCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Take all queued commands, oldest first
    pub fn drain(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl MapSurface for CommandBuffer {
    fn add_source(&mut self, id: &str, data: &FeatureCollection) {
        self.commands.push(MapCommand::AddSource {
            id: id.to_string(),
            data: data.clone(),
        });
    }

    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) {
        self.commands.push(MapCommand::SetSourceData {
            id: id.to_string(),
            data: data.clone(),
        });
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        self.commands.push(MapCommand::AddLayer {
            layer: layer.clone(),
        });
    }

    fn set_paint_property(&mut self, layer_id: &str, property: &str, value: Value) {
        self.commands.push(MapCommand::SetPaintProperty {
            layer: layer_id.to_string(),
            property: property.to_string(),
            value,
        });
    }

    fn on_layer_event(&mut self, layer_id: &str, kind: LayerEventKind) {
        self.commands.push(MapCommand::OnLayerEvent {
            layer: layer_id.to_string(),
            event: kind,
        });
    }

    fn fit_bounds(&mut self, bounds: &LngLatBounds, options: &FitOptions) {
        self.commands.push(MapCommand::FitBounds {
            bounds: bounds.to_array(),
            padding: options.padding,
            duration: options.duration_ms,
        });
    }
}
