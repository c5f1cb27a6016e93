//! GeoJSON features built from recordings

use serde::{Deserialize, Serialize};

use crate::bounds::LngLatBounds;
use crate::record::{display_text, FeedDocument, Recording};

/// Point geometry, coordinates in `[lon, lat]` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

/// Display fields carried by each plotted recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub gen: String,
    #[serde(default)]
    pub sp: String,
    #[serde(default)]
    pub loc: String,
    #[serde(default)]
    pub file: String,
    /// Absolute sonogram thumbnail URL, empty when the recording has none
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    /// Build a feature, or `None` if the recording has no usable position
    pub fn from_recording(record: &Recording) -> Option<Self> {
        let (lon, lat) = record.position()?;

        let image = record
            .sonogram_small()
            .map(|small| format!("https:{}", small))
            .unwrap_or_default();

        Some(Self {
            geometry: Geometry::Point {
                coordinates: [lon, lat],
            },
            properties: FeatureProperties {
                en: display_text(record.en.as_ref()),
                gen: display_text(record.gen.as_ref()),
                sp: display_text(record.sp.as_ref()),
                loc: display_text(record.loc.as_ref()),
                file: display_text(record.file.as_ref()),
                image,
            },
        })
    }

    /// `[lon, lat]`
    pub fn coordinates(&self) -> [f64; 2] {
        match self.geometry {
            Geometry::Point { coordinates } => coordinates,
        }
    }
}

/// The features of one dataset, in feed order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Keep recordings with a usable position, dropping the rest silently
    pub fn from_recordings(records: &[Recording]) -> Self {
        Self {
            features: records.iter().filter_map(Feature::from_recording).collect(),
        }
    }

    pub fn from_document(doc: &FeedDocument) -> Self {
        Self::from_recordings(&doc.records())
    }

    /// Parse raw feed JSON and transform it
    pub fn from_feed_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self::from_document(&FeedDocument::from_slice(bytes)?))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Box around every feature, `None` for an empty collection
    pub fn bounds(&self) -> Option<LngLatBounds> {
        LngLatBounds::from_coordinates(self.features.iter().map(Feature::coordinates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(feed: serde_json::Value) -> FeatureCollection {
        FeatureCollection::from_feed_slice(feed.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_single_frog_record() {
        let fc = collection(json!({
            "recordings": [{"lat": "27.5", "lon": "-81.2", "en": "Frog"}]
        }));

        assert_eq!(fc.len(), 1);
        let feature = &fc.features[0];
        assert_eq!(feature.coordinates(), [-81.2, 27.5]);
        assert_eq!(feature.properties.en, "Frog");
        assert_eq!(feature.properties.gen, "");
        assert_eq!(feature.properties.image, "");
    }

    #[test]
    fn test_invalid_positions_dropped() {
        let fc = collection(json!({
            "recordings": [
                {"en": "no coords"},
                {"en": "bad lat", "lat": "north", "lon": "-81"},
                {"en": "zero lon", "lat": "27", "lon": 0},
                {"en": "empty lon", "lat": "27", "lon": ""},
                {"en": "ok", "lat": 28.1, "lon": "-80.6"}
            ]
        }));

        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].properties.en, "ok");
        assert_eq!(fc.features[0].coordinates(), [-80.6, 28.1]);
    }

    #[test]
    fn test_feed_order_preserved() {
        let fc = collection(json!({
            "recordings": [
                {"en": "a", "lat": "1", "lon": "1"},
                {"en": "b", "lat": "2", "lon": "2"},
                {"en": "c", "lat": "3", "lon": "3"}
            ]
        }));

        let names: Vec<&str> = fc.features.iter().map(|f| f.properties.en.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_properties_mapped_from_record() {
        let fc = collection(json!({
            "recordings": [{
                "en": "Eastern Screech Owl",
                "gen": "Megascops",
                "sp": "asio",
                "loc": "Ocala National Forest",
                "lat": "29.2",
                "lon": "-81.7",
                "file": "https://xeno-canto.org/123/download",
                "sono": {"small": "//xeno-canto.org/sounds/ffts/XC123-small.png"}
            }]
        }));

        let p = &fc.features[0].properties;
        assert_eq!(p.gen, "Megascops");
        assert_eq!(p.sp, "asio");
        assert_eq!(p.loc, "Ocala National Forest");
        assert_eq!(p.file, "https://xeno-canto.org/123/download");
        assert_eq!(p.image, "https://xeno-canto.org/sounds/ffts/XC123-small.png");
    }

    #[test]
    fn test_geojson_shape() {
        let fc = collection(json!({
            "recordings": [{"lat": "27.5", "lon": "-81.2", "en": "Frog"}]
        }));

        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([-81.2, 27.5]));
        assert_eq!(value["features"][0]["properties"]["en"], "Frog");
    }

    #[test]
    fn test_empty_collection_has_no_bounds() {
        let fc = collection(json!({"recordings": []}));
        assert!(fc.is_empty());
        assert!(fc.bounds().is_none());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(FeatureCollection::from_feed_slice(b"{not json").is_err());
    }
}
