//! Map view state: the one source/layer pair and how datasets reach it
//!
//! The first successful load creates the `recordings` source, the circle
//! layer and its three event handlers. Every later load swaps the source
//! data and the circle color in place; nothing is recreated and the
//! handlers are never installed twice.

use serde_json::Value;
use tracing::debug;
use wildmap_common::ResolvedDataset;

use crate::feature::FeatureCollection;
use crate::popup::{effect_for, LayerEvent, MapEffect};
use crate::surface::{
    FitOptions, LayerEventKind, LayerSpec, MapSurface, CIRCLE_COLOR, LAYER_ID, SOURCE_ID,
};

/// Owner of the map widget's recordings source and layer
#[derive(Debug)]
pub struct MapViewState<S> {
    surface: S,
    layer_installed: bool,
    active_dataset: Option<ResolvedDataset>,
    feature_count: usize,
    fit: FitOptions,
    /// Generation of the load currently displayed (0 = none yet)
    applied_generation: u64,
}

impl<S: MapSurface> MapViewState<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            layer_installed: false,
            active_dataset: None,
            feature_count: 0,
            fit: FitOptions::default(),
            applied_generation: 0,
        }
    }

    /// Show `collection` as the current dataset.
    ///
    /// Creates the source and layer on first use, updates them in place
    /// afterwards, then fits the viewport unless the collection is empty.
    pub fn create_or_update(&mut self, dataset: &ResolvedDataset, collection: &FeatureCollection) {
        if self.layer_installed {
            self.surface.set_source_data(SOURCE_ID, collection);
            self.surface
                .set_paint_property(LAYER_ID, CIRCLE_COLOR, Value::String(dataset.color.clone()));
        } else {
            self.surface.add_source(SOURCE_ID, collection);
            self.surface.add_layer(&LayerSpec::recordings(dataset.color.clone()));
            for kind in LayerEventKind::ALL {
                self.surface.on_layer_event(LAYER_ID, kind);
            }
            self.layer_installed = true;
        }

        if let Some(bounds) = collection.bounds() {
            self.surface.fit_bounds(&bounds, &self.fit);
        } else {
            debug!(file = %dataset.file, "Empty dataset, viewport unchanged");
        }

        self.active_dataset = Some(dataset.clone());
        self.feature_count = collection.len();
    }

    /// Route a layer event to its effect.
    ///
    /// `None` until the layer exists, since no handler is installed yet.
    pub fn handle_event(&self, event: &LayerEvent) -> Option<MapEffect> {
        self.layer_installed.then(|| effect_for(event))
    }

    pub fn is_layer_installed(&self) -> bool {
        self.layer_installed
    }

    pub fn active_dataset(&self) -> Option<&ResolvedDataset> {
        self.active_dataset.as_ref()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }

    pub(crate) fn mark_applied(&mut self, generation: u64) {
        self.applied_generation = generation;
    }

    /// Forget the widget state, e.g. after the browser built a fresh map.
    ///
    /// The applied generation survives so loads begun before the reset
    /// still compare against it.
    pub fn reset(&mut self)
    where
        S: Default,
    {
        *self = Self {
            applied_generation: self.applied_generation,
            ..Self::new(S::default())
        };
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::LngLatBounds;
    use crate::feature::FeatureProperties;
    use crate::surface::{CirclePaint, CommandBuffer, MapCommand};
    use std::collections::HashMap;
    use wildmap_common::DatasetCatalog;

    /// In-memory widget holding what a real map would display
    #[derive(Debug, Default)]
    struct FakeMap {
        pub sources: HashMap<String, FeatureCollection>,
        pub layers: HashMap<String, LayerSpec>,
        pub handlers: Vec<(String, LayerEventKind)>,
        pub viewport: Option<LngLatBounds>,
        pub fit_calls: usize,
    }

    impl MapSurface for FakeMap {
        fn add_source(&mut self, id: &str, data: &FeatureCollection) {
            assert!(!self.sources.contains_key(id), "source {} added twice", id);
            self.sources.insert(id.to_string(), data.clone());
        }

        fn set_source_data(&mut self, id: &str, data: &FeatureCollection) {
            let source = self.sources.get_mut(id).expect("source must exist");
            *source = data.clone();
        }

        fn add_layer(&mut self, layer: &LayerSpec) {
            assert!(!self.layers.contains_key(&layer.id), "layer added twice");
            self.layers.insert(layer.id.clone(), layer.clone());
        }

        fn set_paint_property(&mut self, layer_id: &str, property: &str, value: Value) {
            let layer = self.layers.get_mut(layer_id).expect("layer must exist");
            assert_eq!(property, CIRCLE_COLOR);
            layer.paint.color = value.as_str().unwrap().to_string();
        }

        fn on_layer_event(&mut self, layer_id: &str, kind: LayerEventKind) {
            self.handlers.push((layer_id.to_string(), kind));
        }

        fn fit_bounds(&mut self, bounds: &LngLatBounds, _options: &FitOptions) {
            self.viewport = Some(*bounds);
            self.fit_calls += 1;
        }
    }

    fn collection_at(points: &[(f64, f64)]) -> FeatureCollection {
        let body = serde_json::json!({
            "recordings": points
                .iter()
                .enumerate()
                .map(|(i, (lon, lat))| serde_json::json!({
                    "en": format!("rec-{}", i),
                    "lat": lat.to_string(),
                    "lon": lon.to_string()
                }))
                .collect::<Vec<_>>()
        });
        FeatureCollection::from_feed_slice(body.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_first_load_creates_source_layer_and_handlers() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(&catalog.resolve("frogs.json"), &collection_at(&[(-81.2, 27.5)]));

        let map = view.surface();
        assert_eq!(map.sources[SOURCE_ID].len(), 1);
        assert_eq!(map.sources[SOURCE_ID].features[0].coordinates(), [-81.2, 27.5]);
        assert_eq!(map.layers[LAYER_ID].paint.color, "#2a9d8f");
        assert_eq!(map.handlers.len(), 3);
        assert!(view.is_layer_installed());
    }

    #[test]
    fn test_handlers_installed_once_across_loads() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        for name in ["frogs", "owls", "birds", "mammals", "frogs"] {
            view.create_or_update(&catalog.resolve(name), &collection_at(&[(-81.0, 27.0)]));
        }

        let kinds: Vec<LayerEventKind> = view.surface().handlers.iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds, LayerEventKind::ALL.to_vec());
    }

    #[test]
    fn test_second_dataset_replaces_features() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(
            &catalog.resolve("frogs"),
            &collection_at(&[(-81.2, 27.5), (-80.1, 25.7)]),
        );
        view.create_or_update(&catalog.resolve("owls"), &collection_at(&[(-84.3, 30.4)]));

        let shown = &view.surface().sources[SOURCE_ID];
        assert_eq!(shown.len(), 1);
        assert_eq!(shown.features[0].coordinates(), [-84.3, 30.4]);
        assert_eq!(view.feature_count(), 1);
        assert_eq!(view.active_dataset().unwrap().id.as_deref(), Some("owls"));
    }

    #[test]
    fn test_switch_changes_only_circle_color() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(&catalog.resolve("frogs"), &collection_at(&[(-81.0, 27.0)]));
        let before = view.surface().layers[LAYER_ID].paint.clone();

        view.create_or_update(&catalog.resolve("owls"), &collection_at(&[(-81.0, 27.0)]));
        let after = view.surface().layers[LAYER_ID].paint.clone();

        assert_eq!(before.color, "#2a9d8f");
        assert_eq!(after.color, "#8e44ad");
        assert_eq!(
            CirclePaint {
                color: after.color.clone(),
                ..before
            },
            after
        );
    }

    #[test]
    fn test_update_emits_only_data_and_color_commands() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(CommandBuffer::new());

        view.create_or_update(&catalog.resolve("frogs"), &collection_at(&[(-81.0, 27.0)]));
        view.surface_mut().drain();

        view.create_or_update(&catalog.resolve("mammals"), &FeatureCollection::default());
        let commands = view.surface_mut().drain();

        assert_eq!(commands.len(), 2);
        assert!(matches!(&commands[0], MapCommand::SetSourceData { id, data } if id == SOURCE_ID && data.is_empty()));
        assert_eq!(
            commands[1],
            MapCommand::SetPaintProperty {
                layer: LAYER_ID.to_string(),
                property: CIRCLE_COLOR.to_string(),
                value: Value::String("#264653".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_dataset_leaves_viewport_unchanged() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(&catalog.resolve("frogs"), &collection_at(&[(-81.2, 27.5)]));
        let viewport = view.surface().viewport;

        view.create_or_update(&catalog.resolve("owls"), &FeatureCollection::default());

        assert_eq!(view.surface().viewport, viewport);
        assert_eq!(view.surface().fit_calls, 1);
    }

    #[test]
    fn test_viewport_fits_all_features() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(
            &catalog.resolve("birds"),
            &collection_at(&[(1.2, 52.1), (1.7, 52.4), (0.9, 51.9)]),
        );

        let viewport = view.surface().viewport.unwrap();
        assert_eq!(viewport.sw, [0.9, 51.9]);
        assert_eq!(viewport.ne, [1.7, 52.4]);
    }

    #[test]
    fn test_unknown_dataset_drawn_in_default_color() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        view.create_or_update(&catalog.resolve("bats.json"), &collection_at(&[(-81.0, 27.0)]));

        assert_eq!(view.surface().layers[LAYER_ID].paint.color, "#000");
    }

    #[test]
    fn test_reset_recreates_layer_on_next_load() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(CommandBuffer::new());

        view.create_or_update(&catalog.resolve("frogs"), &collection_at(&[(-81.0, 27.0)]));
        view.mark_applied(3);
        view.reset();

        assert!(!view.is_layer_installed());
        assert!(view.active_dataset().is_none());
        assert!(view.surface().commands().is_empty());
        assert_eq!(view.applied_generation(), 3);

        view.create_or_update(&catalog.resolve("owls"), &collection_at(&[(-81.0, 27.0)]));
        assert!(matches!(view.surface().commands()[0], MapCommand::AddSource { .. }));
    }

    #[test]
    fn test_events_ignored_before_layer_exists() {
        let catalog = DatasetCatalog::builtin();
        let mut view = MapViewState::new(FakeMap::default());

        assert!(view.handle_event(&LayerEvent::MouseEnter).is_none());

        view.create_or_update(&catalog.resolve("frogs"), &collection_at(&[(-81.0, 27.0)]));

        let effect = view.handle_event(&LayerEvent::Click {
            lng_lat: [-81.0, 27.0],
            properties: FeatureProperties {
                en: "rec-0".to_string(),
                ..Default::default()
            },
        });
        assert!(matches!(effect, Some(MapEffect::Popup { .. })));
    }
}
