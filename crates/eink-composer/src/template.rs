//! Persisted composition state.
//!
//! A [`Template`] is the JSON record of a composition: canvas size plus
//! every layer with its variant tag and fields, enough to rebuild the
//! composer without loss.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composer::EinkComposer;
use crate::layer::Layer;
use crate::Result;

/// Serializable snapshot of a composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Template {
    /// Snapshot a composer's current state.
    pub fn from_composer(composer: &EinkComposer) -> Self {
        Self {
            width: composer.width(),
            height: composer.height(),
            layers: composer.layers().to_vec(),
        }
    }

    /// Rebuild a composer; every stored layer is re-validated on the way in.
    pub fn into_composer(self) -> Result<EinkComposer> {
        let mut composer = EinkComposer::new(self.width, self.height)?;
        for layer in self.layers {
            composer.add_layer(layer)?;
        }
        Ok(composer)
    }

    /// Load a template from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading template");
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the template to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), layers = self.layers.len(), "saving template");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{LayerUpdate, RenderOptions};
    use crate::layer::LayerKind;

    fn sample_composer() -> EinkComposer {
        let mut composer = EinkComposer::new(250, 128).unwrap();
        composer.add_rectangle_layer("border", 0, 0, 250, 128, false, 0).unwrap();
        composer.add_text_layer("title", "WEATHER", 90, 5, 0).unwrap();
        let update = LayerUpdate { font_size: Some(2), ..Default::default() };
        composer.update_layer("title", &update).unwrap();
        composer
    }

    #[test]
    fn round_trip_preserves_layers() {
        let composer = sample_composer();
        let template = Template::from_composer(&composer);

        let json = serde_json::to_string(&template).unwrap();
        let parsed: Template = serde_json::from_str(&json).unwrap();
        let rebuilt = parsed.into_composer().unwrap();

        assert_eq!(rebuilt.width(), 250);
        assert_eq!(rebuilt.height(), 128);
        assert_eq!(rebuilt.layer_count(), 2);

        let title = rebuilt.get_layer("title").unwrap();
        assert!(matches!(title.kind, LayerKind::Text(ref t) if t.text == "WEATHER" && t.font_size == 2));
    }

    #[test]
    fn round_trip_renders_identically() {
        let composer = sample_composer();
        let template = Template::from_composer(&composer);
        let json = serde_json::to_string(&template).unwrap();
        let rebuilt: Template = serde_json::from_str(&json).unwrap();
        let rebuilt = rebuilt.into_composer().unwrap();

        let opts = RenderOptions::default();
        let a = composer.render(&opts).unwrap();
        let b = rebuilt.render(&opts).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn duplicate_ids_fail_reconstruction() {
        let json = r#"{
            "width": 10,
            "height": 10,
            "layers": [
                {"id": "a", "type": "text", "text": "X"},
                {"id": "a", "type": "text", "text": "Y"}
            ]
        }"#;
        let template: Template = serde_json::from_str(json).unwrap();
        assert!(template.into_composer().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{
            "width": 10,
            "height": 10,
            "layers": [{"id": "t", "type": "text", "text": "HI"}]
        }"#;
        let template: Template = serde_json::from_str(json).unwrap();
        let composer = template.into_composer().unwrap();
        let layer = composer.get_layer("t").unwrap();
        assert!(layer.visible);
        assert_eq!(layer.x, 0);
        assert!(matches!(layer.kind, LayerKind::Text(ref t) if t.font_size == 1 && t.padding == 2));
    }

    #[test]
    fn file_round_trip() {
        let composer = sample_composer();
        let template = Template::from_composer(&composer);

        let path = std::env::temp_dir().join("eink-template-test.json");
        template.save(&path).unwrap();
        let loaded = Template::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.width, template.width);
        assert_eq!(loaded.layers.len(), template.layers.len());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(Template::load("/nonexistent/template.json").is_err());
    }
}
