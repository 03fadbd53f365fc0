use crate::error::{DistMapError, Result};
use distmap_common::report::{DEFAULT_FILE_PREFIX, DEFAULT_MAPS_URL_TEMPLATE};
use distmap_common::{RenderOptions, ZonePalette, DEFAULT_ZOOM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured dataset path
pub const DATA_PATH_ENV: &str = "DISTMAP_DATA";

const DEFAULT_DATA_PATH: &str = "data/clientes.csv";
const MAX_ZOOM: u8 = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    pub zoom: u8,
    pub map_width_px: u32,
    pub map_height_px: u32,
    pub maps_url_template: String,
    pub report_title: String,
    pub map_title: String,
    pub file_prefix: String,
    pub zone_colors: ZonePalette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            zoom: DEFAULT_ZOOM,
            map_width_px: distmap_common::layout::MAP_IMAGE_WIDTH_PX,
            map_height_px: distmap_common::layout::MAP_IMAGE_HEIGHT_PX,
            maps_url_template: DEFAULT_MAPS_URL_TEMPLATE.into(),
            report_title: "Selected clients".into(),
            map_title: "Client distribution map".into(),
            file_prefix: DEFAULT_FILE_PREFIX.into(),
            zone_colors: ZonePalette::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DistMapError::Config("no se encontró el directorio personal".into()))?;
        Ok(home.join(".config").join("distmap").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.zoom == 0 || self.zoom > MAX_ZOOM {
            return Err(DistMapError::Config(format!(
                "el zoom debe estar entre 1 y {}, se recibió {}",
                MAX_ZOOM, self.zoom
            )));
        }
        if self.map_width_px == 0 || self.map_height_px == 0 {
            return Err(DistMapError::Config("el tamaño del mapa no puede ser cero".into()));
        }
        if !self.maps_url_template.contains("{lat}") || !self.maps_url_template.contains("{lng}") {
            return Err(DistMapError::Config(
                "maps_url_template debe contener {lat} y {lng}".into(),
            ));
        }
        Ok(())
    }

    /// Dataset path: CLI override, then environment, then config file
    pub fn resolve_data_path(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_override {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(DATA_PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        self.data_path.clone()
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            zoom: self.zoom,
            palette: self.zone_colors.clone(),
        }
    }

    pub fn set_data_path(&mut self, path: PathBuf) -> Result<()> {
        self.data_path = path;
        self.save()
    }

    pub fn set_zoom(&mut self, zoom: u8) -> Result<()> {
        self.zoom = zoom;
        self.validate()?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.zoom, 12);
        assert_eq!(config.data_path, PathBuf::from("data/clientes.csv"));
        assert_eq!(config.map_width_px, 1400);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            zoom: 10,
            report_title: "Ruta Norte".into(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.zoom, 10);
        assert_eq!(loaded.report_title, "Ruta Norte");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"zoom": 14, "zone_colors": {"SU09": "blue"}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.zoom, 14);
        assert_eq!(config.maps_url_template, DEFAULT_MAPS_URL_TEMPLATE);
        assert_eq!(
            config.zone_colors.color_for("SU09"),
            distmap_common::MarkerColor::Blue
        );
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let config = Config { zoom: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(DistMapError::Config(_))));

        let config = Config { zoom: 19, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_template_needs_placeholders() {
        let config = Config {
            maps_url_template: "https://maps.example/?q={lat}".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_override_wins() {
        let config = Config::default();
        let path = config.resolve_data_path(Some(Path::new("/tmp/otro.csv")));
        assert_eq!(path, PathBuf::from("/tmp/otro.csv"));
    }
}
