use std::path::{Path, PathBuf};

use anyhow::Context as _;
use plenka_core::{
    SessionOptions,
    plenka_state::{Coordinate, Span, YearRange, api},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub map: Map,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub favourites: Favourites,
}
impl Config {
    pub const FILENAME: &str = "plenka.toml";

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, toml::to_string(self)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Server {
    pub base_url: String,
}
impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: api::Client::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Map {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub span: f64,
    pub year_from: i32,
    pub year_to: i32,
    pub region_expansion: f64,
    pub group_divisor: f64,
    pub debounce_ms: u64,
}
impl Default for Map {
    fn default() -> Self {
        let options = SessionOptions::default();
        Self {
            center_latitude: 56.329707,
            center_longitude: 44.009087,
            span: 0.05,
            year_from: options.years.start(),
            year_to: options.years.end(),
            region_expansion: options.region_expansion,
            group_divisor: options.group_divisor,
            debounce_ms: plenka_core::session_thread::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}
impl Map {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_latitude, self.center_longitude)
    }

    pub fn span(&self) -> Span {
        Span::square(self.span)
    }

    pub fn years(&self) -> YearRange {
        YearRange::new(self.year_from, self.year_to)
    }

    pub fn session_options(&self, years: YearRange) -> SessionOptions {
        SessionOptions {
            years,
            region_expansion: self.region_expansion,
            group_divisor: self.group_divisor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Images {
    pub max_cached: usize,
}
impl Default for Images {
    fn default() -> Self {
        Self {
            max_cached: plenka_core::image_fetcher::DEFAULT_MAX_CACHED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Favourites {
    pub path: PathBuf,
}
impl Default for Favourites {
    fn default() -> Self {
        Self {
            path: PathBuf::from("favourites.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "https://pastvu.com");
        assert_eq!(config.map.years(), YearRange::new(1826, 2000));
        assert_eq!(config.map.debounce_ms, 150);
        assert_eq!(config.map.region_expansion, 1.2);
        assert_eq!(config.map.group_divisor, 7.0);
        assert_eq!(config.images.max_cached, 64);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "http://localhost:3000"

            [map]
            year_from = 1900
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.map.year_from, 1900);
        assert_eq!(config.map.year_to, 2000);
        assert_eq!(config.map.span, 0.05);
        assert_eq!(config.favourites, Favourites::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(Config::FILENAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Config::FILENAME);

        let mut config = Config::default();
        config.map.center_latitude = 59.93;
        config.images.max_cached = 8;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Config::FILENAME);
        std::fs::write(&path, "[map]\nspan = \"wide\"").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
