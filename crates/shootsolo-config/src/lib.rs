use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Semantic kind of public media directory a recording may be saved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Camera,
    Movies,
    Pictures,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 3] = [Self::Camera, Self::Movies, Self::Pictures];
}

/// What to do when the destination file name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Truncate and rewrite the existing file
    #[default]
    Overwrite,
    /// Pick the next free `name (n).ext`
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub subfolder: String,
    pub mime_type: String,
    pub candidates: Vec<MediaCategory>,
    pub collision: CollisionPolicy,
    pub cleanup_on_failure: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            subfolder: "Camera".to_string(),
            mime_type: "video/mp4".to_string(),
            candidates: MediaCategory::ALL.to_vec(),
            collision: CollisionPolicy::Overwrite,
            cleanup_on_failure: true,
        }
    }
}

/// Per-category replacements for the platform's public directories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pictures: Option<PathBuf>,
}

impl DirectoryOverrides {
    pub fn get(&self, category: MediaCategory) -> Option<&Path> {
        match category {
            MediaCategory::Camera => self.camera.as_deref(),
            MediaCategory::Movies => self.movies.as_deref(),
            MediaCategory::Pictures => self.pictures.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.camera.is_none() && self.movies.is_none() && self.pictures.is_none()
    }

    fn expand(&mut self) {
        for slot in [&mut self.camera, &mut self.movies, &mut self.pictures] {
            if let Some(path) = slot.take() {
                *slot = Some(Config::expand_path(&path).unwrap_or(path));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of the method channel names, e.g. `<prefix>/storage`
    pub channel_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation_lock: Option<Orientation>,
    pub gallery: GalleryConfig,
    #[serde(skip_serializing_if = "DirectoryOverrides::is_empty")]
    pub directories: DirectoryOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_prefix: "com.example.videorecord".to_string(),
            data_dir: None,
            orientation_lock: None,
            gallery: GalleryConfig::default(),
            directories: DirectoryOverrides::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in every configured path
        config.data_dir = config
            .data_dir
            .map(|path| Self::expand_path(&path).unwrap_or(path));
        config.directories.expand();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the config file if there is one, otherwise the defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/shootsolo");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn storage_channel(&self) -> String {
        format!("{}/storage", self.channel_prefix)
    }

    pub fn media_channel(&self) -> String {
        format!("{}/media", self.channel_prefix)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
