use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InnkeepError, Result};

const CONFIG_FILENAME: &str = "config.json";

const DEFAULT_IMAGE_MAX_SIZE: u64 = 5 * 1024 * 1024;
const DEFAULT_MAP_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Tunables stored in `<data root>/config.json`. Absent file or fields fall
/// back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InnkeepConfig {
    /// Size cap for listing image uploads, in bytes.
    #[serde(default = "default_image_max_size")]
    pub image_max_size: u64,

    /// Size cap for offline map uploads, in bytes.
    #[serde(default = "default_map_max_size")]
    pub map_max_size: u64,
}

fn default_image_max_size() -> u64 {
    DEFAULT_IMAGE_MAX_SIZE
}

fn default_map_max_size() -> u64 {
    DEFAULT_MAP_MAX_SIZE
}

impl Default for InnkeepConfig {
    fn default() -> Self {
        Self {
            image_max_size: DEFAULT_IMAGE_MAX_SIZE,
            map_max_size: DEFAULT_MAP_MAX_SIZE,
        }
    }
}

impl InnkeepConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: InnkeepConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }
}

/// On-disk layout, all derived from one root:
///
/// ```text
/// <root>/
/// ├── config.json
/// ├── data/
/// │   ├── listings.json
/// │   ├── maps.json
/// │   ├── bookings.json
/// │   └── reviews/hotel_{id}_reviews.ndjson
/// └── uploads/
///     ├── hotels/
///     └── maps/
/// ```
#[derive(Debug, Clone)]
pub struct InnkeepPaths {
    root: PathBuf,
}

impl InnkeepPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory for the service user.
    pub fn discover() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "innkeep").ok_or_else(|| {
            InnkeepError::Store("could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn listings_file(&self) -> PathBuf {
        self.data_dir().join("listings.json")
    }

    pub fn maps_file(&self) -> PathBuf {
        self.data_dir().join("maps.json")
    }

    pub fn bookings_file(&self) -> PathBuf {
        self.data_dir().join("bookings.json")
    }

    pub fn reviews_dir(&self) -> PathBuf {
        self.data_dir().join("reviews")
    }

    pub fn hotel_uploads_dir(&self) -> PathBuf {
        self.root.join("uploads").join("hotels")
    }

    pub fn map_uploads_dir(&self) -> PathBuf {
        self.root.join("uploads").join("maps")
    }
}
