use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CrmResult;
use crate::model::{ContactSort, FullNameFormat};

/// How much of each contact a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outline {
    #[default]
    Long,
    Brief,
}

/// Listing and display preferences for contacts. Every field has a default,
/// so a settings file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub per_page: u32,
    pub outline: Outline,
    pub first_name_position: FullNameFormat,
    pub sort: ContactSort,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            per_page: 20,
            outline: Outline::Long,
            first_name_position: FullNameFormat::Before,
            sort: ContactSort::CreatedAtDesc,
        }
    }
}

impl ContactSettings {
    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> CrmResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let settings: ContactSettings = serde_json::from_str(&data)?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.per_page == 0 {
            self.per_page = Self::default().per_page;
        }
        self
    }
}

/// Where the database lives unless `--file` says otherwise.
pub fn default_db_path() -> PathBuf {
    PathBuf::from(".data").join("crm.db")
}
