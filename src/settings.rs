// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(clippy::shadow_reuse)]

use crate::export::{self, Column};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::sources::{self, local, remote, Source, DEFAULT_RETRIES, DEFAULT_TIMEOUT};
use crate::tools::USER_AGENT_DEFAULT;
use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use typed_builder::TypedBuilder;
use url::Url;

pub const CONFIG_FILE_DEFAULT: &str = "catalogue.yml";
pub const ENV_PREFIX: &str = "ELWAZI_CATALOGUE";
pub const ASSETS_DIR_DEFAULT: &str = "./assets";
pub const CATALOGUE_PATH_LOCAL_DEFAULT: &str = "cohort_data.json";
pub const CATALOGUE_PATH_REMOTE_DEFAULT: &str = "/projects/search/catalogue?page=0&size=1000";
pub const UPDATE_HISTORY_PATH_DEFAULT: &str = "update_history.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load the basic/low-level configuration data: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to create the data source from the configuration data: {0}")]
    SourceCreation(#[from] sources::Error),
    #[error("The number of items per page has to be positive")]
    ZeroItemsPerPage,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub file_name: PathBuf,
    pub columns: Vec<Column>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from(export::DEFAULT_FILE_NAME),
            columns: vec![
                Column::new("cohort_name", "Project"),
                Column::new("countries", "Countries"),
                Column::new("available_data_types.demographic", "Demographics"),
            ],
        }
    }
}

/// The settings as they come from the config sources,
/// before the data source got created.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IntermediateSettings {
    pub user_agent: String,
    /// If set, the catalogue is fetched from this API,
    /// else it is read from local asset files in `assets_dir`.
    pub api_base_url: Option<Url>,
    pub assets_dir: PathBuf,
    pub catalogue_path: Option<String>,
    pub update_history_path: String,
    pub items_per_page: usize,
    pub retries: Option<u32>,
    /// Request timeout in milliseconds (ms)
    pub timeout: Option<u64>,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(TypedBuilder)]
pub struct Settings {
    pub user_agent: String,
    pub items_per_page: usize,
    pub export: ExportSettings,
    pub source: Box<dyn Source>,
}

impl IntermediateSettings {
    pub fn finalize(self) -> Result<Settings, SettingsError> {
        if self.items_per_page == 0 {
            return Err(SettingsError::ZeroItemsPerPage);
        }
        let source: Box<dyn Source> = match &self.api_base_url {
            Some(api_base_url) => {
                let catalogue_path = self
                    .catalogue_path
                    .as_deref()
                    .unwrap_or(CATALOGUE_PATH_REMOTE_DEFAULT);
                tracing::debug!("Using remote source: '{api_base_url}' + '{catalogue_path}'");
                Box::new(remote::Source::new(
                    api_base_url,
                    catalogue_path,
                    &self.update_history_path,
                    &self.user_agent,
                    self.retries.unwrap_or(DEFAULT_RETRIES),
                    self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                )?)
            }
            None => {
                let catalogue_path = self
                    .catalogue_path
                    .as_deref()
                    .unwrap_or(CATALOGUE_PATH_LOCAL_DEFAULT);
                tracing::debug!(
                    "Using local source: '{}' / '{catalogue_path}'",
                    self.assets_dir.display()
                );
                Box::new(local::Source::new(
                    self.assets_dir.join(catalogue_path),
                    self.assets_dir.join(&self.update_history_path),
                ))
            }
        };

        Ok(Settings {
            user_agent: self.user_agent,
            items_per_page: self.items_per_page,
            export: self.export,
            source,
        })
    }
}

/// Loads the intermediate settings, layered as:
/// built-in defaults, the config file (optional), and the environment
/// (e.g. `ELWAZI_CATALOGUE_ITEMS_PER_PAGE=50`).
pub fn load_intermediate(config_file: Option<&Path>) -> Result<IntermediateSettings, SettingsError> {
    let config_file_source = match config_file {
        Some(file) => config::File::from(file).required(true),
        None => config::File::with_name(CONFIG_FILE_DEFAULT).required(false),
    };
    let settings_loader = Config::builder()
        .set_default("user_agent", USER_AGENT_DEFAULT)?
        .set_default("assets_dir", ASSETS_DIR_DEFAULT)?
        .set_default("update_history_path", UPDATE_HISTORY_PATH_DEFAULT)?
        .set_default(
            "items_per_page",
            i64::try_from(DEFAULT_ITEMS_PER_PAGE).unwrap_or(20),
        )?
        .add_source(config_file_source)
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let intermediate_settings = settings_loader.try_deserialize::<IntermediateSettings>()?;

    tracing::debug!("{intermediate_settings:#?}");

    Ok(intermediate_settings)
}

/// # Errors
///
/// - the config loader fails to build
/// - settings failed to load and deserialize into intermediate settings
/// - the intermediate settings fail to finalize into the final settings
pub fn load(config_file: Option<&Path>) -> Result<Settings, SettingsError> {
    load_intermediate(config_file)?.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(load_intermediate(Some(&missing)).is_err());
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "items_per_page: 5\nassets_dir: /srv/assets\nexport:\n  file_name: out.tsv\n  columns:\n    - path: cohort_name\n      label: Name"
        )
        .unwrap();
        let intermediate = load_intermediate(Some(file.path())).unwrap();
        assert_eq!(intermediate.items_per_page, 5);
        assert_eq!(intermediate.assets_dir, PathBuf::from("/srv/assets"));
        assert_eq!(intermediate.user_agent, USER_AGENT_DEFAULT);
        assert_eq!(intermediate.api_base_url, None);
        assert_eq!(intermediate.export.columns, vec![Column::new("cohort_name", "Name")]);

        let settings = intermediate.finalize().unwrap();
        assert_eq!(settings.source.info().name, "local");
        assert_eq!(settings.items_per_page, 5);
    }

    #[test]
    fn test_remote_source_chosen_by_api_url() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "api_base_url: https://api.example.org").unwrap();
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.source.info().name, "remote");
        assert_eq!(settings.items_per_page, DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(settings.export, ExportSettings::default());
    }

    #[test]
    fn test_zero_items_per_page_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "items_per_page: 0").unwrap();
        assert!(matches!(
            load(Some(file.path())),
            Err(SettingsError::ZeroItemsPerPage)
        ));
    }
}
