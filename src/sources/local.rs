// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{parse_records, Error, Source as ISource, TypeInfo};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::instrument;

pub static SOURCE_TYPE: LazyLock<TypeInfo> = LazyLock::new(|| TypeInfo {
    name: "local",
    description: "Reads the catalogue from static JSON asset files.",
});

#[derive(Debug)]
pub struct Source {
    catalogue_file: PathBuf,
    update_history_file: PathBuf,
}

impl Source {
    #[must_use]
    pub const fn new(catalogue_file: PathBuf, update_history_file: PathBuf) -> Self {
        Self {
            catalogue_file,
            update_history_file,
        }
    }

    #[instrument]
    async fn read_records(file: &Path) -> Result<Vec<Value>, Error> {
        let origin = file.display().to_string();
        tracing::debug!("Reading records from '{origin}' ...");
        let raw_text = tokio::fs::read_to_string(file)
            .await
            .map_err(|err| Error::IOError(err, origin.clone()))?;
        parse_records(&raw_text, &origin)
    }
}

#[async_trait(?Send)]
impl ISource for Source {
    fn info(&self) -> &'static TypeInfo {
        &SOURCE_TYPE
    }

    async fn fetch_raw_projects(&self) -> Result<Vec<Value>, Error> {
        Self::read_records(&self.catalogue_file).await
    }

    async fn fetch_raw_update_history(&self) -> Result<Vec<Value>, Error> {
        Self::read_records(&self.update_history_file).await
    }
}
