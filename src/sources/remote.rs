// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{create_downloader, parse_records, Error, Source as ISource, TypeInfo};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::instrument;
use url::Url;

pub static SOURCE_TYPE: LazyLock<TypeInfo> = LazyLock::new(|| TypeInfo {
    name: "remote",
    description: "Fetches the catalogue from the ingest API,
all projects in a single request (paging is encoded in the endpoint path).",
});

#[derive(Debug)]
pub struct Source {
    catalogue_url: Url,
    update_history_url: Url,
    downloader: ClientWithMiddleware,
}

impl Source {
    /// @param api_base_url Base URL of the API, e.g. `https://api.example.org`
    /// @param catalogue_path Path (and query) of the catalogue endpoint,
    ///   relative to `api_base_url`
    pub fn new(
        api_base_url: &Url,
        catalogue_path: &str,
        update_history_path: &str,
        user_agent: &str,
        retries: u32,
        timeout: u64,
    ) -> Result<Self, Error> {
        Ok(Self {
            catalogue_url: join_url(api_base_url, catalogue_path)?,
            update_history_url: join_url(api_base_url, update_history_path)?,
            downloader: create_downloader(user_agent, retries, timeout)?,
        })
    }

    #[must_use]
    pub const fn catalogue_url(&self) -> &Url {
        &self.catalogue_url
    }

    #[instrument(skip(self))]
    async fn fetch_records(&self, url: &Url) -> Result<Vec<Value>, Error> {
        tracing::info!("Fetching {} - '{url}' ...", self.info().name);
        let raw_text = self
            .downloader
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_records(&raw_text, url.as_str())
    }
}

/// Appends `path` (which may contain a query) to `base`,
/// keeping any path `base` already has.
fn join_url(base: &Url, path: &str) -> Result<Url, Error> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

#[async_trait(?Send)]
impl ISource for Source {
    fn info(&self) -> &'static TypeInfo {
        &SOURCE_TYPE
    }

    async fn fetch_raw_projects(&self) -> Result<Vec<Value>, Error> {
        self.fetch_records(&self.catalogue_url).await
    }

    async fn fetch_raw_update_history(&self) -> Result<Vec<Value>, Error> {
        self.fetch_records(&self.update_history_url).await
    }
}
