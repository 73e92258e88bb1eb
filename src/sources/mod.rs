// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::Value;
use thiserror::Error;

use crate::{
    formatter,
    model::{project::Project, update_history::LastUpdated},
};

pub mod local;
pub mod remote;

pub const DEFAULT_RETRIES: u32 = 3;
/// in milliseconds (ms)
pub const DEFAULT_TIMEOUT: u64 = 10000;

/// Thrown when a [`Source`] failed to deliver its data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Some I/O problem while reading '{1}': '{0}'")]
    IOError(#[source] std::io::Error, String),
    #[error("Network/Internet download failed: '{0}'")]
    DownloadError(#[from] reqwest::Error),
    #[error("Network/Internet download failed: '{0}'")]
    DownloadMiddlewareError(#[from] reqwest_middleware::Error),
    #[error("Failed to parse a URL: '{0}'")]
    UrlParseError(#[from] url::ParseError),
    #[error("Failed to deserialize fetched data from '{1}' as JSON: {0}")]
    DeserializeAsJsonFailed(#[source] serde_json::Error, String),
    #[error("Fetched data from '{0}' is not a JSON array of records")]
    NotAList(String),
}

/// Contains descriptive data about a type of source.
pub struct TypeInfo {
    /// Machine-readable name/id of this type of source.
    /// It should be in "kebab-case".
    pub name: &'static str,

    /// Human-readable description of this type of source.
    pub description: &'static str,
}

/// Where the catalogue gets its raw records from.
#[async_trait(?Send)]
pub trait Source {
    /// Info about this type of source.
    fn info(&self) -> &'static TypeInfo;

    /// Fetches the raw, unformatted project records.
    async fn fetch_raw_projects(&self) -> Result<Vec<Value>, Error>;

    /// Fetches the raw, unformatted update-history entries.
    async fn fetch_raw_update_history(&self) -> Result<Vec<Value>, Error>;

    /// Fetches all projects, skipping the ones that fail to format.
    async fn fetch_projects(&self) -> Result<Vec<Project>, Error> {
        let raw_projects = self.fetch_raw_projects().await?;
        let projects = formatter::format_projects(&raw_projects);
        tracing::info!(
            "Fetched {} projects from {} ({} skipped).",
            projects.len(),
            self.info().name,
            raw_projects.len() - projects.len()
        );
        Ok(projects)
    }

    /// Fetches the update history, most recent entry first.
    async fn fetch_update_history(&self) -> Result<Vec<LastUpdated>, Error> {
        let raw_history = self.fetch_raw_update_history().await?;
        Ok(formatter::format_update_history(&raw_history))
    }
}

impl std::fmt::Display for dyn Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-source", self.info().name)
    }
}

/// Parses `raw_text` as a JSON list of records.
/// `origin` is only used for error reporting.
pub fn parse_records(raw_text: &str, origin: &str) -> Result<Vec<Value>, Error> {
    let json_val = serde_json::from_str::<Value>(raw_text).map_err(|serde_err| {
        tracing::warn!("Failed to parse data from '{origin}' as JSON:\n{serde_err}");
        Error::DeserializeAsJsonFailed(serde_err, origin.to_owned())
    })?;
    match json_val {
        Value::Array(records) => Ok(records),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => {
            Err(Error::NotAList(origin.to_owned()))
        }
    }
}

/// Creates a default set of headers for downloads.
fn create_headers(user_agent: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    match header::HeaderValue::from_str(user_agent) {
        Ok(user_agent_val) => {
            headers.insert(header::USER_AGENT, user_agent_val);
        }
        Err(err) => tracing::warn!("Ignoring invalid user-agent '{user_agent}': {err}"),
    }
    headers
}

/// Creates a new HTTP client with the supplied retry and timeout settings.
/// @param retries Number of retries for a single fetch
/// @param timeout Total timeout per request in milliseconds (ms)
pub fn create_downloader(
    user_agent: &str,
    retries: u32,
    timeout: u64,
) -> Result<ClientWithMiddleware, Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(retries);
    let client = Client::builder()
        .timeout(Duration::from_millis(timeout))
        .default_headers(create_headers(user_agent))
        .build()?;
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
