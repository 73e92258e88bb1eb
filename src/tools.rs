// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const USER_AGENT_DEFAULT: &str = "elwazi-catalogue github.com/elwazi/elwazi-catalogue";

/// A value that may be given either as a single item or as a list of items.
///
/// Some fields of the source data are inconsistent in this regard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// A point in time as found in the source data;
/// either milliseconds since the UNIX epoch,
/// or a string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Interprets the timestamp as UTC.
    /// Strings are tried as RFC 3339 first,
    /// and as plain date (`%Y-%m-%d`) second.
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|date_time| date_time.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|date_time| date_time.and_utc())
                }),
        }
    }
}

/// Formats the date part of a UTC timestamp the british way,
/// e.g. `31/01/2022`.
#[must_use]
pub fn format_date_en_gb(date_time: &DateTime<Utc>) -> String {
    date_time.format("%d/%m/%Y").to_string()
}
