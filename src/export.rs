// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tab-separated-values (TSV) export of records.
//!
//! The first line holds the column labels,
//! each further line one record.
//! Cells are separated by tabs, lines by CRLF,
//! and there is no trailing line-break.
//! Cells containing a tab, a line-break or a quote are quoted.

use csv_async::{AsyncWriterBuilder, QuoteStyle, Terminator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const CELL_SEPARATOR: u8 = b'\t';
pub const ROW_SEPARATOR: &str = "\r\n";
pub const DEFAULT_FILE_NAME: &str = "elwazi_catalogue_export.tsv";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to serialize record {0} for export: {1}")]
    Serialize(usize, #[source] serde_json::Error),
    #[error("Column path '{0}' can not be resolved in record {1}; stuck at '{2}'")]
    UnresolvablePath(String, usize, String),
    #[error("Failed to encode the TSV: {0}")]
    Encode(#[from] csv_async::Error),
    #[error("The encoded TSV is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Failed to write the export file: {0}")]
    Io(#[from] std::io::Error),
}

/// A column resolved by a dotted path (e.g. `available_data_types.demographic`)
/// into the serialized record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub path: String,
    pub label: String,
}

impl Column {
    #[must_use]
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// A column that extracts its cell with a function.
pub struct AccessorColumn<'a, T> {
    pub label: String,
    pub accessor: Box<dyn Fn(&T) -> String + 'a>,
}

impl<'a, T> AccessorColumn<'a, T> {
    pub fn new(label: impl Into<String>, accessor: impl Fn(&T) -> String + 'a) -> Self {
        Self {
            label: label.into(),
            accessor: Box::new(accessor),
        }
    }
}

fn tsv_writer_builder() -> AsyncWriterBuilder {
    let mut builder = AsyncWriterBuilder::new();
    builder
        .delimiter(CELL_SEPARATOR)
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary);
    builder
}

/// Encodes a header row and the data rows,
/// without a line-break after the last row.
async fn encode<R>(header: Vec<String>, rows: R) -> Result<String, Error>
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut buffer = Vec::new();
    {
        let mut writer = tsv_writer_builder().create_writer(&mut buffer);
        writer.write_record(&header).await?;
        for row in rows {
            writer.write_record(&row).await?;
        }
        writer.flush().await?;
    }
    let mut tsv = String::from_utf8(buffer)?;
    if tsv.ends_with(ROW_SEPARATOR) {
        tsv.truncate(tsv.len() - ROW_SEPARATOR.len());
    }
    Ok(tsv)
}

/// Renders a JSON value the way it should show in a spreadsheet cell.
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(string)) => string.clone(),
        Some(Value::Bool(boolean)) => boolean.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| render_cell(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(object @ Value::Object(_)) => object.to_string(),
    }
}

/// Descends into `record` along the dot-separated `path`.
///
/// A missing last step resolves to `None`;
/// a missing (or `null`) step before that is an error.
fn resolve<'v>(record: &'v Value, path: &str, row: usize) -> Result<Option<&'v Value>, Error> {
    let mut current = Some(record);
    let mut walked: Vec<&str> = Vec::new();
    for key in path.split('.') {
        let parent = match current {
            None | Some(Value::Null) => {
                return Err(Error::UnresolvablePath(
                    path.to_owned(),
                    row,
                    walked.join("."),
                ))
            }
            Some(parent) => parent,
        };
        current = match parent {
            Value::Object(fields) => fields.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
        };
        walked.push(key);
    }
    Ok(current)
}

/// Encodes `records` as TSV,
/// with one column per entry in `columns`, in that order.
pub async fn to_tsv<T: Serialize>(records: &[T], columns: &[Column]) -> Result<String, Error> {
    let header = columns.iter().map(|column| column.label.clone()).collect();
    let rows = records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let value = serde_json::to_value(record).map_err(|err| Error::Serialize(row, err))?;
            columns
                .iter()
                .map(|column| resolve(&value, &column.path, row).map(render_cell))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    encode(header, rows).await
}

/// Like [`to_tsv`], but with statically checked accessor columns.
pub async fn to_tsv_with<T>(
    records: &[T],
    columns: &[AccessorColumn<'_, T>],
) -> Result<String, Error> {
    let header = columns.iter().map(|column| column.label.clone()).collect();
    let rows = records.iter().map(|record| {
        columns
            .iter()
            .map(|column| (column.accessor)(record))
            .collect::<Vec<_>>()
    });
    encode(header, rows).await
}

pub async fn write_tsv(file: &Path, tsv: &str) -> Result<(), Error> {
    tracing::info!("Writing TSV export to '{}' ...", file.display());
    tokio::fs::write(file, tsv).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Project;
    use serde_json::json;

    #[tokio::test]
    async fn test_nested_path() {
        let records = vec![json!({ "name": "X", "a": { "b": "Y" } })];
        let columns = vec![Column::new("name", "Name"), Column::new("a.b", "Nested")];
        assert_eq!(to_tsv(&records, &columns).await.unwrap(), "Name\tNested\r\nX\tY");
    }

    #[tokio::test]
    async fn test_header_only_without_records() {
        let records: Vec<Value> = Vec::new();
        let columns = vec![Column::new("a", "A"), Column::new("b", "B")];
        assert_eq!(to_tsv(&records, &columns).await.unwrap(), "A\tB");
    }

    #[tokio::test]
    async fn test_cell_rendering() {
        let records = vec![
            json!({ "list": ["Kenya", "Ghana"], "flag": true, "n": 3, "missing": null }),
            json!({ "list": [], "flag": false, "n": 1.5 }),
        ];
        let columns = vec![
            Column::new("list", "L"),
            Column::new("flag", "F"),
            Column::new("n", "N"),
            Column::new("missing", "M"),
            Column::new("list.0", "First"),
        ];
        assert_eq!(
            to_tsv(&records, &columns).await.unwrap(),
            "L\tF\tN\tM\tFirst\r\nKenya,Ghana\ttrue\t3\t\tKenya\r\n\tfalse\t1.5\t\t"
        );
    }

    #[tokio::test]
    async fn test_missing_intermediate_is_an_error() {
        let records = vec![json!({ "name": "X" })];
        let columns = vec![Column::new("a.b.c", "Deep")];
        let err = to_tsv(&records, &columns).await.unwrap_err();
        assert!(matches!(err, Error::UnresolvablePath(ref path, 0, _) if path == "a.b.c"));
    }

    #[tokio::test]
    async fn test_projects() {
        let mut project = Project {
            cohort_name: "AWI-Gen".to_owned(),
            countries: vec!["Kenya".to_owned(), "Ghana".to_owned()],
            ..Default::default()
        };
        project.available_data_types.demographic = true;
        let columns = vec![
            Column::new("cohort_name", "Project"),
            Column::new("countries", "Countries"),
            Column::new("available_data_types.demographic", "Demographics"),
        ];
        assert_eq!(
            to_tsv(&[project], &columns).await.unwrap(),
            "Project\tCountries\tDemographics\r\nAWI-Gen\tKenya,Ghana\ttrue"
        );
    }

    #[tokio::test]
    async fn test_accessor_columns() {
        let projects = vec![
            Project {
                cohort_name: "A".to_owned(),
                current_enrollment: Some(10),
                ..Default::default()
            },
            Project {
                cohort_name: "B".to_owned(),
                ..Default::default()
            },
        ];
        let columns = vec![
            AccessorColumn::new("Project", |p: &Project| p.cohort_name.clone()),
            AccessorColumn::new("Enrollment", |p: &Project| {
                p.current_enrollment.map(|n| n.to_string()).unwrap_or_default()
            }),
        ];
        assert_eq!(
            to_tsv_with(&projects, &columns).await.unwrap(),
            "Project\tEnrollment\r\nA\t10\r\nB\t"
        );
    }

    #[tokio::test]
    async fn test_special_characters_are_quoted() {
        let project = Project {
            cohort_name: "A\tB".to_owned(),
            countries: vec!["Kenya".to_owned()],
            website: Some("line\r\nbreak".to_owned()),
            ..Default::default()
        };
        let columns = vec![
            Column::new("cohort_name", "Project"),
            Column::new("countries", "Countries"),
            Column::new("website", "Website"),
        ];
        let tsv = to_tsv(&[project], &columns).await.unwrap();
        assert_eq!(
            tsv,
            "Project\tCountries\tWebsite\r\n\"A\tB\"\tKenya\t\"line\r\nbreak\""
        );
    }

    #[tokio::test]
    async fn test_object_cells_are_quoted() {
        let records = vec![json!({ "a": { "b": 1 } })];
        let tsv = to_tsv(&records, &[Column::new("a", "A")]).await.unwrap();
        assert_eq!(tsv, "A\r\n\"{\"\"b\"\":1}\"");
    }
}
