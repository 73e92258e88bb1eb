// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Turns untyped source records into [`Project`]s.

use crate::accessions::{self, PREFIX_ARRAY_EXPRESS, PREFIX_DBGAP, PREFIX_GEO};
use crate::model::{
    data_type::AvailableDataTypes,
    project::{Accessions, BasicCohortAttributes, Project, Publication, QuestionnaireSurveyData},
    update_history::LastUpdated,
};
use crate::tools::{self, OneOrMany, RawTimestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Shown for records that carry no date of their own.
pub const LAST_UPDATED_DEFAULT: &str = "01/01/2022";
pub const DCP_PUBLISHED_STATE: &str = "Published in DCP";
pub const DCP_PROJECT_URL_PREFIX: &str = "https://data.humancellatlas.org/explore/projects/";

const UNKNOWN_ID: &str = "<unknown>";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Error in project '{0}': {1}")]
    Invalid(String, #[source] serde_json::Error),
    #[error("Error in project '{0}': No name")]
    NoName(String),
    #[error("Error in update history entry '{0}': Unparsable date")]
    InvalidDate(String),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn integral_count(number: f64) -> Option<u64> {
    (number.fract() == 0.0 && number >= 0.0 && number < u64::MAX as f64).then_some(number as u64)
}

/// Reads a count given as integer, integral float (`1500.0`) or numeric string.
/// Anything else is logged and read as `None`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let count = match &value {
            Value::Null => return None,
            Value::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().and_then(integral_count)),
            Value::String(text) => text.trim().parse::<u64>().ok(),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        };
        if count.is_none() {
            tracing::warn!("Ignoring unparsable count: {value}");
        }
        count
    }))
}

/// Reads a flag given as boolean or as "yes"/"no"/"true"/"false" (any case).
/// Anything else is logged and read as `None`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let flag = match &value {
            Value::Null => return None,
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_lowercase().as_str() {
                "yes" | "true" => Some(true),
                "no" | "false" => Some(false),
                _ => None,
            },
            Value::Number(_) | Value::Array(_) | Value::Object(_) => None,
        };
        if flag.is_none() {
            tracing::warn!("Ignoring unparsable yes/no value: {value}");
        }
        flag
    }))
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawUuid {
    Plain(String),
    Nested { uuid: String },
}

impl From<RawUuid> for String {
    fn from(value: RawUuid) -> Self {
        match value {
            RawUuid::Plain(uuid) | RawUuid::Nested { uuid } => uuid,
        }
    }
}

/// The accession lists and supplementary links,
/// which both record shapes carry under the same names.
#[derive(Deserialize, Debug, Default)]
struct RawAccessions {
    insdc_project_accessions: Option<OneOrMany<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    array_express_accessions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    geo_series_accessions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    ega_accessions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    dbgap_accessions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    supplementary_links: Vec<String>,
}

impl From<RawAccessions> for Accessions {
    fn from(raw: RawAccessions) -> Self {
        let mut accessions = Self {
            ena: accessions::ena_accession_links(raw.insdc_project_accessions),
            array_express: accessions::accession_links(
                &raw.array_express_accessions,
                PREFIX_ARRAY_EXPRESS,
            ),
            geo: accessions::accession_links(&raw.geo_series_accessions, PREFIX_GEO),
            ega: accessions::ega_accession_links(&raw.ega_accessions),
            dbgap: accessions::accession_links(&raw.dbgap_accessions, PREFIX_DBGAP),
            ..Default::default()
        };
        accessions::add_supplementary_links(&mut accessions, &raw.supplementary_links);
        accessions
    }
}

/// The shape of a project record in the cohort catalogue assets.
/// Only `cohort_name` is required.
#[derive(Deserialize, Debug)]
struct RawProject {
    cohort_name: String,
    uuid: Option<RawUuid>,
    website: Option<String>,
    license: Option<String>,
    pi_lead: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    current_enrollment: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    target_enrollment: Option<u64>,
    enrollment_period: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    irb_approved_data_sharing: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    available_data_types: AvailableDataTypes,
    #[serde(default, deserialize_with = "null_as_default")]
    basic_cohort_attributes: BasicCohortAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    countries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    questionnaire_survey_data: QuestionnaireSurveyData,
    #[serde(default, deserialize_with = "null_as_default")]
    survey_administration: Vec<String>,
    last_updated: Option<String>,
    #[serde(alias = "cataloguedDate")]
    catalogued_date: Option<RawTimestamp>,
    #[serde(alias = "wranglingState")]
    wrangling_state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    organs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    technologies: Vec<String>,
    #[serde(alias = "cellCount", default, deserialize_with = "lenient_count")]
    estimated_cell_count: Option<u64>,
    #[serde(flatten)]
    accessions: RawAccessions,
    #[serde(
        default,
        alias = "publicationsInfo",
        deserialize_with = "null_as_default"
    )]
    publications: Vec<Publication>,
}

#[derive(Deserialize, Debug)]
struct RawProjectCore {
    project_title: String,
}

#[derive(Deserialize, Debug)]
struct RawIngestContent {
    project_core: RawProjectCore,
    #[serde(default, deserialize_with = "lenient_count")]
    estimated_cell_count: Option<u64>,
    #[serde(flatten)]
    accessions: RawAccessions,
}

#[derive(Deserialize, Debug)]
struct RawOntology {
    #[serde(default)]
    ontology_label: String,
}

#[derive(Deserialize, Debug, Default)]
struct RawOntologies {
    #[serde(default, deserialize_with = "null_as_default")]
    ontologies: Vec<RawOntology>,
}

impl RawOntologies {
    fn labels(self) -> Vec<String> {
        self.ontologies
            .into_iter()
            .map(|ontology| ontology.ontology_label)
            .filter(|label| !label.is_empty())
            .collect()
    }
}

/// The shape of a project record as served by the ingest API catalogue endpoint.
/// Only `content.project_core.project_title` is required.
#[derive(Deserialize, Debug)]
struct RawIngestProject {
    uuid: Option<RawUuid>,
    content: RawIngestContent,
    #[serde(alias = "cataloguedDate")]
    catalogued_date: Option<RawTimestamp>,
    #[serde(alias = "wranglingState")]
    wrangling_state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    organ: RawOntologies,
    #[serde(default, deserialize_with = "null_as_default")]
    technology: RawOntologies,
    #[serde(alias = "cellCount", default, deserialize_with = "lenient_count")]
    cell_count: Option<u64>,
    #[serde(
        default,
        alias = "publicationsInfo",
        deserialize_with = "null_as_default"
    )]
    publications: Vec<Publication>,
}

#[derive(Deserialize, Debug)]
struct RawLastUpdated {
    date: RawTimestamp,
    description: String,
}

/// The best identifier available for a raw record,
/// used in log and error messages.
fn record_id(raw: &Value) -> String {
    raw.get("cohort_name")
        .or_else(|| raw.pointer("/content/project_core/project_title"))
        .and_then(Value::as_str)
        .or_else(|| {
            raw.get("uuid")
                .and_then(|uuid| uuid.as_str().or_else(|| uuid.get("uuid")?.as_str()))
        })
        .unwrap_or(UNKNOWN_ID)
        .to_owned()
}

fn dcp_url(uuid: Option<&str>, wrangling_state: Option<&str>) -> Option<String> {
    match (uuid, wrangling_state) {
        (Some(uuid), Some(DCP_PUBLISHED_STATE)) => Some(format!("{DCP_PROJECT_URL_PREFIX}{uuid}")),
        _ => None,
    }
}

/// The catalogued date if known, else the record's own date, else the default.
fn last_updated(catalogued: Option<&DateTime<Utc>>, record_date: Option<String>) -> String {
    catalogued.map_or_else(
        || record_date.unwrap_or_else(|| LAST_UPDATED_DEFAULT.to_owned()),
        tools::format_date_en_gb,
    )
}

fn first_authors(publications: &[Publication]) -> Vec<String> {
    publications
        .first()
        .map(|publication| publication.authors.clone())
        .unwrap_or_default()
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        let uuid = raw.uuid.map(String::from);
        let catalogued = raw.catalogued_date.as_ref().and_then(RawTimestamp::to_utc);
        Self {
            cohort_name: raw.cohort_name,
            dcp_url: dcp_url(uuid.as_deref(), raw.wrangling_state.as_deref()),
            uuid,
            website: raw.website,
            license: raw.license,
            pi_lead: raw.pi_lead,
            current_enrollment: raw.current_enrollment,
            target_enrollment: raw.target_enrollment,
            enrollment_period: raw.enrollment_period,
            irb_approved_data_sharing: raw.irb_approved_data_sharing,
            available_data_types: raw.available_data_types,
            basic_cohort_attributes: raw.basic_cohort_attributes,
            countries: raw.countries,
            questionnaire_survey_data: raw.questionnaire_survey_data,
            survey_administration: raw.survey_administration,
            last_updated: last_updated(catalogued.as_ref(), raw.last_updated),
            catalogued,
            organs: raw.organs,
            technologies: raw.technologies,
            cell_count: raw.estimated_cell_count,
            accessions: raw.accessions.into(),
            publication_links: accessions::publication_links(&raw.publications),
            authors: first_authors(&raw.publications),
            publications: raw.publications,
        }
    }
}

impl From<RawIngestProject> for Project {
    fn from(raw: RawIngestProject) -> Self {
        let uuid = raw.uuid.map(String::from);
        let catalogued = raw.catalogued_date.as_ref().and_then(RawTimestamp::to_utc);
        Self {
            cohort_name: raw.content.project_core.project_title,
            dcp_url: dcp_url(uuid.as_deref(), raw.wrangling_state.as_deref()),
            uuid,
            last_updated: last_updated(catalogued.as_ref(), None),
            catalogued,
            organs: raw.organ.labels(),
            technologies: raw.technology.labels(),
            // the ingest API is moving the cell count into the content
            cell_count: raw.content.estimated_cell_count.or(raw.cell_count),
            accessions: raw.content.accessions.into(),
            publication_links: accessions::publication_links(&raw.publications),
            authors: first_authors(&raw.publications),
            publications: raw.publications,
            ..Default::default()
        }
    }
}

/// Formats a single untyped source record.
///
/// Records without a `cohort_name` but with a `content` section
/// are read in the ingest API shape, all others in the catalogue asset shape.
pub fn format_project(raw: &Value) -> Result<Project, FormatError> {
    let is_ingest_record = raw.get("cohort_name").is_none() && raw.get("content").is_some();
    let project = if is_ingest_record {
        RawIngestProject::deserialize(raw).map(Project::from)
    } else {
        RawProject::deserialize(raw).map(Project::from)
    }
    .map_err(|err| FormatError::Invalid(record_id(raw), err))?;
    if project.cohort_name.trim().is_empty() {
        return Err(FormatError::NoName(record_id(raw)));
    }
    Ok(project)
}

/// Formats all the records that can be formatted,
/// skipping (and logging) the rest.
#[must_use]
pub fn format_projects(raws: &[Value]) -> Vec<Project> {
    raws.iter()
        .filter_map(|raw| match format_project(raw) {
            Ok(project) => Some(project),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        })
        .collect()
}

pub fn format_last_updated(raw: &Value) -> Result<LastUpdated, FormatError> {
    let raw_entry = RawLastUpdated::deserialize(raw)
        .map_err(|err| FormatError::Invalid(UNKNOWN_ID.to_owned(), err))?;
    let date = raw_entry
        .date
        .to_utc()
        .ok_or_else(|| FormatError::InvalidDate(raw_entry.description.clone()))?;
    Ok(LastUpdated {
        date,
        description: raw_entry.description,
    })
}

/// Formats the update history, most recent entry first.
/// Malformed entries are skipped (and logged).
#[must_use]
pub fn format_update_history(raws: &[Value]) -> Vec<LastUpdated> {
    let mut history: Vec<LastUpdated> = raws
        .iter()
        .filter_map(|raw| match format_last_updated(raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        })
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data_type::DataType;
    use serde_json::json;

    #[test]
    fn test_format_minimal() {
        let project = format_project(&json!({ "cohort_name": "AWI-Gen" })).unwrap();
        assert_eq!(project.cohort_name, "AWI-Gen");
        assert!(project.countries.is_empty());
        assert!(project.publications.is_empty());
        assert!(project.accessions.ena.is_empty());
        assert_eq!(project.last_updated, LAST_UPDATED_DEFAULT);
        assert_eq!(project.dcp_url, None);
    }

    #[test]
    fn test_format_null_arrays_default_to_empty() {
        let project = format_project(&json!({
            "cohort_name": "H3Africa",
            "countries": null,
            "organs": null,
            "available_data_types": null,
        }))
        .unwrap();
        assert!(project.countries.is_empty());
        assert!(project.organs.is_empty());
        assert!(!project.available_data_types.has(DataType::Clinical));
    }

    #[test]
    fn test_format_full() {
        let project = format_project(&json!({
            "cohort_name": "Heart Cells",
            "uuid": { "uuid": "1234" },
            "wranglingState": "Published in DCP",
            "cataloguedDate": "2021-03-04T12:00:00Z",
            "countries": ["Kenya", "Ghana"],
            "current_enrollment": 1500,
            "available_data_types": { "genomic_human": true, "other": ["x"] },
            "insdc_project_accessions": "PRJEB1",
            "ega_accessions": ["EGAS1"],
            "supplementary_links": ["https://heart.cells.ucsc.edu"],
            "publicationsInfo": [{ "journalTitle": "Nature", "url": "u", "authors": ["A", "B"] }],
            "cellCount": 42,
        }))
        .unwrap();
        assert_eq!(project.uuid.as_deref(), Some("1234"));
        assert_eq!(
            project.dcp_url.as_deref(),
            Some("https://data.humancellatlas.org/explore/projects/1234")
        );
        assert_eq!(project.last_updated, "04/03/2021");
        assert_eq!(project.current_enrollment, Some(1500));
        assert_eq!(project.cell_count, Some(42));
        assert!(project.available_data_types.has(DataType::GenomicHuman));
        assert_eq!(project.accessions.ena.len(), 1);
        assert_eq!(project.accessions.ega[0].name, "EGAS1");
        assert_eq!(project.accessions.ucsc[0].name, "heart");
        assert_eq!(project.authors, vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(project.publication_links[0].name, "Nature");
    }

    #[test]
    fn test_format_ingest_record() {
        let project = format_project(&json!({
            "uuid": { "uuid": "abc" },
            "wranglingState": "Published in DCP",
            "cataloguedDate": 1_646_092_800_000_i64,
            "content": {
                "project_core": { "project_title": "Heart Atlas" },
                "estimated_cell_count": 5000,
                "insdc_project_accessions": ["PRJEB1", "PRJEB2"],
                "geo_series_accessions": ["GSE1"],
                "ega_accessions": ["EGAD7"],
                "supplementary_links": ["https://cellxgene.cziscience.com/collections/c-1"],
            },
            "organ": { "ontologies": [{ "ontology_label": "heart" }, { "ontology_label": "lung" }] },
            "technology": { "ontologies": [{ "ontology_label": "10x 3' v2" }] },
            "cellCount": 1,
            "publicationsInfo": [{ "journalTitle": "bioRxiv", "url": "u", "authors": ["N"] }],
        }))
        .unwrap();
        assert_eq!(project.cohort_name, "Heart Atlas");
        assert_eq!(project.uuid.as_deref(), Some("abc"));
        assert!(project.dcp_url.is_some());
        assert_eq!(project.last_updated, "01/03/2022");
        assert_eq!(project.organs, vec!["heart", "lung"]);
        assert_eq!(project.technologies, vec!["10x 3' v2"]);
        assert_eq!(project.cell_count, Some(5000));
        assert_eq!(project.accessions.ena.len(), 2);
        assert_eq!(project.accessions.geo[0].name, "GSE1");
        assert_eq!(
            project.accessions.ega[0].href,
            "https://ega-archive.org/datasets/EGAD7"
        );
        assert_eq!(project.accessions.cellxgene[0].name, "c-1");
        assert_eq!(project.authors, vec!["N"]);
        assert_eq!(project.publication_links[0].name, "bioRxiv (pre-publication)");
    }

    #[test]
    fn test_format_ingest_record_falls_back_to_cell_count() {
        let project = format_project(&json!({
            "content": { "project_core": { "project_title": "Lung" } },
            "cellCount": 77,
            "organ": null,
        }))
        .unwrap();
        assert_eq!(project.cell_count, Some(77));
        assert!(project.organs.is_empty());
        assert_eq!(project.last_updated, LAST_UPDATED_DEFAULT);
    }

    #[test]
    fn test_format_ingest_record_without_title_fails() {
        let err = format_project(&json!({
            "uuid": { "uuid": "abc" },
            "content": { "project_core": {} },
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::Invalid(ref id, _) if id == "abc"));
        let err = format_project(&json!({
            "content": { "project_core": { "project_title": "" } },
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::NoName(_)));
    }

    #[test]
    fn test_format_tolerates_odd_optional_scalars() {
        let raws = vec![
            json!({ "cohort_name": "A", "current_enrollment": 1500.0 }),
            json!({ "cohort_name": "B", "irb_approved_data_sharing": "Yes" }),
            json!({ "cohort_name": "C", "target_enrollment": "unknown" }),
            json!({ "cohort_name": "D", "current_enrollment": "42", "irb_approved_data_sharing": 3 }),
        ];
        let projects = format_projects(&raws);
        assert_eq!(projects.len(), 4);
        assert_eq!(projects[0].current_enrollment, Some(1500));
        assert_eq!(projects[1].irb_approved_data_sharing, Some(true));
        assert_eq!(projects[2].target_enrollment, None);
        assert_eq!(projects[3].current_enrollment, Some(42));
        assert_eq!(projects[3].irb_approved_data_sharing, None);
        assert_eq!(
            format_project(&json!({ "cohort_name": "E", "current_enrollment": 2.5 }))
                .unwrap()
                .current_enrollment,
            None
        );
    }

    #[test]
    fn test_format_missing_name_fails() {
        let err = format_project(&json!({ "uuid": "u-1", "countries": [] })).unwrap_err();
        assert!(matches!(err, FormatError::Invalid(ref id, _) if id == "u-1"));
        let err = format_project(&json!({ "cohort_name": " " })).unwrap_err();
        assert!(matches!(err, FormatError::NoName(_)));
    }

    #[test]
    fn test_format_projects_skips_malformed() {
        let raws = vec![
            json!({ "cohort_name": "A" }),
            json!({ "countries": ["Kenya"] }),
            json!({ "cohort_name": "C" }),
        ];
        let projects = format_projects(&raws);
        let names: Vec<_> = projects.iter().map(|p| p.cohort_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_update_history_sorted_most_recent_first() {
        let raws = vec![
            json!({ "date": "2022-01-01", "description": "first" }),
            json!({ "date": "not a date", "description": "broken" }),
            json!({ "date": "2023-05-01", "description": "latest" }),
            json!({ "description": "no date" }),
        ];
        let history = format_update_history(&raws);
        let descriptions: Vec<_> = history.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["latest", "first"]);
    }
}
