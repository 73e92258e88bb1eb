// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{data_type::AvailableDataTypes, location::Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized reference to an external resource,
/// usually an accession in a data archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub href: String,
}

impl Link {
    #[must_use]
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Publication {
    pub doi: String,
    pub url: String,
    pub journal_title: String,
    pub title: String,
    pub authors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicCohortAttributes {
    pub population_data: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireSurveyData {
    pub diseases: Vec<String>,
    pub healthcare_information: Vec<String>,
    pub lifestyle_and_behaviours: Vec<String>,
    pub medication: Vec<String>,
    pub non_pharmacological_interventions: Vec<String>,
    pub other_questionnaire_survey_data: Vec<String>,
    pub perception_of_health_and_quality_of_life: Vec<String>,
    pub physical_environment: Vec<String>,
    pub physiological_measurements: Vec<String>,
    pub socio_demographic_and_economic_characteristics: Vec<String>,
    pub survey_administration: Vec<String>,
}

/// Links into the various external archives,
/// one list per archive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessions {
    pub ena: Vec<Link>,
    pub array_express: Vec<Link>,
    pub geo: Vec<Link>,
    pub ega: Vec<Link>,
    pub dbgap: Vec<Link>,
    pub cellxgene: Vec<Link>,
    pub scea: Vec<Link>,
    pub ucsc: Vec<Link>,
}

impl Accessions {
    /// The links pointing into the given location.
    /// [`Location::Hca`] is not an accession archive,
    /// and thus has none.
    #[must_use]
    pub fn for_location(&self, location: Location) -> &[Link] {
        match location {
            Location::Hca => &[],
            Location::Geo => &self.geo,
            Location::ArrayExpress => &self.array_express,
            Location::Ena => &self.ena,
            Location::Ega => &self.ega,
            Location::Dbgap => &self.dbgap,
            Location::Cellxgene => &self.cellxgene,
            Location::Scea => &self.scea,
            Location::Ucsc => &self.ucsc,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.ena
            .iter()
            .chain(&self.array_express)
            .chain(&self.geo)
            .chain(&self.ega)
            .chain(&self.dbgap)
            .chain(&self.cellxgene)
            .chain(&self.scea)
            .chain(&self.ucsc)
    }
}

/// A single research project (cohort) of the catalogue.
///
/// Created once by [`crate::formatter::format_project`],
/// and never modified afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub cohort_name: String,
    pub uuid: Option<String>,
    pub website: Option<String>,
    pub license: Option<String>,
    pub pi_lead: Option<String>,
    pub current_enrollment: Option<u64>,
    pub target_enrollment: Option<u64>,
    pub enrollment_period: Option<String>,
    pub irb_approved_data_sharing: Option<bool>,
    pub available_data_types: AvailableDataTypes,
    pub basic_cohort_attributes: BasicCohortAttributes,
    pub countries: Vec<String>,
    pub questionnaire_survey_data: QuestionnaireSurveyData,
    pub survey_administration: Vec<String>,
    /// Human-readable date of the last update (en-GB format)
    pub last_updated: String,
    pub catalogued: Option<DateTime<Utc>>,
    /// Link to the project in the HCA Data Portal, if published there
    pub dcp_url: Option<String>,
    pub organs: Vec<String>,
    pub technologies: Vec<String>,
    pub cell_count: Option<u64>,
    pub accessions: Accessions,
    pub publications: Vec<Publication>,
    /// One link per publication, named after its journal
    #[serde(default)]
    pub publication_links: Vec<Link>,
    pub authors: Vec<String>,
}

impl Project {
    #[must_use]
    pub fn has_location(&self, location: Location) -> bool {
        match location {
            Location::Hca => self.dcp_url.is_some(),
            Location::Geo
            | Location::ArrayExpress
            | Location::Ena
            | Location::Ega
            | Location::Dbgap
            | Location::Cellxgene
            | Location::Scea
            | Location::Ucsc => !self.accessions.for_location(location).is_empty(),
        }
    }

    /// All the text free-text search is matched against,
    /// lower-cased and space-separated.
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.authors.iter().map(String::as_str));
        parts.extend(self.uuid.as_deref());
        parts.push(&self.cohort_name);
        parts.extend(self.accessions.iter().map(|link| link.name.as_str()));
        parts.extend(self.organs.iter().map(String::as_str));
        parts.extend(self.technologies.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}
