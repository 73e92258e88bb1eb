// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Kind of data a cohort makes available,
/// as flagged in the `available_data_types` section of a record.
///
/// The string representation is the internal key,
/// as used in the source data.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataType {
    Biospecimens,
    EnvironmentalData,
    GenomicData,
    PhenotypicClinicalData,
    Demographic,
    Surveillance,
    Clinical,
    Environmental,
    ClimateData,
    GenomicHuman,
    GenomicPathogen,
    ImageData,
}

impl DataType {
    /// All internal keys, sorted alphabetically.
    #[must_use]
    pub fn sorted_keys() -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Self::iter().map(Into::into).collect();
        keys.sort_unstable();
        keys
    }

    /// The label -> data-type table offered to users for filtering.
    ///
    /// Internal keys map onto themselves,
    /// so both forms are accepted.
    #[must_use]
    pub fn label_table() -> HashMap<String, Self> {
        let labelled = [
            ("Demographic", Self::Demographic),
            ("Surveillance", Self::Surveillance),
            ("Clinical/ Phenotype", Self::PhenotypicClinicalData),
            ("Environmental/ Exposure", Self::Environmental),
            ("Climate Data", Self::ClimateData),
            ("Genomic (Human)", Self::GenomicHuman),
            ("Genomic (Pathogen/ Infectious)", Self::GenomicPathogen),
            ("Image Data", Self::ImageData),
            ("biospecimens", Self::Biospecimens),
            ("environmental_data", Self::EnvironmentalData),
            ("genomic_data", Self::GenomicData),
            ("clinical", Self::Clinical),
        ];
        labelled
            .into_iter()
            .map(|(label, data_type)| (label.to_owned(), data_type))
            .collect()
    }
}

/// Flags for which kinds of data a cohort makes available.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AvailableDataTypes {
    pub biospecimens: bool,
    pub environmental_data: bool,
    pub genomic_data: bool,
    pub phenotypic_clinical_data: bool,

    pub demographic: bool,
    pub surveillance: bool,
    pub clinical: bool,
    pub environmental: bool,
    pub climate_data: bool,
    pub genomic_human: bool,
    pub genomic_pathogen: bool,
    pub image_data: bool,
    pub other: Vec<String>,
}

impl AvailableDataTypes {
    #[must_use]
    pub const fn has(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::Biospecimens => self.biospecimens,
            DataType::EnvironmentalData => self.environmental_data,
            DataType::GenomicData => self.genomic_data,
            DataType::PhenotypicClinicalData => self.phenotypic_clinical_data,
            DataType::Demographic => self.demographic,
            DataType::Surveillance => self.surveillance,
            DataType::Clinical => self.clinical,
            DataType::Environmental => self.environmental,
            DataType::ClimateData => self.climate_data,
            DataType::GenomicHuman => self.genomic_human,
            DataType::GenomicPathogen => self.genomic_pathogen,
            DataType::ImageData => self.image_data,
        }
    }
}
