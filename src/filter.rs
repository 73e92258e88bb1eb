// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::model::{data_type::DataType, location::Location, project::Project};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use typed_builder::TypedBuilder;

/// The user-selected filters.
///
/// An empty string means "no constraint" for that dimension.
/// Filters are always replaced as a whole,
/// never patched in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct Filters {
    /// Sub-string of the project name (case-sensitive)
    #[builder(default, setter(into))]
    pub project_name: String,
    #[builder(default, setter(into))]
    pub country: String,
    /// Label of a data type, see [`DataType::label_table`]
    #[builder(default, setter(into))]
    pub data_type: String,
    #[builder(default, setter(into))]
    pub organ: String,
    #[builder(default, setter(into))]
    pub technology: String,
    /// Label of a location, see [`Location::label_table`]
    #[builder(default, setter(into))]
    pub location: String,
    /// Free-text search; all white-space separated keywords have to match
    #[builder(default, setter(into))]
    pub search: String,
    #[builder(default)]
    pub recent_first: bool,
}

impl Filters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project_name.is_empty()
            && self.country.is_empty()
            && self.data_type.is_empty()
            && self.organ.is_empty()
            && self.technology.is_empty()
            && self.location.is_empty()
            && self.search.is_empty()
            && !self.recent_first
    }
}

/// Applies [`Filters`] to collections of projects.
///
/// The label tables used to resolve data-type and location labels
/// are fixed at construction.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    data_types: HashMap<String, DataType>,
    locations: HashMap<String, Location>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DataType::label_table(), Location::label_table())
    }
}

impl FilterEngine {
    #[must_use]
    pub fn new(
        data_types: HashMap<String, DataType>,
        locations: HashMap<String, Location>,
    ) -> Self {
        Self {
            data_types,
            locations,
        }
    }

    /// Returns the projects passing all the active filters,
    /// in their original order,
    /// unless [`Filters::recent_first`] asks for the most recently catalogued first.
    #[must_use]
    pub fn filter<'a>(&self, projects: &'a [Project], filters: &Filters) -> Vec<&'a Project> {
        let keywords: Vec<String> = filters
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let mut filtered: Vec<&Project> = projects
            .iter()
            .filter(|project| self.matches(project, filters, &keywords))
            .collect();
        if filters.recent_first {
            // stable; undated projects go last
            filtered.sort_by(|a, b| b.catalogued.cmp(&a.catalogued));
        }
        filtered
    }

    /// Whether a single project passes all the active filters.
    /// `keywords` are the lower-cased words of [`Filters::search`].
    fn matches(&self, project: &Project, filters: &Filters, keywords: &[String]) -> bool {
        if !filters.project_name.is_empty() && !project.cohort_name.contains(&filters.project_name)
        {
            return false;
        }

        if !filters.country.is_empty() && !project.countries.contains(&filters.country) {
            return false;
        }

        // an unknown label matches no project at all
        if !filters.data_type.is_empty() {
            let has_data_type = self
                .data_types
                .get(&filters.data_type)
                .is_some_and(|data_type| project.available_data_types.has(*data_type));
            if !has_data_type {
                tracing::trace!(
                    "Project '{}' lacks data type '{}'",
                    project.cohort_name,
                    filters.data_type
                );
                return false;
            }
        }

        if !filters.organ.is_empty() && !project.organs.contains(&filters.organ) {
            return false;
        }

        if !filters.technology.is_empty() && !project.technologies.contains(&filters.technology) {
            return false;
        }

        if !filters.location.is_empty() {
            let has_location = self
                .locations
                .get(&filters.location)
                .is_some_and(|location| project.has_location(*location));
            if !has_location {
                return false;
            }
        }

        if !keywords.is_empty() {
            let text = project.search_text();
            if !keywords.iter().all(|keyword| text.contains(keyword.as_str())) {
                return false;
            }
        }

        true
    }
}
