// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Grouped project counts for the catalogue summary.

use crate::model::project::Project;
use serde::Serialize;
use std::collections::HashMap;

/// The categorical project fields projects can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKey {
    Organs,
    Technologies,
    Countries,
}

impl GroupKey {
    #[must_use]
    pub fn values(self, project: &Project) -> &[String] {
        match self {
            Self::Organs => &project.organs,
            Self::Technologies => &project.technologies,
            Self::Countries => &project.countries,
        }
    }
}

/// The numeric project field summed up per group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    CellCount,
    CurrentEnrollment,
}

impl Weight {
    /// Missing values count as 0.
    #[must_use]
    pub fn value(self, project: &Project) -> u64 {
        match self {
            Self::CellCount => project.cell_count,
            Self::CurrentEnrollment => project.current_enrollment,
        }
        .unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCount {
    pub group: String,
    /// Number of projects in this group
    pub count: usize,
    pub weighted_sum: u64,
}

/// Groups projects by each of the values they have in `key`,
/// so a project with multiple values lands in multiple groups.
///
/// Weighted sums saturate at `u64::MAX`.
/// Sorted by count, largest first;
/// groups with equal counts are sorted by name.
#[must_use]
pub fn group_by(projects: &[Project], key: GroupKey, weight: Weight) -> Vec<ProjectCount> {
    group_by_with(projects, |project| key.values(project), |project| weight.value(project))
}

/// Like [`group_by`], with custom accessors for the group values and the weight.
pub fn group_by_with<'a, K, W>(projects: &'a [Project], key: K, weight: W) -> Vec<ProjectCount>
where
    K: Fn(&'a Project) -> &'a [String],
    W: Fn(&Project) -> u64,
{
    let mut groups: HashMap<&str, (usize, u64)> = HashMap::new();
    for project in projects {
        let project_weight = weight(project);
        for group in key(project) {
            let entry = groups.entry(group.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 = entry.1.saturating_add(project_weight);
        }
    }

    let mut counts: Vec<ProjectCount> = groups
        .into_iter()
        .map(|(group, (count, weighted_sum))| ProjectCount {
            group: group.to_owned(),
            count,
            weighted_sum,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.group.cmp(&b.group)));
    counts
}

/// Sums up `weight` over all `projects`, saturating at `u64::MAX`.
#[must_use]
pub fn total(projects: &[Project], weight: Weight) -> u64 {
    projects
        .iter()
        .fold(0, |sum: u64, project| sum.saturating_add(weight.value(project)))
}

/// Everything shown on the summary page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub projects_by_organ: Vec<ProjectCount>,
    pub projects_by_technology: Vec<ProjectCount>,
    pub projects_by_country: Vec<ProjectCount>,
    pub total_enrollment: u64,
}

impl Summary {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            projects_by_organ: group_by(projects, GroupKey::Organs, Weight::CellCount),
            projects_by_technology: group_by(projects, GroupKey::Technologies, Weight::CellCount),
            projects_by_country: group_by(projects, GroupKey::Countries, Weight::CurrentEnrollment),
            total_enrollment: total(projects, Weight::CurrentEnrollment),
        }
    }
}
