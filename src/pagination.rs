// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::model::{data_type::DataType, project::Project};
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// One page out of a larger list of items.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    /// 1-based
    pub current_page: usize,
    pub items_per_page: usize,
    /// Number of items on all pages together
    pub total_items: usize,
}

impl<T> PaginatedList<T> {
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        if self.items_per_page == 0 {
            0
        } else {
            self.total_items.div_ceil(self.items_per_page)
        }
    }
}

/// The values available for filtering,
/// derived once from all the loaded projects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub available_projects: Vec<String>,
    pub available_countries: Vec<String>,
    pub available_data_types: Vec<String>,
    pub available_organs: Vec<String>,
    pub available_technologies: Vec<String>,
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.collect::<BTreeSet<_>>().into_iter().cloned().collect()
}

impl Facets {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            available_projects: sorted_unique(projects.iter().map(|p| &p.cohort_name)),
            available_countries: sorted_unique(projects.iter().flat_map(|p| &p.countries)),
            available_data_types: DataType::sorted_keys()
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
            available_organs: sorted_unique(projects.iter().flat_map(|p| &p.organs)),
            available_technologies: sorted_unique(projects.iter().flat_map(|p| &p.technologies)),
        }
    }
}

/// A page of projects, plus the facets to filter them by.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProjects {
    #[serde(flatten)]
    pub page: PaginatedList<Project>,
    #[serde(flatten)]
    pub facets: Facets,
}

/// Cuts out page number `page` (1-based) of `items`.
///
/// Pages beyond the last one (and page 0) are empty,
/// while still reporting the total number of items.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, items_per_page: usize) -> PaginatedList<T> {
    let start = page.saturating_sub(1).saturating_mul(items_per_page);
    let end = page.saturating_mul(items_per_page).min(items.len());
    let page_items = if page == 0 || start >= end {
        Vec::new()
    } else {
        items[start..end].to_vec()
    };
    PaginatedList {
        items: page_items,
        current_page: page,
        items_per_page,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facets() {
        let mut all = (0..3)
            .map(|index| Project {
                cohort_name: format!("Cohort {index:02}"),
                countries: vec!["Kenya".to_owned()],
                ..Default::default()
            })
            .collect::<Vec<_>>();
        all[0].countries.push("Ghana".to_owned());
        all[1].organs = vec!["heart".to_owned(), "brain".to_owned()];
        let facets = Facets::from_projects(&all);
        assert_eq!(
            facets.available_projects,
            vec!["Cohort 00", "Cohort 01", "Cohort 02"]
        );
        assert_eq!(facets.available_countries, vec!["Ghana", "Kenya"]);
        assert_eq!(facets.available_organs, vec!["brain", "heart"]);
        assert_eq!(facets.available_data_types.len(), 12);
    }

    #[test]
    fn test_first_and_last_page() {
        let items: Vec<u32> = (1..=45).collect();
        let first = paginate(&items, 1, 20);
        assert_eq!(first.items, (1..=20).collect::<Vec<_>>());
        assert_eq!(first.total_items, 45);
        assert_eq!(first.total_pages(), 3);
        let last = paginate(&items, 3, 20);
        assert_eq!(last.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(last.current_page, 3);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items = vec!["a", "b", "c", "d", "e"];
        let page = paginate(&items, 1000, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 5);
        assert!(paginate(&items, 0, 20).items.is_empty());
        assert!(paginate::<u8>(&[], 1, 20).items.is_empty());
    }

    #[test]
    fn test_pages_reconstruct_the_whole() {
        let items: Vec<u32> = (0..57).collect();
        let mut rebuilt = Vec::new();
        for page_num in 1.. {
            let page = paginate(&items, page_num, 20);
            if page.items.is_empty() {
                break;
            }
            rebuilt.extend(page.items);
        }
        assert_eq!(rebuilt, items);
    }
}
