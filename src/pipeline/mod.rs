// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Keeps the derived views of the catalogue (filtered projects, current page, summary)
//! up to date with the loaded projects, the filters and the current page,
//! and broadcasts them to subscribers.

use crate::filter::{FilterEngine, Filters};
use crate::model::project::Project;
use crate::pagination::{self, Facets, PaginatedProjects};
use crate::sources::{self, Source};
use crate::summary::Summary;
use broadcast::Broadcaster;
use futures::stream::BoxStream;
use std::sync::Arc;

pub mod broadcast;

/// What subscribers receive; an error ends the stream.
pub type Update<T> = Result<Arc<T>, Arc<sources::Error>>;

/// The projects as loaded from the source,
/// plus what is derived from them once.
struct Loaded {
    projects: Vec<Project>,
    facets: Facets,
    filtered: Arc<Vec<Project>>,
}

enum State {
    Pending,
    Loaded(Loaded),
    Failed,
}

/// Owns the catalogue state for one session.
///
/// Consumers never change the state directly,
/// but request transitions through [`Self::set_filters`] and [`Self::change_page`],
/// and observe the results through the subscription streams.
pub struct ProjectsPipeline {
    engine: FilterEngine,
    items_per_page: usize,
    filters: Filters,
    current_page: usize,
    state: State,
    closed: bool,
    paged_projects: Broadcaster<Update<PaginatedProjects>>,
    filtered_projects: Broadcaster<Update<Vec<Project>>>,
    summary: Broadcaster<Update<Summary>>,
}

impl ProjectsPipeline {
    #[must_use]
    pub fn new(engine: FilterEngine, items_per_page: usize) -> Self {
        Self {
            engine,
            items_per_page,
            filters: Filters::default(),
            current_page: 1,
            state: State::Pending,
            closed: false,
            paged_projects: Broadcaster::default(),
            filtered_projects: Broadcaster::default(),
            summary: Broadcaster::default(),
        }
    }

    #[must_use]
    pub const fn current_filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// All loaded projects, if loading has finished successfully.
    #[must_use]
    pub fn projects(&self) -> Option<&[Project]> {
        match &self.state {
            State::Loaded(loaded) => Some(&loaded.projects),
            State::Pending | State::Failed => None,
        }
    }

    /// The projects passing the current filters,
    /// if loading has finished successfully.
    #[must_use]
    pub fn filtered(&self) -> Option<Arc<Vec<Project>>> {
        match &self.state {
            State::Loaded(loaded) => Some(Arc::clone(&loaded.filtered)),
            State::Pending | State::Failed => None,
        }
    }

    /// A new page on each change of data, filters or page.
    pub fn paged_projects(&mut self) -> BoxStream<'static, Update<PaginatedProjects>> {
        self.paged_projects.subscribe()
    }

    /// The full filtered list on each change of data or filters.
    pub fn filtered_projects(&mut self) -> BoxStream<'static, Update<Vec<Project>>> {
        self.filtered_projects.subscribe()
    }

    /// The summary, once the data is loaded.
    pub fn summary(&mut self) -> BoxStream<'static, Update<Summary>> {
        self.summary.subscribe()
    }

    /// Fetches the projects from `source`,
    /// and loads them or fails the pipeline.
    pub async fn retrieve(&mut self, source: &dyn Source) {
        match source.fetch_projects().await {
            Ok(projects) => self.load(projects),
            Err(err) => self.fail(err),
        }
    }

    /// Replaces the projects, and recomputes everything.
    pub fn load(&mut self, projects: Vec<Project>) {
        if self.closed {
            tracing::trace!("Ignoring loaded projects; pipeline is closed");
            return;
        }
        tracing::debug!("Loaded {} projects", projects.len());
        let facets = Facets::from_projects(&projects);
        self.summary
            .publish(&Ok(Arc::new(Summary::from_projects(&projects))));
        self.state = State::Loaded(Loaded {
            projects,
            facets,
            filtered: Arc::new(Vec::new()),
        });
        self.refilter();
    }

    /// Reports a failure to fetch the data to all subscribers,
    /// and ends all streams.
    pub fn fail(&mut self, err: sources::Error) {
        if self.closed {
            return;
        }
        tracing::error!("Failed to retrieve projects: {err}");
        let err = Arc::new(err);
        self.paged_projects.publish(&Err(Arc::clone(&err)));
        self.filtered_projects.publish(&Err(Arc::clone(&err)));
        self.summary.publish(&Err(err));
        self.state = State::Failed;
        self.close();
    }

    /// Replaces the filters, and goes back to page 1.
    pub fn set_filters(&mut self, filters: Filters) {
        if self.closed {
            return;
        }
        tracing::debug!("Filters changed: {filters:?}");
        self.filters = filters;
        self.current_page = 1;
        self.refilter();
    }

    pub fn change_page(&mut self, page: usize) {
        if self.closed {
            return;
        }
        tracing::debug!("Page changed: {page}");
        self.current_page = page;
        self.repaginate();
    }

    /// Ends all subscriber streams.
    /// Further changes are ignored.
    pub fn close(&mut self) {
        self.paged_projects.complete();
        self.filtered_projects.complete();
        self.summary.complete();
        self.closed = true;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn refilter(&mut self) {
        if let State::Loaded(loaded) = &mut self.state {
            let filtered: Vec<Project> = self
                .engine
                .filter(&loaded.projects, &self.filters)
                .into_iter()
                .cloned()
                .collect();
            tracing::debug!("{} projects pass the filters", filtered.len());
            loaded.filtered = Arc::new(filtered);
            self.filtered_projects
                .publish(&Ok(Arc::clone(&loaded.filtered)));
        }
        self.repaginate();
    }

    fn repaginate(&mut self) {
        if let State::Loaded(loaded) = &self.state {
            let page =
                pagination::paginate(&loaded.filtered, self.current_page, self.items_per_page);
            tracing::trace!(
                "Publishing page {} to {} subscribers",
                self.current_page,
                self.paged_projects.subscriber_count()
            );
            self.paged_projects.publish(&Ok(Arc::new(PaginatedProjects {
                page,
                facets: loaded.facets.clone(),
            })));
        }
    }
}

impl Drop for ProjectsPipeline {
    fn drop(&mut self) {
        if !self.closed {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects(count: usize) -> Vec<Project> {
        (0..count)
            .map(|index| Project {
                cohort_name: format!("Cohort {index:02}"),
                countries: vec![if index % 2 == 0 { "Kenya" } else { "Ghana" }.to_owned()],
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_state_transitions() {
        let mut pipeline = ProjectsPipeline::new(FilterEngine::default(), 4);
        assert!(pipeline.filtered().is_none());

        pipeline.load(projects(10));
        assert_eq!(pipeline.filtered().map(|f| f.len()), Some(10));

        pipeline.change_page(3);
        assert_eq!(pipeline.current_page(), 3);

        pipeline.set_filters(Filters::builder().country("Ghana").build());
        assert_eq!(pipeline.current_page(), 1);
        assert_eq!(pipeline.filtered().map(|f| f.len()), Some(5));

        pipeline.close();
        pipeline.set_filters(Filters::default());
        assert_eq!(pipeline.filtered().map(|f| f.len()), Some(5));
        assert!(pipeline.is_closed());
    }
}
