// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Extraction of [`Link`]s to external archives
//! out of the identifier and URL fields of raw records.
//!
//! None of these functions fail;
//! input that does not match simply contributes no links.

use crate::model::project::{Accessions, Link, Publication};
use crate::tools::OneOrMany;
use regex::Regex;
use std::sync::LazyLock;

pub const PREFIX_ENA: &str = "https://identifiers.org/ena.embl:";
pub const PREFIX_ARRAY_EXPRESS: &str = "https://identifiers.org/arrayexpress:";
pub const PREFIX_GEO: &str = "https://identifiers.org/geo:";
pub const PREFIX_DBGAP: &str = "https://identifiers.org/dbgap:";
pub const PREFIX_EGA_STUDIES: &str = "https://ega-archive.org/studies/";
pub const PREFIX_EGA_DATASETS: &str = "https://ega-archive.org/datasets/";

static R_EGA_STUDY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(EGAS\d*)").unwrap());
static R_EGA_DATASET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(EGAD\d*)").unwrap());

static R_CELLXGENE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://cellxgene\.cziscience\.com/collections/(?P<accession>[^;/?:@=&\s]+)(?:/.*)*$",
    )
    .unwrap()
});
static R_SCEA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://www\.ebi\.ac\.uk/gxa/sc/experiments/(?P<accession>[^;/?:@=&\s]+)/results(?:/tsne)?$",
    )
    .unwrap()
});
/// Data-set given as query parameter, e.g. `https://cells.ucsc.edu/?ds=my-set`
static R_UCSC_POST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:.*\.)?cells\.ucsc\.edu/?\?(?:.*&)*ds=(?P<accession>[^;/?:@=&\s]+)(?:&.*)*$",
    )
    .unwrap()
});
/// Data-set given as sub-domain, e.g. `https://my-set.cells.ucsc.edu/`
static R_UCSC_PRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?P<accession>[^;/?:@=&\s]+)\.cells\.ucsc\.edu/?(?:\?.*)?$")
        .unwrap()
});

/// Creates one link per accession,
/// pointing to `prefix` + accession.
#[must_use]
pub fn accession_links<S: AsRef<str>>(accessions: &[S], prefix: &str) -> Vec<Link> {
    accessions
        .iter()
        .map(|accession| {
            let accession = accession.as_ref();
            Link::new(accession, format!("{prefix}{accession}"))
        })
        .collect()
}

/// ENA accessions are sometimes found as a single string
/// instead of a list of them in the source data.
#[must_use]
pub fn ena_accession_links(ena_accessions: Option<OneOrMany<String>>) -> Vec<Link> {
    let accessions = ena_accessions.map(OneOrMany::into_vec).unwrap_or_default();
    accession_links(&accessions, PREFIX_ENA)
}

/// Returns the first capture group of `regex` for each string it matches.
fn capture_regex_groups<'a, S: AsRef<str>>(regex: &Regex, strings: &'a [S]) -> Vec<&'a str> {
    strings
        .iter()
        .filter_map(|string| regex.captures(string.as_ref()))
        .filter_map(|captures| captures.get(1))
        .map(|group| group.as_str())
        .collect()
}

/// Study links come first, dataset links second,
/// each in the order of the input.
#[must_use]
pub fn ega_accession_links<S: AsRef<str>>(ega_accessions: &[S]) -> Vec<Link> {
    let mut links = accession_links(
        &capture_regex_groups(&R_EGA_STUDY, ega_accessions),
        PREFIX_EGA_STUDIES,
    );
    links.extend(accession_links(
        &capture_regex_groups(&R_EGA_DATASET, ega_accessions),
        PREFIX_EGA_DATASETS,
    ));
    links
}

fn captured_accession_link(regex: &Regex, url: &str) -> Option<Link> {
    regex
        .captures(url)
        .and_then(|captures| captures.name("accession"))
        .map(|accession| Link::new(accession.as_str(), url))
}

/// Sorts supplementary links (plain URLs) into the viewer-specific link lists.
/// The link keeps the original URL,
/// and is named after the accession found within it.
pub fn add_supplementary_links<S: AsRef<str>>(accessions: &mut Accessions, links: &[S]) {
    for url in links.iter().map(AsRef::as_ref) {
        if let Some(link) = captured_accession_link(&R_CELLXGENE, url) {
            accessions.cellxgene.push(link);
        }
        if let Some(link) = captured_accession_link(&R_SCEA, url) {
            accessions.scea.push(link);
        }
        if let Some(link) = captured_accession_link(&R_UCSC_POST, url)
            .or_else(|| captured_accession_link(&R_UCSC_PRE, url))
        {
            accessions.ucsc.push(link);
        }
    }
}

#[must_use]
pub fn publication_links(publications: &[Publication]) -> Vec<Link> {
    publications
        .iter()
        .map(|publication| {
            let name = if publication.journal_title == "bioRxiv" {
                "bioRxiv (pre-publication)"
            } else {
                publication.journal_title.as_str()
            };
            Link::new(name, publication.url.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accession_links() {
        let links = accession_links(&["E-MTAB-1", "E-MTAB-2"], PREFIX_ARRAY_EXPRESS);
        assert_eq!(
            links,
            vec![
                Link::new("E-MTAB-1", "https://identifiers.org/arrayexpress:E-MTAB-1"),
                Link::new("E-MTAB-2", "https://identifiers.org/arrayexpress:E-MTAB-2"),
            ]
        );
    }

    #[test]
    fn test_ena_single_string() {
        let links = ena_accession_links(Some(OneOrMany::One("PRJEB123".to_owned())));
        assert_eq!(
            links,
            vec![Link::new("PRJEB123", "https://identifiers.org/ena.embl:PRJEB123")]
        );
        assert!(ena_accession_links(None).is_empty());
    }

    #[test]
    fn test_ena_list() {
        let links = ena_accession_links(Some(OneOrMany::Many(vec![
            "PRJEB1".to_owned(),
            "PRJEB2".to_owned(),
        ])));
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].href, "https://identifiers.org/ena.embl:PRJEB2");
    }

    #[test]
    fn test_ega_study_and_dataset() {
        let links = ega_accession_links(&["EGAS00001", "EGAD00002"]);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "EGAS00001");
        assert!(links[0].href.ends_with("/studies/EGAS00001"));
        assert_eq!(links[1].name, "EGAD00002");
        assert!(links[1].href.ends_with("/datasets/EGAD00002"));
    }

    #[test]
    fn test_ega_grouped_by_family() {
        let links = ega_accession_links(&["EGAD1", "egas2", "no accession here"]);
        let names: Vec<_> = links.iter().map(|link| link.name.as_str()).collect();
        assert_eq!(names, vec!["egas2", "EGAD1"]);
    }

    #[test]
    fn test_supplementary_links() {
        let mut accessions = Accessions::default();
        add_supplementary_links(
            &mut accessions,
            &[
                "https://cellxgene.cziscience.com/collections/abc-123/datasets",
                "https://www.ebi.ac.uk/gxa/sc/experiments/E-GEOD-1/results/tsne",
                "https://cells.ucsc.edu/?bp=brain&ds=cortex-dev",
                "https://adult-heart.cells.ucsc.edu/",
                "https://example.org/unrelated",
            ],
        );
        assert_eq!(accessions.cellxgene.len(), 1);
        assert_eq!(accessions.cellxgene[0].name, "abc-123");
        assert_eq!(
            accessions.cellxgene[0].href,
            "https://cellxgene.cziscience.com/collections/abc-123/datasets"
        );
        assert_eq!(accessions.scea.len(), 1);
        assert_eq!(accessions.scea[0].name, "E-GEOD-1");
        let ucsc: Vec<_> = accessions.ucsc.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(ucsc, vec!["cortex-dev", "adult-heart"]);
        assert!(accessions.ena.is_empty());
    }

    #[test]
    fn test_publication_links() {
        let publications = vec![
            Publication {
                journal_title: "bioRxiv".to_owned(),
                url: "https://doi.org/1".to_owned(),
                ..Default::default()
            },
            Publication {
                journal_title: "Nature".to_owned(),
                url: "https://doi.org/2".to_owned(),
                ..Default::default()
            },
        ];
        let links = publication_links(&publications);
        assert_eq!(links[0].name, "bioRxiv (pre-publication)");
        assert_eq!(links[1], Link::new("Nature", "https://doi.org/2"));
    }
}
