// SPDX-FileCopyrightText: 2021-2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command, ValueHint};
use elwazi_catalogue::filter::Filters;
use std::path::PathBuf;

pub const A_L_VERSION: &str = "version";
pub const A_S_VERSION: char = 'V';
pub const A_L_QUIET: &str = "quiet";
pub const A_S_QUIET: char = 'q';
pub const A_L_VERBOSE: &str = "verbose";
pub const A_S_VERBOSE: char = 'v';
pub const A_L_CONFIG: &str = "config";
pub const A_S_CONFIG: char = 'c';

pub const A_L_NAME: &str = "name";
pub const A_S_NAME: char = 'n';
pub const A_L_COUNTRY: &str = "country";
pub const A_L_DATA_TYPE: &str = "data-type";
pub const A_L_ORGAN: &str = "organ";
pub const A_L_TECHNOLOGY: &str = "technology";
pub const A_L_LOCATION: &str = "location";
pub const A_L_SEARCH: &str = "search";
pub const A_S_SEARCH: char = 's';
pub const A_L_RECENT_FIRST: &str = "recent-first";
pub const A_L_PAGE: &str = "page";
pub const A_S_PAGE: char = 'p';
pub const A_L_OUTPUT: &str = "output";
pub const A_S_OUTPUT: char = 'o';

pub const SC_LIST: &str = "list";
pub const SC_SUMMARY: &str = "summary";
pub const SC_EXPORT: &str = "export";
pub const SC_HISTORY: &str = "history";

fn arg_version() -> Arg {
    Arg::new(A_L_VERSION)
        .help("Print version information and exit. May be combined with -q,--quiet, to really only output the version string.")
        .short(A_S_VERSION)
        .long(A_L_VERSION)
        .action(ArgAction::SetTrue)
}

fn arg_quiet() -> Arg {
    Arg::new(A_L_QUIET)
        .help("Minimize or suppress output to stderr")
        .long_help("Minimize or suppress output to stderr; stdout is still used for the results.")
        .short(A_S_QUIET)
        .long(A_L_QUIET)
        .action(ArgAction::SetTrue)
        .global(true)
        .conflicts_with(A_L_VERBOSE)
}

fn arg_verbose() -> Arg {
    Arg::new(A_L_VERBOSE)
        .help("More verbose log output")
        .short(A_S_VERBOSE)
        .long(A_L_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
}

fn arg_config() -> Arg {
    Arg::new(A_L_CONFIG)
        .help("The config file to use")
        .long_help("The config file to use, instead of the default 'catalogue.yml' in the working directory.")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .value_name("FILE")
        .value_hint(ValueHint::FilePath)
        .short(A_S_CONFIG)
        .long(A_L_CONFIG)
        .global(true)
}

fn filter_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .num_args(1)
        .value_name("VALUE")
        .long(name)
}

fn args_filters() -> Vec<Arg> {
    vec![
        filter_arg(A_L_NAME, "Only projects whose name contains this (case-sensitive)")
            .short(A_S_NAME),
        filter_arg(A_L_COUNTRY, "Only projects run in this country"),
        filter_arg(
            A_L_DATA_TYPE,
            "Only projects offering this type of data, e.g. 'Genomic (Human)'",
        ),
        filter_arg(A_L_ORGAN, "Only projects covering this organ"),
        filter_arg(A_L_TECHNOLOGY, "Only projects using this technology"),
        filter_arg(
            A_L_LOCATION,
            "Only projects with data in this archive, e.g. 'EGA' or 'HCA Data Portal'",
        ),
        filter_arg(
            A_L_SEARCH,
            "Free-text search; all the (white-space separated) keywords have to match",
        )
        .short(A_S_SEARCH),
        Arg::new(A_L_RECENT_FIRST)
            .help("Sort the most recently catalogued projects first")
            .long(A_L_RECENT_FIRST)
            .action(ArgAction::SetTrue),
    ]
}

fn arg_page() -> Arg {
    Arg::new(A_L_PAGE)
        .help("The page to show (1-based)")
        .num_args(1)
        .value_parser(value_parser!(usize))
        .value_name("NUMBER")
        .default_value("1")
        .short(A_S_PAGE)
        .long(A_L_PAGE)
}

fn arg_output() -> Arg {
    Arg::new(A_L_OUTPUT)
        .help("The file to write the TSV export to")
        .long_help("The file to write the TSV export to; defaults to the file name set in the config.")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .value_name("FILE")
        .value_hint(ValueHint::FilePath)
        .short(A_S_OUTPUT)
        .long(A_L_OUTPUT)
}

fn subcommands() -> Vec<Command> {
    vec![
        Command::new(SC_LIST)
            .about("Prints one page of the (filtered) projects as JSON")
            .args(args_filters())
            .arg(arg_page()),
        Command::new(SC_SUMMARY)
            .about("Prints the number of projects per organ, technology and country as JSON"),
        Command::new(SC_EXPORT)
            .about("Writes all the (filtered) projects to a TSV file")
            .args(args_filters())
            .arg(arg_output()),
        Command::new(SC_HISTORY).about("Prints the update history of the catalogue as JSON"),
    ]
}

#[must_use]
pub fn args_matcher() -> Command {
    command!()
        .about("Browses, filters, summarizes and exports a catalogue of research projects.")
        .bin_name(clap::crate_name!())
        .help_expected(true)
        .disable_version_flag(true)
        .args([arg_version(), arg_quiet(), arg_verbose(), arg_config()])
        .subcommands(subcommands())
}

fn get_string(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name).cloned().unwrap_or_default()
}

/// Collects the filter arguments of a sub-command.
#[must_use]
pub fn filters(args: &ArgMatches) -> Filters {
    Filters::builder()
        .project_name(get_string(args, A_L_NAME))
        .country(get_string(args, A_L_COUNTRY))
        .data_type(get_string(args, A_L_DATA_TYPE))
        .organ(get_string(args, A_L_ORGAN))
        .technology(get_string(args, A_L_TECHNOLOGY))
        .location(get_string(args, A_L_LOCATION))
        .search(get_string(args, A_L_SEARCH))
        .recent_first(args.get_flag(A_L_RECENT_FIRST))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        args_matcher().debug_assert();
    }

    #[test]
    fn test_filters_from_args() {
        let matches = args_matcher().get_matches_from([
            "elwazi-catalogue",
            "list",
            "--country",
            "Kenya",
            "-s",
            "heart",
            "--recent-first",
            "--page",
            "3",
        ]);
        let (name, sub_args) = matches.subcommand().unwrap();
        assert_eq!(name, SC_LIST);
        let filters = filters(sub_args);
        assert_eq!(filters.country, "Kenya");
        assert_eq!(filters.search, "heart");
        assert!(filters.recent_first);
        assert!(filters.project_name.is_empty());
        assert_eq!(sub_args.get_one::<usize>(A_L_PAGE), Some(&3));
    }
}
