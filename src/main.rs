// SPDX-FileCopyrightText: 2021-2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

mod cli;

use clap::{crate_name, ArgMatches};
use cli_utils::logging;
use cli_utils::BoxResult;
use elwazi_catalogue::{
    export,
    filter::{FilterEngine, Filters},
    pipeline::ProjectsPipeline,
    settings::{self, Settings},
};
use futures::StreamExt;
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;
use tracing_subscriber::filter::LevelFilter;

#[allow(clippy::print_stdout)]
fn print_version_and_exit(quiet: bool) {
    if !quiet {
        print!("{} ", clap::crate_name!());
    }
    println!("{}", elwazi_catalogue::VERSION);
    std::process::exit(0);
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> BoxResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Loads the catalogue into a fresh pipeline, and applies `filters`.
async fn run_pipeline(settings: &Settings, filters: Filters) -> BoxResult<ProjectsPipeline> {
    let mut pipeline = ProjectsPipeline::new(FilterEngine::default(), settings.items_per_page);
    let mut failures = pipeline.filtered_projects();
    pipeline.retrieve(settings.source.as_ref()).await;
    if pipeline.is_closed() {
        while let Some(update) = failures.next().await {
            update?;
        }
        return Err("Failed to retrieve the projects".into());
    }
    pipeline.set_filters(filters);
    Ok(pipeline)
}

async fn list(settings: &Settings, filters: Filters, page: usize) -> BoxResult<()> {
    let mut pipeline = run_pipeline(settings, filters).await?;
    let mut pages = pipeline.paged_projects();
    pipeline.change_page(page);
    pipeline.close();
    if let Some(update) = pages.next().await {
        let paginated = update?;
        tracing::info!(
            "Showing page {} of {} ({} per page, {} projects in total)",
            paginated.page.current_page,
            paginated.page.total_pages(),
            pipeline.items_per_page(),
            paginated.page.total_items
        );
        print_json(paginated.as_ref())?;
    }
    Ok(())
}

async fn summary(settings: &Settings) -> BoxResult<()> {
    let mut pipeline = ProjectsPipeline::new(FilterEngine::default(), settings.items_per_page);
    let mut summaries = pipeline.summary();
    pipeline.retrieve(settings.source.as_ref()).await;
    pipeline.close();
    while let Some(update) = summaries.next().await {
        print_json(update?.as_ref())?;
    }
    Ok(())
}

async fn export(settings: &Settings, args: &ArgMatches) -> BoxResult<()> {
    let pipeline = run_pipeline(settings, cli::filters(args)).await?;
    if pipeline.current_filters().is_empty() {
        tracing::info!("No filters given; exporting the whole catalogue ...");
    }
    let projects = pipeline.filtered().unwrap_or_default();
    let tsv = export::to_tsv(projects.as_slice(), &settings.export.columns).await?;
    let output = args
        .get_one::<PathBuf>(cli::A_L_OUTPUT)
        .cloned()
        .unwrap_or_else(|| settings.export.file_name.clone());
    export::write_tsv(&output, &tsv).await?;
    tracing::info!("Exported {} projects.", projects.len());
    Ok(())
}

async fn history(settings: &Settings) -> BoxResult<()> {
    let history = settings.source.fetch_update_history().await?;
    print_json(&history)
}

#[tokio::main]
#[instrument]
async fn main() -> BoxResult<()> {
    let log_reload_handle = logging::setup(crate_name!())?;
    let args = cli::args_matcher().get_matches();

    let quiet = args.get_flag(cli::A_L_QUIET);
    let version = args.get_flag(cli::A_L_VERSION);
    if version {
        print_version_and_exit(quiet);
    }

    let verbose = args.get_flag(cli::A_L_VERBOSE);

    let log_level = if verbose {
        LevelFilter::TRACE
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    logging::set_log_level_tracing(&log_reload_handle, log_level)?;

    let config_file = args.get_one::<PathBuf>(cli::A_L_CONFIG);
    let run_settings = settings::load(config_file.map(PathBuf::as_path))?;
    tracing::debug!("Using data source: {}", run_settings.source);

    match args.subcommand() {
        Some((cli::SC_SUMMARY, _)) => summary(&run_settings).await,
        Some((cli::SC_EXPORT, sub_args)) => export(&run_settings, sub_args).await,
        Some((cli::SC_HISTORY, _)) => history(&run_settings).await,
        Some((cli::SC_LIST, sub_args)) => {
            let page = sub_args.get_one::<usize>(cli::A_L_PAGE).copied().unwrap_or(1);
            list(&run_settings, cli::filters(sub_args), page).await
        }
        Some((other, _)) => Err(format!("Unknown sub-command '{other}'").into()),
        None => list(&run_settings, Filters::default(), 1).await,
    }
}
