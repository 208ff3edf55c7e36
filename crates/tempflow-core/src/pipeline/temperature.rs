//! The min/max temperature graph.
//!
//! ```text
//! download_min_temperatures -> import_min_temperatures -> remove_min_temp_nans -> standardise_min_temps \
//!                                                                                                        combine_temps
//! download_max_temperatures -> import_max_temperatures -> remove_max_temp_nans -> standardise_max_temps /
//! ```

use std::sync::Arc;

use crate::app::PipelineBuilder;
use crate::config::PipelineConfig;
use crate::domain::PipelineError;
use crate::graph::TaskGraph;
use crate::ports::Fetcher;

use super::{CleanTask, CombineTask, FetchTask, ParseTask, ScaleTask};

pub const COMBINE_TEMPS: &str = "combine_temps";
pub const COMBINED_ARTIFACT: &str = "combined_temps.df";

/// Task and artifact names of one temperature chain.
struct Chain {
    download: &'static str,
    import: &'static str,
    clean: &'static str,
    scale: &'static str,
    raw: &'static str,
    parsed: &'static str,
    cleaned: &'static str,
    scaled: &'static str,
}

const MIN: Chain = Chain {
    download: "download_min_temperatures",
    import: "import_min_temperatures",
    clean: "remove_min_temp_nans",
    scale: "standardise_min_temps",
    raw: "min_temps.csv",
    parsed: "min_temps.df",
    cleaned: "clean_min_temps.df",
    scaled: "normalised_min_temps.df",
};

const MAX: Chain = Chain {
    download: "download_max_temperatures",
    import: "import_max_temperatures",
    clean: "remove_max_temp_nans",
    scale: "standardise_max_temps",
    raw: "max_temps.csv",
    parsed: "max_temps.df",
    cleaned: "clean_max_temps.df",
    scaled: "normalised_max_temps.df",
};

fn register_chain(
    builder: PipelineBuilder,
    chain: &Chain,
    url: &str,
    column: &str,
    sentinel: f64,
    fetcher: Arc<dyn Fetcher>,
) -> Result<PipelineBuilder, PipelineError> {
    builder
        .register(FetchTask::new(chain.download, url, chain.raw, fetcher))?
        .register(ParseTask::new(chain.import, chain.download, chain.parsed, column))?
        .register(CleanTask::new(chain.clean, chain.import, chain.cleaned, sentinel))?
        .register(ScaleTask::new(chain.scale, chain.clean, chain.scaled))
}

/// Build the nine-task graph for `config`, fetching through `fetcher`.
pub fn temperature_pipeline(
    config: &PipelineConfig,
    fetcher: Arc<dyn Fetcher>,
) -> Result<TaskGraph, PipelineError> {
    config.validate()?;

    let builder = PipelineBuilder::new();
    let builder = register_chain(
        builder,
        &MIN,
        &config.min_url,
        &config.min_column,
        config.sentinel,
        Arc::clone(&fetcher),
    )?;
    let builder = register_chain(
        builder,
        &MAX,
        &config.max_url,
        &config.max_column,
        config.sentinel,
        fetcher,
    )?;

    builder
        .register(CombineTask::new(
            COMBINE_TEMPS,
            MIN.scale,
            MAX.scale,
            COMBINED_ARTIFACT,
        ))?
        .build()
}
