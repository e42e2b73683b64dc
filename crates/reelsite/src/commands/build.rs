//! Microsite build command.

use std::collections::HashMap;

use anyhow::Result;
use reelsite_data::config::{BASE_URL_ENV, BASE_URL_FALLBACK_ENV};
use reelsite_static::{BuildConfig, StaticBuilder};

use crate::BuildArgs;

pub const DEFAULT_DATA: &str = "data/videos.json";
pub const DEFAULT_CONFIG: &str = "data/site.json";

/// Snapshot the environment variables the builder consults.
fn build_env() -> HashMap<String, String> {
    [BASE_URL_ENV, BASE_URL_FALLBACK_ENV]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect()
}

/// Run the build command.
pub async fn run(args: BuildArgs) -> Result<()> {
    tracing::info!("Building microsite...");

    let config = BuildConfig {
        data_file: args.data,
        config_file: args.config,
        source_dir: args.source,
        output_dir: args.output,
        templates_dir: args.templates,
        env: build_env(),
    };

    let result = StaticBuilder::new(config).build().await?;

    if result.enabled {
        tracing::info!(
            "Built {} pages for {} videos in {}ms",
            result.pages,
            result.videos,
            result.duration_ms
        );
    } else {
        tracing::info!("Site disabled, wrote placeholder in {}ms", result.duration_ms);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
