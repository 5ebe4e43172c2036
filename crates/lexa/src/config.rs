use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::{
    Figment,
    providers::{self, Format},
};
use lexa_pipeline::PipelineConfig;

const DEFAULT_FILE: &str = "lexa.toml";
const ENV_PREFIX: &str = "LEXA_";

/// Load the pipeline configuration.
///
/// Layers, later ones winning: built-in defaults, the TOML file (`path`, or
/// `lexa.toml` in the working directory when present), then `LEXA_*`
/// environment variables with `__` separating nested keys
/// (`LEXA_LIMITS__MAX_DEPTH=3`).
pub fn load(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let file = match path {
        Some(path) => {
            anyhow::ensure!(path.is_file(), "config file '{}' not found", path.display());
            path.to_path_buf()
        }
        None => PathBuf::from(DEFAULT_FILE),
    };

    figment(&file)
        .extract()
        .with_context(|| format!("failed to load configuration from '{}'", file.display()))
}

fn figment(file: &Path) -> Figment {
    Figment::from(providers::Serialized::defaults(PipelineConfig::default()))
        .merge(providers::Toml::file(file))
        .merge(providers::Env::prefixed(ENV_PREFIX).split("__"))
}
