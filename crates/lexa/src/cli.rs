use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use lexa_pipeline::{PipelineConfig, ResultView, SortKey, SortOrder};

#[derive(Clone, Debug, Parser)]
#[command(name = "lexa", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file. Defaults to `lexa.toml` in the working directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

impl App {
    /// Default log directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "s", name = "scan", about = "Extract and score every document in an archive")]
    Scan(ScanArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    #[default]
    Walk,
    Name,
    Score,
    Size,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Walk => SortKey::Walk,
            SortArg::Name => SortKey::Name,
            SortArg::Score => SortKey::Score,
            SortArg::Size => SortKey::Size,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ScanArgs {
    /// ZIP archive to scan.
    pub archive: PathBuf,

    /// Deepest container level processed; the archive itself is level 1.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Maximum number of entries admitted across all levels.
    #[arg(long, value_name = "N")]
    pub max_entries: Option<u64>,

    /// Maximum cumulative decoded bytes across all levels.
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,

    /// Scoring endpoint URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Per-request scoring timeout.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Documents extracted and scored at the same time.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Also list entries that are not documents.
    #[arg(long)]
    pub all: bool,

    #[arg(long, value_enum, default_value_t)]
    pub sort: SortArg,

    /// Sort in descending order.
    #[arg(long)]
    pub desc: bool,

    /// Only show results whose name contains TEXT (case-insensitive).
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Only show results scoring at least PCT percent.
    #[arg(long, value_name = "PCT")]
    pub min_score: Option<f64>,

    /// Attach a person name to a result, by display name or full path.
    #[arg(long = "person", value_name = "RESULT=NAME")]
    pub persons: Vec<String>,

    /// Write the shown results as an `.xls` spreadsheet. A directory gets a
    /// timestamped file name.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Print results as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// Layer command-line overrides on top of the loaded configuration.
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(depth) = self.max_depth {
            config.limits = config.limits.max_depth(depth);
        }
        if let Some(entries) = self.max_entries {
            config.limits = config.limits.max_entries(entries);
        }
        if let Some(bytes) = self.max_bytes {
            config.limits = config.limits.max_total_bytes(bytes);
        }
        if let Some(endpoint) = &self.endpoint {
            config.scoring = config.scoring.endpoint(endpoint.clone());
        }
        if let Some(secs) = self.timeout.and_then(|s| std::time::Duration::try_from_secs_f64(s).ok()) {
            config.scoring = config.scoring.timeout(secs);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.concurrency(concurrency);
        }
        if self.all {
            config = config.emit_unsupported(true);
        }
        if !self.persons.is_empty() {
            config = config.annotations(true);
        }
        if self.export.is_some() {
            config = config.export(true);
        }
        config
    }

    pub fn view(&self) -> ResultView {
        let order = if self.desc { SortOrder::Desc } else { SortOrder::Asc };
        let mut view = ResultView::default().sort(self.sort.into(), order);
        if let Some(filter) = &self.filter {
            view = view.name_filter(filter.as_str());
        }
        if let Some(min) = self.min_score {
            view = view.min_score_pct(min);
        }
        view
    }

    /// `--person` values split into `(result, name)`.
    pub fn person_pairs(&self) -> anyhow::Result<Vec<(&str, &str)>> {
        self.persons
            .iter()
            .map(|raw| {
                raw.split_once('=')
                    .map(|(result, name)| (result.trim(), name.trim()))
                    .ok_or_else(|| anyhow::anyhow!("invalid --person '{raw}', expected RESULT=NAME"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(args: &[&str]) -> ScanArgs {
        let app = App::try_parse_from(["lexa", "scan"].iter().chain(args)).unwrap();
        match app.cmd {
            Commands::Scan(args) => args,
        }
    }

    #[test]
    fn overrides_apply_to_config() {
        let args = scan(&[
            "in.zip",
            "--max-depth",
            "2",
            "--max-entries",
            "10",
            "--max-bytes",
            "4096",
            "--endpoint",
            "http://localhost:9000/",
            "--concurrency",
            "8",
            "--all",
        ]);
        let config = args.apply(PipelineConfig::default());

        assert_eq!(config.limits.max_depth, 2);
        assert_eq!(config.limits.max_entries, 10);
        assert_eq!(config.limits.max_total_bytes, 4096);
        assert_eq!(config.scoring.endpoint, "http://localhost:9000/");
        assert_eq!(config.concurrency, 8);
        assert!(config.emit_unsupported);
        assert!(!config.capabilities.export);
    }

    #[test]
    fn absent_flags_keep_config() {
        let base = PipelineConfig::default().concurrency(3);
        let config = scan(&["in.zip"]).apply(base.clone());
        assert_eq!(config, base);
    }

    #[test]
    fn export_and_persons_enable_capabilities() {
        let config = scan(&["in.zip", "--export", "out.xls", "--person", "a-0.pdf=Ada"])
            .apply(PipelineConfig::default());
        assert!(config.capabilities.export);
        assert!(config.capabilities.annotations);
    }

    #[test]
    fn view_from_flags() {
        let view = scan(&["in.zip", "--sort", "score", "--desc", "--filter", "Essay", "--min-score", "70"]).view();
        assert_eq!(view.sort, SortKey::Score);
        assert_eq!(view.order, SortOrder::Desc);
        assert_eq!(view.name_filter.as_deref(), Some("essay"));
        assert_eq!(view.min_score_pct, Some(70.0));
    }

    #[test]
    fn person_pairs_need_separator() {
        let args = scan(&["in.zip", "--person", "a-0.pdf = Ada Lovelace"]);
        assert_eq!(args.person_pairs().unwrap(), [("a-0.pdf", "Ada Lovelace")]);
        assert!(scan(&["in.zip", "--person", "nobody"]).person_pairs().is_err());
    }

    #[test]
    fn verbosity_maps_to_log_level() {
        let app = App::try_parse_from(["lexa", "-vv", "scan", "in.zip"]).unwrap();
        assert_eq!(app.log_level(), "debug");
        let app = App::try_parse_from(["lexa", "scan", "in.zip", "-q"]).unwrap();
        assert_eq!(app.log_level(), "error");
    }
}
