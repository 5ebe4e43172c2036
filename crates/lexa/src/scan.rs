use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, anyhow};
use lexa_archive::{CounterSnapshot, Truncation};
use lexa_pipeline::{
    ArchiveInput, LeafResult, Pipeline, PipelineConfig, PipelineEvent, ResultSet, ResultView,
    RiskLevel, SkippedEntry,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ScanArgs;
use crate::ui::table::{Formatter, ResultRow};
use crate::ui::tracker::{ProgressTrackerBuilder, Tracker, TrackerBuilder};

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    leaf: &'a LeafResult,
    risk: Option<RiskLevel>,
    person_name: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    archive: &'a str,
    results: Vec<JsonRow<'a>>,
    truncation: Truncation,
    counters: CounterSnapshot,
    skipped: &'a [SkippedEntry],
}

pub async fn scan(args: &ScanArgs, config: PipelineConfig, quiet: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.archive)
        .with_context(|| format!("failed to read '{}'", args.archive.display()))?;
    let name = args
        .archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.archive.display().to_string());
    let size = data.len() as u64;
    let input = ArchiveInput::new(name.clone(), data).declared_size(size);

    let capabilities = config.capabilities;
    let pipeline = Pipeline::from_config(config).context("failed to set up the scoring client")?;

    let tracker = ProgressTrackerBuilder::default()
        .with_hidden(quiet || args.json)
        .with_prefix("Opening")
        .with_finish("done")
        .build();

    let mut run = pipeline.start(input);
    let mut finished = None;
    while let Some(event) = run.next_event().await {
        match event {
            PipelineEvent::Phase(phase) => {
                tracker.phase(phase);
            }
            PipelineEvent::Progress(pct) => {
                tracker.update(pct);
            }
            PipelineEvent::Leaf {
                display_name,
                score,
                ..
            } => {
                debug!(name = %display_name, ?score, "result");
                tracker.message(display_name);
            }
            PipelineEvent::Finished(result) => finished = Some(result),
        }
    }

    let outcome = match finished.ok_or_else(|| anyhow!("import ended without an outcome"))? {
        Ok(outcome) => {
            tracker.finish();
            outcome
        }
        Err(e) => {
            tracker.abandon();
            return Err(e).with_context(|| format!("failed to scan '{}'", args.archive.display()));
        }
    };

    let mut set = ResultSet::new(capabilities);
    set.replace(outcome);
    annotate(&mut set, args)?;

    let view = args.view();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        print_json(&set, &name, &view, &mut out)?;
    } else {
        print_table(&set, &name, &view, &mut out)?;
    }

    if let Some(outcome) = set.outcome() {
        if outcome.is_truncated() {
            eprintln!("{}", truncation_notice(outcome.truncation));
        }
        for skipped in &outcome.skipped {
            eprintln!("skipped {}: {}", skipped.path, skipped.reason);
        }
    }

    if let Some(target) = &args.export {
        let path = export_path(target);
        let file = File::create(&path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        set.export_xls(&view, BufWriter::new(file))
            .with_context(|| format!("failed to export to '{}'", path.display()))?;
        info!(path = %path.display(), "results exported");
        eprintln!("exported to {}", path.display());
    }

    Ok(())
}

fn annotate(set: &mut ResultSet, args: &ScanArgs) -> anyhow::Result<()> {
    for (key, person) in args.person_pairs()? {
        let path = set
            .leaves()
            .iter()
            .find(|leaf| leaf.display_name == key || leaf.path.to_string() == key)
            .map(|leaf| leaf.path.clone())
            .ok_or_else(|| anyhow!("no result named '{key}'"))?;
        set.annotate(&path, person)?;
    }
    Ok(())
}

fn print_table(set: &ResultSet, archive: &str, view: &ResultView, out: &mut impl Write) -> anyhow::Result<()> {
    let rows: Vec<ResultRow> = set.rows(view).into_iter().map(|leaf| ResultRow::new(leaf, set)).collect();
    let scored = set.leaves().iter().filter(|l| l.score.is_some()).count();
    let table = Formatter {
        header: Some(archive.to_string()),
        footer: Some(format!("{} shown, {} results, {} scored", rows.len(), set.leaves().len(), scored)),
    }
    .build(rows);
    writeln!(out, "{table}")?;
    Ok(())
}

fn print_json(set: &ResultSet, archive: &str, view: &ResultView, out: &mut impl Write) -> anyhow::Result<()> {
    let Some(outcome) = set.outcome() else {
        return Ok(());
    };
    let report = JsonReport {
        archive,
        results: set
            .rows(view)
            .into_iter()
            .map(|leaf| JsonRow {
                leaf,
                risk: leaf.score.map(RiskLevel::of),
                person_name: set.person_name(&leaf.path),
            })
            .collect(),
        truncation: outcome.truncation,
        counters: outcome.counters,
        skipped: &outcome.skipped,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn truncation_notice(truncation: Truncation) -> String {
    let reason = match (truncation.entry_limit, truncation.byte_limit) {
        (true, true) => "entry and size limits",
        (true, false) => "entry limit",
        _ => "size limit",
    };
    format!("warning: listing truncated, the {reason} was reached")
}

fn export_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        target.join(ResultSet::export_file_name(ms))
    } else {
        target.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_notice_names_the_limit() {
        let entry = Truncation {
            entry_limit: true,
            byte_limit: false,
        };
        assert!(truncation_notice(entry).contains("entry limit"));
        let both = Truncation {
            entry_limit: true,
            byte_limit: true,
        };
        assert!(truncation_notice(both).contains("entry and size limits"));
    }

    #[test]
    fn export_into_directory_gets_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(dir.path());
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("lexa-guard-export-") && name.ends_with(".xls"));

        let file = dir.path().join("out.xls");
        assert_eq!(export_path(&file), file);
    }
}
