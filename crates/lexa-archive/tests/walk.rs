use std::io::{Cursor, Write};
use std::ops::ControlFlow;

use bytes::Bytes;
use lexa_archive::{
    ArchivePath, BudgetTracker, Error, ExtractionLimits, Leaf, LeafSink, WalkMode, Walker,
};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Flip the first byte of `marker` inside a stored archive so its CRC check fails.
fn corrupt(mut data: Vec<u8>, marker: &[u8]) -> Vec<u8> {
    let at = data
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("marker is stored verbatim");
    data[at] ^= 0xff;
    data
}

#[derive(Default)]
struct Collect {
    leaves: Vec<Leaf>,
    skipped: Vec<String>,
}

impl Collect {
    fn paths(&self) -> Vec<String> {
        self.leaves.iter().map(|l| l.path.to_string()).collect()
    }
}

impl LeafSink for Collect {
    fn accept(&mut self, leaf: Leaf) -> ControlFlow<()> {
        self.leaves.push(leaf);
        ControlFlow::Continue(())
    }

    fn skipped(&mut self, path: &ArchivePath, _reason: &Error) {
        self.skipped.push(path.to_string());
    }
}

fn walk(data: Vec<u8>, limits: ExtractionLimits) -> (Collect, BudgetTracker) {
    let budget = BudgetTracker::new(&limits);
    let mut sink = Collect::default();
    Walker::new(limits, &budget)
        .walk_root(Bytes::from(data), &ArchivePath::root("top.zip"), &mut sink)
        .expect("top-level archive opens");
    (sink, budget)
}

#[test]
fn entries_are_visited_in_name_order() {
    let data = zip_of(&[("b.pdf", b"b"), ("a.pdf", b"a"), ("c.txt", b"c")]);
    let (sink, _) = walk(data, ExtractionLimits::default());
    assert_eq!(
        sink.paths(),
        ["top.zip!/a.pdf", "top.zip!/b.pdf", "top.zip!/c.txt"]
    );
    assert!(sink.leaves[0].is_scorable());
    assert!(!sink.leaves[2].is_scorable());
    assert_eq!(sink.leaves[0].payload.as_deref(), Some(&b"a"[..]));
}

#[test]
fn repeated_walks_are_identical() {
    let inner = zip_of(&[("z.pdf", b"z"), ("m.pdf", b"m")]);
    let data = zip_of(&[("x.pdf", b"x"), ("inner.zip", &inner), ("a.txt", b"a")]);
    let (first, _) = walk(data.clone(), ExtractionLimits::default());
    let (second, _) = walk(data, ExtractionLimits::default());
    assert_eq!(first.paths(), second.paths());
    assert_eq!(
        first.paths(),
        [
            "top.zip!/a.txt",
            "top.zip!/inner.zip!/m.pdf",
            "top.zip!/inner.zip!/z.pdf",
            "top.zip!/x.pdf",
        ]
    );
}

#[test]
fn directory_markers_consume_no_budget() {
    let data = zip_of(&[("essays/", b""), ("essays/a.pdf", b"a")]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_entries(1));
    assert_eq!(sink.paths(), ["top.zip!/essays/a.pdf"]);
    assert!(!budget.truncation().is_truncated());
}

#[test]
fn nested_container_beyond_max_depth_is_refused() {
    let b = zip_of(&[("doc.pdf", b"%PDF")]);
    let a = zip_of(&[("b.zip", &b)]);

    let (sink, budget) = walk(a.clone(), ExtractionLimits::default().max_depth(1));
    assert!(sink.leaves.is_empty());
    assert!(sink.skipped.is_empty());
    assert_eq!(budget.counters().bytes_decoded(), 0);

    let (sink, _) = walk(a, ExtractionLimits::default().max_depth(2));
    assert_eq!(sink.paths(), ["top.zip!/b.zip!/doc.pdf"]);
}

#[test]
fn container_at_exactly_max_depth_contributes_leaves() {
    let c = zip_of(&[("deep.pdf", b"d")]);
    let b = zip_of(&[("c.zip", &c), ("mid.pdf", b"m")]);
    let a = zip_of(&[("b.zip", &b)]);

    let (sink, _) = walk(a, ExtractionLimits::default().max_depth(2));
    assert_eq!(sink.paths(), ["top.zip!/b.zip!/mid.pdf"]);
}

#[test]
fn entry_limit_truncates() {
    let data = zip_of(&[
        ("1.pdf", b"1"),
        ("2.pdf", b"2"),
        ("3.pdf", b"3"),
        ("4.pdf", b"4"),
        ("5.pdf", b"5"),
    ]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_entries(2));
    assert_eq!(sink.leaves.len(), 2);
    assert!(budget.truncation().entry_limit);
    assert!(!budget.truncation().byte_limit);
}

#[test]
fn exact_entry_fit_before_empty_container_is_not_truncation() {
    let empty = zip_of(&[]);
    let data = zip_of(&[("a.pdf", b"a"), ("b.pdf", b"b"), ("z.zip", &empty)]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_entries(2));
    assert_eq!(sink.paths(), ["top.zip!/a.pdf", "top.zip!/b.pdf"]);
    assert!(!budget.truncation().is_truncated());
}

#[test]
fn exact_entry_fit_before_directory_only_container_is_not_truncation() {
    let dirs = zip_of(&[("notes/", b""), ("notes/old/", b"")]);
    let data = zip_of(&[("a.pdf", b"a"), ("b.pdf", b"b"), ("z.zip", &dirs)]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_entries(2));
    assert_eq!(sink.leaves.len(), 2);
    assert!(!budget.truncation().is_truncated());
}

#[test]
fn leaf_refused_inside_container_after_exact_fit_is_truncation() {
    let inner = zip_of(&[("c.pdf", b"c")]);
    let data = zip_of(&[("a.pdf", b"a"), ("b.pdf", b"b"), ("z.zip", &inner)]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_entries(2));
    assert_eq!(sink.paths(), ["top.zip!/a.pdf", "top.zip!/b.pdf"]);
    assert!(budget.truncation().entry_limit);
    assert!(!budget.truncation().byte_limit);
}

#[test]
fn byte_limit_truncates() {
    let payload = [0u8; 40];
    let data = zip_of(&[("a.pdf", &payload), ("b.pdf", &payload), ("c.pdf", &payload)]);
    let (sink, budget) = walk(data, ExtractionLimits::default().max_total_bytes(100));
    assert_eq!(sink.paths(), ["top.zip!/a.pdf", "top.zip!/b.pdf"]);
    assert_eq!(budget.counters().bytes_decoded(), 80);
    assert!(budget.truncation().byte_limit);
}

#[test]
fn byte_exhaustion_stops_enclosing_containers() {
    let payload = [7u8; 60];
    let inner = zip_of(&[("x.pdf", &payload), ("y.pdf", &payload)]);
    let inner_len = inner.len() as u64;
    let data = zip_of(&[("a.zip", &inner), ("z.pdf", &payload[..10])]);

    // room for the inner container, x.pdf and z.pdf, but not y.pdf
    let limits = ExtractionLimits::default().max_total_bytes(inner_len + 70);
    let (sink, budget) = walk(data, limits);
    assert_eq!(sink.paths(), ["top.zip!/a.zip!/x.pdf"]);
    assert!(budget.truncation().byte_limit);
}

#[test]
fn corrupt_nested_container_is_isolated() {
    let data = zip_of(&[
        ("a.pdf", b"a"),
        ("broken.zip", b"this is not a zip archive"),
        ("c.pdf", b"c"),
    ]);
    let (sink, _) = walk(data, ExtractionLimits::default());
    assert_eq!(sink.paths(), ["top.zip!/a.pdf", "top.zip!/c.pdf"]);
    assert_eq!(sink.skipped, ["top.zip!/broken.zip"]);
}

#[test]
fn corrupt_leaf_is_isolated() {
    let data = zip_of(&[("a.pdf", b"damaged payload"), ("b.pdf", b"intact payload")]);
    let (sink, _) = walk(corrupt(data, b"damaged"), ExtractionLimits::default());
    assert_eq!(sink.paths(), ["top.zip!/b.pdf"]);
    assert_eq!(sink.skipped, ["top.zip!/a.pdf"]);
}

#[test]
fn corrupt_leaf_inside_nested_container_is_isolated() {
    let inner = corrupt(zip_of(&[("x.pdf", b"damaged payload"), ("y.pdf", b"y")]), b"damaged");
    let data = zip_of(&[("inner.zip", &inner), ("z.pdf", b"z")]);
    let (sink, _) = walk(data, ExtractionLimits::default());
    assert_eq!(sink.paths(), ["top.zip!/inner.zip!/y.pdf", "top.zip!/z.pdf"]);
    assert_eq!(sink.skipped, ["top.zip!/inner.zip!/x.pdf"]);
}

#[test]
fn top_level_that_is_not_a_zip_fails() {
    let limits = ExtractionLimits::default();
    let budget = BudgetTracker::new(&limits);
    let mut sink = Collect::default();
    let result = Walker::new(limits, &budget).walk_root(
        Bytes::from_static(b"%PDF-1.5 definitely not a zip"),
        &ArchivePath::root("top.zip"),
        &mut sink,
    );
    assert!(matches!(result, Err(Error::UnsupportedFormat)));
}

#[test]
fn count_mode_skips_payloads() {
    let inner = zip_of(&[("n.pdf", b"n")]);
    let data = zip_of(&[("inner.zip", &inner), ("a.pdf", b"a")]);
    let limits = ExtractionLimits::default();
    let budget = BudgetTracker::new(&limits);
    let mut sink = Collect::default();
    Walker::new(limits, &budget)
        .mode(WalkMode::Count)
        .walk_root(Bytes::from(data), &ArchivePath::root("top.zip"), &mut sink)
        .unwrap();

    assert_eq!(sink.paths(), ["top.zip!/a.pdf", "top.zip!/inner.zip!/n.pdf"]);
    assert!(sink.leaves.iter().all(|l| l.payload.is_none()));
}

#[test]
fn sink_break_stops_the_walk() {
    let data = zip_of(&[("a.pdf", b"a"), ("b.pdf", b"b")]);
    let limits = ExtractionLimits::default();
    let budget = BudgetTracker::new(&limits);
    let mut seen = Vec::new();
    let mut sink = |leaf: Leaf| {
        seen.push(leaf.path.to_string());
        ControlFlow::Break(())
    };
    let flow = Walker::new(limits, &budget)
        .walk_root(Bytes::from(data), &ArchivePath::root("top.zip"), &mut sink)
        .unwrap();

    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(seen, ["top.zip!/a.pdf"]);
}
