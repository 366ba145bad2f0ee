use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tale_block::BlockOutput;
use tale_ir::Span;
use tale_syntax::{ContentChange, SyntaxTree};
use uuid::Uuid;

use super::*;
use crate::{Annotation, Declaration, FormatMarker, ImplicitMarker, Reference};

const URI: &str = "file:///story/main.tale";

const SAMPLE: &str = "\
== start ==
Hello [[hero~blur]] there.
= inner
* (pick) {gold > 1} Take it [quietly] -> shop
- (meet) You meet ((theme)).
~ gold += 2
VAR gold = 3
define character.ann:
  portrait = image.ann
  \tfont = font[family=\"Roboto\"]
// trailing comment
-> start.inner
";

/// Annotation state with block uuids left out.
#[derive(Debug, PartialEq)]
struct Snapshot {
    declarations: Vec<Annotation<Declaration>>,
    references: Vec<Annotation<Reference>>,
    implicits: Vec<Annotation<ImplicitMarker>>,
    blocks: Vec<(u32, u32, BlockOutput)>,
    formatting: Vec<Annotation<FormatMarker>>,
}

fn snapshot(annotations: &Annotations) -> Snapshot {
    Snapshot {
        declarations: annotations.declarations().iter().cloned().collect(),
        references: annotations.references().iter().cloned().collect(),
        implicits: annotations.implicits().iter().cloned().collect(),
        blocks: annotations
            .compilation()
            .iter()
            .map(|a| (a.from, a.to, a.value.output.clone()))
            .collect(),
        formatting: annotations.formatting().iter().cloned().collect(),
    }
}

fn full_snapshot(text: &str) -> Snapshot {
    let tree = SyntaxTree::parse(text);
    let mut annotations = Annotations::new(AnnotatorSet::EDITOR);
    annotations.create(&AnnotateCx::full(text, &tree));
    snapshot(&annotations)
}

fn opened(text: &str) -> DocumentManager {
    let mut manager = DocumentManager::new(AnnotatorSet::EDITOR);
    manager.open(URI, 1, text);
    manager
}

/// Replace bytes `[start, end)` of the open document.
fn edit(manager: &mut DocumentManager, version: i32, start: u32, end: u32, text: &str) -> bool {
    let Some(document) = manager.document(URI) else {
        panic!("document not open");
    };
    let range = document.range_of(Span::new(start, end));
    manager.update(URI, version, &[ContentChange::replace(range, text)])
}

fn current_text(manager: &DocumentManager) -> String {
    manager
        .document(URI)
        .map(|d| d.text().to_string())
        .unwrap_or_default()
}

fn current_snapshot(manager: &DocumentManager) -> Snapshot {
    let Some(annotations) = manager.annotations(URI) else {
        panic!("document not open");
    };
    snapshot(annotations)
}

fn uuids(manager: &DocumentManager) -> Vec<Uuid> {
    manager
        .annotations(URI)
        .map(|a| a.compilation().iter().map(|b| b.value.uuid).collect())
        .unwrap_or_default()
}

fn offset_of(text: &str, needle: &str) -> u32 {
    text.find(needle)
        .and_then(|i| u32::try_from(i).ok())
        .unwrap_or_else(|| panic!("{needle:?} not in text"))
}

#[test]
fn test_open_runs_a_full_pass() {
    let manager = opened(SAMPLE);
    assert_eq!(current_snapshot(&manager), full_snapshot(SAMPLE));
    assert_eq!(manager.tree(URI), Some(&SyntaxTree::parse(SAMPLE)));
}

#[test]
fn test_stale_and_unknown_updates_are_ignored() {
    let mut manager = opened("Hello\n");
    assert!(!manager.update(URI, 1, &[ContentChange::full("Bye\n")]));
    assert!(!manager.update(URI, 0, &[ContentChange::full("Bye\n")]));
    assert!(!manager.update("file:///other.tale", 5, &[ContentChange::full("Bye\n")]));
    assert_eq!(current_text(&manager), "Hello\n");

    assert!(manager.update(URI, 2, &[ContentChange::full("Bye\n")]));
    assert_eq!(current_text(&manager), "Bye\n");
    assert_eq!(manager.document(URI).map(TextDocument::version), Some(2));
}

#[test]
fn test_changes_apply_in_order() {
    let mut manager = opened("one\ntwo\n");
    let Some(document) = manager.document(URI) else {
        panic!("document not open");
    };
    let first = document.range_of(Span::new(0, 3));
    // The second range refers to the text after the first change.
    let second = tale_ir::Range::on_line(1, 0, 3);
    let changed = manager.update(
        URI,
        2,
        &[
            ContentChange::replace(first, "== start =="),
            ContentChange::replace(second, "-> start"),
        ],
    );
    assert!(changed);
    let text = current_text(&manager);
    assert_eq!(text, "== start ==\n-> start\n");
    assert_eq!(current_snapshot(&manager), full_snapshot(&text));
}

#[test]
fn test_typing_into_a_flow_matches_full_pass() {
    let mut manager = opened(SAMPLE);
    let at = offset_of(SAMPLE, "= inner") + 2;
    assert!(edit(&mut manager, 2, at, at + 5, "outer"));
    let text = current_text(&manager);
    assert!(text.contains("= outer"));
    assert_eq!(current_snapshot(&manager), full_snapshot(&text));
}

#[test]
fn test_growing_a_define_body_matches_full_pass() {
    let mut manager = opened(SAMPLE);
    let at = offset_of(SAMPLE, "// trailing");
    assert!(edit(&mut manager, 2, at, at, "  title = \"Ann\"\n"));
    let text = current_text(&manager);
    assert_eq!(current_snapshot(&manager), full_snapshot(&text));
}

#[test]
fn test_deleting_everything() {
    let mut manager = opened(SAMPLE);
    let len = u32::try_from(SAMPLE.len()).unwrap_or(u32::MAX);
    assert!(edit(&mut manager, 2, 0, len, ""));
    assert_eq!(current_snapshot(&manager), full_snapshot(""));
    assert!(uuids(&manager).is_empty());
}

#[test]
fn test_uuids_survive_unrelated_edits() {
    let mut manager = opened("Hello\n== start ==\nText here\n-> start\n");
    let before = uuids(&manager);
    assert_eq!(before.len(), 4);

    // Retype the text line; the blocks around it only move.
    assert!(edit(&mut manager, 2, 18, 22, "Prose"));
    let after = uuids(&manager);
    assert_eq!(after.len(), 4);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    assert_ne!(after[2], before[2]);
    assert_eq!(after[3], before[3]);
}

#[test]
fn test_uuid_kept_when_output_is_unchanged() {
    let mut manager = opened("Hello\n-> start\n");
    let before = uuids(&manager);
    // Retyping the same target reparses the unit but lowers identically.
    assert!(edit(&mut manager, 2, 9, 14, "start"));
    assert_eq!(uuids(&manager), before);
}

#[test]
fn test_inserted_line_shifts_later_blocks() {
    let mut manager = opened("Hello\n-> start\n");
    let before = uuids(&manager);
    assert!(edit(&mut manager, 2, 0, 0, "New line\n"));
    let after = uuids(&manager);
    assert_eq!(after.len(), 3);
    assert_eq!(&after[1..], before.as_slice());
    let starts: Vec<u32> = manager
        .annotations(URI)
        .map(|a| a.compilation().iter().map(|b| b.from).collect())
        .unwrap_or_default();
    assert_eq!(starts, vec![0, 9, 15]);
}

#[test]
fn test_editing_a_comment_keeps_compiled_blocks() {
    let text = "== start ==\nHello [[hero]]\n// a note\n-> start\n";
    let mut manager = opened(text);
    let before = uuids(&manager);
    let blocks_before = current_snapshot(&manager).blocks;

    let at = offset_of(text, "a note");
    assert!(edit(&mut manager, 2, at, at + 6, "a longer note"));
    assert_eq!(uuids(&manager), before);

    let blocks_after = current_snapshot(&manager).blocks;
    let outputs = |blocks: &[(u32, u32, BlockOutput)]| {
        blocks.iter().map(|(_, _, o)| o.clone()).collect::<Vec<_>>()
    };
    assert_eq!(outputs(&blocks_after), outputs(&blocks_before));
}

#[test]
fn test_block_inside_replaced_range_keeps_uuid() {
    let mut manager = opened("Intro\nAlpha\nBeta\nOutro\n");
    let before = uuids(&manager);
    assert_eq!(before.len(), 4);

    // The replaced range starts mid-line and swallows "Alpha" whole.
    assert!(edit(&mut manager, 2, 3, 16, "ra\nAlpha\nGamma"));
    assert_eq!(current_text(&manager), "Intra\nAlpha\nGamma\nOutro\n");
    let after = uuids(&manager);
    assert_eq!(after.len(), 4);
    assert_ne!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    assert_ne!(after[2], before[2]);
    assert_eq!(after[3], before[3]);
}

#[test]
fn test_repeated_lines_keep_distinct_uuids_on_resync() {
    let text = "-> END\n-> END\n-> END\n";
    let mut manager = opened(text);
    let before = uuids(&manager);
    assert!(manager.update(URI, 2, &[ContentChange::full(text)]));
    let after = uuids(&manager);
    assert_eq!(after, before);
    assert_ne!(after[0], after[1]);
    assert_ne!(after[1], after[2]);
}

#[test]
fn test_same_text_again_is_idempotent() {
    let mut manager = opened(SAMPLE);
    let before = current_snapshot(&manager);
    let ids = uuids(&manager);
    assert!(manager.update(URI, 2, &[ContentChange::full(SAMPLE)]));
    assert_eq!(current_snapshot(&manager), before);
    assert_eq!(uuids(&manager), ids);
}

#[test]
fn test_close() {
    let mut manager = opened("Hello\n");
    assert!(manager.contains(URI));
    assert!(manager.close(URI));
    assert!(!manager.close(URI));
    assert!(manager.annotations(URI).is_none());
}

#[test]
fn test_region_starts_at_the_unit_containing_the_change() {
    let old = SyntaxTree::parse("aaa\nbbb\nccc\n");
    let change = TextChange::new(5, 6, 1);
    let fragments = TreeFragment::apply_change(&TreeFragment::from_tree(&old), &change);
    let parse = SyntaxTree::parse_with("aaa\nbXb\nccc\n", &fragments);
    let region = safety_region(&change, &parse, Some(4), 12);
    assert_eq!(region, Span::new(4, 12));
}

const SNIPPETS: &[&str] = &[
    "",
    "\n",
    " ",
    "\t",
    "x",
    "== knot ==\n",
    "= stitch\n",
    "[[hero~blur]]",
    "((theme))",
    "-> start",
    "* (c) go\n",
    "~ gold += 1\n",
    "define image.hero:\n",
    "  src = \"a.png\"\n",
    "  size = image.ann\n",
    "// note\n",
    "{gold}",
];

fn edit_strategy() -> impl Strategy<Value = (usize, usize, &'static str)> {
    (0usize..400, 0usize..12, prop::sample::select(SNIPPETS))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn incremental_matches_full(edits in prop::collection::vec(edit_strategy(), 1..6)) {
        let mut manager = opened(SAMPLE);
        for (version, (pos, delete, insert)) in (2..).zip(edits) {
            let len = current_text(&manager).len();
            let start = pos.min(len);
            let end = (start + delete).min(len);
            let start = u32::try_from(start).unwrap_or(u32::MAX);
            let end = u32::try_from(end).unwrap_or(u32::MAX);
            prop_assert!(edit(&mut manager, version, start, end, insert));
            let text = current_text(&manager);
            prop_assert_eq!(current_snapshot(&manager), full_snapshot(&text));
        }
    }
}
