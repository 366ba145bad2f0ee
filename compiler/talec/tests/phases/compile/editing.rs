//! Compiling while documents change.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tale_syntax::ContentChange;
use talec::{CompileQueue, Debouncer};

use crate::common::{assert_same_output, insert, replace, workspace};

const STORY: &str = "\
// Opening notes
== start ==
Hello. [[hero]]
* Go -> next
== next ==
Bye.
";

#[test]
fn editing_a_comment_keeps_the_story() {
    let mut ws = workspace(&[("main.tale", STORY)], &["hero.png"]);
    let before = ws.compile("main.tale");
    assert!(ws.update_document("main.tale", 2, &[replace((0, 3), (0, 16), "Revised notes")]));
    let after = ws.compile("main.tale");

    assert!(!Arc::ptr_eq(&before, &after));
    // Block ids survive too: no compiled block changed.
    assert_eq!(before.compiled, after.compiled);
    assert_eq!(before.path_locations, after.path_locations);
    assert_eq!(after.version, 2);
}

#[test]
fn unchanged_workspace_reuses_the_program() {
    let mut ws = workspace(&[("main.tale", STORY)], &[]);
    let first = ws.compile("main.tale");
    let second = ws.compile("main.tale");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn replacing_with_the_same_text_is_idempotent() {
    let mut ws = workspace(&[("main.tale", STORY)], &["hero.png"]);
    let before = ws.compile("main.tale");
    assert!(ws.update_document("main.tale", 2, &[ContentChange::full(STORY)]));
    let after = ws.compile("main.tale");
    assert_eq!(before.compiled, after.compiled);
    assert_same_output(&before, &after);
}

#[test]
fn incremental_edits_match_a_fresh_compile() {
    let mut edited = workspace(&[("main.tale", STORY)], &[]);
    edited.compile("main.tale");
    let edits = [
        insert((2, 6), " Welcome"),
        insert((4, 0), "~ gold += 1\n"),
        replace((6, 0), (6, 3), "Farewell"),
        insert((0, 0), "VAR gold = 0\n"),
    ];
    for (version, edit) in (2..).zip(edits) {
        assert!(edited.update_document("main.tale", version, &[edit]));
        edited.compile("main.tale");
    }
    let incremental = edited.compile("main.tale");

    let Some(text) = edited.documents().document("main.tale").map(|d| d.text().to_string()) else {
        panic!("document is open");
    };
    assert_eq!(
        text,
        "VAR gold = 0\n// Opening notes\n== start ==\nHello. Welcome [[hero]]\n* Go -> next\n~ gold += 1\n== next ==\nFarewell.\n"
    );
    let mut fresh = workspace(&[("main.tale", &text)], &[]);
    let full = fresh.compile("main.tale");
    assert_same_output(&incremental, &full);
}

#[test]
fn queued_requests_share_one_compile() {
    let mut ws = workspace(&[("main.tale", STORY), ("other.tale", "Hi\n")], &[]);
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(50));
    debouncer.push("main.tale", start);
    debouncer.push("other.tale", start + Duration::from_millis(10));
    debouncer.push("main.tale", start + Duration::from_millis(20));
    assert!(debouncer.poll(start + Duration::from_millis(30)).is_empty());

    let mut queue = CompileQueue::new();
    let mut tickets = Vec::new();
    for uri in debouncer.poll(start + Duration::from_millis(80)) {
        tickets.push(queue.request(uri));
    }
    let extra = queue.request("main.tale");
    let answered = queue.run(&mut ws);
    assert_eq!(answered.len(), 3);

    let main: Vec<_> = answered
        .iter()
        .filter(|(_, program)| program.uri == "main.tale")
        .collect();
    assert_eq!(main.len(), 2);
    assert!(Arc::ptr_eq(&main[0].1, &main[1].1));
    assert!(main.iter().any(|(ticket, _)| *ticket == extra));
    assert!(tickets.iter().all(|ticket| answered.iter().any(|(t, _)| t == ticket)));
}
