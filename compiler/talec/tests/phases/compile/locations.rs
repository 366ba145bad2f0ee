//! Path and declaration location maps.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use talec::Program;

use crate::common::{insert, workspace};

const STORY: &str = "\
VAR gold = 3
== start ==
Hello there.
* (buy) {gold > 1} Buy it
~ gold -= 1
-> shop
* Leave
- (after) Later.
-> END
== shop ==
= counter
Welcome.
-> DONE
";

fn starts(program: &Program) -> Vec<(u32, u32, u32)> {
    program
        .path_locations
        .values()
        .map(|l| (l.script_index, l.start_line, l.start_col))
        .collect()
}

#[test]
fn locations_are_sorted_by_script_and_position() {
    let mut ws = workspace(&[("main.tale", STORY)], &[]);
    let program = ws.compile("main.tale");
    let starts = starts(&program);
    assert!(!starts.is_empty());
    assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));

    let declared: Vec<&str> = program
        .declaration_locations
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(declared, vec!["start", "start.buy", "start.after", "shop", "shop.counter"]);
}

#[test]
fn containers_cover_their_children() {
    let mut ws = workspace(&[("main.tale", STORY)], &[]);
    let program = ws.compile("main.tale");
    let Some(start) = program.path_locations.get("start") else {
        panic!("knot has a location");
    };
    for (path, location) in &program.path_locations {
        if let Some(rest) = path.strip_prefix("start.") {
            assert!(!rest.is_empty());
            assert!(location.start_line >= start.start_line, "{path}");
            assert!(location.end_line <= start.end_line, "{path}");
        }
    }
}

#[test]
fn no_range_ends_at_column_zero_of_a_later_line() {
    let mut ws = workspace(&[("main.tale", STORY)], &[]);
    let program = ws.compile("main.tale");
    for (path, location) in program
        .path_locations
        .iter()
        .chain(program.declaration_locations.iter())
    {
        assert!(
            !(location.end_col == 0 && location.end_line > location.start_line),
            "{path} ends at column 0"
        );
    }
}

#[test]
fn inserting_lines_shifts_every_later_location() {
    let mut ws = workspace(&[("main.tale", STORY)], &[]);
    let before = ws.compile("main.tale");
    assert!(ws.update_document("main.tale", 2, &[insert((0, 0), "// a\n// b\n")]));
    let after = ws.compile("main.tale");

    let keys_before: Vec<&String> = before.path_locations.keys().collect();
    let keys_after: Vec<&String> = after.path_locations.keys().collect();
    assert_eq!(keys_before, keys_after);
    for (path, old) in &before.path_locations {
        let new = after.path_locations[path];
        assert_eq!(new.start_line, old.start_line + 2, "{path}");
        assert_eq!(new.end_line, old.end_line + 2, "{path}");
        assert_eq!((new.start_col, new.end_col), (old.start_col, old.end_col), "{path}");
    }
}

#[test]
fn locate_finds_the_script() {
    let mut ws = workspace(
        &[("main.tale", "INCLUDE shop\n-> shop\n"), ("shop.tale", "== shop ==\nHi\n")],
        &[],
    );
    let program = ws.compile("main.tale");
    let Some((uri, location)) = program.locate("shop") else {
        panic!("shop is located");
    };
    assert_eq!(uri, "shop.tale");
    assert_eq!(location.start_line, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prepended_comments_shift_locations(count in 0u32..6) {
        let mut ws = workspace(&[("main.tale", STORY)], &[]);
        let before = ws.compile("main.tale");
        let comments = "// note\n".repeat(count as usize);
        prop_assert!(ws.update_document("main.tale", 2, &[insert((0, 0), &comments)]));
        let after = ws.compile("main.tale");
        for (path, old) in &before.declaration_locations {
            let new = after.declaration_locations.get(path).copied();
            prop_assert_eq!(new.map(|l| l.start_line), Some(old.start_line + count));
        }
    }
}
