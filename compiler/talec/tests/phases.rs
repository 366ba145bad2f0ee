// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Phase-based compiler tests.
//!
//! These drive a [`talec::Workspace`] the way an editor host does: open
//! documents, register asset files, edit, compile, and check the program
//! that comes back.
//!
//! # Organization
//!
//! - `compile/` - cross-file compilation, context building, validation and
//!   location maps, before and after edits
//! - `common/` - shared setup and helpers
//!
//! # Running Phase Tests
//!
//! ```bash
//! cargo test -p talec --test phases
//! cargo test -p talec --test phases compile::editing
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/compile/mod.rs"]
mod compile;
