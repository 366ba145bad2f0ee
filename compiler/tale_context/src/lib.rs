//! Context graph for the Tale toolchain.
//!
//! The context is a two-level map `type -> name -> struct` assembled from
//! builtin definitions, document `define` blocks, asset files and implicit
//! entries. Selectors resolve against it, either through the flattened
//! [`PropertyRegistry`] or by searching the graph directly.

mod builder;
mod builtins;
mod chain;
mod expected;
mod font;
mod graph;
mod json;
mod registry;
mod selector;

pub use builder::{Context, ContextBuilder};
pub use builtins::{Builtins, BuiltinsError, SchemaEntry};
pub use chain::{walk_filtered_image, ChainResult, FILTERED_IMAGE, IMAGE};
pub use expected::{expected_for, Expected, ExpectedSource};
pub use font::{infer_font, FontFace};
pub use graph::{ContextGraph, TypeBucket};
pub use json::{get_path, merge_into, JsonKind, META_PREFIX, NAME_KEY, TYPE_KEY};
pub use registry::{struct_key, PropertyRegistry};
pub use selector::{resolve_selector, Resolved};
