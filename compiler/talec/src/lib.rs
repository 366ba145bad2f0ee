//! The Tale compiler.
//!
//! Scripts are held open in a [`Workspace`], which parses and annotates them
//! incrementally as they are edited. Compiling a root script stitches it and
//! everything it includes into one runtime story, builds the struct context
//! from `define` blocks, asset files and builtins, and validates every
//! reference against that context. The result is a [`Program`].
//!
//! ```text
//! Workspace ── add/update documents, files ──► DocumentManager (tale_annotate)
//!     │
//!     └── compile(uri) ──► Compiler ──► Arc<Program>
//! ```

pub mod commands;
pub mod compiler;
pub mod config;
pub mod files;
pub mod logging;
pub mod program;
pub mod resolve;
pub mod schedule;
pub mod workspace;

pub use compiler::Compiler;
pub use config::{CompilerConfig, ConfigError};
pub use files::{FileInfo, FileRegistry};
pub use logging::init_tracing;
pub use program::Program;
pub use resolve::{resolve_file, ResolveError};
pub use schedule::{CompileQueue, Debouncer, Ticket};
pub use workspace::Workspace;
