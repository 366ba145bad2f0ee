//! The built-in annotators.

mod compilation;
mod declarations;
mod formatting;
mod implicits;
mod references;

pub use compilation::{is_compiled_unit, Compilation, CompiledBlock};
pub use declarations::{Declaration, Declarations};
pub use formatting::{FormatKind, FormatMarker, Formatting};
pub use implicits::{ImplicitMarker, Implicits, FILTERED_IMAGE};
pub use references::{Assignment, Reference, ReferenceKind, References};
