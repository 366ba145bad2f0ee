//! Cross-file compilation of a root script into a [`Program`].
//!
//! # Phases
//!
//! ```text
//! parse_incrementally(root)      CompiledBlock annotations, includes followed
//!     │
//!     ▼
//! stitch ──► export              runtime JSON + path locations
//!     │
//!     ▼
//! normalize                      column-0 ends pulled back
//!     │
//!     ▼
//! populate ──► build context     files, implicit structs, defaults
//!     │
//!     ▼
//! validate                       selectors, literals, diverts, cycles
//!     │
//!     ▼
//! sort                           location maps by (script, line, column)
//! ```
//!
//! Nothing here lowers source text: every block was already lowered by the
//! compilation annotator, so a compile only walks annotations.

mod export;
mod locations;
mod populate;
mod stitch;
mod validate;

use indexmap::IndexMap;
use tale_annotate::{DocumentManager, DocumentState};
use tale_context::{Builtins, Context, ContextBuilder};
use tale_diagnostic::DiagnosticSink;
use tale_ir::SourceLocation;
use tracing::{debug, warn};

use self::stitch::{Located, ScriptScope, Stitcher};
use self::validate::Validator;
use crate::config::CompilerConfig;
use crate::files::FileRegistry;
use crate::program::Program;
use crate::resolve::resolve_file;

/// Everything a compile reads. Borrowed from the workspace for one call.
pub struct Compiler<'a> {
    pub documents: &'a DocumentManager,
    pub files: &'a FileRegistry,
    pub builtins: &'a Builtins,
    pub config: &'a CompilerConfig,
}

/// Running state of one compile.
struct CompileState<'b> {
    scripts: IndexMap<String, i32>,
    sink: DiagnosticSink,
    stitcher: Stitcher,
    builder: ContextBuilder<'b>,
}

impl<'a> Compiler<'a> {
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compile(&self, uri: &str) -> Program {
        let Some(root) = self.documents.get(uri) else {
            warn!("compile requested for a document that is not open");
            return Program {
                uri: uri.to_string(),
                ..Program::default()
            };
        };

        let mut state = CompileState {
            scripts: IndexMap::new(),
            sink: DiagnosticSink::new(),
            stitcher: Stitcher::new(),
            builder: ContextBuilder::new(self.builtins),
        };
        state.scripts.insert(uri.to_string(), root.document.version());
        self.parse_incrementally(&mut state, uri, false);

        let mut exported = export::export(&state.stitcher);
        let line_length = |script: u32, line: u32| self.line_length(&state.scripts, script, line);
        locations::normalize(&mut exported.path_locations, line_length);
        locations::normalize(&mut exported.declaration_locations, line_length);

        let scripts: Vec<(&str, &DocumentState)> = state
            .scripts
            .keys()
            .filter_map(|uri| Some((uri.as_str(), self.documents.get(uri)?)))
            .collect();
        populate::populate_files(&mut state.builder, self.files);
        populate::populate_implicits(
            &mut state.builder,
            scripts
                .iter()
                .flat_map(|(_, script)| script.annotations.implicits().iter())
                .map(|annotation| &annotation.value),
        );
        let context: Context = state.builder.build();

        let validator = Validator::new(
            self.builtins,
            self.config,
            &context,
            scripts.iter().map(|(_, script)| *script),
        );
        for (script_uri, script) in &scripts {
            validator.script(script_uri, script, &mut state.sink);
        }
        validator.cycles(uri, scripts.iter().copied(), &mut state.sink);

        locations::sort(&mut exported.path_locations);
        locations::sort(&mut exported.declaration_locations);

        let diagnostics = state.sink.finish();
        debug!(
            scripts = state.scripts.len(),
            paths = exported.path_locations.len(),
            diagnostics = diagnostics.values().map(Vec::len).sum::<usize>(),
            "compiled"
        );
        Program {
            uri: uri.to_string(),
            version: root.document.version(),
            scripts: state.scripts,
            files: self.files.iter().cloned().collect(),
            context: context.graph,
            compiled: exported.story,
            diagnostics,
            path_locations: exported.path_locations,
            declaration_locations: exported.declaration_locations,
        }
    }

    /// Walk the compiled blocks of `uri` in source order, following
    /// includes depth-first.
    fn parse_incrementally(&self, state: &mut CompileState<'_>, uri: &str, is_include: bool) {
        let Some(document) = self.documents.get(uri) else {
            return;
        };
        let Some(script_index) = state
            .scripts
            .get_index_of(uri)
            .and_then(|index| u32::try_from(index).ok())
        else {
            return;
        };
        state.sink.touch(uri);
        let mut scope = ScriptScope::default();

        for block in document.annotations.compilation() {
            let line = document.document.lines().line_of(block.from);
            let output = &block.value.output;

            for diagnostic in &output.diagnostics {
                if diagnostic.suppressed {
                    debug!(%diagnostic, "suppressed diagnostic dropped");
                    continue;
                }
                state.sink.push(uri, diagnostic.clone().offset_lines(line));
            }

            if let Some(path) = &output.include {
                self.include(state, uri, path);
            }

            for node in &output.content {
                let located = Located {
                    node: node.clone(),
                    location: SourceLocation::new(script_index, node.range().offset_lines(line)),
                    id: block.value.uuid.to_string(),
                };
                state.stitcher.push(&mut scope, located);
            }

            for definition in &output.defaults {
                state.builder.add_default(&definition.type_name, &definition.value);
            }
            for definition in &output.definitions {
                state
                    .builder
                    .define(&definition.type_name, &definition.name, definition.value.clone());
            }
        }
        state.stitcher.finish(scope, is_include);
    }

    fn include(&self, state: &mut CompileState<'_>, from: &str, path: &str) {
        let resolved = resolve_file(from, path, &self.config.extensions, |candidate| {
            self.documents.contains(candidate)
        });
        match resolved {
            Ok(target) => {
                if state.scripts.contains_key(&target) {
                    debug!(%target, "include already visited");
                    return;
                }
                let version = self
                    .documents
                    .document(&target)
                    .map_or(0, tale_syntax::TextDocument::version);
                state.scripts.insert(target.clone(), version);
                self.parse_incrementally(state, &target, true);
            }
            Err(err) => warn!(%err, from, "include not resolved"),
        }
    }

    /// Length in characters of `line` of the script at `script`.
    fn line_length(&self, scripts: &IndexMap<String, i32>, script: u32, line: u32) -> Option<u32> {
        let (uri, _) = scripts.get_index(script as usize)?;
        let document = self.documents.document(uri)?;
        let lines = document.lines();
        lines.line_start(line)?;
        let end = lines.line_end(document.text(), line);
        Some(lines.position_at(document.text(), end).character)
    }
}
