//! The host-facing workspace: open documents, asset files, configuration
//! and the last compiled [`Program`] per root.
//!
//! Everything is synchronous. A compile borrows the workspace state for the
//! duration of one call and the result is shared as an `Arc<Program>`, so
//! hosts can hold on to a program while the workspace keeps changing.
//!
//! # Memoization
//!
//! A root's program is reused when nothing it was built from changed:
//!
//! - the workspace generation (bumped by configuration, file and document
//!   set changes) matches the one recorded with the program;
//! - every script the program read is still open at the version it read.
//!
//! Document versions must increase. An update carrying a stale or equal
//! version is rejected and changes nothing; an accepted edit also drops
//! every program that read the edited document.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tale_annotate::{AnnotatorSet, DocumentManager};
use tale_block::{EvalContext, EvalError, Value};
use tale_context::Builtins;
use tale_syntax::ContentChange;
use tracing::debug;

use crate::compiler::Compiler;
use crate::config::{CompilerConfig, ConfigError};
use crate::files::{FileInfo, FileRegistry};
use crate::program::Program;
use crate::resolve::{resolve_file, ResolveError};

struct Memo {
    generation: u64,
    program: Arc<Program>,
}

impl Memo {
    fn is_current(&self, generation: u64, documents: &DocumentManager) -> bool {
        self.generation == generation
            && self.program.scripts.iter().all(|(uri, version)| {
                documents
                    .document(uri)
                    .is_some_and(|document| document.version() == *version)
            })
    }
}

pub struct Workspace {
    documents: DocumentManager,
    files: FileRegistry,
    config: CompilerConfig,
    builtins: Arc<Builtins>,
    generation: u64,
    memo: FxHashMap<String, Memo>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace running only the annotators compilation needs.
    pub fn new() -> Self {
        Self::with_annotators(AnnotatorSet::COMPILE)
    }

    /// A workspace that also runs `annotators`. The compile annotators are
    /// always active.
    pub fn with_annotators(annotators: AnnotatorSet) -> Self {
        Workspace {
            documents: DocumentManager::new(annotators | AnnotatorSet::COMPILE),
            files: FileRegistry::new(),
            config: CompilerConfig::default(),
            builtins: Arc::new(Builtins::embedded_or_empty()),
            generation: 0,
            memo: FxHashMap::default(),
        }
    }

    /// Replace the configuration. The builtins are rebuilt first; on error
    /// the previous configuration stays in effect.
    pub fn configure(&mut self, config: CompilerConfig) -> Result<(), ConfigError> {
        let builtins = config.load_builtins()?;
        self.builtins = Arc::new(builtins);
        self.config = config;
        self.invalidate("configuration changed");
        Ok(())
    }

    pub fn add_file(&mut self, file: FileInfo) -> bool {
        let added = self.files.add(file);
        if added {
            self.invalidate("file added");
        }
        added
    }

    pub fn update_file(&mut self, file: FileInfo) -> bool {
        let updated = self.files.update(file);
        if updated {
            self.invalidate("file updated");
        }
        updated
    }

    pub fn remove_file(&mut self, uri: &str) -> bool {
        let removed = self.files.remove(uri);
        if removed {
            self.invalidate("file removed");
        }
        removed
    }

    /// Open a document. Returns `false`, changing nothing, when `uri` is
    /// already open.
    pub fn add_document(&mut self, uri: &str, version: i32, text: &str) -> bool {
        if self.documents.contains(uri) {
            return false;
        }
        self.documents.open(uri, version, text);
        self.invalidate("document added");
        true
    }

    /// Apply `changes` to an open document. Returns `false`, changing
    /// nothing, for an unknown uri or a version that is not newer.
    #[tracing::instrument(level = "debug", skip(self, changes), fields(changes = changes.len()))]
    pub fn update_document(&mut self, uri: &str, version: i32, changes: &[ContentChange]) -> bool {
        let updated = self.documents.update(uri, version, changes);
        if updated {
            self.memo
                .retain(|_, memo| !memo.program.scripts.contains_key(uri));
        }
        updated
    }

    pub fn remove_document(&mut self, uri: &str) -> bool {
        let removed = self.documents.close(uri);
        if removed {
            self.invalidate("document removed");
        }
        removed
    }

    /// Compile the script at `uri` together with everything it includes.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compile(&mut self, uri: &str) -> Arc<Program> {
        if let Some(memo) = self.memo.get(uri) {
            if memo.is_current(self.generation, &self.documents) {
                debug!("reusing compiled program");
                return Arc::clone(&memo.program);
            }
        }
        let compiler = Compiler {
            documents: &self.documents,
            files: &self.files,
            builtins: &self.builtins,
            config: &self.config,
        };
        let program = Arc::new(compiler.compile(uri));
        self.memo.insert(
            uri.to_string(),
            Memo {
                generation: self.generation,
                program: Arc::clone(&program),
            },
        );
        program
    }

    /// Evaluate a standalone expression.
    pub fn evaluate(&self, expression: &str, context: &dyn EvalContext) -> Result<Value, EvalError> {
        tale_block::evaluate(expression, context)
    }

    /// Resolve `relative` against `root_uri` among the open documents.
    pub fn resolve_file(&self, root_uri: &str, relative: &str) -> Result<String, ResolveError> {
        resolve_file(root_uri, relative, &self.config.extensions, |candidate| {
            self.documents.contains(candidate)
        })
    }

    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Arc<Builtins> {
        &self.builtins
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate(&mut self, reason: &'static str) {
        self.generation += 1;
        self.memo.clear();
        debug!(generation = self.generation, reason, "workspace invalidated");
    }
}

#[cfg(test)]
mod tests;
