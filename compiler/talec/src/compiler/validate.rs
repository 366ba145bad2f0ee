//! Reference validation against the finished context.
//!
//! Runs after the context is built, over every script of the compile:
//!
//! - declarations may not reuse builtin type names (for reserved kinds)
//! - image, audio and property selectors must resolve, to an expected type
//! - literal property values must fit what the builtin type expects
//! - divert targets must name a flow or label
//! - `filtered_image` chains must end at an image

use rustc_hash::FxHashSet;
use serde_json::Value;
use tale_annotate::{DocumentState, Reference, ReferenceKind};
use tale_block::PropertyValue;
use tale_context::{
    expected_for, resolve_selector, walk_filtered_image, Builtins, ChainResult, Context, JsonKind,
    FILTERED_IMAGE,
};
use tale_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tale_ir::{DeclarationKind, Range, Selector, Span};
use tracing::trace;

use crate::config::CompilerConfig;

/// Divert targets the runtime provides.
const BUILTIN_TARGETS: [&str; 2] = ["END", "DONE"];

pub(crate) struct Validator<'a> {
    builtins: &'a Builtins,
    config: &'a CompilerConfig,
    context: &'a Context,
    /// Paths of every flow and label across all scripts.
    flows: FxHashSet<String>,
}

impl<'a> Validator<'a> {
    pub fn new<'s>(
        builtins: &'a Builtins,
        config: &'a CompilerConfig,
        context: &'a Context,
        scripts: impl IntoIterator<Item = &'s DocumentState>,
    ) -> Self {
        let flows = scripts
            .into_iter()
            .flat_map(|state| state.annotations.declarations().iter())
            .filter(|declaration| declaration.value.kind.is_flow())
            .map(|declaration| declaration.value.path.clone())
            .collect();
        Validator {
            builtins,
            config,
            context,
            flows,
        }
    }

    pub fn script(&self, uri: &str, state: &DocumentState, sink: &mut DiagnosticSink) {
        let range = |from: u32, to: u32| state.document.range_of(Span::new(from, to));

        for declaration in state.annotations.declarations() {
            let value = &declaration.value;
            if self.config.is_reserved(value.kind) && self.builtins.is_builtin_type(&value.name) {
                sink.push(
                    uri,
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!(
                            "'{}' is a builtin type and cannot name a {}",
                            value.name, value.kind
                        ))
                        .with_range(range(declaration.from, declaration.to)),
                );
            }
        }

        for reference in state.annotations.references() {
            let at = range(reference.from, reference.to);
            if let Some(diagnostic) = self.reference(&reference.value) {
                sink.push(uri, diagnostic.with_range(at));
            }
        }

        for block in state.annotations.compilation() {
            let line = state.document.lines().line_of(block.from);
            for definition in &block.value.output.definitions {
                for property in &definition.properties {
                    let PropertyValue::Literal(literal) = &property.value else {
                        continue;
                    };
                    if let Some(diagnostic) =
                        self.literal(&definition.type_name, &definition.name, &property.path, literal)
                    {
                        sink.push(uri, diagnostic.with_range(property.range.offset_lines(line)));
                    }
                }
            }
        }
    }

    /// Report `filtered_image` structs whose chain loops, at their
    /// definition when one of `scripts` has it.
    pub fn cycles<'s>(
        &self,
        root_uri: &str,
        scripts: impl IntoIterator<Item = (&'s str, &'s DocumentState)> + Clone,
        sink: &mut DiagnosticSink,
    ) {
        let Some(bucket) = self.context.graph.bucket(FILTERED_IMAGE) else {
            return;
        };
        for name in bucket.keys() {
            let ChainResult::Cycle { path } = walk_filtered_image(&self.context.graph, name) else {
                continue;
            };
            let diagnostic = Diagnostic::error(ErrorCode::E2006).with_message(format!(
                "Cyclic filtered_image chain: {}",
                path.join(" -> ")
            ));
            let struct_path = format!("{FILTERED_IMAGE}.{name}");
            let defined = scripts.clone().into_iter().find_map(|(uri, state)| {
                state
                    .annotations
                    .declarations()
                    .iter()
                    .find(|d| d.value.kind == DeclarationKind::Struct && d.value.path == struct_path)
                    .map(|d| (uri, state.document.range_of(d.span())))
            });
            match defined {
                Some((uri, range)) => sink.push(uri, diagnostic.with_range(range)),
                None => sink.push(root_uri, diagnostic.with_range(Range::default())),
            };
        }
    }

    fn reference(&self, reference: &Reference) -> Option<Diagnostic> {
        match reference.kind {
            ReferenceKind::Divert => self.divert(&reference.target, &reference.scope),
            ReferenceKind::Image | ReferenceKind::Audio => {
                let selector = reference.selector.as_ref()?;
                let expected: Vec<String> = reference
                    .kind
                    .expected_types()
                    .iter()
                    .map(|t| (*t).to_string())
                    .collect();
                self.asset(selector, &expected)
            }
            ReferenceKind::Property => {
                let selector = reference.selector.as_ref()?;
                let assignment = reference.assignment.as_ref()?;
                let expected = expected_for(
                    self.builtins,
                    &assignment.type_name,
                    &assignment.name,
                    &assignment.property,
                );
                let types = expected.as_ref().map(|e| e.types()).unwrap_or_default();
                let Some(resolved) =
                    resolve_selector(selector, &types, &self.context.graph, Some(&self.context.registry))
                else {
                    return Some(not_found(selector, &types));
                };
                if types.is_empty() || types.contains(&resolved.type_name) {
                    return None;
                }
                let describe = expected.map(|e| e.describe()).unwrap_or_default();
                Some(Diagnostic::warning(ErrorCode::E2002).with_message(format!(
                    "Expected {describe} for '{}.{}.{}' but '{}' is a {}",
                    assignment.type_name,
                    assignment.name,
                    assignment.property,
                    resolved.name.as_deref().unwrap_or(&resolved.path),
                    resolved.type_name
                )))
            }
        }
    }

    fn asset(&self, selector: &Selector, expected: &[String]) -> Option<Diagnostic> {
        let Some(resolved) =
            resolve_selector(selector, expected, &self.context.graph, Some(&self.context.registry))
        else {
            return Some(not_found(selector, expected));
        };
        trace!(path = %resolved.path, "asset reference resolved");
        if resolved.type_name != FILTERED_IMAGE {
            return None;
        }
        let name = resolved.name.as_deref()?;
        match walk_filtered_image(&self.context.graph, name) {
            ChainResult::Missing { name } => Some(
                Diagnostic::warning(ErrorCode::E2001)
                    .with_message(format!("Cannot find image named '{name}'")),
            ),
            ChainResult::Image { .. } | ChainResult::Cycle { .. } => None,
        }
    }

    fn literal(&self, type_name: &str, name: &str, path: &str, literal: &Value) -> Option<Diagnostic> {
        let expected = expected_for(self.builtins, type_name, name, path)?;
        if expected.accepts_literal(literal) {
            return None;
        }
        Some(Diagnostic::warning(ErrorCode::E2003).with_message(format!(
            "Expected {} for '{type_name}.{name}.{path}' but found {}",
            expected.describe(),
            JsonKind::of(literal)
        )))
    }

    fn divert(&self, target: &str, scope: &str) -> Option<Diagnostic> {
        let target = target.split('(').next().unwrap_or(target).trim();
        if target.is_empty() || BUILTIN_TARGETS.contains(&target) {
            return None;
        }
        // Relative targets resolve from the innermost scope outwards.
        let mut prefix = scope;
        loop {
            let candidate = if prefix.is_empty() {
                target.to_string()
            } else {
                format!("{prefix}.{target}")
            };
            if self.flows.contains(&candidate) {
                return None;
            }
            if prefix.is_empty() {
                break;
            }
            prefix = prefix.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
        Some(
            Diagnostic::error(ErrorCode::E2005)
                .with_message(format!("Divert target '{target}' not found")),
        )
    }
}

fn not_found(selector: &Selector, expected: &[String]) -> Diagnostic {
    let types = selector.candidate_types(expected);
    let kind = types.first().map_or("struct", String::as_str);
    let message = match &selector.name {
        Some(name) => format!("Cannot find {kind} named '{name}'"),
        None => format!("Cannot find {kind} matching '{selector}'"),
    };
    Diagnostic::warning(ErrorCode::E2001).with_message(message)
}
