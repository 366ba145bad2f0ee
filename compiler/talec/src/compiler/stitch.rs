//! Re-parenting of lowered nodes into knots, stitches and weaves.
//!
//! Blocks are lowered one unit at a time, so a choice does not know which
//! knot it belongs to. The stitcher replays nodes in source order against a
//! stack of open scopes:
//!
//! - a top-level flow header closes everything and opens the flow
//! - a sub-flow header closes everything below the enclosing top-level flow
//! - a choice of depth `d` closes choices of depth `>= d` and opens itself
//! - a gather of depth `d` closes choices of depth `>= d`
//!
//! Flows are shared by every script of a compile. Reopening a flow that
//! already exists continues it instead of creating a second, empty one.

use indexmap::IndexMap;
use tale_ir::{FlowHeader, FlowKind, Node, SourceLocation};
use tracing::trace;

pub(crate) type ContainerId = usize;

const ROOT: ContainerId = 0;

/// A lowered node placed in file coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Located {
    pub node: Node,
    pub location: SourceLocation,
    /// Stable id of the block that produced the node.
    pub id: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Root,
    Flow(FlowKind),
    Choice { depth: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Entry {
    Node(Located),
    Choice(ContainerId),
}

#[derive(Clone, Debug)]
pub(crate) struct Container {
    pub kind: ContainerKind,
    /// Flow name, or `c-N` for the N-th choice of the parent.
    pub name: String,
    /// The flow header or choice node that opened this container.
    pub header: Option<Located>,
    pub content: Vec<Entry>,
    /// Named sub-flows.
    pub flows: IndexMap<String, ContainerId>,
    choices: u32,
}

impl Container {
    fn new(kind: ContainerKind, name: String, header: Option<Located>) -> Self {
        Container {
            kind,
            name,
            header,
            content: Vec::new(),
            flows: IndexMap::new(),
            choices: 0,
        }
    }
}

/// Open scopes of the script being stitched. Empty means top level.
#[derive(Debug, Default)]
pub(crate) struct ScriptScope {
    stack: Vec<ContainerId>,
    top: Vec<Entry>,
}

/// The story being assembled from every script of a compile.
#[derive(Debug)]
pub(crate) struct Stitcher {
    containers: Vec<Container>,
    /// Top-level content of included scripts, in inclusion order.
    included: Vec<Entry>,
    root: Vec<Entry>,
    pub variables: Vec<Located>,
    pub lists: Vec<Located>,
}

impl Default for Stitcher {
    fn default() -> Self {
        Stitcher {
            containers: vec![Container::new(ContainerKind::Root, String::new(), None)],
            included: Vec::new(),
            root: Vec::new(),
            variables: Vec::new(),
            lists: Vec::new(),
        }
    }
}

impl Stitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, id: ContainerId) -> &Container {
        &self.containers[id]
    }

    /// Top-level flows of the story.
    pub fn flows(&self) -> &IndexMap<String, ContainerId> {
        &self.containers[ROOT].flows
    }

    /// Included top-level content followed by the root script's.
    pub fn top_level(&self) -> impl Iterator<Item = &Entry> {
        self.included.iter().chain(self.root.iter())
    }

    /// Place a node of the script `scope` belongs to.
    pub fn push(&mut self, scope: &mut ScriptScope, located: Located) {
        match &located.node {
            Node::Flow(header) => {
                let header = header.clone();
                self.open_flow(scope, &header, located);
            }
            Node::Choice(choice) => {
                let depth = choice.depth;
                self.close_choices(scope, depth);
                let parent = scope.stack.last().copied();
                let name = {
                    let counter = match parent {
                        Some(id) => &mut self.containers[id].choices,
                        None => &mut self.containers[ROOT].choices,
                    };
                    let name = format!("c-{counter}");
                    *counter += 1;
                    name
                };
                let id = self.alloc(Container::new(
                    ContainerKind::Choice { depth },
                    name,
                    Some(located),
                ));
                self.target(scope).push(Entry::Choice(id));
                scope.stack.push(id);
            }
            Node::Gather(gather) => {
                self.close_choices(scope, gather.depth);
                self.target(scope).push(Entry::Node(located));
            }
            Node::Variable(_) => self.variables.push(located),
            Node::List(_) => self.lists.push(located),
            Node::Text(_) | Node::Divert(_) | Node::Logic(_) => {
                self.target(scope).push(Entry::Node(located));
            }
        }
    }

    /// Hand back a finished script's top-level content.
    pub fn finish(&mut self, scope: ScriptScope, is_include: bool) {
        if is_include {
            self.included.extend(scope.top);
        } else {
            self.root.extend(scope.top);
        }
    }

    fn alloc(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        self.containers.len() - 1
    }

    fn target<'s>(&'s mut self, scope: &'s mut ScriptScope) -> &'s mut Vec<Entry> {
        match scope.stack.last() {
            Some(&id) => &mut self.containers[id].content,
            None => &mut scope.top,
        }
    }

    fn close_choices(&self, scope: &mut ScriptScope, depth: u32) {
        while let Some(&id) = scope.stack.last() {
            match self.containers[id].kind {
                ContainerKind::Choice { depth: open } if open >= depth => {
                    scope.stack.pop();
                }
                _ => break,
            }
        }
    }

    fn open_flow(&mut self, scope: &mut ScriptScope, header: &FlowHeader, located: Located) {
        let parent = if header.kind.is_top_level() {
            scope.stack.clear();
            ROOT
        } else {
            // Keep only the enclosing top-level flow.
            while let Some(&id) = scope.stack.last() {
                if matches!(self.containers[id].kind, ContainerKind::Flow(kind) if kind.is_top_level()) {
                    break;
                }
                scope.stack.pop();
            }
            scope.stack.last().copied().unwrap_or(ROOT)
        };
        let id = match self.containers[parent].flows.get(&header.name) {
            Some(&existing) => {
                trace!(name = %header.name, "flow reopened");
                existing
            }
            None => {
                let id = self.alloc(Container::new(
                    ContainerKind::Flow(header.kind),
                    header.name.clone(),
                    Some(located),
                ));
                self.containers[parent].flows.insert(header.name.clone(), id);
                id
            }
        };
        if scope.stack.last() != Some(&id) {
            scope.stack.push(id);
        }
    }
}
