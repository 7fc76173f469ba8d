//! Module Tree - hierarchy and import graph of modules.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `ModuleData` (name and privacy of each module)
//! - Edges: `Contains(name)` for nesting, `Imports` for `import` declarations
//!
//! Node indices are never removed, so a [`ModuleId`] is the node index.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tern_core::{ModuleId, Privacy};

/// Edge types in the module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEdge {
    /// Parent module contains child module.
    /// The String is the child's simple name.
    Contains(String),
    /// Source module imports target module.
    Imports,
}

/// Data stored in each module node.
#[derive(Debug, Clone)]
pub struct ModuleData {
    pub name: String,
    pub privacy: Privacy,
}

/// The module graph.
#[derive(Debug)]
pub struct ModuleTree {
    graph: DiGraph<ModuleData, ModuleEdge>,
    root: NodeIndex,
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn node(id: ModuleId) -> NodeIndex {
    NodeIndex::new(id.index())
}

#[inline]
fn module(index: NodeIndex) -> ModuleId {
    ModuleId::new(index.index() as u32)
}

impl ModuleTree {
    /// Create a tree holding only the anonymous root.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(ModuleData {
            name: String::new(),
            privacy: Privacy::Public,
        });
        Self { graph, root }
    }

    /// The anonymous root every top-level module hangs off.
    pub fn root(&self) -> ModuleId {
        module(self.root)
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleData> {
        self.graph.node_weight(node(id))
    }

    /// Find a child module by name.
    pub fn find_child(&self, parent: ModuleId, name: &str) -> Option<ModuleId> {
        self.graph.edges(node(parent)).find_map(|edge| match edge.weight() {
            ModuleEdge::Contains(child_name) if child_name == name => Some(module(edge.target())),
            _ => None,
        })
    }

    /// Get or create a child module.
    pub fn get_or_create_child(&mut self, parent: ModuleId, name: &str, privacy: Privacy) -> ModuleId {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }

        let child = self.graph.add_node(ModuleData {
            name: name.to_string(),
            privacy,
        });
        self.graph
            .add_edge(node(parent), child, ModuleEdge::Contains(name.to_string()));
        module(child)
    }

    /// Get an existing module by path from the root.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<ModuleId> {
        let mut current = self.root();
        for segment in path {
            current = self.find_child(current, segment.as_ref())?;
        }
        Some(current)
    }

    /// Find the module containing `id`.
    pub fn find_parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.graph
            .edges_directed(node(id), Direction::Incoming)
            .find(|edge| matches!(edge.weight(), ModuleEdge::Contains(_)))
            .map(|edge| module(edge.source()))
    }

    /// Path of simple names from the root down to `id`.
    pub fn path(&self, id: ModuleId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = id;

        while current != self.root() {
            if let Some(data) = self.get(current) {
                path.push(data.name.as_str());
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// `a::b::name`
    pub fn qualified_name(&self, id: ModuleId, simple_name: &str) -> String {
        let path = self.path(id);
        if path.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}::{}", path.join("::"), simple_name)
        }
    }

    /// Whether `id` is `ancestor` or nested (at any depth) inside it.
    pub fn is_within(&self, id: ModuleId, ancestor: ModuleId) -> bool {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.find_parent(candidate);
        }
        false
    }

    /// Record an import edge.
    pub fn add_import(&mut self, from: ModuleId, target: ModuleId) {
        let exists = self
            .graph
            .edges(node(from))
            .any(|edge| matches!(edge.weight(), ModuleEdge::Imports) && edge.target() == node(target));
        if !exists {
            self.graph.add_edge(node(from), node(target), ModuleEdge::Imports);
        }
    }

    /// Modules imported by `id`.
    pub fn imports(&self, id: ModuleId) -> Vec<ModuleId> {
        self.graph
            .edges(node(id))
            .filter(|edge| matches!(edge.weight(), ModuleEdge::Imports))
            .map(|edge| module(edge.target()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
