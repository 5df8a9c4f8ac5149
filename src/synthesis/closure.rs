//! Inheritance closure over one kind of parent edge.

use std::collections::{HashMap, HashSet};

use crate::error::{NodeKind, SchemaError};
use crate::iri::Iri;
use crate::schema::{SchemaNode, SchemaRegistry};

/// Parent/child view of the class or property nodes of a registry.
pub(crate) struct Hierarchy<'r> {
    registry: &'r SchemaRegistry,
    kind: NodeKind,
    children: HashMap<&'r Iri, Vec<&'r Iri>>,
}

impl<'r> Hierarchy<'r> {
    pub(crate) fn new(registry: &'r SchemaRegistry, kind: NodeKind) -> Self {
        let mut children: HashMap<&'r Iri, Vec<&'r Iri>> = HashMap::new();
        for node in registry.nodes_of(kind) {
            for parent in node.parents() {
                children.entry(parent).or_default().push(node.id());
            }
        }
        Self {
            registry,
            kind,
            children,
        }
    }

    fn parents(&self, id: &Iri) -> impl Iterator<Item = &'r Iri> + 'r {
        let registry: &'r SchemaRegistry = self.registry;
        registry
            .node(id)
            .into_iter()
            .flat_map(|node| node.parents().iter())
    }

    fn ordinal(&self, id: &Iri) -> usize {
        self.registry.node(id).map_or(usize::MAX, SchemaNode::ordinal)
    }

    /// Fails on the first node reachable from itself.
    ///
    /// Roots are visited in declaration order, so the reported cycle is stable
    /// for a given registry. Members are listed in edge order starting from the
    /// node the walk re-entered.
    pub(crate) fn check_acyclic(&self) -> Result<(), SchemaError> {
        let mut done: HashSet<&'r Iri> = HashSet::new();
        let mut path: Vec<&'r Iri> = Vec::new();
        for node in self.registry.nodes_of(self.kind) {
            self.visit(node.id(), &mut path, &mut done)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        id: &'r Iri,
        path: &mut Vec<&'r Iri>,
        done: &mut HashSet<&'r Iri>,
    ) -> Result<(), SchemaError> {
        if done.contains(id) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|on_path| *on_path == id) {
            return Err(SchemaError::CyclicInheritance {
                kind: self.kind,
                members: path[start..].iter().map(|member| (*member).clone()).collect(),
            });
        }

        path.push(id);
        for parent in self.parents(id) {
            self.visit(parent, path, done)?;
        }
        path.pop();
        done.insert(id);
        Ok(())
    }

    /// Returns the strict ancestors of `id`, each one ahead of all of its own
    /// ancestors.
    ///
    /// Ancestors are ranked by their longest path from `id`, then by
    /// declaration, so a redundant shortcut edge never lifts a general class
    /// above a more specific one. Requires an acyclic hierarchy.
    pub(crate) fn ancestors(&self, id: &Iri) -> Vec<&'r Iri> {
        let mut seen: HashSet<&'r Iri> = HashSet::new();
        let mut order: Vec<&'r Iri> = Vec::new();
        for parent in self.parents(id) {
            self.post_order(parent, &mut seen, &mut order);
        }

        // Reverse post-order puts every node ahead of its parents.
        let mut depth: HashMap<&'r Iri, usize> = self.parents(id).map(|parent| (parent, 1)).collect();
        for node in order.iter().rev() {
            let below = depth.get(node).copied().unwrap_or(1);
            for parent in self.parents(node) {
                let entry = depth.entry(parent).or_insert(0);
                *entry = (*entry).max(below + 1);
            }
        }

        order.sort_by_key(|ancestor| (depth.get(ancestor).copied().unwrap_or(1), self.ordinal(ancestor)));
        order
    }

    fn post_order(&self, id: &'r Iri, seen: &mut HashSet<&'r Iri>, out: &mut Vec<&'r Iri>) {
        if !seen.insert(id) {
            return;
        }
        for parent in self.parents(id) {
            self.post_order(parent, seen, out);
        }
        out.push(id);
    }

    /// Returns every transitive descendant of `id` in declaration order.
    pub(crate) fn descendants(&self, id: &Iri) -> Vec<&'r Iri> {
        let mut seen: HashSet<&'r Iri> = HashSet::new();
        let mut stack: Vec<&'r Iri> = self.children.get(id).cloned().unwrap_or_default();
        let mut out = Vec::new();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            if let Some(children) = self.children.get(next) {
                stack.extend(children.iter().copied());
            }
        }
        out.sort_by_key(|descendant| self.ordinal(descendant));
        out
    }
}
