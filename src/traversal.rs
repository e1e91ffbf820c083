//
//  traversal.rs
//  Depend
//
//  Created by hak (tharun)
//

//! Read-only walks over the type graph.
//!
//! Every walk keeps a visited set keyed by [`TypeId`], so malformed input
//! such as `A extends B extends A` or mutually extending interfaces yields a
//! de-duplicated best-effort result instead of unbounded recursion.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::ident::{PackageId, TypeId};
use crate::model::CodeModel;
use crate::reference::{ReferenceKind, TypeReference};
use crate::types::TypeKind;

/// Resolved, filtered type dependencies as a petgraph graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes carry the type, edges the kind of the declaring reference.
    pub graph: DiGraph<TypeId, ReferenceKind>,
    /// Index: type -> node index.
    pub index: HashMap<TypeId, NodeIndex>,
}

impl DependencyGraph {
    pub fn node(&self, ty: TypeId) -> Option<NodeIndex> {
        self.index.get(&ty).copied()
    }

    /// True when `from` declares a dependency on `to`.
    pub fn depends_on(&self, from: TypeId, to: TypeId) -> bool {
        match (self.node(from), self.node(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }
}

impl CodeModel {
    /// Resolve a reference against this model's symbol table.
    pub fn resolve(&self, reference: &TypeReference) -> Option<TypeId> {
        let resolved = reference.resolve(self);
        if resolved.is_none() {
            debug!(reference = %reference, "unresolved type reference");
        }
        resolved
    }

    /// The parent class, hidden when a filter rejects it.
    ///
    /// Only the immediate reference is resolved. Callers that follow the
    /// chain themselves must guard against cyclic declarations; use
    /// [`CodeModel::ancestors`] for a guarded walk.
    pub fn parent_class(&self, ty: TypeId) -> Option<TypeId> {
        let parent = self.structural_parent(ty)?;
        let node = self.get_type(parent)?;
        if !self.accepts(node) {
            debug!(ty = %ty, parent = node.name(), "parent class hidden by filter");
            return None;
        }
        Some(parent)
    }

    /// The resolved parent edge, ignoring filters.
    fn structural_parent(&self, ty: TypeId) -> Option<TypeId> {
        let reference = self.get_type(ty)?.parent.as_ref()?;
        self.resolve(reference)
    }

    /// Transitive interfaces of a type, each listed once.
    ///
    /// Declared interfaces come first in declaration order, each directly
    /// followed by the interfaces it extends (depth first). The interfaces
    /// inherited through the parent class come last. The queried type is
    /// never part of its own result. Interfaces rejected by a filter are
    /// left out, but the interfaces they extend are still reported.
    pub fn interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([ty]);
        let mut expanded = HashSet::new();
        self.collect_interfaces(ty, &mut found, &mut seen, &mut expanded);
        found
    }

    fn collect_interfaces(
        &self,
        ty: TypeId,
        found: &mut Vec<TypeId>,
        seen: &mut HashSet<TypeId>,
        expanded: &mut HashSet<TypeId>,
    ) {
        if !expanded.insert(ty) {
            return;
        }
        let Some(node) = self.get_type(ty) else {
            return;
        };
        for reference in &node.interfaces {
            let Some(interface) = self.resolve(reference) else {
                continue;
            };
            if !seen.insert(interface) {
                continue;
            }
            // Hidden interfaces are still walked so their parents are found.
            if self.get_type(interface).is_some_and(|n| self.accepts(n)) {
                found.push(interface);
            }
            self.collect_interfaces(interface, found, seen, expanded);
        }
        if let Some(parent) = self.structural_parent(ty) {
            self.collect_interfaces(parent, found, seen, expanded);
        }
    }

    /// Declared dependencies: interface references, then the parent
    /// reference. References are returned unresolved.
    pub fn dependencies(&self, ty: TypeId) -> Vec<&TypeReference> {
        let Some(node) = self.get_type(ty) else {
            return Vec::new();
        };
        node.interfaces.iter().chain(node.parent.as_ref()).collect()
    }

    /// Declared dependencies resolved to types, de-duplicated, without
    /// unresolvable or filtered targets.
    pub fn resolved_dependencies(&self, ty: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([ty]);
        self.dependencies(ty)
            .into_iter()
            .filter_map(|reference| self.resolve(reference))
            .filter(|&dep| self.get_type(dep).is_some_and(|n| self.accepts(n)))
            .filter(|dep| seen.insert(*dep))
            .collect()
    }

    /// Filtered parent chain, nearest first. Stops at the first cycle.
    pub fn ancestors(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([ty]);
        let mut current = ty;
        while let Some(parent) = self.parent_class(current) {
            if !visited.insert(parent) {
                warn!(ty = %ty, at = %parent, "cyclic class hierarchy");
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// True when `ty` is `other`, implements or extends it, or inherits it
    /// through its (filtered) class chain.
    pub fn is_subtype_of(&self, ty: TypeId, other: TypeId) -> bool {
        if ty == other {
            return true;
        }
        let (Some(node), Some(target)) = (self.get_type(ty), self.get_type(other)) else {
            return false;
        };
        match (node.kind, target.kind) {
            (_, TypeKind::Interface) => self.interfaces(ty).contains(&other),
            (TypeKind::Class, TypeKind::Class) => self.ancestors(ty).contains(&other),
            (TypeKind::Interface, TypeKind::Class) => false,
        }
    }

    /// Classes whose parent resolves to `ty`, in creation order.
    pub fn child_classes(&self, ty: TypeId) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|n| n.id != ty && self.accepts(n))
            .filter(|n| self.structural_parent(n.id) == Some(ty))
            .map(|n| n.id)
            .collect()
    }

    /// Types that satisfy `interface`, directly or transitively.
    pub fn implementors(&self, interface: TypeId) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|n| n.id != interface && self.accepts(n))
            .filter(|n| self.interfaces(n.id).contains(&interface))
            .map(|n| n.id)
            .collect()
    }

    /// Packages that the types listed in `pkg` depend on, first seen first.
    pub fn package_dependencies(&self, pkg: PackageId) -> Vec<PackageId> {
        let mut seen = HashSet::from([pkg]);
        let mut efferent = Vec::new();
        for node in self.package_types(pkg) {
            for dep in self.resolved_dependencies(node.id) {
                if let Some(target) = self.package_of(dep) {
                    if seen.insert(target) {
                        efferent.push(target);
                    }
                }
            }
        }
        efferent
    }

    /// Build the resolved dependency graph of all types that pass the
    /// filters.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut dg = DependencyGraph::default();
        for node in self.types.iter().filter(|n| self.accepts(n)) {
            let idx = dg.graph.add_node(node.id);
            dg.index.insert(node.id, idx);
        }
        for node in &self.types {
            let Some(&from) = dg.index.get(&node.id) else {
                continue;
            };
            for reference in self.dependencies(node.id) {
                let Some(target) = self.resolve(reference) else {
                    continue;
                };
                if let Some(&to) = dg.index.get(&target) {
                    if !dg.graph.contains_edge(from, to) {
                        dg.graph.add_edge(from, to, reference.kind());
                    }
                }
            }
        }
        dg
    }

    /// Groups of types that depend on each other in a cycle. Each group is
    /// sorted; a type that depends on itself forms a group of one.
    pub fn dependency_cycles(&self) -> Vec<Vec<TypeId>> {
        let dg = self.dependency_graph();
        let mut cycles: Vec<Vec<TypeId>> = tarjan_scc(&dg.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || dg.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut ids: Vec<TypeId> = scc.into_iter().map(|idx| dg.graph[idx]).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        if !cycles.is_empty() {
            warn!(count = cycles.len(), "dependency cycles detected");
        }
        cycles
    }
}
