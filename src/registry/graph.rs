//! Dependency graph over the registry arena.
//!
//! Edges point from a component to the components it references. The
//! transitive dependents of a component are found by fixed-point
//! iteration over the reversed edges, and then stratified into layers so
//! that nothing is listed before a component it depends on.
//!
//! ```text
//!   Core  <-  Data  <-  App
//!     ^                  |
//!     +------------------+
//!
//!   dependents(Core) = { Data, App }
//!   layers           = [ [Data], [App] ]
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Component, ComponentId};

/// Resolved dependency edges, indexed by component id
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependencies: Vec<Vec<ComponentId>>,
    direct_dependents: Vec<Vec<ComponentId>>,
}

impl DependencyGraph {
    /// Resolve every component's project references against the arena.
    ///
    /// References to components that were not discovered are dropped.
    pub fn build(components: &[Component]) -> Self {
        let by_key: HashMap<String, ComponentId> = components
            .iter()
            .enumerate()
            .map(|(index, c)| (c.key(), ComponentId(index)))
            .collect();

        let edges = components.iter().enumerate().flat_map(|(index, component)| {
            let by_key = &by_key;
            component.dependencies.iter().filter_map(move |reference| {
                let dependency = by_key.get(&reference.target_key()?)?;
                Some((ComponentId(index), *dependency))
            })
        });
        Self::from_edges(components.len(), edges)
    }

    /// Graph with `count` nodes and `(dependent, dependency)` edges
    pub fn from_edges(
        count: usize,
        edges: impl IntoIterator<Item = (ComponentId, ComponentId)>,
    ) -> Self {
        let mut dependencies = vec![Vec::new(); count];
        let mut direct_dependents = vec![Vec::new(); count];
        for (dependent, dependency) in edges {
            if !dependencies[dependent.0].contains(&dependency) {
                dependencies[dependent.0].push(dependency);
                direct_dependents[dependency.0].push(dependent);
            }
        }
        for list in direct_dependents.iter_mut().chain(dependencies.iter_mut()) {
            list.sort();
        }
        DependencyGraph {
            dependencies,
            direct_dependents,
        }
    }

    pub fn dependencies_of(&self, id: ComponentId) -> &[ComponentId] {
        &self.dependencies[id.0]
    }

    pub fn direct_dependents_of(&self, id: ComponentId) -> &[ComponentId] {
        &self.direct_dependents[id.0]
    }

    /// Every component that reaches `id` by following dependency edges.
    ///
    /// Starts from the direct dependents and keeps adding components that
    /// reference anything already found until a round adds nothing. On a
    /// cycle through `id`, `id` itself is part of the result.
    pub fn transitive_dependents(&self, id: ComponentId) -> BTreeSet<ComponentId> {
        let mut found: BTreeSet<ComponentId> =
            self.direct_dependents_of(id).iter().copied().collect();
        let mut frontier: Vec<ComponentId> = found.iter().copied().collect();
        while !frontier.is_empty() {
            let mut added = Vec::new();
            for member in frontier {
                for &dependent in self.direct_dependents_of(member) {
                    if found.insert(dependent) {
                        added.push(dependent);
                    }
                }
            }
            frontier = added;
        }
        found
    }

    /// Stratify `members` so every component comes after what it depends on.
    ///
    /// Repeatedly peels off the members no other remaining member depends
    /// on; those form the last layer still to be placed. When that stalls
    /// on a cycle, members depending on nothing else that remains are
    /// peeled off as the earliest layers instead. Whatever is left after
    /// both stall is the cycle itself and shares one layer between them.
    pub fn layer(&self, members: &BTreeSet<ComponentId>) -> Dependents {
        let mut remaining: Vec<ComponentId> = members.iter().copied().collect();
        let mut earliest = Vec::new();
        let mut latest = Vec::new();
        while !remaining.is_empty() {
            let (depended_on, free): (Vec<ComponentId>, Vec<ComponentId>) =
                remaining.iter().partition(|&&candidate| {
                    remaining
                        .iter()
                        .any(|&other| self.dependencies_of(other).contains(&candidate))
                });
            if !free.is_empty() {
                latest.push(free);
                remaining = depended_on;
                continue;
            }

            let (leaves, tangled): (Vec<ComponentId>, Vec<ComponentId>) =
                remaining.iter().partition(|&&candidate| {
                    !self
                        .dependencies_of(candidate)
                        .iter()
                        .any(|dependency| remaining.contains(dependency))
                });
            if leaves.is_empty() {
                earliest.push(tangled);
                break;
            }
            earliest.push(leaves);
            remaining = tangled;
        }
        latest.reverse();
        earliest.extend(latest);
        Dependents { layers: earliest }
    }

    pub fn layered_dependents(&self, id: ComponentId) -> Dependents {
        self.layer(&self.transitive_dependents(id))
    }
}

/// Transitive dependents of a component, grouped in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependents {
    layers: Vec<Vec<ComponentId>>,
}

impl Dependents {
    pub fn layers(&self) -> &[Vec<ComponentId>] {
        &self.layers
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.layers.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.iter().any(|member| member == id)
    }
}
