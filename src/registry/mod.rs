//! The component registry: everything discovered under a root, with the
//! dependency graph and solution ownership resolved.
//!
//! Components live in an arena indexed by [`ComponentId`]. Ids are
//! assigned after sorting by name and are only stable until the next
//! [`ComponentRegistry::prune`].

pub mod graph;
pub mod scanner;

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, info, info_span};

use crate::diagnostics::Diagnostic;
use crate::domain::component::path_key;
use crate::domain::{
    Component, ComponentId, NamePattern, ProjectInSolution, Solution, SolutionId, Version,
};
use crate::error::Result;
use crate::factory::ComponentsFactory;

pub use graph::{DependencyGraph, Dependents};
pub use scanner::{scan_tree, ScanAccumulator, ScanOptions};

/// Outcome of a non-interactive name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ComponentId),
    NotFound,
    /// More than one component matched; listed in registry order
    Ambiguous(Vec<ComponentId>),
}

/// Listing options for [`ComponentRegistry::filter_by`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Most-depended-upon components first
    pub order_by_tree_depth: bool,
    /// Group by kind label before any other ordering
    pub group_by_type: bool,
    pub orphans_only: bool,
}

/// Who owns a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwningStatus {
    Orphan,
    MultiOwned,
    Owned(SolutionId),
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    solutions: Vec<Solution>,
    graph: DependencyGraph,
    dependents: Vec<Dependents>,
}

impl ComponentRegistry {
    /// Walk `root`, then resolve dependencies and solution ownership.
    pub fn scan(
        root: &Path,
        factories: &[&dyn ComponentsFactory],
        options: &ScanOptions,
    ) -> Self {
        info!("Scanning '{}'", root.display());
        let found = {
            let _block = info_span!("scan").entered();
            let found = scan_tree(root, factories, options);
            info!("Scanned {} directories", found.scanned_directories);
            info!("Found {} component(s)", found.components.len());
            info!("Found {} solution(s)", found.solutions.len());
            found
        };
        Self::build(found.components, found.solutions)
    }

    /// Registry over already discovered components and solutions
    pub fn build(components: Vec<Component>, solutions: Vec<Solution>) -> Self {
        let mut registry = ComponentRegistry {
            components,
            solutions,
            ..Default::default()
        };
        registry.resolve();
        registry
    }

    fn resolve(&mut self) {
        info!("Sorting...");
        self.components.sort_by(compare_by_name);
        self.solutions
            .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.full_path.cmp(&b.full_path)));

        info!("Finding dependents...");
        self.graph = DependencyGraph::build(&self.components);
        self.dependents = (0..self.components.len())
            .map(|index| self.graph.layered_dependents(ComponentId(index)))
            .collect();

        info!("Matching solutions to projects...");
        self.match_solutions_to_projects();
    }

    fn match_solutions_to_projects(&mut self) {
        for component in &mut self.components {
            component.parents.clear();
        }
        for index in 0..self.solutions.len() {
            let solution_id = SolutionId(index);
            self.solutions[index].missing_projects.clear();
            let projects = self.solutions[index].projects.clone();
            for project in projects {
                match self.find_project(&project) {
                    Some(id) => self.components[id.0].add_parent(solution_id),
                    None => {
                        let candidates = self.candidates_for(&project.name);
                        debug!(
                            "Solution '{}' lists missing project '{}' ({} candidate(s))",
                            self.solutions[index].name,
                            project.name,
                            candidates.len()
                        );
                        self.solutions[index].add_missing_project(project, candidates);
                    }
                }
            }
        }
    }

    /// The discovered component a solution entry refers to, by exact name and path
    fn find_project(&self, project: &ProjectInSolution) -> Option<ComponentId> {
        let key = project.key();
        let pattern = NamePattern::exact(&project.name);
        match self.lookup(&pattern, |c| c.key() == key) {
            Lookup::Found(id) => Some(id),
            _ => None,
        }
    }

    fn candidates_for(&self, name: &str) -> Vec<ComponentId> {
        let pattern = NamePattern::exact(name);
        self.ids()
            .filter(|&id| pattern.matches(&self.components[id.0].name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.components.len()).map(ComponentId)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn solution(&self, id: SolutionId) -> &Solution {
        &self.solutions[id.0]
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Transitive dependents of `id`, layered for cascade processing
    pub fn dependents_of(&self, id: ComponentId) -> &Dependents {
        &self.dependents[id.0]
    }

    pub fn id_of(&self, component: &Component) -> Option<ComponentId> {
        let key = component.key();
        self.ids().find(|&id| self.components[id.0].key() == key)
    }

    pub fn contains(&self, component: &Component) -> bool {
        self.id_of(component).is_some()
    }

    /// Persist a new version for one component
    pub fn set_new_version(&mut self, id: ComponentId, version: Version) -> Result<()> {
        self.components[id.0].set_new_version(version)
    }

    fn lookup(&self, pattern: &NamePattern, filter: impl Fn(&Component) -> bool) -> Lookup {
        let mut matching: Vec<ComponentId> = self
            .ids()
            .filter(|&id| {
                let component = &self.components[id.0];
                filter(component) && pattern.matches(&component.name)
            })
            .collect();
        match matching.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matching.remove(0)),
            _ => Lookup::Ambiguous(matching),
        }
    }

    /// Find the one component matching `pattern` that passes `filter`.
    pub fn find(&self, pattern: &str, filter: impl Fn(&Component) -> bool) -> Result<Lookup> {
        let pattern = NamePattern::new(pattern)?;
        Ok(self.lookup(&pattern, filter))
    }

    /// Components matching `pattern`, ordered per `options`
    pub fn filter_by(&self, pattern: &str, options: ListOptions) -> Result<Vec<ComponentId>> {
        let pattern = NamePattern::new(pattern)?;
        let mut ids: Vec<ComponentId> = self
            .ids()
            .filter(|&id| {
                let component = &self.components[id.0];
                pattern.matches(&component.name) && (!options.orphans_only || component.is_orphan())
            })
            .collect();

        let by_depth = |a: &ComponentId, b: &ComponentId| {
            self.dependents[b.0].len().cmp(&self.dependents[a.0].len())
        };
        if options.group_by_type {
            ids.sort_by(|a, b| {
                let kinds = self.components[a.0]
                    .kind
                    .label()
                    .cmp(&self.components[b.0].kind.label());
                if options.order_by_tree_depth {
                    kinds.then_with(|| by_depth(a, b))
                } else {
                    kinds
                }
            });
        } else if options.order_by_tree_depth {
            ids.sort_by(by_depth);
        }
        Ok(ids)
    }

    /// Drop every component under `prefix` and recompute the graph.
    ///
    /// Returns how many components were removed.
    pub fn prune(&mut self, prefix: &Path) -> usize {
        let prefix = path_key(prefix);
        let before = self.components.len();
        self.components
            .retain(|component| !Path::new(&component.key()).starts_with(&prefix));
        let removed = before - self.components.len();
        if removed > 0 {
            self.resolve();
        }
        removed
    }

    pub fn owning_status(&self, id: ComponentId) -> OwningStatus {
        match self.components[id.0].parents() {
            [] => OwningStatus::Orphan,
            [only] => OwningStatus::Owned(*only),
            _ => OwningStatus::MultiOwned,
        }
    }

    fn owning_label(&self, id: ComponentId) -> String {
        match self.owning_status(id) {
            OwningStatus::Orphan => "Orphan!".to_string(),
            OwningStatus::MultiOwned => "MultiOwned!".to_string(),
            OwningStatus::Owned(solution) => self.solutions[solution.0].name.clone(),
        }
    }

    /// One-line summary: name, version, description, kind, status and owner
    pub fn describe(&self, id: ComponentId) -> String {
        let component = &self.components[id.0];
        let status = component
            .status
            .as_ref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();
        format!(
            "{}{} - {} ({}){} {}",
            component.name,
            component.version_tag(),
            component.description,
            component.kind,
            status,
            self.owning_label(id)
        )
    }

    /// Multi-line description with dependencies and dependents
    pub fn describe_long(&self, id: ComponentId) -> String {
        let component = &self.components[id.0];
        let mut lines = vec![
            format!("{}{} [{}]", component.name, component.version_tag(), component.kind),
            format!("  from '{}'", component.full_path.display()),
        ];
        if let Some(status) = &component.status {
            lines.push(format!("  status: {}", status));
        }
        if !component.dependencies.is_empty() {
            lines.push("  dependencies:".to_string());
            lines.extend(component.dependencies.iter().map(|d| format!("    {}", d)));
        }
        let dependents = &self.dependents[id.0];
        if !dependents.is_empty() {
            lines.push("  needed by:".to_string());
            for (depth, layer) in dependents.layers().iter().enumerate() {
                for member in layer {
                    let member = &self.components[member.0];
                    lines.push(format!(
                        "    [{}] {}{}",
                        depth,
                        member.name,
                        member.version_tag()
                    ));
                }
            }
        }
        lines.join("\n")
    }

    /// Every reportable anomaly, components first then solutions
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        for component in &self.components {
            if let Some(status) = &component.status {
                found.push(Diagnostic::LoadError {
                    file: component.full_path.clone(),
                    status: status.clone(),
                });
            }
            if !component.missing_files.is_empty() {
                found.push(Diagnostic::MissingFiles {
                    component: component.name.clone(),
                    files: component.missing_files.clone(),
                });
            }
            if component.is_orphan() {
                found.push(Diagnostic::Orphan {
                    component: component.name.clone(),
                    path: component.full_path.clone(),
                });
            } else if component.is_multi_owned() {
                found.push(Diagnostic::MultiOwned {
                    component: component.name.clone(),
                    solutions: component
                        .parents()
                        .iter()
                        .map(|p| self.solutions[p.0].name.clone())
                        .collect(),
                });
            }
        }
        for solution in &self.solutions {
            if let Some(status) = &solution.status {
                found.push(Diagnostic::LoadError {
                    file: solution.full_path.clone(),
                    status: status.clone(),
                });
            }
            for missing in solution.missing_projects() {
                found.push(Diagnostic::MissingProject {
                    solution: solution.name.clone(),
                    project: missing.project.name.clone(),
                    path: missing.project.full_path.clone(),
                    candidates: missing
                        .candidates
                        .iter()
                        .map(|c| self.components[c.0].full_path.clone())
                        .collect(),
                });
            }
        }
        found
    }
}

fn compare_by_name(a: &Component, b: &Component) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.key().cmp(&b.key()))
}
