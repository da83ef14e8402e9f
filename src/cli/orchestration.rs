//! Bump and list workflows.
//!
//! Separated from main.rs so the workflows can be called programmatically
//! without depending on clap.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::domain::{ComponentId, VersionPart};
use crate::executor::{self, BumpReport};
use crate::factory::{CSharpComponentsFactory, ComponentsFactory};
use crate::registry::{ComponentRegistry, ListOptions, Lookup, ScanOptions};
use crate::ui::{self, Selection};

/// Arguments for the bump workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BumpWorkflowArgs {
    /// Directory tree to scan
    pub root: PathBuf,

    /// Part to bump; `None` only rescans and reports
    pub part: VersionPart,

    /// Also report solutions, missing projects and missing files
    pub diagnostics: bool,

    /// One component is resolved and bumped per pattern
    pub patterns: Vec<String>,

    /// Ask the operator when a pattern is ambiguous
    pub interactive: bool,
}

/// Arguments for the list workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListWorkflowArgs {
    pub root: PathBuf,
    pub pattern: String,
    pub options: ListOptions,
    pub long: bool,
    pub diagnostics: bool,
}

/// Result of the bump workflow
#[derive(Debug, Clone, Default)]
pub struct BumpWorkflowResult {
    /// One report per pattern that resolved to a component
    pub reports: Vec<BumpReport>,
    /// Patterns that resolved to nothing or could not be compiled
    pub unresolved: Vec<String>,
    pub registry: ComponentRegistry,
}

/// Scan `root` with the configured factories and prune excluded directories.
pub fn rescan(root: &Path, config: &Config) -> ComponentRegistry {
    let csharp = CSharpComponentsFactory::from_config(config);
    let factories: [&dyn ComponentsFactory; 1] = [&csharp];
    let options = ScanOptions {
        skipped_directory_names: config.scan.skipped_directory_names.clone(),
    };
    let mut registry = ComponentRegistry::scan(root, &factories, &options);
    for excluded in &config.scan.excluded_directories {
        let prefix = root.join(excluded);
        let removed = registry.prune(&prefix);
        if removed > 0 {
            info!(
                "Pruned {} component(s) under '{}'",
                removed,
                prefix.display()
            );
        }
    }
    if registry.is_empty() {
        warn!("No components found under '{}'", root.display());
    } else {
        debug!("{} component(s) registered", registry.len());
    }
    registry
}

/// Main bump workflow
///
/// 1. Scan the tree
/// 2. Resolve each pattern to one component (asking if allowed)
/// 3. Bump it and cascade to its dependents
/// 4. Print the final versions, and diagnostics when requested
///
/// A pattern that fails to resolve, including an invalid regex, is logged
/// and recorded as unresolved; the remaining patterns still run.
pub fn run_bump_workflow(
    args: BumpWorkflowArgs,
    config: &Config,
) -> Result<BumpWorkflowResult> {
    let mut registry = rescan(&args.root, config);
    let mut result = BumpWorkflowResult::default();

    if args.part != VersionPart::None {
        for pattern in &args.patterns {
            match resolve_pattern(&registry, pattern, args.interactive) {
                Ok(Some(id)) => {
                    let report = executor::bump(&mut registry, id, args.part);
                    result.reports.push(report);
                }
                Ok(None) => result.unresolved.push(pattern.clone()),
                Err(e) => {
                    error!("Could not resolve pattern '{}': {}", pattern, e);
                    result.unresolved.push(pattern.clone());
                }
            }
        }
    }

    ui::display_final_versions(&registry, args.diagnostics);
    if args.diagnostics {
        ui::display_solutions(&registry);
        ui::display_diagnostics(&registry.diagnostics());
    }
    result.registry = registry;
    Ok(result)
}

/// List workflow: scan, filter and print components.
pub fn run_list_workflow(
    args: ListWorkflowArgs,
    config: &Config,
) -> Result<Vec<ComponentId>> {
    let registry = rescan(&args.root, config);
    let ids = registry.filter_by(&args.pattern, args.options)?;
    ui::display_component_list(&registry, &ids, args.long);
    if args.diagnostics {
        ui::display_solutions(&registry);
        ui::display_diagnostics(&registry.diagnostics());
    }
    Ok(ids)
}

/// Resolve `pattern` to one component.
///
/// Non-interactive runs only accept a unique match. Interactive runs let
/// the operator choose among several matches or give up.
pub fn resolve_pattern(
    registry: &ComponentRegistry,
    pattern: &str,
    interactive: bool,
) -> Result<Option<ComponentId>> {
    let candidates = match registry.find(pattern, |_| true)? {
        Lookup::Found(id) => return Ok(Some(id)),
        Lookup::NotFound => Vec::new(),
        Lookup::Ambiguous(ids) => ids,
    };
    if !interactive {
        debug!(
            "Pattern '{}' matches {} components; skipping",
            pattern,
            candidates.len()
        );
        return Ok(None);
    }

    let descriptions: Vec<String> = candidates.iter().map(|&id| registry.describe(id)).collect();
    match ui::select_component(pattern, &descriptions)? {
        Selection::Picked(index) => Ok(Some(candidates[index])),
        Selection::Abandoned => Ok(None),
        Selection::Refused(message) => {
            warn!("{}", message);
            Ok(None)
        }
    }
}
