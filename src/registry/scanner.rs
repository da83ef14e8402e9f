//! Directory walk feeding every factory, one directory at a time.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

use crate::domain::{Component, Solution};
use crate::factory::ComponentsFactory;

/// Everything collected by one walk
#[derive(Debug, Default)]
pub struct ScanAccumulator {
    pub components: Vec<Component>,
    pub solutions: Vec<Solution>,
    pub scanned_directories: usize,
    seen_components: HashSet<String>,
}

impl ScanAccumulator {
    fn add_components(&mut self, found: Vec<Component>) {
        for component in found {
            if self.seen_components.insert(component.key()) {
                self.components.push(component);
            } else {
                debug!(
                    "Skipping duplicate component '{}' at {}",
                    component.name,
                    component.full_path.display()
                );
            }
        }
    }

    fn add_solutions(&mut self, found: Vec<Solution>) {
        for solution in found {
            if !self.solutions.contains(&solution) {
                self.solutions.push(solution);
            }
        }
    }
}

/// Directory names the walk never enters
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub skipped_directory_names: Vec<String>,
}

impl ScanOptions {
    fn is_skipped(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .skipped_directory_names
                .iter()
                .any(|name| entry.file_name().to_string_lossy().eq_ignore_ascii_case(name))
    }
}

/// Walk `root` and ask every factory about each directory.
///
/// Symbolic links are not followed. A directory that cannot be read, or
/// that makes a factory fail, is logged and its subtree skipped; the rest
/// of the walk goes on.
pub fn scan_tree(
    root: &Path,
    factories: &[&dyn ComponentsFactory],
    options: &ScanOptions,
) -> ScanAccumulator {
    let mut accumulator = ScanAccumulator::default();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !options.is_skipped(entry));

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error while scanning: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        debug!("Scanning directory {}", dir.display());
        match scan_directory(dir, factories) {
            Ok((components, solutions)) => {
                accumulator.scanned_directories += 1;
                accumulator.add_components(components);
                accumulator.add_solutions(solutions);
            }
            Err(e) => {
                error!("Error while scanning '{}': {}", dir.display(), e);
                walker.skip_current_dir();
            }
        }
    }
    accumulator
}

fn scan_directory(
    dir: &Path,
    factories: &[&dyn ComponentsFactory],
) -> crate::error::Result<(Vec<Component>, Vec<Solution>)> {
    let mut components = Vec::new();
    let mut solutions = Vec::new();
    for factory in factories {
        components.extend(factory.find_components_in(dir)?);
        solutions.extend(factory.find_solutions_in(dir)?);
    }
    Ok((components, solutions))
}
