use std::fmt;
use std::path::PathBuf;

use crate::domain::component::{normalize_path, path_key, ComponentId};

/// A project entry listed inside a solution file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInSolution {
    pub name: String,
    pub full_path: PathBuf,
}

impl ProjectInSolution {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        ProjectInSolution {
            name: name.into(),
            full_path: normalize_path(&full_path.into()),
        }
    }

    pub fn key(&self) -> String {
        path_key(&self.full_path)
    }
}

/// A solution entry that resolved to no discovered project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingProject {
    pub project: ProjectInSolution,
    /// Discovered components sharing the missing entry's name
    pub candidates: Vec<ComponentId>,
}

/// A named grouping of projects
#[derive(Debug, Clone)]
pub struct Solution {
    pub name: String,
    pub full_path: PathBuf,
    pub projects: Vec<ProjectInSolution>,
    /// Set when the solution file could not be read
    pub status: Option<String>,
    pub(crate) missing_projects: Vec<MissingProject>,
}

impl Solution {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        Solution {
            name: name.into(),
            full_path: normalize_path(&full_path.into()),
            projects: Vec::new(),
            status: None,
            missing_projects: Vec::new(),
        }
    }

    pub fn missing_projects(&self) -> &[MissingProject] {
        &self.missing_projects
    }

    pub fn has_missing_projects(&self) -> bool {
        !self.missing_projects.is_empty()
    }

    pub fn add_missing_project(&mut self, project: ProjectInSolution, candidates: Vec<ComponentId>) {
        self.missing_projects.push(MissingProject {
            project,
            candidates,
        });
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        path_key(&self.full_path) == path_key(&other.full_path)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} Projects",
            self.name,
            self.full_path.display(),
            self.projects.len()
        )
    }
}
