use std::fmt;
use std::path::PathBuf;

/// Anomalies found while building the registry.
/// None of these stop a bump; they are reported on request.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Component listed in no solution
    Orphan { component: String, path: PathBuf },
    /// Component listed in more than one solution
    MultiOwned {
        component: String,
        solutions: Vec<String>,
    },
    /// Solution entry that matches no discovered component
    MissingProject {
        solution: String,
        project: String,
        path: PathBuf,
        /// Discovered components with the same name elsewhere
        candidates: Vec<PathBuf>,
    },
    /// Source files declared by a project but absent on disk
    MissingFiles {
        component: String,
        files: Vec<PathBuf>,
    },
    /// Project or solution file that failed to load
    LoadError { file: PathBuf, status: String },
}

impl Diagnostic {
    /// Extra lines printed under the headline
    pub fn details(&self) -> Vec<String> {
        match self {
            Diagnostic::MissingProject { candidates, .. } => candidates
                .iter()
                .map(|path| format!("-- candidate: {}", path.display()))
                .collect(),
            Diagnostic::MissingFiles { files, .. } => files
                .iter()
                .map(|path| format!("-- {}", path.display()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Orphan { component, path } => {
                write!(
                    f,
                    "Component '{}' is not part of any solution ({})",
                    component,
                    path.display()
                )
            }
            Diagnostic::MultiOwned {
                component,
                solutions,
            } => write!(
                f,
                "Component '{}' is owned by several solutions: {}",
                component,
                solutions.join(", ")
            ),
            Diagnostic::MissingProject {
                solution,
                project,
                path,
                candidates,
            } => {
                write!(
                    f,
                    "Solution '{}' lists missing project '{}' at {}",
                    solution,
                    project,
                    path.display()
                )?;
                if !candidates.is_empty() {
                    write!(f, " ({} candidate(s) found)", candidates.len())?;
                }
                Ok(())
            }
            Diagnostic::MissingFiles { component, files } => write!(
                f,
                "Project '{}' is missing {} file(s)",
                component,
                files.len()
            ),
            Diagnostic::LoadError { file, status } => {
                write!(f, "{}: {}", file.display(), status)
            }
        }
    }
}
