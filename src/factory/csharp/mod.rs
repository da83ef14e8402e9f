//! Factory for C# projects, web sites and Visual Studio solutions

pub mod project;
pub mod solution;
pub mod version_file;
pub mod website;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::Config;
use crate::domain::{Component, Solution};
use crate::error::Result;
use crate::factory::ComponentsFactory;

pub use project::ProjectOptions;

#[derive(Debug, Clone)]
pub struct CSharpComponentsFactory {
    project_extensions: Vec<String>,
    solution_extensions: Vec<String>,
    options: ProjectOptions,
}

impl Default for CSharpComponentsFactory {
    fn default() -> Self {
        CSharpComponentsFactory {
            project_extensions: vec!["csproj".to_string()],
            solution_extensions: vec!["sln".to_string()],
            options: ProjectOptions::default(),
        }
    }
}

impl CSharpComponentsFactory {
    pub fn from_config(config: &Config) -> Self {
        CSharpComponentsFactory {
            project_extensions: config.scan.project_extensions.clone(),
            solution_extensions: config.scan.solution_extensions.clone(),
            options: config.projects.to_options(),
        }
    }

    fn solution_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        files_with_extension(dir, &self.solution_extensions)
    }
}

impl ComponentsFactory for CSharpComponentsFactory {
    fn find_components_in(&self, dir: &Path) -> Result<Vec<Component>> {
        let mut components: Vec<Component> = files_with_extension(dir, &self.project_extensions)?
            .iter()
            .map(|path| project::load_project(path, &self.options))
            .collect();

        for solution_path in self.solution_files(dir)? {
            let text = match fs::read_to_string(&solution_path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Could not read solution '{}': {}",
                        solution_path.display(),
                        e
                    );
                    continue;
                }
            };
            for entry in solution::parse_entries(&text)
                .into_iter()
                .filter(|e| e.is_web_site())
            {
                let site = website::load_website(&solution_path, &entry.name, &entry.path);
                if site.full_path.is_dir() {
                    components.push(site);
                }
            }
        }
        Ok(components)
    }

    fn find_solutions_in(&self, dir: &Path) -> Result<Vec<Solution>> {
        Ok(self
            .solution_files(dir)?
            .iter()
            .map(|path| solution::load_solution(path))
            .collect())
    }
}

/// Files directly inside `dir` with one of `extensions`, sorted by path
fn files_with_extension(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path.extension().is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|wanted| ext.eq_ignore_ascii_case(wanted.as_str()))
            });
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
