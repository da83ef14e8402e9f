//! Solution (`.sln`) file parsing.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::component::join_relative;
use crate::domain::{ProjectInSolution, Solution};

/// Project type GUIDs of C# projects (classic and SDK-style)
pub const CSHARP_PROJECT_TYPES: &[&str] = &[
    "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC",
    "9A19103F-16F7-4668-BE54-9A1E7A4F7556",
];

/// Project type GUID of web sites
pub const WEB_SITE_PROJECT_TYPE: &str = "E24C65DC-7377-472B-9ABA-BC803B73C61A";

/// One `Project("{type}") = "name", "path", ...` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub project_type: String,
    pub name: String,
    pub path: String,
}

impl SolutionEntry {
    pub fn is_csharp_project(&self) -> bool {
        CSHARP_PROJECT_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.project_type))
    }

    pub fn is_web_site(&self) -> bool {
        WEB_SITE_PROJECT_TYPE.eq_ignore_ascii_case(&self.project_type)
    }
}

fn project_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)Project\("\{([0-9A-F-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)""#)
            .expect("valid solution project regex")
    })
}

pub fn parse_entries(text: &str) -> Vec<SolutionEntry> {
    project_entry_re()
        .captures_iter(text)
        .map(|caps| SolutionEntry {
            project_type: caps[1].to_string(),
            name: caps[2].to_string(),
            path: caps[3].to_string(),
        })
        .collect()
}

/// Last non-empty segment of a backslash/slash separated name
pub fn simple_name(name: &str) -> String {
    name.split(['\\', '/'])
        .filter(|s| !s.trim().is_empty())
        .last()
        .unwrap_or(name)
        .to_string()
}

/// Read a solution file and list its C# project and web-site members.
///
/// A read failure still yields the solution, with its status set.
pub fn load_solution(path: &Path) -> Solution {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut solution = Solution::new(name, path);
    match fs::read_to_string(path) {
        Ok(text) => {
            let solution_dir = path.parent().unwrap_or_else(|| Path::new(""));
            solution.projects = parse_entries(&text)
                .into_iter()
                .filter(|e| e.is_csharp_project() || e.is_web_site())
                .map(|e| {
                    ProjectInSolution::new(simple_name(&e.name), join_relative(solution_dir, &e.path))
                })
                .collect();
        }
        Err(e) => solution.status = Some(format!("Error while loading: {}", e)),
    }
    solution
}
