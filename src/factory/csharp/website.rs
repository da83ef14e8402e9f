//! Web sites: folder-based projects declared only inside a solution.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::component::join_relative;
use crate::domain::{Component, ComponentKind, VersionSource};
use crate::factory::csharp::solution::simple_name;
use crate::factory::csharp::version_file;

/// Build the web-site component declared by a solution entry.
///
/// The version comes from the first `*.cs` file under `App_Code` (or the
/// site root when there is no `App_Code`) declaring an assembly version.
pub fn load_website(
    solution_path: &Path,
    entry_name: &str,
    relative_path: &str,
) -> Component {
    let solution_dir = solution_path.parent().unwrap_or_else(|| Path::new(""));
    let site_dir = join_relative(solution_dir, relative_path);
    let mut component = Component::new(simple_name(entry_name), &site_dir, ComponentKind::WebSite);
    if !site_dir.is_dir() {
        return component;
    }

    let app_code = site_dir.join("App_Code");
    let source_root = if app_code.is_dir() { app_code } else { site_dir };
    let sources = WalkDir::new(&source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
        });

    for source in sources {
        match version_file::read_assembly_info(source.path()) {
            Ok(Some(info)) => {
                component.version = info.version;
                component.description = info.description.unwrap_or_default();
                component.version_source = VersionSource::AssemblyInfo {
                    path: source.path().to_path_buf(),
                };
                break;
            }
            Ok(None) => {}
            Err(e) => debug!(
                "Could not read file '{}'. Cause: {}",
                source.path().display(),
                e
            ),
        }
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;
    use std::fs;

    #[test]
    fn test_load_website_reads_app_code_version() {
        let dir = tempfile::tempdir().unwrap();
        let app_code = dir.path().join("Site").join("App_Code");
        fs::create_dir_all(&app_code).unwrap();
        fs::write(
            app_code.join("AssemblyInfo.cs"),
            "[assembly: AssemblyVersion(\"3.1.0.0\")]\n[assembly: AssemblyDescription(\"Public site\")]",
        )
        .unwrap();

        let site = load_website(&dir.path().join("All.sln"), "C:\\web\\Site\\", "Site\\");

        assert_eq!(site.name, "Site");
        assert_eq!(site.kind, ComponentKind::WebSite);
        assert_eq!(site.version, Version::new(3, 1, 0));
        assert_eq!(site.description, "Public site");
        assert!(matches!(site.version_source, VersionSource::AssemblyInfo { .. }));
    }

    #[test]
    fn test_load_website_without_sources_has_no_version_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Site")).unwrap();

        let site = load_website(&dir.path().join("All.sln"), "Site", "Site");

        assert_eq!(site.version, Version::new(1, 0, 0));
        assert_eq!(site.version_source, VersionSource::Missing);
    }
}
