//! C# project (`.csproj`) parsing.
//!
//! The project file is treated as text and mined with regular
//! expressions; only the handful of elements that matter for versioning
//! and dependencies are read.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::domain::component::{join_relative, path_key};
use crate::domain::{Component, ComponentKind, Reference, Version, VersionSource};
use crate::error::{Result, VersionBumperError};
use crate::factory::csharp::version_file;

/// Project parsing settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOptions {
    /// Element holding the version in the project file
    pub version_property: String,
    pub description_property: String,
    /// Referenced libraries that mark a project as a test project
    pub test_frameworks: Vec<String>,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        ProjectOptions {
            version_property: "ApplicationVersion".to_string(),
            description_property: "ApplicationDescription".to_string(),
            test_frameworks: vec![
                "nunit.framework".to_string(),
                "xunit".to_string(),
                "xunit.core".to_string(),
                "Microsoft.VisualStudio.QualityTools.UnitTestFramework".to_string(),
                "MSTest.TestFramework".to_string(),
            ],
        }
    }
}

fn include_re(tag: &str) -> Regex {
    Regex::new(&format!(r#"(?i)<{}\s+Include\s*=\s*"([^"]*)""#, tag))
        .expect("valid include regex")
}

fn compile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| include_re("Compile"))
}

fn project_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| include_re("ProjectReference"))
}

fn library_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| include_re("(?:Package)?Reference"))
}

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<Import\s+Project\s*=\s*"([^"]*)""#).expect("valid import regex")
    })
}

fn element_re(element: &str) -> Result<Regex> {
    let element = regex::escape(element);
    Ok(RegexBuilder::new(&format!(r"<{0}>([^<]*)</{0}>", element))
        .case_insensitive(true)
        .build()?)
}

/// Build the component for a project file.
///
/// Never fails: a project that cannot be parsed is still returned, with
/// its status set and no dependencies.
pub fn load_project(path: &Path, options: &ProjectOptions) -> Component {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut component = Component::new(name, path, ComponentKind::Library);
    if let Err(e) = parse_project_file(&mut component, options) {
        debug!("Failed to load '{}': {}", path.display(), e);
        component.status = Some(format!("Error while loading: {}", e));
        component.dependencies.clear();
        component.version = Version::default();
        component.version_source = VersionSource::Missing;
    }
    component
        .dependencies
        .sort_by(|a, b| a.name().cmp(b.name()));
    component
}

fn parse_project_file(
    component: &mut Component,
    options: &ProjectOptions,
) -> Result<()> {
    let path = component.full_path.clone();
    let text = fs::read_to_string(&path)?;
    if !text.contains("<Project") {
        return Err(VersionBumperError::parse("not an msbuild project file"));
    }
    let project_dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

    let sources: Vec<PathBuf> = compile_re()
        .captures_iter(&text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|include| !include.is_empty())
        .map(|include| join_relative(&project_dir, &include))
        .collect();
    component.missing_files = sources.iter().filter(|s| !s.is_file()).cloned().collect();

    parse_current_version(component, &sources, options)?;

    let libraries: Vec<String> = library_reference_re()
        .captures_iter(&text)
        .map(|caps| {
            caps[1]
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect();
    let uses_test_framework = libraries.iter().any(|lib| {
        options
            .test_frameworks
            .iter()
            .any(|framework| framework.eq_ignore_ascii_case(lib))
    });

    component.kind = if text.contains("<WebProjectProperties") {
        ComponentKind::WebApplication
    } else if uses_test_framework {
        ComponentKind::TestProject
    } else {
        let output_type = extract_property(&path, "OutputType", &mut HashSet::new())?
            .map(|(_, value)| value)
            .unwrap_or_default();
        ComponentKind::from_output_type(&output_type)
    };

    component.dependencies = project_reference_re()
        .captures_iter(&text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|include| !include.is_empty())
        .map(|include| Reference::project(join_relative(&project_dir, &include)))
        .chain(libraries.into_iter().map(|name| Reference::Library { name }))
        .collect();
    Ok(())
}

fn parse_current_version(
    component: &mut Component,
    sources: &[PathBuf],
    options: &ProjectOptions,
) -> Result<()> {
    let path = component.full_path.clone();
    let property = extract_property(&path, &options.version_property, &mut HashSet::new())?
        .filter(|(_, value)| !value.contains('%'));

    if let Some((property_path, value)) = property {
        component.version = Version::parse_lenient(&value)?;
        component.version_source = VersionSource::Property {
            path: property_path,
            element: options.version_property.clone(),
        };
        component.description =
            extract_property(&path, &options.description_property, &mut HashSet::new())?
                .map(|(_, value)| value)
                .unwrap_or_default();
        return Ok(());
    }

    for source in sources.iter().filter(|s| s.is_file()) {
        match version_file::read_assembly_info(source) {
            Ok(Some(info)) => {
                component.version = info.version;
                component.description = info.description.unwrap_or_default();
                component.version_source = VersionSource::AssemblyInfo {
                    path: source.clone(),
                };
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Could not read file '{}'. Cause: {}",
                source.display(),
                e
            ),
        }
    }
    Ok(())
}

/// Find the first non-empty `<element>` value in an msbuild file or,
/// failing that, in the files it imports.
///
/// Returns the file the value was found in along with the value. Imports
/// that are empty, use msbuild variables or point at `.targets` files are
/// not followed.
pub fn extract_property(
    path: &Path,
    element: &str,
    visited: &mut HashSet<String>,
) -> Result<Option<(PathBuf, String)>> {
    if !visited.insert(path_key(path)) || !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    if let Some(caps) = element_re(element)?.captures(&text) {
        let value = caps[1].trim();
        if !value.is_empty() {
            return Ok(Some((path.to_path_buf(), value.to_string())));
        }
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    for caps in import_re().captures_iter(&text) {
        let import = caps[1].trim();
        if import.is_empty() || import.contains('$') || import.to_lowercase().ends_with(".targets") {
            continue;
        }
        let imported = join_relative(base_dir, import);
        if let Some(found) = extract_property(&imported, element, visited)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, text: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    fn load(path: &Path) -> Component {
        load_project(path, &ProjectOptions::default())
    }

    #[test]
    fn test_version_property_and_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App").join("App.csproj");
        write(
            &path,
            r#"<Project ToolsVersion="4.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <ApplicationVersion>2.3.4.0</ApplicationVersion>
    <ApplicationDescription>The app</ApplicationDescription>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System.Xml, Version=4.0.0.0, Culture=neutral" />
    <ProjectReference Include="..\Core\Core.csproj">
      <Name>Core</Name>
    </ProjectReference>
  </ItemGroup>
</Project>"#,
        );

        let app = load(&path);

        assert!(app.status.is_none());
        assert_eq!(app.name, "App");
        assert_eq!(app.kind, ComponentKind::ConsoleApplication);
        assert_eq!(app.version, Version::new(2, 3, 4));
        assert_eq!(app.description, "The app");
        assert_eq!(
            app.version_source,
            VersionSource::Property {
                path: path.clone(),
                element: "ApplicationVersion".to_string()
            }
        );
        assert_eq!(app.dependencies.len(), 2);
        assert_eq!(
            app.dependencies[0],
            Reference::project(dir.path().join("Core").join("Core.csproj"))
        );
        assert_eq!(
            app.dependencies[1],
            Reference::Library {
                name: "System.Xml".to_string()
            }
        );
    }

    #[test]
    fn test_assembly_info_fallback_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.csproj");
        write(
            &path,
            r#"<Project>
  <ItemGroup>
    <Compile Include="Gone.cs" />
    <Compile Include="Properties\AssemblyInfo.cs" />
  </ItemGroup>
</Project>"#,
        );
        let info = dir.path().join("Properties").join("AssemblyInfo.cs");
        write(
            &info,
            "[assembly: AssemblyDescription(\"Core lib\")]\n[assembly: AssemblyVersion(\"1.2.0.0\")]",
        );

        let core = load(&path);

        assert_eq!(core.kind, ComponentKind::Library);
        assert_eq!(core.version, Version::new(1, 2, 0));
        assert_eq!(core.description, "Core lib");
        assert_eq!(core.version_source, VersionSource::AssemblyInfo { path: info });
        assert_eq!(core.missing_files, vec![dir.path().join("Gone.cs")]);
    }

    #[test]
    fn test_test_framework_reference_marks_test_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.Tests.csproj");
        write(
            &path,
            r#"<Project>
  <PropertyGroup><ApplicationVersion>1.0.0</ApplicationVersion></PropertyGroup>
  <ItemGroup><Reference Include="nunit.framework, Version=2.6.0.0" /></ItemGroup>
</Project>"#,
        );

        assert_eq!(load(&path).kind, ComponentKind::TestProject);
    }

    #[test]
    fn test_web_project_properties_mark_web_application() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Web.csproj");
        write(
            &path,
            "<Project><ProjectExtensions><WebProjectProperties/></ProjectExtensions></Project>",
        );

        assert_eq!(load(&path).kind, ComponentKind::WebApplication);
    }

    #[test]
    fn test_version_property_from_import() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("Version.props");
        write(
            &shared,
            "<Project><Import Project=\"Core.csproj\" /><PropertyGroup><ApplicationVersion>5.0.1</ApplicationVersion></PropertyGroup></Project>",
        );
        let path = dir.path().join("Core.csproj");
        write(
            &path,
            r#"<Project>
  <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
  <Import Project="Version.props" />
</Project>"#,
        );

        let core = load(&path);

        assert_eq!(core.version, Version::new(5, 0, 1));
        assert_eq!(
            core.version_source,
            VersionSource::Property {
                path: shared,
                element: "ApplicationVersion".to_string()
            }
        );
    }

    #[test]
    fn test_percent_version_property_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.csproj");
        write(
            &path,
            "<Project><ApplicationVersion>1.0.0.%2a</ApplicationVersion></Project>",
        );

        let core = load(&path);

        assert!(core.status.is_none());
        assert_eq!(core.version_source, VersionSource::Missing);
    }

    #[test]
    fn test_malformed_project_is_degraded_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.csproj");
        write(&path, "this is not msbuild");

        let broken = load(&path);

        assert_eq!(broken.name, "Broken");
        assert!(broken
            .status
            .as_deref()
            .is_some_and(|s| s.starts_with("Error while loading")));
        assert!(broken.dependencies.is_empty());
        assert_eq!(broken.version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_invalid_version_property_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.csproj");
        write(
            &path,
            "<Project><ApplicationVersion>banana</ApplicationVersion></Project>",
        );

        assert!(load(&path).status.is_some());
    }
}
