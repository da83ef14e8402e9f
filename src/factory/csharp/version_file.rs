//! Reading and rewriting version-bearing text inside project and
//! assembly-info source files.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::domain::Version;
use crate::error::{Result, VersionBumperError};

/// Version data declared through `[assembly: ...]` attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyInfo {
    pub version: Version,
    pub description: Option<String>,
}

fn informational_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)AssemblyInformationalVersion\("([^"]*)"\)"#)
            .expect("valid informational version regex")
    })
}

fn assembly_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)AssemblyVersion\("([^"]*)"\)"#).expect("valid assembly version regex")
    })
}

fn assembly_description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)AssemblyDescription\("([^"]+)"\)"#)
            .expect("valid assembly description regex")
    })
}

/// Extract the assembly version declared in a source file.
///
/// `AssemblyInformationalVersion` wins over `AssemblyVersion`. Returns
/// `Ok(None)` when neither attribute holds a parsable version.
pub fn read_assembly_info(path: &Path) -> Result<Option<AssemblyInfo>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_assembly_info(&text))
}

pub fn parse_assembly_info(text: &str) -> Option<AssemblyInfo> {
    let version = [informational_version_re(), assembly_version_re()]
        .into_iter()
        .filter_map(|re| re.captures(text))
        .find_map(|caps| Version::parse_lenient(&caps[1]).ok())?;
    let description = assembly_description_re()
        .captures(text)
        .map(|caps| caps[1].to_string());
    Some(AssemblyInfo {
        version,
        description,
    })
}

/// Rewrite the assembly version attributes of a source file
pub fn write_assembly_info(path: &Path, version: Version) -> Result<()> {
    transform_file(path, |text| rewrite_assembly_info(text, version))
}

pub fn rewrite_assembly_info(text: &str, version: Version) -> String {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    static INFORMATIONAL_RE: OnceLock<Regex> = OnceLock::new();

    let version_re = VERSION_RE.get_or_init(|| {
        Regex::new(r#"(?im)(Assembly(?:File)?)(Version\(")([^"]*)("\s*\))"#)
            .expect("valid assembly version rewrite regex")
    });
    let informational_re = INFORMATIONAL_RE.get_or_init(|| {
        Regex::new(r#"(?im)(AssemblyInformationalVersion\(")([^"]*)("\s*\))"#)
            .expect("valid informational version rewrite regex")
    });

    let replaced = version_re.replace_all(text, format!("${{1}}${{2}}{}${{4}}", version));
    informational_re
        .replace_all(&replaced, format!("${{1}}{}${{3}}", version))
        .into_owned()
}

/// Replace the value of the first `<element>` in an msbuild file
pub fn write_version_property(path: &Path, element: &str, version: Version) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let rewritten = rewrite_version_property(&text, element, version)?.ok_or_else(|| {
        VersionBumperError::VersionElementNotFound {
            path: path.to_path_buf(),
        }
    })?;
    make_writable(path)?;
    fs::write(path, rewritten)?;
    Ok(())
}

pub fn rewrite_version_property(
    text: &str,
    element: &str,
    version: Version,
) -> Result<Option<String>> {
    let element = regex::escape(element);
    let re = RegexBuilder::new(&format!(r"(<{0}>)[^<]*(</{0}>)", element))
        .case_insensitive(true)
        .build()?;
    if !re.is_match(text) {
        return Ok(None);
    }
    Ok(Some(
        re.replacen(text, 1, format!("${{1}}{}${{2}}", version))
            .into_owned(),
    ))
}

fn transform_file(path: &Path, transformer: impl FnOnce(&str) -> String) -> Result<()> {
    let text = fs::read_to_string(path)?;
    make_writable(path)?;
    fs::write(path, transformer(&text))?;
    Ok(())
}

#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSEMBLY_INFO: &str = r#"using System.Reflection;
[assembly: AssemblyTitle("Core")]
[assembly: AssemblyDescription("Core services")]
[assembly: AssemblyVersion("1.4.2.0")]
[assembly: AssemblyFileVersion("1.4.2.0")]
"#;

    #[test]
    fn test_parse_assembly_info() {
        let info = parse_assembly_info(ASSEMBLY_INFO).unwrap();
        assert_eq!(info.version, Version::new(1, 4, 2));
        assert_eq!(info.description.as_deref(), Some("Core services"));
    }

    #[test]
    fn test_informational_version_wins() {
        let text = format!(
            "{}[assembly: AssemblyInformationalVersion(\"2.0.0-rc1\")]\n",
            ASSEMBLY_INFO
        );
        let info = parse_assembly_info(&text).unwrap();
        assert_eq!(info.version, Version::new(2, 0, 0));
    }

    #[test]
    fn test_parse_assembly_info_without_version() {
        assert!(parse_assembly_info("[assembly: AssemblyTitle(\"x\")]").is_none());
    }

    #[test]
    fn test_rewrite_assembly_info() {
        let text = format!(
            "{}[assembly: AssemblyInformationalVersion(\"1.4.2-beta\")]\n",
            ASSEMBLY_INFO
        );
        let rewritten = rewrite_assembly_info(&text, Version::new(2, 0, 0));
        assert!(rewritten.contains(r#"AssemblyVersion("2.0.0")"#));
        assert!(rewritten.contains(r#"AssemblyFileVersion("2.0.0")"#));
        assert!(rewritten.contains(r#"AssemblyInformationalVersion("2.0.0")"#));
        assert!(rewritten.contains(r#"AssemblyTitle("Core")"#));
    }

    #[test]
    fn test_rewrite_version_property_first_only() {
        let text = "<Project><PropertyGroup><ApplicationVersion>1.0.0</ApplicationVersion></PropertyGroup>\
                    <ApplicationVersion>9.9.9</ApplicationVersion></Project>";
        let rewritten = rewrite_version_property(text, "ApplicationVersion", Version::new(1, 0, 1))
            .unwrap()
            .unwrap();
        assert!(rewritten.contains("<ApplicationVersion>1.0.1</ApplicationVersion>"));
        assert!(rewritten.contains("<ApplicationVersion>9.9.9</ApplicationVersion>"));
    }

    #[test]
    fn test_rewrite_version_property_missing_element() {
        let result =
            rewrite_version_property("<Project/>", "ApplicationVersion", Version::new(1, 0, 1))
                .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_version_property_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.csproj");
        fs::write(
            &path,
            "<Project><ApplicationVersion>1.0.0</ApplicationVersion></Project>",
        )
        .unwrap();

        write_version_property(&path, "ApplicationVersion", Version::new(2, 0, 0)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<ApplicationVersion>2.0.0</ApplicationVersion>"));
    }

    #[test]
    fn test_write_version_property_reports_missing_element() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Core.csproj");
        fs::write(&path, "<Project></Project>").unwrap();

        let err = write_version_property(&path, "ApplicationVersion", Version::new(2, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            VersionBumperError::VersionElementNotFound { .. }
        ));
    }

    #[test]
    fn test_write_assembly_info_clears_readonly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AssemblyInfo.cs");
        fs::write(&path, ASSEMBLY_INFO).unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        write_assembly_info(&path, Version::new(1, 5, 0)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#"AssemblyVersion("1.5.0")"#));
    }
}
