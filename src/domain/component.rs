use std::fmt;
use std::path::{Component as PathPart, Path, PathBuf};

use crate::domain::version::{Version, VersionPart};
use crate::error::{Result, VersionBumperError};
use crate::factory::csharp::version_file;

/// Index of a component inside the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub usize);

/// Index of a solution inside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolutionId(pub usize);

/// What a component builds into; drives its cascade policy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Library,
    TestProject,
    ConsoleApplication,
    DesktopApplication,
    WebApplication,
    WebSite,
    /// Unrecognized `OutputType`, kept verbatim
    Other(String),
}

impl ComponentKind {
    /// Map an msbuild `OutputType` value to a kind
    pub fn from_output_type(output_type: &str) -> Self {
        match output_type.trim().to_lowercase().as_str() {
            "" | "library" => ComponentKind::Library,
            "exe" => ComponentKind::ConsoleApplication,
            "winexe" => ComponentKind::DesktopApplication,
            _ => ComponentKind::Other(output_type.trim().to_string()),
        }
    }

    pub fn is_library(&self) -> bool {
        matches!(self, ComponentKind::Library)
    }

    /// Which part this kind bumps when a dependency bumped `upstream`.
    ///
    /// Libraries follow their dependency's part; every other kind only
    /// takes a patch bump.
    pub fn part_to_cascade_bump(&self, upstream: VersionPart) -> VersionPart {
        if upstream == VersionPart::None {
            return VersionPart::None;
        }
        if self.is_library() {
            upstream
        } else {
            VersionPart::Patch
        }
    }

    pub fn label(&self) -> String {
        match self {
            ComponentKind::Library => "C# Library Project".to_string(),
            ComponentKind::TestProject => "C# Test Project".to_string(),
            ComponentKind::ConsoleApplication => "C# Console Application Project".to_string(),
            ComponentKind::DesktopApplication => "C# Desktop Application Project".to_string(),
            ComponentKind::WebApplication => "C# Web Project".to_string(),
            ComponentKind::WebSite => "C# Web Site".to_string(),
            ComponentKind::Other(output_type) => format!("C# {} Project", output_type),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A declared dependency, before the graph is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `<ProjectReference>` to another project file
    Project { name: String, path: PathBuf },
    /// Plain assembly or package reference
    Library { name: String },
}

impl Reference {
    pub fn project(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Reference::Project { name, path }
    }

    pub fn name(&self) -> &str {
        match self {
            Reference::Project { name, .. } | Reference::Library { name } => name,
        }
    }

    /// Identity key of the referenced project, if this points at one
    pub fn target_key(&self) -> Option<String> {
        match self {
            Reference::Project { path, .. } => Some(path_key(path)),
            Reference::Library { .. } => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Project { path, .. } => write!(f, "Project Reference: {}", path.display()),
            Reference::Library { name } => write!(f, "Library Reference: {}", name),
        }
    }
}

/// Where a component's authoritative version lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// A version property element (e.g. `<ApplicationVersion>`) in a project file
    Property { path: PathBuf, element: String },
    /// A source file with `[assembly: AssemblyVersion(...)]` attributes
    AssemblyInfo { path: PathBuf },
    Missing,
}

/// A discovered, versionable build artifact
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub description: String,
    pub full_path: PathBuf,
    pub kind: ComponentKind,
    pub version: Version,
    pub version_source: VersionSource,
    pub dependencies: Vec<Reference>,
    /// Load problem, if the backing file could not be parsed
    pub status: Option<String>,
    pub missing_files: Vec<PathBuf>,
    pub(crate) parents: Vec<SolutionId>,
}

impl Component {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>, kind: ComponentKind) -> Self {
        Component {
            name: name.into(),
            description: String::new(),
            full_path: normalize_path(&full_path.into()),
            kind,
            version: Version::default(),
            version_source: VersionSource::Missing,
            dependencies: Vec::new(),
            status: None,
            missing_files: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Identity: the normalized path, compared case-insensitively
    pub fn key(&self) -> String {
        path_key(&self.full_path)
    }

    pub fn parents(&self) -> &[SolutionId] {
        &self.parents
    }

    pub fn add_parent(&mut self, solution: SolutionId) {
        if !self.parents.contains(&solution) {
            self.parents.push(solution);
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_multi_owned(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn part_to_cascade_bump(&self, upstream: VersionPart) -> VersionPart {
        self.kind.part_to_cascade_bump(upstream)
    }

    /// Persist `version` to the component's version source, then adopt it.
    pub fn set_new_version(&mut self, version: Version) -> Result<()> {
        if version == self.version {
            return Ok(());
        }
        match &self.version_source {
            VersionSource::Property { path, element } => {
                version_file::write_version_property(path, element, version)?
            }
            VersionSource::AssemblyInfo { path } => {
                if !path.is_file() {
                    return Err(VersionBumperError::MissingVersionFile {
                        component: self.name.clone(),
                    });
                }
                version_file::write_assembly_info(path, version)?
            }
            VersionSource::Missing => {
                return Err(VersionBumperError::MissingVersionFile {
                    component: self.name.clone(),
                })
            }
        }
        self.version = version;
        Ok(())
    }

    /// Version suffix used in listings: `.1.2.3` for projects, ` (1.2.3)` for web sites
    pub fn version_tag(&self) -> String {
        match self.kind {
            ComponentKind::WebSite | ComponentKind::WebApplication => {
                format!(" ({})", self.version)
            }
            _ => format!(".{}", self.version),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Component {}

/// Case-insensitive identity key for a path
pub fn path_key(path: &Path) -> String {
    normalize_path(path).to_string_lossy().to_lowercase()
}

/// Lexically resolve `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for part in path.components() {
        match part {
            PathPart::CurDir => {}
            PathPart::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Join a project-relative path that may use Windows separators
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    let relative = if std::path::MAIN_SEPARATOR != '\\' {
        relative.replace('\\', "/")
    } else {
        relative.to_string()
    };
    normalize_path(&base.join(relative))
}
