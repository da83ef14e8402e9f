//! Version-bump executor: bumps one component, then cascades the change
//! through everything that depends on it.

use tracing::{error, info, info_span};

use crate::domain::{ComponentId, Version, VersionPart};
use crate::registry::ComponentRegistry;
use crate::ui::logger::DETAIL;

/// A version change that made it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBump {
    pub component: ComponentId,
    pub from: Version,
    pub to: Version,
}

/// A version change that could not be made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBump {
    pub component: ComponentId,
    /// `None` when the new version itself could not be computed
    pub to: Option<Version>,
    pub reason: String,
}

/// Everything one cascade did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpReport {
    pub applied: Vec<AppliedBump>,
    pub failed: Vec<FailedBump>,
    /// False when the root itself could not be bumped
    pub root_bumped: bool,
}

impl BumpReport {
    pub fn is_success(&self) -> bool {
        self.root_bumped
    }
}

/// Bump `root` by `part` and cascade to its transitive dependents.
///
/// A failure on the root stops the cascade. Failures on dependents are
/// logged and the remaining dependents are still processed. Nothing is
/// rolled back.
///
/// # Arguments
/// * `registry` - The scanned registry owning the components
/// * `root` - Component the operator asked to bump
/// * `part` - Version part to bump on the root
pub fn bump(
    registry: &mut ComponentRegistry,
    root: ComponentId,
    part: VersionPart,
) -> BumpReport {
    info!("Bumping versions. Affected version part: {} number", part);
    let _block = info_span!("bump").entered();

    let mut report = BumpReport::default();
    report.root_bumped = bump_up(registry, root, part, &mut report);
    if !report.root_bumped {
        return report;
    }

    let dependents: Vec<ComponentId> = registry
        .dependents_of(root)
        .iter()
        .filter(|&id| id != root)
        .collect();
    for dependent in dependents {
        let cascaded = registry.component(dependent).part_to_cascade_bump(part);
        bump_up(registry, dependent, cascaded, &mut report);
    }
    report
}

fn bump_up(
    registry: &mut ComponentRegistry,
    id: ComponentId,
    part: VersionPart,
    report: &mut BumpReport,
) -> bool {
    let from = registry.component(id).version;
    let name = registry.component(id).name.clone();
    let to = match from.bump(part) {
        Ok(to) => to,
        Err(e) => {
            error!("Could not bump component '{}' version: {}", name, e);
            report.failed.push(FailedBump {
                component: id,
                to: None,
                reason: e.to_string(),
            });
            return false;
        }
    };
    match registry.set_new_version(id, to) {
        Ok(()) => {
            info!(
                "Bumped component '{}' version from {} to {}",
                name, from, to
            );
            report.applied.push(AppliedBump {
                component: id,
                from,
                to,
            });
            true
        }
        Err(e) => {
            error!("Could not bump component '{}' version to {}", name, to);
            error!(target: DETAIL, "{}", e);
            report.failed.push(FailedBump {
                component: id,
                to: Some(to),
                reason: e.to_string(),
            });
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Component, ComponentKind, Reference, VersionSource};
    use crate::ui::logger::capture::capture;
    use crate::ui::logger::Verbosity;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn versioned(dir: &Path, name: &str, kind: ComponentKind, deps: &[&str]) -> Component {
        let path = dir.join(name).join(format!("{}.csproj", name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "<Project>\n  <PropertyGroup>\n    <ApplicationVersion>1.0.0</ApplicationVersion>\n  </PropertyGroup>\n</Project>\n",
        )
        .unwrap();
        let mut component = Component::new(name, &path, kind);
        component.version_source = VersionSource::Property {
            path: path.clone(),
            element: "ApplicationVersion".to_string(),
        };
        component.dependencies = deps
            .iter()
            .map(|d| Reference::project(dir.join(d).join(format!("{}.csproj", d))))
            .collect();
        component
    }

    fn id_named(registry: &ComponentRegistry, name: &str) -> ComponentId {
        registry
            .ids()
            .find(|&id| registry.component(id).name == name)
            .unwrap()
    }

    #[test]
    fn test_major_bump_cascades_patch_to_test_project() {
        let temp = TempDir::new().unwrap();
        let mut registry = ComponentRegistry::build(
            vec![
                versioned(temp.path(), "Core", ComponentKind::Library, &[]),
                versioned(temp.path(), "Core.Tests", ComponentKind::TestProject, &["Core"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");
        let tests = id_named(&registry, "Core.Tests");

        let (report, lines) = capture(Verbosity::Normal, || {
            bump(&mut registry, core, VersionPart::Major)
        });

        assert!(report.is_success());
        assert_eq!(registry.component(core).version, Version::new(2, 0, 0));
        assert_eq!(registry.component(tests).version, Version::new(1, 0, 1));
        let written = fs::read_to_string(&registry.component(tests).full_path).unwrap();
        assert!(written.contains("<ApplicationVersion>1.0.1</ApplicationVersion>"));
        assert!(lines.contains(&"    Bumped component 'Core' version from 1.0.0 to 2.0.0".to_string()));
    }

    #[test]
    fn test_library_dependents_follow_the_same_part() {
        let temp = TempDir::new().unwrap();
        let mut registry = ComponentRegistry::build(
            vec![
                versioned(temp.path(), "Core", ComponentKind::Library, &[]),
                versioned(temp.path(), "Data", ComponentKind::Library, &["Core"]),
                versioned(temp.path(), "App", ComponentKind::ConsoleApplication, &["Data"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let report = bump(&mut registry, core, VersionPart::Minor);

        assert_eq!(report.applied.len(), 3);
        assert_eq!(
            registry.component(id_named(&registry, "Data")).version,
            Version::new(1, 1, 0)
        );
        assert_eq!(
            registry.component(id_named(&registry, "App")).version,
            Version::new(1, 0, 1)
        );
    }

    #[test]
    fn test_dependent_failure_does_not_stop_cascade() {
        let temp = TempDir::new().unwrap();
        let mut broken = versioned(temp.path(), "Broken", ComponentKind::Library, &["Core"]);
        broken.version_source = VersionSource::Missing;
        let mut registry = ComponentRegistry::build(
            vec![
                versioned(temp.path(), "Core", ComponentKind::Library, &[]),
                broken,
                versioned(temp.path(), "Other", ComponentKind::Library, &["Core"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let (report, lines) = capture(Verbosity::Normal, || {
            bump(&mut registry, core, VersionPart::Patch)
        });

        assert!(report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].to, Some(Version::new(1, 0, 1)));
        assert_eq!(report.failed[0].component, id_named(&registry, "Broken"));
        assert_eq!(
            registry.component(id_named(&registry, "Other")).version,
            Version::new(1, 0, 1)
        );
        assert!(lines
            .iter()
            .any(|line| line.contains("ERROR: Could not bump component 'Broken' version to 1.0.1")));
    }

    #[test]
    fn test_root_failure_aborts_cascade() {
        let temp = TempDir::new().unwrap();
        let mut core = versioned(temp.path(), "Core", ComponentKind::Library, &[]);
        core.version_source = VersionSource::Missing;
        let mut registry = ComponentRegistry::build(
            vec![
                core,
                versioned(temp.path(), "Core.Tests", ComponentKind::TestProject, &["Core"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let report = bump(&mut registry, core, VersionPart::Major);

        assert!(!report.is_success());
        assert!(report.applied.is_empty());
        assert_eq!(
            registry.component(id_named(&registry, "Core.Tests")).version,
            Version::new(1, 0, 0)
        );
    }

    #[test]
    fn test_cycle_does_not_rebump_root() {
        let temp = TempDir::new().unwrap();
        let mut registry = ComponentRegistry::build(
            vec![
                versioned(temp.path(), "A", ComponentKind::Library, &["B"]),
                versioned(temp.path(), "B", ComponentKind::Library, &["A"]),
            ],
            vec![],
        );
        let a = id_named(&registry, "A");

        let report = bump(&mut registry, a, VersionPart::Major);

        assert_eq!(report.applied.len(), 2);
        assert_eq!(registry.component(a).version, Version::new(2, 0, 0));
        assert_eq!(
            registry.component(id_named(&registry, "B")).version,
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn test_none_part_is_a_resync() {
        let temp = TempDir::new().unwrap();
        let mut registry = ComponentRegistry::build(
            vec![versioned(temp.path(), "Core", ComponentKind::Library, &[])],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let report = bump(&mut registry, core, VersionPart::None);

        assert!(report.is_success());
        assert_eq!(registry.component(core).version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_overflowing_dependent_is_reported_and_cascade_goes_on() {
        let temp = TempDir::new().unwrap();
        let mut huge = versioned(temp.path(), "Huge", ComponentKind::TestProject, &["Core"]);
        huge.version = Version::new(1, 0, u64::MAX);
        let mut registry = ComponentRegistry::build(
            vec![
                versioned(temp.path(), "Core", ComponentKind::Library, &[]),
                huge,
                versioned(temp.path(), "Other", ComponentKind::Library, &["Core"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let (report, lines) = capture(Verbosity::Normal, || {
            bump(&mut registry, core, VersionPart::Major)
        });

        assert!(report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].component, id_named(&registry, "Huge"));
        assert_eq!(report.failed[0].to, None);
        assert!(report.failed[0].reason.contains("number overflow"));
        assert_eq!(
            registry.component(id_named(&registry, "Other")).version,
            Version::new(2, 0, 0)
        );
        assert!(lines
            .iter()
            .any(|line| line.contains("ERROR: Could not bump component 'Huge' version")));
    }

    #[test]
    fn test_overflowing_root_aborts_cascade() {
        let temp = TempDir::new().unwrap();
        let mut core = versioned(temp.path(), "Core", ComponentKind::Library, &[]);
        core.version = Version::parse_lenient("18446744073709551615.0.0").unwrap();
        let mut registry = ComponentRegistry::build(
            vec![
                core,
                versioned(temp.path(), "Core.Tests", ComponentKind::TestProject, &["Core"]),
            ],
            vec![],
        );
        let core = id_named(&registry, "Core");

        let report = bump(&mut registry, core, VersionPart::Major);

        assert!(!report.is_success());
        assert!(report.applied.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            registry.component(id_named(&registry, "Core.Tests")).version,
            Version::new(1, 0, 0)
        );
    }
}
