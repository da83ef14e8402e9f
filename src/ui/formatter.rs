//! Report formatting.
//!
//! Reports are logged through `tracing`, so they follow the selected
//! verbosity and nest under spans; only top-level errors bypass it.

use console::Style;
use tracing::{error, info, info_span, warn};

use crate::diagnostics::Diagnostic;
use crate::domain::ComponentId;
use crate::registry::ComponentRegistry;
use crate::ui::logger::DETAIL;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", Style::new().red().bold().apply_to("ERROR:"), message);
}

/// Print every component with its final version.
///
/// With `diagnostics`, projects declaring source files that are absent
/// on disk are followed by the list of those files.
pub fn display_final_versions(registry: &ComponentRegistry, diagnostics: bool) {
    info!("==========================");
    info!("Components final versions:");
    let _block = info_span!("final_versions").entered();
    for id in registry.ids() {
        info!("{}", registry.describe(id));
        let component = registry.component(id);
        if diagnostics && !component.missing_files.is_empty() {
            error!(
                target: DETAIL,
                "Missing files for project at {}",
                component.full_path.display()
            );
            for file in &component.missing_files {
                error!(target: DETAIL, "-- {}", file.display());
            }
        }
    }
}

/// Print the solutions found and, per solution, the entries that match
/// no discovered project together with same-named candidates.
pub fn display_solutions(registry: &ComponentRegistry) {
    info!("================");
    info!("Solutions found:");
    let _block = info_span!("solutions").entered();
    for solution in registry.solutions() {
        info!("{}", solution);
        if let Some(status) = &solution.status {
            error!(target: DETAIL, "{}", status);
        }
        if !solution.has_missing_projects() {
            continue;
        }
        let _inner = info_span!("missing_projects").entered();
        for missing in solution.missing_projects() {
            error!(
                target: DETAIL,
                "Missing project '{}' at {}",
                missing.project.name,
                missing.project.full_path.display()
            );
            for candidate in &missing.candidates {
                error!(target: DETAIL, "-- candidate: {}", registry.describe(*candidate));
            }
        }
    }
}

/// Print a list of anomalies, one warning each with its detail lines.
pub fn display_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        info!("No anomalies found");
        return;
    }
    info!("{} anomalies found:", diagnostics.len());
    let _block = info_span!("diagnostics").entered();
    for diagnostic in diagnostics {
        warn!("{}", diagnostic);
        let _inner = info_span!("details").entered();
        for detail in diagnostic.details() {
            info!("{}", detail);
        }
    }
}

/// Print the given components, one line each or in long form.
pub fn display_component_list(
    registry: &ComponentRegistry,
    ids: &[ComponentId],
    long: bool,
) {
    for &id in ids {
        if long {
            for line in registry.describe_long(id).lines() {
                info!("{}", line);
            }
        } else {
            info!("{}", registry.describe(id));
        }
    }
    info!("{} component(s) listed", ids.len());
}
