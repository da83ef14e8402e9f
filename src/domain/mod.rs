//! Domain model - versions, components, solutions and name matching

pub mod component;
pub mod matching;
pub mod solution;
pub mod version;

pub use component::{
    Component, ComponentId, ComponentKind, Reference, SolutionId, VersionSource,
};
pub use matching::NamePattern;
pub use solution::{MissingProject, ProjectInSolution, Solution};
pub use version::{Version, VersionPart};
