//! Component factories: turn the files of one directory into components.
//!
//! The registry only knows the [`ComponentsFactory`] contract; file
//! formats live in the implementations (see [`csharp`]).

pub mod csharp;

use std::path::Path;

use crate::domain::{Component, Solution};
use crate::error::Result;

pub use csharp::CSharpComponentsFactory;

/// Produces components found directly in a directory (never recursing)
pub trait ComponentsFactory {
    /// Components backed by files directly inside `dir`
    fn find_components_in(&self, dir: &Path) -> Result<Vec<Component>>;

    /// Solutions whose files sit directly inside `dir`
    fn find_solutions_in(&self, _dir: &Path) -> Result<Vec<Solution>> {
        Ok(Vec::new())
    }
}
