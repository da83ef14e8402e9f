//! Case-insensitive regular-expression matching over component and
//! solution names.
//!
//! A pattern is matched against the whole name the way `Regex::is_match`
//! does, so a bare `Core` also matches `Core.Tests`; callers that want an
//! exact match anchor the pattern (`^Core$`). Empty or whitespace-only
//! patterns match everything.

use regex::{Regex, RegexBuilder};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Option<Regex>,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Ok(NamePattern { regex: None });
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .ignore_whitespace(true)
            .build()?;
        Ok(NamePattern { regex: Some(regex) })
    }

    /// Pattern matching exactly `name` (regex metacharacters escaped).
    pub fn exact(name: &str) -> Self {
        let regex = RegexBuilder::new(&format!("^{}$", regex::escape(name)))
            .case_insensitive(true)
            .build()
            .ok();
        NamePattern { regex }
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(name),
            None => true,
        }
    }
}
