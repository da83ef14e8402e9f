//! User interface module - logging, report formatting and prompts.
//!
//! Separates concerns:
//! - `logger` - `tracing` subscriber setup with span-indented output
//! - `formatter` - Report printing
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

use crate::error::Result;

pub mod formatter;
pub mod logger;

pub use formatter::{
    display_component_list, display_diagnostics, display_error, display_final_versions,
    display_solutions,
};
pub use logger::Verbosity;

/// Above this many matches the operator is asked for a narrower pattern
pub const MAX_CHOICES: usize = 20;

/// Outcome of asking the operator to pick one of several components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Index into the candidate list
    Picked(usize),
    Abandoned,
    /// Nothing to choose from, or too much
    Refused(String),
}

/// Prompts the operator to pick one component among `candidates`.
///
/// Displays a numbered list and reads 1-based indexes until a valid one
/// is typed. `0` or end of input abandons the choice.
///
/// # Arguments
/// * `pattern` - The pattern the operator typed, used in messages
/// * `candidates` - One-line descriptions of the matching components
/// * `input` - Where answers are read from
/// * `output` - Where the list and prompt are written
pub fn prompt_selection<R: BufRead, W: Write>(
    pattern: &str,
    candidates: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<Selection> {
    if candidates.len() > MAX_CHOICES {
        return Ok(Selection::Refused(format!(
            "Too many components match the pattern '{}': {}. Try another pattern!",
            pattern,
            candidates.len()
        )));
    }
    if candidates.is_empty() {
        return Ok(Selection::Refused(format!(
            "No components match the pattern '{}'. Try another pattern!",
            pattern
        )));
    }

    writeln!(output, "Select from this list:")?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(output, "[{:04}] {}", i + 1, candidate)?;
    }
    loop {
        write!(output, "Type 1-{}, 0 to abandon: ", candidates.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Selection::Abandoned);
        }
        match line.trim().parse::<usize>() {
            Ok(0) => return Ok(Selection::Abandoned),
            Ok(index) if index <= candidates.len() => return Ok(Selection::Picked(index - 1)),
            _ => writeln!(output, "Invalid selection '{}'", line.trim())?,
        }
    }
}

/// [`prompt_selection`] on the terminal
pub fn select_component(pattern: &str, candidates: &[String]) -> Result<Selection> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_selection(pattern, candidates, &mut input, &mut output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn candidates(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("Component{}", i)).collect()
    }

    fn run(answers: &str, candidates: &[String]) -> (Selection, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let selection = prompt_selection("Comp", candidates, &mut input, &mut output).unwrap();
        (selection, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_picks_by_one_based_index() {
        let (selection, output) = run("2\n", &candidates(3));
        assert_eq!(selection, Selection::Picked(1));
        assert!(output.contains("[0001] Component1"));
        assert!(output.contains("[0003] Component3"));
        assert!(output.contains("Type 1-3, 0 to abandon: "));
    }

    #[test]
    fn test_reprompts_on_invalid_input() {
        let (selection, output) = run("x\n7\n3\n", &candidates(3));
        assert_eq!(selection, Selection::Picked(2));
        assert!(output.contains("Invalid selection 'x'"));
        assert!(output.contains("Invalid selection '7'"));
    }

    #[test]
    fn test_zero_abandons() {
        let (selection, _) = run("0\n", &candidates(2));
        assert_eq!(selection, Selection::Abandoned);
    }

    #[test]
    fn test_end_of_input_abandons() {
        let (selection, _) = run("", &candidates(2));
        assert_eq!(selection, Selection::Abandoned);
    }

    #[test]
    fn test_refuses_empty_and_oversized_lists() {
        let (selection, output) = run("1\n", &[]);
        assert!(matches!(selection, Selection::Refused(ref m) if m.contains("No components match")));
        assert!(output.is_empty());

        let (selection, _) = run("1\n", &candidates(MAX_CHOICES + 1));
        assert!(matches!(selection, Selection::Refused(ref m) if m.contains("Too many components")));
    }
}
