//! Structural parsing of model responses
//!
//! The model is prompted to emit a fixed textual shape (a `Subtasks:` list
//! and a python-fenced code block), so parsing is pattern-based, not
//! semantic. Both parse functions return tagged variants instead of bare
//! empties so callers decide the policy for a missing section.

use crate::protocol::prompt::{CODE_FENCE_CLOSE, CODE_FENCE_OPEN, CODE_MARKER, SUBTASKS_MARKER};

/// Outcome of looking for the subtask list in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskSection {
    /// Trimmed, non-empty lines of the list, in original order.
    Parsed(Vec<String>),
    /// The `Subtasks:` marker is absent. Soft condition: the caller
    /// degrades to a single implicit subtask.
    MissingMarker,
}

/// Outcome of looking for the fenced code block in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSection {
    /// Trimmed contents of the first python-tagged fence.
    Fenced(String),
    /// No python-tagged fence anywhere in the response.
    MissingFence,
    /// A fence was opened but never closed.
    UnterminatedFence,
}

/// Extract the ordered subtask list from a model response.
///
/// The list is the block of lines following the `Subtasks:` marker line,
/// terminated by a blank line, the `Code:` marker, or end of input. Lines
/// are trimmed; empty lines never appear in the result.
pub fn parse_subtasks(response: &str) -> SubtaskSection {
    let mut lines = response.lines();
    loop {
        match lines.next() {
            // The marker closes its line; leading prose on that line is fine.
            Some(line) if line.trim_end().ends_with(SUBTASKS_MARKER) => break,
            Some(_) => continue,
            None => return SubtaskSection::MissingMarker,
        }
    }

    let mut subtasks = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with(CODE_MARKER) {
            break;
        }
        subtasks.push(line.to_string());
    }
    SubtaskSection::Parsed(subtasks)
}

/// Extract the first python-fenced code block from a model response.
///
/// Returns the trimmed inner text. An empty fence counts as
/// [`CodeSection::MissingFence`]: there is nothing to execute either way.
pub fn extract_code(response: &str) -> CodeSection {
    let Some(open) = response.find(CODE_FENCE_OPEN) else {
        return CodeSection::MissingFence;
    };
    let after_tag = &response[open + CODE_FENCE_OPEN.len()..];

    // Code starts on the line after the opening fence.
    let Some(newline) = after_tag.find('\n') else {
        return CodeSection::UnterminatedFence;
    };
    let body = &after_tag[newline + 1..];

    let Some(close) = body.find(CODE_FENCE_CLOSE) else {
        return CodeSection::UnterminatedFence;
    };

    let code = body[..close].trim();
    if code.is_empty() {
        CodeSection::MissingFence
    } else {
        CodeSection::Fenced(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subtasks_in_order() {
        let response = "Subtasks:\n1. Install dependencies\n2. Write the script\n3. Run it\n\nCode:\n```python\nprint(1)\n```";
        let parsed = parse_subtasks(response);
        assert_eq!(
            parsed,
            SubtaskSection::Parsed(vec![
                "1. Install dependencies".to_string(),
                "2. Write the script".to_string(),
                "3. Run it".to_string(),
            ])
        );
    }

    #[test]
    fn missing_marker_is_reported() {
        assert_eq!(
            parse_subtasks("No list here, just prose."),
            SubtaskSection::MissingMarker
        );
    }

    #[test]
    fn blank_line_terminates_the_list() {
        let response = "Subtasks:\n1. First\n\nSome trailing prose\nthat is not a subtask";
        assert_eq!(
            parse_subtasks(response),
            SubtaskSection::Parsed(vec!["1. First".to_string()])
        );
    }

    #[test]
    fn code_marker_terminates_the_list_without_a_blank_line() {
        let response = "Subtasks:\n1. Only one\nCode:\n```python\nprint(1)\n```";
        assert_eq!(
            parse_subtasks(response),
            SubtaskSection::Parsed(vec!["1. Only one".to_string()])
        );
    }

    #[test]
    fn end_of_input_terminates_the_list() {
        let response = "Subtasks:\n1. First\n2. Second";
        assert_eq!(
            parse_subtasks(response),
            SubtaskSection::Parsed(vec!["1. First".to_string(), "2. Second".to_string()])
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let response = "Subtasks:\n   1. Padded   \n\t2. Tabbed\n";
        assert_eq!(
            parse_subtasks(response),
            SubtaskSection::Parsed(vec!["1. Padded".to_string(), "2. Tabbed".to_string()])
        );
    }

    #[test]
    fn extracts_the_fenced_code() {
        let response = "Code:\n```python\nprint(42)\n```\nDone.";
        assert_eq!(
            extract_code(response),
            CodeSection::Fenced("print(42)".to_string())
        );
    }

    #[test]
    fn inner_whitespace_is_trimmed() {
        let response = "```python\n\n  print(42)  \n\n```";
        assert_eq!(
            extract_code(response),
            CodeSection::Fenced("print(42)".to_string())
        );
    }

    #[test]
    fn only_the_first_fence_is_returned() {
        let response = "```python\nfirst()\n```\ntext\n```python\nsecond()\n```";
        assert_eq!(extract_code(response), CodeSection::Fenced("first()".to_string()));
    }

    #[test]
    fn missing_fence_is_reported() {
        assert_eq!(extract_code("no code at all"), CodeSection::MissingFence);
    }

    #[test]
    fn untagged_fence_does_not_count() {
        let response = "```\nprint(42)\n```";
        assert_eq!(extract_code(response), CodeSection::MissingFence);
    }

    #[test]
    fn unterminated_fence_is_reported() {
        let response = "```python\nprint(42)";
        assert_eq!(extract_code(response), CodeSection::UnterminatedFence);
    }

    #[test]
    fn empty_fence_counts_as_missing() {
        let response = "```python\n\n```";
        assert_eq!(extract_code(response), CodeSection::MissingFence);
    }

    #[test]
    fn multiline_code_is_preserved() {
        let response = "```python\nimport sys\n\nprint(sys.version)\n```";
        assert_eq!(
            extract_code(response),
            CodeSection::Fenced("import sys\n\nprint(sys.version)".to_string())
        );
    }
}
