//! Prompt construction for the agent loop
//!
//! Every prompt that expects code back restates the output contract, because
//! the parser matches the markers structurally. Changing any marker here is
//! a contract change: bump [`PROMPT_CONTRACT_VERSION`] and keep
//! [`crate::protocol::parser`] in sync.

use crate::groq::ChatMessage;

/// Version of the marker contract shared between prompts and parser.
pub const PROMPT_CONTRACT_VERSION: u32 = 1;

/// Marker line that opens the subtask list.
pub const SUBTASKS_MARKER: &str = "Subtasks:";
/// Marker line that announces the code section.
pub const CODE_MARKER: &str = "Code:";
/// Opening fence of the executable block.
pub const CODE_FENCE_OPEN: &str = "```python";
/// Closing fence of the executable block.
pub const CODE_FENCE_CLOSE: &str = "```";

/// The fixed workflow instruction for the system prompt.
const DEFAULT_WORKFLOW_PREAMBLE: &str = "\
You are an AI programming assistant that follows this strict workflow:
1. Task Analysis - break complex tasks into sequential subtasks (if necessary)
2. Environment Preparation - identify required tools/packages
3. Code Generation - write executable Python code for the current subtask
4. Error Correction - if errors occur, analyze and fix the code
5. Iterate - repeat until all subtasks are completed";

/// Required response shape, appended to every code-requesting prompt.
const OUTPUT_CONTRACT: &str = "\
First, list the subtasks in order. Then generate code ONLY for the first subtask.
Output format:
Subtasks:
1. [subtask 1]
2. [subtask 2]
...

Code:
```python
[code here]
```

Always prefer to perform an action using the subprocess module if possible. If not, use other Python code.
Always return some code. Never return a blank response.";

/// Build the initial message sequence for a task.
///
/// `preamble` replaces the default workflow instruction when set; the task
/// line and the output contract are always appended so the parser's markers
/// survive any override.
pub fn initial_prompt(task: &str, preamble: Option<&str>) -> Vec<ChatMessage> {
    let preamble = preamble.unwrap_or(DEFAULT_WORKFLOW_PREAMBLE);
    vec![ChatMessage::system(format!(
        "{preamble}\n\nCurrent Task: {task}\n\n{OUTPUT_CONTRACT}"
    ))]
}

/// Build the user message requesting code for the next subtask.
///
/// `completed` is the number of subtasks finished so far; `next` is the
/// description of the subtask to generate code for.
pub fn next_subtask_prompt(completed: usize, total: usize, next: &str) -> ChatMessage {
    ChatMessage::user(format!(
        "Current task progress: Completed subtask {completed}/{total}\n\n\
         Next subtask: {next}\n\n\
         Generate code for this subtask:"
    ))
}

/// Build the error-recovery message after a failed execution.
///
/// Carries the failed code and the captured error, and demands a corrected
/// block in the same fenced shape so re-extraction works unchanged.
pub fn repair_prompt(code: &str, error: &str) -> ChatMessage {
    ChatMessage::user(format!(
        "Code failed with error:\n{error}\n\n\
         Original code:\n{CODE_FENCE_OPEN}\n{code}\n{CODE_FENCE_CLOSE}\n\n\
         Please:\n\
         1. Analyze the error\n\
         2. Explain the fix\n\
         3. Provide corrected code\n\n\
         Output format:\n\
         Analysis: [analysis]\n\
         Fix: [explanation]\n\
         {CODE_MARKER}\n\
         {CODE_FENCE_OPEN}\n\
         [corrected code]\n\
         {CODE_FENCE_CLOSE}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parser::{extract_code, parse_subtasks, CodeSection, SubtaskSection};

    #[test]
    fn contract_text_carries_the_parser_markers() {
        assert!(OUTPUT_CONTRACT.contains(SUBTASKS_MARKER));
        assert!(OUTPUT_CONTRACT.contains(CODE_MARKER));
        assert!(OUTPUT_CONTRACT.contains(CODE_FENCE_OPEN));
    }

    #[test]
    fn initial_prompt_is_one_system_message() {
        let messages = initial_prompt("print the number 42", None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Current Task: print the number 42"));
        assert!(messages[0].content.contains(SUBTASKS_MARKER));
        assert!(messages[0].content.contains(CODE_FENCE_OPEN));
    }

    #[test]
    fn preamble_override_keeps_the_contract() {
        let messages = initial_prompt("do things", Some("You are a terse code generator."));
        assert!(messages[0].content.starts_with("You are a terse code generator."));
        assert!(messages[0].content.contains(SUBTASKS_MARKER));
        assert!(messages[0].content.contains(CODE_FENCE_OPEN));
    }

    #[test]
    fn next_subtask_prompt_references_progress() {
        let message = next_subtask_prompt(1, 3, "2. Write the script");
        assert_eq!(message.role, "user");
        assert!(message.content.contains("Completed subtask 1/3"));
        assert!(message.content.contains("Next subtask: 2. Write the script"));
    }

    #[test]
    fn repair_prompt_embeds_code_and_error() {
        let message = repair_prompt("print(x)", "NameError: name 'x' is not defined\nExit code: 1");
        assert_eq!(message.role, "user");
        assert!(message.content.contains("print(x)"));
        assert!(message.content.contains("NameError"));
        assert!(message.content.contains(CODE_FENCE_OPEN));
    }

    // A response shaped exactly as the contract demands must round-trip
    // through the parser.
    #[test]
    fn contract_shaped_response_parses() {
        let response = format!(
            "{SUBTASKS_MARKER}\n1. Print the number\n\n{CODE_MARKER}\n{CODE_FENCE_OPEN}\nprint(42)\n{CODE_FENCE_CLOSE}"
        );
        assert_eq!(
            parse_subtasks(&response),
            SubtaskSection::Parsed(vec!["1. Print the number".to_string()])
        );
        assert_eq!(extract_code(&response), CodeSection::Fenced("print(42)".to_string()));
    }
}
