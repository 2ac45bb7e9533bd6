//! Prompt templates for file, batch and call-graph analysis

use crate::bridge::ChatMessage;

/// Shape every file analysis is asked to follow. The `## Overall Purpose`
/// heading and the bold function names are read back by batch digests.
pub const FILE_TEMPLATE: &str = r#"
# File Analysis

## Overall Purpose
[Provide a concise description of the file's main purpose and its role in the project]

## Main Functions
1. **[Function name]** - [Brief description of the function's purpose and key features]
2. **[Function name]** - [Brief description of the function's purpose and key features]
3. **[Function name]** - [Brief description of the function's purpose and key features]
[Continue listing main functions as needed]

## Notable patterns and potential issues
### [Category (e.g., Safety and Input Validation, Error Handling, Memory Management, etc.)]
- [Describe the pattern or issue]
- [Describe another pattern or issue in this category if applicable]

### [Another category]
- [Describe the pattern or issue]
[Continue listing categories and issues as needed]
"#;

pub const BATCH_TEMPLATE: &str = r#"
# Chunk Analysis

## Key Observations
[List the key observations about this chunk of the codebase]

## Common Patterns and Practices
[List and briefly describe any common coding patterns, practices, or conventions observed in this chunk]

## Potential Improvements
[Suggest potential areas for improvement in this chunk of the codebase]

## Notable Strengths
[Highlight any particularly strong aspects of this chunk of the codebase]
"#;

/// Messages for chunk `index` (1-based) of `total` of one file.
pub fn file_chunk_messages(
    file_path: &str,
    file_type: &str,
    chunk: &str,
    index: usize,
    total: usize,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a code analysis assistant for {} files. Analyze the provided code chunk and output your analysis following the given template exactly. Use markdown formatting.",
            file_type
        )),
        ChatMessage::user(format!(
            "Analyze the following {} file chunk ({}/{}):\n\nFile: {}\n\n{}\n\nUse this template for your response:\n{}",
            file_type, index, total, file_path, chunk, FILE_TEMPLATE
        )),
    ]
}

/// Messages for one second-tier batch digest.
pub fn batch_summary_messages(digest: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are a code analysis assistant specializing in analyzing codebases. Analyze the provided chunk summary and output your analysis following the given template exactly. Use markdown formatting.",
        ),
        ChatMessage::user(format!(
            "Analyze the following codebase chunk:\n\n{}\n\nUse this template for your response:\n{}",
            digest, BATCH_TEMPLATE
        )),
    ]
}

pub fn call_graph_messages(summary: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are a code analysis assistant. Analyze the given call graph summary and provide insights.",
        ),
        ChatMessage::user(format!(
            "Analyze the following call graph summary and provide insights on the codebase structure and potential areas for improvement:\n\n{}",
            summary
        )),
    ]
}
