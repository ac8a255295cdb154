//! Prompt text for the review model.

use git_context_engine::CodeChange;

/// Changes included in one prompt; the rest are only counted.
pub const MAX_FILES_IN_PROMPT: usize = 5;

/// Patch characters kept per file.
pub const MAX_PATCH_CHARS: usize = 1000;

/// Fixed instruction: severity rubric plus the mandatory JSON shape.
pub const SYSTEM_PROMPT: &str = r#"You are a pragmatic code reviewer. Classify issues by severity:

**HIGH SEVERITY** (Critical - Must fix before merge):
- Security vulnerabilities (SQL injection, XSS, authentication bypass)
- Critical bugs that crash the application or cause data loss
- Memory leaks or severe performance issues
- Exposed secrets or credentials in code

**MEDIUM SEVERITY** (Important - Should fix soon):
- Non-critical bugs (edge cases, minor logic errors)
- Missing error handling that could cause issues
- Performance problems that slow things down but don't break
- Deprecated API usage
- Missing input validation (non-security critical)
- Code duplication that affects maintainability

**LOW SEVERITY** (Minor or no issues):
- Clean code with no functional issues
- Minor style inconsistencies
- Missing documentation
- Code that works correctly but could be improved

Response format (JSON only):
{
"severity": "high|medium|low",
"summary": "brief explanation",
"issues": [
    {
    "type": "bug|security|performance|style",
    "file": "filename",
    "line": number,
    "title": "issue title",
    "description": "what's wrong",
    "suggestion": "how to fix"
    }
]
}
If no issues found, return: {"severity": "low", "summary": "Code looks good!", "issues": []}
"#;

/// Builds the user prompt from the first few changes and optional context.
pub fn build_analysis_prompt(changes: &[CodeChange], context: &str) -> String {
    let mut s = String::from("Review the following code changes:\n\n");

    for change in changes.iter().take(MAX_FILES_IN_PROMPT) {
        s.push_str(&format!(
            "### File: `{}` ({})\n",
            change.filename, change.language
        ));
        s.push_str(&format!(
            "**Changes:** +{} -{}\n\n",
            change.additions, change.deletions
        ));
        s.push_str("```diff\n");
        s.extend(change.patch.chars().take(MAX_PATCH_CHARS));
        s.push_str("\n```\n\n");
    }

    if changes.len() > MAX_FILES_IN_PROMPT {
        s.push_str(&format!(
            "_(and {} more files)_\n",
            changes.len() - MAX_FILES_IN_PROMPT
        ));
    }

    if !context.is_empty() {
        s.push_str("\n\n## Existing Codebase Patterns:\n");
        s.push_str(context);
    }
    s
}
