//! Markdown rendering of a review for the PR conversation.

use crate::types::{Issue, ReviewResult};

pub const COMMENT_FOOTER: &str = "_Generated by CodeAssure - AI Code Review Assistant_\n";

/// Renders `review` as a PR comment. Pure and deterministic.
pub fn render_comment(review: &ReviewResult) -> String {
    let mut out = format!("## CodeAssure Review - {}\n\n", review.severity.label());
    out.push_str(&format!("### Summary\n{}\n\n", review.summary));

    if review.issues.is_empty() {
        out.push_str("### No Issues Found\n\n");
        out.push_str("The code looks good! No major issues detected.\n\n");
    } else {
        out.push_str(&format!("### Issues Found ({})\n\n", review.issues.len()));
        for (i, issue) in review.issues.iter().enumerate() {
            render_issue(&mut out, i + 1, issue);
        }
    }

    out.push_str(COMMENT_FOOTER);
    out
}

fn render_issue(out: &mut String, n: usize, issue: &Issue) {
    let title = issue.title.as_deref().unwrap_or(issue.kind.title_case());
    out.push_str(&format!(
        "#### {n}. [{}] {title}\n\n",
        issue.kind.as_str().to_ascii_uppercase()
    ));

    out.push_str(&format!("**File:** `{}`", issue.file));
    if let Some(line) = issue.line {
        out.push_str(&format!(" (Line {line})"));
    }
    out.push_str("\n\n");

    out.push_str(&format!("**Issue:** {}\n\n", issue.description));

    if let Some(fix) = &issue.suggestion {
        out.push_str(&format!("**Fix:** {fix}\n\n"));
    }
    if let Some(code) = &issue.code_example {
        let lang = issue.language.as_deref().unwrap_or("");
        out.push_str(&format!("```{lang}\n{code}\n```\n\n"));
    }

    out.push_str("---\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueKind, Severity};

    fn issue(kind: IssueKind, title: Option<&str>) -> Issue {
        Issue {
            kind,
            file: "src/app.py".into(),
            line: None,
            title: title.map(Into::into),
            description: "something is off".into(),
            suggestion: None,
            code_example: None,
            language: None,
        }
    }

    #[test]
    fn medium_with_two_issues() {
        let mut first = issue(IssueKind::Security, Some("SQL injection"));
        first.line = Some(12);
        first.suggestion = Some("use bound parameters".into());
        first.code_example = Some("cur.execute(q, (uid,))".into());
        first.language = Some("python".into());

        let review = ReviewResult {
            severity: Severity::Medium,
            summary: "two problems".into(),
            issues: vec![first, issue(IssueKind::Style, None)],
        };
        let md = render_comment(&review);

        assert!(md.starts_with("## CodeAssure Review - MEDIUM\n\n### Summary\ntwo problems\n\n"));
        assert!(md.contains("### Issues Found (2)\n\n"));
        assert!(md.contains("#### 1. [SECURITY] SQL injection\n\n**File:** `src/app.py` (Line 12)\n\n"));
        assert!(md.contains("**Fix:** use bound parameters\n\n```python\ncur.execute(q, (uid,))\n```\n\n---\n\n"));
        assert!(md.contains("#### 2. [STYLE] Style\n\n**File:** `src/app.py`\n\n"));
        assert!(!md.contains("#### 3."));
        assert_eq!(md.matches("---\n\n").count(), 2);
        assert!(md.ends_with(COMMENT_FOOTER));
    }

    #[test]
    fn empty_issue_list_uses_fixed_section() {
        let review = ReviewResult {
            severity: Severity::Low,
            summary: "Code looks good!".into(),
            issues: vec![],
        };
        assert_eq!(
            render_comment(&review),
            "## CodeAssure Review - LOW\n\n\
             ### Summary\nCode looks good!\n\n\
             ### No Issues Found\n\n\
             The code looks good! No major issues detected.\n\n\
             _Generated by CodeAssure - AI Code Review Assistant_\n"
        );
    }
}
