//! Lenient decoding of the model's JSON reply.
//!
//! Models wrap JSON in markdown fences and drop fields; both are tolerated.
//! Anything that still fails to decode is reported to the caller.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Issue, IssueKind, ReviewResult, Severity};

pub const DEFAULT_SUMMARY: &str = "Code review completed";
pub const INVALID_FORMAT_SUMMARY: &str = "Analysis completed but response format was invalid";

#[derive(Debug, Deserialize)]
struct RawReview {
    severity: Option<String>,
    summary: Option<String>,
    issues: Option<Vec<RawIssue>>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(rename = "type")]
    kind: Option<String>,
    file: Option<String>,
    line: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    suggestion: Option<String>,
    code_example: Option<String>,
    language: Option<String>,
}

impl From<RawIssue> for Issue {
    fn from(r: RawIssue) -> Self {
        Issue {
            kind: r.kind.as_deref().map_or(IssueKind::Bug, IssueKind::parse),
            file: r.file.unwrap_or_else(|| "unknown".into()),
            line: r.line.as_ref().and_then(line_number),
            title: r.title.filter(|t| !t.trim().is_empty()),
            description: r.description.unwrap_or_default(),
            suggestion: r.suggestion.filter(|s| !s.trim().is_empty()),
            code_example: r.code_example.filter(|s| !s.trim().is_empty()),
            language: r.language,
        }
    }
}

/// Models send `12`, `"12"` or `null`; zero counts as absent.
fn line_number(v: &Value) -> Option<u32> {
    let n = match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    u32::try_from(n).ok().filter(|n| *n > 0)
}

/// Body of the first ```json fence, else of the first plain fence, else the input.
pub fn strip_code_fences(raw: &str) -> &str {
    let inner = if let Some((_, rest)) = raw.split_once("```json") {
        rest
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest
    } else {
        return raw.trim();
    };
    inner.split_once("```").map_or(inner, |(body, _)| body).trim()
}

/// Decodes a reply into a [`ReviewResult`], backfilling missing fields.
///
/// # Errors
/// Returns the decode error when the stripped text is not a JSON object
/// of the expected shape.
pub fn parse_review(raw: &str) -> Result<ReviewResult, serde_json::Error> {
    let body = strip_code_fences(raw);
    let parsed: RawReview = serde_json::from_str(body)?;

    Ok(ReviewResult {
        severity: parsed.severity.as_deref().map_or(Severity::Low, Severity::parse),
        summary: parsed
            .summary
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        issues: parsed
            .issues
            .unwrap_or_default()
            .into_iter()
            .map(Issue::from)
            .collect(),
    })
}

/// Low-severity result carrying one synthetic issue about the bad reply.
pub fn invalid_format_result(err: &serde_json::Error) -> ReviewResult {
    ReviewResult {
        severity: Severity::Low,
        summary: INVALID_FORMAT_SUMMARY.to_string(),
        issues: vec![Issue {
            kind: IssueKind::Error,
            file: "system".into(),
            line: None,
            title: Some("Parse Error".into()),
            description: format!("Could not parse AI response: {err}"),
            suggestion: None,
            code_example: None,
            language: None,
        }],
    }
}
