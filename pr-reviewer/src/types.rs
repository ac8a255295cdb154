//! Review data model.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    #[default]
    Low,
}

impl Severity {
    /// Lenient parse; anything unrecognised is `Low`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Uppercase label used in comment headers.
    pub fn label(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Bug,
    Security,
    Performance,
    Style,
    /// Synthetic issue describing a failure of the review itself.
    Error,
}

impl IssueKind {
    /// Unknown kinds from the model are filed as bugs.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "security" => IssueKind::Security,
            "performance" => IssueKind::Performance,
            "style" => IssueKind::Style,
            "error" => IssueKind::Error,
            _ => IssueKind::Bug,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Bug => "bug",
            IssueKind::Security => "security",
            IssueKind::Performance => "performance",
            IssueKind::Style => "style",
            IssueKind::Error => "error",
        }
    }

    /// `Bug`, `Security`, ... for headings without a title.
    pub fn title_case(self) -> &'static str {
        match self {
            IssueKind::Bug => "Bug",
            IssueKind::Security => "Security",
            IssueKind::Performance => "Performance",
            IssueKind::Style => "Style",
            IssueKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    /// Fence language for `code_example`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Structured outcome of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub severity: Severity,
    pub summary: String,
    pub issues: Vec<Issue>,
}

/// One PR analysis request, from a webhook delivery or a manual trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestTask {
    /// `owner/name`.
    pub repo: String,
    pub pr_number: u64,
    pub pr_url: String,
    pub base_sha: String,
    pub head_sha: String,
    pub user_id: Option<i64>,
}
