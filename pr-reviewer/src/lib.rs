//! Pull-request review: prompt building, model call, result parsing,
//! comment rendering and the end-to-end analysis pipeline.

pub mod errors;
pub mod pipeline;
pub mod publish;
pub mod review;
pub mod types;

pub use errors::{PrResult, ReviewError};
pub use pipeline::{AnalysisOutcome, Pipeline};
pub use publish::render_comment;
pub use review::llm::ChatModel;
pub use review::{EngineOutcome, ReviewEngine, ReviewVerdict};
pub use types::{Issue, IssueKind, PullRequestTask, ReviewResult, Severity};
