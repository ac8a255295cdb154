//! One PR analysis run: fetch, retrieve context, review, persist, comment.
//!
//! Stages run strictly in sequence. Runs for the same PR are not serialised
//! against each other.

use std::sync::Arc;

use git_context_engine::PullRequestHost;
use rag_store::RagStore;
use review_store::{NewReview, ReviewStore, STATUS_COMPLETED};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::PrResult;
use crate::publish::render_comment;
use crate::review::llm::ChatModel;
use crate::review::{EngineOutcome, ReviewEngine, ReviewVerdict};
use crate::types::{PullRequestTask, Severity};

/// Terminal state of [`Pipeline::analyze_pr`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    NoChanges,
    Success { review_id: i64, severity: Severity },
    Error { message: String },
}

/// Process-wide collaborators, built once at startup.
pub struct Pipeline {
    host: Arc<dyn PullRequestHost>,
    rag: Arc<RagStore>,
    engine: ReviewEngine,
    store: ReviewStore,
}

impl Pipeline {
    pub fn new(
        host: Arc<dyn PullRequestHost>,
        rag: Arc<RagStore>,
        llm: Arc<dyn ChatModel>,
        store: ReviewStore,
    ) -> Self {
        Self {
            host,
            rag,
            engine: ReviewEngine::new(llm),
            store,
        }
    }

    /// Runs the whole analysis. Never fails; errors become [`AnalysisOutcome::Error`].
    pub async fn analyze_pr(&self, task: &PullRequestTask) -> AnalysisOutcome {
        info!(repo = %task.repo, pr = task.pr_number, "analysis started");

        match self.run(task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(repo = %task.repo, pr = task.pr_number, error = %e, "analysis failed");
                AnalysisOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn run(&self, task: &PullRequestTask) -> PrResult<AnalysisOutcome> {
        let changes = self.host.fetch_changes(&task.repo, task.pr_number).await;
        if changes.is_empty() {
            warn!(repo = %task.repo, pr = task.pr_number, "no reviewable changes");
            return Ok(AnalysisOutcome::NoChanges);
        }
        for c in &changes {
            info!(file = %c.filename, language = %c.language, "change queued for review");
        }

        let context = self.rag.get_context(&task.repo, &changes).await;
        if !context.is_empty() {
            info!(chars = context.len(), "codebase context added");
        }

        let verdict = match self.engine.review(&changes, &context).await {
            EngineOutcome::NoChanges => return Ok(AnalysisOutcome::NoChanges),
            EngineOutcome::Reviewed(v) => v,
        };
        match &verdict {
            ReviewVerdict::Parsed(_) => {}
            ReviewVerdict::MalformedResponse(_) => warn!("storing degraded review: malformed reply"),
            ReviewVerdict::ProviderFailure(_) => warn!("storing degraded review: model unavailable"),
        }
        let result = verdict.into_result();

        let review_id = self
            .store
            .create_review(NewReview {
                user_id: task.user_id,
                repo_name: task.repo.clone(),
                pr_number: task.pr_number,
                pr_url: task.pr_url.clone(),
                severity: result.severity.as_str().to_string(),
                summary: result.summary.clone(),
                issues: serde_json::to_value(&result.issues)?,
                status: STATUS_COMPLETED.to_string(),
            })
            .await?;
        info!(review_id, severity = %result.severity, issues = result.issues.len(), "review saved");

        let comment = render_comment(&result);
        match self.host.post_comment(&task.repo, task.pr_number, &comment).await {
            Ok(()) => info!(repo = %task.repo, pr = task.pr_number, "review comment posted"),
            Err(e) => warn!(repo = %task.repo, pr = task.pr_number, error = %e, "posting review comment failed"),
        }

        Ok(AnalysisOutcome::Success {
            review_id,
            severity: result.severity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind};
    use git_context_engine::errors::GitContextEngineProviderError;
    use git_context_engine::{
        BoxFuture, CodeChange, GitContextEngineError, GitContextEngineResult, Language,
    };
    use rag_store::{EmbeddingStore, EmbeddingsProvider, RagError, VectorSpace};
    use serde_json::json;

    use crate::review::API_FAILURE_SUMMARY;
    use crate::review::parser::INVALID_FORMAT_SUMMARY;

    struct FakeHost {
        changes: Vec<CodeChange>,
        fail_post: bool,
        posted: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn with(changes: Vec<CodeChange>) -> Self {
            Self {
                changes,
                fail_post: false,
                posted: Mutex::new(Vec::new()),
            }
        }
    }

    impl PullRequestHost for FakeHost {
        fn fetch_changes<'a>(&'a self, _repo: &'a str, _pr: u64) -> BoxFuture<'a, Vec<CodeChange>> {
            Box::pin(async move { self.changes.clone() })
        }

        fn post_comment<'a>(
            &'a self,
            _repo: &'a str,
            _pr: u64,
            body: &'a str,
        ) -> BoxFuture<'a, GitContextEngineResult<()>> {
            Box::pin(async move {
                if self.fail_post {
                    return Err(GitContextEngineError::from(GitContextEngineProviderError::Forbidden));
                }
                self.posted.lock().unwrap().push(body.to_string());
                Ok(())
            })
        }
    }

    /// Replies with a fixed text, or fails when `reply` is `None`.
    struct FakeChat {
        reply: Option<String>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeChat {
        fn replying(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(Into::into),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatModel for FakeChat {
        fn complete<'a>(
            &'a self,
            _system: &'a str,
            prompt: &'a str,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Box::pin(async move {
                self.reply.clone().ok_or_else(|| {
                    AiLlmError::from(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))
                })
            })
        }
    }

    struct NoEmbeddings;

    impl EmbeddingsProvider for NoEmbeddings {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>
        {
            Box::pin(async { Ok(vec![0.0; 4]) })
        }
    }

    fn change(name: &str) -> CodeChange {
        CodeChange {
            filename: name.into(),
            patch: "@@ -1 +1 @@\n-a\n+b".into(),
            additions: 1,
            deletions: 1,
            language: Language::Python,
        }
    }

    fn task() -> PullRequestTask {
        PullRequestTask {
            repo: "acme/api".into(),
            pr_number: 9,
            pr_url: "https://github.com/acme/api/pull/9".into(),
            base_sha: "main".into(),
            head_sha: "branch".into(),
            user_id: None,
        }
    }

    async fn pipeline(host: Arc<FakeHost>, chat: Arc<FakeChat>) -> (Pipeline, ReviewStore) {
        let store = ReviewStore::open_in_memory().await.unwrap();
        let rag = Arc::new(RagStore::new(
            EmbeddingStore::Unconfigured,
            Arc::new(NoEmbeddings),
            VectorSpace::default(),
        ));
        (Pipeline::new(host, rag, chat, store.clone()), store)
    }

    #[tokio::test]
    async fn no_changes_skips_model_and_storage() {
        let host = Arc::new(FakeHost::with(vec![]));
        let chat = Arc::new(FakeChat::replying(Some("{}")));
        let (p, store) = pipeline(host.clone(), chat.clone()).await;

        assert_eq!(p.analyze_pr(&task()).await, AnalysisOutcome::NoChanges);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
        assert!(store.list_reviews(None).await.unwrap().is_empty());
        assert!(host.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn parsed_review_is_stored_and_posted() {
        let host = Arc::new(FakeHost::with(vec![change("app.py")]));
        let chat = Arc::new(FakeChat::replying(Some(
            "```json\n{\"severity\":\"high\",\"summary\":\"leak\",\"issues\":[{\"type\":\"security\",\"file\":\"app.py\",\"description\":\"token logged\"}]}\n```",
        )));
        let (p, store) = pipeline(host.clone(), chat.clone()).await;

        let outcome = p.analyze_pr(&task()).await;
        let AnalysisOutcome::Success { review_id, severity } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(severity, Severity::High);

        let saved = store.get_review(review_id).await.unwrap().unwrap();
        assert_eq!(saved.severity, "high");
        assert_eq!(saved.status, "completed");
        assert_eq!(saved.issues, json!([{"type":"security","file":"app.py","description":"token logged"}]));

        let posted = host.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].starts_with("## CodeAssure Review - HIGH"));
        assert!(chat.prompts.lock().unwrap()[0].contains("### File: `app.py` (python)"));
    }

    #[tokio::test]
    async fn malformed_reply_is_degraded_not_failed() {
        let host = Arc::new(FakeHost::with(vec![change("app.py")]));
        let chat = Arc::new(FakeChat::replying(Some("not json at all")));
        let (p, store) = pipeline(host.clone(), chat).await;

        let outcome = p.analyze_pr(&task()).await;
        assert!(matches!(outcome, AnalysisOutcome::Success { severity: Severity::Low, .. }));

        let saved = &store.list_reviews(None).await.unwrap()[0];
        assert_eq!(saved.summary, INVALID_FORMAT_SUMMARY);
        assert_eq!(saved.issues[0]["type"], "error");
        assert!(host.posted.lock().unwrap()[0].contains("[ERROR] Parse Error"));
    }

    #[tokio::test]
    async fn model_failure_is_degraded_not_failed() {
        let host = Arc::new(FakeHost::with(vec![change("app.py")]));
        let chat = Arc::new(FakeChat::replying(None));
        let (p, store) = pipeline(host.clone(), chat).await;

        assert!(matches!(p.analyze_pr(&task()).await, AnalysisOutcome::Success { .. }));
        let saved = &store.list_reviews(None).await.unwrap()[0];
        assert_eq!(saved.summary, API_FAILURE_SUMMARY);
        assert_eq!(saved.issues, json!([]));
        assert_eq!(host.posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_comment_still_succeeds() {
        let mut fake = FakeHost::with(vec![change("app.py")]);
        fake.fail_post = true;
        let host = Arc::new(fake);
        let chat = Arc::new(FakeChat::replying(Some("{\"severity\":\"medium\"}")));
        let (p, store) = pipeline(host, chat).await;

        let outcome = p.analyze_pr(&task()).await;
        assert!(matches!(outcome, AnalysisOutcome::Success { severity: Severity::Medium, .. }));
        assert_eq!(store.list_reviews(None).await.unwrap().len(), 1);
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let v = serde_json::to_value(AnalysisOutcome::Success {
            review_id: 3,
            severity: Severity::High,
        })
        .unwrap();
        assert_eq!(v, json!({"status": "success", "review_id": 3, "severity": "high"}));
        assert_eq!(
            serde_json::to_value(AnalysisOutcome::NoChanges).unwrap(),
            json!({"status": "no_changes"})
        );
    }
}
