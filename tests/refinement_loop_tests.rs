// Integration tests for the refinement loop
// These drive the engine end to end through a scripted backend, without HTTP

#[cfg(test)]
mod refinement_loop_tests {
    use async_trait::async_trait;
    use ideaforge_lib::llm::{
        CallOptions, ChatBackend, ChatRequest, LlmClient, LlmError, RetryPolicy,
    };
    use ideaforge_lib::prompts::PromptResolver;
    use ideaforge_lib::refinement::{
        draft_overview, LoopState, RefinementConfig, RefinementEngine,
    };
    use ideaforge_lib::{
        IdeaContext, Pillar, ProductOverview, Recommendation, FIELD_PLACEHOLDER,
    };
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Backend that replays a fixed list of replies in order
    struct QueueBackend {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
    }

    impl QueueBackend {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<QueueBackend> {
            Arc::new(QueueBackend {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for QueueBackend {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of replies")
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    /// Backend that never answers within any reasonable deadline
    struct StallingBackend;

    #[async_trait]
    impl ChatBackend for StallingBackend {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".to_string())
        }

        fn model(&self) -> &str {
            "stalling-model"
        }
    }

    fn pillar_reply(scores: &[f64; 7]) -> String {
        let pillars: Vec<serde_json::Value> = Pillar::all()
            .iter()
            .zip(scores)
            .map(|(pillar, score)| {
                json!({
                    "pillarId": pillar.as_str(),
                    "pillarName": pillar.display_name(),
                    "score": score,
                    "analysis": "analysis",
                    "strength": "strength",
                    "weakness": "weakness",
                    "improvementSuggestion": "suggestion",
                })
            })
            .collect();
        json!({ "pillars": pillars }).to_string()
    }

    fn fast_client(backend: Arc<dyn ChatBackend>) -> LlmClient {
        LlmClient::new(backend).with_retry(RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        })
    }

    fn idea() -> IdeaContext {
        IdeaContext {
            title: "Inventory radar".to_string(),
            summary: "Stock alerts for small web shops".to_string(),
            prior_feedback: None,
        }
    }

    fn document() -> ProductOverview {
        let mut doc = ProductOverview::default();
        doc.ensure_populated();
        doc.problem_summary = "Shop owners find out about empty shelves too late".to_string();
        doc
    }

    fn config(target: u8, cap: u32) -> RefinementConfig {
        RefinementConfig {
            target_confidence: target,
            max_iterations: cap,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_accepted_rewrite_lands_in_document_and_history() {
        // Scoring finds problem clarity weakest, the rewrite fixes it, and
        // the re-score reaches the target on the next pass
        let backend = QueueBackend::new(vec![
            Ok(pillar_reply(&[6.0, 3.0, 6.0, 6.0, 6.0, 6.0, 6.0])),
            Ok(json!({ "problemSummary": "Shelves go empty unnoticed for days" }).to_string()),
            Ok(pillar_reply(&[10.0; 7])),
        ]);
        let client = fast_client(backend);
        let mut resolver = PromptResolver::new();
        let mut engine = RefinementEngine::new(&client, &mut resolver, config(95, 6));

        let outcome = engine.run(&idea(), document()).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.final_state, LoopState::Done);
        assert_eq!(
            outcome.document.problem_summary,
            "Shelves go empty unnoticed for days"
        );

        assert_eq!(outcome.iterations.len(), 1);
        let iteration = &outcome.iterations[0];
        assert!(iteration.accepted);
        assert_eq!(iteration.pillar_impacted, Pillar::ProblemClarity);
        assert_eq!(iteration.score_delta, 7.0);
        assert!(iteration
            .before_section
            .contains("find out about empty shelves too late"));
        assert!(iteration.after_section.contains("unnoticed for days"));

        let snapshot = outcome.snapshot.expect("final snapshot");
        assert_eq!(snapshot.overall_confidence, 100);
        assert_eq!(snapshot.recommendation, Recommendation::Build);
    }

    #[tokio::test]
    async fn test_discarded_rewrite_leaves_document_untouched() {
        let original = document();
        let original_json = serde_json::to_string(&original).unwrap();

        // The rewrite makes the targeted pillar worse, so it must be dropped
        let backend = QueueBackend::new(vec![
            Ok(pillar_reply(&[6.0, 3.0, 6.0, 6.0, 6.0, 6.0, 6.0])),
            Ok(json!({ "problemSummary": "A vaguer statement" }).to_string()),
            Ok(pillar_reply(&[6.0, 2.0, 6.0, 6.0, 6.0, 6.0, 6.0])),
        ]);
        let client = fast_client(backend);
        let mut resolver = PromptResolver::new();
        let mut engine = RefinementEngine::new(&client, &mut resolver, config(95, 1));

        let outcome = engine.run(&idea(), original).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.iterations.len(), 1);
        assert!(!outcome.iterations[0].accepted);
        assert_eq!(outcome.iterations[0].score_delta, -1.0);

        // A discarded candidate must not leak a single field into the document
        assert_eq!(serde_json::to_string(&outcome.document).unwrap(), original_json);
        assert_eq!(outcome.snapshot.unwrap().overall_confidence, 56);
    }

    #[tokio::test]
    async fn test_iteration_cap_bounds_the_run() {
        // Flat scores keep every round at the cap-bound treadmill: the
        // rewrite never moves the needle but zero delta still counts as kept
        let backend = QueueBackend::new(vec![
            Ok(pillar_reply(&[5.0; 7])),
            Ok(json!({ "personas": ["Shop owner", "Warehouse lead"] }).to_string()),
            Ok(pillar_reply(&[5.0; 7])),
            Ok(json!({ "personas": ["Shop owner", "Ops manager"] }).to_string()),
            Ok(pillar_reply(&[5.0; 7])),
        ]);
        let client = fast_client(backend);
        let mut resolver = PromptResolver::new();
        let mut engine = RefinementEngine::new(&client, &mut resolver, config(95, 2));

        let outcome = engine.run(&idea(), document()).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.rounds_completed, 2);
        assert_eq!(outcome.iterations.len(), 2);
        assert_eq!(outcome.final_state, LoopState::Done);
        // All pillars tie at 5.0, so the fixed order picks audience fit both times
        assert_eq!(outcome.iterations[0].pillar_impacted, Pillar::AudienceFit);
        assert_eq!(outcome.iterations[1].pillar_impacted, Pillar::AudienceFit);
    }

    #[tokio::test]
    async fn test_provider_failure_mid_run_keeps_progress() {
        let backend = QueueBackend::new(vec![
            Ok(pillar_reply(&[6.0, 3.0, 6.0, 6.0, 6.0, 6.0, 6.0])),
            Err(LlmError::Provider {
                status: 500,
                body: "upstream overloaded".to_string(),
            }),
        ]);
        let client = fast_client(backend);
        let mut resolver = PromptResolver::new();
        let mut engine = RefinementEngine::new(&client, &mut resolver, config(95, 6));

        let outcome = engine.run(&idea(), document()).await;

        // The run aborts but the initial scoring is not thrown away
        let error = outcome.error.expect("run should surface the failure");
        assert!(error.contains("500"));
        assert_eq!(outcome.rounds_completed, 0);
        assert_eq!(outcome.final_state, LoopState::GenerateImprovement);
        assert_eq!(outcome.snapshot.unwrap().overall_confidence, 56);
        assert_eq!(outcome.pillar_results.len(), 7);
    }

    #[tokio::test]
    async fn test_timeout_reports_total_attempts() {
        let client = LlmClient::new(Arc::new(StallingBackend)).with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        });
        let options = CallOptions {
            timeout: Duration::from_millis(5),
            ..Default::default()
        };

        let result = client.call_json("system", "user", &options).await;

        match result {
            Err(LlmError::Timeout { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected a timeout, got {:?}", other.map(|r| r.data)),
        }
    }

    #[tokio::test]
    async fn test_draft_overview_backfills_missing_fields() {
        let backend = QueueBackend::new(vec![Ok(json!({
            "refinedPitch": "Restock alerts before the shelf is empty",
            "personas": ["Independent shop owner"],
        })
        .to_string())]);
        let client = fast_client(backend);
        let mut resolver = PromptResolver::new();

        let overview = draft_overview(&client, &mut resolver, &idea(), &CallOptions::default())
            .await
            .expect("draft should parse");

        assert_eq!(
            overview.refined_pitch,
            "Restock alerts before the shelf is empty"
        );
        assert_eq!(overview.personas, vec!["Independent shop owner"]);
        assert_eq!(overview.problem_summary, FIELD_PLACEHOLDER);
        assert!(overview.is_fully_populated());
    }
}
