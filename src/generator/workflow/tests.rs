#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::CompareError;
    use crate::generator::context::GeneratorContext;
    use crate::generator::workflow::{ComparisonWorkflow, TimingScope, run_guarded, validate_request};
    use crate::llm::TextGenerator;
    use crate::logging::{LogLevel, RequestLog};
    use crate::session::{SessionStatus, SessionStore};
    use crate::sources::{ProductSource, SourceError, SourceRegistry};
    use crate::types::{ComparisonRequest, ProductRecord};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct CountingSource {
        id: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProductSource for CountingSource {
        fn id(&self) -> &str {
            self.id
        }

        async fn fetch(&self, _product_name: &str) -> Result<ProductRecord, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Status(502))
        }
    }

    #[derive(Default)]
    struct CountingLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingLlm {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("connection refused"))
        }
    }

    struct PanickingLlm;

    #[async_trait]
    impl TextGenerator for PanickingLlm {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
            panic!("model client invariant violated")
        }
    }

    fn config_with_key(key: &str) -> Config {
        let mut config = Config::default();
        config.llm.api_key = key.to_string();
        config
    }

    fn methods(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    struct Fixture {
        context: GeneratorContext,
        source: Arc<CountingSource>,
        llm: Arc<CountingLlm>,
    }

    fn fixture(api_key: &str) -> Fixture {
        let source = Arc::new(CountingSource {
            id: "puppeteer",
            ..Default::default()
        });
        let llm = Arc::new(CountingLlm::default());
        let context = GeneratorContext::with_parts(
            config_with_key(api_key),
            llm.clone(),
            SourceRegistry::new(vec![source.clone()]),
        );
        Fixture {
            context,
            source,
            llm,
        }
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request(&ComparisonRequest::new("A", "B", methods(&["x"]))).is_ok());
        assert!(validate_request(&ComparisonRequest::new(" ", "B", methods(&["x"]))).is_err());
        assert!(validate_request(&ComparisonRequest::new("A", "", methods(&["x"]))).is_err());
        assert!(validate_request(&ComparisonRequest::new("A", "B", vec![])).is_err());
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_completes() {
        // 默认配置的三个数据源都没有抓取地址，必然失败
        let context = GeneratorContext::with_parts(
            config_with_key("sk-test"),
            Arc::new(CountingLlm::default()),
            SourceRegistry::from_config(&Config::default().sources).unwrap(),
        );
        let log = RequestLog::new();
        let request = ComparisonRequest::new(
            "iPhone 15 Pro",
            "Samsung Galaxy S24 Ultra",
            methods(&["puppeteer", "playwright", "selenium"]),
        );

        let result = ComparisonWorkflow::new(&context, &log)
            .run(&request)
            .await
            .unwrap();

        let phone_features = context.config.fallback.phone.features.clone();
        for product in [&result.product1, &result.product2] {
            assert_eq!(
                product.specifications.get("Type").map(String::as_str),
                Some("Smartphone")
            );
            assert_eq!(product.features, phone_features);
        }
        assert_eq!(result.product1.name, "iPhone 15 Pro");
        assert_eq!(result.product2.name, "Samsung Galaxy S24 Ultra");

        for text in [&result.comparison, &result.readme] {
            assert!(text.contains("iPhone 15 Pro"));
            assert!(text.contains("Samsung Galaxy S24 Ultra"));
            assert!(text.contains("fallback mode"));
        }

        let warnings = result
            .logs
            .iter()
            .filter(|e| e.level == LogLevel::Warn)
            .count();
        assert_eq!(warnings, 6);
        let errors = result
            .logs
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert_eq!(result.logs.last().unwrap().message, "Comparison completed");
    }

    #[tokio::test]
    async fn test_empty_methods_is_rejected_before_any_work() {
        let fixture = fixture("sk-test");
        let log = RequestLog::new();
        let request = ComparisonRequest::new("iPhone 15 Pro", "Pixel 8 Pro", vec![]);

        let result = ComparisonWorkflow::new(&fixture.context, &log)
            .run(&request)
            .await;

        assert!(matches!(result, Err(CompareError::Validation(_))));
        assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.llm.calls.load(Ordering::SeqCst), 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        for key in ["", "your-api-key-here"] {
            let fixture = fixture(key);
            let log = RequestLog::new();
            let request =
                ComparisonRequest::new("iPhone 15 Pro", "Pixel 8 Pro", methods(&["puppeteer"]));

            let result = ComparisonWorkflow::new(&fixture.context, &log)
                .run(&request)
                .await;

            match result {
                Err(CompareError::Configuration { instructions, .. }) => {
                    assert!(!instructions.is_empty())
                }
                other => panic!("expected configuration error, got {:?}", other),
            }
            assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 0);
            assert_eq!(fixture.llm.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_unknown_methods_are_ignored() {
        let fixture = fixture("sk-test");
        let log = RequestLog::new();
        let request = ComparisonRequest::new(
            "Desk lamp",
            "Floor lamp",
            methods(&["cheerio", "puppeteer"]),
        );

        let result = ComparisonWorkflow::new(&fixture.context, &log)
            .run(&request)
            .await
            .unwrap();

        // 每个产品调用一次唯一已知的数据源
        assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fixture.llm.calls.load(Ordering::SeqCst), 2);
        assert!(
            result
                .logs
                .iter()
                .any(|e| e.level == LogLevel::Warn && e.message.contains("cheerio"))
        );
    }

    #[tokio::test]
    async fn test_only_unknown_methods_still_uses_fallback() {
        let fixture = fixture("sk-test");
        let log = RequestLog::new();
        let request = ComparisonRequest::new("MacBook Pro", "Dell XPS 15", methods(&["cheerio"]));

        let result = ComparisonWorkflow::new(&fixture.context, &log)
            .run(&request)
            .await
            .unwrap();

        assert_eq!(
            result.product1.specifications.get("Type").map(String::as_str),
            Some("Laptop")
        );
        assert_eq!(fixture.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_progress_is_recorded() {
        let fixture = fixture("sk-test");
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.begin("A", "B").await;
        let log = RequestLog::new();

        ComparisonWorkflow::new(&fixture.context, &log)
            .with_session(&store, id)
            .run(&ComparisonRequest::new("A", "B", methods(&["puppeteer"])))
            .await
            .unwrap();
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::Completed);

        let failed = store.begin("A", "").await;
        let _ = ComparisonWorkflow::new(&fixture.context, &RequestLog::new())
            .with_session(&store, failed)
            .run(&ComparisonRequest::new("A", "", methods(&["puppeteer"])))
            .await;
        assert_eq!(store.get(failed).await.unwrap().status, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_unexpected_error_with_logs() {
        let context = GeneratorContext::with_parts(
            config_with_key("sk-test"),
            Arc::new(PanickingLlm),
            SourceRegistry::new(vec![]),
        );
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.begin("Kindle", "Kobo").await;
        let request = ComparisonRequest::new("Kindle", "Kobo", methods(&["puppeteer"]));

        let result = run_guarded(context, request, RequestLog::new(), Some((store.clone(), id))).await;

        match result {
            Err(CompareError::Unexpected { details, logs }) => {
                assert!(details.contains("model client invariant violated"));
                // 汇总阶段的日志在异常前已经写入
                assert!(logs.iter().any(|e| e.message.contains("Kindle")));
                assert_eq!(logs.last().unwrap().level, LogLevel::Error);
            }
            other => panic!("expected unexpected error, got {:?}", other),
        }
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_run_guarded_passes_through_results() {
        let fixture = fixture("sk-test");
        let result = run_guarded(
            fixture.context.clone(),
            ComparisonRequest::new("Kindle", "Kobo", methods(&["puppeteer"])),
            RequestLog::new(),
            None,
        )
        .await
        .unwrap();
        assert!(result.readme.contains("Kobo"));
    }

    #[test]
    fn test_timing_scope_reports_phases() {
        let mut timing = TimingScope::new();
        timing.start_phase("aggregation");
        assert!(timing.end_phase("aggregation").is_some());
        assert!(timing.end_phase("never_started").is_none());

        let report = timing.to_json();
        assert!(report["phases_ms"]["aggregation"].is_u64());
        assert!(report["total_ms"].is_u64());
    }
}
