use crate::error::CompareError;
use crate::generator::aggregator::ProductAggregator;
use crate::generator::comparison::ComparisonGenerator;
use crate::generator::context::GeneratorContext;
use crate::generator::readme::ReadmeGenerator;
use crate::logging::RequestLog;
use crate::session::{SessionStatus, SessionStore};
use crate::types::{ComparisonRequest, ComparisonResult};

use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<&'static str, Instant>,
    phase_durations: Vec<(&'static str, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &'static str) {
        self.phase_start_times.insert(phase_name, Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &'static str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations.push((phase_name, duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 各阶段耗时（毫秒），按结束顺序排列
    pub fn to_json(&self) -> Value {
        let mut phases = Map::new();
        for (phase, duration) in &self.phase_durations {
            phases.insert(phase.to_string(), json!(duration.as_millis() as u64));
        }
        json!({
            "total_ms": self.get_total_duration().as_millis() as u64,
            "phases_ms": phases,
        })
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const AGGREGATION: &'static str = "aggregation";
    pub const COMPARISON: &'static str = "comparison";
    pub const DOCUMENT_GENERATION: &'static str = "document_generation";
}

/// 校验请求参数
pub fn validate_request(request: &ComparisonRequest) -> Result<(), CompareError> {
    if request.product1.trim().is_empty() || request.product2.trim().is_empty() {
        return Err(CompareError::validation("Both product names are required"));
    }
    if request.methods.is_empty() {
        return Err(CompareError::validation(
            "At least one scraping method must be selected",
        ));
    }
    Ok(())
}

/// 一次对比请求的完整流程
pub struct ComparisonWorkflow<'a> {
    context: &'a GeneratorContext,
    log: &'a RequestLog,
    session: Option<(&'a SessionStore, Uuid)>,
}

impl<'a> ComparisonWorkflow<'a> {
    pub fn new(context: &'a GeneratorContext, log: &'a RequestLog) -> Self {
        Self {
            context,
            log,
            session: None,
        }
    }

    /// 把进度同步到会话存储
    pub fn with_session(mut self, store: &'a SessionStore, id: Uuid) -> Self {
        self.session = Some((store, id));
        self
    }

    async fn set_status(&self, status: SessionStatus) {
        if let Some((store, id)) = self.session {
            store.set_status(id, status).await;
        }
    }

    /// 执行对比：校验 → 汇总两个产品 → 生成对比 → 生成README
    pub async fn run(&self, request: &ComparisonRequest) -> Result<ComparisonResult, CompareError> {
        let result = self.run_inner(request).await;
        let status = if result.is_ok() {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        };
        self.set_status(status).await;
        result
    }

    async fn run_inner(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResult, CompareError> {
        validate_request(request)?;
        self.context
            .config
            .llm
            .check_api_key()
            .map_err(CompareError::missing_api_key)?;

        let product1_name = request.product1.trim();
        let product2_name = request.product2.trim();
        let mut timing = TimingScope::new();

        self.log.info_with(
            format!("Comparing \"{}\" with \"{}\"", product1_name, product2_name),
            json!({ "methods": request.methods }),
        );

        let selection = self.context.sources.select(&request.methods);
        for unknown in &selection.unknown {
            self.log.warn(format!("Ignoring unknown scraping method \"{}\"", unknown));
        }

        self.set_status(SessionStatus::Aggregating).await;
        timing.start_phase(TimingKeys::AGGREGATION);
        let aggregator = ProductAggregator::new(&self.context.fallback, self.log)
            .concurrent(self.context.config.sources.concurrent);
        let product1 = aggregator.aggregate(product1_name, &selection.sources).await;
        let product2 = aggregator.aggregate(product2_name, &selection.sources).await;
        timing.end_phase(TimingKeys::AGGREGATION);

        let llm = self.context.llm_client.as_ref();
        let language = &self.context.config.target_language;

        self.set_status(SessionStatus::Comparing).await;
        timing.start_phase(TimingKeys::COMPARISON);
        let comparison = ComparisonGenerator::new(llm, language, self.log)
            .generate(&product1, &product2)
            .await;
        timing.end_phase(TimingKeys::COMPARISON);

        self.set_status(SessionStatus::Documenting).await;
        timing.start_phase(TimingKeys::DOCUMENT_GENERATION);
        let readme = ReadmeGenerator::new(llm, language, self.log)
            .generate(&product1, &product2, &comparison.text)
            .await;
        timing.end_phase(TimingKeys::DOCUMENT_GENERATION);

        let mut summary = timing.to_json();
        summary["comparison_fallback"] = json!(comparison.used_fallback);
        summary["readme_fallback"] = json!(readme.used_fallback);
        self.log.info_with("Comparison completed", summary);

        Ok(ComparisonResult {
            product1,
            product2,
            comparison: comparison.text,
            readme: readme.text,
            logs: self.log.snapshot(),
        })
    }
}

/// 在独立任务中执行对比，任务异常终止时转为带日志的未预期错误
pub async fn run_guarded(
    context: GeneratorContext,
    request: ComparisonRequest,
    log: RequestLog,
    session: Option<(SessionStore, Uuid)>,
) -> Result<ComparisonResult, CompareError> {
    let task_log = log.clone();
    let task_session = session.clone();
    let handle = tokio::spawn(async move {
        let mut workflow = ComparisonWorkflow::new(&context, &task_log);
        if let Some((store, id)) = &task_session {
            workflow = workflow.with_session(store, *id);
        }
        workflow.run(&request).await
    });

    match handle.await {
        Ok(result) => result,
        Err(join_error) => {
            let details = if join_error.is_panic() {
                let panic = join_error.into_panic();
                panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "comparison task panicked".to_string())
            } else {
                join_error.to_string()
            };

            log.error_with(
                "Comparison failed unexpectedly",
                json!({ "details": details }),
            );
            if let Some((store, id)) = &session {
                store.set_status(*id, SessionStatus::Failed).await;
            }
            Err(CompareError::Unexpected {
                details,
                logs: log.snapshot(),
            })
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
