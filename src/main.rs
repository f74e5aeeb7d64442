use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use product_compare::cli::{Args, Command};
use product_compare::generator::outlet::{DiskOutlet, Outlet};
use product_compare::llm::LLMClient;
use product_compare::logging::{RequestLog, init_tracing};
use product_compare::{
    AppState, CompareError, ComparisonRequest, Config, GeneratorContext, build_router, run_guarded,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.clone().unwrap_or(Command::Serve);
    let config = args.into_config()?;
    init_tracing(config.verbose)?;

    match command {
        Command::Serve => serve(config).await,
        Command::Check => check(config).await,
        Command::Compare {
            product1,
            product2,
            methods,
            output,
            json,
        } => compare_once(config, product1, product2, methods, output, json).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_interval = Duration::from_secs(config.session.sweep_interval_seconds);

    let context = GeneratorContext::new(config)?;
    if let Err(problem) = context.config.llm.check_api_key() {
        tracing::warn!(
            ?problem,
            "language model API key is not usable; comparison requests will be rejected until it is configured"
        );
    }

    let state = AppState::new(context);
    let _sweeper = state.sessions.spawn_sweeper(sweep_interval);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    println!("🚀 服务已启动: http://{}", addr);
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn check(config: Config) -> Result<()> {
    if let Err(problem) = config.llm.check_api_key() {
        return Err(report(CompareError::missing_api_key(problem)));
    }

    println!(
        "🤖 {} / {} ({})",
        config.llm.provider, config.llm.model, config.llm.api_base_url
    );
    LLMClient::new(config.llm)?.check_connection().await
}

/// 配置错误时打印修复步骤
fn report(error: CompareError) -> anyhow::Error {
    if let CompareError::Configuration {
        details,
        instructions,
    } = &error
    {
        eprintln!("❌ {}", details);
        for (index, step) in instructions.iter().enumerate() {
            eprintln!("   {}. {}", index + 1, step);
        }
    }
    error.into()
}

async fn compare_once(
    config: Config,
    product1: String,
    product2: String,
    methods: Vec<String>,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let methods = if methods.is_empty() {
        config.source_ids()
    } else {
        methods
    };
    let readme_path =
        output.unwrap_or_else(|| PathBuf::from(config.target_language.readme_filename()));

    let context = GeneratorContext::new(config)?;
    println!("🔍 正在对比 {} 与 {} ...", product1, product2);

    let request = ComparisonRequest::new(product1, product2, methods);
    let result = run_guarded(context, request, RequestLog::new(), None)
        .await
        .map_err(report)?;

    println!("\n{}", result.comparison);

    let mut outlet = DiskOutlet::new(readme_path);
    if let Some(json_path) = json {
        outlet = outlet.with_json(json_path);
    }
    outlet.save(&result).await?;

    println!("✅ 对比完成，共记录 {} 条日志", result.logs.len());
    Ok(())
}
