use anyhow::Result;
use essay_report::config::DEFAULT_CONFIG_FILE;
use essay_report::server::{self, AppState};
use essay_report::utils::logging;
use essay_report::{
    AnalysisOrchestrator, Config, CredentialStore, HttpExecutor, ProviderRegistry, ReportAssembler,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config_path =
        std::env::var("ESSAY_REPORT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = Config::load(&config_path)?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 密钥只在这里读取一次
    let credentials = Arc::new(CredentialStore::from_env());
    logging::log_startup(&config, &credentials);

    let executor = Arc::new(HttpExecutor::new(&config)?);
    let registry = ProviderRegistry::from_config(Arc::clone(&executor), &config);
    let orchestrator = Arc::new(AnalysisOrchestrator::from_config(
        registry,
        credentials,
        &config,
    ));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("check") => {
            // 自检模式：分析一次并输出报告
            let text = args[1..].join(" ");
            let report = orchestrator.run(&text).await;
            let shape = ReportAssembler::merge(&text, &report);
            println!("{}", serde_json::to_string_pretty(&shape)?);
        }
        _ => {
            let state = AppState::new(orchestrator, executor);
            server::serve(&config, state).await?;
        }
    }

    Ok(())
}
