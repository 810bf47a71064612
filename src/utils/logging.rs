//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use crate::config::Config;
use crate::infrastructure::CredentialStore;
use crate::models::ProviderIdentity;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`；未设置时 `verbose` 决定 debug / info。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息（不输出任何密钥）
///
/// # 参数
/// - `config`: 程序配置
/// - `credentials`: 已加载的密钥
pub fn log_startup(config: &Config, credentials: &CredentialStore) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 作文质量报告服务启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 监听地址: {}", config.bind_address);
    info!(
        "⏱️ 单服务超时: {}s / 请求截止: {}s",
        config.provider_timeout_secs, config.request_deadline_secs
    );
    for provider in ProviderIdentity::ALL {
        match provider.credential_env_var() {
            None => info!("  ✓ {} (本地计算)", provider),
            Some(_) if credentials.contains(provider) => info!("  ✓ {} 已启用", provider),
            Some(var) => warn!("  ⚠️ {} 未启用: 缺少环境变量 {}", provider, var),
        }
    }
    if config.allow_insecure_http {
        warn!("⚠️ 已允许明文 HTTP，仅应在本地测试中使用");
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("作文质量报告", 2), "作文...");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
