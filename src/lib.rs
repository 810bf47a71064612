//! # Essay Report
//!
//! 对一段英文文本并发调用多个分析服务，合并成一份报告
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有进程级资源，只暴露能力
//! - `HttpExecutor` - 唯一的 `reqwest::Client`，始终校验证书
//! - `CredentialStore` - 启动时加载一次的只读密钥表
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能分析什么"，只处理一段文本
//! - `GrammarProvider` - Sapling 拼写语法检查
//! - `CopyleaksProvider` / `CopyscapeProvider` - 原创性检查
//! - `CitationProvider` - Zotero 文献检索
//! - `ParaphraseProvider` - RapidAPI 改写
//! - `ReadabilityScorer` - 本地可读性评分
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/analysis_orchestrator` - 并发分发、超时、失败隔离
//! - `orchestrator/report_assembler` - 合并为对外的 JSON 结构
//!
//! ### ④ 接入层（Server）
//! - `server/` - axum 路由，解析请求并返回报告
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Credential, CredentialStore, HttpExecutor};
pub use models::{AggregateReport, ErrorKind, ProviderIdentity, ProviderResult};
pub use orchestrator::{AnalysisOrchestrator, ProviderRegistry, ReportAssembler};
pub use services::ProviderClient;
