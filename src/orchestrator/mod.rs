//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次分析请求的分发与合并，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `registry` - 服务注册表
//! - 固定的六个服务，决定报告中的条目集合
//!
//! ### `analysis_orchestrator` - 分析编排器
//! - 校验输入、解析密钥
//! - 并发调用所有服务（tokio::spawn）
//! - 单服务超时与请求级截止时间
//! - 等待全部结果后生成 `AggregateReport`
//!
//! ### `report_assembler` - 报告组装
//! - 把 `AggregateReport` 转换成对外的 JSON 结构
//!
//! ## 层次关系
//!
//! ```text
//! server (HTTP 请求)
//!     ↓
//! analysis_orchestrator (处理一段文本 → AggregateReport)
//!     ↓                          ↓
//! services (ProviderClient)   report_assembler (→ JSON)
//!     ↓
//! infrastructure (HttpExecutor / CredentialStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **失败隔离**：任何一个服务失败都不影响其他服务
//! 2. **只读共享**：CredentialStore 只读，无需加锁
//! 3. **向下依赖**：编排层 → services → infrastructure
//! 4. **无业务逻辑**：只做调度和合并，不解释服务的响应

pub mod analysis_orchestrator;
pub mod registry;
pub mod report_assembler;

// 重新导出主要类型
pub use analysis_orchestrator::AnalysisOrchestrator;
pub use registry::ProviderRegistry;
pub use report_assembler::ReportAssembler;
