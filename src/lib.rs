//! # Homework Catalog
//!
//! 导入学生作业提交压缩包（压缩包套压缩包），整理成可浏览的提交目录
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 学生身份、提交记录、参考答案、界面状态
//!
//! ### ② 业务能力层（Services）
//! - `filename_parser` - 从文件名解析学号 / 姓名 / 代码
//! - `content_filter` - 按扩展名判断是否为源码文本
//! - `archive_decoder` - 解码单个压缩包
//! - `catalog_store` - save / load / delete 持久化
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_ingest` - 并发导入，失败隔离
//! - `orchestrator/session` - 会话状态的生命周期
//! - `orchestrator/app` - 命令行入口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Catalog, ReferenceFileSet, StudentIdentity, SubmissionRecord, ViewState};
pub use orchestrator::{App, BatchIngestor, GradingSession, IngestDiagnostics, IngestReport};
