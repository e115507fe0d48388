//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量导入和状态管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_ingest` - 批量导入器
//! - 打开顶层压缩包，枚举每个学生的压缩包
//! - 控制并发数量（Semaphore）
//! - 隔离单个学生的失败
//! - 分配学号并组装目录
//!
//! ### `session` - 批改会话
//! - 持有当前目录、参考答案、选中状态
//! - 恢复 / 替换 / 清空
//!
//! ### `app` - 应用入口
//! - 读取配置中的文件，驱动导入并输出统计
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! session (持有状态，写入存储)
//!     ↓
//! batch_ingest (处理 Vec<内层压缩包>)
//!     ↓
//! services (能力层：filename_parser / content_filter / archive_decoder / catalog_store)
//! ```

pub mod app;
pub mod batch_ingest;
pub mod session;

// 重新导出主要类型
pub use app::App;
pub use batch_ingest::{BatchIngestor, IngestDiagnostics, IngestFailure, IngestOptions, IngestReport};
pub use session::GradingSession;
