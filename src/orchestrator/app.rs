//! 应用入口 - 编排层
//!
//! 1. **应用初始化**：日志文件、恢复上一次的会话
//! 2. **导入提交**：读取顶层压缩包，整体替换目录并保存
//! 3. **导入参考答案**：读取参考文件夹，整体替换并保存
//! 4. **全局统计**：输出成功/失败数量

use crate::config::Config;
use crate::models::load_reference_folder;
use crate::orchestrator::batch_ingest::BatchIngestor;
use crate::orchestrator::session::GradingSession;
use crate::services::catalog_store::{CatalogStore, JsonDirStore};
use crate::utils::logging;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    ingestor: BatchIngestor,
    session: GradingSession<JsonDirStore>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(config.max_concurrent_archives, &config.store_dir);

        let store = CatalogStore::new(JsonDirStore::new(&config.store_dir));
        let mut session = GradingSession::new(store);
        if let Err(e) = session.restore().await {
            warn!("⚠️ 无法恢复上一次的会话: {}", e);
        }

        Ok(Self {
            ingestor: BatchIngestor::from_config(&config),
            config,
            session,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let mut failed = 0;

        match self.config.submissions_archive.clone() {
            Some(archive_path) => {
                info!("\n📁 正在读取提交压缩包: {}", archive_path);
                let bytes = tokio::fs::read(&archive_path)
                    .await
                    .with_context(|| format!("无法读取压缩包: {}", archive_path))?;

                let diagnostics = self
                    .session
                    .ingest_archive(&self.ingestor, bytes)
                    .await
                    .with_context(|| format!("无法导入压缩包: {}", archive_path))?;
                failed = diagnostics.failure_count();
            }
            None => warn!("⚠️ 未设置 SUBMISSIONS_ARCHIVE，跳过提交导入"),
        }

        if let Some(folder) = self.config.reference_folder.clone() {
            info!("\n📚 正在读取参考答案: {}", folder);
            let references = load_reference_folder(&folder).await?;
            self.session.replace_references(references).await;
        }

        logging::print_final_stats(
            self.session.catalog().len(),
            failed,
            self.session.references().len(),
            &self.config.output_log_file,
        );

        Ok(())
    }
}
