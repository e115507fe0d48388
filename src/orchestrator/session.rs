//! 批改会话
//!
//! 持有当前的提交目录、参考答案和界面选中状态。
//! 生命周期：启动时从存储恢复，每次导入整体替换目录，显式清空时全部删除。
//! 写入存储是尽力而为的，失败只记录警告，内存中的状态仍然有效。

use crate::error::{AppResult, StoreError};
use crate::models::{Catalog, ReferenceFileSet, SubmissionRecord, ViewState};
use crate::orchestrator::batch_ingest::{BatchIngestor, IngestDiagnostics};
use crate::services::catalog_store::{CatalogStore, KeyValueStore};
use tracing::{info, warn};

pub struct GradingSession<S> {
    store: CatalogStore<S>,
    catalog: Catalog,
    references: ReferenceFileSet,
    view_state: ViewState,
}

impl<S: KeyValueStore> GradingSession<S> {
    /// 创建空会话
    pub fn new(store: CatalogStore<S>) -> Self {
        Self {
            store,
            catalog: Catalog::new(),
            references: ReferenceFileSet::default(),
            view_state: ViewState::default(),
        }
    }

    /// 从存储恢复上一次的会话
    ///
    /// 读取失败时会话保持为空并返回错误；选中的学生不在目录中时不恢复选中状态
    pub async fn restore(&mut self) -> Result<(), StoreError> {
        let (catalog, references, view_state) = tokio::join!(
            self.store.load_submissions(),
            self.store.load_references(),
            self.store.load_view_state(),
        );

        let catalog = catalog?.unwrap_or_default();
        let references = references?.unwrap_or_default();
        let view_state = view_state?.unwrap_or_default().retain_valid(&catalog);

        info!(
            "已恢复会话: {} 份提交, {} 个参考文件",
            catalog.len(),
            references.len()
        );

        self.catalog = catalog;
        self.references = references;
        self.view_state = view_state;
        Ok(())
    }

    /// 导入顶层压缩包并替换当前目录
    pub async fn ingest_archive(
        &mut self,
        ingestor: &BatchIngestor,
        archive_bytes: Vec<u8>,
    ) -> AppResult<IngestDiagnostics> {
        let (catalog, diagnostics) = ingestor.ingest(archive_bytes).await?.into_parts();
        self.replace_catalog(catalog).await;
        Ok(diagnostics)
    }

    /// 整体替换目录（不合并），并尝试保存
    pub async fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.view_state = std::mem::take(&mut self.view_state).retain_valid(&self.catalog);

        if let Err(e) = self.store.save_submissions(&self.catalog).await {
            warn!("⚠️ 保存提交目录失败: {}", e);
        }
        self.persist_view_state().await;
    }

    /// 整体替换参考答案，并尝试保存
    pub async fn replace_references(&mut self, references: ReferenceFileSet) {
        self.references = references;
        if let Err(e) = self.store.save_references(&self.references).await {
            warn!("⚠️ 保存参考文件失败: {}", e);
        }
    }

    /// 更新选中状态；选中的学生不存在时清空选中
    pub async fn set_view_state(&mut self, state: ViewState) {
        self.view_state = state.retain_valid(&self.catalog);
        self.persist_view_state().await;
    }

    async fn persist_view_state(&self) {
        if let Err(e) = self.store.save_view_state(&self.view_state).await {
            warn!("⚠️ 保存界面状态失败: {}", e);
        }
    }

    /// 清空内存和存储
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.catalog.clear();
        self.references = ReferenceFileSet::default();
        self.view_state = ViewState::default();
        self.store.clear_all().await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn references(&self) -> &ReferenceFileSet {
        &self.references
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn submission(&self, student_id: &str) -> Option<&SubmissionRecord> {
        self.catalog.get(student_id)
    }

    /// 按姓名排序的学生列表，同名按学号
    pub fn students(&self) -> Vec<&SubmissionRecord> {
        let mut students: Vec<_> = self.catalog.values().collect();
        students.sort_by(|a, b| {
            a.student_name
                .cmp(&b.student_name)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        students
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog_store::MemoryStore;
    use std::collections::BTreeMap;

    fn record(id: &str, name: &str) -> SubmissionRecord {
        SubmissionRecord {
            student_id: id.to_string(),
            student_name: name.to_string(),
            student_code: "N/A".to_string(),
            source_archive_name: format!("{}.zip", id),
            raw_archive_bytes: vec![7; 4],
            files: BTreeMap::new(),
        }
    }

    fn catalog_of(records: &[(&str, &str)]) -> Catalog {
        records
            .iter()
            .map(|(id, name)| (id.to_string(), record(id, name)))
            .collect()
    }

    #[tokio::test]
    async fn test_replace_drops_stale_selection() {
        let mut session = GradingSession::new(CatalogStore::new(MemoryStore::new()));
        session.replace_catalog(catalog_of(&[("11111", "Ann")])).await;
        session
            .set_view_state(ViewState {
                selected_student_id: Some("11111".to_string()),
                selected_submission_file: Some("a.c".to_string()),
                selected_reference_file: None,
            })
            .await;
        assert_eq!(session.view_state().selected_student_id.as_deref(), Some("11111"));

        session.replace_catalog(catalog_of(&[("22222", "Bob")])).await;
        assert_eq!(session.view_state(), &ViewState::default());
        assert!(session.submission("11111").is_none());
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let backend = MemoryStore::new();
        let mut first = GradingSession::new(CatalogStore::new(backend));
        first
            .replace_catalog(catalog_of(&[("11111", "Ann"), ("22222", "Bob")]))
            .await;
        first
            .replace_references(ReferenceFileSet::from_files([("ref.c", "int r;")]))
            .await;
        first
            .set_view_state(ViewState {
                selected_student_id: Some("22222".to_string()),
                selected_submission_file: None,
                selected_reference_file: Some("ref.c".to_string()),
            })
            .await;

        let GradingSession { store, catalog, .. } = first;
        let mut restored = GradingSession::new(store);
        restored.restore().await.unwrap();

        assert_eq!(restored.catalog(), &catalog);
        assert_eq!(restored.references().get("ref.c"), Some("int r;"));
        assert_eq!(restored.view_state().selected_student_id.as_deref(), Some("22222"));
    }

    #[tokio::test]
    async fn test_students_sorted_by_name() {
        let mut session = GradingSession::new(CatalogStore::new(MemoryStore::new()));
        session
            .replace_catalog(catalog_of(&[("3", "Carol"), ("1", "Bob"), ("2", "Bob"), ("4", "Alice")]))
            .await;

        let order: Vec<_> = session.students().iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(order, vec!["4", "1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let mut session = GradingSession::new(CatalogStore::new(MemoryStore::new()));
        session.replace_catalog(catalog_of(&[("11111", "Ann")])).await;
        session
            .replace_references(ReferenceFileSet::from_files([("r.md", "x")]))
            .await;

        session.clear().await.unwrap();
        assert!(session.catalog().is_empty());
        assert!(session.references().is_empty());

        let mut restored = GradingSession::new(session.store);
        restored.restore().await.unwrap();
        assert!(restored.catalog().is_empty());
    }
}
