//! 本地存储服务
//!
//! 存储层只提供 save / load / delete 三个操作，覆盖写入，不做版本管理。
//! 目录、参考答案、界面状态分别存放在三个固定的键下。

use crate::error::StoreError;
use crate::models::{Catalog, ReferenceFileSet, ViewState};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

pub const SUBMISSIONS_KEY: &str = "grading-submissions";
pub const REFERENCES_KEY: &str = "grading-references";
pub const VIEW_STATE_KEY: &str = "grading-view-state";

/// 键值存储，后写覆盖先写
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn save(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// 内存存储，用于测试和嵌入调用
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// 目录存储：每个键一个 `<key>.json` 文件
///
/// 写入先落到临时文件再重命名，避免中途失败留下半个文件
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    base_dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for JsonDirStore {
    async fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::save_failed(key, e))?;

        let path = self.path_for(key);
        let tmp_path = self.base_dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp_path, value.as_bytes())
            .await
            .map_err(|e| StoreError::save_failed(key, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::save_failed(key, e))?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::load_failed(key, e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::delete_failed(key, e)),
        }
    }
}

/// 在键值存储之上的类型化访问
pub struct CatalogStore<S> {
    backend: S,
}

impl<S: KeyValueStore> CatalogStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|e| StoreError::save_failed(key, e))?;
        self.backend.save(key, json).await
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.load(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::load_failed(key, e)),
            None => Ok(None),
        }
    }

    pub async fn save_submissions(&self, catalog: &Catalog) -> Result<(), StoreError> {
        self.save_json(SUBMISSIONS_KEY, catalog).await
    }

    pub async fn load_submissions(&self) -> Result<Option<Catalog>, StoreError> {
        self.load_json(SUBMISSIONS_KEY).await
    }

    pub async fn save_references(&self, refs: &ReferenceFileSet) -> Result<(), StoreError> {
        self.save_json(REFERENCES_KEY, refs).await
    }

    pub async fn load_references(&self) -> Result<Option<ReferenceFileSet>, StoreError> {
        self.load_json(REFERENCES_KEY).await
    }

    pub async fn save_view_state(&self, state: &ViewState) -> Result<(), StoreError> {
        self.save_json(VIEW_STATE_KEY, state).await
    }

    pub async fn load_view_state(&self) -> Result<Option<ViewState>, StoreError> {
        self.load_json(VIEW_STATE_KEY).await
    }

    /// 删除三个键
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.backend.delete(SUBMISSIONS_KEY).await?;
        self.backend.delete(REFERENCES_KEY).await?;
        self.backend.delete(VIEW_STATE_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionRecord;
    use std::collections::BTreeMap;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for (id, name) in [("12345", "Jane Doe"), ("unknown-00001", "Unknown Student")] {
            catalog.insert(
                id.to_string(),
                SubmissionRecord {
                    student_id: id.to_string(),
                    student_name: name.to_string(),
                    student_code: "N/A".to_string(),
                    source_archive_name: format!("{}.zip", id),
                    raw_archive_bytes: vec![1, 2, 3, 0, 255],
                    files: BTreeMap::from([("main.c".to_string(), "int x;".to_string())]),
                },
            );
        }
        catalog
    }

    #[test]
    fn test_memory_round_trip() {
        let store = CatalogStore::new(MemoryStore::new());
        let catalog = sample_catalog();

        tokio_test::block_on(async {
            store.save_submissions(&catalog).await.unwrap();
            assert_eq!(store.load_submissions().await.unwrap(), Some(catalog));
        });
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = CatalogStore::new(MemoryStore::new());
        store
            .save_references(&ReferenceFileSet::from_files([("a.c", "1")]))
            .await
            .unwrap();
        store
            .save_references(&ReferenceFileSet::from_files([("b.c", "2")]))
            .await
            .unwrap();

        let refs = store.load_references().await.unwrap().unwrap();
        assert_eq!(refs.names(), vec!["b.c"]);
    }

    #[tokio::test]
    async fn test_dir_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(JsonDirStore::new(dir.path().join("store")));
        let catalog = sample_catalog();
        let state = ViewState {
            selected_student_id: Some("12345".to_string()),
            selected_submission_file: Some("main.c".to_string()),
            selected_reference_file: None,
        };

        assert_eq!(store.load_submissions().await.unwrap(), None);

        store.save_submissions(&catalog).await.unwrap();
        store.save_view_state(&state).await.unwrap();
        assert_eq!(store.load_submissions().await.unwrap(), Some(catalog));
        assert_eq!(store.load_view_state().await.unwrap(), Some(state));

        store.clear_all().await.unwrap();
        assert_eq!(store.load_submissions().await.unwrap(), None);
        assert_eq!(store.load_view_state().await.unwrap(), None);
        assert_eq!(store.load_references().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_json_is_load_error() {
        let backend = MemoryStore::new();
        backend
            .save(SUBMISSIONS_KEY, "{not json".to_string())
            .await
            .unwrap();
        let store = CatalogStore::new(backend);

        let err = store.load_submissions().await.unwrap_err();
        assert!(matches!(err, StoreError::LoadFailed { .. }));
    }
}
