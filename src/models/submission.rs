use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 学生编号 → 提交记录，每次导入整体替换
pub type Catalog = BTreeMap<String, SubmissionRecord>;

/// 单个学生的提交记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub student_id: String,
    pub student_name: String,
    pub student_code: String,
    /// 顶层压缩包中的条目名
    pub source_archive_name: String,
    /// 学生原始压缩包，原样保留以便重新导出
    #[serde(with = "base64_bytes")]
    pub raw_archive_bytes: Vec<u8>,
    /// 压缩包内相对路径 → 文本内容
    pub files: BTreeMap<String, String>,
}

impl SubmissionRecord {
    /// 按路径排序的文件列表
    pub fn files_sorted(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// 导出文件名，只保留条目名的最后一段
    pub fn archive_file_name(&self) -> &str {
        self.source_archive_name
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.source_archive_name)
    }

    /// 将原始压缩包写回目录，返回写入路径
    pub async fn export_archive(&self, dir: &Path) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

        let target = dir.join(self.archive_file_name());
        tokio::fs::write(&target, &self.raw_archive_bytes)
            .await
            .map_err(|e| AppError::file_write_failed(target.display().to_string(), e))?;

        tracing::debug!(
            "已导出 {} 的压缩包: {}",
            self.student_name,
            target.display()
        );
        Ok(target)
    }
}

// 原始字节在 JSON 中以 base64 字符串存储
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SubmissionRecord {
        SubmissionRecord {
            student_id: "12345".to_string(),
            student_name: "Jane Doe".to_string(),
            student_code: "CS".to_string(),
            source_archive_name: "batch/hw+12345+Jane Doe+x+CS_1.zip".to_string(),
            raw_archive_bytes: vec![0x50, 0x4B, 0x03, 0x04, 0xFF],
            files: BTreeMap::from([
                ("src/b.c".to_string(), "int b;".to_string()),
                ("a.py".to_string(), "print(1)".to_string()),
            ]),
        }
    }

    #[test]
    fn test_json_keeps_raw_bytes() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"studentId\":\"12345\""));

        let back: SubmissionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_archive_file_name_strips_folders() {
        assert_eq!(sample().archive_file_name(), "hw+12345+Jane Doe+x+CS_1.zip");
    }

    #[test]
    fn test_files_sorted() {
        assert_eq!(sample().files_sorted(), vec!["a.py", "src/b.c"]);
    }

    #[tokio::test]
    async fn test_export_archive_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let record = sample();

        let path = record.export_archive(dir.path()).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), record.raw_archive_bytes);
    }
}
