//! 批量导入器 - 编排层
//!
//! ## 职责
//!
//! 把一个顶层压缩包（每个学生一个内层压缩包）变成完整的提交目录。
//!
//! ## 核心流程
//!
//! 1. **打开顶层压缩包**：打不开直接失败，不返回部分结果
//! 2. **并发解码**：每个内层压缩包一个任务，用 Semaphore 限制并发数量
//! 3. **失败隔离**：单个学生的压缩包损坏只记录诊断信息，不影响其他学生
//! 4. **按条目顺序合并**：与完成顺序无关，结果是确定的
//!
//! ## 学号冲突
//!
//! 合并时按顶层压缩包中的条目顺序处理，先出现的条目保留真实学号，
//! 之后重复的学号改用生成的编号，并记录在 `reassigned` 中。

use crate::config::Config;
use crate::error::{AppError, AppResult, ArchiveError};
use crate::models::{Catalog, StudentIdentity, SubmissionRecord};
use crate::services::archive_decoder::{self, NestedEntry};
use crate::services::filename_parser;
use crate::utils::truncate_text;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 解析不到姓名时的占位
pub const UNKNOWN_STUDENT_NAME: &str = "Unknown Student";
/// 解析不到代码时的占位
pub const UNKNOWN_STUDENT_CODE: &str = "N/A";
/// 生成编号的前缀
pub const SYNTHETIC_ID_PREFIX: &str = "unknown-";

/// 导入参数
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub max_concurrent_archives: usize,
    pub nested_archive_extension: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for IngestOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrent_archives: config.max_concurrent_archives.max(1),
            nested_archive_extension: config.nested_archive_extension.clone(),
        }
    }
}

/// 某个学生压缩包解码失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub archive_name: String,
    pub student_name: String,
    pub reason: String,
}

/// 因学号重复而改用生成编号的条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignedId {
    pub archive_name: String,
    pub claimed_id: String,
    pub assigned_id: String,
}

/// 导入诊断信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestDiagnostics {
    /// 解码失败、未进入目录的学生
    pub failures: Vec<IngestFailure>,
    /// 顶层压缩包中的非压缩包条目
    pub skipped_entries: Vec<String>,
    pub reassigned: Vec<ReassignedId>,
}

impl IngestDiagnostics {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_archives(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.archive_name.as_str()).collect()
    }
}

/// 一次导入的结果，`catalog` 整体替换之前的目录
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub catalog: Catalog,
    pub diagnostics: IngestDiagnostics,
}

impl IngestReport {
    pub fn into_parts(self) -> (Catalog, IngestDiagnostics) {
        (self.catalog, self.diagnostics)
    }
}

/// 解码成功、尚未分配学号的提交
#[derive(Debug)]
struct DecodedSubmission {
    archive_name: String,
    identity: StudentIdentity,
    raw_bytes: Vec<u8>,
    files: BTreeMap<String, String>,
}

/// 批量导入器
#[derive(Debug, Clone, Default)]
pub struct BatchIngestor {
    options: IngestOptions,
}

impl BatchIngestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(IngestOptions::from(config))
    }

    /// 导入一个顶层压缩包
    pub async fn ingest(&self, archive_bytes: Vec<u8>) -> AppResult<IngestReport> {
        let listing =
            archive_decoder::list_nested_archives(archive_bytes, &self.options.nested_archive_extension)
                .await?;

        let total = listing.nested.len();
        log_ingest_start(total, listing.skipped.len(), self.options.max_concurrent_archives);

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_archives));
        let mut handles = Vec::with_capacity(total);

        // 为每个学生压缩包创建并发任务
        for entry in listing.nested {
            let entry_index = entry.index + 1;
            let archive_name = entry.name.clone();
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(e.to_string()))?;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                decode_entry(entry, entry_index, total).await
            });
            handles.push((entry_index, archive_name, handle));
        }

        // 等待所有任务完成，按条目顺序收集
        let mut decoded = Vec::with_capacity(total);
        let mut diagnostics = IngestDiagnostics {
            skipped_entries: listing.skipped,
            ..Default::default()
        };

        let results = join_all(handles.into_iter().map(|(entry_index, archive_name, handle)| async move {
            (entry_index, archive_name, handle.await)
        }))
        .await;

        for (entry_index, archive_name, result) in results {
            match result {
                Ok(Ok(submission)) => decoded.push(submission),
                Ok(Err(failure)) => diagnostics.failures.push(failure),
                Err(e) => {
                    error!("[档案 {}] 任务执行失败: {}", entry_index, e);
                    diagnostics.failures.push(IngestFailure {
                        student_name: display_name(&filename_parser::extract(base_name(&archive_name))),
                        archive_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let catalog = assemble_catalog(decoded, &mut diagnostics);
        log_ingest_complete(&catalog, &diagnostics, total);

        Ok(IngestReport {
            catalog,
            diagnostics,
        })
    }
}

/// 解码单个学生压缩包
async fn decode_entry(
    entry: NestedEntry,
    entry_index: usize,
    total: usize,
) -> Result<DecodedSubmission, IngestFailure> {
    let identity = filename_parser::extract(base_name(&entry.name));
    let student_name = display_name(&identity);

    let fail = |archive_name: &str, err: &ArchiveError| {
        warn!(
            "[档案 {}/{}] ⚠️ 无法打开 {} 的压缩包 {}: {}",
            entry_index, total, student_name, archive_name, err
        );
        IngestFailure {
            archive_name: archive_name.to_string(),
            student_name: student_name.clone(),
            reason: err.to_string(),
        }
    };

    let bytes = match entry.bytes {
        Ok(bytes) => bytes,
        Err(e) => return Err(fail(&entry.name, &e)),
    };

    let shared = Arc::new(bytes);
    let files = match archive_decoder::decode(&entry.name, Arc::clone(&shared)).await {
        Ok(files) => files,
        Err(e) => return Err(fail(&entry.name, &e)),
    };

    info!(
        "[档案 {}/{}] ✓ {}: {} 个文件",
        entry_index,
        total,
        student_name,
        files.len()
    );

    Ok(DecodedSubmission {
        archive_name: entry.name,
        identity,
        // 解码任务结束后只剩这一个引用，不会复制
        raw_bytes: Arc::try_unwrap(shared).unwrap_or_else(|shared| shared.as_ref().clone()),
        files,
    })
}

/// 按条目顺序分配学号并组装目录
fn assemble_catalog(decoded: Vec<DecodedSubmission>, diagnostics: &mut IngestDiagnostics) -> Catalog {
    let mut catalog = Catalog::new();
    let mut synthetic_counter = 0usize;

    for submission in decoded {
        let student_id = match submission.identity.id.clone() {
            Some(id) if !catalog.contains_key(&id) => id,
            Some(id) => {
                let assigned = next_synthetic_id(&mut synthetic_counter);
                warn!(
                    "⚠️ 学号 {} 重复 ({}), 改用 {}",
                    id, submission.archive_name, assigned
                );
                diagnostics.reassigned.push(ReassignedId {
                    archive_name: submission.archive_name.clone(),
                    claimed_id: id,
                    assigned_id: assigned.clone(),
                });
                assigned
            }
            None => next_synthetic_id(&mut synthetic_counter),
        };

        let record = SubmissionRecord {
            student_id: student_id.clone(),
            student_name: display_name(&submission.identity),
            student_code: submission
                .identity
                .code
                .unwrap_or_else(|| UNKNOWN_STUDENT_CODE.to_string()),
            source_archive_name: submission.archive_name,
            raw_archive_bytes: submission.raw_bytes,
            files: submission.files,
        };
        catalog.insert(student_id, record);
    }

    catalog
}

/// 本次导入内唯一的生成编号
fn next_synthetic_id(counter: &mut usize) -> String {
    *counter += 1;
    format!("{}{:05}", SYNTHETIC_ID_PREFIX, counter)
}

fn display_name(identity: &StudentIdentity) -> String {
    identity
        .name
        .clone()
        .unwrap_or_else(|| UNKNOWN_STUDENT_NAME.to_string())
}

/// 条目名的最后一段（去掉顶层压缩包中的文件夹）
fn base_name(entry_name: &str) -> &str {
    entry_name.rsplit('/').next().unwrap_or(entry_name)
}

// ========== 日志辅助函数 ==========

fn log_ingest_start(total: usize, skipped: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 找到 {} 个学生压缩包", total);
    if skipped > 0 {
        info!("📄 跳过 {} 个非压缩包条目", skipped);
    }
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

fn log_ingest_complete(catalog: &Catalog, diagnostics: &IngestDiagnostics, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 导入完成: 成功 {}/{}", catalog.len(), total);
    if !diagnostics.failures.is_empty() {
        warn!("❌ 失败: {}", diagnostics.failure_count());
        for failure in &diagnostics.failures {
            warn!(
                "   - {} ({}): {}",
                failure.archive_name,
                failure.student_name,
                truncate_text(&failure.reason, 80)
            );
        }
    }
    if !diagnostics.reassigned.is_empty() {
        warn!("🔁 学号重复改用生成编号: {}", diagnostics.reassigned.len());
    }
    info!("{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(name: &str, id: Option<&str>) -> DecodedSubmission {
        DecodedSubmission {
            archive_name: name.to_string(),
            identity: StudentIdentity {
                id: id.map(str::to_string),
                name: None,
                code: None,
            },
            raw_bytes: Vec::new(),
            files: BTreeMap::new(),
        }
    }

    #[test]
    fn test_synthetic_ids_are_sequential() {
        let mut counter = 0;
        assert_eq!(next_synthetic_id(&mut counter), "unknown-00001");
        assert_eq!(next_synthetic_id(&mut counter), "unknown-00002");
    }

    #[test]
    fn test_first_entry_keeps_duplicate_id() {
        let mut diagnostics = IngestDiagnostics::default();
        let catalog = assemble_catalog(
            vec![
                decoded("first.zip", Some("12345")),
                decoded("anon.zip", None),
                decoded("second.zip", Some("12345")),
            ],
            &mut diagnostics,
        );

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog["12345"].source_archive_name, "first.zip");
        assert_eq!(catalog["unknown-00001"].source_archive_name, "anon.zip");
        assert_eq!(catalog["unknown-00002"].source_archive_name, "second.zip");
        assert_eq!(
            diagnostics.reassigned,
            vec![ReassignedId {
                archive_name: "second.zip".to_string(),
                claimed_id: "12345".to_string(),
                assigned_id: "unknown-00002".to_string(),
            }]
        );
    }

    #[test]
    fn test_placeholders_applied() {
        let mut diagnostics = IngestDiagnostics::default();
        let catalog = assemble_catalog(vec![decoded("x.zip", Some("99999"))], &mut diagnostics);

        let record = &catalog["99999"];
        assert_eq!(record.student_name, UNKNOWN_STUDENT_NAME);
        assert_eq!(record.student_code, UNKNOWN_STUDENT_CODE);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("batch/Doe_Jane.zip"), "Doe_Jane.zip");
        assert_eq!(base_name("Doe_Jane.zip"), "Doe_Jane.zip");
    }
}
