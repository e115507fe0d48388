//! 压缩包解码服务 - 业务能力层
//!
//! 只负责"打开一个压缩包并取出内容"，不关心学生身份和批量流程。
//! zip 解析是同步的，异步接口把它放到阻塞线程池中执行。

use crate::error::{AppError, AppResult, ArchiveError};
use crate::services::content_filter::is_text_source;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, warn};
use zip::ZipArchive;

/// 单个条目解压后的大小上限（100MB），超过视为损坏
pub const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// 顶层压缩包中的一个内层压缩包条目
#[derive(Debug)]
pub struct NestedEntry {
    /// 在顶层压缩包中的位置，用于确定性排序
    pub index: usize,
    /// 条目名
    pub name: String,
    /// 条目原始字节；读取失败只影响这一个学生
    pub bytes: Result<Vec<u8>, ArchiveError>,
}

/// 顶层压缩包的枚举结果
#[derive(Debug, Default)]
pub struct TopLevelListing {
    pub nested: Vec<NestedEntry>,
    /// 非压缩包的杂项条目（不算错误）
    pub skipped: Vec<String>,
}

/// 解码一个学生的压缩包：相对路径 → 文本内容
///
/// 压缩包本身无法打开时返回 `NestedArchiveOpen`，单个条目读取失败只跳过该条目
pub async fn decode(archive_name: &str, bytes: Arc<Vec<u8>>) -> Result<BTreeMap<String, String>, ArchiveError> {
    let label = archive_name.to_string();
    tokio::task::spawn_blocking(move || decode_blocking(&label, &bytes))
        .await
        .map_err(|e| ArchiveError::TaskJoin(e.to_string()))?
}

/// `decode` 的同步版本
pub fn decode_blocking(archive_name: &str, bytes: &[u8]) -> Result<BTreeMap<String, String>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ArchiveError::nested_open(archive_name, e))?;

    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[{}] 跳过无法读取的条目 #{}: {}", archive_name, i, e);
                continue;
            }
        };

        if entry.is_dir() || !is_text_source(entry.name()) {
            continue;
        }

        let path = entry.name().to_string();
        let size = entry.size();
        if size > MAX_ENTRY_SIZE {
            warn!(
                "[{}] 跳过过大的条目 {} ({} 字节，上限 {} 字节)",
                archive_name, path, size, MAX_ENTRY_SIZE
            );
            continue;
        }

        let content = match read_bounded(&mut entry, MAX_ENTRY_SIZE) {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!("[{}] 跳过过大的条目 {}: 实际内容超过上限", archive_name, path);
                continue;
            }
            Err(e) => {
                warn!("[{}] 跳过损坏的条目 {}: {}", archive_name, path, e);
                continue;
            }
        };

        files.insert(path, String::from_utf8_lossy(&content).into_owned());
    }

    debug!("[{}] 提取了 {} 个文本文件", archive_name, files.len());
    Ok(files)
}

/// 打开顶层压缩包并读出所有内层压缩包条目
///
/// 顶层压缩包打不开是致命错误
pub async fn list_nested_archives(bytes: Vec<u8>, extension: &str) -> AppResult<TopLevelListing> {
    let extension = extension.to_lowercase();
    tokio::task::spawn_blocking(move || list_nested_archives_blocking(&bytes, &extension)).await?
}

fn list_nested_archives_blocking(bytes: &[u8], extension: &str) -> AppResult<TopLevelListing> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(AppError::archive_open)?;
    let mut listing = TopLevelListing::default();

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("跳过顶层压缩包中无法读取的条目 #{}: {}", i, e);
                continue;
            }
        };

        let name = entry.name().to_string();
        if entry.is_dir() {
            continue;
        }
        if !name.to_lowercase().ends_with(extension) {
            debug!("跳过非压缩包条目: {}", name);
            listing.skipped.push(name);
            continue;
        }

        let declared_size = entry.size();
        let too_large = || ArchiveError::EntryTooLarge {
            entry: name.clone(),
            size: declared_size,
            limit: MAX_ENTRY_SIZE,
        };
        let bytes = if declared_size > MAX_ENTRY_SIZE {
            Err(too_large())
        } else {
            match read_bounded(&mut entry, MAX_ENTRY_SIZE) {
                Ok(Some(content)) => Ok(content),
                Ok(None) => Err(too_large()),
                Err(e) => Err(ArchiveError::EntryRead {
                    entry: name.clone(),
                    source: Box::new(e),
                }),
            }
        };

        listing.nested.push(NestedEntry {
            index: listing.nested.len(),
            name,
            bytes,
        });
    }

    Ok(listing)
}

/// 最多读取 `limit` 字节，内容超出时返回 `None`
///
/// 不按条目头声明的大小预分配，头部可能是伪造的
fn read_bounded<R: Read>(reader: R, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut content = Vec::new();
    reader.take(limit + 1).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(content))
}
