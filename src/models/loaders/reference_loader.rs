use crate::models::reference::ReferenceFileSet;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个参考答案文件，非 UTF-8 内容按有损方式解码
pub async fn load_reference_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取参考文件: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 从文件夹中加载所有参考答案文件（不递归子目录）
pub async fn load_reference_folder(folder_path: &str) -> Result<ReferenceFileSet> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        match load_reference_file(&path).await {
            Ok(content) => {
                tracing::debug!("已加载参考文件: {}", name);
                files.push((name, content));
            }
            Err(e) => {
                tracing::warn!("加载参考文件失败 {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("成功加载 {} 个参考文件", files.len());
    Ok(ReferenceFileSet::from_files(files))
}
