use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 压缩包相关错误
    #[error("压缩包错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 压缩包相关错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 顶层压缩包无法打开，整批导入失败
    #[error("无法打开顶层压缩包: {source}")]
    ArchiveOpen {
        #[source]
        source: BoxedSource,
    },
    /// 某个学生的内层压缩包无法打开，只影响该学生
    #[error("无法打开学生压缩包 {archive_name}: {source}")]
    NestedArchiveOpen {
        archive_name: String,
        #[source]
        source: BoxedSource,
    },
    /// 读取压缩包条目失败
    #[error("读取条目 {entry} 失败: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: BoxedSource,
    },
    /// 条目解压后超过大小上限
    #[error("条目 {entry} 过大: {size} 字节，上限 {limit} 字节")]
    EntryTooLarge { entry: String, size: u64, limit: u64 },
    /// 后台解压任务异常退出
    #[error("解压任务异常退出: {0}")]
    TaskJoin(String),
}

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 写入失败
    #[error("保存 {key} 失败: {source}")]
    SaveFailed {
        key: String,
        #[source]
        source: BoxedSource,
    },
    /// 读取失败
    #[error("读取 {key} 失败: {source}")]
    LoadFailed {
        key: String,
        #[source]
        source: BoxedSource,
    },
    /// 删除失败
    #[error("删除 {key} 失败: {source}")]
    DeleteFailed {
        key: String,
        #[source]
        source: BoxedSource,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Archive(ArchiveError::ArchiveOpen {
            source: Box::new(err),
        })
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Archive(ArchiveError::TaskJoin(err.to_string()))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建顶层压缩包打开错误
    pub fn archive_open(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Archive(ArchiveError::ArchiveOpen {
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否为整批导入的致命错误
    pub fn is_fatal_archive_error(&self) -> bool {
        matches!(self, AppError::Archive(ArchiveError::ArchiveOpen { .. }))
    }
}

impl ArchiveError {
    /// 创建内层压缩包打开错误
    pub fn nested_open(
        archive_name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ArchiveError::NestedArchiveOpen {
            archive_name: archive_name.into(),
            source: Box::new(source),
        }
    }
}

impl StoreError {
    pub fn save_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::SaveFailed {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn load_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::LoadFailed {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn delete_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::DeleteFailed {
            key: key.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_error_is_fatal() {
        let err: AppError = zip::result::ZipError::InvalidArchive("bad").into();
        assert!(err.is_fatal_archive_error());
    }

    #[test]
    fn test_nested_error_is_not_fatal() {
        let err = AppError::Archive(ArchiveError::nested_open(
            "a.zip",
            zip::result::ZipError::InvalidArchive("bad"),
        ));
        assert!(!err.is_fatal_archive_error());
        assert!(err.to_string().contains("a.zip"));
    }
}
