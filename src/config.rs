use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时解压的学生压缩包数量
    pub max_concurrent_archives: usize,
    /// 顶层提交压缩包路径
    pub submissions_archive: Option<String>,
    /// 参考答案文件夹
    pub reference_folder: Option<String>,
    /// 本地存储目录
    pub store_dir: String,
    /// 内层压缩包扩展名
    pub nested_archive_extension: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_archives: 16,
            submissions_archive: None,
            reference_folder: None,
            store_dir: "grading_store".to_string(),
            nested_archive_extension: ".zip".to_string(),
            verbose_logging: false,
            output_log_file: "ingest_log.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 若设置了 `HOMEWORK_CATALOG_CONFIG`，先读取该 TOML 文件，再用环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        let base = match std::env::var("HOMEWORK_CATALOG_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺失字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        let config = Self {
            max_concurrent_archives: parse_env("MAX_CONCURRENT_ARCHIVES", "usize")?
                .unwrap_or(self.max_concurrent_archives),
            submissions_archive: std::env::var("SUBMISSIONS_ARCHIVE")
                .ok()
                .or(self.submissions_archive),
            reference_folder: std::env::var("REFERENCE_FOLDER")
                .ok()
                .or(self.reference_folder),
            store_dir: std::env::var("STORE_DIR").unwrap_or(self.store_dir),
            nested_archive_extension: std::env::var("NESTED_ARCHIVE_EXTENSION")
                .unwrap_or(self.nested_archive_extension),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_archives == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_archives".to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        if self.nested_archive_extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nested_archive_extension".to_string(),
                reason: "不能为空".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(AppError::from(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })),
        },
        Err(_) => Ok(None),
    }
}
