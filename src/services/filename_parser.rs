//! 文件名解析服务 - 业务能力层
//!
//! 从学生压缩包的文件名中恢复学号、姓名和代码。
//!
//! 解析分两层：
//! 1. 结构化命名 `作业+学号+姓名+...+代码_xxx.zip`（至少 4 段）
//! 2. 逐字段兜底：学号取第一个 5 位以上的数字串，姓名取 `姓_名` 前缀
//!
//! 代码只在第一层中产生，没有兜底。

use crate::models::StudentIdentity;
use regex::Regex;
use std::sync::OnceLock;

/// 结构化命名的分隔符
const SEGMENT_DELIMITER: char = '+';
/// 结构化命名至少需要的段数
const MIN_STRUCTURED_SEGMENTS: usize = 4;

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[^/.]+$").expect("extension pattern is valid"))
}

fn numeric_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("numeric id pattern is valid"))
}

fn digit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{5,}").expect("digit run pattern is valid"))
}

/// 解析文件名，永不失败；解析不到的字段为 `None`
pub fn extract(filename: &str) -> StudentIdentity {
    let mut identity = parse_structured(filename);

    if identity.id.is_none() {
        identity.id = digit_run_re()
            .find(filename)
            .map(|m| m.as_str().to_string());
    }

    if identity.name.is_none() {
        identity.name = underscore_name(filename);
    }

    identity
}

/// 第一层：`+` 分隔的结构化命名
fn parse_structured(filename: &str) -> StudentIdentity {
    let stem = extension_re().replace(filename, "");
    let parts: Vec<&str> = stem.split(SEGMENT_DELIMITER).collect();

    if parts.len() < MIN_STRUCTURED_SEGMENTS {
        return StudentIdentity::default();
    }

    let id = Some(parts[1].trim())
        .filter(|raw| numeric_id_re().is_match(raw))
        .map(str::to_string);

    let name = Some(parts[2].trim())
        .filter(|raw| !raw.is_empty())
        .map(str::to_string);

    let code = parts
        .last()
        .map(|raw| raw.trim())
        .and_then(|raw| raw.split('_').next())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string);

    StudentIdentity { id, name, code }
}

/// 兜底：`姓_名_...` 形式，输出 "名 姓"
fn underscore_name(filename: &str) -> Option<String> {
    let mut pieces = filename.split('_');
    let last_name = pieces.next()?;
    let first_name = pieces.next()?;
    Some(format!("{} {}", first_name, last_name))
}
