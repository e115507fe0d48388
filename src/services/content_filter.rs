//! 内容过滤 - 按扩展名判断压缩包条目是否为需要提取的源码/文本

use phf::phf_set;

/// 允许提取的扩展名（小写）
static TEXT_SOURCE_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "txt", "md",
    "c", "cpp", "h", "hpp",
    "java", "py", "js", "ts",
    "json", "xml", "html", "css",
    "s", "asm",
};

/// 判断相对路径是否为文本源码
///
/// 目录条目（以 `/` 结尾）和没有扩展名的条目一律拒绝
pub fn is_text_source(relative_path: &str) -> bool {
    if relative_path.ends_with('/') {
        return false;
    }

    match relative_path.rsplit_once('.') {
        Some((_, ext)) => TEXT_SOURCE_EXTENSIONS.contains(ext.to_lowercase().as_str()),
        None => false,
    }
}
