use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 参考答案文件集合（文件名 → 文本），每次上传整体替换
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceFileSet {
    files: BTreeMap<String, String>,
}

impl ReferenceFileSet {
    /// 从内存中的 (文件名, 内容) 构建，同名文件后者覆盖前者
    pub fn from_files<I, N, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(name, content)| (name.into(), content.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// 排序后的文件名
    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
