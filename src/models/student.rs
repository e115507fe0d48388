/// 从文件名中解析出的学生身份信息
///
/// 每个字段都可能缺失，由调用方提供默认值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentIdentity {
    /// 学号
    pub id: Option<String>,
    /// 显示名称
    pub name: Option<String>,
    /// 院系/班级代码
    pub code: Option<String>,
}

impl StudentIdentity {
    /// 三个字段都没有解析出来
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.code.is_none()
    }
}
