/// 上传的试卷文件
///
/// 每个请求独立持有，提取文本后即释放。
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Vec<u8>,
    /// 客户端声明的 MIME 类型
    pub media_type: String,
    /// 原始文件名（仅用于日志）
    pub file_name: Option<String>,
}

impl UploadedDocument {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 学生做错的题号列表，保持原始顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrongQuestionList(Vec<String>);

impl WrongQuestionList {
    /// 解析逗号分隔的题号，去掉首尾空白并忽略空项
    ///
    /// `"3, 7,12"` → `["3", "7", "12"]`，`""` → `[]`
    ///
    /// 空项不计入题目数量：`"3,,7"` 按 2 道错题出题，而不是 3 道。
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for WrongQuestionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}
