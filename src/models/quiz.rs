use serde::Serialize;

/// 每道题固定的选项数量
pub const OPTION_COUNT: usize = 4;

/// 一道生成的练习题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    /// 对应的原始题号
    pub original_id: String,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub answer: String,
    /// 解题思路说明
    pub explanation: String,
}

/// 一次请求生成的全部题目，顺序与模型返回一致
pub type QuizResult = Vec<QuizItem>;

impl std::fmt::Display for QuizItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题目内容以便显示（最多40个字符）
        let preview = if self.question.chars().count() > 40 {
            self.question.chars().take(40).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "[原题 {}] {}", self.original_id, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let item = QuizItem {
            original_id: "3".to_string(),
            question: "2x + 1 = 7，求 x".to_string(),
            options: [
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "4".to_string(),
            ],
            answer: "3".to_string(),
            explanation: "移项得 2x = 6".to_string(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["originalId"], "3");
        assert_eq!(value["options"].as_array().unwrap().len(), 4);
        assert!(value.get("original_id").is_none());
    }
}
