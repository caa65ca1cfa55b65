//! 提示词构建 - 业务能力层
//!
//! 把试卷文字和错题号码组合成一条完整的出题指令

use crate::models::WrongQuestionList;

/// 构建出题提示词
///
/// 提示词中写明需要生成的题目数量（等于错题数量），错题列表为空时要求生成 0 道题。
/// 试卷文字原样放入，不做截断。
///
/// # 参数
/// - `document_text`: 从试卷中提取的文字
/// - `wrong_questions`: 学生做错的题号
///
/// # 返回
/// 返回发送给模型的完整提示词
pub fn build_quiz_prompt(document_text: &str, wrong_questions: &WrongQuestionList) -> String {
    let count = wrong_questions.len();
    let id_list = if wrong_questions.is_empty() {
        "（无）".to_string()
    } else {
        wrong_questions.ids().join("、")
    };

    format!(
        r#"你是一位经验丰富的高中数学老师。下面是一份试卷的文字内容：
---
{document_text}
---

这位学生做错了以下题目：{id_list}。
请针对这些错题，为他设计 {count} 道新的变式题：每道错题对应一道，数字要与原题不同，但题型和难度保持相近。

【输出要求】
- 只返回一个 JSON 数组，数组中恰好包含 {count} 个对象，不要输出任何多余的文字、注释或 Markdown 标记
- 每个对象必须包含以下 5 个字段，且全部为字符串（options 为恰好 4 个字符串组成的数组）：
[
    {{
        "originalId": "原题题号",
        "question": "新的题目描述",
        "options": ["选项A", "选项B", "选项C", "选项D"],
        "answer": "正确答案",
        "explanation": "解题思路说明"
    }}
]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_requested_count() {
        for raw in ["1", "3,7", "1,2,3,4,5", "10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20"] {
            let list = WrongQuestionList::parse(raw);
            let prompt = build_quiz_prompt("试卷内容", &list);
            assert!(
                prompt.contains(&format!("设计 {} 道新的变式题", list.len())),
                "prompt for {raw:?} should request {} items",
                list.len()
            );
            assert!(prompt.contains(&format!("恰好包含 {} 个对象", list.len())));
        }
    }

    #[test]
    fn test_prompt_for_two_wrong_questions() {
        let text = "第3题：解方程 2x+1=7\n第7题：求函数 y=x^2 的最小值";
        let list = WrongQuestionList::parse("3,7");
        let prompt = build_quiz_prompt(text, &list);

        assert!(prompt.contains("设计 2 道新的变式题"));
        assert!(prompt.contains("3、7"));
        assert!(prompt.contains(text));
    }

    #[test]
    fn test_empty_list_requests_zero_items() {
        let prompt = build_quiz_prompt("试卷内容", &WrongQuestionList::parse(""));
        assert!(prompt.contains("设计 0 道新的变式题"));
        assert!(prompt.contains("（无）"));
    }

    #[test]
    fn test_long_document_is_not_truncated() {
        let text = "第1题 计算 1+1。".repeat(20_000);
        let prompt = build_quiz_prompt(&text, &WrongQuestionList::parse("1"));
        assert!(prompt.contains(&text));
        assert!(prompt.len() > text.len());
    }

    #[test]
    fn test_prompt_describes_output_schema() {
        let prompt = build_quiz_prompt("x", &WrongQuestionList::parse("1"));
        for field in ["originalId", "question", "options", "answer", "explanation"] {
            assert!(prompt.contains(&format!("\"{field}\"")));
        }
    }
}
