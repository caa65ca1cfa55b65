//! 模型回复解析 - 业务能力层
//!
//! 从模型的原始回复中找出 JSON 数组，并逐题校验结构

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ResponseError;
use crate::models::quiz::OPTION_COUNT;
use crate::models::{QuizItem, QuizResult};

/// 解析模型回复
///
/// 取第一个 `[` 到最后一个 `]` 之间（含）的内容做 JSON 解析，然后校验每道题的
/// 五个字段。只要有一道题不合格，整批作废，不返回部分结果。
///
/// 注意：如果数组前面的说明文字里出现了 `[`，截取范围会包含这段文字，
/// 结果是 `ResponseError::Parse`。
pub fn parse_quiz_response(raw: &str) -> Result<QuizResult, ResponseError> {
    let json_slice = locate_array(raw).ok_or(ResponseError::Format {
        response_len: raw.chars().count(),
    })?;

    let parsed: Vec<Value> = serde_json::from_str(json_slice)?;
    debug!("模型回复中解析到 {} 个元素", parsed.len());

    parsed
        .iter()
        .enumerate()
        .map(|(index, value)| validate_item(index, value))
        .collect()
}

/// 找到第一个 `[` 和最后一个 `]`
fn locate_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn validate_item(index: usize, value: &Value) -> Result<QuizItem, ResponseError> {
    let object = value.as_object().ok_or_else(|| ResponseError::Schema {
        index,
        field: "<item>",
        problem: format!("应为对象，实际为 {}", type_name(value)),
    })?;

    Ok(QuizItem {
        original_id: string_field(index, object, "originalId")?,
        question: string_field(index, object, "question")?,
        options: options_field(index, object)?,
        answer: string_field(index, object, "answer")?,
        explanation: string_field(index, object, "explanation")?,
    })
}

fn string_field(
    index: usize,
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ResponseError> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ResponseError::Schema {
            index,
            field,
            problem: format!("应为字符串，实际为 {}", type_name(other)),
        }),
        None => Err(ResponseError::Schema {
            index,
            field,
            problem: "缺少字段".to_string(),
        }),
    }
}

fn options_field(
    index: usize,
    object: &Map<String, Value>,
) -> Result<[String; OPTION_COUNT], ResponseError> {
    let schema_error = |problem: String| ResponseError::Schema {
        index,
        field: "options",
        problem,
    };

    let entries = match object.get("options") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(schema_error(format!(
                "应为数组，实际为 {}",
                type_name(other)
            )))
        }
        None => return Err(schema_error("缺少字段".to_string())),
    };

    if entries.len() != OPTION_COUNT {
        return Err(schema_error(format!(
            "应有 {} 个选项，实际有 {} 个",
            OPTION_COUNT,
            entries.len()
        )));
    }

    let options = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::String(s) => Ok(s.clone()),
            other => Err(schema_error(format!(
                "第 {} 个选项应为字符串，实际为 {}",
                i + 1,
                type_name(other)
            ))),
        })
        .collect::<Result<Vec<String>, ResponseError>>()?;

    options
        .try_into()
        .map_err(|_| schema_error("选项数量不正确".to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_json(id: &str, answer: &str) -> Value {
        json!({
            "originalId": id,
            "question": format!("第 {id} 题的变式"),
            "options": ["a", "b", "c", "d"],
            "answer": answer,
            "explanation": "..."
        })
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let raw = r#"Here you go [{"originalId":"3","question":"...","options":["a","b","c","d"],"answer":"a","explanation":"..."},{"originalId":"7","question":"...","options":["a","b","c","d"],"answer":"b","explanation":"..."}] thanks"#;

        let quiz = parse_quiz_response(raw).unwrap();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].original_id, "3");
        assert_eq!(quiz[0].answer, "a");
        assert_eq!(quiz[1].original_id, "7");
        assert_eq!(quiz[1].answer, "b");
    }

    #[test]
    fn test_preserves_order_for_many_items() {
        let ids: Vec<String> = (1..=12).rev().map(|i| i.to_string()).collect();
        let items: Vec<Value> = ids.iter().map(|id| item_json(id, "a")).collect();
        let raw = format!(
            "好的，以下是题目：\n```json\n{}\n```\n祝学习顺利！",
            serde_json::to_string_pretty(&items).unwrap()
        );

        let quiz = parse_quiz_response(&raw).unwrap();
        let parsed_ids: Vec<&str> = quiz.iter().map(|q| q.original_id.as_str()).collect();
        assert_eq!(parsed_ids, ids.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_array_is_valid() {
        let quiz = parse_quiz_response("[]").unwrap();
        assert!(quiz.is_empty());
    }

    #[test]
    fn test_missing_brackets_is_format_error() {
        for raw in ["", "no json here", "only open [", "only close ]", "] reversed ["] {
            let result = parse_quiz_response(raw);
            assert!(
                matches!(result, Err(ResponseError::Format { .. })),
                "{raw:?} should be a format error"
            );
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_quiz_response("here [{\"originalId\": 3,,}] done");
        assert!(matches!(result, Err(ResponseError::Parse(_))));
    }

    #[test]
    fn test_brackets_in_prose_before_array_fail_to_parse() {
        let raw = format!("see note [1] below: {}", json!([item_json("1", "a")]));
        let result = parse_quiz_response(&raw);
        assert!(matches!(result, Err(ResponseError::Parse(_))));
    }

    #[test]
    fn test_top_level_array_of_non_objects_is_schema_error() {
        let result = parse_quiz_response("[1, 2]");
        match result {
            Err(ResponseError::Schema { index, field, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(field, "<item>");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_option_count_is_schema_error() {
        let mut item = item_json("3", "a");
        item["options"] = json!(["a", "b", "c"]);
        let result = parse_quiz_response(&json!([item]).to_string());
        match result {
            Err(ResponseError::Schema { field, .. }) => assert_eq!(field, "options"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_string_option_is_schema_error() {
        let mut item = item_json("3", "a");
        item["options"] = json!(["a", "b", 3, "d"]);
        let result = parse_quiz_response(&json!([item]).to_string());
        assert!(matches!(
            result,
            Err(ResponseError::Schema { field: "options", .. })
        ));
    }

    #[test]
    fn test_wrong_field_type_is_schema_error() {
        let mut item = item_json("3", "a");
        item["originalId"] = json!(3);
        let result = parse_quiz_response(&json!([item]).to_string());
        assert!(matches!(
            result,
            Err(ResponseError::Schema { index: 0, field: "originalId", .. })
        ));
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let mut item = item_json("3", "a");
        item.as_object_mut().unwrap().remove("explanation");
        let result = parse_quiz_response(&json!([item]).to_string());
        assert!(matches!(
            result,
            Err(ResponseError::Schema { field: "explanation", .. })
        ));
    }

    #[test]
    fn test_one_bad_item_rejects_whole_batch() {
        let mut bad = item_json("7", "b");
        bad["answer"] = Value::Null;
        let raw = json!([item_json("3", "a"), bad, item_json("9", "c")]).to_string();

        match parse_quiz_response(&raw) {
            Err(ResponseError::Schema { index, field, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "answer");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut item = item_json("5", "d");
        item["difficulty"] = json!("medium");
        let quiz = parse_quiz_response(&json!([item]).to_string()).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].options[3], "d");
    }
}
