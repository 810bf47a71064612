//! 报告组装 - 编排层
//!
//! 把 `AggregateReport` 转换成对外返回的 JSON 结构：
//!
//! ```text
//! {
//!   "original_text": "...",
//!   "corrected_text": "..." | null,
//!   "sapling": { ... } | { "error_kind": "...", "message": "..." },
//!   ...
//! }
//! ```

use crate::models::{AggregateReport, ErrorKind, ProviderIdentity, ProviderResult};
use serde_json::{json, Map, Value as JsonValue};

/// 报告组装器（纯函数，无状态）
pub struct ReportAssembler;

impl ReportAssembler {
    /// 合并所有服务结果
    ///
    /// 每个 `ProviderIdentity` 都会出现在输出中；报告里缺失的条目
    /// 记为 `InternalError`，不会 panic。
    pub fn merge(original_text: &str, report: &AggregateReport) -> JsonValue {
        let mut shape = Map::new();
        shape.insert("original_text".to_string(), json!(original_text));

        let corrected = report
            .get(ProviderIdentity::Grammar)
            .and_then(|r| r.payload())
            .and_then(|payload| corrected_text(original_text, payload));
        shape.insert("corrected_text".to_string(), json!(corrected));

        for provider in ProviderIdentity::ALL {
            let entry = match report.get(provider) {
                Some(result) => render(result),
                None => render(&ProviderResult::failure(
                    ErrorKind::InternalError,
                    format!("{} 没有返回结果", provider),
                )),
            };
            shape.insert(provider.field_name().to_string(), entry);
        }

        JsonValue::Object(shape)
    }
}

fn render(result: &ProviderResult) -> JsonValue {
    match result {
        ProviderResult::Success(payload) => payload.clone(),
        ProviderResult::Failure { kind, message } => json!({
            "error_kind": kind,
            "message": message,
        }),
    }
}

/// 从语法服务的响应中得到修正后的文本
///
/// 优先使用响应里的 `corrected_text`，否则把 `edits` 应用到原文上。
fn corrected_text(original_text: &str, payload: &JsonValue) -> Option<String> {
    if let Some(text) = payload.get("corrected_text").and_then(JsonValue::as_str) {
        return Some(text.to_string());
    }
    let edits = payload.get("edits")?.as_array()?;
    Some(apply_edits(original_text, edits))
}

/// 一处修改，偏移量按字符计
#[derive(Debug, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

impl Edit {
    /// 解析一条 edit；`start`/`end` 相对句子，`sentence_start` 为句子在全文中的偏移
    fn parse(value: &JsonValue) -> Option<Self> {
        let offset = value
            .get("sentence_start")
            .and_then(JsonValue::as_u64)
            .unwrap_or(0);
        let start = value.get("start")?.as_u64()?.checked_add(offset)?;
        let end = value.get("end")?.as_u64()?.checked_add(offset)?;
        let replacement = value.get("replacement")?.as_str()?.to_string();

        (start <= end).then_some(Edit {
            start: usize::try_from(start).ok()?,
            end: usize::try_from(end).ok()?,
            replacement,
        })
    }
}

/// 按起始位置应用修改，越界或重叠的 edit 被忽略
fn apply_edits(original_text: &str, edits: &[JsonValue]) -> String {
    let chars: Vec<char> = original_text.chars().collect();
    let mut parsed: Vec<Edit> = edits.iter().filter_map(Edit::parse).collect();
    parsed.sort_by_key(|e| (e.start, e.end));

    let mut output = String::with_capacity(original_text.len());
    let mut cursor = 0;
    for edit in parsed {
        if edit.start < cursor || edit.end > chars.len() {
            continue;
        }
        output.extend(&chars[cursor..edit.start]);
        output.push_str(&edit.replacement);
        cursor = edit.end;
    }
    output.extend(&chars[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESSAY: &str = "hi my namme iss lavi. mice to meet you.";

    fn sapling_payload() -> JsonValue {
        json!({
            "edits": [
                { "start": 16, "end": 20, "replacement": "Lavi", "sentence_start": 0 },
                { "start": 6, "end": 11, "replacement": "name", "sentence_start": 0 },
                { "start": 12, "end": 15, "replacement": "is", "sentence_start": 0 },
                { "start": 0, "end": 4, "replacement": "Nice", "sentence_start": 22 },
                { "start": 0, "end": 2, "replacement": "Hi", "sentence_start": 0 }
            ]
        })
    }

    #[test]
    fn test_edits_are_applied_in_position_order() {
        let corrected = corrected_text(ESSAY, &sapling_payload()).unwrap();
        assert_eq!(corrected, "Hi my name is Lavi. Nice to meet you.");
    }

    #[test]
    fn test_explicit_corrected_text_wins() {
        let payload = json!({ "corrected_text": "Already fixed.", "edits": [] });
        assert_eq!(corrected_text(ESSAY, &payload).unwrap(), "Already fixed.");
    }

    #[test]
    fn test_out_of_range_and_overlapping_edits_are_skipped() {
        let edits = vec![
            json!({ "start": 0, "end": 5, "replacement": "HELLO" }),
            json!({ "start": 3, "end": 7, "replacement": "overlap" }),
            json!({ "start": 90, "end": 95, "replacement": "far away" }),
            json!({ "start": 4, "end": 2, "replacement": "reversed" }),
        ];
        assert_eq!(apply_edits("hello world", &edits), "HELLO world");
    }

    /// 偏移量相加溢出的 edit 直接丢弃，不 panic
    #[test]
    fn test_overflowing_offsets_are_skipped() {
        let mut report = AggregateReport::new("hello");
        report.insert(
            ProviderIdentity::Grammar,
            ProviderResult::Success(json!({
                "edits": [
                    { "start": u64::MAX, "end": u64::MAX, "replacement": "x", "sentence_start": 1 },
                    { "start": 0, "end": u64::MAX, "replacement": "y", "sentence_start": 1 }
                ]
            })),
        );

        let shape = ReportAssembler::merge("hello", &report);

        assert_eq!(shape["corrected_text"], "hello");
    }

    #[test]
    fn test_multibyte_offsets_count_characters() {
        let edits = vec![json!({ "start": 3, "end": 4, "replacement": "e" })];
        assert_eq!(apply_edits("cafè au lait", &edits), "cafe au lait");
    }

    #[test]
    fn test_merge_emits_every_provider() {
        let mut report = AggregateReport::new(ESSAY);
        report.insert(ProviderIdentity::Grammar, ProviderResult::Success(sapling_payload()));
        report.insert(
            ProviderIdentity::OriginalityA,
            ProviderResult::failure(ErrorKind::RemoteError, "status=500"),
        );

        let shape = ReportAssembler::merge(ESSAY, &report);

        assert_eq!(shape["original_text"], ESSAY);
        assert_eq!(shape["corrected_text"], "Hi my name is Lavi. Nice to meet you.");
        assert_eq!(shape["copyleaks"]["error_kind"], "RemoteError");
        assert_eq!(shape["copyleaks"]["message"], "status=500");
        assert_eq!(shape["zotero_citations"]["error_kind"], "InternalError");
        for provider in ProviderIdentity::ALL {
            assert!(shape.get(provider.field_name()).is_some());
        }
    }

    #[test]
    fn test_failed_grammar_gives_null_corrected_text() {
        let mut report = AggregateReport::new(ESSAY);
        report.insert(
            ProviderIdentity::Grammar,
            ProviderResult::failure(ErrorKind::MissingCredential, "no key"),
        );

        let shape = ReportAssembler::merge(ESSAY, &report);

        assert!(shape["corrected_text"].is_null());
        assert_eq!(shape["sapling"]["error_kind"], "MissingCredential");
    }
}
