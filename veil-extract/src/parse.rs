//! Best-effort parsing of the model's JSON answer.
//!
//! Models drift from the contract in predictable ways: Markdown fences,
//! a sentence of preamble, an object wrapping the array, amounts as
//! strings, dates without a year. Each of those is recovered here. Items
//! missing a usable date or amount are dropped individually; only a
//! response with no parseable JSON at all fails the chunk.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::warn;
use veil_core::{Category, TransactionCandidate};

use crate::error::{ExtractError, snippet};
use crate::prompt::{KEY_AMOUNT, KEY_CARD_LAST_FOUR, KEY_CATEGORY, KEY_DATE, KEY_DESCRIPTION};

const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Parse a raw model response into candidates.
pub fn parse_candidates(
    raw: &str,
    reference_year: i32,
) -> Result<Vec<TransactionCandidate>, ExtractError> {
    let payload = locate_payload(strip_code_fences(raw));
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ExtractError::malformed(format!("invalid JSON: {e}"), raw))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => unwrap_object(map, raw)?,
        other => {
            return Err(ExtractError::malformed(
                format!("expected a JSON array, got {}", kind(&other)),
                raw,
            ));
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| candidate_from(item, reference_year))
        .collect())
}

/// Remove a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let body = match after.find('\n') {
        Some(nl) if after[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &after[nl + 1..]
        }
        _ => after,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Slice from the first `[`/`{` to its last matching closer, dropping prose
/// around the JSON.
fn locate_payload(s: &str) -> &str {
    let Some(open) = s.find(|c: char| c == '[' || c == '{') else {
        return s;
    };
    let closer = if s[open..].starts_with('[') { ']' } else { '}' };
    match s.rfind(closer) {
        Some(close) if close > open => &s[open..=close],
        _ => &s[open..],
    }
}

fn unwrap_object(map: Map<String, Value>, raw: &str) -> Result<Vec<Value>, ExtractError> {
    if field(&map, KEY_DATE).is_some() {
        return Ok(vec![Value::Object(map)]);
    }
    map.into_iter()
        .find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        })
        .ok_or_else(|| ExtractError::malformed("object without a transaction array", raw))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Look a key up exactly, then ignoring case and underscores
/// (`card_last_four` finds `CardLastFour`).
fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(v) = map.get(key) {
        return Some(v);
    }
    let wanted = normalize_key(key);
    map.iter()
        .find(|(k, _)| normalize_key(k) == wanted)
        .map(|(_, v)| v)
}

fn normalize_key(k: &str) -> String {
    k.chars()
        .filter(|c| *c != '_' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

fn candidate_from(item: &Value, reference_year: i32) -> Option<TransactionCandidate> {
    let Some(obj) = item.as_object() else {
        warn!(item = %snippet(&item.to_string()), "dropping non-object transaction item");
        return None;
    };

    let date = field(obj, KEY_DATE)
        .and_then(Value::as_str)
        .and_then(|s| parse_date(s, reference_year));
    let Some(date) = date else {
        warn!(item = %snippet(&item.to_string()), "dropping transaction without a usable date");
        return None;
    };

    let Some(amount) = field(obj, KEY_AMOUNT).and_then(parse_amount) else {
        warn!(item = %snippet(&item.to_string()), "dropping transaction without a usable amount");
        return None;
    };

    let description = field(obj, KEY_DESCRIPTION)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_DESCRIPTION);

    let category = field(obj, KEY_CATEGORY)
        .and_then(Value::as_str)
        .map(Category::from_label)
        .unwrap_or(Category::NeedsReview);

    Some(TransactionCandidate {
        date,
        description: description.to_string(),
        amount,
        category,
        card_last_four: field(obj, KEY_CARD_LAST_FOUR).and_then(card_last_four),
    })
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Parse a statement date; a missing year becomes `reference_year`.
pub fn parse_date(s: &str, reference_year: i32) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Timestamps such as 2025-10-01T00:00:00
    if let Some(head) = s.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(d);
        }
    }

    parse_month_day(s, reference_year)
}

fn parse_month_day(s: &str, year: i32) -> Option<NaiveDate> {
    let s = s.trim_end_matches('日');
    let mut it = s.split(|c: char| matches!(c, '-' | '/' | '.' | '月'));
    let m: u32 = it.next()?.trim().parse().ok()?;
    let d: u32 = it.next()?.trim().parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, m, d)
}

/// Accept a JSON number or a numeric string such as `"¥1,234.50"` or
/// accounting-style `"(12.00)"`.
pub fn parse_amount(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
        }
        Value::String(s) => {
            let negative_parens = s.contains('(') && s.contains(')');
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(*c, '.' | '-' | '+'))
                .collect();
            let amount = Decimal::from_str(&cleaned).ok()?;
            Some(if negative_parens { -amount.abs() } else { amount })
        }
        _ => None,
    }
}

fn card_last_four(v: &Value) -> Option<String> {
    let digits: String = match v {
        Value::String(s) => s.chars().filter(|c| c.is_ascii_digit()).collect(),
        Value::Number(n) => n.to_string().chars().filter(|c| c.is_ascii_digit()).collect(),
        _ => return None,
    };
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].to_string())
}
