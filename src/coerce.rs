//! 数値の寛容な変換。
//!
//! スナップショットも既存のセーブデータも値の型が揃っている保証はない
//! (数値だったり `"40"` のような文字列だったりする)。ここでは JavaScript の
//! `parseInt` と同じ読み方で整数に直し、読めない値は 0 に落とす。
//! 失敗はここで吸収し、呼び出し側には伝えない。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `parseInt` 互換: 先頭の空白を読み飛ばし、符号と連続する数字だけを読む。
/// 数字が一つも無ければ `None`。
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate instead of failing.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Any JSON value to a signed integer, zero when it cannot be read.
pub fn int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_int_prefix(s).unwrap_or(0),
        _ => 0,
    }
}

/// Non-negative counter (levels, grades, eleph). Negative input clamps to zero.
pub fn count(value: &Value) -> u32 {
    u32::try_from(int(value).max(0)).unwrap_or(u32::MAX)
}

/// Text-ish value to a string label. Numbers keep their JSON spelling.
pub fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are false, anything else true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `deserialize_with` adapter for [`count`].
pub fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Value::deserialize(deserializer).map(|v| count(&v))
}

/// `deserialize_with` adapter for [`int`].
pub fn de_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Value::deserialize(deserializer).map(|v| int(&v))
}

/// `deserialize_with` adapter for [`label`].
pub fn de_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| label(&v))
}

/// `deserialize_with` adapter for [`truthy`].
pub fn de_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|v| truthy(&v))
}

/// Optional text: only a JSON string counts, anything else reads as absent.
pub fn de_opt_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Value::deserialize(deserializer).map(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    })
}
