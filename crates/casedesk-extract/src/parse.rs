//! Lenient reading of model replies.
//!
//! Models wrap JSON in code fences or prose and are loose with types. These
//! helpers find the JSON object and coerce the common variations; anything
//! that cannot be coerced becomes `None` with a warning.

use casedesk_core::vocab::{self, Vocabulary};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::{ExtractError, Result};

/// Locate the JSON object inside a model reply.
pub fn extract_json(reply: &str) -> Option<&str> {
  if let Some(start) = reply.find("```json") {
    let body = start + "```json".len();
    if let Some(end) = reply[body..].find("```") {
      return Some(reply[body..body + end].trim());
    }
  }

  if let Some(start) = reply.find("```") {
    let after = start + 3;
    if let Some(nl) = reply[after..].find('\n') {
      let body = after + nl + 1;
      if let Some(end) = reply[body..].find("```") {
        let candidate = reply[body..body + end].trim();
        if candidate.starts_with('{') {
          return Some(candidate);
        }
      }
    }
  }

  let trimmed = reply.trim();
  if trimmed.starts_with('{') {
    return Some(trimmed);
  }

  // Embedded in prose: take the first balanced `{…}`.
  let start = reply.find('{')?;
  let mut depth = 0i32;
  let mut in_string = false;
  let mut escaped = false;
  for (i, c) in reply[start..].char_indices() {
    if in_string {
      match c {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }
    match c {
      '"' => in_string = true,
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth == 0 {
          return Some(&reply[start..start + i + 1]);
        }
      }
      _ => {}
    }
  }
  None
}

/// Parse the JSON object in `reply` as `T`.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
  let json = extract_json(reply)
    .ok_or_else(|| ExtractError::Malformed("no JSON object in reply".into()))?;
  serde_json::from_str(json).map_err(|e| ExtractError::Malformed(e.to_string()))
}

// ─── Field coercion ──────────────────────────────────────────────────────────

/// Trimmed, non-empty, and not a stand-in for "nothing".
pub fn present(raw: Option<String>) -> Option<String> {
  raw
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

/// Map a model-supplied string onto a vocabulary, dropping unknown values.
pub fn vocab_value<T: Vocabulary>(raw: Option<String>) -> Option<T> {
  let raw = present(raw)?;
  match vocab::parse::<T>(&raw) {
    Ok(value) => Some(value),
    Err(_) => {
      tracing::warn!(kind = T::KIND, value = %raw, "model returned unknown value");
      None
    }
  }
}

/// Map a list of model-supplied strings, dropping unknown values.
pub fn vocab_values<T: Vocabulary>(raw: Option<Vec<String>>) -> Vec<T> {
  raw
    .unwrap_or_default()
    .into_iter()
    .filter_map(|s| vocab_value(Some(s)))
    .collect()
}

pub fn date_value(field: &'static str, raw: Option<String>) -> Option<NaiveDate> {
  let raw = present(raw)?;
  match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
    Ok(date) => Some(date),
    Err(_) => {
      tracing::warn!(field, value = %raw, "model returned unparseable date");
      None
    }
  }
}

// ─── Deserializers ───────────────────────────────────────────────────────────

/// Accepts a string, a number, a bool, or null; keeps the text form.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  })
}

/// Accepts a list of strings, a single string, or null.
pub fn loose_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(items) => Some(
      items
        .into_iter()
        .filter_map(|v| match v {
          Value::String(s) => Some(s),
          _ => None,
        })
        .collect(),
    ),
    Value::String(s) => Some(vec![s]),
    _ => None,
  })
}

/// Accepts a JSON number or a numeric string.
pub fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  })
}

/// Accepts `true`/`false` or the strings `Yes`/`No`/`true`/`false`.
pub fn loose_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Bool(b) => Some(b),
    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
      "yes" | "y" | "true" => Some(true),
      "no" | "n" | "false" => Some(false),
      _ => None,
    },
    _ => None,
  })
}
