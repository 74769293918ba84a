use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::models::FoodItem;

/// Which recovery step produced the parsed value. Each step is more
/// permissive than the one before it and only runs when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    FencedBlock,
    BracketScan,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Direct => "direct",
            Strategy::FencedBlock => "fenced_block",
            Strategy::BracketScan => "bracket_scan",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub items: Vec<FoodItem>,  // may be empty
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no JSON could be recovered from the model reply")]
pub struct ExtractionError;

/// Recover food items from a raw model reply.
///
/// The reply is tried as bare JSON, then as the body of a ``` fenced block,
/// then as the span from the first `[` to the last `]`. Whatever parses is
/// normalized into a list; a value with no food-shaped content becomes an
/// empty list rather than an error.
pub fn extract_food_items(reply: &str) -> Result<Extraction, ExtractionError> {
    let (value, strategy) = recover_json(reply).ok_or(ExtractionError)?;
    log::debug!("🧩 Recovered JSON via {} strategy: {}", strategy, value);

    let items = normalize(value);
    Ok(Extraction { items, strategy })
}

fn recover_json(reply: &str) -> Option<(Value, Strategy)> {
    let content = reply.trim();

    if let Ok(value) = serde_json::from_str(content) {
        return Some((value, Strategy::Direct));
    }
    log::debug!("Direct JSON parse failed, trying fenced block...");

    if let Some(block) = fenced_block(content) {
        match serde_json::from_str(block) {
            Ok(value) => return Some((value, Strategy::FencedBlock)),
            Err(e) => log::debug!("Fenced block is not valid JSON: {}", e),
        }
    }

    if let Some(span) = bracket_span(content) {
        match serde_json::from_str(span) {
            Ok(value) => return Some((value, Strategy::BracketScan)),
            Err(e) => log::debug!("Bracketed span is not valid JSON: {}", e),
        }
    }

    None
}

/// Body of the first ``` fence, with an optional `json` tag removed.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")? + 3;
    let rest = &text[open..];
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let close = rest.find("```")?;
    Some(rest[..close].trim())
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

fn normalize(value: Value) -> Vec<FoodItem> {
    match value {
        Value::Array(elements) => coerce_all(elements),
        Value::Object(mut map) => {
            if let Some(list) = take_food_list(&mut map) {
                coerce_all(list)
            } else if looks_like_food(&map) {
                coerce(&map).into_iter().collect()
            } else {
                log::debug!("Parsed object carries no food list, treating as empty");
                Vec::new()
            }
        }
        other => {
            log::debug!("Parsed scalar {} carries no foods, treating as empty", other);
            Vec::new()
        }
    }
}

/// `food_items` wins; otherwise the first field holding an array with at
/// least one food-shaped object.
fn take_food_list(map: &mut Map<String, Value>) -> Option<Vec<Value>> {
    if matches!(map.get("food_items"), Some(Value::Array(_))) {
        if let Some(Value::Array(list)) = map.remove("food_items") {
            return Some(list);
        }
    }

    let key = map
        .iter()
        .find(|(_, v)| matches!(v, Value::Array(list) if list.iter().any(is_food_shaped)))
        .map(|(k, _)| k.clone())?;

    match map.remove(&key) {
        Some(Value::Array(list)) => Some(list),
        _ => None,
    }
}

fn is_food_shaped(value: &Value) -> bool {
    value.as_object().and_then(food_name).is_some()
}

fn looks_like_food(map: &Map<String, Value>) -> bool {
    food_name(map).is_some() && map.get("estimated_calories").and_then(as_number).is_some()
}

fn food_name(map: &Map<String, Value>) -> Option<&str> {
    map.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
}

fn coerce_all(elements: Vec<Value>) -> Vec<FoodItem> {
    let total = elements.len();
    let items: Vec<FoodItem> = elements
        .iter()
        .filter_map(|element| element.as_object().and_then(coerce))
        .collect();

    if items.len() < total {
        log::warn!("⚠️ Dropped {} of {} elements without a usable name", total - items.len(), total);
    }
    items
}

/// Missing or unusable numbers become 0; only a missing name rejects.
fn coerce(map: &Map<String, Value>) -> Option<FoodItem> {
    let name = food_name(map)?.to_string();
    let number = |field: &str| map.get(field).and_then(as_number).unwrap_or(0.0);

    Some(FoodItem {
        name,
        estimated_calories: number("estimated_calories"),
        estimated_protein: number("estimated_protein"),
        assumed_weight_g: number("assumed_weight_g"),
        notes: map
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Non-negative finite number, accepting numeric strings like "250".
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}
