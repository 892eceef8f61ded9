use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::poe_item::ResultLineContent;
use crate::models::{LineContent, LineContentType, LineContentValue};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%(\d)").expect("placeholder pattern is valid"))
}

fn joined(values: &[LineContentValue]) -> String {
    values
        .iter()
        .map(|value| value.value.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitutes `%N` placeholders. Templates without a `%0` count from one.
fn fill_template(template: &str, values: &[LineContentValue]) -> String {
    let offset = if template.contains("%0") { 0 } else { 1 };

    placeholder_pattern()
        .replace_all(template, |captures: &Captures| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(offset))
                .and_then(|index| values.get(index))
                .map(|value| value.value.clone())
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Renders one property or requirement line the way the game displays it.
pub fn format_line(name: &str, values: &[LineContentValue], display_mode: i32) -> String {
    let Some(first) = values.first() else {
        return name.to_string();
    };

    match display_mode {
        0 if name.is_empty() => joined(values),
        0 => format!("{}: {}", name, joined(values)),
        1 => format!("{} {}", first.value, name),
        2 => first.value.clone(),
        3 => fill_template(name, values),
        _ => format!("{} {}", name, joined(values)),
    }
}

/// `[text, type]` pairs; anything else is skipped.
fn parse_values(raw: &[Vec<serde_json::Value>]) -> Vec<LineContentValue> {
    raw.iter()
        .filter(|pair| pair.len() == 2)
        .filter_map(|pair| {
            let value = pair[0].as_str()?.to_string();
            let r#type = pair[1]
                .as_i64()
                .map(|code| LineContentType::from(code as i32))
                .unwrap_or(LineContentType::Simple);
            Some(LineContentValue { value, r#type })
        })
        .collect()
}

/// Formats a group of API lines. Sorted by the API order unless `ordered` is false.
pub fn parse_line_contents(lines: Option<&[ResultLineContent]>, ordered: bool) -> Option<Vec<LineContent>> {
    let lines = lines?;

    let mut sorted: Vec<&ResultLineContent> = lines.iter().collect();
    if ordered {
        sorted.sort_by_key(|line| line.order);
    }

    Some(
        sorted
            .into_iter()
            .map(|line| {
                let values = parse_values(&line.values);
                LineContent {
                    text: format_line(&line.name, &values, line.display_mode),
                    values,
                }
            })
            .collect(),
    )
}
