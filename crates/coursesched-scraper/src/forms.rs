//! Generic HTML form extractor.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup::{before_ci, extract_attribute, find_ci, split_ci};

static FIELD_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(input|select|textarea)\b[^>]*>").expect("valid field regex")
});
static SELECTED_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<option\b[^>]*\bselected\b[^>]*>").expect("valid selected option regex")
});
static OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<option\b[^>]*>").expect("valid option regex"));

/// One named field and its candidate values.
///
/// For a `<select>`, the selected option's value comes first, followed by the
/// remaining options in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInput {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Form {
    pub action: String,
    /// Uppercased; `GET` when the attribute is absent.
    pub method: String,
    pub inputs: Vec<FormInput>,
}

/// Extracts every form in `html`, in document order.
///
/// Malformed markup degrades per field: a select or textarea without a
/// closing tag, or a field without a value, yields an empty values list.
#[must_use]
pub fn parse_forms(html: &str) -> Vec<Form> {
    split_ci(html, "<form")
        .into_iter()
        .skip(1)
        .map(|fragment| parse_form(before_ci(fragment, "</form>")))
        .collect()
}

fn parse_form(fragment: &str) -> Form {
    let (open_tag, body) = fragment.split_once('>').unwrap_or((fragment, ""));

    let action = extract_attribute(open_tag, "action").unwrap_or_default();
    let method = extract_attribute(open_tag, "method")
        .map_or_else(|| "GET".to_string(), |m| m.to_ascii_uppercase());

    let body: String = body.chars().filter(|c| *c != '\r' && *c != '\n').collect();

    let mut inputs = Vec::new();
    let mut cursor = 0;
    while let Some(caps) = FIELD_OPEN.captures_at(&body, cursor) {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let tag = whole.as_str();
        let name = extract_attribute(tag, "name").unwrap_or_default();
        cursor = whole.end();

        let values = match kind.as_str().to_ascii_lowercase().as_str() {
            "select" => match find_ci(&body, "</select>", whole.end()) {
                Some(close) => {
                    cursor = close + "</select>".len();
                    select_values(&body[whole.end()..close])
                }
                None => Vec::new(),
            },
            "textarea" => match find_ci(&body, "</textarea>", whole.end()) {
                Some(close) => {
                    cursor = close + "</textarea>".len();
                    extract_attribute(tag, "value").into_iter().collect()
                }
                None => Vec::new(),
            },
            _ => extract_attribute(tag, "value").into_iter().collect(),
        };

        inputs.push(FormInput { name, values });
    }

    Form {
        action,
        method,
        inputs,
    }
}

fn select_values(options: &str) -> Vec<String> {
    let mut values = Vec::new();
    let remaining = match SELECTED_OPTION.find(options) {
        Some(selected) => {
            values.extend(extract_attribute(selected.as_str(), "value"));
            format!("{}{}", &options[..selected.start()], &options[selected.end()..])
        }
        None => options.to_string(),
    };
    values.extend(
        OPTION
            .find_iter(&remaining)
            .filter_map(|option| extract_attribute(option.as_str(), "value")),
    );
    values
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
