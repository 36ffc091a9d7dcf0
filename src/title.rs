//! Human-readable titles for references and schema nodes.

use crate::schema::SchemaNode;

/// Title for a reference/schema pair, if one can be derived.
///
/// Precedence: the schema's explicit `title`, then the last reference
/// segment human-cased. Returns `None` when neither yields anything.
pub fn find_title(reference: &str, schema: &SchemaNode) -> Option<String> {
    if let Some(title) = schema.as_object().and_then(|obj| obj.title.as_deref()) {
        return Some(title.to_string());
    }
    last_segment(reference)
        .map(humanize)
        .filter(|t| !t.is_empty())
}

/// Title for a reference/schema pair; falls back to the reference string
/// verbatim. Deterministic, never fails.
pub fn resolve_title(reference: &str, schema: &SchemaNode) -> String {
    find_title(reference, schema).unwrap_or_else(|| reference.to_string())
}

fn last_segment(reference: &str) -> Option<String> {
    let (document, fragment) = match reference.find('#') {
        Some(idx) => (&reference[..idx], &reference[idx + 1..]),
        None => (reference, ""),
    };
    fragment
        .rsplit('/')
        .find(|s| !s.is_empty())
        // JSON Pointer unescape (~1 = /, ~0 = ~)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .or_else(|| {
            document
                .rsplit('/')
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
}

/// Split a segment on case and separator boundaries and capitalize each
/// word: `orderItem`, `order_item` and `order-item` all become
/// `Order Item`.
fn humanize(segment: String) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in segment.chars() {
        if ch == '-' || ch == '_' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            let boundary = ch.is_uppercase()
                && current
                    .chars()
                    .last()
                    .map_or(false, |prev| prev.is_lowercase() || prev.is_ascii_digit());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<String>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
