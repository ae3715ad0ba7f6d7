/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// General cleaning applied to extracted text before chunking.
pub fn clean_text(text: &str) -> String {
    normalize_whitespace(&text.replace('\u{a0}', " "))
}
