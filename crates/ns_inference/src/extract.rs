/// Models frequently wrap the requested JSON object in explanatory prose
/// or markdown fences. This takes the span from the first `{` to the last
/// `}` and hands it to the caller to parse; anything outside that span is
/// discarded.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract and deserialize the embedded JSON object, or `None` when no
/// parseable object is present.
pub fn parse_embedded_json<T: serde::de::DeserializeOwned>(text: &str) -> Option<T> {
    let span = extract_json_object(text)?;
    serde_json::from_str(span).ok()
}
