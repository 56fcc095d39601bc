//! Text helpers shared by the timeline, the signals and the feed parser.

/// Truncate to at most `max_chars` characters, appending "..." when cut.
/// Prefers breaking at the last space inside the limit.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(last_space) if last_space > 0 => format!("{}...", cut[..last_space].trim_end()),
        _ => format!("{}...", cut),
    }
}

/// Lowercased word tokens with surrounding punctuation removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Extract clean text content from HTML
pub fn strip_html(html: &str) -> String {
    html.chars()
        .fold((String::new(), false), |(mut text, in_tag), c| match c {
            '<' => (text, true),
            '>' => {
                text.push(' ');
                (text, false)
            }
            _ if !in_tag => {
                text.push(c);
                (text, in_tag)
            }
            _ => (text, in_tag),
        })
        .0
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive substring check. Empty needles never match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle)
}
