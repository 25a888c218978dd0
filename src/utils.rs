//! Utility functions for the query engine

/// Tokens the grammar accepts as boolean true
pub const TRUTHY_TOKENS: &[&str] = &["true", "yes", "1", "on"];

/// Tokens the grammar accepts as boolean false
pub const FALSY_TOKENS: &[&str] = &["false", "no", "0", "off"];

pub fn is_truthy_token(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    TRUTHY_TOKENS.contains(&lower.as_str())
}

pub fn is_falsy_token(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    FALSY_TOKENS.contains(&lower.as_str())
}

pub fn is_boolean_token(text: &str) -> bool {
    is_truthy_token(text) || is_falsy_token(text)
}

/// Escape a string for safe embedding in HTML bodies and attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Epoch seconds, saturating to 0 if the clock is before the epoch
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Epoch milliseconds
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Best-effort resident set size in bytes. Reads /proc/self/statm on
/// Linux; returns 0 anywhere the probe is unavailable.
pub fn current_memory_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(statm) = std::fs::read_to_string("/proc/self/statm") {
            let mut fields = statm.split_whitespace();
            let _total = fields.next();
            if let Some(resident) = fields.next() {
                if let Ok(pages) = resident.parse::<u64>() {
                    return pages * 4096;
                }
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_tokens() {
        assert!(is_truthy_token("true"));
        assert!(is_truthy_token("YES"));
        assert!(is_falsy_token("False"));
        assert!(is_falsy_token("off"));
        assert!(!is_boolean_token("maybe"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>x</b>"), "&lt;b&gt;x&lt;/b&gt;");
        assert_eq!(escape_html(r#"a "b" & 'c'"#), "a &quot;b&quot; &amp; &#039;c&#039;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
