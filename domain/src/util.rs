//! Shared utility functions.

/// Cut `s` to at most `max_bytes`, backing off to the previous UTF-8
/// character boundary.
///
/// Used for log previews of backend replies and error bodies, which can be
/// arbitrarily large and are not guaranteed to be ASCII.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_reply_is_unchanged() {
        assert_eq!(truncate_str(r#"{"gap": "high"}"#, 240), r#"{"gap": "high"}"#);
        assert_eq!(truncate_str("", 8), "");
    }

    #[test]
    fn test_long_reply_is_cut() {
        assert_eq!(truncate_str("confidence: 80%", 10), "confidence");
    }

    #[test]
    fn test_cut_backs_off_inside_multibyte_char() {
        // 'é' is 2 bytes, '€' is 3 bytes
        let s = "café €5";
        assert_eq!(truncate_str(s, 4), "caf");
        assert_eq!(truncate_str(s, 5), "café");
        assert_eq!(truncate_str(s, 7), "café ");
        assert_eq!(truncate_str(s, 8), "café ");
    }
}
