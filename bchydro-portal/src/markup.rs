//! Response body cleanup and HTML token scan.
//!
//! The portal's pages are not valid HTML, so the session token is found
//! with a text search around the element id instead of a DOM parse.

/// Version of the landing page layout the token scan expects.
///
/// Bump this when the portal changes how `bchydroparam` is embedded.
pub const TOKEN_FORMAT_VERSION: u32 = 1;

/// Element id that wraps the session token.
pub const TOKEN_ELEMENT_ID: &str = "bchydroparam";

/// Decodes a body as UTF-8 and drops bytes that trip up the parsers.
///
/// Invalid sequences, control characters other than tab, line feed and
/// carriage return, and byte order marks are removed.
pub fn clean_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .chars()
        .filter(|c| !is_noise(*c))
        .collect()
}

fn is_noise(c: char) -> bool {
    matches!(c, '\u{FFFD}' | '\u{FEFF}') || (c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
}

/// Finds the text content of the element whose id is `bchydroparam`.
///
/// Returns `None` if the element is missing or its content is blank.
///
/// ```
/// use bchydro_portal::markup::extract_session_token;
///
/// let html = r#"<html><div id="bchydroparam">TOKEN123</div></html>"#;
/// assert_eq!(extract_session_token(html), Some("TOKEN123".to_string()));
/// ```
pub fn extract_session_token(markup: &str) -> Option<String> {
    let markers = [
        format!("id=\"{TOKEN_ELEMENT_ID}\""),
        format!("id='{TOKEN_ELEMENT_ID}'"),
    ];

    markers.iter().find_map(|marker| {
        let pos = markup.find(marker.as_str())?;
        let after = &markup[pos + marker.len()..];
        let content = &after[after.find('>')? + 1..];
        let end = content.find('<').unwrap_or(content.len());
        let token = content[..end].trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_double_quotes() {
        let html = r#"<html><body><span class="x" id="bchydroparam" hidden>TOKEN123</span></body></html>"#;
        assert_eq!(extract_session_token(html), Some("TOKEN123".to_string()));
    }

    #[test]
    fn test_token_single_quotes_and_whitespace() {
        let html = "<div id='bchydroparam'>\n   abc-def  \n</div>";
        assert_eq!(extract_session_token(html), Some("abc-def".to_string()));
    }

    #[test]
    fn test_token_missing() {
        assert_eq!(extract_session_token("<html><body>Sign in</body></html>"), None);
    }

    #[test]
    fn test_token_blank_is_missing() {
        assert_eq!(extract_session_token(r#"<div id="bchydroparam">   </div>"#), None);
        assert_eq!(extract_session_token(r#"<div id="bchydroparam"></div>"#), None);
    }

    #[test]
    fn test_token_truncated_page() {
        assert_eq!(extract_session_token(r#"<div id="bchydroparam""#), None);
        assert_eq!(
            extract_session_token(r#"<div id="bchydroparam">TAIL"#),
            Some("TAIL".to_string())
        );
    }

    #[test]
    fn test_similar_id_not_matched() {
        assert_eq!(extract_session_token(r#"<div id="bchydroparams">X</div>"#), None);
    }

    #[test]
    fn test_clean_text_strips_noise() {
        let raw = b"\xEF\xBB\xBF<a>\x00ok\x1b\tnext\r\n\xFF</a>";
        assert_eq!(clean_text(raw), "<a>ok\tnext\r\n</a>");
    }

    #[test]
    fn test_clean_text_keeps_unicode() {
        assert_eq!(clean_text("café 12¢".as_bytes()), "café 12¢");
    }
}
