//! Extraction of the JSON payload embedded in a listing page.
//!
//! This is the only code that knows how the payload is anchored in the
//! markup; when the storefront changes, this function is what gets updated.

use regex::Regex;

/// Returns the trimmed text of the first `<script>` element whose `id`
/// attribute equals `anchor`, or `None` if there is no such element or it is
/// empty.
#[must_use]
pub fn extract_script_payload(html: &str, anchor: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<script\b[^>]*\bid\s*=\s*["']{}["'][^>]*>(.*?)</script>"#,
        regex::escape(anchor)
    );
    let script_re = Regex::new(&pattern).ok()?;

    let content = script_re.captures(html)?.get(1)?.as_str().trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}
