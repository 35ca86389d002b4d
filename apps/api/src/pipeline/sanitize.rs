//! Response sanitation — strips code-fence decoration the generation
//! endpoint wraps around structured payloads.
//!
//! Sanitation never repairs malformed structure; that is the parsers' job.

/// Strips ```json ... ``` or ``` ... ``` fences and surrounding whitespace.
///
/// Runs to a fixpoint, so `sanitize(sanitize(x)) == sanitize(x)` holds for
/// every input.
pub fn sanitize(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let stripped = strip_fences(text);
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

/// One stripping pass: a leading fence (with optional info string, e.g.
/// "json") and a matching trailing fence.
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string up to the end of the fence line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
