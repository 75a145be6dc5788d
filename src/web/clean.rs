//! RC-042: Cleaning of user-supplied text before it reaches the store.

/// Strip markup tags and control characters from a name or query.
/// A `<` that never closes is kept as literal text.
pub fn clean_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut tag: Option<String> = None;
    for c in input.chars() {
        if c.is_control() {
            continue;
        }
        match tag.as_mut() {
            None if c == '<' => tag = Some(String::new()),
            None => out.push(c),
            Some(_) if c == '>' => tag = None,
            // Only the innermost `<` can still open a tag.
            Some(pending) if c == '<' => {
                out.push('<');
                out.push_str(pending);
                pending.clear();
            }
            Some(pending) => pending.push(c),
        }
    }
    if let Some(pending) = tag {
        out.push('<');
        out.push_str(&pending);
    }
    out
}

/// Percent-encode a single URL path segment.
pub fn encode_segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
