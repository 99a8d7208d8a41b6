/// Strips markup tags and trims surrounding whitespace.
///
/// Everything between `<` and the next `>` is dropped, including the
/// brackets; a `<` with no closing `>` drops the rest of the input. The
/// output never contains `<`, which makes a second pass a no-op.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}
