/// Escapes Redis glob metacharacters so `input` matches literally in a
/// `SCAN MATCH` or `PSUBSCRIBE` pattern.
pub fn escape_glob(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
