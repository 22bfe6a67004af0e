/// Collapses one level of backslash escaping in a code snippet.
///
/// Snippets pasted through a JSON string literal twice end up with literal `\n`, `\t`,
/// `\"` and `\\` sequences; this turns them back into the characters they stand for.
/// Unknown escapes are left as they are.
pub fn unescape_snippet(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('"') => '"',
            Some('\\') => '\\',
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        out.push(replacement);
    }
    out
}
