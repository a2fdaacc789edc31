/// Render variables as dotenv text in canonical form.
///
/// Keys are sorted byte-wise and written one per line. Integer values are
/// written bare; everything else is double-quoted with escapes, so the output
/// parses back to the same values as long as they contain no `$`.
pub fn marshal<I, K, V>(vars: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = vars.into_iter().collect();
    pairs.sort_by(|(left, _), (right, _)| left.as_ref().cmp(right.as_ref()));

    let mut out = String::new();
    for (idx, (key, value)) in pairs.iter().enumerate() {
        // The sort is stable, so the last of several equal keys wins.
        if pairs
            .get(idx + 1)
            .is_some_and(|(next, _)| next.as_ref() == key.as_ref())
        {
            continue;
        }
        let value = value.as_ref();
        out.push_str(key.as_ref());
        out.push('=');
        if is_integer(value) {
            out.push_str(value);
        } else {
            push_quoted(&mut out, value);
        }
        out.push('\n');
    }
    out
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

fn push_quoted(out: &mut String, value: &str) {
    out.reserve(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
