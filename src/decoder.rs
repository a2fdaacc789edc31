use std::borrow::Cow;

use crate::lexer::QuoteStyle;

/// Turn a lexed value into its literal text.
///
/// Only double-quoted values interpret backslash escapes.
pub(crate) fn decode(raw: &str, quote: QuoteStyle) -> Cow<'_, str> {
    match quote {
        QuoteStyle::Unquoted | QuoteStyle::Single => Cow::Borrowed(raw),
        QuoteStyle::Double if !raw.contains('\\') => Cow::Borrowed(raw),
        QuoteStyle::Double => Cow::Owned(unescape(raw)),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
