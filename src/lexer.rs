use crate::error::{ParseError, ParseErrorKind};
use crate::scanner::RawLine;

/// How a value was written, which decides its escape and expansion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteStyle {
    Unquoted,
    Single,
    Double,
}

/// An assignment split into its parts, value still undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawEntry<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub quote: QuoteStyle,
}

/// Split one line into key and raw value.
///
/// Returns `Ok(None)` for blank and comment lines.
pub(crate) fn lex_line(line: RawLine<'_>) -> Result<Option<RawEntry<'_>>, ParseError> {
    let text = line.text;
    let mut working = text.trim_start();
    if working.is_empty() || working.starts_with('#') {
        return Ok(None);
    }

    if let Some(rest) = working.strip_prefix("export")
        && rest.starts_with(' ')
    {
        working = rest.trim_start();
    }

    let Some(sep_idx) = find_separator(working) else {
        return Err(ParseError::new(
            line.number,
            column_of(text, text.len()),
            ParseErrorKind::InvalidSyntax,
        ));
    };

    let key_start = text.len() - working.len();
    let key = working[..sep_idx].trim();
    if key.is_empty() {
        return Err(ParseError::new(
            line.number,
            column_of(text, key_start),
            ParseErrorKind::MissingKey,
        ));
    }
    if key.contains(char::is_whitespace) {
        return Err(ParseError::new(
            line.number,
            column_of(text, key_start),
            ParseErrorKind::InvalidKey,
        ));
    }

    let after_sep = &working[sep_idx + 1..];
    let value_region = after_sep.trim_start();
    let value_start = text.len() - value_region.len();

    let (value, quote) = match value_region.chars().next() {
        Some('\'') => (
            lex_quoted(text, value_start, line.number, QuoteStyle::Single)?,
            QuoteStyle::Single,
        ),
        Some('"') => (
            lex_quoted(text, value_start, line.number, QuoteStyle::Double)?,
            QuoteStyle::Double,
        ),
        _ => (
            strip_inline_comment(after_sep).trim(),
            QuoteStyle::Unquoted,
        ),
    };

    Ok(Some(RawEntry { key, value, quote }))
}

/// Byte index of the first `=` or `:` not inside a quoted run.
fn find_separator(input: &str) -> Option<usize> {
    let mut active_quote: Option<char> = None;
    for (idx, ch) in input.char_indices() {
        match active_quote {
            Some(quote) if ch == quote => active_quote = None,
            Some(_) => {}
            None => match ch {
                '=' | ':' => return Some(idx),
                '\'' | '"' => active_quote = Some(ch),
                _ => {}
            },
        }
    }
    None
}

/// Return the text between the opening quote at `start` and its closing quote.
fn lex_quoted(
    text: &str,
    start: usize,
    line_num: u32,
    quote: QuoteStyle,
) -> Result<&str, ParseError> {
    let input = &text[start..];
    let mut escaped = false;
    let mut closing_idx = None;

    for (idx, ch) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (QuoteStyle::Double, '\\') => escaped = true,
            (QuoteStyle::Double, '"') | (QuoteStyle::Single, '\'') => {
                closing_idx = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let Some(end_idx) = closing_idx else {
        return Err(ParseError::new(
            line_num,
            column_of(text, start),
            ParseErrorKind::UnterminatedQuote,
        ));
    };

    let tail = input[end_idx + 1..].trim_start();
    if !tail.is_empty() && !tail.starts_with('#') {
        return Err(ParseError::new(
            line_num,
            column_of(text, text.len() - tail.len()),
            ParseErrorKind::InvalidSyntax,
        ));
    }

    Ok(&input[1..end_idx])
}

/// Cut an unquoted value at the first `#` that follows whitespace.
fn strip_inline_comment(input: &str) -> &str {
    let mut after_blank = false;
    for (idx, ch) in input.char_indices() {
        if ch == '#' && after_blank {
            return &input[..idx];
        }
        after_blank = ch.is_whitespace();
    }
    input
}

fn column_of(text: &str, byte_idx: usize) -> u32 {
    text[..byte_idx].chars().count() as u32 + 1
}
