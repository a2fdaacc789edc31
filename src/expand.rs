use std::borrow::Cow;

use crate::env::EnvSource;
use crate::model::EnvDocument;

/// Where placeholder names are looked up during one parse.
///
/// Entries already parsed from the document win over the ambient environment.
/// A name neither defines expands to the empty string.
pub(crate) struct ExpansionContext<'a> {
    pub document: &'a EnvDocument,
    pub ambient: &'a dyn EnvSource,
}

impl ExpansionContext<'_> {
    fn resolve(&self, name: &str) -> Cow<'_, str> {
        if let Some(value) = self.document.get(name) {
            return Cow::Borrowed(value);
        }
        self.ambient
            .get_var(name)
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(""))
    }
}

/// Replace `${NAME}`, `$(NAME)` and `$NAME` placeholders in one pass.
///
/// Substituted text is not scanned again. Anything that does not form a
/// complete placeholder is copied through unchanged.
pub(crate) fn expand<'v>(value: &'v str, context: &ExpansionContext<'_>) -> Cow<'v, str> {
    if !value.contains('$') {
        return Cow::Borrowed(value);
    }

    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0usize;
    let mut idx = 0usize;

    while idx < bytes.len() {
        if bytes[idx] != b'$' {
            idx += 1;
            continue;
        }

        let Some(placeholder) = parse_placeholder(value, idx) else {
            idx += 1;
            continue;
        };

        out.push_str(&value[cursor..idx]);
        out.push_str(&context.resolve(placeholder.name));
        cursor = placeholder.end;
        idx = placeholder.end;
    }

    out.push_str(&value[cursor..]);
    Cow::Owned(out)
}

struct Placeholder<'a> {
    name: &'a str,
    /// Byte index just past the placeholder.
    end: usize,
}

fn parse_placeholder(input: &str, start: usize) -> Option<Placeholder<'_>> {
    let bytes = input.as_bytes();
    let first = *bytes.get(start + 1)?;

    let closing = match first {
        b'{' => Some('}'),
        b'(' => Some(')'),
        _ => None,
    };
    if let Some(closing) = closing {
        let name_start = start + 2;
        let name_len = input[name_start..].find(closing)?;
        if name_len == 0 {
            return None;
        }
        return Some(Placeholder {
            name: &input[name_start..name_start + name_len],
            end: name_start + name_len + 1,
        });
    }

    if !is_name_start(first) {
        return None;
    }
    let name_start = start + 1;
    let mut name_end = name_start + 1;
    while name_end < bytes.len() && is_name_char(bytes[name_end]) {
        name_end += 1;
    }

    Some(Placeholder {
        name: &input[name_start..name_end],
        end: name_end,
    })
}

fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
