use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::decoder::decode;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::{Error, ParseError};
use crate::expand::{ExpansionContext, expand};
use crate::lexer::{QuoteStyle, lex_line};
use crate::model::{EnvDocument, Entry};
use crate::scanner::lines;

/// Parse dotenv entries from UTF-8 text.
///
/// Placeholders that the document does not define are looked up in the
/// process environment.
pub fn parse_str(input: &str) -> Result<EnvDocument, Error> {
    parse_str_with_env(input, &ProcessEnv)
}

/// Parse dotenv entries from UTF-8 text, resolving placeholders against `env`.
pub fn parse_str_with_env(input: &str, env: &dyn EnvSource) -> Result<EnvDocument, Error> {
    parse_document(input, None, env).map_err(Error::from)
}

/// Parse dotenv entries from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<EnvDocument, Error> {
    let text = std::str::from_utf8(input)?;
    parse_str(text)
}

/// Parse dotenv entries from a buffered reader.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<EnvDocument, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf)
}

/// Parse dotenv text straight into a key-sorted map.
pub fn unmarshal(input: &str) -> Result<BTreeMap<String, String>, Error> {
    parse_str(input).map(|document| document.to_map())
}

pub(crate) fn parse_document(
    input: &str,
    source: Option<&Path>,
    env: &dyn EnvSource,
) -> Result<EnvDocument, ParseError> {
    let mut document = EnvDocument::default();

    for line in lines(input) {
        let Some(raw) = lex_line(line)? else {
            continue;
        };

        let decoded = decode(raw.value, raw.quote);
        let value = match raw.quote {
            QuoteStyle::Single => decoded.into_owned(),
            QuoteStyle::Unquoted | QuoteStyle::Double => {
                let context = ExpansionContext {
                    document: &document,
                    ambient: env,
                };
                expand(&decoded, &context).into_owned()
            }
        };

        log::trace!("parsed `{}` at line {}", raw.key, line.number);
        document.insert(Entry {
            key: raw.key.to_owned(),
            value,
            source: source.map(Path::to_path_buf),
            line: line.number,
        });
    }

    Ok(document)
}
