//! Typed access to environment variables.
//!
//! Every getter takes a fallback used when the key is absent. With no
//! fallback, an absent key is [`Error::MissingVar`]; a present value that does
//! not coerce is [`Error::InvalidValue`] whether or not a fallback was given.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::env::{EnvSource, ProcessEnv};
use crate::error::Error;

/// Typed getters over any [`EnvSource`].
#[derive(Debug, Clone, Default)]
pub struct Vars<E = ProcessEnv> {
    source: E,
}

impl Vars<ProcessEnv> {
    /// Getters over the live process environment.
    pub fn process() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<E: EnvSource> Vars<E> {
    pub fn new(source: E) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    pub fn string(&self, key: &str, fallback: Option<&str>) -> Result<String, Error> {
        match self.source.get_var(key) {
            Some(value) => Ok(value),
            None => fallback.map(str::to_owned).ok_or_else(|| missing(key)),
        }
    }

    pub fn int(&self, key: &str, fallback: Option<i64>) -> Result<i64, Error> {
        self.coerce(key, fallback, "integer", parse_trimmed)
    }

    pub fn float(&self, key: &str, fallback: Option<f64>) -> Result<f64, Error> {
        self.coerce(key, fallback, "float", parse_trimmed)
    }

    /// Accepts `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`, ignoring case.
    pub fn bool(&self, key: &str, fallback: Option<bool>) -> Result<bool, Error> {
        self.coerce(key, fallback, "boolean", parse_bool)
    }

    /// Comma-separated list. Items are trimmed and empty items dropped.
    ///
    /// A non-empty `fallback` is returned whole when the key is absent.
    pub fn array(&self, key: &str, fallback: &[&str]) -> Result<Vec<String>, Error> {
        match self.source.get_var(key) {
            Some(value) => Ok(split_list(&value).map(str::to_owned).collect()),
            None if fallback.is_empty() => Err(missing(key)),
            None => Ok(fallback.iter().map(|item| (*item).to_owned()).collect()),
        }
    }

    /// Comma-separated `key=value` or `key:value` pairs.
    ///
    /// The fallback is a string in the same format, parsed the same way.
    pub fn dict(
        &self,
        key: &str,
        fallback: Option<&str>,
    ) -> Result<BTreeMap<String, String>, Error> {
        let raw = self.string(key, fallback)?;
        match parse_dict(&raw) {
            Some(map) => Ok(map),
            None => Err(Error::InvalidValue {
                key: key.to_owned(),
                value: raw,
                expected: "dictionary",
            }),
        }
    }

    /// Like [`Vars::string`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_string(&self, key: &str, fallback: Option<&str>) -> String {
        or_panic(self.string(key, fallback))
    }

    /// Like [`Vars::int`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_int(&self, key: &str, fallback: Option<i64>) -> i64 {
        or_panic(self.int(key, fallback))
    }

    /// Like [`Vars::float`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_float(&self, key: &str, fallback: Option<f64>) -> f64 {
        or_panic(self.float(key, fallback))
    }

    /// Like [`Vars::bool`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_bool(&self, key: &str, fallback: Option<bool>) -> bool {
        or_panic(self.bool(key, fallback))
    }

    /// Like [`Vars::array`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_array(&self, key: &str, fallback: &[&str]) -> Vec<String> {
        or_panic(self.array(key, fallback))
    }

    /// Like [`Vars::dict`].
    ///
    /// # Panics
    ///
    /// Panics with the error message when the getter fails.
    pub fn must_dict(&self, key: &str, fallback: Option<&str>) -> BTreeMap<String, String> {
        or_panic(self.dict(key, fallback))
    }

    fn coerce<T>(
        &self,
        key: &str,
        fallback: Option<T>,
        expected: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, Error> {
        let Some(value) = self.source.get_var(key) else {
            return fallback.ok_or_else(|| missing(key));
        };
        parse(&value).ok_or_else(|| Error::InvalidValue {
            key: key.to_owned(),
            value,
            expected,
        })
    }
}

fn missing(key: &str) -> Error {
    Error::MissingVar {
        key: key.to_owned(),
    }
}

fn or_panic<T>(result: Result<T, Error>) -> T {
    result.unwrap_or_else(|err| panic!("{err}"))
}

fn parse_trimmed<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_dict(value: &str) -> Option<BTreeMap<String, String>> {
    split_list(value)
        .map(|pair| {
            let sep_idx = pair.find(['=', ':'])?;
            let key = pair[..sep_idx].trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_owned(), pair[sep_idx + 1..].trim().to_owned()))
        })
        .collect()
}
