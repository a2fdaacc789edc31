//! Parse, expand, and marshal `.env` files.
//!
//! [`parse_str`] turns dotenv text into an [`EnvDocument`], resolving
//! `${NAME}`, `$(NAME)` and `$NAME` placeholders against earlier entries and
//! the ambient environment. [`marshal`] is the inverse and writes a canonical,
//! key-sorted form.
//!
//! [`EnvLoader::load`] is the safe default and applies files to an in-memory
//! map. Convenience loaders (`dotenv`, `from_path`, `from_paths`,
//! `from_filename`, `overload`) mutate the process environment and are
//! `unsafe`, because callers must guarantee no concurrent process-environment
//! access.

mod decoder;
mod env;
mod error;
mod expand;
mod getters;
mod lexer;
mod loader;
mod marshal;
mod model;
mod parser;
mod scanner;

pub use env::{EnvSource, ProcessEnv, TargetEnv};
pub use error::{EnvError, Error, ParseError, ParseErrorKind};
pub use getters::Vars;
pub use loader::{
    EnvLoader, dotenv, from_filename, from_path, from_paths, load_into, overload, read, write,
};
pub use marshal::marshal;
pub use model::{EnvDocument, Entry, LoadReport};
pub use parser::{parse_bytes, parse_reader, parse_str, parse_str_with_env, unmarshal};
