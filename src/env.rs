use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::EnvError;
use crate::model::EnvDocument;

/// Read access to a table of environment variables.
///
/// Expansion and the typed getters go through this trait, so tests can swap
/// the live process environment for an in-memory map.
pub trait EnvSource {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// The live process environment, read on every lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get_var(&self, key: &str) -> Option<String> {
        if !is_valid_key(key) {
            return None;
        }
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn get_var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get_var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for EnvDocument {
    fn get_var(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn get_var(&self, key: &str) -> Option<String> {
        (**self).get_var(key)
    }
}

/// Destination for loaded environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment target.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an in-memory environment target.
    ///
    /// Use this to avoid mutating the process environment.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory environment target from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
        match self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match &self.kind {
            TargetEnvKind::Process => is_valid_key(key) && std::env::var_os(key).is_some(),
            TargetEnvKind::Memory(map) => map.contains_key(key),
        }
    }

    /// Write `value` under `key`, leaving an existing value alone unless
    /// `overwrite` is set.
    ///
    /// Returns whether the value was written. Keys and values the operating
    /// system would reject fail for both target kinds.
    pub fn set_var(&mut self, key: &str, value: &str, overwrite: bool) -> Result<bool, EnvError> {
        if !is_valid_key(key) {
            return Err(EnvError::InvalidKey(key.to_owned()));
        }
        if value.contains('\0') {
            return Err(EnvError::InvalidValue(key.to_owned()));
        }
        if !overwrite && self.contains_key(key) {
            return Ok(false);
        }

        match &mut self.kind {
            // SAFETY: `TargetEnv::process` makes the caller responsible for
            // exclusive access to the process environment.
            TargetEnvKind::Process => unsafe { std::env::set_var(key, value) },
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
        Ok(true)
    }
}

impl EnvSource for TargetEnv {
    fn get_var(&self, key: &str) -> Option<String> {
        match &self.kind {
            TargetEnvKind::Process => ProcessEnv.get_var(key),
            TargetEnvKind::Memory(map) => map.get(key).cloned(),
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0'])
}
