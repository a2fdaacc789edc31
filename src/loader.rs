use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::env::{EnvSource, ProcessEnv, TargetEnv};
use crate::error::Error;
use crate::marshal::marshal;
use crate::model::{EnvDocument, LoadReport};
use crate::parser::parse_document;

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    unsafe { from_filename(DEFAULT_FILE) }
}

/// Load a `.env` file from a specific path into the process environment.
///
/// Variables that are already set are left alone.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    unsafe { from_paths([path]) }
}

/// Load multiple `.env` files into the process environment.
///
/// Variables that are already set, including those set by an earlier file,
/// are left alone.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn from_paths<I, P>(paths: I) -> Result<LoadReport, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut loader = EnvLoader::new()
        .paths(paths)
        .target(unsafe { TargetEnv::process() });
    loader.load()
}

/// Load a dotenv file by filename from the current working directory.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn from_filename(name: &str) -> Result<LoadReport, Error> {
    unsafe { from_path(PathBuf::from(name)) }
}

/// Load files into the process environment, replacing existing values.
///
/// Later files win over earlier ones.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn overload<I, P>(paths: I) -> Result<LoadReport, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut loader = EnvLoader::new()
        .paths(paths)
        .override_existing(true)
        .target(unsafe { TargetEnv::process() });
    loader.load()
}

/// Parse files into one map without touching the environment.
///
/// Later files win over earlier ones.
pub fn read<I, P>(paths: I) -> Result<BTreeMap<String, String>, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut merged = BTreeMap::new();
    for path in paths {
        let document = read_document(path.as_ref(), &ProcessEnv)?;
        merged.extend(document);
    }
    Ok(merged)
}

/// Write `vars` to `path` in canonical marshaled form.
pub fn write<I, K, V>(vars: I, path: impl AsRef<Path>) -> Result<(), Error>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    std::fs::write(path, marshal(vars))?;
    Ok(())
}

/// Apply every entry of `documents`, in order, to `target`.
///
/// Stops at the first write the target rejects; entries applied before it
/// stay applied.
pub fn load_into(
    documents: &[EnvDocument],
    override_existing: bool,
    target: &mut TargetEnv,
) -> Result<LoadReport, Error> {
    let mut report = LoadReport {
        files_read: documents.len(),
        ..LoadReport::default()
    };

    for (key, value) in documents.iter().flatten() {
        if target.set_var(key, value, override_existing)? {
            report.loaded += 1;
        } else {
            report.skipped_existing += 1;
            log::debug!("skipping existing key {key}");
        }
    }

    Ok(report)
}

/// Builder-style dotenv loader.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    paths: Vec<PathBuf>,
    required: bool,
    override_existing: bool,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    /// When `false`, missing files are skipped instead of failing the load.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Parse the configured files without applying them.
    ///
    /// Placeholders a file does not define resolve against the target, then
    /// the process environment.
    pub fn parse_only(&self) -> Result<Vec<EnvDocument>, Error> {
        let ambient = AmbientEnv {
            target: &self.target,
        };
        let mut documents = Vec::new();
        for path in self.effective_paths() {
            match read_document(&path, &ambient) {
                Ok(document) => documents.push(document),
                Err(Error::Io(err)) if err.kind() == ErrorKind::NotFound && !self.required => {
                    log::debug!("skipping missing file {}", path.display());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(documents)
    }

    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let documents = self.parse_only()?;
        load_into(&documents, self.override_existing, &mut self.target)
    }

    fn effective_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(DEFAULT_FILE)]
        } else {
            self.paths.clone()
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            required: true,
            override_existing: false,
            target: TargetEnv::memory(),
        }
    }
}

/// Placeholder lookup for files parsed by [`EnvLoader`].
struct AmbientEnv<'a> {
    target: &'a TargetEnv,
}

impl EnvSource for AmbientEnv<'_> {
    fn get_var(&self, key: &str) -> Option<String> {
        self.target
            .get_var(key)
            .or_else(|| ProcessEnv.get_var(key))
    }
}

fn read_document(path: &Path, env: &dyn EnvSource) -> Result<EnvDocument, Error> {
    let bytes = std::fs::read(path)?;
    let content = std::str::from_utf8(&bytes)?;
    let document = parse_document(content, Some(path), env)?;
    log::debug!("read {} entries from {}", document.len(), path.display());
    Ok(document)
}
