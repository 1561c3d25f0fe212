use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::env::{TargetEnv, inject};
use crate::error::Error;
use crate::model::{Encoding, EnvMap, LoadReport};
use crate::source;

/// Load `.env` from the current working directory into the process
/// environment.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    let path = source::default_path()?;
    unsafe { from_path(path) }
}

/// Load `.env` from the current working directory into the process
/// environment, reading the file asynchronously.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
#[cfg(feature = "async")]
pub async unsafe fn dotenv_async() -> Result<LoadReport, Error> {
    let path = source::default_path()?;
    let mut loader = EnvLoader::new()
        .path(path)
        .target(unsafe { TargetEnv::process() });
    loader.load_async().await
}

/// Load a file from a specific path into the process environment.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    let mut loader = EnvLoader::new()
        .path(path)
        .target(unsafe { TargetEnv::process() });
    loader.load()
}

/// Load multiple files into the process environment, later files taking
/// precedence over earlier ones.
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

/// Load a file by name from the current working directory into the process
/// environment.
///
/// # Safety
///
/// Mutates the process environment; see [`TargetEnv::process`].
pub unsafe fn from_filename(name: &str) -> Result<LoadReport, Error> {
    unsafe { from_path(PathBuf::from(name)) }
}

/// Builder-style env loader.
///
/// Defaults to reading `./.env` as UTF-8 into an in-memory target.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    paths: Vec<PathBuf>,
    encoding: Encoding,
    required: bool,
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

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// When `false`, missing files are skipped instead of failing the load.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn target_env_mut(&mut self) -> &mut TargetEnv {
        &mut self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Read and merge every configured file without touching the target.
    pub fn parse_only(&self) -> Result<EnvMap, Error> {
        let (merged, _) = self.collect_entries()?;
        Ok(merged)
    }

    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let (merged, files_read) = self.collect_entries()?;
        self.apply(&merged, files_read)
    }

    #[cfg(feature = "async")]
    pub async fn load_async(&mut self) -> Result<LoadReport, Error> {
        let mut merged = EnvMap::new();
        let mut files_read = 0usize;

        for path in self.effective_paths()? {
            let read = source::read_async(&path, self.encoding).await;
            let Some(parsed) = self.accept_missing(&path, read)? else {
                continue;
            };
            files_read += 1;
            merged.merge(parsed);
        }

        self.apply(&merged, files_read)
    }

    fn apply(&mut self, merged: &EnvMap, files_read: usize) -> Result<LoadReport, Error> {
        let report = inject(merged, &mut self.target)?;
        tracing::debug!(
            files_read,
            loaded = report.loaded,
            skipped_existing = report.skipped_existing,
            "env files loaded"
        );
        Ok(LoadReport {
            files_read,
            ..report
        })
    }

    fn collect_entries(&self) -> Result<(EnvMap, usize), Error> {
        let mut merged = EnvMap::new();
        let mut files_read = 0usize;

        for path in self.effective_paths()? {
            let read = source::read(&path, self.encoding);
            let Some(parsed) = self.accept_missing(&path, read)? else {
                continue;
            };
            files_read += 1;
            merged.merge(parsed);
        }

        Ok((merged, files_read))
    }

    fn accept_missing(
        &self,
        path: &Path,
        read: Result<EnvMap, Error>,
    ) -> Result<Option<EnvMap>, Error> {
        match read {
            Ok(parsed) => {
                tracing::trace!(path = %path.display(), entries = parsed.len(), "parsed env file");
                Ok(Some(parsed))
            }
            Err(Error::Io(err)) if !self.required && err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "skipping missing env file");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn effective_paths(&self) -> Result<Vec<PathBuf>, Error> {
        if self.paths.is_empty() {
            Ok(vec![source::default_path()?])
        } else {
            Ok(self.paths.clone())
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            encoding: Encoding::Utf8,
            required: true,
            target: TargetEnv::memory(),
        }
    }
}
