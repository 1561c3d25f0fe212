use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::model::{EnvMap, LoadReport};

/// String-keyed environment that parsed entries can be injected into.
pub trait EnvStore {
    fn has(&self, key: &str) -> bool;

    /// Report whether `set(key, value)` would be rejected, without writing.
    fn check(&self, _key: &str, _value: &str) -> Result<(), Error> {
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Write every entry of `map` into `store` unless the store already holds
/// the key. Existing values are never replaced.
///
/// Every pending write is checked first, so a rejected entry leaves the store
/// untouched.
pub fn inject<S>(map: &EnvMap, store: &mut S) -> Result<LoadReport, Error>
where
    S: EnvStore + ?Sized,
{
    let mut pending = Vec::with_capacity(map.len());
    let mut report = LoadReport::default();
    for (key, value) in map.iter() {
        if store.has(key) {
            report.skipped_existing += 1;
            tracing::debug!(key, "skipping existing key");
            continue;
        }
        store.check(key, value)?;
        pending.push((key, value));
    }

    for (key, value) in pending {
        store.set(key, value)?;
        report.loaded += 1;
    }

    tracing::trace!(
        loaded = report.loaded,
        skipped_existing = report.skipped_existing,
        "injected env entries"
    );
    Ok(report)
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
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory environment target seeded with `map`.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn as_memory_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }
}

impl EnvStore for TargetEnv {
    fn has(&self, key: &str) -> bool {
        match &self.kind {
            TargetEnvKind::Process => std::env::var_os(key).is_some(),
            TargetEnvKind::Memory(map) => map.contains_key(key),
        }
    }

    fn check(&self, key: &str, value: &str) -> Result<(), Error> {
        // `set_var` panics on these instead of reporting them.
        if self.is_process()
            && (key.is_empty() || key.contains(['=', '\0']) || value.contains('\0'))
        {
            return Err(Error::InvalidValue {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.check(key, value)?;
        match &mut self.kind {
            TargetEnvKind::Process => {
                // SAFETY: the caller of `TargetEnv::process` guarantees exclusive
                // access to the process environment.
                unsafe { std::env::set_var(key, value) };
            }
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
        Ok(())
    }
}

impl EnvStore for BTreeMap<String, String> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl EnvStore for HashMap<String, String> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
