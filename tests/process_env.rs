use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use shenv::{Error, ParseErrorKind};

#[test]
fn from_path_keeps_values_set_by_the_process() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join(".env");
    write_file(
        &file,
        "SHENV_FROM_PATH_EXISTING=from_file\nSHENV_FROM_PATH_NEW=\"from file\"\n",
    );

    // SAFETY: keys are unique to this test; env access is serialized by `env_lock`.
    let report = with_env_lock(|| unsafe {
        std::env::set_var("SHENV_FROM_PATH_EXISTING", "from_process");
        shenv::from_path(&file)
    })
    .expect("load should succeed");

    assert_eq!(report.files_read, 1);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped_existing, 1);
    assert_eq!(env_var("SHENV_FROM_PATH_EXISTING"), "from_process");
    assert_eq!(env_var("SHENV_FROM_PATH_NEW"), "from file");
}

#[test]
fn from_paths_uses_last_file_precedence() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let base = dir.path().join(".env.base");
    let local = dir.path().join(".env.local");
    write_file(&base, "SHENV_FROM_PATHS_SHARED=base\nSHENV_FROM_PATHS_BASE=base\n");
    write_file(&local, "SHENV_FROM_PATHS_SHARED=local\n");

    // SAFETY: keys are unique to this test; env access is serialized by `env_lock`.
    let report =
        with_env_lock(|| unsafe { shenv::from_paths([&base, &local]) }).expect("load should succeed");

    assert_eq!(report.files_read, 2);
    assert_eq!(report.loaded, 2);
    assert_eq!(env_var("SHENV_FROM_PATHS_SHARED"), "local");
    assert_eq!(env_var("SHENV_FROM_PATHS_BASE"), "base");
}

#[test]
fn from_filename_resolves_against_current_dir() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_file(&dir.path().join("custom.env"), "SHENV_FROM_FILENAME=custom\n");

    // SAFETY: keys are unique to this test; env access is serialized by `env_lock`.
    let report = with_current_dir(dir.path(), || unsafe { shenv::from_filename("custom.env") })
        .expect("load should succeed");

    assert_eq!(report.loaded, 1);
    assert_eq!(env_var("SHENV_FROM_FILENAME"), "custom");
}

#[test]
fn dotenv_reads_default_file_in_current_dir() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_file(
        &dir.path().join(".env"),
        "# defaults\nSHENV_DOTENV_DEFAULT=\"from default\"\n",
    );

    // SAFETY: keys are unique to this test; env access is serialized by `env_lock`.
    let report = with_current_dir(dir.path(), || unsafe { shenv::dotenv() })
        .expect("load should succeed");

    assert_eq!(report.files_read, 1);
    assert_eq!(env_var("SHENV_DOTENV_DEFAULT"), "from default");
}

#[test]
fn dotenv_without_file_returns_io_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    // SAFETY: nothing is written; env access is serialized by `env_lock`.
    let err = with_current_dir(dir.path(), || unsafe { shenv::dotenv() })
        .expect_err("expected I/O error");

    assert!(matches!(err, Error::Io(_)), "{err:?}");
}

#[test]
fn malformed_file_leaves_process_env_untouched() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join(".env");
    write_file(&file, "SHENV_MALFORMED_OK=1\nSHENV MALFORMED=2\n");

    // SAFETY: keys are unique to this test; env access is serialized by `env_lock`.
    let err = with_env_lock(|| unsafe { shenv::from_path(&file) }).expect_err("expected parse error");

    match err {
        Error::Parse(parse_err) => assert_eq!(parse_err.kind, ParseErrorKind::InvalidKeyCharacter),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::env::var_os("SHENV_MALFORMED_OK").is_none());
}

fn env_var(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|err| panic!("{key} should be set: {err}"))
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write test file");
}

fn with_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _lock = env_lock().lock().unwrap_or_else(|err| err.into_inner());
    f()
}

fn with_current_dir<R>(dir: &Path, f: impl FnOnce() -> R) -> R {
    with_env_lock(|| {
        let _guard = CurrentDirGuard::enter(dir);
        f()
    })
}

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

struct CurrentDirGuard {
    original: PathBuf,
}

impl CurrentDirGuard {
    fn enter(dir: &Path) -> Self {
        let original = std::env::current_dir().expect("failed to read current dir");
        std::env::set_current_dir(dir).expect("failed to set current dir");
        Self { original }
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        std::env::set_current_dir(&self.original).expect("failed to restore current dir");
    }
}
