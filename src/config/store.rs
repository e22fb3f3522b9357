//! File-backed credential storage.
//!
//! The credentials live in a single pretty-printed JSON document. Writes go
//! through a temporary file in the same directory that is synced and then
//! renamed over the target, so a reader never sees a half-written file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info, instrument, warn};

use super::{ConfigError, Credentials, Result, APP_DIR_NAME, CONFIG_FILE_NAME};

/// Loads and saves [`Credentials`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store bound to `<user-config-dir>/zentasks/config.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if the platform has no config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::at(Self::default_path()?))
    }

    /// Create a store bound to an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default location of the credentials file.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a credentials file currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored credentials.
    ///
    /// Returns `None` when the file is missing, unreadable or not a JSON object.
    /// Failures are logged; the application keeps running unconfigured.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Option<Credentials> {
        match self.try_load() {
            Ok(creds) => creds,
            Err(e) => {
                warn!("Ignoring unusable config file: {}", e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Credentials>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file found");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::ReadError(e)),
        };

        // Derived impls also accept arrays; the file must be an object.
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&contents).map_err(ConfigError::ParseError)?;
        let creds: Credentials = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(ConfigError::ParseError)?;
        debug!(complete = creds.is_complete(), "Loaded config file");
        Ok(Some(creds))
    }

    /// Save credentials, replacing the previous file wholesale.
    ///
    /// Callers validate the credentials first; this only persists them.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, or the
    /// temporary file cannot be written or renamed into place.
    #[instrument(skip(self, creds), fields(path = %self.path.display()))]
    pub fn save(&self, creds: &Credentials) -> Result<()> {
        self.try_save(creds).map_err(|e| {
            error!("Failed to save config: {}", e);
            e
        })?;
        info!("Saved config file");
        Ok(())
    }

    fn try_save(&self, creds: &Credentials) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        create_private_dir(dir).map_err(ConfigError::CreateDirError)?;

        let mut contents = serde_json::to_string_pretty(creds).map_err(ConfigError::SerializeError)?;
        contents.push('\n');

        let mut tmp = NamedTempFile::new_in(dir).map_err(ConfigError::WriteError)?;
        tmp.write_all(contents.as_bytes())
            .map_err(ConfigError::WriteError)?;
        tmp.as_file().sync_all().map_err(ConfigError::WriteError)?;
        tmp.persist(&self.path)
            .map_err(|e| ConfigError::WriteError(e.error))?;

        Ok(())
    }
}

/// Create `dir` and any missing parents, owner-only on Unix.
fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    debug!(dir = %dir.display(), "Creating config directory");
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Shared buffer a test subscriber writes into.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that captures output, returning both.
    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let value = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (value, logs)
    }

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join("zentasks").join("config.json"))
    }

    fn sample() -> Credentials {
        Credentials::new(
            "https://company.atlassian.net",
            "user@company.com",
            "secret_token",
        )
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_corrupt_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(ConfigStore::at(&path).load().is_none());
    }

    #[test]
    fn test_load_corrupt_file_logs_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let (loaded, logs) = capture_logs(|| ConfigStore::at(&path).load());

        assert!(loaded.is_none());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Ignoring unusable config file"));
    }

    #[test]
    fn test_load_missing_file_does_not_warn() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let (loaded, logs) = capture_logs(|| store.load());

        assert!(loaded.is_none());
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_load_wrong_shape_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"jira_email": 42}"#).unwrap();

        assert!(ConfigStore::at(&path).load().is_none());
    }

    #[test]
    fn test_load_array_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"["https://x.atlassian.net", "a@b.c", "tok"]"#).unwrap();

        assert!(ConfigStore::at(&path).load().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let creds = sample();

        store.save(&creds).unwrap();

        assert!(store.exists());
        assert_eq!(store.load(), Some(creds));
    }

    #[test]
    fn test_round_trip_preserves_special_characters() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let creds = Credentials::new(
            "https://jira.example.com/zürich",
            "\"quoted\"@例え.jp",
            "back\\slash\n\t\u{1F512}",
        );

        store.save(&creds).unwrap();
        assert_eq!(store.load(), Some(creds));
    }

    #[test]
    fn test_save_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let creds = sample();

        store.save(&creds).unwrap();
        let first = fs::read(store.path()).unwrap();
        store.save(&creds).unwrap();
        let second = fs::read(store.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.load(), Some(creds));
    }

    #[test]
    fn test_save_overwrites_previous_values() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&sample()).unwrap();
        let updated = Credentials::new("https://other.atlassian.net", "me@other.com", "t2");
        store.save(&updated).unwrap();

        assert_eq!(store.load(), Some(updated));
    }

    #[test]
    fn test_save_writes_pretty_json_with_file_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("{\n  \"jira_base_url\": "));
        assert!(contents.contains("\n  \"jira_email\": \"user@company.com\""));
        assert!(contents.contains("\n  \"jira_token\": \"secret_token\""));
        assert!(contents.ends_with("}\n"));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();

        let entries: Vec<_> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("config.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_creates_private_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        let parent = store.path().parent().unwrap();
        let mode = fs::metadata(parent).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("zentasks");
        fs::write(&blocker, "not a directory").unwrap();

        let err = store_in(&dir).save(&sample()).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_default_path_layout() {
        if let Ok(path) = ConfigStore::default_path() {
            assert!(path.ends_with("zentasks/config.json"));
        }
    }
}
