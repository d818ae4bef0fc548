//! Client identity.
//!
//! Each client gets one opaque user identifier, created on first use and persisted in a
//! local key-value store so later runs reuse it.

use std::{
    fmt::{self, Display, Formatter},
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use jiff::Timestamp;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Store key the identifier is persisted under.
pub const USER_ID_KEY: &str = "userId";

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Errors raised by the local key-value stores.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Reading or writing the store file failed.
    #[error("failed to access identity store: {0}")]
    Io(#[from] io::Error),

    /// The store file is not a JSON object of strings.
    #[error("failed to parse identity store: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque per-client user identifier, e.g. `user_1718000000000_k3j9x0q2a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a fresh identifier from the current time and a random suffix.
    pub fn generate() -> Self {
        Self::generate_with(Timestamp::now(), &mut rand::thread_rng())
    }

    fn generate_with(now: Timestamp, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..SUFFIX_ALPHABET.len());
                SUFFIX_ALPHABET.get(idx).map_or('0', |byte| char::from(*byte))
            })
            .collect();

        Self(format!("user_{}_{suffix}", now.as_millisecond()))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// String key-value persistence for client state.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError>;

    /// Delete a value if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), IdentityError>;
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), IdentityError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);

        Ok(())
    }
}

/// Store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store the file at `path`. The file and its parent directories are created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<FxHashMap<String, String>, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(FxHashMap::default()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_all(&self, entries: &FxHashMap<String, String>) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());

        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), IdentityError> {
        let mut entries = self.read_all()?;

        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }

        Ok(())
    }
}

/// Return the persisted identifier, creating and persisting one if none exists yet.
///
/// An empty stored value counts as missing.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn load_or_create(store: &dyn KeyValueStore) -> Result<UserId, IdentityError> {
    if let Some(existing) = store.get(USER_ID_KEY)?
        && !existing.is_empty()
    {
        debug!(user_id = %existing, "reusing stored user id");

        return Ok(UserId(existing));
    }

    let user_id = UserId::generate();
    store.set(USER_ID_KEY, user_id.as_str())?;

    info!(user_id = %user_id, "created user id");

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn generated_id_has_timestamp_and_base36_suffix() -> TestResult {
        let now = Timestamp::from_millisecond(1_718_000_000_000)?;
        let id = UserId::generate_with(now, &mut StdRng::seed_from_u64(7));

        let suffix = id
            .as_str()
            .strip_prefix("user_1718000000000_")
            .ok_or("missing prefix")?;

        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .bytes()
                .all(|byte| byte.is_ascii_digit() || byte.is_ascii_lowercase())
        );

        Ok(())
    }

    #[test]
    fn load_or_create_is_stable_across_calls() -> TestResult {
        let store = MemoryStore::new();

        let first = load_or_create(&store)?;
        let second = load_or_create(&store)?;

        assert_eq!(first, second);
        assert_eq!(store.get(USER_ID_KEY)?, Some(first.to_string()));

        Ok(())
    }

    #[test]
    fn empty_stored_value_is_replaced() -> TestResult {
        let store = MemoryStore::new();
        store.set(USER_ID_KEY, "")?;

        let id = load_or_create(&store)?;

        assert!(id.as_str().starts_with("user_"));

        Ok(())
    }

    #[test]
    fn file_store_persists_between_instances() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("client.json");

        let created = load_or_create(&FileStore::new(&path))?;
        let reloaded = load_or_create(&FileStore::new(&path))?;

        assert_eq!(created, reloaded);

        Ok(())
    }

    #[test]
    fn corrupt_file_is_a_json_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("client.json");
        fs::write(&path, "not json")?;

        let result = FileStore::new(&path).get(USER_ID_KEY);

        assert!(matches!(result, Err(IdentityError::Json(_))));

        Ok(())
    }
}
