use crate::{codec, Crypto, Error, KeyFile};
use ember_crypto::Secret;
use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::warn;
use uuid::Uuid;

/// The platform default keys directory: `<config>/ember/keys`.
///
/// # Errors
/// Returns [`Error::NoConfigDir`] when the platform exposes no
/// configuration directory.
pub fn default_keys_dir() -> Result<PathBuf, Error> {
    dirs_next::config_dir()
        .map(|dir| dir.join("ember").join("keys"))
        .ok_or(Error::NoConfigDir)
}

/// One stored entry: the parsed `crypto` object and the file backing it.
/// `path` is `None` between import and the save that materializes the file.
#[derive(Debug, Clone)]
struct StoredKey {
    crypto: Crypto,
    path: Option<PathBuf>,
}

/// A directory-backed collection of password-encrypted secrets with an
/// in-memory cache of decrypted ones.
///
/// Not internally synchronized: callers sharing one instance across threads
/// must serialize mutating operations and any read that can populate the
/// cache. Cached secrets are zeroized on eviction and on drop.
#[derive(Debug)]
pub struct SecretStore {
    dir: PathBuf,
    keys: HashMap<Uuid, StoredKey>,
    cache: HashMap<Uuid, Secret>,
}

impl SecretStore {
    /// Opens the store over the platform default keys directory.
    ///
    /// # Errors
    /// Fails when the default directory cannot be resolved or created.
    pub fn new() -> Result<Self, Error> {
        Self::open(default_keys_dir()?)
    }

    /// Opens the store over `dir`, creating the directory if missing and
    /// loading every readable key file in it. Malformed or unsupported
    /// entries are logged and skipped, never fatal.
    ///
    /// # Errors
    /// Fails only when the directory itself cannot be created or listed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let mut store =
            Self { dir: dir.into(), keys: HashMap::new(), cache: HashMap::new() };
        store.load()?;
        Ok(store)
    }

    /// Encrypts `secret` under `passphrase`, stores it under a fresh random
    /// id, and persists it to disk. The secret is cached eagerly, so the
    /// next [`secret`](Self::secret) call does not prompt.
    ///
    /// # Errors
    /// Fails when the key file cannot be written.
    pub fn import(&mut self, secret: Secret, passphrase: &str) -> Result<Uuid, Error> {
        let id = Uuid::new_v4();
        let crypto = codec::encrypt(secret.as_bytes(), passphrase);
        self.cache.insert(id, secret);
        self.keys.insert(id, StoredKey { crypto, path: None });
        self.save()?;
        Ok(id)
    }

    /// Returns the decrypted secret for `id`.
    ///
    /// On a cache hit the passphrase provider is not invoked; on a miss it
    /// is called once and the decrypted secret is cached on success. A
    /// failing provider or a failed decrypt leaves both the cache and the
    /// key set untouched.
    ///
    /// # Errors
    /// - [`Error::KeyNotFound`] when `id` is not in the store.
    /// - [`Error::MacMismatch`] on a wrong passphrase or corrupted file;
    ///   the caller may re-prompt and retry.
    pub fn secret<F>(&mut self, id: &Uuid, passphrase: F) -> Result<Secret, Error>
    where
        F: FnOnce() -> Result<String, Error>,
    {
        if let Some(secret) = self.cache.get(id) {
            return Ok(secret.clone());
        }
        let stored = self.keys.get(id).ok_or(Error::KeyNotFound)?;
        let plain = codec::decrypt(&stored.crypto, &passphrase()?)?;
        let secret = Secret::from_slice(&plain)?;
        self.cache.insert(*id, secret.clone());
        Ok(secret)
    }

    /// Removes `id` from the store: evicts the cached secret, deletes the
    /// backing file and forgets the entry.
    ///
    /// # Errors
    /// - [`Error::KeyNotFound`] when `id` is not in the store.
    /// - I/O errors from deleting the backing file.
    pub fn kill(&mut self, id: &Uuid) -> Result<(), Error> {
        self.cache.remove(id);
        let stored = self.keys.remove(id).ok_or(Error::KeyNotFound)?;
        if let Some(path) = stored.path {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Drops every cached secret, zeroizing the bytes. The encrypted
    /// entries are untouched.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Iterates the ids of the stored keys, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &Uuid> {
        self.keys.keys()
    }

    /// The number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Persists every entry to the store's own directory.
    ///
    /// # Errors
    /// Fails when a key file cannot be written.
    pub fn save(&mut self) -> Result<(), Error> {
        let dir = self.dir.clone();
        self.save_to(dir)
    }

    /// Persists every entry as `<id>.json` under `dir`, replacing files
    /// atomically. A previous backing file at a different path is deleted
    /// afterwards, and the recorded path is updated.
    ///
    /// # Errors
    /// Fails when the directory or a key file cannot be written.
    pub fn save_to(&mut self, dir: impl AsRef<Path>) -> Result<(), Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (id, stored) in &mut self.keys {
            let file = dir.join(format!("{id}.json"));
            let key_file =
                KeyFile { crypto: stored.crypto.clone(), id: *id, version: 3 };
            write_atomic(&file, &serde_json::to_string(&key_file)?)?;
            if let Some(previous) = stored.path.take() {
                if previous != file {
                    if let Err(err) = fs::remove_file(&previous) {
                        warn!(
                            path = %previous.display(),
                            error = %err,
                            "failed to delete stale key file"
                        );
                    }
                }
            }
            stored.path = Some(file);
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            match read_key_file(&path) {
                Ok(key_file) => {
                    self.keys.insert(
                        key_file.id,
                        StoredKey { crypto: key_file.crypto, path: Some(path) },
                    );
                },
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping key file");
                },
            }
        }
        Ok(())
    }
}

fn read_key_file(path: &Path) -> Result<KeyFile, Error> {
    let contents = fs::read_to_string(path)?;
    let key_file: KeyFile = serde_json::from_str(&contents)?;
    if key_file.version != 3 && key_file.version != 2 {
        return Err(Error::UnsupportedVersion(key_file.version));
    }
    if key_file.crypto.kdf != codec::KDF_PBKDF2 {
        return Err(Error::UnsupportedKdf);
    }
    if key_file.crypto.cipher != codec::CIPHER_AES_128_CBC {
        return Err(Error::UnsupportedCipher);
    }
    Ok(key_file)
}

/// Writes to a sibling temp file first, then renames over the target, so a
/// crash never leaves a truncated key file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<(), Error> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut opts = fs::OpenOptions::new();
        opts.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut file = opts.open(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(byte: u8) -> Secret {
        Secret::from_slice(&[byte; 32]).unwrap()
    }

    fn passphrase(value: &str) -> impl FnOnce() -> Result<String, Error> + '_ {
        move || Ok(value.to_string())
    }

    #[test]
    fn import_then_read_back_through_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let (first, second) = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            let first = store.import(secret(0x11), "a").unwrap();
            let second = store.import(secret(0x22), "b").unwrap();
            (first, second)
        };

        let mut store = SecretStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.secret(&first, passphrase("a")).unwrap(), secret(0x11));
        assert_eq!(store.secret(&second, passphrase("b")).unwrap(), secret(0x22));
    }

    #[test]
    fn import_caches_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretStore::open(dir.path()).unwrap();
        let id = store.import(secret(0x33), "pw").unwrap();
        // the provider must not be consulted on a cache hit
        let out = store
            .secret(&id, || panic!("provider invoked despite cached secret"))
            .unwrap();
        assert_eq!(out, secret(0x33));
    }

    #[test]
    fn wrong_passphrase_fails_and_is_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            store.import(secret(0x44), "right").unwrap()
        };

        let mut store = SecretStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.secret(&id, passphrase("wrong")),
            Err(Error::MacMismatch)
        ));
        assert_eq!(store.secret(&id, passphrase("right")).unwrap(), secret(0x44));
    }

    #[test]
    fn failing_provider_propagates_and_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            store.import(secret(0x55), "pw").unwrap()
        };

        let mut store = SecretStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.secret(&id, || Err(Error::KeyNotFound)),
            Err(Error::KeyNotFound)
        ));
        // the failure must not have cached anything
        assert!(matches!(
            store.secret(&id, passphrase("wrong")),
            Err(Error::MacMismatch)
        ));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.secret(&Uuid::new_v4(), passphrase("pw")),
            Err(Error::KeyNotFound)
        ));
    }

    #[test]
    fn kill_is_irreversible() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretStore::open(dir.path()).unwrap();
        let keep = store.import(secret(0x66), "a").unwrap();
        let doomed = store.import(secret(0x77), "b").unwrap();

        let doomed_file = dir.path().join(format!("{doomed}.json"));
        assert!(doomed_file.exists());
        store.kill(&doomed).unwrap();
        assert!(!doomed_file.exists());
        assert!(matches!(
            store.secret(&doomed, passphrase("b")),
            Err(Error::KeyNotFound)
        ));

        let mut store = SecretStore::open(dir.path()).unwrap();
        assert_eq!(store.ids().copied().collect::<Vec<_>>(), vec![keep]);
        assert_eq!(store.secret(&keep, passphrase("a")).unwrap(), secret(0x66));
        assert!(matches!(store.kill(&doomed), Err(Error::KeyNotFound)));
    }

    #[test]
    fn clear_cache_forces_a_fresh_decrypt() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretStore::open(dir.path()).unwrap();
        let id = store.import(secret(0x88), "pw").unwrap();

        store.clear_cache();
        assert!(matches!(
            store.secret(&id, passphrase("nope")),
            Err(Error::MacMismatch)
        ));
        assert_eq!(store.secret(&id, passphrase("pw")).unwrap(), secret(0x88));
    }

    #[test]
    fn load_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            store.import(secret(0x99), "pw").unwrap()
        };
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let store = SecretStore::open(dir.path()).unwrap();
        assert_eq!(store.ids().copied().collect::<Vec<_>>(), vec![id]);
    }

    #[test]
    fn load_skips_unsupported_versions_and_kdfs() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            store.import(secret(0xaa), "pw").unwrap()
        };

        let good = fs::read_to_string(dir.path().join(format!("{id}.json"))).unwrap();
        fs::write(
            dir.path().join(format!("{}.json", Uuid::new_v4())),
            good.replace("\"version\":3", "\"version\":1"),
        )
        .unwrap();
        fs::write(
            dir.path().join(format!("{}.json", Uuid::new_v4())),
            good.replace("\"kdf\":\"pbkdf2\"", "\"kdf\":\"scrypt\""),
        )
        .unwrap();

        let store = SecretStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_accepts_legacy_version_2() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = SecretStore::open(dir.path()).unwrap();
            store.import(secret(0xbb), "pw").unwrap()
        };

        let path = dir.path().join(format!("{id}.json"));
        let contents = fs::read_to_string(&path).unwrap();
        fs::write(&path, contents.replace("\"version\":3", "\"Version\":2")).unwrap();

        let mut store = SecretStore::open(dir.path()).unwrap();
        assert_eq!(store.secret(&id, passphrase("pw")).unwrap(), secret(0xbb));

        // a save upgrades the entry to the version the writer emits
        store.save().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"version\":3"));
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretStore::open(dir.path()).unwrap();
        store.import(secret(0xcc), "pw").unwrap();
        store.save().unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().map_or(true, |ext| ext != "json"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }
}
