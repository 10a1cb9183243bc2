//! Key-value memory store.
//!
//! Each namespace is one pretty-printed JSON object at
//! `<root>/data/memory/<namespace>.json`. A namespace file that fails to
//! parse is renamed to `<namespace>.json.bak` and the namespace is treated
//! as empty.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::storage::file::atomic_write;

const EXTENSION: &str = "json";
const BACKUP_SUFFIX: &str = ".json.bak";

/// Make a user-supplied namespace safe to use as a filename.
///
/// Path separators and `..` become `_`, then leading and trailing dots
/// are stripped.
///
/// # Errors
///
/// Returns `InvalidNamespace` if nothing is left.
pub fn sanitize_namespace(namespace: &str) -> Result<String> {
    let sanitized = namespace.replace(['/', '\\'], "_").replace("..", "_");
    let sanitized = sanitized.trim_matches('.');
    if sanitized.is_empty() {
        return Err(Error::InvalidNamespace(
            "namespace cannot be empty or consist only of dots".to_string(),
        ));
    }
    Ok(sanitized.to_string())
}

/// Parse a value as JSON, falling back to a plain string.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Directory of namespace files.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    dir: PathBuf,
}

impl MemoryStore {
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            dir: config.memory_dir(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{name}.{EXTENSION}"));
        if path.parent() != Some(self.dir.as_path()) {
            return Err(Error::InvalidNamespace(format!("path traversal detected: {name}")));
        }
        Ok(path)
    }

    /// Load a namespace. A missing file yields an empty namespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` for an unusable name, or an I/O error.
    pub fn namespace(&self, namespace: &str) -> Result<Namespace> {
        let name = sanitize_namespace(namespace)?;
        let path = self.path_for(&name)?;

        if !path.exists() {
            return Ok(Namespace {
                name,
                path,
                data: Map::new(),
                existed: false,
                quarantined: None,
            });
        }

        let content = fs::read_to_string(&path)?;
        let (data, quarantined) = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(data)) => (data, None),
            _ => {
                let backup = path.with_file_name(format!("{name}{BACKUP_SUFFIX}"));
                fs::rename(&path, &backup)?;
                warn!(namespace = %name, backup = %backup.display(), "Corrupted namespace file backed up");
                (Map::new(), Some(backup))
            }
        };

        Ok(Namespace {
            name,
            path,
            data,
            existed: true,
            quarantined,
        })
    }

    /// Names of every namespace, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory directory exists but cannot be read.
    pub fn namespaces(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// One loaded namespace.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    path: PathBuf,
    data: Map<String, Value>,
    existed: bool,
    quarantined: Option<PathBuf>,
}

impl Namespace {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the namespace file was present when loaded.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.existed
    }

    /// Backup path, if the file was corrupt and moved aside on load.
    #[must_use]
    pub fn quarantined(&self) -> Option<&Path> {
        self.quarantined.as_deref()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// # Errors
    ///
    /// Returns `KeyNotFound` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.data.get(key).ok_or_else(|| self.key_not_found(key))
    }

    /// Set `key` to the parsed form of `raw`, returning the stored value.
    pub fn insert(&mut self, key: &str, raw: &str) -> &Value {
        let value = parse_value(raw);
        self.data.insert(key.to_string(), value);
        &self.data[key]
    }

    /// # Errors
    ///
    /// Returns `KeyNotFound` if the key is absent.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        self.data.remove(key).ok_or_else(|| self.key_not_found(key))
    }

    /// Sorted keys, optionally filtered by a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceNotFound` if the namespace file did not exist, or
    /// `InvalidArgument` for a malformed pattern.
    pub fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        self.require_existing()?;
        let pattern = pattern
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| Error::InvalidArgument(format!("invalid key pattern: {e}")))?;

        let mut keys: Vec<String> = self
            .data
            .keys()
            .filter(|k| pattern.as_ref().is_none_or(|p| p.matches(k)))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Write the namespace back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&mut self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        atomic_write(&self.path, &content)?;
        self.existed = true;
        debug!(namespace = %self.name, keys = self.data.len(), "Namespace saved");
        Ok(())
    }

    /// Delete the namespace file.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceNotFound` if the file did not exist.
    pub fn clear(self) -> Result<()> {
        self.require_existing()?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        debug!(namespace = %self.name, "Namespace cleared");
        Ok(())
    }

    fn require_existing(&self) -> Result<()> {
        if self.existed {
            Ok(())
        } else {
            Err(Error::NamespaceNotFound(self.name.clone()))
        }
    }

    fn key_not_found(&self, key: &str) -> Error {
        Error::KeyNotFound {
            namespace: self.name.clone(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, MemoryStore) {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new(&StoreConfig::new(temp.path()));
        (temp, store)
    }

    #[test]
    fn test_sanitize_namespace() {
        assert_eq!(sanitize_namespace("project").unwrap(), "project");
        assert_eq!(sanitize_namespace("a/b\\c").unwrap(), "a_b_c");
        assert_eq!(sanitize_namespace("../../etc/passwd").unwrap(), "____etc_passwd");
        assert_eq!(sanitize_namespace(".hidden.").unwrap(), "hidden");
        assert!(matches!(sanitize_namespace("."), Err(Error::InvalidNamespace(_))));
        assert!(matches!(sanitize_namespace(""), Err(Error::InvalidNamespace(_))));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("{\"a\": [1, 2]}"), json!({"a": [1, 2]}));
        assert_eq!(parse_value("plain text"), json!("plain text"));
        assert_eq!(parse_value("true"), json!(true));
    }

    #[test]
    fn test_store_get_delete() {
        let (temp, store) = store();
        let mut ns = store.namespace("project").unwrap();
        assert!(!ns.exists());
        ns.insert("build", "cargo build --release");
        ns.insert("ports", "[8080, 8443]");
        ns.save().unwrap();
        assert!(temp.path().join("data/memory/project.json").exists());

        let mut ns = store.namespace("project").unwrap();
        assert_eq!(ns.get("ports").unwrap(), &json!([8080, 8443]));
        assert_eq!(ns.get("build").unwrap(), &json!("cargo build --release"));
        assert!(matches!(ns.get("missing"), Err(Error::KeyNotFound { .. })));

        ns.remove("build").unwrap();
        ns.save().unwrap();
        assert!(!store.namespace("project").unwrap().contains("build"));
        assert!(matches!(ns.remove("build"), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn test_keys_sorted_and_filtered() {
        let (_temp, store) = store();
        let mut ns = store.namespace("cfg").unwrap();
        for key in ["db.port", "api.url", "db.host"] {
            ns.insert(key, "x");
        }
        ns.save().unwrap();

        let ns = store.namespace("cfg").unwrap();
        assert_eq!(ns.keys(None).unwrap(), vec!["api.url", "db.host", "db.port"]);
        assert_eq!(ns.keys(Some("db.*")).unwrap(), vec!["db.host", "db.port"]);
        assert!(matches!(ns.keys(Some("[")), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_namespace_errors() {
        let (_temp, store) = store();
        let ns = store.namespace("ghost").unwrap();
        assert!(matches!(ns.keys(None), Err(Error::NamespaceNotFound(_))));
        assert!(matches!(ns.clear(), Err(Error::NamespaceNotFound(_))));
    }

    #[test]
    fn test_namespaces_and_clear() {
        let (_temp, store) = store();
        assert!(store.namespaces().unwrap().is_empty());
        for name in ["zeta", "alpha"] {
            let mut ns = store.namespace(name).unwrap();
            ns.insert("k", "v");
            ns.save().unwrap();
        }
        assert_eq!(store.namespaces().unwrap(), vec!["alpha", "zeta"]);

        store.namespace("zeta").unwrap().clear().unwrap();
        assert_eq!(store.namespaces().unwrap(), vec!["alpha"]);
    }

    #[test]
    fn test_corrupt_namespace_is_quarantined() {
        let (temp, store) = store();
        let dir = temp.path().join("data/memory");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.json"), "{not json").unwrap();

        let ns = store.namespace("broken").unwrap();
        assert!(ns.keys(None).unwrap().is_empty());
        assert_eq!(ns.quarantined(), Some(dir.join("broken.json.bak").as_path()));
        assert!(!dir.join("broken.json").exists());
        assert_eq!(fs::read_to_string(dir.join("broken.json.bak")).unwrap(), "{not json");
        assert!(store.namespaces().unwrap().is_empty());
    }
}
