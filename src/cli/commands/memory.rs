//! Memory command implementations (namespaced key-value storage).

use crate::cli::MemoryCommands;
use crate::error::{Error, Result};
use crate::storage::{MemoryStore, Namespace};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Output for memory store.
#[derive(Serialize)]
struct StoreOutput<'a> {
    namespace: &'a str,
    key: &'a str,
    value: &'a Value,
}

/// Output for memory get.
#[derive(Serialize)]
struct GetOutput<'a> {
    namespace: &'a str,
    key: &'a str,
    value: &'a Value,
}

/// Output for memory list/keys.
#[derive(Serialize)]
struct KeysOutput<'a> {
    namespace: &'a str,
    keys: &'a [String],
    count: usize,
}

/// Output for memory list-all.
#[derive(Serialize)]
struct NamespacesOutput<'a> {
    namespaces: &'a [String],
    count: usize,
}

/// Output for delete/clear/exists.
#[derive(Serialize)]
struct StatusOutput<'a> {
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

/// Execute memory commands.
///
/// # Errors
///
/// Returns an error for an invalid namespace, a missing key or namespace,
/// or a failed read/write. `exists` on an absent key returns `KeyNotFound`
/// after printing `false`, so the process exits non-zero.
pub fn execute(command: &MemoryCommands, store: &MemoryStore, json: bool) -> Result<()> {
    match command {
        MemoryCommands::Store {
            namespace,
            key,
            value,
        } => store_value(store, namespace, key, value, json),
        MemoryCommands::Get { namespace, key } => get(store, namespace, key, json),
        MemoryCommands::Delete { namespace, key } => delete(store, namespace, key, json),
        MemoryCommands::List { namespace } => list(store, namespace, json),
        MemoryCommands::ListAll => list_all(store, json),
        MemoryCommands::Clear { namespace } => clear(store, namespace, json),
        MemoryCommands::Exists { namespace, key } => exists(store, namespace, key, json),
        MemoryCommands::Keys { namespace, pattern } => {
            keys(store, namespace, pattern.as_deref(), json)
        }
    }
}

/// Load a namespace, reporting a quarantined file on stderr.
fn load(store: &MemoryStore, namespace: &str) -> Result<Namespace> {
    let ns = store.namespace(namespace)?;
    if let Some(backup) = ns.quarantined() {
        eprintln!(
            "{} Corrupted file backed up to {}",
            "Warning:".yellow().bold(),
            backup.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    Ok(ns)
}

fn store_value(store: &MemoryStore, namespace: &str, key: &str, raw: &str, json: bool) -> Result<()> {
    let mut ns = load(store, namespace)?;
    ns.insert(key, raw);
    ns.save()?;

    if crate::is_silent() {
        println!("{key}");
    } else if json {
        let output = StoreOutput {
            namespace: ns.name(),
            key,
            value: ns.get(key)?,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Stored \"{key}\" in {namespace}");
    }
    Ok(())
}

fn get(store: &MemoryStore, namespace: &str, key: &str, json: bool) -> Result<()> {
    let ns = load(store, namespace)?;
    let value = ns.get(key)?;

    if json {
        let output = GetOutput {
            namespace: ns.name(),
            key,
            value,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        match value {
            Value::String(s) => println!("{s}"),
            Value::Object(_) | Value::Array(_) => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            other => println!("{other}"),
        }
    }
    Ok(())
}

fn delete(store: &MemoryStore, namespace: &str, key: &str, json: bool) -> Result<()> {
    let mut ns = load(store, namespace)?;
    ns.remove(key)?;
    ns.save()?;

    if crate::is_silent() {
        println!("{key}");
    } else if json {
        let output = StatusOutput {
            namespace: ns.name(),
            key: Some(key),
            deleted: Some(true),
            cleared: None,
            exists: None,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted \"{key}\" from {namespace}");
    }
    Ok(())
}

fn list(store: &MemoryStore, namespace: &str, json: bool) -> Result<()> {
    let ns = load(store, namespace)?;
    let keys = ns.keys(None)?;

    if crate::is_csv() {
        println!("key,value");
        for key in &keys {
            let value = ns.get(key)?;
            let text = value.as_str().map_or_else(|| value.to_string(), ToString::to_string);
            println!("{},{}", crate::csv_escape(key), crate::csv_escape(&text));
        }
    } else if json {
        let output = KeysOutput {
            namespace: ns.name(),
            count: keys.len(),
            keys: &keys,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if keys.is_empty() {
        println!("No keys in {namespace}");
    } else {
        println!("{}", format!("Keys in {namespace}:").cyan().bold());
        for key in &keys {
            println!("  - {key}");
        }
    }
    Ok(())
}

fn list_all(store: &MemoryStore, json: bool) -> Result<()> {
    let namespaces = store.namespaces()?;

    if json {
        let output = NamespacesOutput {
            count: namespaces.len(),
            namespaces: &namespaces,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if namespaces.is_empty() {
        println!("No namespaces found");
    } else {
        println!("{}", "Namespaces:".cyan().bold());
        for ns in &namespaces {
            println!("  - {ns}");
        }
    }
    Ok(())
}

fn clear(store: &MemoryStore, namespace: &str, json: bool) -> Result<()> {
    let ns = load(store, namespace)?;
    let name = ns.name().to_string();
    ns.clear()?;

    if crate::is_silent() {
        println!("{name}");
    } else if json {
        let output = StatusOutput {
            namespace: &name,
            key: None,
            deleted: None,
            cleared: Some(true),
            exists: None,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Cleared namespace {namespace}");
    }
    Ok(())
}

fn exists(store: &MemoryStore, namespace: &str, key: &str, json: bool) -> Result<()> {
    let ns = load(store, namespace)?;
    let found = ns.contains(key);

    if json {
        let output = StatusOutput {
            namespace: ns.name(),
            key: Some(key),
            deleted: None,
            cleared: None,
            exists: Some(found),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{found}");
    }

    if found {
        Ok(())
    } else {
        Err(Error::KeyNotFound {
            namespace: ns.name().to_string(),
            key: key.to_string(),
        })
    }
}

fn keys(store: &MemoryStore, namespace: &str, pattern: Option<&str>, json: bool) -> Result<()> {
    let ns = load(store, namespace)?;
    let keys = ns.keys(pattern)?;

    if json {
        let output = KeysOutput {
            namespace: ns.name(),
            count: keys.len(),
            keys: &keys,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for key in &keys {
            println!("{key}");
        }
    }
    Ok(())
}
