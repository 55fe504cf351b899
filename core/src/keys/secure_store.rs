/*
 * secure_store.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Sudomail, a secure email client core.
 *
 * Sudomail is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sudomail is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sudomail.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Named byte-blob storage backing the key manager.

use std::collections::BTreeMap;
use std::sync::Mutex;

use keyring::Entry;

use super::error::SecureStoreError;

/// Platform secure storage: a flat namespace of named secrets.
pub trait SecureStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, SecureStoreError>;
    fn put(&self, name: &str, value: &[u8]) -> Result<(), SecureStoreError>;
    /// No-op when the entry does not exist.
    fn delete(&self, name: &str) -> Result<(), SecureStoreError>;
    fn names(&self) -> Result<Vec<String>, SecureStoreError>;
    fn clear(&self) -> Result<(), SecureStoreError>;
}

/// In-process store. Contents are lost when dropped.
#[derive(Default)]
pub struct MemorySecureStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SecureStore for MemorySecureStore {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, SecureStoreError> {
        Ok(self.entries().get(name).cloned())
    }

    fn put(&self, name: &str, value: &[u8]) -> Result<(), SecureStoreError> {
        self.entries().insert(name.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), SecureStoreError> {
        self.entries().remove(name);
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>, SecureStoreError> {
        Ok(self.entries().keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), SecureStoreError> {
        self.entries().clear();
        Ok(())
    }
}

/// Name of the entry listing every stored name. Keychains cannot enumerate by service.
const INDEX_ENTRY: &str = "__sudomail_index__";

/// System keychain store: one keyring entry per name under a single service.
pub struct KeyringSecureStore {
    service: String,
    index_lock: Mutex<()>,
}

impl KeyringSecureStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            index_lock: Mutex::new(()),
        }
    }

    /// Create and delete a throwaway entry. Returns true if the system keychain is usable.
    pub fn available(service: &str) -> bool {
        let entry = match Entry::new(service, "__sudomail_check__") {
            Ok(e) => e,
            Err(_) => return false,
        };
        if entry.set_password("check").is_err() {
            return false;
        }
        let _ = entry.delete_credential();
        true
    }

    fn entry(&self, name: &str) -> Result<Entry, SecureStoreError> {
        Ok(Entry::new(&self.service, name)?)
    }

    fn read_index(&self) -> Result<Vec<String>, SecureStoreError> {
        match self.entry(INDEX_ENTRY)?.get_secret() {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(SecureStoreError::CorruptIndex),
            Err(keyring::Error::NoEntry) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_index(&self, names: &[String]) -> Result<(), SecureStoreError> {
        let bytes = serde_json::to_vec(names).map_err(SecureStoreError::CorruptIndex)?;
        self.entry(INDEX_ENTRY)?.set_secret(&bytes)?;
        Ok(())
    }

    fn update_index(&self, f: impl FnOnce(&mut Vec<String>)) -> Result<(), SecureStoreError> {
        let _guard = self.index_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut names = self.read_index()?;
        let before = names.clone();
        f(&mut names);
        if names != before {
            self.write_index(&names)?;
        }
        Ok(())
    }
}

impl SecureStore for KeyringSecureStore {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, SecureStoreError> {
        match self.entry(name)?.get_secret() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, name: &str, value: &[u8]) -> Result<(), SecureStoreError> {
        self.entry(name)?.set_secret(value)?;
        self.update_index(|names| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        })
    }

    fn delete(&self, name: &str) -> Result<(), SecureStoreError> {
        match self.entry(name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
        self.update_index(|names| names.retain(|n| n != name))
    }

    fn names(&self) -> Result<Vec<String>, SecureStoreError> {
        self.read_index()
    }

    fn clear(&self) -> Result<(), SecureStoreError> {
        for name in self.read_index()? {
            self.delete(&name)?;
        }
        match self.entry(INDEX_ENTRY)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_crud() {
        let store = MemorySecureStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.put("a", b"1").unwrap();
        store.put("b", b"2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.names().unwrap(), vec!["a".to_string(), "b".to_string()]);
        store.delete("a").unwrap();
        store.delete("missing").unwrap();
        assert_eq!(store.names().unwrap(), vec!["b".to_string()]);
        store.clear().unwrap();
        assert!(store.names().unwrap().is_empty());
    }
}
