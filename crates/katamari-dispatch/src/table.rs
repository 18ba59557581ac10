//! Name table: names and aliases bound to shared values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use katamari_types::{NameMatch, RegistryError};

/// Binds one or more names to each shared entry.
///
/// This is the storage behind [`CommandRegistry`](crate::CommandRegistry)
/// and usable for any other name-keyed table. Names are normalized with the
/// table's [`NameMatch`] policy; entries keep insertion order.
pub struct NameTable<T: ?Sized> {
    policy: NameMatch,
    /// Normalized name to index in `entries`.
    bindings: HashMap<String, usize>,
    entries: Vec<Entry<T>>,
}

struct Entry<T: ?Sized> {
    name: String,
    value: Arc<T>,
}

impl<T: ?Sized> NameTable<T> {
    pub fn with_policy(policy: NameMatch) -> Self {
        Self {
            policy,
            bindings: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn policy(&self) -> NameMatch {
        self.policy
    }

    /// Bind `value` under every name in `names`; the first is canonical.
    ///
    /// All bindings are inserted or none are. Fails with `InvalidName` when
    /// `names` is empty and `DuplicateName` when a name is already bound or
    /// two of the given names normalize alike.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
        value: Arc<T>,
    ) -> Result<Arc<T>, RegistryError> {
        let names: Vec<S> = names.into_iter().collect();
        let Some(canonical) = names.first().map(|n| n.as_ref().to_string()) else {
            return Err(RegistryError::InvalidName(String::new()));
        };
        let keys: Vec<String> = names
            .iter()
            .map(|n| self.policy.normalize(n.as_ref()))
            .collect();

        for (i, key) in keys.iter().enumerate() {
            if let Some(&idx) = self.bindings.get(key) {
                return Err(RegistryError::DuplicateName {
                    name: key.clone(),
                    existing: self.entries[idx].name.clone(),
                });
            }
            if keys[..i].contains(key) {
                return Err(RegistryError::DuplicateName {
                    name: key.clone(),
                    existing: canonical,
                });
            }
        }

        let idx = self.entries.len();
        for key in keys {
            self.bindings.insert(key, idx);
        }
        self.entries.push(Entry {
            name: canonical,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.bindings
            .get(&self.policy.normalize(name))
            .map(|&idx| &self.entries[idx].value)
    }

    /// Canonical name of the entry `name` is bound to.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.bindings
            .get(&self.policy.normalize(name))
            .map(|&idx| self.entries[idx].name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(&self.policy.normalize(name))
    }

    /// Canonical names in insertion order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + Clone + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Arc<T>> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted bound names (normalized) starting with `partial`.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let prefix = self.policy.normalize(partial);
        let mut names: Vec<String> = self
            .bindings
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl<T: ?Sized> Default for NameTable<T> {
    fn default() -> Self {
        Self::with_policy(NameMatch::default())
    }
}

impl<T: ?Sized> Clone for NameTable<T> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            bindings: self.bindings.clone(),
            entries: self
                .entries
                .iter()
                .map(|e| Entry {
                    name: e.name.clone(),
                    value: Arc::clone(&e.value),
                })
                .collect(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for NameTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable")
            .field("policy", &self.policy)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut t = NameTable::default();
        let v = t.insert(["nrepl", "bencode"], Arc::new(7)).unwrap();
        assert!(Arc::ptr_eq(&v, t.get("bencode").unwrap()));
        assert_eq!(t.canonical("bencode"), Some("nrepl"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn unsized_values() {
        let mut t: NameTable<str> = NameTable::with_policy(NameMatch::CaseInsensitive);
        t.insert(["greeting"], Arc::from("hello")).unwrap();
        assert_eq!(t.get("GREETING").map(|s| &**s), Some("hello"));
    }

    #[test]
    fn empty_names_rejected() {
        let mut t = NameTable::default();
        let err = t.insert(Vec::<&str>::new(), Arc::new(1)).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(ref n) if n.is_empty()));
        assert!(t.is_empty());
    }

    #[test]
    fn collision_is_atomic() {
        let mut t = NameTable::default();
        t.insert(["a"], Arc::new(1)).unwrap();
        let err = t.insert(["b", "c", "a"], Arc::new(2)).unwrap_err();
        match err {
            RegistryError::DuplicateName { name, existing } => {
                assert_eq!(name, "a");
                assert_eq!(existing, "a");
            },
            other => panic!("expected DuplicateName, got {other:?}"),
        }
        assert!(!t.contains("b"));
        assert!(!t.contains("c"));
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn clone_shares_values() {
        let mut t = NameTable::default();
        let v = t.insert(["x"], Arc::new(String::from("shared"))).unwrap();
        let copy = t.clone();
        assert!(Arc::ptr_eq(&v, copy.get("x").unwrap()));
    }
}
