//! In-memory reference store.
//!
//! A mutex-held map of typed values implementing the full [`KvStore`]
//! capability set. This is the engine the test suites run against; its
//! kind discipline (a key holds exactly one of scalar/set/list/hash, and
//! using it as anything else errors) mirrors the remote engines the port
//! was designed around.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::{Error, Kind, KvStore, Result};

/// The value held at one key.
#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Set(BTreeSet<String>),
    List(VecDeque<String>),
    Hash(BTreeMap<String, String>),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Self::Scalar(_) => Kind::Scalar,
            Self::Set(_) => Kind::Set,
            Self::List(_) => Kind::List,
            Self::Hash(_) => Kind::Hash,
        }
    }
}

fn wrong_kind(key: &str, expected: Kind, actual: &Value) -> Error {
    Error::WrongKind {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}

/// Thread-safe in-memory [`KvStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entries().get(key) {
            None => Ok(None),
            Some(Value::Scalar(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_kind(key, Kind::Scalar, other)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()
            .insert(key.to_string(), Value::Scalar(value.to_string()));
        Ok(())
    }

    fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        let mut entries = self.entries();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Value::Scalar(value.to_string()));
        Ok(true)
    }

    fn del(&self, key: &str) -> Result<bool> {
        Ok(self.entries().remove(key).is_some())
    }

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let mut entries = self.entries();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(BTreeSet::new()))
        {
            Value::Set(members) => Ok(members.insert(member.to_string())),
            other => Err(wrong_kind(key, Kind::Set, other)),
        }
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        match self.entries().get(key) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(other) => Err(wrong_kind(key, Kind::Set, other)),
        }
    }

    fn list_push_front(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Value::List(VecDeque::new()))
        {
            Value::List(items) => {
                items.push_front(value.to_string());
                Ok(())
            }
            other => Err(wrong_kind(key, Kind::List, other)),
        }
    }

    fn list_push_back(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Value::List(VecDeque::new()))
        {
            Value::List(items) => {
                items.push_back(value.to_string());
                Ok(())
            }
            other => Err(wrong_kind(key, Kind::List, other)),
        }
    }

    fn list_pop_front(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries();
        let popped = match entries.get_mut(key) {
            None => return Ok(None),
            Some(Value::List(items)) => items.pop_front(),
            Some(other) => return Err(wrong_kind(key, Kind::List, other)),
        };
        // Emptied lists vanish, like the remote engines they stand in for.
        if matches!(entries.get(key), Some(Value::List(items)) if items.is_empty()) {
            entries.remove(key);
        }
        Ok(popped)
    }

    fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let entries = self.entries();
        let items = match entries.get(key) {
            None => return Ok(Vec::new()),
            Some(Value::List(items)) => items,
            Some(other) => return Err(wrong_kind(key, Kind::List, other)),
        };

        let len = items.len() as isize;
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop >= len {
            stop = len - 1;
        }
        if len == 0 || start > stop {
            return Ok(Vec::new());
        }

        Ok(items
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut entries = self.entries();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(BTreeMap::new()))
        {
            Value::Hash(fields) => Ok(fields
                .insert(field.to_string(), value.to_string())
                .is_none()),
            other => Err(wrong_kind(key, Kind::Hash, other)),
        }
    }

    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        match self.entries().get(key) {
            None => Ok(Vec::new()),
            Some(Value::Hash(fields)) => Ok(fields
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect()),
            Some(other) => Err(wrong_kind(key, Kind::Hash, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_read_back_and_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("game:g1:stage").unwrap(), None);

        store.set("game:g1:stage", "WAITING_FOR_PLAYERS").unwrap();
        store.set("game:g1:stage", "IN_PROGRESS").unwrap();
        assert_eq!(
            store.get("game:g1:stage").unwrap().as_deref(),
            Some("IN_PROGRESS")
        );
    }

    #[test]
    fn set_nx_has_exactly_one_winner() {
        let store = MemoryStore::new();
        assert!(store.set_nx("game:g1:current_round", "r1").unwrap());
        assert!(!store.set_nx("game:g1:current_round", "r2").unwrap());
        assert_eq!(
            store.get("game:g1:current_round").unwrap().as_deref(),
            Some("r1")
        );
    }

    #[test]
    fn set_nx_respects_non_scalar_occupants() {
        let store = MemoryStore::new();
        store.set_add("game:g1:players", "ada").unwrap();
        assert!(!store.set_nx("game:g1:players", "anything").unwrap());
    }

    #[test]
    fn del_reports_presence() {
        let store = MemoryStore::new();
        assert!(!store.del("missing").unwrap());

        store.set("k", "v").unwrap();
        assert!(store.del("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn set_members_deduplicate() {
        let store = MemoryStore::new();
        assert!(store.set_add("players", "ada").unwrap());
        assert!(store.set_add("players", "bob").unwrap());
        assert!(!store.set_add("players", "ada").unwrap());
        assert_eq!(store.set_members("players").unwrap(), vec!["ada", "bob"]);
    }

    #[test]
    fn lists_rotate_front_to_back() {
        let store = MemoryStore::new();
        for player in ["ada", "bob", "cat"] {
            store.list_push_back("queue", player).unwrap();
        }

        let leader = store.list_pop_front("queue").unwrap().unwrap();
        assert_eq!(leader, "ada");
        store.list_push_back("queue", &leader).unwrap();

        assert_eq!(
            store.list_range("queue", 0, -1).unwrap(),
            vec!["bob", "cat", "ada"]
        );
    }

    #[test]
    fn list_range_handles_negative_and_clamped_indices() {
        let store = MemoryStore::new();
        for n in ["a", "b", "c", "d"] {
            store.list_push_back("l", n).unwrap();
        }

        assert_eq!(store.list_range("l", 0, 0).unwrap(), vec!["a"]);
        assert_eq!(store.list_range("l", -1, -1).unwrap(), vec!["d"]);
        assert_eq!(store.list_range("l", 1, 2).unwrap(), vec!["b", "c"]);
        assert_eq!(store.list_range("l", 0, 99).unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(store.list_range("l", 3, 1).unwrap(), Vec::<String>::new());
        assert_eq!(store.list_range("missing", 0, -1).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn popping_the_last_item_removes_the_list() {
        let store = MemoryStore::new();
        store.list_push_back("l", "only").unwrap();
        assert_eq!(store.list_pop_front("l").unwrap().as_deref(), Some("only"));
        assert_eq!(store.list_pop_front("l").unwrap(), None);

        // The key is genuinely gone, not an empty husk of the wrong kind.
        store.set("l", "scalar now").unwrap();
        assert_eq!(store.get("l").unwrap().as_deref(), Some("scalar now"));
    }

    #[test]
    fn hashes_report_new_fields() {
        let store = MemoryStore::new();
        assert!(store.hash_set("votes", "ada", "true").unwrap());
        assert!(!store.hash_set("votes", "ada", "false").unwrap());
        assert!(store.hash_set("votes", "bob", "true").unwrap());

        assert_eq!(
            store.hash_get_all("votes").unwrap(),
            vec![
                ("ada".to_string(), "false".to_string()),
                ("bob".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn kind_mismatches_are_errors() {
        let store = MemoryStore::new();
        store.set("scalar", "v").unwrap();
        store.set_add("set", "m").unwrap();

        let err = store.set_add("scalar", "m").unwrap_err();
        assert!(matches!(
            err,
            Error::WrongKind {
                expected: Kind::Set,
                actual: Kind::Scalar,
                ..
            }
        ));
        assert!(store.get("set").is_err());
        assert!(store.list_range("set", 0, -1).is_err());
        assert!(store.hash_set("scalar", "f", "v").is_err());
        assert!(store.list_pop_front("scalar").is_err());
    }
}
