//! Helpers for reading persisted records.
//!
//! Fetches tolerate an absent record (the stage key is the existence
//! marker) but not a half-present one: once the stage key exists, any
//! missing or unparseable required field is a [`Error::CorruptState`].

use std::collections::{BTreeMap, BTreeSet};

use turncoat_store::KvStore;

use crate::error::{Error, Result};
use crate::ids::{PlayerId, RoundId};

/// Wire form of a boolean vote.
pub(crate) fn vote_str(vote: bool) -> &'static str {
    if vote {
        "true"
    } else {
        "false"
    }
}

pub(crate) fn parse_vote(key: &str, voter: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::CorruptState {
            key: key.to_string(),
            detail: format!("vote by {voter:?} is {other:?}, not a boolean"),
        }),
    }
}

/// Read a scalar that must exist once the record's stage key does.
pub(crate) fn require_scalar(store: &dyn KvStore, key: &str) -> Result<String> {
    store.get(key)?.ok_or_else(|| Error::CorruptState {
        key: key.to_string(),
        detail: "missing required field".to_string(),
    })
}

pub(crate) fn require_usize(store: &dyn KvStore, key: &str) -> Result<usize> {
    let raw = require_scalar(store, key)?;
    raw.parse().map_err(|_| Error::CorruptState {
        key: key.to_string(),
        detail: format!("{raw:?} is not a number"),
    })
}

pub(crate) fn player_set(store: &dyn KvStore, key: &str) -> Result<BTreeSet<PlayerId>> {
    Ok(store
        .set_members(key)?
        .into_iter()
        .map(PlayerId::from)
        .collect())
}

pub(crate) fn round_id_set(store: &dyn KvStore, key: &str) -> Result<BTreeSet<RoundId>> {
    Ok(store
        .set_members(key)?
        .into_iter()
        .map(RoundId::from)
        .collect())
}

pub(crate) fn vote_map(store: &dyn KvStore, key: &str) -> Result<BTreeMap<PlayerId, bool>> {
    let mut votes = BTreeMap::new();
    for (voter, value) in store.hash_get_all(key)? {
        let vote = parse_vote(key, &voter, &value)?;
        votes.insert(PlayerId::from(voter), vote);
    }
    Ok(votes)
}
