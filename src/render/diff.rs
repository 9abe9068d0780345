//! Keyed Enter/Update/Exit classification between two ordered key lists.
//!
//! The ordering contract matters: downstream buffer writers assign per-key
//! instance slots positionally, so two consecutive renders sharing unchanged
//! keys must produce those keys in the same relative order. Previously-known
//! keys (continuing and exiting) keep their order from `prev_keys`; runs of
//! newly entering keys are emitted just before the continuing key that
//! follows them in `next_keys`, and a trailing run of new keys goes last.

use std::collections::{HashMap, HashSet};

/// How one key transitions between two renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Enter,
    Exit,
    Update,
}

/// One entry of the diff pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePatternItem {
    pub key: String,
    pub kind: UpdateType,
}

/// Classify every key in `prev_keys` ∪ `next_keys` exactly once.
pub fn update_pattern(prev_keys: &[String], next_keys: &[String]) -> Vec<UpdatePatternItem> {
    let prev_set: HashSet<&str> = prev_keys.iter().map(String::as_str).collect();
    let next_set: HashSet<&str> = next_keys.iter().map(String::as_str).collect();

    let classify = |key: &str| -> UpdateType {
        match (prev_set.contains(key), next_set.contains(key)) {
            (true, true) => UpdateType::Update,
            (true, false) => UpdateType::Exit,
            _ => UpdateType::Enter,
        }
    };

    // Attach each run of unseen keys to the first continuing key after it.
    let mut pending_before: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut pending: Vec<&str> = Vec::new();
    for next_key in next_keys {
        if prev_set.contains(next_key.as_str()) {
            if !pending.is_empty() {
                pending_before.insert(next_key.as_str(), std::mem::take(&mut pending));
            }
        } else {
            pending.push(next_key.as_str());
        }
    }

    fn emit<'a>(
        result: &mut Vec<UpdatePatternItem>,
        emitted: &mut HashSet<&'a str>,
        key: &'a str,
        kind: UpdateType,
    ) {
        if emitted.insert(key) {
            result.push(UpdatePatternItem {
                key: key.to_string(),
                kind,
            });
        }
    }

    let mut result = Vec::with_capacity(prev_keys.len() + next_keys.len());
    let mut emitted: HashSet<&str> = HashSet::new();
    for prev_key in prev_keys {
        if let Some(run) = pending_before.get(prev_key.as_str()) {
            for &key in run {
                emit(&mut result, &mut emitted, key, classify(key));
            }
        }
        emit(&mut result, &mut emitted, prev_key.as_str(), classify(prev_key));
    }
    // A run of purely new keys at the end of `next_keys` goes after all
    // previously-known keys.
    for key in pending {
        emit(&mut result, &mut emitted, key, classify(key));
    }
    result
}
