//! Picks the newest snapshot out of a directory listing.
//!
//! Version keys compare as plain strings. The exporter writes fixed-width
//! `YYYYmmdd_HHMMSS` names, so string order is time order for its output; keys
//! with differing digit widths are still compared character by character.

use crate::config::SNAPSHOT_SUFFIX;

/// A snapshot file that passed the name filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub version: String,
    pub payload: T,
}

/// `<digits>_<digits>`, nothing else.
pub fn is_version_key(key: &str) -> bool {
    match key.split_once('_') {
        Some((left, right)) => {
            !left.is_empty()
                && !right.is_empty()
                && left.bytes().all(|b| b.is_ascii_digit())
                && right.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Version key of a snapshot file name, or `None` for anything that is not
/// `<digits>_<digits>.json` (suffix matched case-insensitively).
pub fn snapshot_version(file_name: &str) -> Option<String> {
    let lower = file_name.to_ascii_lowercase();
    let stem = lower.strip_suffix(SNAPSHOT_SUFFIX)?;
    is_version_key(stem).then(|| stem.to_string())
}

/// The entry with the greatest key. Keys that are not version keys are
/// ignored; on equal keys the first one seen wins.
pub fn select_latest<T, I>(entries: I) -> Option<Candidate<T>>
where
    I: IntoIterator<Item = (String, T)>,
{
    let mut latest: Option<Candidate<T>> = None;
    for (version, payload) in entries {
        if !is_version_key(&version) {
            continue;
        }
        if latest.as_ref().map_or(true, |l| version > l.version) {
            latest = Some(Candidate { version, payload });
        }
    }
    latest
}

/// `true` when `candidate` supersedes `last`. Nothing committed yet means any
/// candidate is newer.
pub fn is_newer(candidate: &str, last: Option<&str>) -> bool {
    last.map_or(true, |last| candidate > last)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_selects_string_maximum(keys in prop::collection::vec("[0-9]{1,4}_[0-9]{1,4}", 1..20)) {
            let expected = keys.iter().max().cloned();
            let latest = select_latest(keys.iter().cloned().map(|k| (k, ())));
            prop_assert_eq!(latest.map(|c| c.version), expected);
        }

        #[test]
        fn prop_noise_never_selected(
            keys in prop::collection::vec("[0-9]{1,4}_[0-9]{1,4}", 0..10),
            noise in prop::collection::vec("[a-z]{1,8}", 0..10),
        ) {
            let all = keys.iter().chain(noise.iter()).cloned().map(|k| (k, ()));
            let latest = select_latest(all);
            prop_assert_eq!(latest.map(|c| c.version), keys.iter().max().cloned());
        }

        #[test]
        fn prop_file_names_roundtrip(key in "[0-9]{1,8}_[0-9]{1,6}") {
            let name = format!("{key}.json");
            prop_assert_eq!(snapshot_version(&name), Some(key));
        }
    }
}
