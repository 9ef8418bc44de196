//! Dot-notation path parsing.
//!
//! A path is a non-empty string of segments separated by `.`; a segment
//! consisting entirely of ASCII digits is a non-negative base-10 list
//! index, any other segment is a field name. Empty segments are rejected at
//! parse time. Parsed paths are memoised in a process-wide insert-only
//! cache, so parsing the same path twice yields reference-equal finders.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        OnceLock,
        RwLock,
    },
};

use crate::{
    error::Error,
    optics::finder::{
        Finder,
        FinderStep,
    },
};

static CACHE: OnceLock<RwLock<HashMap<String, Arc<Finder>>>> = OnceLock::new();

fn cache() -> &'static RwLock<HashMap<String, Arc<Finder>>> {
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Parses a dot-notation path into a shared [`Finder`].
///
/// # Errors
/// If the path is empty, contains an empty segment, or contains an index
/// that does not fit in `usize`.
pub fn parse(raw: &str) -> Result<Arc<Finder>, Error> {
    if let Some(found) = cache().read().expect("Path cache poisoned").get(raw) {
        return Ok(Arc::clone(found));
    }

    let parsed = Arc::new(parse_uncached(raw)?);
    let mut cache = cache().write().expect("Path cache poisoned");
    Ok(Arc::clone(
        cache.entry(raw.to_owned()).or_insert(parsed),
    ))
}

fn parse_uncached(raw: &str) -> Result<Finder, Error> {
    if raw.is_empty() {
        return Err(Error::Path {
            path: raw.to_owned(),
            reason: "path is empty".to_owned(),
        });
    }

    let mut steps = Vec::new();
    for segment in raw.split('.') {
        if segment.is_empty() {
            return Err(Error::Path {
                path: raw.to_owned(),
                reason: "empty segment".to_owned(),
            });
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            let index = segment.parse::<usize>().map_err(|_| Error::Path {
                path: raw.to_owned(),
                reason: format!("index {segment} out of range"),
            })?;
            steps.push(FinderStep::Index(index));
        } else {
            steps.push(FinderStep::Field(segment.to_owned()));
        }
    }

    Ok(Finder::from_steps(steps))
}
