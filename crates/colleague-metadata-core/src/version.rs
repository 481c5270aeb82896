//! Version resolution for media types and OpenAPI documents.
//!
//! Two comparers live here. [`compare_metadata_versions`] drives `latest`
//! selection on the metadata endpoints and deliberately reports equal or
//! empty inputs as [`Ordering::Greater`]. [`compare_versions`] is the plain
//! comparer used by resource discovery, where a parse failure is treated
//! as equality.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Suffix stripped from pre-release versions before comparing.
pub const BETA_SUFFIX: &str = "-beta";

static VERSION_IN_MEDIA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(\d+)\.)?(?:(\d+)\.)?(?:(\d+)\.\d+)|(?:(\d+))").expect("static regex")
});

/// Remove every `-beta` marker from a version string.
#[must_use]
pub fn strip_beta(version: &str) -> String {
    version.replace(BETA_SUFFIX, "")
}

fn parse_segments(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

fn compare_segments(first: &[u64], second: &[u64]) -> Ordering {
    for i in 0..first.len().max(second.len()) {
        match (first.get(i), second.get(i)) {
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) if a != b => return a.cmp(b),
            _ => {}
        }
    }
    Ordering::Equal
}

/// Compare two dotted versions the way the metadata endpoints do.
///
/// `-beta` is ignored. Identical strings and an empty side compare as
/// [`Ordering::Greater`], so folding with this comparer keeps the most
/// recently seen candidate on ties. A shorter version with an equal prefix
/// is [`Ordering::Less`].
///
/// # Errors
///
/// Returns [`Error::VersionNotSupported`] when a segment is not numeric.
pub fn compare_metadata_versions(x: &str, y: &str) -> Result<Ordering> {
    let x = strip_beta(x);
    let y = strip_beta(y);
    if x == y || x.is_empty() || y.is_empty() {
        return Ok(Ordering::Greater);
    }

    let first = parse_segments(&x).ok_or_else(|| Error::VersionNotSupported { version: x.clone() })?;
    let second =
        parse_segments(&y).ok_or_else(|| Error::VersionNotSupported { version: y.clone() })?;
    Ok(compare_segments(&first, &second))
}

/// Standard dotted version comparison used by resource discovery.
///
/// Equal strings are [`Ordering::Equal`]. Unparseable input also compares
/// as equal rather than failing.
#[must_use]
pub fn compare_versions(x: &str, y: &str) -> Ordering {
    if x == y {
        return Ordering::Equal;
    }
    match (parse_segments(x), parse_segments(y)) {
        (Some(first), Some(second)) => compare_segments(&first, &second),
        _ => Ordering::Equal,
    }
}

/// Pick the latest version, starting the fold from `0.0.0`.
///
/// Empty candidates are skipped. The returned string keeps any `-beta`
/// suffix of the winning candidate.
///
/// # Errors
///
/// Propagates [`Error::VersionNotSupported`] from the comparer.
pub fn latest_version<'a, I>(versions: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut latest = "0.0.0".to_string();
    for candidate in versions {
        if candidate.is_empty() {
            continue;
        }
        if compare_metadata_versions(candidate, &latest)? == Ordering::Greater {
            latest = candidate.to_string();
        }
    }
    Ok(latest)
}

/// Pad a version to three segments (`1` becomes `1.0.0`, `1.2` becomes `1.2.0`).
#[must_use]
pub fn semantic_version(version: &str) -> String {
    match version.split('.').count() {
        1 => format!("{version}.0.0"),
        2 => format!("{version}.0"),
        _ => version.to_string(),
    }
}

/// Extract the version number embedded in a media type.
///
/// `application/vnd.hedtech.integration.v12.1.0+json` yields `12.1.0`.
/// Returns an empty string when no digits are present.
#[must_use]
pub fn extract_version(media_type: &str) -> String {
    VERSION_IN_MEDIA_TYPE
        .find(media_type)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// First dotted segment of a version.
#[must_use]
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or_default()
}
