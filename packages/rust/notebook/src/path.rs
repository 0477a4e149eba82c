//! Path signatures for tree locations.
//!
//! A path signature encodes where a node sits in the notebook tree: object
//! keys contribute their name, array traversal contributes an empty segment.
//! Joining with `.` yields the string the filter rules dispatch on, e.g.
//! `cells..outputs.` for any output record of any cell. Array indices
//! collapse so that rules match shape classes, not exact positions.

/// Segment recorded when recursing into an array element.
pub(crate) const INDEX_SEGMENT: &str = "";

/// Join accumulated path segments into a signature string.
pub fn signature(path: &[String]) -> String {
    path.join(".")
}

/// Extend a path with one more segment, yielding a fresh vector.
///
/// Signatures are built top-down one level at a time; the parent's path is
/// never mutated.
pub(crate) fn extend(path: &[String], segment: &str) -> Vec<String> {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(segment.to_string());
    next
}
