const DATA_SEGMENT: &str = "/data/";

/// Corpus-relative form of a document source path for display.
///
/// Everything up to and including the first `/data/` segment is removed. Paths without that
/// segment are returned unchanged.
#[must_use]
pub fn display_source(path: &str) -> &str {
    match path.find(DATA_SEGMENT) {
        Some(pos) => &path[pos + DATA_SEGMENT.len()..],
        None => path,
    }
}
