/// Sentinel understood by the gateway as "every namespace".
pub const ALL_NAMESPACES: &str = "";

/// Expands a scope descriptor into the namespaces a cycle queries.
///
/// An empty descriptor is cluster-wide and yields the single
/// [`ALL_NAMESPACES`] sentinel; it is never expanded locally. A comma
/// separated list keeps its order and duplicates, with each entry trimmed.
/// Empty list entries are skipped so that `"a,,b"` cannot silently widen
/// the scope to the whole cluster.
pub fn resolve_scope(descriptor: &str) -> Vec<String> {
    let namespaces: Vec<String> = descriptor
        .split(',')
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect();

    if namespaces.is_empty() {
        vec![ALL_NAMESPACES.to_string()]
    } else {
        namespaces
    }
}

pub fn is_cluster_wide(namespaces: &[String]) -> bool {
    matches!(namespaces, [only] if only == ALL_NAMESPACES)
}

/// Whether `ns` is a usable namespace name (an RFC 1123 label): at most 63
/// lowercase alphanumerics or `-`, starting and ending alphanumeric.
pub fn is_valid_namespace(ns: &str) -> bool {
    let bytes = ns.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= 63
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        }
        _ => false,
    }
}
