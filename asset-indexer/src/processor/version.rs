//! Schema version gate.

/// Whether `version` has the supported major version.
///
/// An optional leading `v` is stripped. The rest must have at least three
/// dot-separated components. Only the first one is parsed and compared, so
/// pre-release suffixes on later components are accepted.
pub fn is_supported_version(version: &str, supported_major: u64) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 3 {
        return false;
    }

    parts[0]
        .parse::<u64>()
        .is_ok_and(|major| major == supported_major)
}
