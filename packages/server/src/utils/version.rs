use std::cmp::Ordering;

/// Parse a version name as a semantic version, allowing a `v` or `=` prefix.
pub fn parse_version_name(name: &str) -> Result<semver::Version, semver::Error> {
    let trimmed = name.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    semver::Version::parse(bare)
}

/// Order version names newest first. Names that do not parse sort last.
pub fn compare_version_names_desc(a: &str, b: &str) -> Ordering {
    match (parse_version_name(a), parse_version_name(b)) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
