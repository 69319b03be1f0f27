use std::path::Path;

/// Result of validating an uploaded filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename contains control characters (CR, LF, NUL, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates an uploaded filename (no directory components allowed).
///
/// The name ends up in `Content-Disposition`, so control characters are
/// rejected outright.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(trimmed)
}

/// Dot-prefixed extension of an uploaded file, or an empty string.
///
/// Dotfiles have no extension: `.bashrc` yields `""`.
pub fn filetype_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Filetype a download request asks for.
///
/// An explicit filetype wins and is made dot-prefixed. Otherwise the requested
/// filename contributes everything from its last `.`; only that part of the
/// filename is used for matching.
pub fn requested_filetype(filetype: Option<&str>, filename: Option<&str>) -> Option<String> {
    if let Some(filetype) = filetype.map(str::trim).filter(|ft| !ft.is_empty()) {
        return Some(if filetype.starts_with('.') {
            filetype.to_string()
        } else {
            format!(".{filetype}")
        });
    }

    let filename = filename?;
    filename
        .rfind('.')
        .map(|pos| &filename[pos..])
        .filter(|ext| ext.len() > 1)
        .map(str::to_string)
}
