//! Canonical platform identifiers and the normalization applied to requested
//! platform tokens.

pub const WINDOWS: &str = "win32";
pub const OSX: &str = "osx";
pub const LINUX: &str = "linux";

/// Architecture qualifiers carried by platform tokens such as `win32-x64`.
const ARCH_SEGMENTS: &[&str] = &["x64", "ia32", "x32", "x86", "arm64", "amd64", "64", "32"];

/// Map one token to its canonical platform id.
///
/// Tokens are split on `-`/`_`, architecture segments are dropped, and the
/// first remaining segment names the OS family: `win32-x64` → `win32`,
/// `darwin` → `osx`, `linux_64` → `linux`.
pub fn normalize_platform(token: &str) -> Option<&'static str> {
    let lower = token.trim().to_ascii_lowercase();
    let family = lower
        .split(['-', '_'])
        .find(|segment| !segment.is_empty() && !ARCH_SEGMENTS.contains(segment))?;

    match family {
        "win32" | "win64" | "win" | "windows" => Some(WINDOWS),
        "osx" | "darwin" | "mac" | "macos" | "macosx" => Some(OSX),
        "linux" => Some(LINUX),
        _ => None,
    }
}

/// Normalize every requested token, dropping duplicates.
///
/// Returns the first token that names no known platform as the error.
pub fn sanitize<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>, String> {
    let mut platforms: Vec<String> = Vec::new();
    for token in tokens {
        let platform =
            normalize_platform(token.as_ref()).ok_or_else(|| token.as_ref().to_string())?;
        if !platforms.iter().any(|p| p == platform) {
            platforms.push(platform.to_string());
        }
    }
    Ok(platforms)
}

/// Guess the platform of a client from its `User-Agent`.
pub fn detect_from_user_agent(user_agent: &str) -> Option<Vec<String>> {
    let ua = user_agent.to_ascii_lowercase();

    let platform = if ua.contains("squirrel") || ua.contains("windows") || ua.contains("win64") {
        WINDOWS
    } else if ua.contains("macintosh") || ua.contains("mac os x") || ua.contains("darwin") {
        OSX
    } else if ua.contains("linux") || ua.contains("x11") {
        LINUX
    } else {
        return None;
    };

    Some(vec![platform.to_string()])
}
