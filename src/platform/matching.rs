//! Identifier matching rules per platform
//!
//! The shape of a capture target identifier depends on which capture backend
//! produced it (window title, window class, executable name, bundle id), so
//! matching is tolerant everywhere except macOS, where bundle identifiers are
//! stable. The rules are plain string functions compiled on every platform so
//! they can be unit tested anywhere; the probe backends delegate to the rule
//! for their own platform.

/// macOS: bundle identifiers are stable, only exact equality matches.
pub fn macos_ids_match(frontmost: &str, target: &str) -> bool {
    frontmost == target
}

/// Windows: the frontmost id is an executable filename (e.g. "Code.exe")
/// while the target may be a window title, window class, or executable name.
/// Case-insensitive equality, plus containment of the extension-stripped
/// executable name within the target.
pub fn windows_ids_match(frontmost: &str, target: &str) -> bool {
    if frontmost.is_empty() || target.is_empty() {
        return false;
    }

    if frontmost.eq_ignore_ascii_case(target) {
        return true;
    }

    let front_lower = frontmost.to_lowercase();
    if let Some(stem) = front_lower.strip_suffix(".exe") {
        if !stem.is_empty() && target.to_lowercase().contains(stem) {
            return true;
        }
    }

    false
}

/// Linux: the frontmost id is a WM_CLASS name while targets vary by capture
/// backend (window titles for xcomposite, portal-dependent for PipeWire).
/// Case-insensitive equality, or substring containment in either direction.
pub fn linux_ids_match(frontmost: &str, target: &str) -> bool {
    if frontmost.is_empty() || target.is_empty() {
        return false;
    }

    if frontmost.eq_ignore_ascii_case(target) {
        return true;
    }

    let front_lower = frontmost.to_lowercase();
    let target_lower = target.to_lowercase();
    target_lower.contains(&front_lower) || front_lower.contains(&target_lower)
}
