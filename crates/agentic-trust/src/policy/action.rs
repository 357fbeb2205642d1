//! Action matching with wildcards.
//!
//! Actions are `verb:resource` strings.
//!   - `read:articles` matches exactly
//!   - `read:*` matches anything under `read:`
//!   - `publish/*` matches anything under `publish/`
//!   - `*` matches every action

/// Check whether a statement's action entry covers a requested action.
pub fn action_matches(pattern: &str, requested: &str) -> bool {
    if pattern == "*" || pattern == requested {
        return true;
    }

    for (wildcard, sep) in [(":*", b':'), ("/*", b'/')] {
        let Some(prefix) = pattern.strip_suffix(wildcard) else {
            continue;
        };
        // Something must follow the separator: `read:*` does not cover `read` or `read:`.
        if requested.len() > prefix.len() + 1
            && requested.starts_with(prefix)
            && requested.as_bytes()[prefix.len()] == sep
        {
            return true;
        }
    }

    false
}
