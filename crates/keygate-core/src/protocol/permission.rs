//! Permission strings (`verb:resource`).
//!
//! Matching is exact string equality; `read:*` never expands.

/// Verb required for safe (read) methods.
pub const READ: &str = "read";
/// Verb required for mutating methods.
pub const WRITE: &str = "write";

/// Whether `s` is a well-formed `verb:resource` permission.
pub fn is_well_formed(s: &str) -> bool {
    let Some((verb, resource)) = s.split_once(':') else {
        return false;
    };
    is_token(verb) && is_token(resource)
}

/// Build the permission string for `verb` on `resource`.
pub fn permission_for(verb: &str, resource: &str) -> String {
    format!("{verb}:{resource}")
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '*'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed() {
        assert!(is_well_formed("read:incidents"));
        assert!(is_well_formed("write:communications"));
        assert!(!is_well_formed("read"));
        assert!(!is_well_formed(":incidents"));
        assert!(!is_well_formed("read: incidents"));
        assert!(!is_well_formed("read:a:b"));
    }

    #[test]
    fn builds_permission() {
        assert_eq!(permission_for(READ, "properties"), "read:properties");
    }
}
