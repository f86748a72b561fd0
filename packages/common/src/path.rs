//! Storage key allocation.

use std::collections::HashSet;

use uuid::Uuid;

/// Generates collision-free opaque storage keys of the form `<token>.<extension>`.
///
/// The allocator keeps no state between calls. Callers pass the set of tokens already in
/// use every time; uniqueness is additionally enforced by the storage backend and the
/// `stored_file.storage_key` UNIQUE constraint, since two concurrent callers can observe
/// the same set.
pub struct PathAllocator;

impl PathAllocator {
    /// Generate a random token that is not a member of `taken`.
    pub fn allocate_token(taken: &HashSet<String>) -> String {
        loop {
            let token = Uuid::new_v4().to_string();
            if !taken.contains(&token) {
                return token;
            }
        }
    }

    /// Allocate a full storage key for a file with the given format extension.
    ///
    /// `taken` holds key stems (see [`key_stem`]), not full keys.
    pub fn allocate(taken: &HashSet<String>, extension: &str) -> String {
        let token = Self::allocate_token(taken);
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            token
        } else {
            format!("{token}.{extension}")
        }
    }
}

/// Strip the extension from a storage key, leaving the random token.
pub fn key_stem(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}
