//! Opaque identifier for a backend-side log target.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle naming a log target created by the backend.
///
/// The backend never hands out [`SessionHandle::INVALID`]; a creation response
/// carrying it is treated as a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// Reserved sentinel meaning "no session".
    pub const INVALID: SessionHandle = SessionHandle(0);

    /// Wrap a raw backend identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw backend identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Return `true` unless this is [`SessionHandle::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{:#x}", self.0)
        } else {
            f.write_str("<invalid>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_default_and_not_valid() {
        assert_eq!(SessionHandle::default(), SessionHandle::INVALID);
        assert!(!SessionHandle::INVALID.is_valid());
        assert!(SessionHandle::new(7).is_valid());
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(SessionHandle::new(42), SessionHandle::new(42));
        assert_ne!(SessionHandle::new(42), SessionHandle::new(43));
    }

    #[test]
    fn display_marks_invalid_handles() {
        assert_eq!(SessionHandle::new(255).to_string(), "0xff");
        assert_eq!(SessionHandle::INVALID.to_string(), "<invalid>");
    }
}
