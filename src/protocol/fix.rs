//! Built-in FIX protocol versions.

use std::sync::Arc;

use crate::protocol::Protocol;

/// A standard FIX version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixVersion {
    Fix42,
    Fix44,
    Fix50Sp2,
}

impl FixVersion {
    pub const ALL: [FixVersion; 3] = [FixVersion::Fix42, FixVersion::Fix44, FixVersion::Fix50Sp2];

    pub fn into_protocol(self) -> Arc<dyn Protocol> {
        Arc::new(self)
    }
}

impl Protocol for FixVersion {
    fn name(&self) -> &str {
        match self {
            FixVersion::Fix42 => "FIX42",
            FixVersion::Fix44 => "FIX44",
            FixVersion::Fix50Sp2 => "FIX50SP2",
        }
    }

    fn begin_string(&self) -> &str {
        match self {
            FixVersion::Fix42 => "FIX.4.2",
            FixVersion::Fix44 => "FIX.4.4",
            // FIX 5.0 runs over the FIXT.1.1 session layer
            FixVersion::Fix50Sp2 => "FIXT.1.1",
        }
    }

    fn default_appl_ver_id(&self) -> Option<&str> {
        match self {
            FixVersion::Fix50Sp2 => Some("9"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_strings() {
        assert_eq!(FixVersion::Fix42.begin_string(), "FIX.4.2");
        assert_eq!(FixVersion::Fix44.begin_string(), "FIX.4.4");
        assert_eq!(FixVersion::Fix50Sp2.begin_string(), "FIXT.1.1");
    }

    #[test]
    fn test_appl_ver_id_only_for_fixt() {
        assert_eq!(FixVersion::Fix44.default_appl_ver_id(), None);
        assert_eq!(FixVersion::Fix50Sp2.default_appl_ver_id(), Some("9"));
    }
}
