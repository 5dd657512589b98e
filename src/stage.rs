//! Invocation stages as a typed enum.

use std::fmt;

/// One phase of a single invocation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    Before,
    Handler,
    After,
    Error,
}

impl Stage {
    /// Returns the lowercase name used in log fields (e.g. `"before"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before  => "before",
            Self::Handler => "handler",
            Self::After   => "after",
            Self::Error   => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
