//! Prompt-engine policy types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which source wins when more than one registered source holds the same key.
///
/// Per-call overrides always win under either policy: the compiler places the
/// override source at the highest-priority end of the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourcePrecedence {
    /// Probe every source; the last registered source that holds the key wins.
    /// Generic defaults go first, specific overrides after them.
    #[default]
    LastRegisteredWins,
    /// Probe sources in registration order and stop at the first hit.
    FirstRegisteredWins,
}

impl fmt::Display for SourcePrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePrecedence::LastRegisteredWins => write!(f, "last-registered-wins"),
            SourcePrecedence::FirstRegisteredWins => write!(f, "first-registered-wins"),
        }
    }
}
