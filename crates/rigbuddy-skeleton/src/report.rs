use std::fmt;

use serde::Serialize;

use rigbuddy_core::error::ChainError;
use rigbuddy_core::types::ChainId;

/// Non-fatal conditions met while building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BuildWarning {
    /// Two consecutive links share a position; `from` kept its orientation.
    DegenerateAim {
        chain: ChainId,
        from: String,
        to: String,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateAim { chain, from, to } => write!(
                f,
                "chain {chain}: {from} and {to} coincide, {from} keeps its orientation"
            ),
        }
    }
}

/// Summary of one build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub joints_created: usize,
    pub rest_frames_created: usize,
    /// Chains built in full, in build order.
    pub chains_built: Vec<ChainId>,
    /// Chains that were aborted. Other chains were still attempted.
    pub failures: Vec<ChainError>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    /// Whether every registered chain was built.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a `create_joints` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built(BuildReport),
    /// The joint group already existed; nothing was touched.
    AlreadyBuilt,
}

impl BuildOutcome {
    pub const fn report(&self) -> Option<&BuildReport> {
        match self {
            Self::Built(report) => Some(report),
            Self::AlreadyBuilt => None,
        }
    }

    pub const fn is_already_built(&self) -> bool {
        matches!(self, Self::AlreadyBuilt)
    }
}
