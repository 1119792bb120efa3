use std::path::PathBuf;

use thiserror::Error;

use crate::types::ChainId;

/// Top-level error type for rigbuddy.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),
}

/// Configuration errors.
///
/// Always fatal: they are detected before the scene is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid spine count: {0} (must be in {min}..={max})", min = crate::config::MIN_COUNT, max = crate::config::MAX_COUNT)]
    InvalidSpineCount(u32),

    #[error("Invalid finger count: {0} (must be in {min}..={max})", min = crate::config::MIN_COUNT, max = crate::config::MAX_COUNT)]
    InvalidFingerCount(u32),

    #[error("Unregistered chain: {0}")]
    UnregisteredChain(ChainId),

    #[error("Chain {chain} attaches to {target}, which is not registered before it")]
    AttachmentOrder { chain: ChainId, target: ChainId },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Violations of the `<prefix>_<side?>_<bodyPart>_<index>` naming grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name {name:?} does not start with prefix {prefix:?}")]
    MissingPrefix { name: String, prefix: String },

    #[error("unknown body part {0:?}")]
    UnknownPart(String),

    #[error("name {0:?} does not follow the rig naming grammar")]
    Malformed(String),
}

/// Errors reading locator input.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid locator name: {0}")]
    Name(#[from] NameError),

    #[error("locator {0} is listed more than once")]
    Duplicate(String),
}

/// Failures on a single rest frame or joint node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {0} is not invertible")]
    Singular(String),

    #[error("node {0} is missing from the scene")]
    MissingNode(String),
}

/// Errors that abort one chain. Other chains are still built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain {chain}: missing locator {locator}")]
    MissingLocator { chain: ChainId, locator: String },

    #[error("chain {chain}: attachment joint {attachment} does not exist")]
    MissingAttachment { chain: ChainId, attachment: String },

    #[error("chain {chain}: link {got} requested before link {expected}")]
    OutOfOrder {
        chain: ChainId,
        expected: usize,
        got: usize,
    },

    #[error("chain {chain}: joint {name} already exists")]
    DuplicateJoint { chain: ChainId, name: String },

    #[error("chain {chain}: {source}")]
    Frame {
        chain: ChainId,
        #[source]
        source: FrameError,
    },
}

impl ChainError {
    /// The chain this error aborted.
    pub const fn chain(&self) -> ChainId {
        match self {
            Self::MissingLocator { chain, .. }
            | Self::MissingAttachment { chain, .. }
            | Self::OutOfOrder { chain, .. }
            | Self::DuplicateJoint { chain, .. }
            | Self::Frame { chain, .. } => *chain,
        }
    }
}

impl FrameError {
    /// Attach the chain being walked when the frame failed.
    pub const fn in_chain(self, chain: ChainId) -> ChainError {
        ChainError::Frame {
            chain,
            source: self,
        }
    }
}
