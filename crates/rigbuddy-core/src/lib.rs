// rigbuddy-core: naming grammar, config, errors and matrix helpers for rigbuddy.

pub mod config;
pub mod error;
pub mod math;
pub mod types;

pub mod prelude {
    pub use crate::config::{AimConfig, Axis, NamingConfig, RigConfig};
    pub use crate::error::{
        ChainError, ConfigError, FrameError, LocatorError, NameError, RigError,
    };
    pub use crate::math::{Mat4, Vec3};
    pub use crate::types::{BodyPart, ChainId, ChainPattern, LinkIndex, RigName, Side};
}
