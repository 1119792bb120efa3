use bevy::prelude::Resource;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted spine or finger count.
pub const MIN_COUNT: u32 = 1;
/// Largest accepted spine or finger count.
pub const MAX_COUNT: u32 = 11;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_spine_count() -> u32 {
    4
}
const fn default_finger_count() -> u32 {
    5
}
fn default_locator_prefix() -> String {
    "LOC".into()
}
fn default_joint_prefix() -> String {
    "JNT".into()
}
fn default_rest_suffix() -> String {
    "REST".into()
}
fn default_joint_group() -> String {
    "JNT_GRP".into()
}
fn default_storage_group() -> String {
    "opmStorage_GRP".into()
}
const fn default_aim_axis() -> Axis {
    Axis::X
}
const fn default_up_axis() -> Axis {
    Axis::Y
}
const fn default_world_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}
const fn default_fallback_up() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}
const fn default_epsilon() -> f64 {
    1e-9
}

// ---------------------------------------------------------------------------
// RigConfig
// ---------------------------------------------------------------------------

/// Build-time settings for locator placement and joint assembly.
///
/// Loaded once and passed down; nothing re-reads it mid-build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct RigConfig {
    /// Number of spine links above the root.
    #[serde(default = "default_spine_count")]
    pub spine_count: u32,

    /// Number of fingers per hand.
    #[serde(default = "default_finger_count")]
    pub finger_count: u32,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub aim: AimConfig,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            spine_count: default_spine_count(),
            finger_count: default_finger_count(),
            naming: NamingConfig::default(),
            aim: AimConfig::default(),
        }
    }
}

impl RigConfig {
    /// Config with the given counts and default naming and aim settings.
    pub fn with_counts(spine_count: u32, finger_count: u32) -> Self {
        Self {
            spine_count,
            finger_count,
            ..Self::default()
        }
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.spine_count) {
            return Err(ConfigError::InvalidSpineCount(self.spine_count));
        }
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.finger_count) {
            return Err(ConfigError::InvalidFingerCount(self.finger_count));
        }
        self.naming.validate()?;
        self.aim.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// NamingConfig
// ---------------------------------------------------------------------------

/// Prefixes and group names used at the string boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_locator_prefix")]
    pub locator_prefix: String,

    #[serde(default = "default_joint_prefix")]
    pub joint_prefix: String,

    /// Suffix appended to a joint name to name its rest frame.
    #[serde(default = "default_rest_suffix")]
    pub rest_suffix: String,

    /// Name of the marker group whose presence means "already built".
    #[serde(default = "default_joint_group")]
    pub joint_group: String,

    /// Name of the group rest frames are parented to.
    #[serde(default = "default_storage_group")]
    pub storage_group: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            locator_prefix: default_locator_prefix(),
            joint_prefix: default_joint_prefix(),
            rest_suffix: default_rest_suffix(),
            joint_group: default_joint_group(),
            storage_group: default_storage_group(),
        }
    }
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("naming.locator_prefix", &self.locator_prefix),
            ("naming.joint_prefix", &self.joint_prefix),
            ("naming.rest_suffix", &self.rest_suffix),
        ];
        for (field, value) in fields {
            if value.is_empty() || value.contains('_') {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("{value:?} must be non-empty and contain no '_'"),
                });
            }
        }
        if self.locator_prefix == self.joint_prefix {
            return Err(ConfigError::InvalidValue {
                field: "naming.joint_prefix".into(),
                message: "must differ from naming.locator_prefix".into(),
            });
        }
        Ok(())
    }

    /// Rest frame name for a joint name, e.g. `JNT_root_REST`.
    pub fn rest_name(&self, joint_name: &str) -> String {
        format!("{joint_name}_{}", self.rest_suffix)
    }
}

// ---------------------------------------------------------------------------
// AimConfig
// ---------------------------------------------------------------------------

/// A signed principal axis of a local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "-z")]
    NegZ,
}

impl Axis {
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
            Self::NegX => -Vector3::x(),
            Self::NegY => -Vector3::y(),
            Self::NegZ => -Vector3::z(),
        }
    }
}

/// Axes used by the aim solve.
///
/// The local `aim_axis` is pointed at the target; the local `up_axis` is
/// turned as close to `world_up` as the aim allows, or to `fallback_up`
/// when the aim is parallel to `world_up` (a vertical spine with a +Y up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimConfig {
    #[serde(default = "default_aim_axis")]
    pub aim_axis: Axis,

    #[serde(default = "default_up_axis")]
    pub up_axis: Axis,

    #[serde(default = "default_world_up")]
    pub world_up: [f64; 3],

    #[serde(default = "default_fallback_up")]
    pub fallback_up: [f64; 3],

    /// Lengths at or below this are treated as zero.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            aim_axis: default_aim_axis(),
            up_axis: default_up_axis(),
            world_up: default_world_up(),
            fallback_up: default_fallback_up(),
            epsilon: default_epsilon(),
        }
    }
}

impl AimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aim_axis.unit().dot(&self.up_axis.unit()) != 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "aim.up_axis".into(),
                message: "must be perpendicular to aim.aim_axis".into(),
            });
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "aim.epsilon".into(),
                message: format!("{} (must be > 0)", self.epsilon),
            });
        }
        for (field, up) in [("aim.world_up", self.world_up), ("aim.fallback_up", self.fallback_up)] {
            if Vector3::from(up).norm() <= self.epsilon {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: "must be a non-zero vector".into(),
                });
            }
        }
        let world_up = Vector3::from(self.world_up);
        if world_up.cross(&Vector3::from(self.fallback_up)).norm() <= self.epsilon {
            return Err(ConfigError::InvalidValue {
                field: "aim.fallback_up".into(),
                message: "must not be parallel to aim.world_up".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RigConfig::default();
        assert_eq!(config.spine_count, 4);
        assert_eq!(config.finger_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn counts_outside_range_are_rejected() {
        assert!(matches!(
            RigConfig::with_counts(0, 5).validate(),
            Err(ConfigError::InvalidSpineCount(0))
        ));
        assert!(matches!(
            RigConfig::with_counts(4, 12).validate(),
            Err(ConfigError::InvalidFingerCount(12))
        ));
        assert!(RigConfig::with_counts(11, 1).validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = RigConfig::from_toml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
    }

    #[test]
    fn toml_overrides_sections() {
        let config = RigConfig::from_toml_str(
            r#"
            spine_count = 6
            finger_count = 3

            [naming]
            joint_prefix = "BONE"

            [aim]
            aim_axis = "y"
            up_axis = "-z"
            "#,
        )
        .unwrap();
        assert_eq!(config.spine_count, 6);
        assert_eq!(config.finger_count, 3);
        assert_eq!(config.naming.joint_prefix, "BONE");
        assert_eq!(config.naming.locator_prefix, "LOC");
        assert_eq!(config.aim.aim_axis, Axis::Y);
        assert_eq!(config.aim.up_axis, Axis::NegZ);
    }

    #[test]
    fn toml_with_invalid_count_fails_validation() {
        let err = RigConfig::from_toml_str("spine_count = 40").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpineCount(40)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = RigConfig::from_toml_str("spine_count = \"four\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RigConfig::from_file("/nonexistent/rig.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn prefixes_must_be_distinct_and_underscore_free() {
        let mut naming = NamingConfig::default();
        naming.joint_prefix = "LOC".into();
        assert!(naming.validate().is_err());

        let mut naming = NamingConfig::default();
        naming.locator_prefix = "MY_LOC".into();
        assert!(naming.validate().is_err());
    }

    #[test]
    fn rest_name_appends_suffix() {
        let naming = NamingConfig::default();
        assert_eq!(naming.rest_name("JNT_spine_0"), "JNT_spine_0_REST");
    }

    #[test]
    fn aim_axes_must_be_perpendicular() {
        let aim = AimConfig {
            up_axis: Axis::NegX,
            ..AimConfig::default()
        };
        assert!(aim.validate().is_err());
    }

    #[test]
    fn parallel_up_vectors_are_rejected() {
        let aim = AimConfig {
            fallback_up: [0.0, -2.0, 0.0],
            ..AimConfig::default()
        };
        assert!(aim.validate().is_err());
    }

    #[test]
    fn axis_units() {
        assert_eq!(Axis::NegY.unit(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(Axis::Z.unit(), Vector3::new(0.0, 0.0, 1.0));
    }
}
