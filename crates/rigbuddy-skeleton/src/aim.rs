//! Two-vector aim solve.

use nalgebra::Matrix3;

use rigbuddy_core::config::AimConfig;
use rigbuddy_core::math::{self, Mat4, Vec3};

/// Result of an aim solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutcome {
    Aimed(Mat4),
    /// No usable direction. Carries the input transform unchanged.
    Degenerate(Mat4),
}

impl AimOutcome {
    pub const fn matrix(&self) -> &Mat4 {
        match self {
            Self::Aimed(m) | Self::Degenerate(m) => m,
        }
    }

    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}

/// Points a local axis of a transform at a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolver {
    aim_axis: Vec3,
    up_axis: Vec3,
    world_up: Vec3,
    fallback_up: Vec3,
    epsilon: f64,
}

impl Default for AimSolver {
    fn default() -> Self {
        Self::new(&AimConfig::default())
    }
}

impl AimSolver {
    pub fn new(config: &AimConfig) -> Self {
        Self {
            aim_axis: config.aim_axis.unit(),
            up_axis: config.up_axis.unit(),
            world_up: Vec3::from(config.world_up),
            fallback_up: Vec3::from(config.fallback_up),
            epsilon: config.epsilon,
        }
    }

    /// Re-aim `from` so its aim axis points at `to`'s origin.
    ///
    /// The up axis is turned toward the world up hint (or the fallback hint
    /// when the aim runs along it). Origin and per-axis scale of `from` are
    /// kept.
    pub fn solve(&self, from: &Mat4, to: &Mat4) -> AimOutcome {
        let origin = math::translation(from);
        let Some(rotation) = self.rotation_toward(math::translation(to) - origin) else {
            return AimOutcome::Degenerate(*from);
        };
        let scaled = rotation * Matrix3::from_diagonal(&math::axis_scales(from));
        AimOutcome::Aimed(math::compose(&scaled, origin))
    }

    /// Rotation taking the local aim/up basis onto the world aim/up basis.
    fn rotation_toward(&self, direction: Vec3) -> Option<Matrix3<f64>> {
        let aim = direction.try_normalize(self.epsilon)?;
        let side = [self.world_up, self.fallback_up]
            .into_iter()
            .find_map(|hint| aim.cross(&hint).try_normalize(self.epsilon))?;
        let up = side.cross(&aim);

        let world = Matrix3::from_columns(&[aim, up, aim.cross(&up)]);
        let local = Matrix3::from_columns(&[
            self.aim_axis,
            self.up_axis,
            self.aim_axis.cross(&self.up_axis),
        ]);
        Some(world * local.transpose())
    }
}
