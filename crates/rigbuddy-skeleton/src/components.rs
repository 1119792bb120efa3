//! ECS components for joints and rest frames.
//!
//! Joints and rest frames are plain entities. Joint-to-joint parenting and
//! rest-frame storage use bevy's [`ChildOf`] relationship; every other link
//! between entities goes through the typed handles below.

use bevy::prelude::*;

use rigbuddy_core::math::{Mat4, Vec3};
use rigbuddy_core::types::{ChainId, RigName};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Handle to a joint entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub Entity);

/// Handle to a rest-frame entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestFrameHandle(pub Entity);

// ---------------------------------------------------------------------------
// Joint components
// ---------------------------------------------------------------------------

/// Boundary name of a joint, e.g. `JNT_spine_0`.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct JointName(pub String);

/// Boundary name of a non-joint node (rest frames and groups).
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct FrameName(pub String);

/// Where a joint sits in the anatomy.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Joint {
    pub chain: ChainId,
    /// Link index within `chain`.
    pub link: usize,
    /// Name stem shared with the locator the joint was built from.
    pub stem: RigName,
}

/// Translate, rotate and scale channels of a joint.
///
/// The builder never writes these; they stay at identity and the joint's
/// placement lives entirely in its [`OffsetParentMatrix`].
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    /// XYZ euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl LocalTransform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn matrix(&self) -> Mat4 {
        rigbuddy_core::math::from_translation_euler_degrees(self.translation, self.rotation)
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Parent-relative transform applied ahead of [`LocalTransform`].
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct OffsetParentMatrix(pub Mat4);

impl Default for OffsetParentMatrix {
    fn default() -> Self {
        Self(Mat4::identity())
    }
}

/// Frame whose inverse is composed into an offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    /// The untouched global root; its matrix is the identity.
    World,
    RestFrame(RestFrameHandle),
}

/// Which inverse of the reference frame to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InverseMode {
    /// Inverse of the reference's world matrix. Only the unparented root.
    WorldInverse,
    /// Inverse of the reference's matrix relative to its own parent.
    ParentInverse,
}

/// Inputs that produced a joint's [`OffsetParentMatrix`], kept so the
/// offset can be recomposed when a rest frame is closed out.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetBinding {
    /// The joint's own rest frame.
    pub rest: RestFrameHandle,
    pub reference: Reference,
    pub mode: InverseMode,
}

/// A joint's rest frame.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HasRestFrame(pub RestFrameHandle);

// ---------------------------------------------------------------------------
// Rest frame components
// ---------------------------------------------------------------------------

/// Whether a rest frame still waits for its aim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestState {
    /// Pass-through copy of the locator.
    Open,
    /// Aim applied. Never written again.
    Closed,
}

/// Auxiliary node holding a joint's real world orientation and position.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RestFrame {
    pub owner: JointHandle,
    /// World matrix of the locator this frame was created from.
    pub source: Mat4,
    /// Transform relative to the rest storage group.
    pub offset_parent: Mat4,
    /// `storage_world * offset_parent`.
    pub world: Mat4,
    pub state: RestState,
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Marks the joint group. Its presence means the rig is built.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct JointGroup;

/// Marks the group rest frames are parented to.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct RestStorage;
