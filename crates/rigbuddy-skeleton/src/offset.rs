//! Offset-parent matrix composition.
//!
//! A joint's offset is its rest frame's world matrix expressed relative to
//! a reference frame: `inverse(reference) * rest.world`. With the joint's
//! parent sitting exactly on the reference, the joint lands on its rest
//! frame while its own channels stay at identity.

use bevy::prelude::*;

use rigbuddy_core::error::FrameError;
use rigbuddy_core::math::Mat4;

use crate::components::{
    InverseMode, JointHandle, OffsetBinding, OffsetParentMatrix, Reference, RestFrame,
    RestFrameHandle,
};
use crate::scene::RigScene;

/// Builds and refreshes joint offsets.
pub struct OffsetComposer;

impl OffsetComposer {
    /// `inverse(reference) * child.world`, or `None` if the reference is
    /// singular. A missing reference is the identity world root.
    pub fn compose(child: &RestFrame, reference: Option<&RestFrame>, mode: InverseMode) -> Option<Mat4> {
        let Some(reference) = reference else {
            return Some(child.world);
        };
        let matrix = match mode {
            InverseMode::WorldInverse => reference.world,
            InverseMode::ParentInverse => reference.offset_parent,
        };
        matrix.try_inverse().map(|inverse| inverse * child.world)
    }

    /// Attach `binding` to `joint` and write its offset.
    pub fn bind(scene: &mut RigScene, joint: JointHandle, binding: OffsetBinding) -> Result<Mat4, FrameError> {
        let offset = Self::evaluate(scene, &binding)?;
        scene
            .world_mut()
            .entity_mut(joint.0)
            .insert((binding, OffsetParentMatrix(offset)));
        Ok(offset)
    }

    /// Re-evaluate `joint`'s stored binding.
    pub fn recompose(scene: &mut RigScene, joint: JointHandle) -> Result<Mat4, FrameError> {
        let binding = scene
            .world()
            .get::<OffsetBinding>(joint.0)
            .copied()
            .ok_or_else(|| FrameError::MissingNode(joint_label(scene, joint)))?;
        Self::bind(scene, joint, binding)
    }

    /// Recompose every joint whose offset reads `rest`, either as its own
    /// frame or as its reference. Returns how many were touched.
    pub fn recompose_dependents(scene: &mut RigScene, rest: RestFrameHandle) -> Result<usize, FrameError> {
        let dependents: Vec<JointHandle> = scene
            .world_mut()
            .query::<(Entity, &OffsetBinding)>()
            .iter(scene.world())
            .filter(|(_, binding)| {
                binding.rest == rest || binding.reference == Reference::RestFrame(rest)
            })
            .map(|(entity, _)| JointHandle(entity))
            .collect();
        for &joint in &dependents {
            Self::recompose(scene, joint)?;
        }
        Ok(dependents.len())
    }

    fn evaluate(scene: &RigScene, binding: &OffsetBinding) -> Result<Mat4, FrameError> {
        let child = rest_frame(scene, binding.rest)?;
        let reference = match binding.reference {
            Reference::World => None,
            Reference::RestFrame(reference) => Some(rest_frame(scene, reference)?),
        };
        Self::compose(child, reference, binding.mode).ok_or_else(|| {
            let singular = match binding.reference {
                Reference::RestFrame(reference) => reference,
                Reference::World => binding.rest,
            };
            FrameError::Singular(rest_label(scene, singular))
        })
    }
}

fn rest_frame(scene: &RigScene, rest: RestFrameHandle) -> Result<&RestFrame, FrameError> {
    scene
        .rest_frame(rest)
        .ok_or_else(|| FrameError::MissingNode(rest_label(scene, rest)))
}

fn rest_label(scene: &RigScene, rest: RestFrameHandle) -> String {
    scene
        .rest_frame_name(rest)
        .map_or_else(|| format!("{:?}", rest.0), str::to_owned)
}

fn joint_label(scene: &RigScene, joint: JointHandle) -> String {
    scene
        .joint_name(joint)
        .map_or_else(|| format!("{:?}", joint.0), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{JointHandle, RestState};
    use approx::assert_relative_eq;
    use rigbuddy_core::math::{self, Vec3};

    fn frame(world: Mat4) -> RestFrame {
        RestFrame {
            owner: JointHandle(Entity::PLACEHOLDER),
            source: world,
            offset_parent: world,
            world,
            state: RestState::Open,
        }
    }

    #[test]
    fn world_root_offset_is_the_rest_world() {
        let child = frame(math::from_translation(Vec3::new(0.0, 2.75, 0.0)));
        let offset = OffsetComposer::compose(&child, None, InverseMode::WorldInverse).unwrap();
        assert_eq!(offset, child.world);
    }

    #[test]
    fn offset_is_child_relative_to_reference() {
        let parent = frame(math::from_translation_euler_degrees(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
        ));
        let child = frame(math::from_translation(Vec3::new(0.0, 3.25, 0.0)));

        for mode in [InverseMode::WorldInverse, InverseMode::ParentInverse] {
            let offset = OffsetComposer::compose(&child, Some(&parent), mode).unwrap();
            // Parent rotated +90 about Z: world +Y is local +X.
            assert_relative_eq!(math::translation(&offset), Vec3::new(0.25, 0.0, 0.0), epsilon = 1e-12);
            assert_relative_eq!(parent.world * offset, child.world, epsilon = 1e-12);
        }
    }

    #[test]
    fn parent_inverse_reads_the_parent_relative_matrix() {
        let mut parent = frame(math::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        // Storage group lifted by one unit.
        parent.world = math::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let child = frame(math::from_translation(Vec3::new(0.0, 3.0, 0.0)));

        let world = OffsetComposer::compose(&child, Some(&parent), InverseMode::WorldInverse).unwrap();
        let parent_space = OffsetComposer::compose(&child, Some(&parent), InverseMode::ParentInverse).unwrap();
        assert_relative_eq!(math::translation(&world), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(math::translation(&parent_space), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn singular_reference_is_rejected() {
        let mut flat = Mat4::identity();
        flat[(1, 1)] = 0.0;
        let parent = frame(flat);
        let child = frame(Mat4::identity());
        assert!(OffsetComposer::compose(&child, Some(&parent), InverseMode::ParentInverse).is_none());
    }
}
