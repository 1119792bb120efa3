//! Rest-frame creation and close-out.
//!
//! Every joint owns one rest frame under the rest storage group. A frame is
//! created as a pass-through copy of its locator and stays [`RestState::Open`]
//! until the link after it is known; closing it out writes the aimed matrix
//! once and recomposes every offset that depends on it.

use bevy::prelude::*;
use tracing::debug;

use rigbuddy_core::config::NamingConfig;
use rigbuddy_core::error::FrameError;
use rigbuddy_core::math::Mat4;

use crate::components::{FrameName, HasRestFrame, JointHandle, RestFrame, RestFrameHandle, RestState};
use crate::offset::OffsetComposer;
use crate::scene::RigScene;

/// Whether a close-out request changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOut {
    /// The aim was written and dependent offsets recomposed.
    Applied { recomposed: usize },
    /// The frame was already closed and was left alone.
    AlreadyClosed,
}

/// Rest-frame operations over a scene.
pub struct RestFrameNetwork<'s> {
    scene: &'s mut RigScene,
    storage: Entity,
    created: usize,
}

impl<'s> RestFrameNetwork<'s> {
    /// Borrow the network, creating the storage group if needed.
    pub fn new(scene: &'s mut RigScene, naming: &NamingConfig) -> Self {
        let storage = scene.ensure_rest_storage(&naming.storage_group);
        Self {
            scene,
            storage,
            created: 0,
        }
    }

    pub fn scene(&mut self) -> &mut RigScene {
        &mut *self.scene
    }

    /// Create `owner`'s rest frame as a copy of the locator transform.
    pub fn create(&mut self, owner: JointHandle, name: String, source: &Mat4) -> RestFrameHandle {
        let world = self.scene.storage_world(self.storage) * source;
        let entity = self
            .scene
            .world_mut()
            .spawn((
                RestFrame {
                    owner,
                    source: *source,
                    offset_parent: *source,
                    world,
                    state: RestState::Open,
                },
                FrameName(name),
                ChildOf(self.storage),
            ))
            .id();
        let rest = RestFrameHandle(entity);
        self.scene
            .world_mut()
            .entity_mut(owner.0)
            .insert(HasRestFrame(rest));
        self.created += 1;
        rest
    }

    /// Rest frames this network has created.
    pub const fn created(&self) -> usize {
        self.created
    }

    pub fn get(&self, rest: RestFrameHandle) -> Result<&RestFrame, FrameError> {
        self.scene
            .rest_frame(rest)
            .ok_or_else(|| FrameError::MissingNode(format!("{:?}", rest.0)))
    }

    pub fn is_open(&self, rest: RestFrameHandle) -> Result<bool, FrameError> {
        Ok(self.get(rest)?.state == RestState::Open)
    }

    /// Write `aimed` into an open frame, mark it closed and recompose every
    /// joint offset that reads it.
    pub fn close_out(&mut self, rest: RestFrameHandle, aimed: &Mat4) -> Result<CloseOut, FrameError> {
        if !self.is_open(rest)? {
            return Ok(CloseOut::AlreadyClosed);
        }
        let world = self.scene.storage_world(self.storage) * aimed;
        let Some(mut frame) = self.scene.world_mut().get_mut::<RestFrame>(rest.0) else {
            return Err(FrameError::MissingNode(format!("{:?}", rest.0)));
        };
        frame.offset_parent = *aimed;
        frame.world = world;
        frame.state = RestState::Closed;

        let recomposed = OffsetComposer::recompose_dependents(self.scene, rest)?;
        debug!(
            rest = self.scene.rest_frame_name(rest).unwrap_or_default(),
            recomposed, "closed out rest frame"
        );
        Ok(CloseOut::Applied { recomposed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{InverseMode, Joint, OffsetBinding, Reference};
    use approx::assert_relative_eq;
    use rigbuddy_core::math::{self, Vec3};
    use rigbuddy_core::types::{ChainId, RigName};

    fn spawn(scene: &mut RigScene, name: &str, parent: Option<JointHandle>) -> JointHandle {
        scene.spawn_joint(
            name.into(),
            Joint {
                chain: ChainId::Spine,
                link: 0,
                stem: RigName::root(),
            },
            parent,
        )
    }

    #[test]
    fn created_frame_is_an_open_pass_through() {
        let mut scene = RigScene::new();
        let naming = NamingConfig::default();
        let joint = spawn(&mut scene, "JNT_root", None);
        let source = math::from_translation(Vec3::new(0.0, 2.5, 0.0));

        let mut network = RestFrameNetwork::new(&mut scene, &naming);
        let rest = network.create(joint, "JNT_root_REST".into(), &source);
        let frame = *network.get(rest).unwrap();
        assert_eq!(frame.world, source);
        assert_eq!(frame.offset_parent, source);
        assert_eq!(frame.owner, joint);
        assert_eq!(frame.state, RestState::Open);

        assert_eq!(scene.rest_frame_of(joint), Some(rest));
        assert_eq!(scene.rest_frame_name(rest), Some("JNT_root_REST"));
        assert_eq!(scene.rest_frame_count(), 1);
    }

    #[test]
    fn close_out_happens_once() {
        let mut scene = RigScene::new();
        let naming = NamingConfig::default();
        let joint = spawn(&mut scene, "JNT_root", None);
        let source = math::from_translation(Vec3::new(0.0, 2.5, 0.0));
        let aimed = math::from_translation_euler_degrees(
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
        );

        let mut network = RestFrameNetwork::new(&mut scene, &naming);
        let rest = network.create(joint, "JNT_root_REST".into(), &source);
        assert!(matches!(
            network.close_out(rest, &aimed).unwrap(),
            CloseOut::Applied { recomposed: 0 }
        ));
        assert_eq!(
            network.close_out(rest, &source).unwrap(),
            CloseOut::AlreadyClosed
        );
        let frame = network.get(rest).unwrap();
        assert_eq!(frame.world, aimed);
        assert_eq!(frame.source, source);
        assert_eq!(frame.state, RestState::Closed);
    }

    #[test]
    fn close_out_recomposes_bound_offsets() {
        let mut scene = RigScene::new();
        let naming = NamingConfig::default();
        let root = spawn(&mut scene, "JNT_root", None);
        let child = spawn(&mut scene, "JNT_spine_0", Some(root));
        let root_source = math::from_translation(Vec3::new(0.0, 2.5, 0.0));
        let child_source = math::from_translation(Vec3::new(0.0, 3.0, 0.0));

        let mut network = RestFrameNetwork::new(&mut scene, &naming);
        let root_rest = network.create(root, "JNT_root_REST".into(), &root_source);
        let child_rest = network.create(child, "JNT_spine_0_REST".into(), &child_source);
        assert_eq!(network.created(), 2);
        OffsetComposer::bind(
            network.scene(),
            root,
            OffsetBinding {
                rest: root_rest,
                reference: Reference::World,
                mode: InverseMode::WorldInverse,
            },
        )
        .unwrap();
        OffsetComposer::bind(
            network.scene(),
            child,
            OffsetBinding {
                rest: child_rest,
                reference: Reference::RestFrame(root_rest),
                mode: InverseMode::ParentInverse,
            },
        )
        .unwrap();

        let aimed = math::from_translation_euler_degrees(
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
        );
        assert_eq!(
            network.close_out(root_rest, &aimed).unwrap(),
            CloseOut::Applied { recomposed: 2 }
        );

        assert_eq!(scene.offset_parent_matrix(root), Some(aimed));
        let child_world = scene.world_matrix("JNT_spine_0").unwrap();
        assert_relative_eq!(
            math::translation(&child_world),
            Vec3::new(0.0, 3.0, 0.0),
            epsilon = 1e-12
        );
    }
}
