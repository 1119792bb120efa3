//! The build context: a bevy [`World`] holding joints, rest frames and the
//! two group nodes, plus the name index used at the output boundary.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::Serialize;

use rigbuddy_core::config::RigConfig;
use rigbuddy_core::math::Mat4;
use rigbuddy_core::types::ChainId;

use crate::components::{
    FrameName, HasRestFrame, Joint, JointGroup, JointHandle, JointName, LocalTransform,
    OffsetParentMatrix, RestFrame, RestFrameHandle, RestStorage,
};

// ---------------------------------------------------------------------------
// JointIndex
// ---------------------------------------------------------------------------

/// Name and chain lookup for joints, in creation order.
#[derive(Resource, Debug, Default)]
pub struct JointIndex {
    joints: Vec<JointHandle>,
    by_name: HashMap<String, JointHandle>,
    chains: HashMap<ChainId, Vec<JointHandle>>,
}

impl JointIndex {
    pub fn get(&self, name: &str) -> Option<JointHandle> {
        self.by_name.get(name).copied()
    }

    /// Joints of `chain` in link order. Empty if the chain was not built.
    pub fn chain(&self, chain: ChainId) -> &[JointHandle] {
        self.chains.get(&chain).map_or(&[], Vec::as_slice)
    }

    pub fn joints(&self) -> &[JointHandle] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    fn insert(&mut self, name: String, chain: ChainId, handle: JointHandle) {
        self.joints.push(handle);
        self.by_name.insert(name, handle);
        self.chains.entry(chain).or_default().push(handle);
    }
}

// ---------------------------------------------------------------------------
// JointRecord
// ---------------------------------------------------------------------------

/// A joint as seen from outside the builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointRecord {
    pub name: String,
    pub parent: Option<String>,
    pub offset_parent_matrix: Mat4,
}

/// What a teardown removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Teardown {
    pub joints: usize,
    pub rest_frames: usize,
    pub groups: usize,
}

impl Teardown {
    pub const fn total(&self) -> usize {
        self.joints + self.rest_frames + self.groups
    }
}

// ---------------------------------------------------------------------------
// RigScene
// ---------------------------------------------------------------------------

/// Owns every node the builder creates.
pub struct RigScene {
    world: World,
}

impl Default for RigScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RigScene {
    pub fn new() -> Self {
        let mut world = World::new();
        world.init_resource::<JointIndex>();
        Self { world }
    }

    pub const fn world(&self) -> &World {
        &self.world
    }

    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn index(&self) -> &JointIndex {
        self.world.resource::<JointIndex>()
    }

    // -- groups -------------------------------------------------------------

    /// The joint group, if the rig has been built.
    pub fn joint_group(&mut self) -> Option<Entity> {
        self.world
            .query_filtered::<Entity, With<JointGroup>>()
            .iter(&self.world)
            .next()
    }

    pub fn is_built(&mut self) -> bool {
        self.joint_group().is_some()
    }

    /// Configuration the current rig was built with.
    pub fn build_config(&self) -> Option<&RigConfig> {
        self.world.get_resource::<RigConfig>()
    }

    pub(crate) fn spawn_joint_group(&mut self, name: &str) -> Entity {
        self.world
            .spawn((JointGroup, FrameName(name.to_owned())))
            .id()
    }

    /// The rest storage group, if present.
    pub fn rest_storage(&mut self) -> Option<Entity> {
        self.world
            .query_filtered::<Entity, With<RestStorage>>()
            .iter(&self.world)
            .next()
    }

    /// The rest storage group, created at the origin if missing.
    pub(crate) fn ensure_rest_storage(&mut self, name: &str) -> Entity {
        match self.rest_storage() {
            Some(storage) => storage,
            None => self
                .world
                .spawn((
                    RestStorage,
                    FrameName(name.to_owned()),
                    OffsetParentMatrix::default(),
                ))
                .id(),
        }
    }

    /// World matrix of the rest storage group.
    pub fn storage_world(&self, storage: Entity) -> Mat4 {
        self.world
            .get::<OffsetParentMatrix>(storage)
            .map_or_else(Mat4::identity, |opm| opm.0)
    }

    // -- joints -------------------------------------------------------------

    /// Spawn a joint with identity local channels and register its name.
    pub(crate) fn spawn_joint(
        &mut self,
        name: String,
        joint: Joint,
        parent: Option<JointHandle>,
    ) -> JointHandle {
        let mut entity = self.world.spawn((
            JointName(name.clone()),
            joint,
            LocalTransform::default(),
            OffsetParentMatrix::default(),
        ));
        if let Some(parent) = parent {
            entity.insert(ChildOf(parent.0));
        }
        let handle = JointHandle(entity.id());
        self.world
            .resource_mut::<JointIndex>()
            .insert(name, joint.chain, handle);
        handle
    }

    pub fn joint(&self, name: &str) -> Option<JointHandle> {
        self.index().get(name)
    }

    pub fn joint_count(&self) -> usize {
        self.index().len()
    }

    pub fn joint_name(&self, joint: JointHandle) -> Option<&str> {
        self.world
            .get::<JointName>(joint.0)
            .map(|name| name.0.as_str())
    }

    pub fn joint_info(&self, joint: JointHandle) -> Option<&Joint> {
        self.world.get::<Joint>(joint.0)
    }

    pub fn local_transform(&self, joint: JointHandle) -> Option<&LocalTransform> {
        self.world.get::<LocalTransform>(joint.0)
    }

    pub fn offset_parent_matrix(&self, joint: JointHandle) -> Option<Mat4> {
        self.world
            .get::<OffsetParentMatrix>(joint.0)
            .map(|opm| opm.0)
    }

    /// Parent joint, or `None` for a hierarchy root.
    pub fn parent(&self, joint: JointHandle) -> Option<JointHandle> {
        let parent = self.world.get::<ChildOf>(joint.0)?.parent();
        self.world
            .get::<Joint>(parent)
            .map(|_| JointHandle(parent))
    }

    pub fn rest_frame_of(&self, joint: JointHandle) -> Option<RestFrameHandle> {
        self.world.get::<HasRestFrame>(joint.0).map(|rest| rest.0)
    }

    // -- rest frames --------------------------------------------------------

    pub fn rest_frame(&self, rest: RestFrameHandle) -> Option<&RestFrame> {
        self.world.get::<RestFrame>(rest.0)
    }

    pub fn rest_frame_name(&self, rest: RestFrameHandle) -> Option<&str> {
        self.world
            .get::<FrameName>(rest.0)
            .map(|name| name.0.as_str())
    }

    pub fn rest_frame_count(&mut self) -> usize {
        self.world.query::<&RestFrame>().iter(&self.world).count()
    }

    // -- output boundary ----------------------------------------------------

    /// World matrix of a joint: offsets and local channels composed up the
    /// parent chain.
    pub fn joint_world_matrix(&self, joint: JointHandle) -> Option<Mat4> {
        let mut world = self.joint_parent_relative(joint)?;
        let mut current = joint;
        while let Some(parent) = self.parent(current) {
            world = self.joint_parent_relative(parent)? * world;
            current = parent;
        }
        Some(world)
    }

    /// World matrix of the joint called `name`.
    pub fn world_matrix(&self, name: &str) -> Option<Mat4> {
        self.joint_world_matrix(self.joint(name)?)
    }

    fn joint_parent_relative(&self, joint: JointHandle) -> Option<Mat4> {
        let offset = self.offset_parent_matrix(joint)?;
        let local = self.local_transform(joint)?;
        Some(offset * local.matrix())
    }

    fn joint_record(&self, joint: JointHandle) -> Option<JointRecord> {
        Some(JointRecord {
            name: self.joint_name(joint)?.to_owned(),
            parent: self
                .parent(joint)
                .and_then(|parent| self.joint_name(parent))
                .map(str::to_owned),
            offset_parent_matrix: self.offset_parent_matrix(joint)?,
        })
    }

    /// Every joint, in creation order.
    pub fn records(&self) -> Vec<JointRecord> {
        self.index()
            .joints()
            .iter()
            .filter_map(|&joint| self.joint_record(joint))
            .collect()
    }

    pub fn record(&self, name: &str) -> Option<JointRecord> {
        self.joint_record(self.joint(name)?)
    }

    // -- teardown -----------------------------------------------------------

    /// Remove joints, rest frames and the joint group. The rest storage
    /// group stays.
    pub fn remove_joints(&mut self) -> Teardown {
        let rest_frames: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<RestFrame>>()
            .iter(&self.world)
            .collect();
        let joints: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Joint>>()
            .iter(&self.world)
            .collect();
        let groups: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<JointGroup>>()
            .iter(&self.world)
            .collect();

        let teardown = Teardown {
            joints: joints.len(),
            rest_frames: rest_frames.len(),
            groups: groups.len(),
        };
        for entity in rest_frames.into_iter().chain(joints).chain(groups) {
            self.despawn(entity);
        }
        self.world.insert_resource(JointIndex::default());
        self.world.remove_resource::<RigConfig>();
        teardown
    }

    /// Remove everything the builder ever created, including rest storage.
    pub fn clear(&mut self) -> Teardown {
        let mut teardown = self.remove_joints();
        let storage: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<RestStorage>>()
            .iter(&self.world)
            .collect();
        teardown.groups += storage.len();
        for entity in storage {
            self.despawn(entity);
        }
        teardown
    }

    /// Despawn an entity that a linked parent may already have taken down.
    fn despawn(&mut self, entity: Entity) {
        if let Ok(entity) = self.world.get_entity_mut(entity) {
            entity.despawn();
        }
    }
}
