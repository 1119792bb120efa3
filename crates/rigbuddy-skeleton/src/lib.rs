//! Rig assembly: turns ordered locator chains into a joint hierarchy whose
//! joints keep identity local transforms.
//!
//! Each joint gets a rest frame holding its real world placement. Rest
//! frames are aimed at the next link once it is known, and every joint's
//! offset-parent matrix is its rest frame expressed relative to the rest
//! frame it hangs from.
//!
//! ```no_run
//! use rigbuddy_core::config::RigConfig;
//! use rigbuddy_locators::BipedLayout;
//! use rigbuddy_skeleton::{create_joints, RigScene};
//!
//! let config = RigConfig::default();
//! let locators = BipedLayout::from_config(&config).locators();
//! let mut scene = RigScene::new();
//! create_joints(&mut scene, &config, &locators)?;
//! for record in scene.records() {
//!     println!("{} <- {:?}", record.name, record.parent);
//! }
//! # Ok::<(), rigbuddy_core::error::ConfigError>(())
//! ```

pub mod aim;
pub mod builder;
pub mod components;
pub mod offset;
pub mod registry;
pub mod report;
pub mod rest;
pub mod scene;
pub mod walker;

pub use builder::{create_joints, delete_joints, HierarchyBuilder};
pub use scene::{JointRecord, RigScene, Teardown};

pub mod prelude {
    pub use crate::aim::{AimOutcome, AimSolver};
    pub use crate::builder::{create_joints, delete_joints, HierarchyBuilder};
    pub use crate::components::{
        FrameName, HasRestFrame, InverseMode, Joint, JointGroup, JointHandle, JointName,
        LocalTransform, OffsetBinding, OffsetParentMatrix, Reference, RestFrame,
        RestFrameHandle, RestState, RestStorage,
    };
    pub use crate::offset::OffsetComposer;
    pub use crate::registry::{AttachRule, ChainRegistry, ChainSpec};
    pub use crate::report::{BuildOutcome, BuildReport, BuildWarning};
    pub use crate::rest::{CloseOut, RestFrameNetwork};
    pub use crate::scene::{JointIndex, JointRecord, RigScene, Teardown};
    pub use crate::walker::{Attachment, ChainSummary, ChainWalker, LinkRole, walk_chain};
}
