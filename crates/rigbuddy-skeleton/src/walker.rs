//! Per-chain fold that turns ordered locators into joints.
//!
//! The walker carries one [`LinkRole`] forward. Each link creates its joint
//! and pass-through rest frame, closes out the rest frame it hangs from and
//! binds its offset against that frame. The chain head differs only in what
//! it hangs from: a foreign joint, or nothing at all for the hierarchy root.

use tracing::{debug, warn};

use rigbuddy_core::config::NamingConfig;
use rigbuddy_core::error::{ChainError, FrameError};
use rigbuddy_core::types::ChainId;
use rigbuddy_locators::{Locator, LocatorSet};

use crate::aim::AimSolver;
use crate::components::{
    InverseMode, Joint, JointHandle, OffsetBinding, Reference, RestFrameHandle,
};
use crate::offset::OffsetComposer;
use crate::registry::{AttachRule, ChainSpec};
use crate::report::BuildWarning;
use crate::rest::{CloseOut, RestFrameNetwork};
use crate::scene::RigScene;

/// What a chain head hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Nothing; the head becomes the hierarchy root.
    WorldRoot,
    Joint(JointHandle),
}

/// Role of the next link to be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    ChainHead(Attachment),
    /// Interior link hanging from the chain's previous joint.
    ChainLink(JointHandle),
}

impl LinkRole {
    fn anchor(self) -> Option<JointHandle> {
        match self {
            Self::ChainHead(Attachment::WorldRoot) => None,
            Self::ChainHead(Attachment::Joint(joint)) | Self::ChainLink(joint) => Some(joint),
        }
    }
}

/// Joints and warnings produced by one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSummary {
    pub chain: ChainId,
    pub joints: Vec<JointHandle>,
    pub rest_frames: usize,
    pub warnings: Vec<BuildWarning>,
}

/// Builds one chain link by link.
pub struct ChainWalker<'s> {
    network: RestFrameNetwork<'s>,
    spec: ChainSpec,
    solver: AimSolver,
    naming: &'s NamingConfig,
    role: LinkRole,
    next_link: usize,
    joints: Vec<JointHandle>,
    warnings: Vec<BuildWarning>,
}

impl<'s> ChainWalker<'s> {
    pub fn new(
        scene: &'s mut RigScene,
        spec: ChainSpec,
        attachment: Attachment,
        solver: AimSolver,
        naming: &'s NamingConfig,
    ) -> Self {
        Self {
            network: RestFrameNetwork::new(scene, naming),
            spec,
            solver,
            naming,
            role: LinkRole::ChainHead(attachment),
            next_link: 0,
            joints: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub const fn role(&self) -> LinkRole {
        self.role
    }

    pub const fn next_link(&self) -> usize {
        self.next_link
    }

    /// Build link `link` from `locator`.
    ///
    /// Links must arrive in index order; anything else is rejected before
    /// the scene is touched.
    pub fn advance(&mut self, link: usize, locator: &Locator) -> Result<JointHandle, ChainError> {
        let chain = self.spec.id;
        if link != self.next_link {
            return Err(ChainError::OutOfOrder {
                chain,
                expected: self.next_link,
                got: link,
            });
        }
        let name = locator.name.with_prefix(&self.naming.joint_prefix);
        if self.network.scene().joint(&name).is_some() {
            return Err(ChainError::DuplicateJoint { chain, name });
        }

        let parent = self.role.anchor();
        let anchor_rest = match parent {
            Some(parent) => Some(self.rest_of(parent)?),
            None => None,
        };

        let joint = self.network.scene().spawn_joint(
            name.clone(),
            Joint {
                chain,
                link,
                stem: locator.name,
            },
            parent,
        );
        let rest = self
            .network
            .create(joint, self.naming.rest_name(&name), &locator.world);

        if let Some(anchor_rest) = anchor_rest {
            self.close_out_anchor(anchor_rest, locator, &name)?;
        }

        let binding = match anchor_rest {
            Some(reference) => OffsetBinding {
                rest,
                reference: Reference::RestFrame(reference),
                mode: InverseMode::ParentInverse,
            },
            None => OffsetBinding {
                rest,
                reference: Reference::World,
                mode: InverseMode::WorldInverse,
            },
        };
        OffsetComposer::bind(self.network.scene(), joint, binding)
            .map_err(|err| err.in_chain(chain))?;

        debug!(%chain, link, joint = %name, "built link");
        self.role = LinkRole::ChainLink(joint);
        self.next_link += 1;
        self.joints.push(joint);
        Ok(joint)
    }

    pub fn finish(self) -> ChainSummary {
        ChainSummary {
            chain: self.spec.id,
            rest_frames: self.network.created(),
            joints: self.joints,
            warnings: self.warnings,
        }
    }

    /// Aim the anchor's rest frame at the new link, if it is still open.
    ///
    /// A zero-length edge is reported either way.
    fn close_out_anchor(
        &mut self,
        anchor: RestFrameHandle,
        locator: &Locator,
        joint_name: &str,
    ) -> Result<(), ChainError> {
        let chain = self.spec.id;
        let frame = *self.network.get(anchor).map_err(|err| err.in_chain(chain))?;
        let outcome = self.solver.solve(&frame.source, &locator.world);

        let from = self
            .network
            .scene()
            .joint_name(frame.owner)
            .unwrap_or_default()
            .to_owned();
        let close_out = self
            .network
            .close_out(anchor, outcome.matrix())
            .map_err(|err| err.in_chain(chain))?;
        if close_out == CloseOut::AlreadyClosed {
            debug!(%chain, attachment = %from, "attachment already aimed, left unchanged");
        }
        if outcome.is_degenerate() {
            warn!(%chain, from = %from, to = joint_name, "degenerate aim, orientation kept");
            self.warnings.push(BuildWarning::DegenerateAim {
                chain,
                from,
                to: joint_name.to_owned(),
            });
        }
        Ok(())
    }

    fn rest_of(&mut self, joint: JointHandle) -> Result<RestFrameHandle, ChainError> {
        let chain = self.spec.id;
        let scene = self.network.scene();
        scene.rest_frame_of(joint).ok_or_else(|| {
            let name = scene.joint_name(joint).unwrap_or_default();
            FrameError::MissingNode(format!("{name} rest frame")).in_chain(chain)
        })
    }
}

/// Find the joint a chain head hangs from.
pub fn resolve_attachment(scene: &RigScene, spec: &ChainSpec) -> Result<Attachment, ChainError> {
    match spec.attach {
        AttachRule::WorldRoot => Ok(Attachment::WorldRoot),
        AttachRule::Joint { chain, link } => {
            let joints = scene.index().chain(chain);
            link.resolve(joints.len())
                .map(|index| Attachment::Joint(joints[index]))
                .ok_or_else(|| ChainError::MissingAttachment {
                    chain: spec.id,
                    attachment: format!("{chain} link {link}"),
                })
        }
    }
}

/// Validate and build one chain.
///
/// Locators, the attachment, locator invertibility and joint-name
/// collisions are all checked before the first joint is created, so a
/// rejected chain leaves the scene untouched.
pub fn walk_chain(
    scene: &mut RigScene,
    spec: &ChainSpec,
    locators: &LocatorSet,
    solver: AimSolver,
    naming: &NamingConfig,
) -> Result<ChainSummary, ChainError> {
    let chain = spec.id;
    let links = locators
        .chain(&spec.pattern, spec.expected_len)
        .map_err(|missing| ChainError::MissingLocator {
            chain,
            locator: missing.with_prefix(&naming.locator_prefix),
        })?;
    let attachment = resolve_attachment(scene, spec)?;

    for locator in &links {
        if locator.world.try_inverse().is_none() {
            return Err(FrameError::Singular(locator.name.with_prefix(&naming.locator_prefix))
                .in_chain(chain));
        }
        let name = locator.name.with_prefix(&naming.joint_prefix);
        if scene.joint(&name).is_some() {
            return Err(ChainError::DuplicateJoint { chain, name });
        }
    }

    let mut walker = ChainWalker::new(scene, *spec, attachment, solver, naming);
    for (link, locator) in links.into_iter().enumerate() {
        walker.advance(link, locator)?;
    }
    Ok(walker.finish())
}
