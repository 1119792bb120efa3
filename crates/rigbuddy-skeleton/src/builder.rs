//! Whole-rig build and teardown.

use tracing::{info, warn};

use rigbuddy_core::config::RigConfig;
use rigbuddy_core::error::ConfigError;
use rigbuddy_locators::LocatorSet;

use crate::aim::AimSolver;
use crate::registry::ChainRegistry;
use crate::report::{BuildOutcome, BuildReport};
use crate::scene::{RigScene, Teardown};
use crate::walker::walk_chain;

/// Walks every registered chain in order.
///
/// Everything that can make the whole build invalid is checked in
/// [`HierarchyBuilder::new`]; once constructed, a build only ever fails
/// chain by chain.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    config: RigConfig,
    registry: ChainRegistry,
    solver: AimSolver,
}

impl HierarchyBuilder {
    pub fn new(config: &RigConfig) -> Result<Self, ConfigError> {
        let registry = ChainRegistry::new(config)?;
        Self::with_registry(config, registry)
    }

    /// Builder over a custom chain table.
    pub fn with_registry(config: &RigConfig, registry: ChainRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            solver: AimSolver::new(&config.aim),
            registry,
        })
    }

    pub const fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub const fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Build the rig into `scene` unless its joint group already exists.
    pub fn create_joints(&self, scene: &mut RigScene, locators: &LocatorSet) -> BuildOutcome {
        let naming = &self.config.naming;
        if scene.is_built() {
            info!(group = %naming.joint_group, "joint group already exists, nothing to build");
            return BuildOutcome::AlreadyBuilt;
        }

        info!(
            chains = self.registry.len(),
            locators = locators.len(),
            "building joints"
        );
        scene.spawn_joint_group(&naming.joint_group);
        scene.world_mut().insert_resource(self.config.clone());

        let mut report = BuildReport::default();
        for spec in self.registry.iter() {
            match walk_chain(scene, spec, locators, self.solver, naming) {
                Ok(summary) => {
                    report.joints_created += summary.joints.len();
                    report.rest_frames_created += summary.rest_frames;
                    report.chains_built.push(summary.chain);
                    report.warnings.extend(summary.warnings);
                }
                Err(err) => {
                    warn!(chain = %spec.id, %err, "chain skipped");
                    report.failures.push(err);
                }
            }
        }

        info!(
            joints = report.joints_created,
            chains = report.chains_built.len(),
            failures = report.failures.len(),
            warnings = report.warnings.len(),
            "joints built"
        );
        BuildOutcome::Built(report)
    }

    /// Remove every joint, rest frame and the joint group.
    pub fn delete_joints(&self, scene: &mut RigScene) -> Teardown {
        delete_joints(scene)
    }
}

/// Validate `config` and build the rig into `scene`.
pub fn create_joints(
    scene: &mut RigScene,
    config: &RigConfig,
    locators: &LocatorSet,
) -> Result<BuildOutcome, ConfigError> {
    Ok(HierarchyBuilder::new(config)?.create_joints(scene, locators))
}

/// Remove every joint, rest frame and the joint group.
pub fn delete_joints(scene: &mut RigScene) -> Teardown {
    let teardown = scene.remove_joints();
    info!(
        joints = teardown.joints,
        rest_frames = teardown.rest_frames,
        "deleted joints"
    );
    teardown
}
