//! Locator sets and scenes used across test suites.

use rigbuddy_core::config::RigConfig;
use rigbuddy_locators::{BipedLayout, Locator, LocatorSet};
use rigbuddy_skeleton::report::BuildReport;
use rigbuddy_skeleton::{HierarchyBuilder, RigScene};
use rigbuddy_core::types::RigName;

/// Config whose spine chain is `LOC_root` plus `LOC_spine_0..2`.
pub fn spine_scenario_config() -> RigConfig {
    RigConfig::with_counts(3, 1)
}

/// Four vertical spine locators: root at 2.75, then 3.0, 3.25 and 3.5.
pub fn spine_scenario() -> LocatorSet {
    let mut set = LocatorSet::new();
    set.insert(Locator::at(RigName::root(), 0.0, 2.75, 0.0));
    for (i, y) in [(0, 3.0), (1, 3.25), (2, 3.5)] {
        set.insert(Locator::at(RigName::spine(i), 0.0, y, 0.0));
    }
    set
}

/// The default biped layout for `config`.
pub fn biped_locators(config: &RigConfig) -> LocatorSet {
    BipedLayout::from_config(config).locators()
}

/// Build `locators` into a fresh scene.
///
/// # Panics
///
/// Panics if `config` is invalid or the scene was already built.
pub fn built_scene(config: &RigConfig, locators: &LocatorSet) -> (RigScene, BuildReport) {
    let builder = HierarchyBuilder::new(config).expect("valid test config");
    let mut scene = RigScene::new();
    let report = builder
        .create_joints(&mut scene, locators)
        .report()
        .cloned()
        .expect("fresh scene is never already built");
    (scene, report)
}
