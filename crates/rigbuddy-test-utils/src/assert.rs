//! World-space checks on built scenes.

use approx::relative_eq;

use rigbuddy_core::config::NamingConfig;
use rigbuddy_core::math::{self, Mat4};
use rigbuddy_locators::LocatorSet;
use rigbuddy_skeleton::RigScene;

/// Assert every locator has a joint whose composed world position matches
/// it within `epsilon`.
///
/// # Panics
///
/// Panics on the first missing or misplaced joint.
pub fn assert_joints_on_locators(
    scene: &RigScene,
    locators: &LocatorSet,
    naming: &NamingConfig,
    epsilon: f64,
) {
    for locator in locators.iter() {
        let name = locator.name.with_prefix(&naming.joint_prefix);
        let world = scene
            .world_matrix(&name)
            .unwrap_or_else(|| panic!("joint {name} was not built"));
        let joint = math::translation(&world);
        let expected = locator.position();
        assert!(
            relative_eq!(joint, expected, epsilon = epsilon),
            "joint {name} at {joint:?}, locator at {expected:?}"
        );
    }
}

/// Assert every joint's translate, rotate and scale channels are identity.
///
/// # Panics
///
/// Panics on the first joint with a non-identity channel.
pub fn assert_identity_locals(scene: &RigScene) {
    for &joint in scene.index().joints() {
        let local = scene.local_transform(joint).expect("joint has local channels");
        assert!(
            local.is_identity(),
            "joint {:?} has local transform {local:?}",
            scene.joint_name(joint)
        );
    }
}

/// World matrix of the rest frame owned by the joint called `name`.
///
/// # Panics
///
/// Panics if the joint or its rest frame does not exist.
pub fn rest_world(scene: &RigScene, name: &str) -> Mat4 {
    let joint = scene
        .joint(name)
        .unwrap_or_else(|| panic!("joint {name} was not built"));
    let rest = scene.rest_frame_of(joint).expect("joint has a rest frame");
    scene.rest_frame(rest).expect("rest frame exists").world
}
