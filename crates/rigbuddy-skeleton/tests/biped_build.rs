//! Full biped builds: placement, hierarchy, idempotence and teardown.

use approx::assert_relative_eq;
use rigbuddy_core::config::RigConfig;
use rigbuddy_core::error::ChainError;
use rigbuddy_core::math::{self, Vec3};
use rigbuddy_core::types::{BodyPart, ChainId, RigName, Side};
use rigbuddy_locators::mirror_left_to_right;
use rigbuddy_skeleton::prelude::*;
use rigbuddy_test_utils::{
    assert_identity_locals, assert_joints_on_locators, biped_locators, built_scene, rest_world,
};

fn parent_of(scene: &RigScene, name: &str) -> Option<String> {
    scene.record(name).and_then(|record| record.parent)
}

#[test]
fn every_joint_lands_on_its_locator() {
    for (spine, fingers) in [(1, 1), (4, 5), (11, 11)] {
        let config = RigConfig::with_counts(spine, fingers);
        let locators = biped_locators(&config);
        let (scene, report) = built_scene(&config, &locators);

        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(scene.joint_count(), locators.len());
        assert_identity_locals(&scene);
        assert_joints_on_locators(&scene, &locators, &config.naming, 1e-5);
    }
}

#[test]
fn chains_hang_from_their_attachments() {
    let config = RigConfig::with_counts(4, 5);
    let (scene, _) = built_scene(&config, &biped_locators(&config));

    assert_eq!(parent_of(&scene, "JNT_root"), None);
    assert_eq!(parent_of(&scene, "JNT_C_head_0").as_deref(), Some("JNT_spine_3"));
    assert_eq!(parent_of(&scene, "JNT_C_jaw_0").as_deref(), Some("JNT_C_head_1"));
    assert_eq!(parent_of(&scene, "JNT_R_eye_0").as_deref(), Some("JNT_C_head_1"));
    assert_eq!(parent_of(&scene, "JNT_L_leg_0").as_deref(), Some("JNT_root"));
    assert_eq!(parent_of(&scene, "JNT_R_arm_0").as_deref(), Some("JNT_spine_3"));
    assert_eq!(parent_of(&scene, "JNT_L_finger_4_0").as_deref(), Some("JNT_L_arm_3"));
    assert_eq!(parent_of(&scene, "JNT_L_finger_4_3").as_deref(), Some("JNT_L_finger_4_2"));
}

#[test]
fn chain_heads_close_out_only_open_attachments() {
    let config = RigConfig::with_counts(4, 2);
    let locators = biped_locators(&config);
    let (scene, _) = built_scene(&config, &locators);

    // Root aims at the first spine link, not at a hip.
    assert_relative_eq!(math::axis(&rest_world(&scene, "JNT_root"), 0), Vec3::y(), epsilon = 1e-12);
    // Spine tail aims at the neck; the arms came later and left it alone.
    assert_relative_eq!(
        math::axis(&rest_world(&scene, "JNT_spine_3"), 0),
        Vec3::y(),
        epsilon = 1e-12
    );
    // Face aims at the crown, not at the jaw or eyes.
    assert_relative_eq!(
        math::axis(&rest_world(&scene, "JNT_C_head_1"), 0),
        Vec3::y(),
        epsilon = 1e-12
    );
    // The wrist is a chain tail until the first finger aims it.
    let wrist = locators.get(&RigName::sided(Side::Left, BodyPart::Arm, 3)).unwrap();
    let knuckle = locators.get(&RigName::finger(Side::Left, 0, 0)).unwrap();
    assert_relative_eq!(
        math::axis(&rest_world(&scene, "JNT_L_arm_3"), 0),
        (knuckle.position() - wrist.position()).normalize(),
        epsilon = 1e-12
    );
}

#[test]
fn second_build_leaves_the_hierarchy_unchanged() {
    let config = RigConfig::default();
    let locators = biped_locators(&config);
    let builder = HierarchyBuilder::new(&config).unwrap();
    let mut scene = RigScene::new();

    assert!(!builder.create_joints(&mut scene, &locators).is_already_built());
    let first = scene.records();
    let rest_frames = scene.rest_frame_count();

    assert_eq!(
        builder.create_joints(&mut scene, &locators),
        BuildOutcome::AlreadyBuilt
    );
    assert_eq!(scene.records(), first);
    assert_eq!(scene.rest_frame_count(), rest_frames);
}

#[test]
fn build_delete_build_round_trips() {
    let config = RigConfig::with_counts(5, 3);
    let locators = biped_locators(&config);
    let mut scene = RigScene::new();

    create_joints(&mut scene, &config, &locators).unwrap();
    let first = scene.records();

    let teardown = delete_joints(&mut scene);
    assert_eq!(teardown.joints, first.len());
    assert!(scene.records().is_empty());

    let outcome = create_joints(&mut scene, &config, &locators).unwrap();
    assert!(outcome.report().is_some_and(BuildReport::is_complete));
    assert_eq!(scene.records(), first);
}

#[test]
fn clear_removes_rest_storage_and_allows_rebuild() {
    let config = RigConfig::with_counts(2, 1);
    let locators = biped_locators(&config);
    let mut scene = RigScene::new();

    create_joints(&mut scene, &config, &locators).unwrap();
    let first = scene.records();
    let teardown = scene.clear();
    assert_eq!(teardown.groups, 2);
    assert!(scene.rest_storage().is_none());
    assert_eq!(scene.rest_frame_count(), 0);

    create_joints(&mut scene, &config, &locators).unwrap();
    assert_eq!(scene.records(), first);
}

#[test]
fn missing_locator_only_drops_its_chain_and_dependents() {
    let config = RigConfig::with_counts(4, 2);
    let mut locators = biped_locators(&config);
    locators.remove(&RigName::sided(Side::Center, BodyPart::Head, 1));

    let (scene, report) = built_scene(&config, &locators);

    // head stops at a hole, and jaw and eyes have nothing to attach to.
    let failed: Vec<ChainId> = report.failures.iter().map(ChainError::chain).collect();
    assert_eq!(
        failed,
        [
            ChainId::Head,
            ChainId::Jaw,
            ChainId::Eye(Side::Left),
            ChainId::Eye(Side::Right)
        ]
    );
    assert!(matches!(
        &report.failures[0],
        ChainError::MissingLocator { locator, .. } if locator == "LOC_C_head_1"
    ));
    assert!(scene.joint("JNT_C_head_0").is_none());
    assert!(scene.joint("JNT_L_leg_4").is_some());
    assert!(scene.joint("JNT_R_finger_1_3").is_some());
    assert_identity_locals(&scene);
}

#[test]
fn mirrored_edits_build_a_symmetric_rig() {
    let config = RigConfig::with_counts(3, 2);
    let mut locators = biped_locators(&config);
    locators.set_position(
        &RigName::sided(Side::Left, BodyPart::Arm, 2),
        Vec3::new(0.95, 2.6, -0.2),
    );
    mirror_left_to_right(&mut locators);

    let (scene, report) = built_scene(&config, &locators);
    assert!(report.is_complete());
    assert_joints_on_locators(&scene, &locators, &config.naming, 1e-5);

    let left = math::translation(&scene.world_matrix("JNT_L_arm_2").unwrap());
    let right = math::translation(&scene.world_matrix("JNT_R_arm_2").unwrap());
    assert_relative_eq!(right, Vec3::new(-left.x, left.y, left.z), epsilon = 1e-9);
}

#[test]
fn custom_naming_flows_through_to_joint_names() {
    let mut config = RigConfig::with_counts(1, 1);
    config.naming.joint_prefix = "BONE".into();
    config.naming.rest_suffix = "ORIENT".into();
    let locators = biped_locators(&config);
    let (scene, report) = built_scene(&config, &locators);

    assert!(report.is_complete());
    let root = scene.joint("BONE_root").unwrap();
    let rest = scene.rest_frame_of(root).unwrap();
    assert_eq!(scene.rest_frame_name(rest), Some("BONE_root_ORIENT"));
    assert!(scene.joint("JNT_root").is_none());
}

#[test]
fn chain_head_on_its_attachment_warns() {
    let config = RigConfig::with_counts(4, 1);
    let mut locators = biped_locators(&config);
    let spine_tail = locators.get(&RigName::spine(3)).unwrap().position();
    locators.set_position(&RigName::sided(Side::Left, BodyPart::Arm, 0), spine_tail);

    let (scene, report) = built_scene(&config, &locators);
    assert!(report.is_complete(), "{:?}", report.failures);
    assert_eq!(
        report.warnings,
        [BuildWarning::DegenerateAim {
            chain: ChainId::Arm(Side::Left),
            from: "JNT_spine_3".into(),
            to: "JNT_L_arm_0".into(),
        }]
    );
    // The spine tail was already aimed at the neck and stays that way.
    assert_relative_eq!(
        math::axis(&rest_world(&scene, "JNT_spine_3"), 0),
        Vec3::y(),
        epsilon = 1e-12
    );
    assert_joints_on_locators(&scene, &locators, &config.naming, 1e-5);
}
