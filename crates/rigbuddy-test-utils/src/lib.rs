//! Shared test fixtures and assertions for rigbuddy crates.
//!
//! Provides reusable locator sets (the four-point spine scenario and full
//! bipeds), built scenes and world-space checks on the resulting joints.

pub mod assert;
pub mod fixtures;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use assert::{assert_identity_locals, assert_joints_on_locators, rest_world};
pub use fixtures::{biped_locators, built_scene, spine_scenario, spine_scenario_config};
