// rigbuddy-locators: locator sets, default biped placement and mirroring.

pub mod layout;
pub mod mirror;
pub mod set;

pub use layout::BipedLayout;
pub use mirror::mirror_left_to_right;
pub use set::{Locator, LocatorSet};
