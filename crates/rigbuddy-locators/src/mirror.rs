use tracing::{debug, warn};

use rigbuddy_core::math::{self, Vec3};
use rigbuddy_core::types::Side;

use crate::set::LocatorSet;

/// Copy every left locator's position onto its right counterpart across
/// the X = 0 plane. Returns the number of right locators moved.
///
/// Only translations are mirrored; orientation and size are kept.
pub fn mirror_left_to_right(set: &mut LocatorSet) -> usize {
    let targets: Vec<_> = set
        .iter()
        .filter(|locator| locator.name.side == Some(Side::Left))
        .map(|locator| {
            let p = math::translation(&locator.world);
            (locator.name.mirrored(), Vec3::new(-p.x, p.y, p.z))
        })
        .collect();

    let mut moved = 0;
    for (name, position) in targets {
        if set.set_position(&name, position) {
            debug!(locator = %name, "mirrored");
            moved += 1;
        } else {
            warn!(locator = %name, "no right-side counterpart to mirror onto");
        }
    }
    moved
}
