//! Default biped placement.
//!
//! Every coordinate here is in scene units with +Y up, +Z forward and the
//! character's left on +X. Heights above the spine shift by a quarter unit
//! per spine link so longer spines push the head, arms and hands upward.

use tracing::info;

use rigbuddy_core::config::RigConfig;
use rigbuddy_core::math::Vec3;
use rigbuddy_core::types::{BodyPart, RigName, Side};

use crate::set::{Locator, LocatorSet};

/// Vertical step between consecutive spine locators.
const SPINE_STEP: f64 = 0.25;
/// Height of `spine_0`.
const SPINE_BASE: f64 = 2.75;
/// Knuckles per finger.
pub const KNUCKLES_PER_FINGER: u32 = 4;

const ROOT_SIZE: f64 = 0.15;
const BODY_SIZE: f64 = 0.1;
const FINGER_SIZE: f64 = 0.03;

/// Hip, knee, ankle, ball and toe for the left leg.
const LEG: [[f64; 3]; 5] = [
    [0.2, 2.4, 0.0],
    [0.33, 1.3, 0.0],
    [0.4, 0.2, 0.0],
    [0.4, 0.0, 0.2],
    [0.4, 0.0, 0.5],
];

/// Clavicle, shoulder, elbow and wrist for the left arm, relative to the
/// top of the spine.
const ARM: [[f64; 3]; 4] = [
    [0.25, 0.0, 0.0],
    [0.5, -0.2, 0.0],
    [0.9, -0.55, 0.0],
    [1.4, -0.9, 0.0],
];

/// Neck, face and crown, relative to the top of the spine.
const HEAD: [f64; 3] = [0.0, 0.45, 0.75];

/// Jaw base and chin, relative to the top of the spine.
const JAW: [[f64; 3]; 2] = [[0.0, 0.25, 0.05], [0.0, 0.15, 0.2]];

/// Left eye centre and gaze target, relative to the top of the spine.
const EYE: [[f64; 3]; 2] = [[0.1, 0.45, 0.15], [0.1, 0.45, 0.3]];

/// Generates the starting locator layout for a biped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BipedLayout {
    pub spine_count: u32,
    pub finger_count: u32,
}

impl BipedLayout {
    pub const fn new(spine_count: u32, finger_count: u32) -> Self {
        Self {
            spine_count,
            finger_count,
        }
    }

    pub const fn from_config(config: &RigConfig) -> Self {
        Self::new(config.spine_count, config.finger_count)
    }

    /// Height where the spine would continue past its last link.
    fn spine_top(&self) -> f64 {
        SPINE_BASE + SPINE_STEP * f64::from(self.spine_count)
    }

    /// The full layout as a fresh set.
    pub fn locators(&self) -> LocatorSet {
        let mut set = LocatorSet::new();
        let top = self.spine_top();

        set.insert(Locator::at(RigName::root(), 0.0, 2.5, 0.0).with_size(ROOT_SIZE));
        for i in 0..self.spine_count {
            let y = SPINE_BASE + SPINE_STEP * f64::from(i);
            set.insert(body(RigName::spine(i), Vec3::new(0.0, y, 0.0)));
        }

        for (i, y) in (0..).zip(HEAD) {
            let name = RigName::sided(Side::Center, BodyPart::Head, i);
            set.insert(body(name, Vec3::new(0.0, top + y, 0.0)));
        }
        for (i, [x, y, z]) in (0..).zip(JAW) {
            let name = RigName::sided(Side::Center, BodyPart::Jaw, i);
            set.insert(body(name, Vec3::new(x, top + y, z)));
        }

        for side in [Side::Left, Side::Right] {
            let sign = side.x_sign();
            for (i, [x, y, z]) in (0..).zip(EYE) {
                let name = RigName::sided(side, BodyPart::Eye, i);
                set.insert(body(name, Vec3::new(sign * x, top + y, z)));
            }
            for (i, [x, y, z]) in (0..).zip(LEG) {
                let name = RigName::sided(side, BodyPart::Leg, i);
                set.insert(body(name, Vec3::new(sign * x, y, z)));
            }
            let mut wrist = Vec3::zeros();
            for (i, [x, y, z]) in (0..).zip(ARM) {
                let name = RigName::sided(side, BodyPart::Arm, i);
                wrist = Vec3::new(sign * x, top + y, z);
                set.insert(body(name, wrist));
            }
            for finger in 0..self.finger_count {
                for knuckle in 0..KNUCKLES_PER_FINGER {
                    let reach = 0.1 + 0.1 * f64::from(knuckle);
                    let spread = 0.05 * f64::from(finger);
                    let position = wrist + Vec3::new(sign * reach, -reach, -spread);
                    let name = RigName::finger(side, finger, knuckle);
                    set.insert(
                        Locator::new(name, rigbuddy_core::math::from_translation(position))
                            .with_size(FINGER_SIZE),
                    );
                }
            }
        }
        set
    }

    /// Fill `set` with the layout. Returns the number of locators placed.
    ///
    /// A set that already holds locators is left alone.
    pub fn place_into(&self, set: &mut LocatorSet) -> usize {
        if !set.is_empty() {
            info!(existing = set.len(), "locators already exist, skipping placement");
            return 0;
        }
        *set = self.locators();
        info!(
            count = set.len(),
            spine_count = self.spine_count,
            finger_count = self.finger_count,
            "placed biped locators"
        );
        set.len()
    }
}

fn body(name: RigName, position: Vec3) -> Locator {
    Locator::new(name, rigbuddy_core::math::from_translation(position)).with_size(BODY_SIZE)
}
