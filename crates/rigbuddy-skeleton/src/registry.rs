//! Static table of the anatomical chains and how each one is anchored.

use rigbuddy_core::config::RigConfig;
use rigbuddy_core::error::ConfigError;
use rigbuddy_core::types::{BodyPart, ChainId, ChainPattern, LinkIndex, RigName, Side};

/// How link 0 of a chain is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachRule {
    /// Unparented; the chain head is the hierarchy root.
    WorldRoot,
    /// Parented to a joint of a chain built earlier.
    Joint { chain: ChainId, link: LinkIndex },
}

/// Everything needed to walk one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSpec {
    pub id: ChainId,
    pub pattern: ChainPattern,
    pub attach: AttachRule,
    /// Exact number of links to build, when the config fixes it.
    pub expected_len: Option<usize>,
}

impl ChainSpec {
    pub const fn new(id: ChainId, pattern: ChainPattern, attach: AttachRule) -> Self {
        Self {
            id,
            pattern,
            attach,
            expected_len: None,
        }
    }

    #[must_use]
    pub const fn with_len(mut self, len: usize) -> Self {
        self.expected_len = Some(len);
        self
    }

    /// Whether this chain's head has no parent anywhere.
    pub const fn is_root(&self) -> bool {
        matches!(self.attach, AttachRule::WorldRoot)
    }
}

/// Registered chains in build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: Vec<ChainSpec>,
}

impl ChainRegistry {
    /// The biped chain table for `config`.
    ///
    /// Fails if the config is invalid.
    pub fn new(config: &RigConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::from_specs(biped_chains(config))
    }

    /// A registry over arbitrary specs.
    ///
    /// Every attachment must target a chain declared earlier, which makes
    /// declaration order a valid build order.
    pub fn from_specs(chains: Vec<ChainSpec>) -> Result<Self, ConfigError> {
        for (position, spec) in chains.iter().enumerate() {
            if let AttachRule::Joint { chain: target, .. } = spec.attach {
                if !chains[..position].iter().any(|earlier| earlier.id == target) {
                    return Err(ConfigError::AttachmentOrder {
                        chain: spec.id,
                        target,
                    });
                }
            }
            if chains[..position].iter().any(|earlier| earlier.id == spec.id) {
                return Err(ConfigError::InvalidValue {
                    field: "chains".into(),
                    message: format!("chain {} is registered twice", spec.id),
                });
            }
        }
        Ok(Self { chains })
    }

    pub fn resolve(&self, id: ChainId) -> Result<&ChainSpec, ConfigError> {
        self.chains
            .iter()
            .find(|spec| spec.id == id)
            .ok_or(ConfigError::UnregisteredChain(id))
    }

    /// Chains in build order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainSpec> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn biped_chains(config: &RigConfig) -> Vec<ChainSpec> {
    let spine_last = AttachRule::Joint {
        chain: ChainId::Spine,
        link: LinkIndex::Last,
    };
    let face = AttachRule::Joint {
        chain: ChainId::Head,
        link: LinkIndex::At(1),
    };
    let sided = |side: Side, part: BodyPart| ChainPattern::new(part, Some(side));

    let mut chains = vec![
        ChainSpec::new(
            ChainId::Spine,
            ChainPattern::new(BodyPart::Spine, None).with_leading(RigName::root()),
            AttachRule::WorldRoot,
        )
        .with_len(config.spine_count as usize + 1),
        ChainSpec::new(ChainId::Head, sided(Side::Center, BodyPart::Head), spine_last),
        ChainSpec::new(ChainId::Jaw, sided(Side::Center, BodyPart::Jaw), face),
    ];
    for side in [Side::Left, Side::Right] {
        chains.push(ChainSpec::new(ChainId::Eye(side), sided(side, BodyPart::Eye), face));
    }
    for side in [Side::Left, Side::Right] {
        chains.push(ChainSpec::new(
            ChainId::Leg(side),
            sided(side, BodyPart::Leg),
            AttachRule::Joint {
                chain: ChainId::Spine,
                link: LinkIndex::At(0),
            },
        ));
    }
    for side in [Side::Left, Side::Right] {
        chains.push(ChainSpec::new(
            ChainId::Arm(side),
            sided(side, BodyPart::Arm),
            spine_last,
        ));
    }
    for finger in 0..config.finger_count {
        for side in [Side::Left, Side::Right] {
            chains.push(ChainSpec::new(
                ChainId::Finger(side, finger),
                sided(side, BodyPart::Finger).with_finger(finger),
                AttachRule::Joint {
                    chain: ChainId::Arm(side),
                    link: LinkIndex::Last,
                },
            ));
        }
    }
    chains
}
