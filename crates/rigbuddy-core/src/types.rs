//! Naming grammar and chain identifiers.
//!
//! Locators and joints share one name stem, `<side?>_<bodyPart>_<finger?>_<index?>`,
//! and differ only in prefix (`LOC_C_head_1` vs `JNT_C_head_1`). [`RigName`]
//! is the typed form of that stem; strings only appear at the boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of the body a rig element sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Center,
}

impl Side {
    /// Tag used in names (`L`, `R`, `C`).
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
            Self::Center => "C",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            "C" => Some(Self::Center),
            _ => None,
        }
    }

    /// The opposite side across the X = 0 plane.
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Center => Self::Center,
        }
    }

    /// Sign applied to X coordinates: left is +X, right is -X.
    pub const fn x_sign(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
            Self::Center => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// BodyPart
// ---------------------------------------------------------------------------

/// Anatomical segment a locator or joint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Root,
    Spine,
    Head,
    Jaw,
    Eye,
    Leg,
    Arm,
    Finger,
}

impl BodyPart {
    pub const ALL: [Self; 8] = [
        Self::Root,
        Self::Spine,
        Self::Head,
        Self::Jaw,
        Self::Eye,
        Self::Leg,
        Self::Arm,
        Self::Finger,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Spine => "spine",
            Self::Head => "head",
            Self::Jaw => "jaw",
            Self::Eye => "eye",
            Self::Leg => "leg",
            Self::Arm => "arm",
            Self::Finger => "finger",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.tag() == tag)
    }

    /// Whether names of this part carry a side tag.
    pub const fn is_sided(self) -> bool {
        !matches!(self, Self::Root | Self::Spine)
    }
}

// ---------------------------------------------------------------------------
// RigName
// ---------------------------------------------------------------------------

/// Typed name stem shared by a locator and the joint built from it.
///
/// Field order matters: the derived `Ord` sorts the links of one chain by
/// index, so ordered maps keyed by `RigName` enumerate chains in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RigName {
    pub part: BodyPart,
    pub side: Option<Side>,
    /// Finger number, only for [`BodyPart::Finger`].
    pub finger: Option<u32>,
    /// Sequence index along the chain. `None` only for the root.
    pub index: Option<u32>,
}

impl RigName {
    /// `root`, the single unindexed name.
    pub const fn root() -> Self {
        Self {
            part: BodyPart::Root,
            side: None,
            finger: None,
            index: None,
        }
    }

    /// `spine_<index>`.
    pub const fn spine(index: u32) -> Self {
        Self {
            part: BodyPart::Spine,
            side: None,
            finger: None,
            index: Some(index),
        }
    }

    /// `<side>_<part>_<index>` for head, jaw, eye, leg and arm names.
    pub const fn sided(side: Side, part: BodyPart, index: u32) -> Self {
        Self {
            part,
            side: Some(side),
            finger: None,
            index: Some(index),
        }
    }

    /// `<side>_finger_<finger>_<knuckle>`.
    pub const fn finger(side: Side, finger: u32, knuckle: u32) -> Self {
        Self {
            part: BodyPart::Finger,
            side: Some(side),
            finger: Some(finger),
            index: Some(knuckle),
        }
    }

    /// Same name with another sequence index.
    #[must_use]
    pub const fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Same name on the other side of the body.
    #[must_use]
    pub fn mirrored(mut self) -> Self {
        self.side = self.side.map(Side::mirrored);
        self
    }

    /// Full boundary name, e.g. `LOC_L_finger_2_0`.
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}_{self}")
    }

    /// Parse a full boundary name carrying `prefix`.
    pub fn parse(name: &str, prefix: &str) -> Result<Self, NameError> {
        let stem = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| NameError::MissingPrefix {
                name: name.to_owned(),
                prefix: prefix.to_owned(),
            })?;
        Self::parse_stem(stem)
    }

    /// Parse a prefix-less stem such as `C_head_1`.
    pub fn parse_stem(stem: &str) -> Result<Self, NameError> {
        let malformed = || NameError::Malformed(stem.to_owned());
        let mut tokens = stem.split('_').peekable();

        let side = match tokens.peek().copied().and_then(Side::from_tag) {
            Some(side) => {
                tokens.next();
                Some(side)
            }
            None => None,
        };

        let part_tag = tokens.next().ok_or_else(malformed)?;
        let part =
            BodyPart::from_tag(part_tag).ok_or_else(|| NameError::UnknownPart(part_tag.to_owned()))?;

        let numbers = tokens
            .map(|token| parse_index(token).ok_or_else(malformed))
            .collect::<Result<Vec<_>, _>>()?;

        if part.is_sided() != side.is_some() {
            return Err(malformed());
        }

        match (part, numbers.as_slice()) {
            (BodyPart::Root, []) => Ok(Self::root()),
            (BodyPart::Spine, [index]) => Ok(Self::spine(*index)),
            (BodyPart::Finger, [finger, knuckle]) => {
                Ok(Self::finger(side.ok_or_else(malformed)?, *finger, *knuckle))
            }
            (BodyPart::Root | BodyPart::Spine | BodyPart::Finger, _) => Err(malformed()),
            (part, [index]) => Ok(Self::sided(side.ok_or_else(malformed)?, part, *index)),
            _ => Err(malformed()),
        }
    }
}

/// Index token in canonical form: plain digits, no sign, no leading zero.
fn parse_index(token: &str) -> Option<u32> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical { token.parse().ok() } else { None }
}

impl fmt::Display for RigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(side) = self.side {
            write!(f, "{}_", side.tag())?;
        }
        f.write_str(self.part.tag())?;
        if let Some(finger) = self.finger {
            write!(f, "_{finger}")?;
        }
        if let Some(index) = self.index {
            write!(f, "_{index}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChainPattern
// ---------------------------------------------------------------------------

/// Which locators make up a chain, in link order.
///
/// Link `0` is `leading` when present (the root in front of the spine);
/// the remaining links are the indexed names matching `part`, `side` and
/// `finger`, starting at index `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainPattern {
    pub leading: Option<RigName>,
    pub part: BodyPart,
    pub side: Option<Side>,
    pub finger: Option<u32>,
}

impl ChainPattern {
    pub const fn new(part: BodyPart, side: Option<Side>) -> Self {
        Self {
            leading: None,
            part,
            side,
            finger: None,
        }
    }

    #[must_use]
    pub const fn with_leading(mut self, leading: RigName) -> Self {
        self.leading = Some(leading);
        self
    }

    #[must_use]
    pub const fn with_finger(mut self, finger: u32) -> Self {
        self.finger = Some(finger);
        self
    }

    /// Name expected at chain link `link`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn link_name(&self, link: usize) -> RigName {
        match (self.leading, link) {
            (Some(leading), 0) => leading,
            (Some(_), link) => self.indexed(link as u32 - 1),
            (None, link) => self.indexed(link as u32),
        }
    }

    /// Whether `name` is one of the indexed (non-leading) links.
    pub fn matches(&self, name: &RigName) -> bool {
        name.part == self.part
            && name.side == self.side
            && name.finger == self.finger
            && name.index.is_some()
    }

    const fn indexed(&self, index: u32) -> RigName {
        RigName {
            part: self.part,
            side: self.side,
            finger: self.finger,
            index: Some(index),
        }
    }
}

// ---------------------------------------------------------------------------
// ChainId / LinkIndex
// ---------------------------------------------------------------------------

/// Identity of one anatomical chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// Root followed by the spine links.
    Spine,
    Head,
    Jaw,
    Eye(Side),
    Leg(Side),
    Arm(Side),
    /// One finger of one hand, by finger number.
    Finger(Side, u32),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spine => f.write_str("spine"),
            Self::Head => f.write_str("head"),
            Self::Jaw => f.write_str("jaw"),
            Self::Eye(side) => write!(f, "{}_eye", side.tag()),
            Self::Leg(side) => write!(f, "{}_leg", side.tag()),
            Self::Arm(side) => write!(f, "{}_arm", side.tag()),
            Self::Finger(side, finger) => write!(f, "{}_finger_{finger}", side.tag()),
        }
    }
}

/// Position of a link inside a chain, possibly counted from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkIndex {
    At(usize),
    Last,
}

impl LinkIndex {
    /// Concrete index in a chain of `len` links, if it exists.
    pub const fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Self::At(index) if index < len => Some(index),
            Self::Last if len > 0 => Some(len - 1),
            _ => None,
        }
    }
}

impl fmt::Display for LinkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{index}"),
            Self::Last => f.write_str("last"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
