//! The locator collection handed to the joint builder.
//!
//! A [`LocatorSet`] maps typed names to world transforms. It only needs to
//! answer two questions: which locators form a chain (in index order) and
//! where each one sits.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use rigbuddy_core::config::NamingConfig;
use rigbuddy_core::error::LocatorError;
use rigbuddy_core::math::{self, Mat4, Vec3};
use rigbuddy_core::types::{ChainPattern, RigName};

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// A named placement point.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    pub name: RigName,
    /// World transform.
    pub world: Mat4,
    /// Display size. Not part of the transform.
    pub size: f64,
}

impl Locator {
    pub const fn new(name: RigName, world: Mat4) -> Self {
        Self {
            name,
            world,
            size: 0.1,
        }
    }

    /// Locator with a pure translation.
    pub fn at(name: RigName, x: f64, y: f64, z: f64) -> Self {
        Self::new(name, math::from_translation(Vec3::new(x, y, z)))
    }

    #[must_use]
    pub const fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn position(&self) -> Vec3 {
        math::translation(&self.world)
    }
}

// ---------------------------------------------------------------------------
// LocatorSet
// ---------------------------------------------------------------------------

/// All locators of one character, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocatorSet {
    locators: BTreeMap<RigName, Locator>,
}

impl LocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from boundary names, skipping names outside the grammar.
    pub fn from_named<I, S>(entries: I, naming: &NamingConfig) -> Self
    where
        I: IntoIterator<Item = (S, Mat4)>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, world) in entries {
            match RigName::parse(name.as_ref(), &naming.locator_prefix) {
                Ok(rig_name) => {
                    set.insert(Locator::new(rig_name, world));
                }
                Err(err) => warn!(name = name.as_ref(), %err, "skipping locator"),
            }
        }
        set
    }

    /// Insert or replace a locator. Returns the replaced one.
    pub fn insert(&mut self, locator: Locator) -> Option<Locator> {
        self.locators.insert(locator.name, locator)
    }

    pub fn get(&self, name: &RigName) -> Option<&Locator> {
        self.locators.get(name)
    }

    pub fn get_mut(&mut self, name: &RigName) -> Option<&mut Locator> {
        self.locators.get_mut(name)
    }

    pub fn remove(&mut self, name: &RigName) -> Option<Locator> {
        self.locators.remove(name)
    }

    pub fn contains(&self, name: &RigName) -> bool {
        self.locators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Locators in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Locator> {
        self.locators.values()
    }

    /// Move a locator, keeping its orientation. Returns `false` if absent.
    pub fn set_position(&mut self, name: &RigName, position: Vec3) -> bool {
        self.locators.get_mut(name).is_some_and(|locator| {
            math::set_translation(&mut locator.world, position);
            true
        })
    }

    /// All locators matching `pattern`'s indexed links, in index order.
    ///
    /// The leading link is not included; gaps are not detected.
    pub fn matching<'a>(&'a self, pattern: &'a ChainPattern) -> impl Iterator<Item = &'a Locator> {
        self.locators
            .values()
            .filter(move |locator| pattern.matches(&locator.name))
    }

    /// Enumerate the links of a chain in order.
    ///
    /// Links are taken while consecutive names exist, and the chain is
    /// rejected with the first missing name if it comes up short. With an
    /// `expected_len`, extra links are ignored; without one, a matching
    /// locator beyond a hole is also rejected.
    pub fn chain(
        &self,
        pattern: &ChainPattern,
        expected_len: Option<usize>,
    ) -> Result<Vec<&Locator>, RigName> {
        let links: Vec<&Locator> = (0..)
            .map(|link| self.get(&pattern.link_name(link)))
            .take_while(Option::is_some)
            .flatten()
            .collect();

        let gap = pattern.link_name(links.len());
        if links.is_empty() || expected_len.is_some_and(|len| links.len() < len) {
            return Err(gap);
        }
        if let Some(len) = expected_len {
            return Ok(links.into_iter().take(len).collect());
        }
        // Without an expected length a stray link past a hole means the
        // chain was cut short.
        if self
            .matching(pattern)
            .any(|locator| locator.name.index > gap.index)
        {
            return Err(gap);
        }
        Ok(links)
    }

    /// Boundary names of every locator.
    pub fn names(&self, naming: &NamingConfig) -> Vec<String> {
        self.locators
            .keys()
            .map(|name| name.with_prefix(&naming.locator_prefix))
            .collect()
    }

    /// Read a locator file.
    pub fn from_file(path: impl AsRef<Path>, naming: &NamingConfig) -> Result<Self, LocatorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LocatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, naming)
    }

    /// Parse locators from TOML:
    ///
    /// ```toml
    /// [[locator]]
    /// name = "LOC_root"
    /// translation = [0.0, 2.5, 0.0]
    /// rotation = [0.0, 0.0, 0.0]   # optional, XYZ degrees
    /// size = 0.15                  # optional
    /// ```
    ///
    /// Unlike [`LocatorSet::from_named`], a bad or repeated name here is an
    /// error.
    pub fn from_toml_str(content: &str, naming: &NamingConfig) -> Result<Self, LocatorError> {
        let file: LocatorFile = toml::from_str(content)?;
        let mut set = Self::new();
        for entry in file.locator {
            let name = RigName::parse(&entry.name, &naming.locator_prefix)?;
            let world = math::from_translation_euler_degrees(
                Vec3::from(entry.translation),
                Vec3::from(entry.rotation.unwrap_or_default()),
            );
            let locator = Locator::new(name, world);
            let replaced = set.insert(match entry.size {
                Some(size) => locator.with_size(size),
                None => locator,
            });
            if replaced.is_some() {
                return Err(LocatorError::Duplicate(entry.name));
            }
        }
        Ok(set)
    }

    /// Serialise translations back to the TOML locator format.
    pub fn to_toml_string(&self, naming: &NamingConfig) -> Result<String, toml::ser::Error> {
        let file = LocatorFile {
            locator: self
                .iter()
                .map(|locator| {
                    let position = locator.position();
                    LocatorEntry {
                        name: locator.name.with_prefix(&naming.locator_prefix),
                        translation: [position.x, position.y, position.z],
                        rotation: None,
                        size: Some(locator.size),
                    }
                })
                .collect(),
        };
        toml::to_string(&file)
    }
}

impl FromIterator<Locator> for LocatorSet {
    fn from_iter<T: IntoIterator<Item = Locator>>(iter: T) -> Self {
        let mut set = Self::new();
        for locator in iter {
            set.insert(locator);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct LocatorFile {
    #[serde(default)]
    locator: Vec<LocatorEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LocatorEntry {
    name: String,
    translation: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rigbuddy_core::error::NameError;
    use rigbuddy_core::types::{BodyPart, Side};

    fn spine_pattern() -> ChainPattern {
        ChainPattern::new(BodyPart::Spine, None).with_leading(RigName::root())
    }

    fn spine_set(indices: &[u32]) -> LocatorSet {
        let mut set = LocatorSet::new();
        set.insert(Locator::at(RigName::root(), 0.0, 2.5, 0.0));
        for &i in indices {
            set.insert(Locator::at(RigName::spine(i), 0.0, 2.75 + 0.25 * f64::from(i), 0.0));
        }
        set
    }

    #[test]
    fn chain_is_enumerated_in_index_order() {
        // Inserted out of order on purpose, with a two-digit index.
        let set = spine_set(&[10, 3, 0, 1, 2, 4, 5, 6, 7, 8, 9]);
        let chain = set.chain(&spine_pattern(), None).unwrap();
        let names: Vec<RigName> = chain.iter().map(|l| l.name).collect();
        assert_eq!(names[0], RigName::root());
        assert_eq!(names[1], RigName::spine(0));
        assert_eq!(names[11], RigName::spine(10));
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn gap_reports_first_missing_name() {
        let set = spine_set(&[0, 2]);
        assert_eq!(set.chain(&spine_pattern(), None), Err(RigName::spine(1)));
    }

    #[test]
    fn short_chain_reports_missing_tail() {
        let set = spine_set(&[0, 1]);
        assert_eq!(set.chain(&spine_pattern(), Some(4)), Err(RigName::spine(2)));
    }

    #[test]
    fn expected_len_truncates_extra_links() {
        let set = spine_set(&[0, 1, 2, 3]);
        let chain = set.chain(&spine_pattern(), Some(3)).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[2].name, RigName::spine(1));
    }

    #[test]
    fn empty_chain_reports_first_link() {
        let set = LocatorSet::new();
        let head = ChainPattern::new(BodyPart::Head, Some(Side::Center));
        assert_eq!(
            set.chain(&head, None),
            Err(RigName::sided(Side::Center, BodyPart::Head, 0))
        );
    }

    #[test]
    fn missing_leading_link_is_reported() {
        let mut set = spine_set(&[0, 1]);
        set.remove(&RigName::root());
        assert_eq!(set.chain(&spine_pattern(), None), Err(RigName::root()));
    }

    #[test]
    fn from_named_skips_foreign_names() {
        let naming = NamingConfig::default();
        let set = LocatorSet::from_named(
            [
                ("LOC_root", Mat4::identity()),
                ("LOC_spine_0", Mat4::identity()),
                ("persp", Mat4::identity()),
                ("LOC_L_tail_0", Mat4::identity()),
            ],
            &naming,
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(&naming), vec!["LOC_root", "LOC_spine_0"]);
    }

    #[test]
    fn set_position_keeps_orientation() {
        let naming = NamingConfig::default();
        let rotated = math::from_translation_euler_degrees(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
        );
        let mut set = LocatorSet::from_named([("LOC_L_arm_0", rotated)], &naming);
        let name = RigName::sided(Side::Left, BodyPart::Arm, 0);
        assert!(set.set_position(&name, Vec3::new(2.0, 3.0, 4.0)));
        let moved = set.get(&name).unwrap();
        assert_eq!(moved.position(), Vec3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(math::axis(&moved.world, 0), Vec3::y(), epsilon = 1e-12);
        assert!(!set.set_position(&RigName::root(), Vec3::zeros()));
    }

    #[test]
    fn toml_locators_parse() {
        let naming = NamingConfig::default();
        let set = LocatorSet::from_toml_str(
            r#"
            [[locator]]
            name = "LOC_root"
            translation = [0.0, 2.5, 0.0]
            size = 0.15

            [[locator]]
            name = "LOC_L_leg_0"
            translation = [0.2, 2.4, 0.0]
            rotation = [0.0, 90.0, 0.0]
            "#,
            &naming,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        let root = set.get(&RigName::root()).unwrap();
        assert_relative_eq!(root.size, 0.15);
        let hip = set.get(&RigName::sided(Side::Left, BodyPart::Leg, 0)).unwrap();
        assert_relative_eq!(hip.position(), Vec3::new(0.2, 2.4, 0.0), epsilon = 1e-12);
        assert_relative_eq!(math::axis(&hip.world, 0), -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn toml_with_bad_name_is_an_error() {
        let naming = NamingConfig::default();
        let err = LocatorSet::from_toml_str(
            "[[locator]]\nname = \"JNT_root\"\ntranslation = [0.0, 0.0, 0.0]\n",
            &naming,
        )
        .unwrap_err();
        assert!(matches!(err, LocatorError::Name(_)));
    }

    #[test]
    fn toml_with_non_canonical_index_is_an_error() {
        let naming = NamingConfig::default();
        let err = LocatorSet::from_toml_str(
            r#"
            [[locator]]
            name = "LOC_spine_1"
            translation = [0.0, 1.0, 0.0]

            [[locator]]
            name = "LOC_spine_01"
            translation = [0.0, 9.0, 0.0]
            "#,
            &naming,
        )
        .unwrap_err();
        assert!(matches!(err, LocatorError::Name(NameError::Malformed(_))));

        let err = LocatorSet::from_toml_str(
            "[[locator]]\nname = \"LOC_spine_+2\"\ntranslation = [0.0, 2.0, 0.0]\n",
            &naming,
        )
        .unwrap_err();
        assert!(matches!(err, LocatorError::Name(_)));
    }

    #[test]
    fn toml_with_repeated_name_is_an_error() {
        let naming = NamingConfig::default();
        let err = LocatorSet::from_toml_str(
            r#"
            [[locator]]
            name = "LOC_spine_1"
            translation = [0.0, 1.0, 0.0]

            [[locator]]
            name = "LOC_spine_1"
            translation = [0.0, 9.0, 0.0]
            "#,
            &naming,
        )
        .unwrap_err();
        assert!(matches!(err, LocatorError::Duplicate(name) if name == "LOC_spine_1"));
    }

    #[test]
    fn toml_output_reads_back() {
        let naming = NamingConfig::default();
        let set = spine_set(&[0, 1]);
        let text = set.to_toml_string(&naming).unwrap();
        let back = LocatorSet::from_toml_str(&text, &naming).unwrap();
        assert_eq!(back.len(), 3);
        assert_relative_eq!(
            back.get(&RigName::spine(1)).unwrap().position(),
            Vec3::new(0.0, 3.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LocatorSet::from_file("/nonexistent/locators.toml", &NamingConfig::default())
            .unwrap_err();
        assert!(matches!(err, LocatorError::Io { .. }));
    }
}
