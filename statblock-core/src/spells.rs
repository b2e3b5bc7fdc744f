//! Spell records and the per-sheet spell catalog.
//!
//! The catalog is a separate pass over the sheet: it does not need the
//! compendium or any derived statistics, only the `spell` entries found
//! under the race, class and background sections.

use crate::record::{mappings, optional_int, optional_text, required_text, Fields, RecordError};
use crate::rules::RECORD_SECTIONS;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors from reading spell entries.
#[derive(Debug, Error)]
pub enum SpellError {
    #[error("Invalid spell school: {0:?}")]
    InvalidSchool(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Spell level, with cantrips ordered before level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpellLevel {
    Cantrip,
    Level(i32),
}

impl SpellLevel {
    /// From a sheet `level` field. Missing and `0` both mean cantrip.
    pub fn from_field(level: Option<i32>) -> Self {
        match level {
            None | Some(0) => SpellLevel::Cantrip,
            Some(level) => SpellLevel::Level(level),
        }
    }

    /// All levels a stat block lists, in display order.
    pub fn all() -> impl Iterator<Item = SpellLevel> {
        std::iter::once(SpellLevel::Cantrip).chain((1..=9).map(SpellLevel::Level))
    }

    /// Level as written on a spell card ("cantrip" or the number).
    pub fn card_label(&self) -> String {
        match self {
            SpellLevel::Cantrip => "cantrip".to_string(),
            SpellLevel::Level(level) => level.to_string(),
        }
    }
}

/// Stat block label: "cantrips" or the level number.
impl fmt::Display for SpellLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellLevel::Cantrip => write!(f, "cantrips"),
            SpellLevel::Level(level) => write!(f, "{}", level),
        }
    }
}

impl Serialize for SpellLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Schools of magic in D&D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

impl SpellSchool {
    /// Decode the sheet's numeric school (1 = Abjuration .. 8 = Transmutation).
    pub fn from_code(code: &str) -> Result<Self, SpellError> {
        let school = match code.trim() {
            "1" => SpellSchool::Abjuration,
            "2" => SpellSchool::Conjuration,
            "3" => SpellSchool::Divination,
            "4" => SpellSchool::Enchantment,
            "5" => SpellSchool::Evocation,
            "6" => SpellSchool::Illusion,
            "7" => SpellSchool::Necromancy,
            "8" => SpellSchool::Transmutation,
            other => return Err(SpellError::InvalidSchool(other.to_string())),
        };
        Ok(school)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpellSchool::Abjuration => "Abjuration",
            SpellSchool::Conjuration => "Conjuration",
            SpellSchool::Divination => "Divination",
            SpellSchool::Enchantment => "Enchantment",
            SpellSchool::Evocation => "Evocation",
            SpellSchool::Illusion => "Illusion",
            SpellSchool::Necromancy => "Necromancy",
            SpellSchool::Transmutation => "Transmutation",
        }
    }
}

impl fmt::Display for SpellSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spell components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Components {
    pub verbal: bool,
    pub somatic: bool,
    pub material: bool,
    /// Material description, if the sheet gives one.
    pub materials: Option<String>,
}

impl Components {
    /// Read the `v`, `s`, `m` flags (set when `"1"`) and `materials`.
    pub fn from_fields(spell: &Fields) -> Self {
        let flag = |key: &str| optional_text(spell, key).is_some_and(|v| v.trim() == "1");
        Self {
            verbal: flag("v"),
            somatic: flag("s"),
            material: flag("m"),
            materials: optional_text(spell, "materials"),
        }
    }

    /// Flags as a comma-separated list: "v,s,m".
    pub fn letters(&self) -> String {
        [(self.verbal, "v"), (self.somatic, "s"), (self.material, "m")]
            .into_iter()
            .filter_map(|(set, letter)| set.then_some(letter))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One spell as recorded on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellRecord {
    pub name: String,
    pub level: SpellLevel,
    pub school: SpellSchool,
    pub casting_time: String,
    pub range: String,
    pub components: Components,
    pub duration: String,
    pub text: String,
}

impl SpellRecord {
    pub fn from_fields(spell: &Fields) -> Result<Self, SpellError> {
        Ok(Self {
            name: required_text(spell, "name")?,
            level: SpellLevel::from_field(optional_int(spell, "level")?),
            school: SpellSchool::from_code(&required_text(spell, "school")?)?,
            casting_time: required_text(spell, "time")?,
            range: required_text(spell, "range")?,
            components: Components::from_fields(spell),
            duration: required_text(spell, "duration")?,
            text: optional_text(spell, "text").unwrap_or_default(),
        })
    }
}

/// A rendered spell card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellEntry {
    pub spell: SpellRecord,
    pub card: String,
}

/// Every spell on a sheet, keyed by name.
///
/// Entries keep the position of the first spell seen with their name; a
/// later spell with the same name replaces the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellCatalog {
    entries: Vec<SpellEntry>,
}

impl SpellCatalog {
    /// Collect the spells of every race, class and background subsection.
    pub fn extract(character: &Fields) -> Result<Self, SpellError> {
        let mut catalog = Self::default();
        for section in RECORD_SECTIONS {
            for subsection in mappings(character, section) {
                for spell in mappings(subsection, "spell") {
                    catalog.insert(SpellRecord::from_fields(spell)?);
                }
            }
        }
        debug!(spells = catalog.len(), "Extracted spell catalog");
        Ok(catalog)
    }

    pub fn insert(&mut self, spell: SpellRecord) {
        let entry = SpellEntry {
            card: crate::render::spell_card(&spell),
            spell,
        };
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.spell.name == entry.spell.name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SpellEntry> {
        self.entries.iter().find(|entry| entry.spell.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.spell.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All cards, separated by a blank line.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.card.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serialized as a name -> entry map, in catalog order.
impl Serialize for SpellCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|e| (&e.spell.name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spell_json;
    use serde_json::json;

    #[test]
    fn test_spell_level_order() {
        let levels: Vec<SpellLevel> = SpellLevel::all().collect();
        assert_eq!(levels.len(), 10);
        assert_eq!(levels[0], SpellLevel::Cantrip);
        assert!(SpellLevel::Cantrip < SpellLevel::Level(1));
        assert!(SpellLevel::Level(2) < SpellLevel::Level(9));
    }

    #[test]
    fn test_spell_level_labels() {
        assert_eq!(SpellLevel::from_field(None), SpellLevel::Cantrip);
        assert_eq!(SpellLevel::from_field(Some(0)), SpellLevel::Cantrip);
        assert_eq!(SpellLevel::from_field(Some(3)), SpellLevel::Level(3));
        assert_eq!(SpellLevel::Cantrip.to_string(), "cantrips");
        assert_eq!(SpellLevel::Level(3).to_string(), "3");
        assert_eq!(SpellLevel::Cantrip.card_label(), "cantrip");
        assert_eq!(
            serde_json::to_string(&SpellLevel::Level(4)).unwrap(),
            "\"4\""
        );
    }

    #[test]
    fn test_school_codes() {
        assert_eq!(SpellSchool::from_code("1").unwrap(), SpellSchool::Abjuration);
        assert_eq!(SpellSchool::from_code("5").unwrap(), SpellSchool::Evocation);
        assert_eq!(SpellSchool::from_code(" 8 ").unwrap(), SpellSchool::Transmutation);
        for bad in ["0", "9", "EV", ""] {
            assert!(matches!(
                SpellSchool::from_code(bad),
                Err(SpellError::InvalidSchool(_))
            ));
        }
    }

    #[test]
    fn test_components() {
        let spell = json!({"v": "1", "s": "0", "m": "1", "materials": "a bit of bat fur"});
        let components = Components::from_fields(spell.as_object().unwrap());
        assert!(components.verbal);
        assert!(!components.somatic);
        assert_eq!(components.letters(), "v,m");
        assert_eq!(components.materials.as_deref(), Some("a bit of bat fur"));

        let none = Components::from_fields(json!({}).as_object().unwrap());
        assert_eq!(none.letters(), "");
    }

    #[test]
    fn test_spell_record_requires_fields() {
        let mut spell = spell_json("Shield", Some(1), "1");
        spell.as_object_mut().unwrap().remove("range");
        let err = SpellRecord::from_fields(spell.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SpellError::Record(RecordError::MissingField { ref path }) if path == "range"
        ));

        let bad_school = spell_json("Shield", Some(1), "12");
        assert!(matches!(
            SpellRecord::from_fields(bad_school.as_object().unwrap()),
            Err(SpellError::InvalidSchool(_))
        ));
    }

    #[test]
    fn test_catalog_last_write_wins() {
        let mut first = spell_json("Light", None, "5");
        first["text"] = json!("From the race.");
        let mut second = spell_json("Light", None, "5");
        second["text"] = json!("From the class.");

        let character = json!({
            "race": {"name": "High Elf", "spell": first},
            "class": {"name": "Wizard", "spell": [spell_json("Magic Missile", Some(1), "5"), second]},
            "background": {"name": "Sage"}
        });
        let catalog = SpellCatalog::extract(character.as_object().unwrap()).unwrap();

        assert_eq!(catalog.names(), vec!["Light", "Magic Missile"]);
        assert_eq!(catalog.get("Light").unwrap().spell.text, "From the class.");
        assert!(catalog.get("Light").unwrap().card.ends_with("From the class.\n"));
    }

    #[test]
    fn test_catalog_empty_without_spells() {
        let character = json!({"race": {"name": "Human"}, "class": {"name": "Fighter"}});
        let catalog = SpellCatalog::extract(character.as_object().unwrap()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.to_text(), "");
    }

    #[test]
    fn test_catalog_serializes_as_map() {
        let character = json!({"class": {"name": "Wizard", "spell": spell_json("Fire Bolt", None, "5")}});
        let catalog = SpellCatalog::extract(character.as_object().unwrap()).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["Fire Bolt"]["spell"]["level"], json!("cantrips"));
        assert_eq!(value["Fire Bolt"]["spell"]["school"], json!("Evocation"));
    }
}
