//! Ability scores, skills and proficiency codes.
//!
//! Fight Club sheets store every proficiency as a bare integer. Codes below
//! 100 name an ability (a saving throw proficiency), codes from 100 up index
//! the skill table. [`Proficiency::from_code`] decodes both into one tagged
//! value so the numeric ranges only appear here.

use crate::record::RecordError;
use crate::rules::ability_modifier;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores, in sheet order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// Lowercase three-letter key used by the record and the compendium.
    pub fn key(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    /// Position in the sheet order (`abilities` field, proficiency codes 0-5).
    pub fn from_index(index: usize) -> Option<Ability> {
        Ability::all().get(index).copied()
    }

    /// Look up an ability by its three-letter key, ignoring case.
    pub fn from_key(key: &str) -> Option<Ability> {
        let key = key.trim().to_lowercase();
        Ability::all().into_iter().find(|a| a.key() == key)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Skills
// ============================================================================

/// D&D 5e skills, in the order of the sheet's proficiency code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub fn all() -> [Skill; 18] {
        [
            Skill::Acrobatics,
            Skill::AnimalHandling,
            Skill::Arcana,
            Skill::Athletics,
            Skill::Deception,
            Skill::History,
            Skill::Insight,
            Skill::Intimidation,
            Skill::Investigation,
            Skill::Medicine,
            Skill::Nature,
            Skill::Perception,
            Skill::Performance,
            Skill::Persuasion,
            Skill::Religion,
            Skill::SleightOfHand,
            Skill::Stealth,
            Skill::Survival,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Proficiency Codes
// ============================================================================

/// First code of the skill table.
pub const SKILL_CODE_BASE: i32 = 100;

/// A decoded proficiency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Proficiency {
    /// Codes 0-5: proficiency in that ability's saving throw.
    Save(Ability),
    /// Codes 100-117: proficiency in a skill.
    Skill(Skill),
}

impl Proficiency {
    /// Decode a sheet proficiency code.
    pub fn from_code(code: i32) -> Result<Self, RecordError> {
        let decoded = if code >= SKILL_CODE_BASE {
            usize::try_from(code - SKILL_CODE_BASE)
                .ok()
                .and_then(|i| Skill::all().get(i).copied())
                .map(Proficiency::Skill)
        } else {
            usize::try_from(code)
                .ok()
                .and_then(Ability::from_index)
                .map(Proficiency::Save)
        };
        decoded.ok_or(RecordError::InvalidProficiency(code))
    }

    /// The label the sheet shows: the ability key or the skill name.
    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Save(ability) => ability.key(),
            Proficiency::Skill(skill) => skill.name(),
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier() {
        let scores = AbilityScores::new(16, 14, 12, 10, 8, 6);
        assert_eq!(scores.modifier(Ability::Strength), 3);
        assert_eq!(scores.modifier(Ability::Dexterity), 2);
        assert_eq!(scores.modifier(Ability::Constitution), 1);
        assert_eq!(scores.modifier(Ability::Intelligence), 0);
        assert_eq!(scores.modifier(Ability::Wisdom), -1);
        assert_eq!(scores.modifier(Ability::Charisma), -2);

        // Odd scores below 10 must floor, not truncate
        let odd_scores = AbilityScores::new(9, 7, 5, 11, 13, 15);
        assert_eq!(odd_scores.modifier(Ability::Strength), -1);
        assert_eq!(odd_scores.modifier(Ability::Dexterity), -2);
        assert_eq!(odd_scores.modifier(Ability::Constitution), -3);
        assert_eq!(odd_scores.modifier(Ability::Intelligence), 0);
        assert_eq!(odd_scores.modifier(Ability::Wisdom), 1);
        assert_eq!(odd_scores.modifier(Ability::Charisma), 2);
    }

    #[test]
    fn test_ability_keys() {
        assert_eq!(Ability::from_key("STR"), Some(Ability::Strength));
        assert_eq!(Ability::from_key(" wis "), Some(Ability::Wisdom));
        assert_eq!(Ability::from_key("luck"), None);
        assert_eq!(Ability::from_index(5), Some(Ability::Charisma));
        assert_eq!(Ability::from_index(6), None);
    }

    #[test]
    fn test_save_codes() {
        for (code, ability) in Ability::all().into_iter().enumerate() {
            let proficiency = Proficiency::from_code(code as i32).unwrap();
            assert_eq!(proficiency, Proficiency::Save(ability));
            assert_eq!(proficiency.label(), ability.key());
        }
    }

    #[test]
    fn test_skill_codes() {
        assert_eq!(
            Proficiency::from_code(100).unwrap(),
            Proficiency::Skill(Skill::Acrobatics)
        );
        assert_eq!(
            Proficiency::from_code(111).unwrap().label(),
            "Perception"
        );
        assert_eq!(
            Proficiency::from_code(115).unwrap().label(),
            "Sleight of Hand"
        );
        assert_eq!(
            Proficiency::from_code(117).unwrap(),
            Proficiency::Skill(Skill::Survival)
        );
    }

    #[test]
    fn test_invalid_codes() {
        for code in [-1, 6, 42, 99, 118, 500] {
            assert!(matches!(
                Proficiency::from_code(code),
                Err(RecordError::InvalidProficiency(c)) if c == code
            ));
        }
    }
}
