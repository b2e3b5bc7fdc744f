//! Derivation rules for Fight Club character sheets.
//!
//! Each function turns part of a raw record (plus the compendium where
//! needed) into one stat block number or list. They are pure; the
//! [`CharacterBuilder`](crate::character_builder::CharacterBuilder) calls
//! them in dependency order.

use crate::ability::{Ability, AbilityScores, Proficiency, Skill};
use crate::character::{ClassLevel, UnarmedStrike, Weapon};
use crate::record::{
    as_sequence, extract_resistance, extract_save_advantage, filter_by_field, mappings,
    optional_int, optional_text, parse_int, required_text, spellcasting_ability_line, text_of,
    CompendiumIndex, FieldMatch, Fields, RecordError,
};
use crate::spells::SpellLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from deriving character statistics.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Race not found in compendium: {0}")]
    RaceNotFound(String),

    #[error("Invalid racial ability bonus: {0:?}")]
    InvalidRacialBonus(String),

    #[error("Invalid ability scores: {0:?}")]
    InvalidAbilityScores(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Walking speed when the race does not say.
pub const DEFAULT_SPEED: u32 = 30;

/// Armor class before any armor is worn.
pub const UNARMORED_AC: i32 = 10;

/// Item `detail` values that count as worn armor.
pub const ARMOR_DETAILS: [&str; 4] = ["Light Armor", "Medium Armor", "Heavy Armor", "Shield"];

/// Sheet sections that carry features, proficiencies and spells.
pub const RECORD_SECTIONS: [&str; 3] = ["race", "class", "background"];

// ============================================================================
// Ability Scores
// ============================================================================

/// D&D 5e: score 8-9 = -1, 10-11 = 0, 12-13 = +1, etc.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Parse the sheet's `abilities` field ("15,14,13,12,10,8,").
///
/// Only the first six values are read.
pub fn parse_ability_scores(text: &str) -> Result<AbilityScores, RulesError> {
    let invalid = || RulesError::InvalidAbilityScores(text.to_string());
    let values: Vec<&str> = text.trim().split(',').map(str::trim).take(6).collect();
    if values.len() < 6 {
        return Err(invalid());
    }

    let mut scores = AbilityScores::default();
    for (ability, value) in Ability::all().into_iter().zip(values) {
        scores.set(ability, value.parse().map_err(|_| invalid())?);
    }
    Ok(scores)
}

/// Parse a compendium race's `ability` field ("Str 2, Cha 1").
pub fn parse_racial_bonuses(text: &str) -> Result<Vec<(Ability, i32)>, RulesError> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let invalid = || RulesError::InvalidRacialBonus(token.to_string());
            let mut parts = token.split_whitespace();
            let (Some(key), Some(bonus), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            let ability = Ability::from_key(key).ok_or_else(invalid)?;
            let bonus = bonus.parse::<i32>().map_err(|_| invalid())?;
            Ok((ability, bonus))
        })
        .collect()
}

/// Racial bonuses for the sheet's race, looked up by name prefix.
pub fn racial_bonuses(
    compendium: &CompendiumIndex,
    race_name: &str,
) -> Result<Vec<(Ability, i32)>, RulesError> {
    let race = compendium
        .find_race(race_name)
        .ok_or_else(|| RulesError::RaceNotFound(race_name.to_string()))?;

    match optional_text(race, "ability") {
        Some(text) => parse_racial_bonuses(&text),
        None => {
            debug!(race = race_name, "Compendium race grants no ability bonuses");
            Ok(Vec::new())
        }
    }
}

pub fn apply_racial_bonuses(base: &AbilityScores, bonuses: &[(Ability, i32)]) -> AbilityScores {
    let mut scores = *base;
    for &(ability, bonus) in bonuses {
        scores.set(ability, scores.get(ability) + bonus);
    }
    scores
}

// ============================================================================
// Levels
// ============================================================================

/// Class names and levels. A class without a `level` is level 1.
pub fn class_levels(classes: &[&Fields]) -> Result<Vec<ClassLevel>, RecordError> {
    classes
        .iter()
        .map(|class| {
            Ok(ClassLevel {
                name: required_text(class, "name")?,
                level: optional_int(class, "level")?.unwrap_or(1),
            })
        })
        .collect()
}

/// `ceil(total_levels / 4) + 1`, taken over all classes combined.
pub fn proficiency_bonus(total_levels: i32) -> i32 {
    (total_levels + 3).div_euclid(4) + 1
}

// ============================================================================
// Proficiencies and Saves
// ============================================================================

/// Everything found by walking the race, class and background sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProficiencyScan {
    /// Saving throw proficiencies (ability codes).
    pub saves: Vec<Ability>,
    /// Skill proficiencies, first-seen order.
    pub skills: Vec<Skill>,
    /// Damage types from "resistance against X damage" features.
    pub resistances: Vec<String>,
    /// Subjects of "saving throws against X" features.
    pub save_advantages: Vec<String>,
}

impl ProficiencyScan {
    fn add(&mut self, proficiency: Proficiency) {
        match proficiency {
            Proficiency::Save(ability) => push_unique(&mut self.saves, ability),
            Proficiency::Skill(skill) => push_unique(&mut self.skills, skill),
        }
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Collect proficiencies, resistances and save advantages from every
/// subsection of the race, class and background sections.
pub fn scan_proficiencies(character: &Fields) -> Result<ProficiencyScan, RecordError> {
    let mut scan = ProficiencyScan::default();

    for section in RECORD_SECTIONS {
        for subsection in mappings(character, section) {
            for feat in mappings(subsection, "feat") {
                let Some(text) = optional_text(feat, "text") else {
                    continue;
                };
                if let Some(damage) = extract_resistance(&text).map(str::trim) {
                    if !damage.is_empty() {
                        push_unique(&mut scan.resistances, damage.to_string());
                    }
                }
                if let Some(against) = extract_save_advantage(&text).map(str::trim) {
                    if !against.is_empty() {
                        push_unique(&mut scan.save_advantages, against.to_string());
                    }
                }
            }

            for code in as_sequence(subsection.get("proficiency")) {
                let Some(code) = text_of(code) else {
                    continue;
                };
                let code = parse_int(&format!("{section}.proficiency"), &code)?;
                scan.add(Proficiency::from_code(code)?);
            }
        }
    }

    Ok(scan)
}

/// Save modifier per ability; proficient saves add the proficiency bonus.
pub fn saving_throws(
    scores: &AbilityScores,
    proficient: &[Ability],
    proficiency_bonus: i32,
) -> BTreeMap<Ability, i32> {
    Ability::all()
        .into_iter()
        .map(|ability| {
            let bonus = if proficient.contains(&ability) {
                proficiency_bonus
            } else {
                0
            };
            (ability, scores.modifier(ability) + bonus)
        })
        .collect()
}

// ============================================================================
// Defense and Senses
// ============================================================================

/// Armor class from worn items.
///
/// A shield adds its AC to the running base; any other armor replaces the
/// base, so with two body armors the last one listed wins. Dexterity is
/// taken from the score as recorded, before racial bonuses.
pub fn armor_class(items: &[&Fields], base_dexterity: i32) -> i32 {
    let armors = filter_by_field(items, "detail", FieldMatch::OneOf(&ARMOR_DETAILS));
    if armors.is_empty() {
        debug!("No armor detected");
    }

    let mut base = UNARMORED_AC;
    for armor in armors {
        let ac = match optional_int(armor, "ac") {
            Ok(Some(ac)) => ac,
            Ok(None) | Err(_) => {
                let name = optional_text(armor, "name").unwrap_or_default();
                warn!(item = %name, "Armor has no usable AC, ignoring it");
                continue;
            }
        };
        if optional_text(armor, "detail").as_deref() == Some("Shield") {
            base += ac;
        } else {
            base = ac;
        }
    }

    base + ability_modifier(base_dexterity)
}

pub fn passive_perception(scores: &AbilityScores) -> i32 {
    10 + scores.modifier(Ability::Wisdom)
}

/// Walking speed from the sheet's race section.
pub fn speed(race: &Fields) -> u32 {
    match optional_text(race, "speed") {
        Some(text) => text.trim().parse().unwrap_or_else(|_| {
            warn!(speed = %text, "Unreadable race speed, using {DEFAULT_SPEED}");
            DEFAULT_SPEED
        }),
        None => {
            debug!("Race has no speed, using {DEFAULT_SPEED}");
            DEFAULT_SPEED
        }
    }
}

// ============================================================================
// Spellcasting
// ============================================================================

/// Save DC and attack bonus shared by all of a character's spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellStatistics {
    pub ability: Ability,
    pub save_dc: i32,
    pub attack_bonus: i32,
}

/// The ability a class casts with, read from its "Spellcasting" feature.
///
/// Returns `None` for classes without the feature, and for features whose
/// text does not name an ability before "is your spellcasting ability".
pub fn spellcasting_ability(class: &Fields) -> Option<Ability> {
    let class_name = optional_text(class, "name").unwrap_or_default();
    let Some(feature) = mappings(class, "feat")
        .into_iter()
        .find(|feat| optional_text(feat, "name").as_deref() == Some("Spellcasting"))
    else {
        debug!(class = %class_name, "Class has no Spellcasting feature");
        return None;
    };

    let text = optional_text(feature, "text").unwrap_or_default();
    let key: String = spellcasting_ability_line(&text)
        .map(|line| line.to_lowercase().chars().take(3).collect())
        .unwrap_or_default();
    let ability = Ability::from_key(&key);
    if ability.is_none() {
        warn!(class = %class_name, "Spellcasting feature does not name an ability");
    }
    ability
}

/// DC and attack bonus from the first class that can cast.
pub fn spell_statistics(
    per_class: &[Option<Ability>],
    scores: &AbilityScores,
    proficiency_bonus: i32,
) -> Option<SpellStatistics> {
    let ability = per_class.iter().flatten().next().copied()?;
    let save_dc = 8 + proficiency_bonus + scores.modifier(ability);
    Some(SpellStatistics {
        ability,
        save_dc,
        attack_bonus: save_dc - 8,
    })
}

/// Class spell names bucketed by level; spells without a level are cantrips.
pub fn spells_by_level(
    classes: &[&Fields],
) -> Result<BTreeMap<SpellLevel, Vec<String>>, RecordError> {
    let mut buckets: BTreeMap<SpellLevel, Vec<String>> = BTreeMap::new();
    for class in classes {
        for spell in mappings(class, "spell") {
            let name = required_text(spell, "name")?;
            let level = SpellLevel::from_field(optional_int(spell, "level")?);
            buckets.entry(level).or_default().push(name);
        }
    }
    Ok(buckets)
}

/// A class's `slots` field ("2,3,0") as counts indexed by spell level.
pub fn spell_slots(class: &Fields) -> Result<Vec<i32>, RecordError> {
    let Some(text) = optional_text(class, "slots") else {
        return Ok(Vec::new());
    };
    text.split(',')
        .map(str::trim)
        .filter(|count| !count.is_empty())
        .map(|count| parse_int("slots", count))
        .collect()
}

// ============================================================================
// Actions
// ============================================================================

pub fn unarmed_strike(scores: &AbilityScores, proficiency_bonus: i32) -> UnarmedStrike {
    let str_mod = scores.modifier(Ability::Strength);
    UnarmedStrike {
        to_hit: str_mod + proficiency_bonus,
        damage: 1 + str_mod,
    }
}

/// Items tagged with a `weaponProperty`, with their one-handed damage.
pub fn weapons(items: &[&Fields]) -> Vec<Weapon> {
    filter_by_field(items, "weaponProperty", FieldMatch::Present)
        .into_iter()
        .filter_map(|item| {
            let name = optional_text(item, "name")?;
            let damage = optional_text(item, "damage1H").or_else(|| optional_text(item, "damage2H"));
            if damage.is_none() {
                warn!(weapon = %name, "Weapon has no damage, leaving it out of actions");
            }
            Some(Weapon {
                name,
                damage: damage?,
            })
        })
        .collect()
}
