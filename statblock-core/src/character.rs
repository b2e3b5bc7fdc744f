//! The derived character model.
//!
//! A [`CharacterModel`] holds everything a stat block shows, computed once
//! from a raw record by the
//! [`CharacterBuilder`](crate::character_builder::CharacterBuilder). It is
//! never mutated afterwards; a new render means a new model.

use crate::ability::{Ability, AbilityScores, Skill};
use crate::spells::SpellLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One class entry of the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevel {
    pub name: String,
    pub level: i32,
}

/// A weapon as listed under actions. The damage string is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: String,
}

/// The always-available unarmed attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnarmedStrike {
    pub to_hit: i32,
    pub damage: i32,
}

/// Fully derived character, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterModel {
    pub name: String,
    pub race: String,
    pub classes: Vec<ClassLevel>,
    /// `hpMax` as written on the sheet.
    pub hit_points: String,

    /// Scores as recorded, before racial bonuses.
    pub ability_scores: AbilityScores,
    /// Scores after racial bonuses.
    pub ability_scores_modified: AbilityScores,
    pub proficiency_bonus: i32,
    pub saving_throws: BTreeMap<Ability, i32>,

    pub armor_class: i32,
    pub passive_perception: i32,
    pub speed: u32,

    pub skills: Vec<Skill>,
    pub resistances: Vec<String>,
    pub save_advantages: Vec<String>,
    pub feats: Vec<String>,

    /// One entry per class, `None` for classes that cannot cast.
    pub spellcasting_ability_per_class: Vec<Option<Ability>>,
    pub spell_save_dc: Option<i32>,
    pub spell_attack_bonus: Option<i32>,
    pub spells_by_level: BTreeMap<SpellLevel, Vec<String>>,
    /// One slot table per class, indexed by spell level.
    pub spell_slots_per_class: Vec<Vec<i32>>,

    pub unarmed_strike: UnarmedStrike,
    pub weapons: Vec<Weapon>,

    pub actions_block: String,
    pub spell_block: String,
}

impl CharacterModel {
    pub fn total_level(&self) -> i32 {
        self.classes.iter().map(|c| c.level).sum()
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.ability_scores_modified.modifier(ability)
    }

    pub fn saving_throw(&self, ability: Ability) -> i32 {
        self.saving_throws
            .get(&ability)
            .copied()
            .unwrap_or_else(|| self.modifier(ability))
    }

    pub fn can_cast(&self) -> bool {
        self.spell_save_dc.is_some()
    }

    /// Skill names, in the order they were first granted.
    pub fn skill_names(&self) -> Vec<&'static str> {
        self.skills.iter().map(Skill::name).collect()
    }

    /// Slot count for `level` in each class (0 where a class has none).
    pub fn slots_at(&self, level: usize) -> Vec<i32> {
        self.spell_slots_per_class
            .iter()
            .map(|slots| slots.get(level).copied().unwrap_or(0))
            .collect()
    }
}
