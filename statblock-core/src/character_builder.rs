//! Staged construction of a [`CharacterModel`] from a raw record.
//!
//! Later stages read values earlier stages produced, so [`CharacterBuilder::build`]
//! runs them in a fixed order:
//!
//! 1. identity: name, race, classes, hit points, feats
//! 2. abilities: base and race-modified scores, proficiency bonus
//! 3. proficiencies: save and skill codes, resistances, save advantages
//! 4. defenses: saving throws, armor class, passive perception, speed
//! 5. spellcasting: casting ability per class, DC and attack, spells, slots
//! 6. actions: unarmed strike and weapons
//! 7. rendering of the actions and spells fragments
//!
//! Each stage takes the outputs it depends on as arguments, so a stage
//! cannot run before the data it needs exists.

use crate::ability::{Ability, AbilityScores};
use crate::character::{CharacterModel, ClassLevel, UnarmedStrike, Weapon};
use crate::record::{
    mappings, optional_text, required_text, CompendiumIndex, Fields, RawRecord, RecordError,
};
use crate::render;
use crate::rules::{self, ProficiencyScan, RulesError, SpellStatistics};
use crate::spells::SpellLevel;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a [`CharacterModel`] from one character record.
#[derive(Debug, Clone, Copy)]
pub struct CharacterBuilder<'a> {
    character: &'a Fields,
    compendium: &'a CompendiumIndex,
}

struct Identity<'a> {
    name: String,
    race_name: String,
    race: &'a Fields,
    classes: Vec<&'a Fields>,
    class_levels: Vec<ClassLevel>,
    hit_points: String,
    feats: Vec<String>,
}

struct Abilities {
    base: AbilityScores,
    modified: AbilityScores,
    proficiency_bonus: i32,
}

struct Defenses {
    saving_throws: BTreeMap<Ability, i32>,
    armor_class: i32,
    passive_perception: i32,
    speed: u32,
}

struct Spellcasting {
    per_class: Vec<Option<Ability>>,
    statistics: Option<SpellStatistics>,
    spells_by_level: BTreeMap<SpellLevel, Vec<String>>,
    slots_per_class: Vec<Vec<i32>>,
}

struct Actions {
    unarmed_strike: UnarmedStrike,
    weapons: Vec<Weapon>,
}

impl<'a> CharacterBuilder<'a> {
    /// Start from the `character` mapping itself.
    pub fn new(character: &'a Fields, compendium: &'a CompendiumIndex) -> Self {
        Self {
            character,
            compendium,
        }
    }

    /// Start from a whole record document.
    pub fn from_record(
        record: &'a RawRecord,
        compendium: &'a CompendiumIndex,
    ) -> Result<Self, RecordError> {
        Ok(Self::new(record.character()?, compendium))
    }

    /// Run every stage and assemble the model.
    pub fn build(self) -> Result<CharacterModel, RulesError> {
        let identity = self.identity()?;
        debug!(name = %identity.name, race = %identity.race_name, "Building character");

        let abilities = self.abilities(&identity)?;
        let scan = rules::scan_proficiencies(self.character)?;
        let defenses = self.defenses(&identity, &abilities, &scan);
        let spellcasting = Self::spellcasting(&identity, &abilities)?;
        let actions = self.actions(&abilities);

        let actions_block = render::actions_block(&actions.unarmed_strike, &actions.weapons);
        let spell_block = render::spell_block(
            &spellcasting.per_class,
            spellcasting.statistics.as_ref(),
            &spellcasting.spells_by_level,
            &spellcasting.slots_per_class,
        );

        Ok(CharacterModel {
            name: identity.name,
            race: identity.race_name,
            classes: identity.class_levels,
            hit_points: identity.hit_points,
            ability_scores: abilities.base,
            ability_scores_modified: abilities.modified,
            proficiency_bonus: abilities.proficiency_bonus,
            saving_throws: defenses.saving_throws,
            armor_class: defenses.armor_class,
            passive_perception: defenses.passive_perception,
            speed: defenses.speed,
            skills: scan.skills,
            resistances: scan.resistances,
            save_advantages: scan.save_advantages,
            feats: identity.feats,
            spellcasting_ability_per_class: spellcasting.per_class,
            spell_save_dc: spellcasting.statistics.map(|s| s.save_dc),
            spell_attack_bonus: spellcasting.statistics.map(|s| s.attack_bonus),
            spells_by_level: spellcasting.spells_by_level,
            spell_slots_per_class: spellcasting.slots_per_class,
            unarmed_strike: actions.unarmed_strike,
            weapons: actions.weapons,
            actions_block,
            spell_block,
        })
    }

    /// Stage 1. Needs only the record.
    fn identity(&self) -> Result<Identity<'a>, RulesError> {
        let race = mappings(self.character, "race")
            .into_iter()
            .next()
            .ok_or_else(|| RecordError::MissingField {
                path: "race".to_string(),
            })?;
        let classes = mappings(self.character, "class");
        let class_levels = rules::class_levels(&classes)?;

        let feats: Vec<String> = mappings(self.character, "feat")
            .into_iter()
            .filter_map(|feat| optional_text(feat, "name"))
            .collect();
        if feats.is_empty() {
            debug!("Record has no top-level feats");
        }

        Ok(Identity {
            name: required_text(self.character, "name")?,
            race_name: required_text(race, "name")?,
            race,
            classes,
            class_levels,
            hit_points: required_text(self.character, "hpMax")?,
            feats,
        })
    }

    /// Stage 2. Needs the race name (for the compendium lookup) and the
    /// class levels.
    fn abilities(&self, identity: &Identity<'_>) -> Result<Abilities, RulesError> {
        let base = rules::parse_ability_scores(&required_text(self.character, "abilities")?)?;
        let bonuses = rules::racial_bonuses(self.compendium, &identity.race_name)?;
        let total_level: i32 = identity.class_levels.iter().map(|c| c.level).sum();

        Ok(Abilities {
            base,
            modified: rules::apply_racial_bonuses(&base, &bonuses),
            proficiency_bonus: rules::proficiency_bonus(total_level),
        })
    }

    /// Stage 4. Needs modified scores, the proficiency bonus and the save
    /// proficiencies found by the scan. Armor uses the base dexterity.
    fn defenses(
        &self,
        identity: &Identity<'_>,
        abilities: &Abilities,
        scan: &ProficiencyScan,
    ) -> Defenses {
        let items = mappings(self.character, "item");
        Defenses {
            saving_throws: rules::saving_throws(
                &abilities.modified,
                &scan.saves,
                abilities.proficiency_bonus,
            ),
            armor_class: rules::armor_class(&items, abilities.base.dexterity),
            passive_perception: rules::passive_perception(&abilities.modified),
            speed: rules::speed(identity.race),
        }
    }

    /// Stage 5. Needs the class list, modified scores and proficiency bonus.
    fn spellcasting(
        identity: &Identity<'_>,
        abilities: &Abilities,
    ) -> Result<Spellcasting, RulesError> {
        let per_class: Vec<Option<Ability>> = identity
            .classes
            .iter()
            .map(|class| rules::spellcasting_ability(class))
            .collect();
        let statistics = rules::spell_statistics(
            &per_class,
            &abilities.modified,
            abilities.proficiency_bonus,
        );
        let slots_per_class = identity
            .classes
            .iter()
            .map(|class| rules::spell_slots(class))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Spellcasting {
            per_class,
            statistics,
            spells_by_level: rules::spells_by_level(&identity.classes)?,
            slots_per_class,
        })
    }

    /// Stage 6. Needs modified strength and the proficiency bonus.
    fn actions(&self, abilities: &Abilities) -> Actions {
        let items = mappings(self.character, "item");
        Actions {
            unarmed_strike: rules::unarmed_strike(
                &abilities.modified,
                abilities.proficiency_bonus,
            ),
            weapons: rules::weapons(&items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Skill;
    use crate::testing::{armor_item, compendium, weapon_item, RecordFixture, SectionFixture};

    #[test]
    fn test_build_fighter() {
        let record = RecordFixture::new("Thorin")
            .race(SectionFixture::new("Dwarf").speed("25").proficiency(111))
            .class(SectionFixture::new("Fighter").level(3).proficiency(0).proficiency(2))
            .abilities("15,12,14,10,13,8")
            .item(armor_item("Chain Mail", "Heavy Armor", 16))
            .item(weapon_item("Battleaxe", "1d8"))
            .feat("Tough")
            .hp_max("31")
            .build();
        let compendium = compendium(&[("Dwarf, Hill", Some("Con 2, Wis 1"))]);

        let model = CharacterBuilder::from_record(&record, &compendium)
            .unwrap()
            .build()
            .expect("Should build successfully");

        assert_eq!(model.name, "Thorin");
        assert_eq!(model.race, "Dwarf");
        assert_eq!(model.ability_scores.constitution, 14);
        assert_eq!(model.ability_scores_modified.constitution, 16);
        assert_eq!(model.ability_scores_modified.wisdom, 14);
        assert_eq!(model.proficiency_bonus, 2);
        assert_eq!(model.saving_throws[&Ability::Strength], 4);
        assert_eq!(model.saving_throws[&Ability::Constitution], 5);
        assert_eq!(model.saving_throws[&Ability::Dexterity], 1);
        assert_eq!(model.armor_class, 17);
        assert_eq!(model.passive_perception, 12);
        assert_eq!(model.speed, 25);
        assert_eq!(model.skills, vec![Skill::Perception]);
        assert_eq!(model.feats, vec!["Tough"]);
        assert_eq!(model.hit_points, "31");
        assert_eq!(model.weapons.len(), 1);
        assert!(!model.can_cast());
        assert_eq!(model.spell_save_dc, None);
        assert!(model.spell_block.is_empty());
    }

    #[test]
    fn test_proficiency_uses_total_level() {
        let record = RecordFixture::new("Multi")
            .class(SectionFixture::new("Fighter").level(3))
            .class(SectionFixture::new("Rogue").level(2))
            .class(SectionFixture::new("Monk"))
            .build();
        let model = CharacterBuilder::from_record(&record, &compendium(&[("Human", None)]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(model.total_level(), 6);
        assert_eq!(model.proficiency_bonus, 3);
        assert_eq!(model.classes[2].level, 1);
    }

    #[test]
    fn test_armor_uses_base_dexterity() {
        let record = RecordFixture::new("Quick")
            .abilities("10,13,10,10,10,10")
            .build();
        let compendium = compendium(&[("Human", Some("Dex 1"))]);
        let model = CharacterBuilder::from_record(&record, &compendium)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(model.ability_scores_modified.dexterity, 14);
        // base dex 13 gives +1, the racial bonus is not counted
        assert_eq!(model.armor_class, 11);
    }

    #[test]
    fn test_unknown_race_is_fatal() {
        let record = RecordFixture::new("Lost")
            .race(SectionFixture::new("Tabaxi"))
            .build();
        let result = CharacterBuilder::from_record(&record, &compendium(&[("Human", None)]))
            .unwrap()
            .build();
        assert!(matches!(result, Err(RulesError::RaceNotFound(_))));
    }

    #[test]
    fn test_missing_hp_is_fatal() {
        let mut json = RecordFixture::new("Fragile").to_json();
        json["pc"]["character"].as_object_mut().unwrap().remove("hpMax");
        let record = RawRecord::new(json);
        let result = CharacterBuilder::from_record(&record, &compendium(&[("Human", None)]))
            .unwrap()
            .build();
        assert!(matches!(
            result,
            Err(RulesError::Record(RecordError::MissingField { ref path })) if path == "hpMax"
        ));
    }

    #[test]
    fn test_caster_statistics() {
        let record = RecordFixture::new("Elminster")
            .class(SectionFixture::new("Fighter").level(1))
            .class(
                SectionFixture::new("Wizard")
                    .level(4)
                    .spellcasting("Intelligence")
                    .spell(crate::testing::spell_json("Fire Bolt", None, "5"))
                    .spell(crate::testing::spell_json("Shield", Some(1), "1"))
                    .slots("3,4,2"),
            )
            .abilities("8,14,12,16,12,10")
            .build();
        let compendium = compendium(&[("Human", Some("Int 1"))]);
        let model = CharacterBuilder::from_record(&record, &compendium)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            model.spellcasting_ability_per_class,
            vec![None, Some(Ability::Intelligence)]
        );
        // prof +3 (level 5), int 17 -> +3
        assert_eq!(model.spell_save_dc, Some(14));
        assert_eq!(model.spell_attack_bonus, Some(6));
        assert_eq!(model.spell_slots_per_class, vec![vec![], vec![3, 4, 2]]);
        assert_eq!(model.slots_at(1), vec![0, 4]);
        assert_eq!(model.spells_by_level[&SpellLevel::Cantrip], vec!["Fire Bolt"]);
        assert!(model.spell_block.contains("> - 1 (*0,4*): Shield"));
    }
}
