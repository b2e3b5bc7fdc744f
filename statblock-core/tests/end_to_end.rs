//! End-to-end conversions of complete sheets.
//!
//! Fixtures under `tests/fixtures/` are JSON renditions of Fight Club
//! exports, shaped the way an XML-to-dict conversion lays them out.

use pretty_assertions::assert_eq;
use statblock_core::{
    convert, render_character, Ability, CharacterBuilder, CompendiumIndex, ConvertOptions,
    RawRecord, Skill,
};

fn compendium() -> CompendiumIndex {
    CompendiumIndex::from_json(include_str!("fixtures/compendium.json"))
        .expect("compendium fixture should parse")
}

fn fighter() -> RawRecord {
    RawRecord::from_json(include_str!("fixtures/fighter.json")).expect("fixture should parse")
}

fn wizard() -> RawRecord {
    RawRecord::from_json(include_str!("fixtures/wizard.json")).expect("fixture should parse")
}

#[test]
fn test_fighter_stat_block() {
    let block = render_character(&fighter(), &compendium()).expect("Should convert");

    assert!(block.contains(">|Score|16|12|13|10|15|8|\n"));
    assert!(block.contains("(prof +3)"));
    assert!(block.contains("> - **Armor Class** 11\n"));
    assert!(block.contains(">|Mod (ST)|+3(+6)|+1|+1(+4)|+0|+2|-1|\n"));
    assert!(block.contains("> - **Skills**: Athletics, Perception, Intimidation\n"));
    assert!(block.contains("> - **Unarmed Strike** +6 to hit, 4 damage"));
    assert!(!block.contains("Spells"));
    assert!(!block.contains("Damage Resistances"));
    assert!(block.starts_with("___\n> ## Brakka\n> *lv**5** Fighter* (prof +3)\n"));
    assert!(block.ends_with(">#### Actions\n> - **Unarmed Strike** +6 to hit, 4 damage\n>___\n"));
}

#[test]
fn test_fighter_model() {
    let record = fighter();
    let compendium = compendium();
    let model = CharacterBuilder::from_record(&record, &compendium)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(model.ability_scores.strength, 14);
    assert_eq!(model.ability_scores_modified.strength, 16);
    assert_eq!(model.saving_throw(Ability::Strength), 6);
    assert_eq!(model.saving_throw(Ability::Wisdom), 2);
    assert_eq!(
        model.skills,
        vec![Skill::Athletics, Skill::Perception, Skill::Intimidation]
    );
    assert!(model.feats.is_empty());
    assert!(model.weapons.is_empty());
    assert_eq!(model.spellcasting_ability_per_class, vec![None]);
    assert_eq!(model.spell_save_dc, None);
    assert_eq!(model.spell_attack_bonus, None);
}

#[test]
fn test_wizard_stat_block() {
    let block = render_character(&wizard(), &compendium()).expect("Should convert");
    assert_eq!(block, include_str!("fixtures/wizard_statblock.md"));
}

#[test]
fn test_record_wrappers_are_equivalent() {
    let full: serde_json::Value = serde_json::from_str(include_str!("fixtures/fighter.json")).unwrap();
    let bare = RawRecord::new(full["pc"]["character"].clone());
    let document = RawRecord::new(serde_json::json!({"character": full["pc"]["character"].clone()}));

    let expected = render_character(&fighter(), &compendium()).unwrap();
    assert_eq!(render_character(&bare, &compendium()).unwrap(), expected);
    assert_eq!(render_character(&document, &compendium()).unwrap(), expected);
}

#[test]
fn test_unwrapped_compendium() {
    let wrapped: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/compendium.json")).unwrap();
    let bare = CompendiumIndex::new(wrapped["compendium"].clone());

    let expected = render_character(&wizard(), &compendium()).unwrap();
    assert_eq!(render_character(&wizard(), &bare).unwrap(), expected);
}

#[test]
fn test_json_output() {
    let conversion = convert(&wizard(), &compendium(), ConvertOptions::new().with_spells(true))
        .expect("Should convert");
    let json = serde_json::to_value(&conversion).unwrap();

    assert_eq!(json["character"]["name"], "Mira Thistledown");
    assert_eq!(json["character"]["spell_save_dc"], 14);
    assert_eq!(json["character"]["saving_throws"]["intelligence"], 6);
    assert_eq!(json["character"]["spells_by_level"]["cantrips"][0], "Fire Bolt");
    assert_eq!(json["character"]["skills"][3], "History");
    assert!(json["spells"]["Fireball"]["card"]
        .as_str()
        .unwrap()
        .starts_with("#### Fireball\n*Level: 3 (Evocation)*"));

    let fighter = convert(&fighter(), &compendium(), ConvertOptions::new()).unwrap();
    let json = serde_json::to_value(&fighter).unwrap();
    assert!(json["character"]["spell_save_dc"].is_null());
    assert!(json.get("spells").is_none());
}
