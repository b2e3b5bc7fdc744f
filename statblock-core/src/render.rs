//! Homebrewery markdown rendering.
//!
//! Everything here is pure string formatting over values the rules have
//! already derived; no function in this module looks at the raw record.

use crate::ability::Ability;
use crate::character::{CharacterModel, UnarmedStrike, Weapon};
use crate::rules::SpellStatistics;
use crate::spells::{SpellLevel, SpellRecord};
use std::collections::BTreeMap;

/// A modifier with an explicit sign: "+2", "-1", "+0".
pub fn signed(value: i32) -> String {
    format!("{:+}", value)
}

/// Score row cells: the race-modified scores.
pub fn score_row(model: &CharacterModel) -> String {
    Ability::all()
        .into_iter()
        .map(|ability| model.ability_scores_modified.get(ability).to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Mod (ST) row cells: each modifier, followed by the save in parentheses
/// when proficiency makes it differ.
pub fn mod_save_row(model: &CharacterModel) -> String {
    Ability::all()
        .into_iter()
        .map(|ability| {
            let modifier = model.modifier(ability);
            let save = model.saving_throw(ability);
            if save == modifier {
                signed(modifier)
            } else {
                format!("{}({})", signed(modifier), signed(save))
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// The "Actions" section, without a trailing newline.
pub fn actions_block(unarmed: &UnarmedStrike, weapons: &[Weapon]) -> String {
    let mut lines = vec![
        ">#### Actions".to_string(),
        format!(
            "> - **Unarmed Strike** {} to hit, {} damage",
            signed(unarmed.to_hit),
            unarmed.damage
        ),
    ];
    for weapon in weapons {
        lines.push(format!(
            "> - **{}** {} + (str/dex) damage",
            weapon.name, weapon.damage
        ));
    }
    lines.join("\n")
}

/// The "Spells" section, or an empty string when nobody can cast.
///
/// Each class contributes its casting ability (or "-") to the header and
/// its slot count to every level line; a class with no slots at a level
/// shows 0.
pub fn spell_block(
    per_class: &[Option<Ability>],
    statistics: Option<&SpellStatistics>,
    spells_by_level: &BTreeMap<SpellLevel, Vec<String>>,
    slots_per_class: &[Vec<i32>],
) -> String {
    let Some(statistics) = statistics else {
        return String::new();
    };

    let abilities = per_class
        .iter()
        .map(|ability| ability.map_or("-", |a| a.key()))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![
        ">___".to_string(),
        ">#### Spells".to_string(),
        format!(
            "> *({}), DC *{}*, attack {}*",
            abilities,
            statistics.save_dc,
            signed(statistics.attack_bonus)
        ),
    ];

    for level in SpellLevel::all() {
        let Some(names) = spells_by_level.get(&level).filter(|names| !names.is_empty()) else {
            continue;
        };
        let label = match level {
            SpellLevel::Cantrip => level.to_string(),
            SpellLevel::Level(n) => {
                let slots = slots_per_class
                    .iter()
                    .map(|slots| {
                        usize::try_from(n)
                            .ok()
                            .and_then(|i| slots.get(i))
                            .copied()
                            .unwrap_or(0)
                            .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{} (*{}*)", n, slots)
            }
        };
        lines.push(format!("> - {}: {}", label, names.join(", ")));
    }

    lines.join("\n")
}

/// The complete character stat block.
pub fn stat_block(model: &CharacterModel) -> String {
    let classes = model
        .classes
        .iter()
        .map(|class| format!("lv**{}** {}", class.level, class.name))
        .collect::<Vec<_>>()
        .join("; ");

    let mut lines = vec![
        "___".to_string(),
        format!("> ## {}", model.name),
        format!("> *{}* (prof {})", classes, signed(model.proficiency_bonus)),
        ">___".to_string(),
        format!("> - **Armor Class** {}", model.armor_class),
        format!("> - **Hit Points** {}", model.hit_points),
        format!("> - **Speed** {} ft.", model.speed),
        ">___".to_string(),
        ">||STR|DEX|CON|INT|WIS|CHA|".to_string(),
        ">|:---:|:---:|:---:|:---:|:---:|:---:|:---:|".to_string(),
        format!(">|Score|{}|", score_row(model)),
        format!(">|Mod (ST)|{}|", mod_save_row(model)),
        ">___".to_string(),
        format!("> - **Skills**: {}", model.skill_names().join(", ")),
    ];
    if !model.resistances.is_empty() {
        lines.push(format!(
            "> - **Damage Resistances**: {}",
            model.resistances.join(", ")
        ));
    }
    if !model.save_advantages.is_empty() {
        lines.push(format!(
            "> - **Save Advantages**: {}",
            model.save_advantages.join(", ")
        ));
    }
    lines.push(format!(
        "> - **Senses**: passive Perception {}",
        model.passive_perception
    ));
    lines.push(format!("> - **Feats and Features**: {}", model.feats.join(", ")));
    lines.push(">___".to_string());
    lines.push(model.actions_block.clone());
    if !model.spell_block.is_empty() {
        lines.push(model.spell_block.clone());
    }
    lines.push(">___".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// A single spell card.
pub fn spell_card(spell: &SpellRecord) -> String {
    format!(
        "#### {name}\n\
         *Level: {level} ({school})*\n\
         ___\n\
         - **Casting Time:** {time}\n\
         - **Range:** {range}\n\
         - **Components:** {letters} ({materials})\n\
         - **Duration:** {duration}\n\
         \n\
         {text}\n",
        name = spell.name,
        level = spell.level.card_label(),
        school = spell.school,
        time = spell.casting_time,
        range = spell.range,
        letters = spell.components.letters(),
        materials = spell.components.materials.as_deref().unwrap_or("none"),
        duration = spell.duration,
        text = spell.text,
    )
}
