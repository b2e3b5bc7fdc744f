//! Testing utilities for building character records.
//!
//! Records are assembled the way the XML deserializer lays them out: a
//! repeated element with a single occurrence becomes a plain mapping, two or
//! more become a list, and every leaf is a string. Tests built on these
//! fixtures therefore exercise the single-vs-list handling for free.

use crate::record::{CompendiumIndex, RawRecord};
use serde_json::{json, Map, Value};

/// One occurrence becomes the value itself, more become a list.
fn xml_children(mut values: Vec<Value>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Array(values)),
    }
}

fn insert_children(map: &mut Map<String, Value>, key: &str, values: Vec<Value>) {
    if let Some(children) = xml_children(values) {
        map.insert(key.to_string(), children);
    }
}

/// A race, class or background subsection.
#[derive(Debug, Clone, Default)]
pub struct SectionFixture {
    name: String,
    level: Option<i32>,
    speed: Option<String>,
    slots: Option<String>,
    feats: Vec<Value>,
    proficiencies: Vec<i32>,
    spells: Vec<Value>,
}

impl SectionFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn speed(mut self, speed: impl Into<String>) -> Self {
        self.speed = Some(speed.into());
        self
    }

    pub fn slots(mut self, slots: impl Into<String>) -> Self {
        self.slots = Some(slots.into());
        self
    }

    pub fn feat(mut self, name: &str, text: &str) -> Self {
        self.feats.push(json!({"name": name, "text": text}));
        self
    }

    /// Add a "Spellcasting" feature naming `ability` the way sheets do.
    pub fn spellcasting(mut self, ability: &str) -> Self {
        self.feats.push(json!({
            "name": "Spellcasting",
            "text": [
                "You have learned to cast spells.",
                null,
                "Spellcasting Ability:",
                format!("{ability} is your spellcasting ability for your spells.")
            ]
        }));
        self
    }

    pub fn proficiency(mut self, code: i32) -> Self {
        self.proficiencies.push(code);
        self
    }

    pub fn spell(mut self, spell: Value) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), json!(self.name));
        if let Some(level) = self.level {
            map.insert("level".to_string(), json!(level.to_string()));
        }
        if let Some(speed) = &self.speed {
            map.insert("speed".to_string(), json!(speed));
        }
        if let Some(slots) = &self.slots {
            map.insert("slots".to_string(), json!(slots));
        }
        insert_children(&mut map, "feat", self.feats.clone());
        insert_children(
            &mut map,
            "proficiency",
            self.proficiencies
                .iter()
                .map(|code| json!(code.to_string()))
                .collect(),
        );
        insert_children(&mut map, "spell", self.spells.clone());
        Value::Object(map)
    }
}

/// Builder for a complete `{"pc": {"character": ...}}` record.
#[derive(Debug, Clone)]
pub struct RecordFixture {
    name: String,
    race: SectionFixture,
    classes: Vec<SectionFixture>,
    backgrounds: Vec<SectionFixture>,
    abilities: String,
    hp_max: String,
    items: Vec<Value>,
    feats: Vec<Value>,
}

impl RecordFixture {
    /// A level 1 human fighter with all scores at 10.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            race: SectionFixture::new("Human"),
            classes: Vec::new(),
            backgrounds: Vec::new(),
            abilities: "10,10,10,10,10,10,".to_string(),
            hp_max: "10".to_string(),
            items: Vec::new(),
            feats: Vec::new(),
        }
    }

    pub fn race(mut self, race: SectionFixture) -> Self {
        self.race = race;
        self
    }

    pub fn class(mut self, class: SectionFixture) -> Self {
        self.classes.push(class);
        self
    }

    pub fn background(mut self, background: SectionFixture) -> Self {
        self.backgrounds.push(background);
        self
    }

    pub fn abilities(mut self, abilities: impl Into<String>) -> Self {
        self.abilities = abilities.into();
        self
    }

    pub fn hp_max(mut self, hp: impl Into<String>) -> Self {
        self.hp_max = hp.into();
        self
    }

    pub fn item(mut self, item: Value) -> Self {
        self.items.push(item);
        self
    }

    pub fn feat(mut self, name: &str) -> Self {
        self.feats.push(json!({"name": name, "text": ""}));
        self
    }

    pub fn to_json(&self) -> Value {
        let classes = if self.classes.is_empty() {
            vec![SectionFixture::new("Fighter").level(1).to_json()]
        } else {
            self.classes.iter().map(SectionFixture::to_json).collect()
        };

        let mut character = Map::new();
        character.insert("name".to_string(), json!(self.name));
        character.insert("race".to_string(), self.race.to_json());
        insert_children(&mut character, "class", classes);
        insert_children(
            &mut character,
            "background",
            self.backgrounds.iter().map(SectionFixture::to_json).collect(),
        );
        character.insert("abilities".to_string(), json!(self.abilities));
        character.insert("hpMax".to_string(), json!(self.hp_max));
        insert_children(&mut character, "item", self.items.clone());
        insert_children(&mut character, "feat", self.feats.clone());

        json!({"pc": {"character": Value::Object(character)}})
    }

    pub fn build(&self) -> RawRecord {
        RawRecord::new(self.to_json())
    }
}

/// A spell entry with every required field filled in.
pub fn spell_json(name: &str, level: Option<i32>, school: &str) -> Value {
    let mut spell = json!({
        "name": name,
        "school": school,
        "time": "1 action",
        "range": "60 feet",
        "v": "1",
        "s": "1",
        "duration": "Instantaneous",
        "text": format!("{name} takes effect."),
    });
    if let Some(level) = level {
        spell["level"] = json!(level.to_string());
    }
    spell
}

pub fn armor_item(name: &str, detail: &str, ac: i32) -> Value {
    json!({"name": name, "detail": detail, "ac": ac.to_string()})
}

pub fn weapon_item(name: &str, damage: &str) -> Value {
    json!({"name": name, "weaponProperty": "V", "damage1H": damage})
}

/// A compendium holding the given races as `(name, ability)` pairs.
pub fn compendium(races: &[(&str, Option<&str>)]) -> CompendiumIndex {
    let races: Vec<Value> = races
        .iter()
        .map(|(name, ability)| match ability {
            Some(ability) => json!({"name": name, "ability": ability}),
            None => json!({"name": name}),
        })
        .collect();
    CompendiumIndex::new(json!({"compendium": {"race": xml_children(races)}}))
}
