//! One-call conversion from a record to rendered text.

use crate::character::CharacterModel;
use crate::character_builder::CharacterBuilder;
use crate::record::{CompendiumIndex, RawRecord, RecordError};
use crate::render;
use crate::rules::RulesError;
use crate::spells::{SpellCatalog, SpellError};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors from a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Spell error: {0}")]
    Spell(#[from] SpellError),
}

/// What a conversion should produce besides the stat block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Also extract and render the spell catalog.
    pub include_spells: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spells(mut self, include: bool) -> Self {
        self.include_spells = include;
        self
    }
}

/// The result of converting one record.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub character: CharacterModel,
    pub stat_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spells: Option<SpellCatalog>,
}

impl Conversion {
    /// The stat block followed by every spell card, if spells were requested.
    pub fn to_text(&self) -> String {
        match &self.spells {
            Some(spells) if !spells.is_empty() => {
                format!("{}\n{}", self.stat_block, spells.to_text())
            }
            _ => self.stat_block.clone(),
        }
    }
}

/// Derive, render and optionally collect spells for one record.
pub fn convert(
    record: &RawRecord,
    compendium: &CompendiumIndex,
    options: ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let character = CharacterBuilder::from_record(record, compendium)?.build()?;
    info!(name = %character.name, "Creating stat block");
    let stat_block = render::stat_block(&character);

    let spells = if options.include_spells {
        info!("Collecting spell cards");
        Some(SpellCatalog::extract(record.character()?)?)
    } else {
        None
    };

    Ok(Conversion {
        character,
        stat_block,
        spells,
    })
}

/// Just the stat block.
pub fn render_character(
    record: &RawRecord,
    compendium: &CompendiumIndex,
) -> Result<String, ConvertError> {
    Ok(convert(record, compendium, ConvertOptions::new())?.stat_block)
}

/// Just the spell catalog. Needs no compendium.
pub fn render_spells(record: &RawRecord) -> Result<SpellCatalog, ConvertError> {
    Ok(SpellCatalog::extract(record.character()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{compendium, spell_json, RecordFixture, SectionFixture};

    fn wizard() -> RawRecord {
        RecordFixture::new("Mira")
            .class(
                SectionFixture::new("Wizard")
                    .spellcasting("Intelligence")
                    .spell(spell_json("Light", None, "5")),
            )
            .build()
    }

    #[test]
    fn test_options_builder() {
        assert!(!ConvertOptions::new().include_spells);
        assert!(ConvertOptions::new().with_spells(true).include_spells);
    }

    #[test]
    fn test_convert_without_spells() {
        let conversion =
            convert(&wizard(), &compendium(&[("Human", None)]), ConvertOptions::new()).unwrap();
        assert!(conversion.spells.is_none());
        assert_eq!(conversion.to_text(), conversion.stat_block);
        assert!(conversion.stat_block.contains(">#### Spells"));
    }

    #[test]
    fn test_convert_with_spells() {
        let options = ConvertOptions::new().with_spells(true);
        let conversion = convert(&wizard(), &compendium(&[("Human", None)]), options).unwrap();
        let spells = conversion.spells.as_ref().unwrap();
        assert_eq!(spells.names(), vec!["Light"]);
        assert!(conversion.to_text().ends_with("Light takes effect.\n"));
    }

    #[test]
    fn test_render_spells_needs_no_compendium() {
        let catalog = render_spells(&wizard()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_error_kinds() {
        let lost = RecordFixture::new("Lost")
            .race(SectionFixture::new("Tabaxi"))
            .build();
        assert!(matches!(
            render_character(&lost, &compendium(&[("Human", None)])),
            Err(ConvertError::Rules(RulesError::RaceNotFound(_)))
        ));

        let not_a_record = RawRecord::new(serde_json::json!(["not", "a", "mapping"]));
        assert!(matches!(
            render_spells(&not_a_record),
            Err(ConvertError::Record(RecordError::NotAMapping { .. }))
        ));
    }
}
