//! Fight Club 5 character sheets to Homebrewery stat blocks.
//!
//! This crate provides:
//! - Accessors over the deserialized sheet and compendium trees
//! - D&D 5e derivation rules (modifiers, saves, armor class, spellcasting)
//! - A staged builder producing an immutable character model
//! - Markdown rendering of the stat block and of spell cards
//!
//! # Quick Start
//!
//! ```ignore
//! use statblock_core::{convert, CompendiumIndex, ConvertOptions, RawRecord};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record = RawRecord::load_json("thorin.json").await?;
//!     let compendium = CompendiumIndex::load_json("compendium.json").await?;
//!
//!     let conversion = convert(&record, &compendium, ConvertOptions::new().with_spells(true))?;
//!     println!("{}", conversion.to_text());
//!     Ok(())
//! }
//! ```

pub mod ability;
pub mod character;
pub mod character_builder;
pub mod convert;
pub mod persist;
pub mod record;
pub mod render;
pub mod rules;
pub mod spells;
pub mod testing;

// Primary public API
pub use ability::{Ability, AbilityScores, Proficiency, Skill};
pub use character::CharacterModel;
pub use character_builder::CharacterBuilder;
pub use convert::{convert, render_character, render_spells, Conversion, ConvertError, ConvertOptions};
pub use persist::PersistError;
pub use record::{CompendiumIndex, RawRecord, RecordError};
pub use rules::RulesError;
pub use spells::{SpellCatalog, SpellError, SpellLevel, SpellRecord};
pub use testing::{RecordFixture, SectionFixture};
