// Battle Schema - static data definitions
// This crate holds every enum and definition record the battle engine reads
// from its data catalog. Nothing here is mutated during a battle; combatant
// instances live in the engine crate.

pub use abilities::*;
pub use battle_data::*;
pub use element_types::*;
pub use items::*;
pub use moves::*;
pub use species_data::*;

pub mod abilities;
pub mod battle_data;
pub mod element_types;
pub mod items;
pub mod moves;
pub mod species_data;
