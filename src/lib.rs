//! Battle Core
//!
//! A deterministic, step-based turn-resolution engine for monster battles:
//! an action queue with reaction semantics, a turn-step pipeline, a staged
//! damage calculation, priority/speed turn ordering and ability/item
//! trigger dispatch over a mutable battlefield.

// --- MODULE DECLARATIONS ---
// This declares the module hierarchy for the crate.
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod config;
pub mod errors;
pub mod prefab_rosters;
pub mod providers;
pub mod rng;
pub mod telemetry;
pub mod view;

// --- PUBLIC API RE-EXPORTS ---
// This section defines the public-facing API of the `battle-core` crate,
// making it easy for users to import the most important types directly.

// --- From the `schema` crate ---
// Re-export the static data definitions the engine reads.
pub use schema::{
    // Core Enums
    Ability,
    ElementType,
    HeldItem,
    MoveCategory,
    MoveId,
    SpeciesId,
    Stat,
    StatusType,
    Terrain,
    Weather,
    // Core Data Structs
    AbilityData,
    ItemData,
    MoveData,
    SpeciesData,
};

// --- From this crate's modules (`src/`) ---

// Engine facade and battle outcome.
pub use battle::arbiter::{check_outcome, BattleOutcome};
pub use battle::engine::{AbortHandle, BattleConclusion, BattleEngine, BattleReport};
pub use battle::field::{BattleField, SideId, SlotId};

// Runtime data and collaborators.
pub use catalog::{DataCatalog, StandardCatalog};
pub use combatant::{Combatant, StatusCondition};
pub use config::{BattleConfig, BattleFormat};
pub use errors::{BattleEngineError, BattleResult};
pub use providers::{ActionProvider, FirstMoveProvider, ScoringAi, ScriptedProvider};
pub use telemetry::{TelemetryEvent, TelemetryObserver};
pub use view::{BattleView, NullView, RecordingView};
