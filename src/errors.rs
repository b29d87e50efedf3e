use crate::battle::field::{SideId, SlotId};
use schema::{Ability, HeldItem, MoveId, ScreenKind, SpeciesId, Stat};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the battle engine. Every variant is fatal for the
/// battle it was raised in; nothing here is retried.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// A caller handed the engine something it cannot work with.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
    /// The post-turn validator found the battlefield in an impossible state.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantReport),
    /// Draining the action queue did not terminate, which means a handler
    /// keeps producing reactions for its own reactions.
    #[error("action queue exceeded {limit} iterations in a single drain")]
    RunawayQueue { limit: usize },
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Caller bugs. These fail fast and are never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("{side} has an empty roster")]
    EmptyRoster { side: SideId },
    #[error("slot {0} does not exist on this battlefield")]
    UnknownSlot(SlotId),
    #[error("roster member {member} does not exist on {side}")]
    UnknownRosterMember { side: SideId, member: usize },
    #[error("provider for {polled} returned an action owned by {owner:?}")]
    ForeignAction { polled: SlotId, owner: Option<SlotId> },
    #[error("provider for {polled} returned a {kind} action; only moves and switches can be chosen")]
    UnselectableAction { polled: SlotId, kind: &'static str },
    #[error("replacement {member} for {slot} is not on the bench")]
    InvalidReplacement { slot: SlotId, member: usize },
    #[error("battle format needs at least one slot per side")]
    NoSlots,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("move {0} is not in the data catalog")]
    MissingMove(MoveId),
    #[error("species {0} is not in the data catalog")]
    MissingSpecies(SpeciesId),
    #[error("ability {0} is not in the data catalog")]
    MissingAbility(Ability),
    #[error("held item {0} is not in the data catalog")]
    MissingItem(HeldItem),
    #[error("catalog document is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse battle config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid battle config: {0}")]
    Invalid(String),
}

/// A single broken invariant, found by the battlefield validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    StageOutOfRange { slot: SlotId, stat: Stat, stage: i8 },
    PhantomOccupant { slot: SlotId, member: usize },
    DuplicateOccupant { side: SideId, member: usize },
    HpAboveMax { side: SideId, member: usize, hp: u16, max: u16 },
    SideWithoutSlots { side: SideId },
    LingeringWeather,
    LingeringTerrain,
    LingeringScreen { side: SideId, screen: ScreenKind },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::StageOutOfRange { slot, stat, stage } => {
                write!(f, "{} has {} stage {} outside [-6, 6]", slot, stat, stage)
            }
            InvariantViolation::PhantomOccupant { slot, member } => {
                write!(f, "{} is occupied by roster member {} which does not exist", slot, member)
            }
            InvariantViolation::DuplicateOccupant { side, member } => {
                write!(f, "roster member {} of {} occupies more than one slot", member, side)
            }
            InvariantViolation::HpAboveMax { side, member, hp, max } => {
                write!(f, "roster member {} of {} has {} HP out of {}", member, side, hp, max)
            }
            InvariantViolation::SideWithoutSlots { side } => write!(f, "{} has no slots", side),
            InvariantViolation::LingeringWeather => write!(f, "weather is active with 0 turns left"),
            InvariantViolation::LingeringTerrain => write!(f, "terrain is active with 0 turns left"),
            InvariantViolation::LingeringScreen { side, screen } => {
                write!(f, "{} on {} is active with 0 turns left", screen, side)
            }
        }
    }
}

/// Every violation found in one validation pass, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvariantReport {
    pub violations: Vec<InvariantViolation>,
}

impl InvariantReport {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl fmt::Display for InvariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "; {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvariantReport {}

/// Failure of a single ability or item listener. The dispatcher logs these
/// and moves on to the next listener; they never reach the turn pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("listener definition is missing: {0}")]
    MissingDefinition(#[from] CatalogError),
    #[error("listener owner {0} no longer exists")]
    MissingOwner(SlotId),
}

/// Failure of a telemetry observer. Logged and dropped by the bus.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry sink write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("telemetry observer state is poisoned")]
    Poisoned,
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;
