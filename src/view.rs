//! Presentation boundary. The engine describes what happened as `ViewEvent`s
//! and hands them to a `BattleView`; nothing a view does feeds back into the
//! simulation.

use crate::battle::field::{SideId, SlotId};
use crate::combatant::StatusCondition;
use schema::{MoveId, ScreenKind, Stat, Terrain, Weather};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Message(String),
    TurnStarted {
        turn: u32,
    },
    MoveUsed {
        user: SlotId,
        name: String,
        move_id: MoveId,
        move_name: String,
    },
    MoveMissed {
        user: SlotId,
        name: String,
    },
    Protected {
        target: SlotId,
        name: String,
    },
    Effectiveness {
        multiplier: f64,
    },
    CriticalHit,
    Damaged {
        target: SlotId,
        name: String,
        amount: u16,
        remaining_hp: u16,
        max_hp: u16,
    },
    Healed {
        target: SlotId,
        name: String,
        amount: u16,
        remaining_hp: u16,
        max_hp: u16,
    },
    StatusApplied {
        target: SlotId,
        name: String,
        status: StatusCondition,
    },
    StatusCured {
        target: SlotId,
        name: String,
        status: StatusCondition,
    },
    StatChanged {
        target: SlotId,
        name: String,
        stat: Stat,
        change: i8,
    },
    StatChangeBlocked {
        target: SlotId,
        name: String,
        stat: Stat,
        rising: bool,
    },
    Fainted {
        target: SlotId,
        name: String,
    },
    SwitchedIn {
        slot: SlotId,
        name: String,
        previous: Option<String>,
    },
    WeatherStarted(Weather),
    WeatherEnded(Weather),
    TerrainStarted(Terrain),
    TerrainEnded(Terrain),
    ScreenRaised {
        side: SideId,
        screen: ScreenKind,
    },
    ScreenEnded {
        side: SideId,
        screen: ScreenKind,
    },
}

impl ViewEvent {
    /// Formats the event into a human-readable line.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            ViewEvent::Message(text) => Some(text.clone()),
            ViewEvent::TurnStarted { turn } => Some(format!("=== Turn {} ===", turn)),
            ViewEvent::MoveUsed {
                name, move_name, ..
            } => Some(format!("{} used {}!", name, move_name)),
            ViewEvent::MoveMissed { name, .. } => Some(format!("{}'s attack missed!", name)),
            ViewEvent::Protected { name, .. } => Some(format!("{} protected itself!", name)),
            ViewEvent::Effectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m > 0.0 && m < 1.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None,
            },
            ViewEvent::CriticalHit => Some("A critical hit!".to_string()),
            ViewEvent::Damaged { name, amount, .. } => {
                Some(format!("{} took {} damage!", name, amount))
            }
            ViewEvent::Healed { name, amount, .. } => {
                Some(format!("{} recovered {} HP!", name, amount))
            }
            ViewEvent::StatusApplied { name, status, .. } => Some(match status {
                StatusCondition::Burn => format!("{} was burned!", name),
                StatusCondition::Paralysis => format!("{} is paralyzed! It may be unable to move!", name),
                StatusCondition::Poison => format!("{} was poisoned!", name),
                StatusCondition::Sleep(_) => format!("{} fell asleep!", name),
                StatusCondition::Freeze => format!("{} was frozen solid!", name),
            }),
            ViewEvent::StatusCured { name, status, .. } => Some(match status {
                StatusCondition::Sleep(_) => format!("{} woke up!", name),
                StatusCondition::Freeze => format!("{} thawed out!", name),
                other => format!("{} was cured of its {}!", name, other),
            }),
            ViewEvent::StatChanged {
                name, stat, change, ..
            } => {
                let magnitude = match change.abs() {
                    1 => "",
                    2 => " sharply",
                    _ => " drastically",
                };
                let direction = if *change > 0 { "rose" } else { "fell" };
                Some(format!("{}'s {}{} {}!", name, stat, magnitude, direction))
            }
            ViewEvent::StatChangeBlocked {
                name, stat, rising, ..
            } => {
                let direction = if *rising { "higher" } else { "lower" };
                Some(format!("{}'s {} won't go any {}!", name, stat, direction))
            }
            ViewEvent::Fainted { name, .. } => Some(format!("{} fainted!", name)),
            ViewEvent::SwitchedIn { name, previous, .. } => Some(match previous {
                Some(previous) => format!("{} was withdrawn. Go, {}!", previous, name),
                None => format!("Go, {}!", name),
            }),
            ViewEvent::WeatherStarted(weather) => Some(match weather {
                Weather::Sun => "The sunlight turned harsh!".to_string(),
                Weather::Rain => "It started to rain!".to_string(),
                Weather::Sandstorm => "A sandstorm kicked up!".to_string(),
                Weather::Hail => "It started to hail!".to_string(),
            }),
            ViewEvent::WeatherEnded(weather) => Some(format!("The {} subsided.", weather)),
            ViewEvent::TerrainStarted(terrain) => Some(format!("{} spread across the battlefield!", terrain)),
            ViewEvent::TerrainEnded(terrain) => Some(format!("The {} faded.", terrain)),
            ViewEvent::ScreenRaised { side, screen } => {
                Some(format!("{} went up on the {}!", screen, side))
            }
            ViewEvent::ScreenEnded { side, screen } => {
                Some(format!("The {}'s {} wore off!", side, screen))
            }
        }
    }
}

/// Presentation callbacks, invoked once per executed action. Every callback
/// has a no-op default so a headless view only overrides what it needs.
pub trait BattleView {
    fn show_message(&mut self, _text: &str) {}
    fn play_move_animation(&mut self, _user: SlotId, _move_id: MoveId) {}
    fn play_damage_animation(&mut self, _target: SlotId, _amount: u16) {}
    fn play_status_animation(&mut self, _target: SlotId, _status: StatusCondition) {}
    fn play_faint_animation(&mut self, _target: SlotId) {}
    fn play_switch_animation(&mut self, _slot: SlotId, _incoming: &str) {}
    fn update_hp(&mut self, _target: SlotId, _current: u16, _max: u16) {}

    /// The one point where the engine yields to the presentation layer after
    /// an action. Returning means the view is ready for the next one.
    fn suspend(&mut self) {}

    /// Routes an event to the matching callbacks.
    fn present(&mut self, event: &ViewEvent) {
        match event {
            ViewEvent::MoveUsed { user, move_id, .. } => {
                self.play_move_animation(*user, *move_id)
            }
            ViewEvent::Damaged {
                target,
                amount,
                remaining_hp,
                max_hp,
                ..
            } => {
                self.play_damage_animation(*target, *amount);
                self.update_hp(*target, *remaining_hp, *max_hp);
            }
            ViewEvent::Healed {
                target,
                remaining_hp,
                max_hp,
                ..
            } => self.update_hp(*target, *remaining_hp, *max_hp),
            ViewEvent::StatusApplied { target, status, .. } => {
                self.play_status_animation(*target, *status)
            }
            ViewEvent::Fainted { target, .. } => self.play_faint_animation(*target),
            ViewEvent::SwitchedIn { slot, name, .. } => self.play_switch_animation(*slot, name),
            _ => {}
        }
        if let Some(text) = event.format() {
            self.show_message(&text);
        }
    }
}

/// Headless view for batch simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl BattleView for NullView {}

/// Keeps every event it is shown, for tests and debugging.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
    suspensions: usize,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    pub fn suspensions(&self) -> usize {
        self.suspensions
    }

    pub fn messages(&self) -> Vec<String> {
        self.events.iter().filter_map(ViewEvent::format).collect()
    }

    pub fn contains_message(&self, needle: &str) -> bool {
        self.messages().iter().any(|message| message.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl BattleView for RecordingView {
    fn suspend(&mut self) {
        self.suspensions += 1;
    }

    fn present(&mut self, event: &ViewEvent) {
        self.events.push(event.clone());
    }
}

impl std::fmt::Display for RecordingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for message in self.messages() {
            writeln!(f, "  {}", message)?;
        }
        Ok(())
    }
}
