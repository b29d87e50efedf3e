use crate::battle::context::BattleContext;
use crate::battle::engine::BattleEngine;
use crate::battle::field::BattleField;
use crate::catalog::{DataCatalog, StandardCatalog};
use crate::combatant::{Combatant, StatusCondition};
use crate::config::{BattleConfig, BattleFormat, DamageOverrides};
use crate::errors::BattleResult;
use crate::providers::ScriptedProvider;
use crate::view::{BattleView, RecordingView, ViewEvent};
use schema::{Ability, HeldItem, MoveId, SpeciesId, Stat};
use std::sync::{Arc, Mutex};

pub const TEST_SEED: u64 = 7;

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```
/// let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
///     .with_moves(vec![MoveId::Tackle])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: SpeciesId,
    level: u8,
    moves: Vec<MoveId>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
    ability: Option<Ability>,
    item: Option<HeldItem>,
    stat_overrides: Vec<(Stat, u16)>,
}

impl TestCombatantBuilder {
    /// Creates a new builder for a given species and level.
    pub fn new(species: SpeciesId, level: u8) -> Self {
        Self {
            species,
            level,
            moves: vec![MoveId::Tackle],
            status: None,
            current_hp: None,
            ability: None,
            item: None,
            stat_overrides: Vec::new(),
        }
    }

    pub fn with_moves(mut self, moves: Vec<MoveId>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: HeldItem) -> Self {
        self.item = Some(item);
        self
    }

    /// Replaces a raw stat after the level formula has run.
    pub fn with_stat(mut self, stat: Stat, value: u16) -> Self {
        self.stat_overrides.push((stat, value));
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = StandardCatalog::builtin();
        let species_data = match catalog.require_species(self.species) {
            Ok(data) => data,
            Err(err) => panic!("Failed to load species data for {:?}: {}", self.species, err),
        };
        let mut combatant = match Combatant::new(species_data, self.level, &self.moves, &catalog) {
            Ok(combatant) => combatant,
            Err(err) => panic!("Failed to build {:?}: {}", self.species, err),
        };

        for (stat, value) in self.stat_overrides {
            match stat {
                Stat::Attack => combatant.stats.attack = value,
                Stat::Defense => combatant.stats.defense = value,
                Stat::SpecialAttack => combatant.stats.sp_attack = value,
                Stat::SpecialDefense => combatant.stats.sp_defense = value,
                Stat::Speed => combatant.stats.speed = value,
                Stat::Accuracy | Stat::Evasion => {}
            }
        }

        combatant.status = self.status;
        combatant.ability = self.ability;
        combatant.item = self.item;
        if let Some(hp) = self.current_hp {
            combatant.current_hp = hp.min(combatant.max_hp());
        }
        combatant
    }
}

pub fn test_catalog() -> Arc<dyn DataCatalog> {
    Arc::new(StandardCatalog::builtin())
}

/// Seeded, never critical, no damage variance.
pub fn deterministic_config() -> BattleConfig {
    BattleConfig {
        seed: Some(TEST_SEED),
        damage_overrides: DamageOverrides {
            force_critical: Some(false),
            random_factor: Some(1.0),
        },
        ..BattleConfig::default()
    }
}

/// Creates a singles battlefield from two rosters.
pub fn create_test_field(player: Vec<Combatant>, enemy: Vec<Combatant>) -> BattleField {
    create_field_with_format(BattleFormat::Singles, player, enemy)
}

pub fn create_field_with_format(
    format: BattleFormat,
    player: Vec<Combatant>,
    enemy: Vec<Combatant>,
) -> BattleField {
    match BattleField::new(format, player, enemy) {
        Ok(field) => field,
        Err(err) => panic!("Failed to create test field: {}", err),
    }
}

pub fn create_test_context(field: BattleField) -> BattleContext {
    BattleContext::new(field, deterministic_config(), test_catalog())
}

/// A recording view the test keeps a handle to after the engine takes ownership.
#[derive(Debug, Clone, Default)]
pub struct SharedView(Arc<Mutex<RecordingView>>);

impl SharedView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.0.lock().map(|view| view.events().to_vec()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.lock().map(|view| view.messages()).unwrap_or_default()
    }

    pub fn contains_message(&self, needle: &str) -> bool {
        self.messages().iter().any(|message| message.contains(needle))
    }

    pub fn suspensions(&self) -> usize {
        self.0.lock().map(|view| view.suspensions()).unwrap_or_default()
    }
}

impl BattleView for SharedView {
    fn suspend(&mut self) {
        if let Ok(mut view) = self.0.lock() {
            view.suspend();
        }
    }

    fn present(&mut self, event: &ViewEvent) {
        if let Ok(mut view) = self.0.lock() {
            view.present(event);
        }
    }
}

/// Creates an engine driven by two scripts, with the deterministic config.
pub fn create_test_engine(
    field: BattleField,
    player: ScriptedProvider,
    enemy: ScriptedProvider,
) -> (BattleEngine, SharedView) {
    create_engine_with(field, deterministic_config(), test_catalog(), player, enemy)
}

pub fn create_engine_with(
    field: BattleField,
    config: BattleConfig,
    catalog: Arc<dyn DataCatalog>,
    player: ScriptedProvider,
    enemy: ScriptedProvider,
) -> (BattleEngine, SharedView) {
    let view = SharedView::default();
    let engine = assert_ok(BattleEngine::new(
        field,
        config,
        catalog,
        [Box::new(player), Box::new(enemy)],
        Box::new(view.clone()),
    ));
    (engine, view)
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
