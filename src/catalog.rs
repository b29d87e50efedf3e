use crate::errors::CatalogError;
use schema::{
    builtin_abilities, builtin_items, builtin_moves, builtin_species, Ability, AbilityData,
    HeldItem, ItemData, MoveData, MoveId, SpeciesData, SpeciesId,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Read-only lookup of static definitions. The engine never mutates what it
/// gets back from here.
pub trait DataCatalog: Send + Sync {
    fn move_data(&self, id: MoveId) -> Option<&MoveData>;
    fn species(&self, id: SpeciesId) -> Option<&SpeciesData>;
    fn ability(&self, id: Ability) -> Option<&AbilityData>;
    fn item(&self, id: HeldItem) -> Option<&ItemData>;

    fn require_move(&self, id: MoveId) -> Result<&MoveData, CatalogError> {
        self.move_data(id).ok_or(CatalogError::MissingMove(id))
    }

    fn require_species(&self, id: SpeciesId) -> Result<&SpeciesData, CatalogError> {
        self.species(id).ok_or(CatalogError::MissingSpecies(id))
    }

    fn require_ability(&self, id: Ability) -> Result<&AbilityData, CatalogError> {
        self.ability(id).ok_or(CatalogError::MissingAbility(id))
    }

    fn require_item(&self, id: HeldItem) -> Result<&ItemData, CatalogError> {
        self.item(id).ok_or(CatalogError::MissingItem(id))
    }
}

/// Catalog backed by hash maps, seeded from the schema's built-in tables.
#[derive(Debug, Clone, Default)]
pub struct StandardCatalog {
    moves: HashMap<MoveId, MoveData>,
    species: HashMap<SpeciesId, SpeciesData>,
    abilities: HashMap<Ability, AbilityData>,
    items: HashMap<HeldItem, ItemData>,
}

/// Shape of a RON catalog document. Every table is optional; entries
/// replace the built-in definition with the same id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogDocument {
    moves: Vec<MoveData>,
    species: Vec<SpeciesData>,
    abilities: Vec<AbilityData>,
    items: Vec<ItemData>,
}

impl StandardCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.merge(CatalogDocument {
            moves: builtin_moves(),
            species: builtin_species(),
            abilities: builtin_abilities(),
            items: builtin_items(),
        });
        catalog
    }

    pub fn from_ron_str(source: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            ron::from_str(source).map_err(|err| CatalogError::Malformed(err.to_string()))?;
        let mut catalog = Self::builtin();
        catalog.merge(document);
        Ok(catalog)
    }

    pub fn insert_move(&mut self, data: MoveData) {
        self.moves.insert(data.id, data);
    }

    pub fn remove_ability(&mut self, id: Ability) -> Option<AbilityData> {
        self.abilities.remove(&id)
    }

    pub fn remove_item(&mut self, id: HeldItem) -> Option<ItemData> {
        self.items.remove(&id)
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    fn merge(&mut self, document: CatalogDocument) {
        for data in document.moves {
            self.moves.insert(data.id, data);
        }
        for data in document.species {
            self.species.insert(data.id, data);
        }
        for data in document.abilities {
            self.abilities.insert(data.id, data);
        }
        for data in document.items {
            self.items.insert(data.id, data);
        }
    }
}

impl DataCatalog for StandardCatalog {
    fn move_data(&self, id: MoveId) -> Option<&MoveData> {
        self.moves.get(&id)
    }

    fn species(&self, id: SpeciesId) -> Option<&SpeciesData> {
        self.species.get(&id)
    }

    fn ability(&self, id: Ability) -> Option<&AbilityData> {
        self.abilities.get(&id)
    }

    fn item(&self, id: HeldItem) -> Option<&ItemData> {
        self.items.get(&id)
    }
}
