use buildspawn_core::building::SpawnableBuilding;
use buildspawn_core::rule::Biome;
use std::collections::HashMap;
use std::sync::Arc;

use crate::remote::RemoteBuildingEntry;
use crate::validator::ValidationError;

/// The loaded set of spawnable buildings, indexed by rdns.
///
/// Rebuilt on every refresh, which also resets the per-world spawn counters.
#[derive(Debug, Default)]
pub struct Catalog {
    buildings: Vec<Arc<SpawnableBuilding>>,
    index: HashMap<String, usize>,
}

/// A built catalog plus everything that was dropped or questionable.
#[derive(Debug)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub issues: Vec<ValidationError>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from remote entries. Invalid entries and duplicate rdns (after the
    /// first) are dropped and reported; nothing fails the whole catalog.
    pub fn from_entries(entries: &[RemoteBuildingEntry], default_margin: i32) -> CatalogBuild {
        let mut catalog = Catalog::new();
        let mut issues = Vec::new();

        for entry in entries {
            if catalog.index.contains_key(&entry.rdns) {
                log::warn!("Dropping duplicate catalog entry '{}'", entry.rdns);
                issues.push(ValidationError::DuplicateRdns(entry.rdns.clone()));
                continue;
            }
            match entry.to_building(default_margin) {
                Ok(building) => {
                    if building.rules.is_empty() {
                        issues.push(ValidationError::NoRules(building.rdns.clone()));
                    }
                    catalog.insert(building);
                }
                Err(e) => {
                    log::warn!("Dropping catalog entry: {e}");
                    issues.push(e);
                }
            }
        }

        log::info!(
            "Catalog built: {} buildings, {} issues",
            catalog.len(),
            issues.len()
        );
        CatalogBuild { catalog, issues }
    }

    pub fn insert(&mut self, building: SpawnableBuilding) {
        let rdns = building.rdns.clone();
        let arc = Arc::new(building);
        match self.index.get(&rdns) {
            Some(&i) => self.buildings[i] = arc,
            None => {
                self.index.insert(rdns, self.buildings.len());
                self.buildings.push(arc);
            }
        }
    }

    pub fn get(&self, rdns: &str) -> Option<&Arc<SpawnableBuilding>> {
        self.index.get(rdns).map(|&i| &self.buildings[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpawnableBuilding>> {
        self.buildings.iter()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Buildings with a rule matching `biome` that are still under their cap,
    /// in catalog order.
    pub fn candidates_for_biome<'a>(
        &'a self,
        biome: &'a Biome,
    ) -> impl Iterator<Item = &'a Arc<SpawnableBuilding>> + 'a {
        self.buildings
            .iter()
            .filter(move |b| b.can_spawn_more() && b.rule_for_biome(biome).is_some())
    }

    pub fn reset_spawn_counts(&self) {
        for b in &self.buildings {
            b.reset_spawn_count();
        }
    }

    pub fn total_spawned(&self) -> u64 {
        self.buildings.iter().map(|b| u64::from(b.spawn_count())).sum()
    }
}
