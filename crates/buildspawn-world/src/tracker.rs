//! Which placed building each player is standing in.
//!
//! Polled on the game tick at a fixed interval. Only reads chunk spawn data,
//! so a chunk that gets decided between two polls is simply picked up on the
//! next one.

use buildspawn_core::math::{chunk_neighborhood, position_to_chunk};
use buildspawn_core::types::{Aabb, ChunkPos};
use buildspawn_persist::chunk_data::ChunkSpawnData;
use glam::DVec3;
use std::collections::HashMap;

use crate::level::LevelAccess;
use crate::store::SpawnDataStore;

pub type PlayerId = u64;

/// A placed building as seen by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentBuilding {
    /// Chunk whose spawn data holds the building.
    pub chunk: ChunkPos,
    pub rdns: String,
    pub pk: i64,
    pub name: String,
    pub author: String,
    pub bounds: Aabb,
}

impl CurrentBuilding {
    fn from_data(chunk: ChunkPos, data: &ChunkSpawnData) -> Option<Self> {
        if !data.has_building() {
            return None;
        }
        Some(Self {
            chunk,
            rdns: data.rdns.clone(),
            pk: data.pk,
            name: data.display_name().to_string(),
            author: data.display_author().to_string(),
            bounds: data.bounds()?,
        })
    }

    fn same_as(&self, other: &CurrentBuilding) -> bool {
        self.chunk == other.chunk && self.rdns == other.rdns
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildingEvent {
    Enter {
        player: PlayerId,
        building: CurrentBuilding,
    },
    Exit {
        player: PlayerId,
        building: CurrentBuilding,
    },
}

impl BuildingEvent {
    pub fn player(&self) -> PlayerId {
        match self {
            BuildingEvent::Enter { player, .. } | BuildingEvent::Exit { player, .. } => *player,
        }
    }

    pub fn building(&self) -> &CurrentBuilding {
        match self {
            BuildingEvent::Enter { building, .. } | BuildingEvent::Exit { building, .. } => {
                building
            }
        }
    }
}

/// Receives enter/exit transitions (HUD, chat, analytics).
pub trait BuildingEventSink {
    fn on_event(&mut self, event: BuildingEvent);
}

impl BuildingEventSink for Vec<BuildingEvent> {
    fn on_event(&mut self, event: BuildingEvent) {
        self.push(event);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerBuildingState {
    current: Option<CurrentBuilding>,
}

impl PlayerBuildingState {
    pub fn current(&self) -> Option<&CurrentBuilding> {
        self.current.as_ref()
    }

    pub fn is_inside(&self) -> bool {
        self.current.is_some()
    }

    /// Move to `next`. Returns the building left and the building entered,
    /// both None when nothing changed.
    fn transition(
        &mut self,
        next: Option<CurrentBuilding>,
    ) -> (Option<CurrentBuilding>, Option<CurrentBuilding>) {
        let unchanged = match (&self.current, &next) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return (None, None);
        }
        let left = std::mem::replace(&mut self.current, next);
        (left, self.current.clone())
    }
}

pub struct BuildingTracker {
    interval_ticks: u64,
    players: HashMap<PlayerId, PlayerBuildingState>,
}

impl BuildingTracker {
    pub fn new(interval_ticks: u64) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            players: HashMap::new(),
        }
    }

    pub fn state(&self, player: PlayerId) -> Option<&PlayerBuildingState> {
        self.players.get(&player)
    }

    pub fn tracked_players(&self) -> usize {
        self.players.len()
    }

    /// Called every game tick; does work only on interval ticks. Returns
    /// whether this tick was an update.
    pub fn tick(
        &mut self,
        tick: u64,
        level: &dyn LevelAccess,
        store: &SpawnDataStore,
        players: &[(PlayerId, DVec3)],
        sink: &mut dyn BuildingEventSink,
    ) -> bool {
        if tick % self.interval_ticks != 0 {
            return false;
        }
        self.update(level, store, players, sink);
        true
    }

    /// One pass over the active players. Players no longer listed are
    /// dropped without an exit event.
    pub fn update(
        &mut self,
        level: &dyn LevelAccess,
        store: &SpawnDataStore,
        players: &[(PlayerId, DVec3)],
        sink: &mut dyn BuildingEventSink,
    ) {
        self.players
            .retain(|id, _| players.iter().any(|(active, _)| active == id));

        for &(player, pos) in players {
            let found = find_building(level, store, pos);
            let state = self.players.entry(player).or_default();
            let (left, entered) = state.transition(found);
            if let Some(building) = left {
                log::debug!("Player {player} left {}", building.rdns);
                sink.on_event(BuildingEvent::Exit { player, building });
            }
            if let Some(building) = entered {
                log::debug!("Player {player} entered {}", building.rdns);
                sink.on_event(BuildingEvent::Enter { player, building });
            }
        }
    }
}

/// First building in the loaded 3×3 neighborhood whose box contains `pos`.
pub fn find_building(
    level: &dyn LevelAccess,
    store: &SpawnDataStore,
    pos: DVec3,
) -> Option<CurrentBuilding> {
    chunk_neighborhood(position_to_chunk(pos))
        .into_iter()
        .filter(|chunk| level.is_chunk_loaded(*chunk))
        .find_map(|chunk| {
            let data = store.get(chunk)?;
            let building = CurrentBuilding::from_data(chunk, &data)?;
            building.bounds.contains(pos).then_some(building)
        })
}
