pub mod chunk_data;
pub mod compress;
pub mod construction_store;
pub mod error;
pub mod format;
pub mod load;
pub mod save;
pub mod snapshot;

pub use chunk_data::{ChunkSpawnData, CHUNK_DATA_VERSION};
pub use construction_store::ConstructionStore;
pub use error::PersistError;
pub use format::RegionHeader;
pub use load::{load_region, RegionData};
pub use save::save_region;
pub use snapshot::{load_snapshot, save_snapshot, CatalogSnapshot};
