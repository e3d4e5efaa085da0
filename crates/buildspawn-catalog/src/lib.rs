pub mod catalog;
pub mod defaults;
pub mod loader;
pub mod remote;
pub mod validator;

pub use catalog::{Catalog, CatalogBuild};
pub use remote::{RemoteBuildingEntry, RemoteSpawnRule};
pub use validator::ValidationError;
