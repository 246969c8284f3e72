//! Static game-data catalog - read-only lookup over definitions

pub mod registry;
pub mod schema;

pub use registry::{canonicalize, Catalog, CatalogError};
pub use schema::{BuildingDefinition, PlanetArchetype, ResourceDefinition};
