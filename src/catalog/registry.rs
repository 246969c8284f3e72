//! Catalog loading and lookup
//!
//! The catalog is the read-only input the engine operates over: buildings,
//! resources, and planet archetypes. Loading is a validation pass: every
//! identifier is normalized to one canonical form and interned to a dense
//! id, and any inconsistency (a cost naming an undeclared resource, two
//! definitions collapsing onto one canonical key) fails loudly here rather
//! than being fuzzy-matched at runtime.

use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::path::Path;

use crate::catalog::schema::{BuildingDefinition, PlanetArchetype, ResourceDefinition};
use crate::core::types::{DefId, PlanetId, ResourceId, TagId, Tier};

/// Default catalog bundled with the crate
const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Normalize an identifier to its canonical form: trimmed, lowercased,
/// internal whitespace collapsed to single dashes.
pub fn canonicalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Error type for catalog loading and validation
#[derive(Debug, Clone)]
pub enum CatalogError {
    IoError(String),
    ParseError(String),
    EmptyIdentifier(String),
    DuplicateResource(String),
    DuplicatePlanet(String),
    DuplicateBuilding(String),
    /// Two definitions in one family claim the same tier, which would make
    /// upgrade resolution ambiguous
    DuplicateFamilyTier { family: String, tier: u8 },
    UnknownResource { context: String, resource: String },
    InvalidTier { context: String, tier: u8 },
    InvalidRichness { planet: String, resource: String, value: f32 },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "IO error: {}", e),
            CatalogError::ParseError(e) => write!(f, "Parse error: {}", e),
            CatalogError::EmptyIdentifier(ctx) => {
                write!(f, "Empty identifier in {}", ctx)
            }
            CatalogError::DuplicateResource(id) => write!(f, "Duplicate resource: {}", id),
            CatalogError::DuplicatePlanet(id) => write!(f, "Duplicate planet archetype: {}", id),
            CatalogError::DuplicateBuilding(id) => write!(f, "Duplicate building: {}", id),
            CatalogError::DuplicateFamilyTier { family, tier } => {
                write!(f, "Family {} has two definitions at tier {}", family, tier)
            }
            CatalogError::UnknownResource { context, resource } => {
                write!(f, "Unknown resource {} referenced by {}", resource, context)
            }
            CatalogError::InvalidTier { context, tier } => {
                write!(f, "Invalid tier {} in {} (must be 1-5)", tier, context)
            }
            CatalogError::InvalidRichness {
                planet,
                resource,
                value,
            } => {
                write!(
                    f,
                    "Richness {} for {} on {} out of range (must be 0-1)",
                    value, resource, planet
                )
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only catalog of static definitions, interned and validated
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: Vec<ResourceDefinition>,
    resource_index: AHashMap<String, ResourceId>,
    tag_names: Vec<String>,
    tag_index: AHashMap<String, TagId>,
    buildings: Vec<BuildingDefinition>,
    building_index: AHashMap<String, DefId>,
    family_index: AHashMap<String, Vec<DefId>>,
    planets: Vec<PlanetArchetype>,
    planet_index: AHashMap<String, PlanetId>,
}

impl Catalog {
    /// The catalog bundled under `data/catalog.toml`
    pub fn with_defaults() -> Self {
        Self::parse_toml(DEFAULT_CATALOG).expect("embedded default catalog is valid")
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog =
            toml::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        // Resources first: they are the closed universe every map keys into.
        for resource in &raw.resources {
            let name = canonicalize(&resource.id);
            if name.is_empty() {
                return Err(CatalogError::EmptyIdentifier("resources".into()));
            }
            if catalog.resource_index.contains_key(&name) {
                return Err(CatalogError::DuplicateResource(name));
            }
            let id = ResourceId(catalog.resources.len() as u32);
            catalog.resource_index.insert(name.clone(), id);
            catalog.resources.push(ResourceDefinition { id, name });
        }

        for planet in raw.planets {
            let key = canonicalize(&planet.id);
            if key.is_empty() {
                return Err(CatalogError::EmptyIdentifier("planets".into()));
            }
            if catalog.planet_index.contains_key(&key) {
                return Err(CatalogError::DuplicatePlanet(key));
            }

            let tags = catalog.intern_tags(&planet.tags, &key)?;
            let mut richness = AHashMap::new();
            for (resource, value) in &planet.richness {
                let rid = catalog.resolve_resource(resource, &format!("planet {}", key))?;
                if !(0.0..=1.0).contains(value) {
                    return Err(CatalogError::InvalidRichness {
                        planet: key,
                        resource: canonicalize(resource),
                        value: *value,
                    });
                }
                richness.insert(rid, *value);
            }

            let id = PlanetId(catalog.planets.len() as u32);
            catalog.planet_index.insert(key.clone(), id);
            catalog.planets.push(PlanetArchetype {
                id,
                name: planet.name.unwrap_or_else(|| key.clone()),
                key,
                tags,
                richness,
            });
        }

        for building in raw.buildings {
            let key = canonicalize(&building.id);
            if key.is_empty() {
                return Err(CatalogError::EmptyIdentifier("buildings".into()));
            }
            if catalog.building_index.contains_key(&key) {
                return Err(CatalogError::DuplicateBuilding(key));
            }
            let context = format!("building {}", key);

            let tier = Tier::from_u8(building.tier).ok_or(CatalogError::InvalidTier {
                context: context.clone(),
                tier: building.tier,
            })?;
            let min_raw = building.min_stake_tier.unwrap_or(1);
            let min_stake_tier = Tier::from_u8(min_raw).ok_or(CatalogError::InvalidTier {
                context: context.clone(),
                tier: min_raw,
            })?;
            let max_stake_tier = match building.max_stake_tier {
                Some(raw_tier) => Some(Tier::from_u8(raw_tier).ok_or(CatalogError::InvalidTier {
                    context: context.clone(),
                    tier: raw_tier,
                })?),
                None => None,
            };

            let family = canonicalize(&building.family);
            if family.is_empty() {
                return Err(CatalogError::EmptyIdentifier(context));
            }

            let required_tags = catalog.intern_tags(&building.required_tags, &key)?;
            let added_tags = catalog.intern_tags(&building.added_tags, &key)?;
            let construction_cost = catalog.resolve_amounts(&building.construction_cost, &key)?;
            let resource_rate = catalog.resolve_amounts(&building.resource_rate, &key)?;
            let extraction_rate = catalog.resolve_amounts(&building.extraction_rate, &key)?;

            let id = DefId(catalog.buildings.len() as u32);
            let siblings = catalog.family_index.entry(family.clone()).or_default();
            for sibling in siblings.iter() {
                if catalog.buildings[sibling.0 as usize].tier == tier {
                    return Err(CatalogError::DuplicateFamilyTier {
                        family,
                        tier: tier.as_u8(),
                    });
                }
            }
            siblings.push(id);

            catalog.building_index.insert(key.clone(), id);
            catalog.buildings.push(BuildingDefinition {
                id,
                name: building.name.unwrap_or_else(|| key.clone()),
                key,
                family,
                tier,
                hub: building.hub,
                power: building.power,
                crew_slots: building.crew_slots,
                crew_needed: building.crew_needed,
                storage: building.storage,
                construction_cost,
                resource_rate,
                extraction_rate,
                required_tags,
                added_tags,
                min_stake_tier,
                max_stake_tier,
            });
        }

        tracing::debug!(
            "Catalog loaded: {} resources, {} buildings, {} planets, {} tags",
            catalog.resources.len(),
            catalog.buildings.len(),
            catalog.planets.len(),
            catalog.tag_names.len()
        );

        Ok(catalog)
    }

    fn resolve_resource(&self, raw: &str, context: &str) -> Result<ResourceId, CatalogError> {
        let name = canonicalize(raw);
        self.resource_index
            .get(&name)
            .copied()
            .ok_or_else(|| CatalogError::UnknownResource {
                context: context.to_string(),
                resource: name,
            })
    }

    fn resolve_amounts(
        &self,
        raw: &AHashMap<String, f32>,
        building: &str,
    ) -> Result<AHashMap<ResourceId, f32>, CatalogError> {
        let mut amounts = AHashMap::with_capacity(raw.len());
        for (resource, amount) in raw {
            let id = self.resolve_resource(resource, &format!("building {}", building))?;
            amounts.insert(id, *amount);
        }
        Ok(amounts)
    }

    fn intern_tag(&mut self, raw: &str, context: &str) -> Result<TagId, CatalogError> {
        let name = canonicalize(raw);
        if name.is_empty() {
            return Err(CatalogError::EmptyIdentifier(format!("tags of {}", context)));
        }
        if let Some(id) = self.tag_index.get(&name) {
            return Ok(*id);
        }
        let id = TagId(self.tag_names.len() as u32);
        self.tag_index.insert(name.clone(), id);
        self.tag_names.push(name);
        Ok(id)
    }

    fn intern_tags(
        &mut self,
        raw: &[String],
        context: &str,
    ) -> Result<AHashSet<TagId>, CatalogError> {
        let mut tags = AHashSet::with_capacity(raw.len());
        for tag in raw {
            tags.insert(self.intern_tag(tag, context)?);
        }
        Ok(tags)
    }

    // --- lookups ---

    pub fn building(&self, id: DefId) -> &BuildingDefinition {
        &self.buildings[id.0 as usize]
    }

    /// Look up a building definition by its canonical string key
    pub fn building_by_key(&self, key: &str) -> Option<&BuildingDefinition> {
        self.building_index
            .get(&canonicalize(key))
            .map(|id| self.building(*id))
    }

    /// The definition one tier above the given one in the same family
    pub fn upgrade_target(&self, def: &BuildingDefinition) -> Option<&BuildingDefinition> {
        let next = def.tier.next()?;
        self.family_index
            .get(&def.family)?
            .iter()
            .map(|id| self.building(*id))
            .find(|candidate| candidate.tier == next)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.buildings.iter()
    }

    pub fn resource(&self, id: ResourceId) -> &ResourceDefinition {
        &self.resources[id.0 as usize]
    }

    /// Resolve a (possibly un-normalized) resource name
    pub fn resource_by_name(&self, name: &str) -> Option<ResourceId> {
        self.resource_index.get(&canonicalize(name)).copied()
    }

    pub fn resource_name(&self, id: ResourceId) -> &str {
        &self.resources[id.0 as usize].name
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.iter()
    }

    pub fn tag_name(&self, id: TagId) -> &str {
        &self.tag_names[id.0 as usize]
    }

    /// Resolve a (possibly un-normalized) tag name against the universe of
    /// tags the catalog mentions anywhere
    pub fn lookup_tag(&self, name: &str) -> Option<TagId> {
        self.tag_index.get(&canonicalize(name)).copied()
    }

    pub fn planet(&self, id: PlanetId) -> &PlanetArchetype {
        &self.planets[id.0 as usize]
    }

    pub fn planet_by_key(&self, key: &str) -> Option<&PlanetArchetype> {
        self.planet_index
            .get(&canonicalize(key))
            .map(|id| self.planet(*id))
    }

    pub fn planets(&self) -> impl Iterator<Item = &PlanetArchetype> {
        self.planets.iter()
    }
}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    resources: Vec<RawResource>,
    #[serde(default)]
    planets: Vec<RawPlanet>,
    #[serde(default)]
    buildings: Vec<RawBuilding>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawPlanet {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    richness: AHashMap<String, f32>,
}

#[derive(Debug, Deserialize)]
struct RawBuilding {
    id: String,
    #[serde(default)]
    name: Option<String>,
    family: String,
    tier: u8,
    #[serde(default)]
    hub: bool,
    #[serde(default)]
    power: f32,
    #[serde(default)]
    crew_slots: u32,
    #[serde(default)]
    crew_needed: u32,
    #[serde(default)]
    storage: f32,
    #[serde(default)]
    min_stake_tier: Option<u8>,
    #[serde(default)]
    max_stake_tier: Option<u8>,
    #[serde(default)]
    required_tags: Vec<String>,
    #[serde(default)]
    added_tags: Vec<String>,
    #[serde(default)]
    construction_cost: AHashMap<String, f32>,
    #[serde(default)]
    resource_rate: AHashMap<String, f32>,
    #[serde(default)]
    extraction_rate: AHashMap<String, f32>,
}
