//! Document model: layers and entities, serialized as JSON.

use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};

/// Stable entity identifier.
pub type EntityId = String;
/// Stable layer identifier.
pub type LayerId = String;

/// Id of the layer every new document starts with.
pub const DEFAULT_LAYER_ID: &str = "layer-0";

fn default_true() -> bool {
    true
}

/// A drawing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Layer {
    /// A visible, unlocked layer.
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }

    /// Entities on this layer take part in picking and snapping.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }
}

/// A drawing entity: geometry owned by a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub layer_id: LayerId,
    pub geom: Geometry,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, layer_id: impl Into<LayerId>, geom: Geometry) -> Self {
        Self {
            id: id.into(),
            layer_id: layer_id.into(),
            geom,
        }
    }
}

/// The authoritative drawing: an ordered list of layers and entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Document {
    /// Create a document with a single default layer.
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::new(DEFAULT_LAYER_ID, "Default")],
            entities: Vec::new(),
        }
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Mutable entity lookup.
    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Id of the first layer, used as the target of creation tools.
    pub fn first_layer_id(&self) -> Option<&str> {
        self.layers.first().map(|l| l.id.as_str())
    }

    /// Append an entity.
    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
