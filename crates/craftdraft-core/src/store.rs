//! Document store: the authoritative document, its derived caches, and the
//! single path by which edits reach the kernel.

use crate::config::EngineConfig;
use crate::document::{Document, EntityId, LayerId};
use crate::geometry::Geometry;
use crate::kernel::{CommitRequest, EditOp, EpsPolicy, GeometryKernel, KernelResult, Projection, Reason};
use crate::selection::SelectionState;
use crate::spatial::SpatialIndex;
use kurbo::{Point, Rect};
use std::collections::{HashMap, VecDeque};

/// Cached copy of an interactive entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntity {
    pub id: EntityId,
    pub layer_id: LayerId,
    pub geom: Geometry,
    pub bounds: Rect,
}

/// Owns the document, the kernel handle, the render cache, the spatial index
/// and the selection.
///
/// The cache holds only entities on visible, unlocked layers. It is rebuilt,
/// and the revision bumped, whenever the document is replaced.
pub struct DocStore {
    kernel: Box<dyn GeometryKernel>,
    document: Document,
    eps: EpsPolicy,
    entities: Vec<CachedEntity>,
    spatial: SpatialIndex,
    layer_visible: HashMap<LayerId, bool>,
    layer_locked: HashMap<LayerId, bool>,
    selection: SelectionState,
    revision: u64,
    reason_log: VecDeque<String>,
    reason_log_capacity: usize,
}

impl DocStore {
    /// Create a store holding `document`.
    pub fn new(kernel: Box<dyn GeometryKernel>, document: Document, config: &EngineConfig) -> Self {
        let mut store = Self {
            kernel,
            document: Document::default(),
            eps: config.eps,
            entities: Vec::new(),
            spatial: SpatialIndex::new(config.cell_size),
            layer_visible: HashMap::new(),
            layer_locked: HashMap::new(),
            selection: SelectionState::new(),
            revision: 0,
            reason_log: VecDeque::new(),
            reason_log_capacity: config.reason_log_capacity,
        };
        store.set_document(document);
        store
    }

    /// Replace the document and rebuild every derived cache.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.revision += 1;
        self.rebuild_cache();
    }

    /// Replace the document from JSON.
    pub fn set_document_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let document = Document::from_json(json)?;
        self.set_document(document);
        Ok(())
    }

    /// Serialize the current document.
    pub fn document_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }

    fn rebuild_cache(&mut self) {
        self.layer_visible = self.document.layers.iter().map(|l| (l.id.clone(), l.visible)).collect();
        self.layer_locked = self.document.layers.iter().map(|l| (l.id.clone(), l.locked)).collect();

        self.entities.clear();
        self.spatial.clear();
        for entity in &self.document.entities {
            let visible = self.layer_visible.get(&entity.layer_id).copied().unwrap_or(true);
            let locked = self.layer_locked.get(&entity.layer_id).copied().unwrap_or(false);
            if !visible || locked {
                continue;
            }
            let bounds = entity.geom.bounds();
            self.spatial.insert(self.entities.len(), bounds);
            self.entities.push(CachedEntity {
                id: entity.id.clone(),
                layer_id: entity.layer_id.clone(),
                geom: entity.geom.clone(),
                bounds,
            });
        }
        // Ids whose entity left the document do not stay selected.
        self.selection.retain(|id| self.document.entity(id).is_some());
        log::debug!(
            "Rebuilt cache rev {}: {} of {} entities interactive",
            self.revision,
            self.entities.len(),
            self.document.entities.len()
        );
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn eps(&self) -> &EpsPolicy {
        &self.eps
    }

    /// Monotonic counter bumped on every cache rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Interactive entities, in document order.
    pub fn entities(&self) -> &[CachedEntity] {
        &self.entities
    }

    /// Cached entity by id.
    pub fn entity(&self, id: &str) -> Option<&CachedEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Whether a layer is visible; unknown layers count as visible.
    pub fn is_layer_visible(&self, id: &str) -> bool {
        self.layer_visible.get(id).copied().unwrap_or(true)
    }

    /// Whether a layer is locked; unknown layers count as unlocked.
    pub fn is_layer_locked(&self, id: &str) -> bool {
        self.layer_locked.get(id).copied().unwrap_or(false)
    }

    /// Layer new entities are created on.
    pub fn first_layer_id(&self) -> Option<LayerId> {
        self.document.first_layer_id().map(str::to_string)
    }

    /// Cache indices of entities that may lie within `radius` of `p`.
    pub fn spatial_candidates(&self, p: Point, radius: f64) -> Vec<usize> {
        self.spatial.query(p, radius)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Cached entities that are currently selected.
    pub fn selected_entities(&self) -> impl Iterator<Item = &CachedEntity> {
        self.entities.iter().filter(|e| self.selection.is_selected(&e.id))
    }

    /// Closest point on a geometry, answered by the kernel.
    pub fn project_point(&self, geom: &Geometry, p: Point) -> KernelResult<Projection> {
        self.kernel.project_point(geom, p, &self.eps)
    }

    /// Intersection points of two geometries, answered by the kernel.
    pub fn intersect(&self, a: &Geometry, b: &Geometry) -> KernelResult<Vec<Point>> {
        self.kernel.intersect(a, b, &self.eps)
    }

    /// Submit one edit. On success the new document replaces the old one.
    pub fn commit(&mut self, op: EditOp) -> Result<(), Reason> {
        let name = op.name();
        let result = self.kernel.apply(CommitRequest {
            document: &self.document,
            op,
            eps: self.eps,
        });
        match result {
            Ok(document) => {
                log::info!("Committed {name}");
                self.set_document(document);
                Ok(())
            }
            Err(reason) => {
                self.log_reason(&reason);
                Err(reason)
            }
        }
    }

    /// Step back one history entry.
    pub fn undo(&mut self) -> Result<(), Reason> {
        match self.kernel.undo(&self.document) {
            Ok(document) => {
                self.set_document(document);
                Ok(())
            }
            Err(reason) => {
                self.log_reason(&reason);
                Err(reason)
            }
        }
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> Result<(), Reason> {
        match self.kernel.redo(&self.document) {
            Ok(document) => {
                self.set_document(document);
                Ok(())
            }
            Err(reason) => {
                self.log_reason(&reason);
                Err(reason)
            }
        }
    }

    pub fn begin_group(&mut self, name: &str) -> Result<(), Reason> {
        self.kernel.begin_group(name)
    }

    pub fn end_group(&mut self) -> Result<(), Reason> {
        self.kernel.end_group()
    }

    fn log_reason(&mut self, reason: &Reason) {
        if reason.is_ambiguous() {
            log::info!("Kernel needs disambiguation: {reason}");
        } else {
            log::warn!("Kernel rejected request: {reason}");
        }
        self.reason_log.push_back(reason.to_string());
        while self.reason_log.len() > self.reason_log_capacity {
            self.reason_log.pop_front();
        }
    }

    /// The `n` most recent kernel failures, oldest first.
    pub fn latest_reason_logs(&self, n: usize) -> Vec<String> {
        let skip = self.reason_log.len().saturating_sub(n);
        self.reason_log.iter().skip(skip).cloned().collect()
    }
}

impl std::fmt::Debug for DocStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStore")
            .field("revision", &self.revision)
            .field("entities", &self.entities.len())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DEFAULT_LAYER_ID, Entity, Layer};
    use crate::kernel::{MemoryKernel, codes};

    fn store_with(document: Document) -> DocStore {
        DocStore::new(Box::new(MemoryKernel::new()), document, &EngineConfig::default())
    }

    fn line(id: &str, layer: &str, ax: f64, ay: f64, bx: f64, by: f64) -> Entity {
        Entity::new(id, layer, Geometry::line(Point::new(ax, ay), Point::new(bx, by)))
    }

    #[test]
    fn test_cache_skips_hidden_and_locked_layers() {
        let mut doc = Document::new();
        let mut hidden = Layer::new("hidden", "Hidden");
        hidden.visible = false;
        let mut locked = Layer::new("locked", "Locked");
        locked.locked = true;
        doc.layers.push(hidden);
        doc.layers.push(locked);
        doc.push(line("a", DEFAULT_LAYER_ID, 0.0, 0.0, 1.0, 0.0));
        doc.push(line("b", "hidden", 0.0, 0.0, 1.0, 0.0));
        doc.push(line("c", "locked", 0.0, 0.0, 1.0, 0.0));

        let store = store_with(doc);
        let ids: Vec<&str> = store.entities().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert!(!store.is_layer_visible("hidden"));
        assert!(store.is_layer_locked("locked"));
        assert_eq!(store.document().entities.len(), 3);
    }

    #[test]
    fn test_revision_bumps_on_every_replace() {
        let mut store = store_with(Document::new());
        let r0 = store.revision();
        store.set_document(Document::new());
        assert_eq!(store.revision(), r0 + 1);
        store.set_document_json(r#"{"layers":[],"entities":[]}"#).unwrap();
        assert_eq!(store.revision(), r0 + 2);
    }

    #[test]
    fn test_commit_success_rebuilds() {
        let mut store = store_with(Document::new());
        let before = store.revision();
        store
            .commit(EditOp::CreateLine {
                layer_id: DEFAULT_LAYER_ID.into(),
                a: Point::ZERO,
                b: Point::new(5.0, 0.0),
            })
            .unwrap();
        assert_eq!(store.entities().len(), 1);
        assert!(store.revision() > before);
        assert_eq!(store.spatial_candidates(Point::new(2.0, 0.0), 1.0), vec![0]);
    }

    #[test]
    fn test_commit_failure_keeps_document_and_logs() {
        let mut store = store_with(Document::new());
        let before = store.revision();
        let err = store
            .commit(EditOp::CreateLine {
                layer_id: DEFAULT_LAYER_ID.into(),
                a: Point::ZERO,
                b: Point::ZERO,
            })
            .unwrap_err();
        assert_eq!(err.code, codes::GEOM_DEGENERATE);
        assert_eq!(store.revision(), before);
        assert_eq!(store.latest_reason_logs(5).len(), 1);
    }

    #[test]
    fn test_reason_log_is_capped() {
        let config = EngineConfig {
            reason_log_capacity: 3,
            ..EngineConfig::default()
        };
        let mut store = DocStore::new(Box::new(MemoryKernel::new()), Document::new(), &config);
        for _ in 0..5 {
            let _ = store.undo();
        }
        assert_eq!(store.latest_reason_logs(10).len(), 3);
        assert_eq!(store.latest_reason_logs(1).len(), 1);
    }

    #[test]
    fn test_undo_restores_previous_document() {
        let mut store = store_with(Document::new());
        store
            .commit(EditOp::CreateCircle {
                layer_id: DEFAULT_LAYER_ID.into(),
                c: Point::ZERO,
                r: 3.0,
            })
            .unwrap();
        store.undo().unwrap();
        assert!(store.entities().is_empty());
        store.redo().unwrap();
        assert_eq!(store.entities().len(), 1);
    }

    #[test]
    fn test_selected_entities_filters_cache() {
        let mut doc = Document::new();
        doc.push(line("a", DEFAULT_LAYER_ID, 0.0, 0.0, 1.0, 0.0));
        doc.push(line("b", DEFAULT_LAYER_ID, 0.0, 1.0, 1.0, 1.0));
        let mut store = store_with(doc);
        store.selection_mut().set_single("b");
        let ids: Vec<&str> = store.selected_entities().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_selection_follows_document_replacement() {
        let mut store = store_with(Document::new());
        store
            .commit(EditOp::CreateCircle {
                layer_id: DEFAULT_LAYER_ID.into(),
                c: Point::ZERO,
                r: 3.0,
            })
            .unwrap();
        let id = store.entities()[0].id.clone();
        store.selection_mut().set_single(id);

        store.undo().unwrap();
        assert!(store.selection().is_empty());
        store.redo().unwrap();
        assert!(store.selection().is_empty());

        let mut doc = Document::new();
        doc.push(line("a", DEFAULT_LAYER_ID, 0.0, 0.0, 1.0, 0.0));
        doc.push(line("b", DEFAULT_LAYER_ID, 0.0, 1.0, 1.0, 1.0));
        store.set_document(doc);
        store.selection_mut().set(["a", "b"]);
        let mut doc = store.document().clone();
        doc.entities.retain(|e| e.id != "a");
        store.set_document(doc);
        assert_eq!(store.selection().ids(), vec!["b".to_string()]);
    }
}
