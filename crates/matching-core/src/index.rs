//! In-memory entity index. Readers take a cheap snapshot reference that
//! stays valid across any concurrent replacement; writers build a whole
//! new state off to the side and publish it in one swap, so no reader
//! ever observes a half-installed list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use watchgate_core::{Entity, EntityKind, SourceList};

#[derive(Default)]
struct IndexState {
    entities: Vec<Arc<Entity>>,
    by_id: HashMap<String, Arc<Entity>>,
    by_source: HashMap<SourceList, Vec<Arc<Entity>>>,
    by_kind: HashMap<EntityKind, Vec<Arc<Entity>>>,
}

impl IndexState {
    fn build(entities: Vec<Arc<Entity>>) -> Self {
        let mut state = IndexState {
            entities: Vec::with_capacity(entities.len()),
            by_id: HashMap::with_capacity(entities.len()),
            by_source: HashMap::new(),
            by_kind: HashMap::new(),
        };
        for entity in entities {
            // Last write wins per id; the views must stay consistent
            // with the dedup.
            if state.by_id.insert(entity.id.clone(), entity.clone()).is_some() {
                state.entities.retain(|e| e.id != entity.id);
                for list in state.by_source.values_mut() {
                    list.retain(|e| e.id != entity.id);
                }
                for list in state.by_kind.values_mut() {
                    list.retain(|e| e.id != entity.id);
                }
            }
            state.by_source.entry(entity.source).or_default().push(entity.clone());
            state.by_kind.entry(entity.kind).or_default().push(entity.clone());
            state.entities.push(entity);
        }
        state
    }
}

pub struct EntityIndex {
    state: RwLock<Arc<IndexState>>,
}

impl Default for EntityIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIndex {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(IndexState::default())),
        }
    }

    fn snapshot(&self) -> Arc<IndexState> {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn publish(&self, next: IndexState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = Arc::new(next);
        }
    }

    /// Appends entities to the current state. The combined state becomes
    /// visible all at once when the method returns.
    pub fn add_all(&self, entities: Vec<Entity>) {
        if entities.is_empty() {
            return;
        }
        let current = self.snapshot();
        let mut combined: Vec<Arc<Entity>> = current.entities.clone();
        combined.extend(entities.into_iter().map(Arc::new));
        let count = combined.len();
        self.publish(IndexState::build(combined));
        tracing::info!(count, "extended entity index");
    }

    /// Replaces the whole index in one atomic publication. Concurrent
    /// readers keep whichever snapshot they already hold.
    pub fn replace_all(&self, entities: Vec<Entity>) {
        let count = entities.len();
        let next = IndexState::build(entities.into_iter().map(Arc::new).collect());
        self.publish(next);
        tracing::info!(count, "replaced entity index");
    }

    pub fn get_all(&self) -> Vec<Arc<Entity>> {
        self.snapshot().entities.clone()
    }

    pub fn get_by_source(&self, source: SourceList) -> Vec<Arc<Entity>> {
        self.snapshot().by_source.get(&source).cloned().unwrap_or_default()
    }

    pub fn get_by_kind(&self, kind: EntityKind) -> Vec<Arc<Entity>> {
        self.snapshot().by_kind.get(&kind).cloned().unwrap_or_default()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Arc<Entity>> {
        self.snapshot().by_id.get(id).cloned()
    }

    /// Candidate set for a search, honoring the optional filters via the
    /// precomputed views.
    pub fn candidates(
        &self,
        source: Option<SourceList>,
        kind: Option<EntityKind>,
    ) -> Vec<Arc<Entity>> {
        let snapshot = self.snapshot();
        match (source, kind) {
            (None, None) => snapshot.entities.clone(),
            (Some(source), None) => snapshot.by_source.get(&source).cloned().unwrap_or_default(),
            (None, Some(kind)) => snapshot.by_kind.get(&kind).cloned().unwrap_or_default(),
            (Some(source), Some(kind)) => snapshot
                .by_source
                .get(&source)
                .map(|list| {
                    list.iter()
                        .filter(|e| e.kind == kind)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.publish(IndexState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn entity(id: &str, source: SourceList, kind: EntityKind) -> Entity {
        Entity::new(id, id, format!("Entity {id}"), kind, source)
    }

    #[test]
    fn add_all_extends_views() {
        let index = EntityIndex::new();
        index.add_all(vec![
            entity("a", SourceList::OfacSdn, EntityKind::Person),
            entity("b", SourceList::EuCsl, EntityKind::Business),
        ]);
        index.add_all(vec![entity("c", SourceList::OfacSdn, EntityKind::Person)]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get_by_source(SourceList::OfacSdn).len(), 2);
        assert_eq!(index.get_by_kind(EntityKind::Business).len(), 1);
    }

    #[test]
    fn duplicate_ids_keep_the_last_record() {
        let index = EntityIndex::new();
        let mut updated = entity("a", SourceList::OfacSdn, EntityKind::Person);
        updated.name = "Updated".to_string();
        index.replace_all(vec![entity("a", SourceList::OfacSdn, EntityKind::Person), updated]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get_by_id("a").unwrap().name, "Updated");
        assert_eq!(index.get_by_source(SourceList::OfacSdn).len(), 1);
    }

    #[test]
    fn candidates_apply_both_filters() {
        let index = EntityIndex::new();
        index.replace_all(vec![
            entity("a", SourceList::OfacSdn, EntityKind::Person),
            entity("b", SourceList::OfacSdn, EntityKind::Business),
            entity("c", SourceList::EuCsl, EntityKind::Person),
        ]);

        let filtered = index.candidates(Some(SourceList::OfacSdn), Some(EntityKind::Person));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
        assert_eq!(index.candidates(None, None).len(), 3);
    }

    #[test]
    fn clear_empties_everything() {
        let index = EntityIndex::new();
        index.replace_all(vec![entity("a", SourceList::OfacSdn, EntityKind::Person)]);
        index.clear();
        assert!(index.is_empty());
        assert!(index.get_by_id("a").is_none());
    }

    #[test]
    fn readers_see_one_version_under_concurrent_replace() {
        let index = Arc::new(EntityIndex::new());
        let old: Vec<Entity> = (0..50)
            .map(|i| entity(&format!("old-{i}"), SourceList::OfacSdn, EntityKind::Person))
            .collect();
        index.replace_all(old);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let reader = index.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    let all = reader.get_all();
                    let olds = all.iter().filter(|e| e.id.starts_with("old-")).count();
                    let news = all.iter().filter(|e| e.id.starts_with("new-")).count();
                    // Either fully old or fully new, never a mix.
                    assert!(olds == 0 || news == 0, "mixed snapshot: {olds} old, {news} new");
                    assert!(all.len() == 50 || all.len() == 30);
                }
            }));
        }

        let writer = index.clone();
        let write_handle = thread::spawn(move || {
            for _ in 0..20 {
                let new: Vec<Entity> = (0..30)
                    .map(|i| entity(&format!("new-{i}"), SourceList::EuCsl, EntityKind::Business))
                    .collect();
                writer.replace_all(new);
                let old: Vec<Entity> = (0..50)
                    .map(|i| entity(&format!("old-{i}"), SourceList::OfacSdn, EntityKind::Person))
                    .collect();
                writer.replace_all(old);
            }
        });

        for handle in handles {
            handle.join().unwrap();
        }
        write_handle.join().unwrap();
    }
}
