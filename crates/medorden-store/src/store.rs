use dashmap::DashMap;
use medorden_core::{CaseRecord, Result, Space};
use papaya::HashMap as PapayaHashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type StorageKey = String; // Format: "space/caseId"

pub(crate) fn make_storage_key(espacio: Space, id: &str) -> StorageKey {
    format!("{espacio}/{id}")
}

/// In-memory case store keyed by `(space, caseId)`.
///
/// Storage is a papaya lock-free map; writes for the same case key are
/// serialized through a per-key async mutex so the read-merge-write sequence
/// in [`CaseStore::update`] is atomic with respect to concurrent requests for
/// the same case. The store is explicitly ephemeral: nothing survives the
/// process, and [`CaseStore::remove_case`] is the only reclamation path.
#[derive(Debug, Default)]
pub struct CaseStore {
    data: Arc<PapayaHashMap<StorageKey, CaseRecord>>,
    /// Per-case-key write locks; entries are dropped with the case.
    locks: DashMap<StorageKey, Arc<Mutex<()>>>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn get(&self, espacio: Space, id: &str) -> Option<CaseRecord> {
        let key = make_storage_key(espacio, id);
        let guard = self.data.pin();
        guard.get(&key).cloned()
    }

    /// Replace the record for `(espacio, id)` unconditionally.
    pub fn put(&self, espacio: Space, id: &str, record: CaseRecord) {
        let key = make_storage_key(espacio, id);
        let guard = self.data.pin();
        guard.insert(key, record);
    }

    /// Merge a partial update into the stored record, creating it when absent.
    ///
    /// Runs under the case key's mutex: two concurrent updates for the same
    /// `(espacio, id)` cannot interleave their read and write, so neither can
    /// drop fields the other just merged. Returns the merged record.
    pub async fn update(&self, espacio: Space, id: &str, entrante: CaseRecord) -> Result<CaseRecord> {
        if entrante.espacio() != espacio {
            return Err(medorden_core::CoreError::validation(format!(
                "record shape '{}' does not match space '{espacio}'",
                entrante.espacio()
            )));
        }
        let key = make_storage_key(espacio, id);
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let pin = self.data.pin();
        let base = match pin.get(&key) {
            Some(existente) => Some(existente.clone()),
            // First write goes through the same merge so empty values are
            // normalized and shape mismatches are caught on creation too.
            None => CaseRecord::vacio(espacio),
        };
        let merged = match base {
            Some(mut actual) => {
                actual.merge_from(entrante)?;
                actual
            }
            None => entrante,
        };
        pin.insert(key, merged.clone());
        Ok(merged)
    }

    pub fn delete(&self, espacio: Space, id: &str) -> bool {
        let key = make_storage_key(espacio, id);
        let removed = {
            let guard = self.data.pin();
            guard.remove(&key).is_some()
        };
        self.locks.remove(&key);
        removed
    }

    /// Remove every namespaced entry for a case at once.
    ///
    /// Returns how many spaces actually held data for the id.
    pub fn remove_case(&self, id: &str) -> usize {
        let mut removed = 0;
        for espacio in Space::TODOS {
            if self.delete(espacio, id) {
                removed += 1;
            }
        }
        tracing::debug!(case = id, removed, "case removed from store");
        removed
    }

    pub fn count(&self) -> usize {
        let guard = self.data.pin();
        guard.len()
    }

    pub fn count_space(&self, espacio: Space) -> usize {
        let prefix = format!("{espacio}/");
        let guard = self.data.pin();
        guard.iter().filter(|(k, _)| k.starts_with(&prefix)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medorden_core::{MetaRecord, TraumaRecord};
    use serde_json::json;

    fn trauma_update(valor: serde_json::Value) -> CaseRecord {
        CaseRecord::parse(Space::Trauma, valor).unwrap()
    }

    #[tokio::test]
    async fn test_store_basic_operations() {
        let store = CaseStore::new();
        assert!(store.get(Space::Trauma, "c1").is_none());

        store
            .update(Space::Trauma, "c1", trauma_update(json!({"zonaDolor": "rodilla"})))
            .await
            .unwrap();
        assert_eq!(store.count(), 1);

        let rec = store.get(Space::Trauma, "c1").unwrap();
        let CaseRecord::Trauma(t) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(t.zona_dolor.as_deref(), Some("rodilla"));

        assert!(store.delete(Space::Trauma, "c1"));
        assert!(!store.delete(Space::Trauma, "c1"));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_instead_of_replacing() {
        let store = CaseStore::new();
        store
            .update(
                Space::Trauma,
                "c1",
                trauma_update(json!({"examenesIA": ["Radiografía"]})),
            )
            .await
            .unwrap();

        // Later update without exams must not drop them.
        let merged = store
            .update(Space::Trauma, "c1", trauma_update(json!({"lado": "derecha"})))
            .await
            .unwrap();
        let CaseRecord::Trauma(t) = merged else {
            panic!("wrong shape")
        };
        assert_eq!(t.examenes_ia, vec!["Radiografía"]);
        assert_eq!(t.lado.as_deref(), Some("derecha"));
    }

    #[tokio::test]
    async fn test_spaces_are_independent_for_same_id() {
        let store = CaseStore::new();
        store
            .update(Space::Trauma, "c1", trauma_update(json!({"zonaDolor": "rodilla"})))
            .await
            .unwrap();
        store.put(
            Space::Meta,
            "c1",
            CaseRecord::Meta(MetaRecord {
                modulo_autorizado: Space::Trauma,
            }),
        );

        assert!(store.get(Space::Trauma, "c1").is_some());
        assert!(store.get(Space::Meta, "c1").is_some());
        assert!(store.get(Space::Preop, "c1").is_none());
        assert_eq!(store.count_space(Space::Trauma), 1);
        assert_eq!(store.count_space(Space::Preop), 0);
    }

    #[tokio::test]
    async fn test_remove_case_clears_every_space() {
        let store = CaseStore::new();
        store
            .update(Space::Trauma, "c1", trauma_update(json!({"zonaDolor": "rodilla"})))
            .await
            .unwrap();
        store
            .update(
                Space::Ia,
                "c1",
                CaseRecord::parse(Space::Ia, json!({"tipoExamen": "RM"})).unwrap(),
            )
            .await
            .unwrap();
        store.put(
            Space::Meta,
            "c1",
            CaseRecord::Meta(MetaRecord {
                modulo_autorizado: Space::Ia,
            }),
        );
        // A different case survives the reset.
        store
            .update(Space::Trauma, "c2", trauma_update(json!({"zonaDolor": "hombro"})))
            .await
            .unwrap();

        assert_eq!(store.remove_case("c1"), 3);
        for espacio in Space::TODOS {
            assert!(store.get(espacio, "c1").is_none(), "space {espacio} not cleared");
        }
        assert!(store.get(Space::Trauma, "c2").is_some());
        assert_eq!(store.remove_case("c1"), 0);
    }

    #[tokio::test]
    async fn test_shape_mismatch_update_fails() {
        let store = CaseStore::new();
        store
            .update(Space::Trauma, "c1", trauma_update(json!({"zonaDolor": "rodilla"})))
            .await
            .unwrap();
        let err = store
            .update(
                Space::Trauma,
                "c1",
                CaseRecord::parse(Space::Preop, json!({})).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_concurrent_updates_same_case_lose_nothing() {
        use tokio::task::JoinSet;

        let store = Arc::new(CaseStore::new());
        let mut join_set = JoinSet::new();

        for i in 0..50 {
            let store = Arc::clone(&store);
            join_set.spawn(async move {
                let update = match i % 3 {
                    0 => json!({"paciente": {"nombre": "Ana"}}),
                    1 => json!({"zonaDolor": "rodilla"}),
                    _ => json!({"examenesIA": ["Radiografía de rodilla"]}),
                };
                store
                    .update(Space::Trauma, "carrera", trauma_update(update))
                    .await
                    .unwrap();
            });
        }
        while let Some(res) = join_set.join_next().await {
            res.unwrap();
        }

        let CaseRecord::Trauma(t) = store.get(Space::Trauma, "carrera").unwrap() else {
            panic!("wrong shape")
        };
        assert_eq!(t.paciente.nombre.as_deref(), Some("Ana"));
        assert_eq!(t.zona_dolor.as_deref(), Some("rodilla"));
        assert_eq!(t.examenes_ia, vec!["Radiografía de rodilla"]);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_cases_are_independent() {
        use tokio::task::JoinSet;

        let store = Arc::new(CaseStore::new());
        let mut join_set = JoinSet::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            join_set.spawn(async move {
                store
                    .update(
                        Space::Generales,
                        &format!("caso-{i}"),
                        CaseRecord::parse(Space::Generales, json!({"motivoConsulta": "control"}))
                            .unwrap(),
                    )
                    .await
                    .unwrap();
            });
        }
        while let Some(res) = join_set.join_next().await {
            res.unwrap();
        }
        assert_eq!(store.count_space(Space::Generales), 20);
    }

    #[test]
    fn test_make_storage_key() {
        assert_eq!(make_storage_key(Space::Trauma, "abc"), "trauma/abc");
        assert_eq!(make_storage_key(Space::Meta, "x/y"), "meta/x/y");
    }

    #[tokio::test]
    async fn test_put_replaces_whole_record() {
        let store = CaseStore::new();
        store
            .update(Space::Trauma, "c1", trauma_update(json!({"zonaDolor": "rodilla"})))
            .await
            .unwrap();
        store.put(
            Space::Trauma,
            "c1",
            CaseRecord::Trauma(TraumaRecord::default()),
        );
        let CaseRecord::Trauma(t) = store.get(Space::Trauma, "c1").unwrap() else {
            panic!("wrong shape")
        };
        assert!(t.zona_dolor.is_none());
    }
}
