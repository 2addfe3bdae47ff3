//! Snapshot bridge between the study state and the session store.
//!
//! Every persisted study is written twice: under the constant current-study
//! key (always overwritten, used to resume the last session) and, once an
//! id is known, under an id-scoped key so multiple studies coexist within
//! one session. A third key holds the index of saved studies for the
//! listing view. All writes are best-effort; failures are logged and
//! swallowed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use estudio_core::EstadoEstudio;

use crate::session::SessionStore;

/// Key for the last-used study snapshot.
pub const CLAVE_ESTUDIO_ACTUAL: &str = "estudio_actual";

/// Key for the `{id, timestamp, snapshot}` index of saved studies.
pub const CLAVE_INDICE: &str = "estudios_indice";

fn clave_estudio(id: &str) -> String {
    format!("estudio:{id}")
}

/// One entry of the saved-studies index, upserted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntradaIndice {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot: EstadoEstudio,
}

pub struct SnapshotBridge<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> SnapshotBridge<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists the study under the current key and, when an id is known,
    /// under its scoped key plus the index.
    pub fn persist(&mut self, estado: &EstadoEstudio) {
        let json = match serde_json::to_string(estado) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("snapshot serialization failed: {e}");
                return;
            }
        };
        self.escribir(CLAVE_ESTUDIO_ACTUAL, json.clone());
        if let Some(id) = estado.id.as_deref() {
            self.escribir(&clave_estudio(id), json);
            self.upsert_indice(id, estado);
        }
    }

    /// Restores a snapshot: the id-scoped one when `id` is given and
    /// present, otherwise the last-used snapshot. `None` when neither
    /// exists or the stored blob no longer parses.
    pub fn load(&self, id: Option<&str>) -> Option<EstadoEstudio> {
        let raw = id
            .and_then(|i| self.store.get(&clave_estudio(i)))
            .or_else(|| self.store.get(CLAVE_ESTUDIO_ACTUAL))?;
        match serde_json::from_str(&raw) {
            Ok(estado) => Some(estado),
            Err(e) => {
                tracing::warn!("discarding unreadable snapshot: {e}");
                None
            }
        }
    }

    /// Removes a study's scoped key and index entry. The current-study key
    /// is left to the caller, who typically persists a reset state next.
    pub fn remove(&mut self, id: &str) {
        self.store.remove(&clave_estudio(id));
        let mut indice = self.leer_indice();
        indice.retain(|e| e.id != id);
        self.escribir_indice(&indice);
    }

    /// The saved-studies index, most recently saved last.
    pub fn list(&self) -> Vec<EntradaIndice> {
        self.leer_indice()
    }

    fn upsert_indice(
        &mut self,
        id: &str,
        estado: &EstadoEstudio,
    ) {
        let mut indice = self.leer_indice();
        indice.retain(|e| e.id != id);
        indice.push(EntradaIndice {
            id: id.to_string(),
            timestamp: Utc::now(),
            snapshot: estado.clone(),
        });
        self.escribir_indice(&indice);
    }

    fn leer_indice(&self) -> Vec<EntradaIndice> {
        let Some(raw) = self.store.get(CLAVE_INDICE) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable study index: {e}");
            Vec::new()
        })
    }

    fn escribir_indice(
        &mut self,
        indice: &[EntradaIndice],
    ) {
        match serde_json::to_string(indice) {
            Ok(json) => self.escribir(CLAVE_INDICE, json),
            Err(e) => tracing::warn!("index serialization failed: {e}"),
        }
    }

    fn escribir(
        &mut self,
        key: &str,
        value: String,
    ) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, "session write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::session::MemoryStore;

    use super::*;

    fn estudio(id: Option<&str>) -> EstadoEstudio {
        let mut estado = EstadoEstudio::new();
        estado.id = id.map(str::to_string);
        estado.nombre = "Ático Ruzafa".into();
        estado.precio_escritura = Some(dec!(180000));
        estado
    }

    #[test]
    fn persist_without_id_writes_only_current_key() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());

        bridge.persist(&estudio(None));

        assert_eq!(bridge.load(None), Some(estudio(None)));
        assert!(bridge.list().is_empty());
    }

    #[test]
    fn persist_with_id_writes_scoped_key_and_index() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());

        bridge.persist(&estudio(Some("12")));

        assert_eq!(bridge.load(Some("12")), Some(estudio(Some("12"))));
        let indice = bridge.list();
        assert_eq!(indice.len(), 1);
        assert_eq!(indice[0].id, "12");
        assert_eq!(indice[0].snapshot, estudio(Some("12")));
    }

    #[test]
    fn studies_coexist_under_scoped_keys() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());
        let mut otro = estudio(Some("13"));
        otro.nombre = "Chalet Godella".into();

        bridge.persist(&estudio(Some("12")));
        bridge.persist(&otro);

        assert_eq!(bridge.load(Some("12")), Some(estudio(Some("12"))));
        assert_eq!(bridge.load(Some("13")), Some(otro));
        assert_eq!(bridge.list().len(), 2);
    }

    #[test]
    fn load_prefers_scoped_key_and_falls_back_to_current() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());
        bridge.persist(&estudio(Some("12")));
        bridge.persist(&estudio(None)); // current key now holds the id-less study

        assert_eq!(bridge.load(Some("12")), Some(estudio(Some("12"))));
        // Unknown id falls back to the last-used snapshot.
        assert_eq!(bridge.load(Some("99")), Some(estudio(None)));
    }

    #[test]
    fn repeated_persist_upserts_index_entry() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());
        bridge.persist(&estudio(Some("12")));

        let mut cambiado = estudio(Some("12"));
        cambiado.precio_escritura = Some(dec!(185000));
        bridge.persist(&cambiado);

        let indice = bridge.list();
        assert_eq!(indice.len(), 1);
        assert_eq!(indice[0].snapshot.precio_escritura, Some(dec!(185000)));
    }

    #[test]
    fn remove_drops_scoped_key_and_index_entry() {
        let mut bridge = SnapshotBridge::new(MemoryStore::new());
        bridge.persist(&estudio(Some("12")));

        bridge.remove("12");

        assert!(bridge.list().is_empty());
        // The current key still resolves; only the scoped copy is gone.
        assert_eq!(bridge.load(Some("12")), Some(estudio(Some("12"))));
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let mut bridge = SnapshotBridge::new(MemoryStore::with_quota(4));

        // Writes fail but nothing panics and the study keeps working.
        bridge.persist(&estudio(Some("12")));

        assert_eq!(bridge.load(Some("12")), None);
        assert!(bridge.list().is_empty());
    }

    #[test]
    fn unreadable_snapshot_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(CLAVE_ESTUDIO_ACTUAL, "{not json".into()).unwrap();
        let bridge = SnapshotBridge::new(store);

        assert_eq!(bridge.load(None), None);
    }
}
