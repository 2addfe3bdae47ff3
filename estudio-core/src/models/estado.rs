use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Comite;

/// The study state: single source of truth for one feasibility study.
///
/// Field names double as the wire keys of the persisted snapshot and the
/// save-endpoint payload, so they keep the Spanish names of the form they
/// mirror. Derived fields (`itp` through `valor_transmision` and the
/// computed part of `comite`) are written only by
/// [`crate::engine::recompute`]; everything else is user input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstadoEstudio {
    /// Opaque study identifier; seeded from the `codigo` query parameter or
    /// adopted from the save endpoint's response after the first save.
    pub id: Option<String>,

    // Descriptive fields, persisted but not used in arithmetic
    pub nombre: String,
    pub direccion: String,
    pub referencia_catastral: String,
    pub tipologia: String,
    pub superficie_m2: Option<Decimal>,
    pub estado_inmueble: String,
    pub situacion: String,

    // Acquisition inputs
    pub precio_escritura: Option<Decimal>,
    pub valor_referencia: Option<Decimal>,
    pub gastos_extras: Option<Decimal>,

    // Derived acquisition fields
    pub itp: Option<Decimal>,
    pub notaria: Option<Decimal>,
    pub registro: Option<Decimal>,
    pub valor_adquisicion: Option<Decimal>,

    // Market valuations, keyed by the stable per-field id
    pub valoraciones: BTreeMap<String, Decimal>,
    pub media_valoraciones: Option<Decimal>,
    pub valor_transmision: Option<Decimal>,

    pub comite: Comite,
}

impl EstadoEstudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every field back to its type-appropriate empty value,
    /// including `id`. Callers tracking the active study code clear it
    /// separately.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn reset_restores_default_shape() {
        let mut estado = EstadoEstudio::new();
        estado.id = Some("7".into());
        estado.precio_escritura = Some(dec!(200000));
        estado.valoraciones.insert("val_idealista".into(), dec!(210000));
        estado.comite.nivel_riesgo = "Bajo".into();

        estado.reset();

        assert_eq!(estado, EstadoEstudio::default());
    }

    #[test]
    fn snapshot_merge_ignores_unknown_keys_and_default_fills_subrecords() {
        // A persisted blob from an older page version: extra key, no comite,
        // no valoraciones.
        let raw = r#"{"precio_escritura":"150000","campo_retirado":true}"#;
        let estado: EstadoEstudio = serde_json::from_str(raw).unwrap();

        assert_eq!(estado.precio_escritura, Some(dec!(150000)));
        assert!(estado.valoraciones.is_empty());
        assert_eq!(estado.comite, Comite::default());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut estado = EstadoEstudio::new();
        estado.id = Some("12".into());
        estado.nombre = "Piso Chamberí".into();
        estado.precio_escritura = Some(dec!(200000));
        estado.valoraciones.insert("val_fotocasa".into(), dec!(240000));

        let json = serde_json::to_string(&estado).unwrap();
        let back: EstadoEstudio = serde_json::from_str(&json).unwrap();

        assert_eq!(back, estado);
    }
}
