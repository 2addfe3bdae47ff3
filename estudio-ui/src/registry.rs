//! Capability-checked field registry.
//!
//! Stands in for the page: only elements confirmed present are bound at
//! setup, and every later access goes through the registry, which skips
//! absent bindings explicitly instead of guarding each call site. Each
//! bound field carries its displayed text and a focus flag; the semáforo
//! indicator and the ROI bar are modeled as dedicated widgets because their
//! update rules differ from plain text fields.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use estudio_core::Semaforo;

/// Stable field ids, matching the form's element names.
pub mod campos {
    pub const NOMBRE: &str = "nombre";
    pub const DIRECCION: &str = "direccion";
    pub const REFERENCIA_CATASTRAL: &str = "referencia_catastral";
    pub const TIPOLOGIA: &str = "tipologia";
    pub const SUPERFICIE_M2: &str = "superficie_m2";
    pub const ESTADO_INMUEBLE: &str = "estado_inmueble";
    pub const SITUACION: &str = "situacion";

    pub const PRECIO_ESCRITURA: &str = "precio_escritura";
    pub const VALOR_REFERENCIA: &str = "valor_referencia";
    pub const GASTOS_EXTRAS: &str = "gastos_extras";
    pub const ITP: &str = "itp";
    pub const NOTARIA: &str = "notaria";
    pub const REGISTRO: &str = "registro";
    pub const VALOR_ADQUISICION: &str = "valor_adquisicion";
    pub const MEDIA_VALORACIONES: &str = "media_valoraciones";

    pub const VAL_IDEALISTA: &str = "val_idealista";
    pub const VAL_FOTOCASA: &str = "val_fotocasa";
    pub const VAL_REGISTRADORES: &str = "val_registradores";
    pub const VAL_CASAFARI: &str = "val_casafari";
    pub const VAL_TASACION: &str = "val_tasacion";

    pub const DECISION_ESTADO: &str = "decision_estado";
    pub const DECISION_UBICACION: &str = "decision_ubicacion";
    pub const DECISION_ESTADO_INMUEBLE: &str = "decision_estado_inmueble";
    pub const DECISION_MERCADO: &str = "decision_mercado";
    pub const DECISION_RIESGO: &str = "decision_riesgo";
    pub const DECISION_COMENTARIO: &str = "decision_comentario";
    pub const DECISION_RESUMEN: &str = "decision_resumen";

    pub const INVERSURE_COMISION_PCT: &str = "inversure_comision_pct";

    pub const KPI_VALOR_ADQUISICION: &str = "kpi_valor_adquisicion";
    pub const KPI_VALOR_TRANSMISION: &str = "kpi_valor_transmision";
    pub const KPI_BENEFICIO_BRUTO: &str = "kpi_beneficio_bruto";
    pub const KPI_ROI: &str = "kpi_roi";
    pub const KPI_MARGEN: &str = "kpi_margen";
    pub const KPI_RATIO_EURO_BENEFICIO: &str = "kpi_ratio_euro_beneficio";
    pub const KPI_COLCHON_SEGURIDAD: &str = "kpi_colchon_seguridad";
    pub const KPI_BREAKEVEN: &str = "kpi_breakeven";
    pub const KPI_NIVEL_RIESGO: &str = "kpi_nivel_riesgo";
    pub const KPI_DECISION_TEXTO: &str = "kpi_decision_texto";
    pub const KPI_CONCLUSION: &str = "kpi_conclusion";

    pub const INV_COMISION: &str = "inv_comision";
    pub const INV_BENEFICIO_NETO: &str = "inv_beneficio_neto";
    pub const INV_ROI_NETO: &str = "inv_roi_neto";

    /// Valuation inputs share a stable prefix; the state keys them by id.
    pub fn es_valoracion(id: &str) -> bool {
        id.starts_with("val_")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    CurrencyInput,
    QuantityInput,
    TextInput,
    /// Display-only element, never focusable, always overwritten.
    Kpi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub text: String,
    pub focused: bool,
}

/// Exclusive-choice three-light indicator. At most one light is active;
/// the render pass dims all three before activating the current tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SemaforoWidget {
    pub verde: bool,
    pub amarillo: bool,
    pub rojo: bool,
}

impl SemaforoWidget {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn activar(&mut self, tier: Semaforo) {
        self.reset();
        match tier {
            Semaforo::Verde => self.verde = true,
            Semaforo::Amarillo => self.amarillo = true,
            Semaforo::Rojo => self.rojo = true,
        }
    }

    pub fn activo(&self) -> Option<Semaforo> {
        match (self.verde, self.amarillo, self.rojo) {
            (true, false, false) => Some(Semaforo::Verde),
            (false, true, false) => Some(Semaforo::Amarillo),
            (false, false, true) => Some(Semaforo::Rojo),
            _ => None,
        }
    }
}

/// ROI bar: the width is the ROI clamped to [0, 50]; the label always shows
/// the true value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoiBar {
    pub ancho: Decimal,
    pub etiqueta: String,
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, Field>,
    pub semaforo: Option<SemaforoWidget>,
    pub roi_bar: Option<RoiBar>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every element of the full study page bound.
    pub fn pagina_estudio() -> Self {
        use campos::*;
        let mut registry = Self::new();
        for id in [NOMBRE, DIRECCION, REFERENCIA_CATASTRAL, TIPOLOGIA, ESTADO_INMUEBLE, SITUACION] {
            registry.bind(id, FieldKind::TextInput);
        }
        registry.bind(SUPERFICIE_M2, FieldKind::QuantityInput);
        for id in [
            PRECIO_ESCRITURA,
            VALOR_REFERENCIA,
            GASTOS_EXTRAS,
            ITP,
            NOTARIA,
            REGISTRO,
            VALOR_ADQUISICION,
            MEDIA_VALORACIONES,
            VAL_IDEALISTA,
            VAL_FOTOCASA,
            VAL_REGISTRADORES,
            VAL_CASAFARI,
            VAL_TASACION,
        ] {
            registry.bind(id, FieldKind::CurrencyInput);
        }
        for id in [
            DECISION_ESTADO,
            DECISION_UBICACION,
            DECISION_ESTADO_INMUEBLE,
            DECISION_MERCADO,
            DECISION_RIESGO,
            DECISION_COMENTARIO,
            DECISION_RESUMEN,
        ] {
            registry.bind(id, FieldKind::TextInput);
        }
        registry.bind(INVERSURE_COMISION_PCT, FieldKind::QuantityInput);
        for id in [
            KPI_VALOR_ADQUISICION,
            KPI_VALOR_TRANSMISION,
            KPI_BENEFICIO_BRUTO,
            KPI_ROI,
            KPI_MARGEN,
            KPI_RATIO_EURO_BENEFICIO,
            KPI_COLCHON_SEGURIDAD,
            KPI_BREAKEVEN,
            KPI_NIVEL_RIESGO,
            KPI_DECISION_TEXTO,
            KPI_CONCLUSION,
            INV_COMISION,
            INV_BENEFICIO_NETO,
            INV_ROI_NETO,
        ] {
            registry.bind(id, FieldKind::Kpi);
        }
        registry.semaforo = Some(SemaforoWidget::default());
        registry.roi_bar = Some(RoiBar::default());
        registry
    }

    pub fn bind(
        &mut self,
        id: &str,
        kind: FieldKind,
    ) {
        self.fields.insert(
            id.to_string(),
            Field {
                kind,
                text: String::new(),
                focused: false,
            },
        );
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(|f| f.text.as_str())
    }

    pub fn kind(&self, id: &str) -> Option<FieldKind> {
        self.fields.get(id).map(|f| f.kind)
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.fields.get(id).is_some_and(|f| f.focused)
    }

    pub fn focus(&mut self, id: &str) {
        if let Some(field) = self.fields.get_mut(id) {
            if field.kind != FieldKind::Kpi {
                field.focused = true;
            }
        }
    }

    pub fn blur(&mut self, id: &str) {
        if let Some(field) = self.fields.get_mut(id) {
            field.focused = false;
        }
    }

    /// Unconditional write: user keystrokes and initial markup hydration.
    pub fn set_text(
        &mut self,
        id: &str,
        text: &str,
    ) {
        if let Some(field) = self.fields.get_mut(id) {
            field.text = text.to_string();
        }
    }

    /// View-sync write: skipped for unbound ids and for focused inputs so an
    /// in-progress keystroke is never clobbered. KPI elements are always
    /// overwritten.
    pub fn project(
        &mut self,
        id: &str,
        text: String,
    ) {
        let Some(field) = self.fields.get_mut(id) else {
            return;
        };
        if field.focused && field.kind != FieldKind::Kpi {
            return;
        }
        field.text = text;
    }

    /// Bound input ids (everything except KPI displays), in stable order.
    pub fn input_ids(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, f)| f.kind != FieldKind::Kpi)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Bound valuation input ids.
    pub fn valoracion_ids(&self) -> Vec<String> {
        self.fields
            .keys()
            .filter(|id| campos::es_valoracion(id))
            .cloned()
            .collect()
    }
}
