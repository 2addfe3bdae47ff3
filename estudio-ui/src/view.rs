//! One-directional projection of the study state into the field registry.
//!
//! The state is the sole source of truth; this pass only writes. Inputs
//! holding focus keep their in-progress text, KPI displays are always
//! refreshed, and absent bindings are skipped by the registry itself.

use rust_decimal::Decimal;

use estudio_core::EstadoEstudio;
use estudio_core::money::{format_currency, format_quantity};

use crate::registry::{FieldRegistry, campos};

/// Upper bound of the ROI bar's width scale.
const ROI_BAR_MAX: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Formats a percentage KPI, blank when the value is absent.
pub(crate) fn porcentaje(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{} %", format_quantity(Some(v), 2)),
        None => String::new(),
    }
}

/// Renders the whole page from the state.
pub fn render(
    estado: &EstadoEstudio,
    registry: &mut FieldRegistry,
) {
    use campos::*;

    // Descriptive inputs
    registry.project(NOMBRE, estado.nombre.clone());
    registry.project(DIRECCION, estado.direccion.clone());
    registry.project(REFERENCIA_CATASTRAL, estado.referencia_catastral.clone());
    registry.project(TIPOLOGIA, estado.tipologia.clone());
    registry.project(SUPERFICIE_M2, format_quantity(estado.superficie_m2, 2));
    registry.project(ESTADO_INMUEBLE, estado.estado_inmueble.clone());
    registry.project(SITUACION, estado.situacion.clone());

    // Acquisition inputs and their derived siblings (notaría/registro render
    // as editable text but are recomputed every cycle)
    registry.project(PRECIO_ESCRITURA, format_currency(estado.precio_escritura));
    registry.project(VALOR_REFERENCIA, format_currency(estado.valor_referencia));
    registry.project(GASTOS_EXTRAS, format_currency(estado.gastos_extras));
    registry.project(ITP, format_currency(estado.itp));
    registry.project(NOTARIA, format_currency(estado.notaria));
    registry.project(REGISTRO, format_currency(estado.registro));
    registry.project(VALOR_ADQUISICION, format_currency(estado.valor_adquisicion));
    registry.project(MEDIA_VALORACIONES, format_currency(estado.media_valoraciones));

    // Valuation inputs render their stored value back in canonical form
    for id in registry.valoracion_ids() {
        let valor = estado.valoraciones.get(&id).copied();
        registry.project(&id, format_currency(valor));
    }

    // KPI displays
    registry.project(KPI_VALOR_ADQUISICION, format_currency(estado.valor_adquisicion));
    registry.project(KPI_VALOR_TRANSMISION, format_currency(estado.valor_transmision));
    let comite = &estado.comite;
    registry.project(KPI_BENEFICIO_BRUTO, format_currency(comite.beneficio_bruto));
    registry.project(KPI_ROI, porcentaje(comite.roi));
    registry.project(KPI_MARGEN, porcentaje(comite.margen_pct));
    registry.project(
        KPI_RATIO_EURO_BENEFICIO,
        format_quantity(comite.ratio_euro_beneficio, 4),
    );
    registry.project(KPI_COLCHON_SEGURIDAD, format_currency(Some(comite.colchon_seguridad)));
    registry.project(KPI_BREAKEVEN, format_currency(Some(comite.breakeven)));
    registry.project(KPI_NIVEL_RIESGO, comite.nivel_riesgo.clone());
    registry.project(KPI_DECISION_TEXTO, comite.decision_texto.clone());
    registry.project(KPI_CONCLUSION, comite.conclusion.clone());

    // Semáforo: dim all three, then light the current tier
    if let Some(widget) = registry.semaforo.as_mut() {
        widget.reset();
        if let Some(tier) = comite.semaforo {
            widget.activar(tier);
        }
    }

    // ROI bar: clamped width, truthful label
    if let Some(bar) = registry.roi_bar.as_mut() {
        match comite.roi {
            Some(roi) => {
                bar.ancho = roi.max(Decimal::ZERO).min(ROI_BAR_MAX);
                bar.etiqueta = porcentaje(Some(roi));
            }
            None => {
                bar.ancho = Decimal::ZERO;
                bar.etiqueta.clear();
            }
        }
    }
}
