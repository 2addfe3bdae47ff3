//! The incremental recompute engine.
//!
//! [`recompute`] is the single authoritative path that derives every
//! computed field of an [`EstadoEstudio`] from its primitive inputs. No
//! other code may write a derived field; callers mutate an input scalar and
//! re-run the whole derivation, which is cheap enough to do on every
//! keystroke.

use rust_decimal::Decimal;

use crate::calculations::{adquisicion, comite, valoraciones};
use crate::models::EstadoEstudio;

/// What a recompute cycle did with the derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// Derived fields were recomputed from the inputs.
    Computed,
    /// No usable purchase price: derived fields were cleared. Not an error;
    /// view sync and persistence still run afterwards.
    Cleared,
}

/// Re-derives every computed field of the study in a fixed order:
/// acquisition worksheet, valuation mean, acquisition total, committee
/// metrics, narrative. Idempotent: a second call with no intervening input
/// mutation produces an identical state.
pub fn recompute(estado: &mut EstadoEstudio) -> RecomputeOutcome {
    let Some(precio) = estado.precio_escritura.filter(|p| !p.is_zero()) else {
        clear_derived(estado);
        tracing::trace!("recompute skipped: no purchase price");
        return RecomputeOutcome::Cleared;
    };

    let gastos = estado.gastos_extras.unwrap_or(Decimal::ZERO);
    let costes = adquisicion::calcular(precio, gastos);
    estado.itp = Some(costes.itp);
    estado.notaria = Some(costes.notaria);
    estado.registro = Some(costes.registro);
    estado.valor_adquisicion = Some(costes.valor_adquisicion);

    let media = valoraciones::media_positivas(&estado.valoraciones);
    estado.media_valoraciones = media;
    estado.valor_transmision = media;

    aplicar_metricas(estado, comite::evaluar(costes.valor_adquisicion, media));

    tracing::trace!(
        valor_adquisicion = %costes.valor_adquisicion,
        valor_transmision = ?media,
        "recompute cycle complete"
    );
    RecomputeOutcome::Computed
}

/// Clears every derived field. The human decision sub-record is user input
/// and survives.
fn clear_derived(estado: &mut EstadoEstudio) {
    estado.itp = None;
    estado.notaria = None;
    estado.registro = None;
    estado.valor_adquisicion = None;
    estado.media_valoraciones = None;
    estado.valor_transmision = None;
    aplicar_metricas(estado, comite::MetricasComite::default());
}

/// Writes the committee metrics and the tier-derived narrative. Narrative
/// depends only on the tier.
fn aplicar_metricas(
    estado: &mut EstadoEstudio,
    metricas: comite::MetricasComite,
) {
    let c = &mut estado.comite;
    c.beneficio_bruto = metricas.beneficio_bruto;
    c.roi = metricas.roi;
    c.margen_pct = metricas.margen_pct;
    c.semaforo = metricas.semaforo;
    c.ratio_euro_beneficio = metricas.ratio_euro_beneficio;
    c.colchon_seguridad = metricas.colchon_seguridad;
    c.breakeven = metricas.breakeven;
    match metricas.semaforo {
        Some(s) => {
            c.nivel_riesgo = s.nivel_riesgo().to_string();
            c.decision_texto = s.decision_texto().to_string();
            c.conclusion = s.conclusion().to_string();
        }
        None => {
            c.nivel_riesgo.clear();
            c.decision_texto.clear();
            c.conclusion.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{DecisionEstado, Semaforo};

    fn estado_base() -> EstadoEstudio {
        let mut estado = EstadoEstudio::new();
        estado.precio_escritura = Some(dec!(200000));
        estado
            .valoraciones
            .insert("val_idealista".into(), dec!(250000));
        estado
            .valoraciones
            .insert("val_fotocasa".into(), dec!(260000));
        estado
    }

    #[test]
    fn full_cycle_derives_every_field() {
        let mut estado = estado_base();

        assert_eq!(recompute(&mut estado), RecomputeOutcome::Computed);

        assert_eq!(estado.itp, Some(dec!(4000.00)));
        assert_eq!(estado.notaria, Some(dec!(500)));
        assert_eq!(estado.registro, Some(dec!(500)));
        assert_eq!(estado.valor_adquisicion, Some(dec!(205000.00)));
        assert_eq!(estado.media_valoraciones, Some(dec!(255000.00)));
        assert_eq!(estado.valor_transmision, Some(dec!(255000.00)));
        assert_eq!(estado.comite.beneficio_bruto, Some(dec!(50000.00)));
        assert_eq!(estado.comite.roi, Some(dec!(24.39)));
        assert_eq!(estado.comite.semaforo, Some(Semaforo::Verde));
        assert_eq!(estado.comite.nivel_riesgo, "Bajo");
        assert_eq!(estado.comite.breakeven, dec!(235000.00));
        assert_eq!(estado.comite.colchon_seguridad, dec!(20000.00));
        assert!(!estado.comite.decision_texto.is_empty());
    }

    #[test]
    fn missing_price_clears_all_derived_fields() {
        let mut estado = estado_base();
        recompute(&mut estado);
        estado.precio_escritura = None;

        assert_eq!(recompute(&mut estado), RecomputeOutcome::Cleared);

        assert_eq!(estado.itp, None);
        assert_eq!(estado.notaria, None);
        assert_eq!(estado.registro, None);
        assert_eq!(estado.valor_adquisicion, None);
        assert_eq!(estado.media_valoraciones, None);
        assert_eq!(estado.valor_transmision, None);
        assert_eq!(estado.comite.beneficio_bruto, None);
        assert_eq!(estado.comite.semaforo, None);
        assert_eq!(estado.comite.nivel_riesgo, "");
        // The valuations themselves are inputs and survive.
        assert_eq!(estado.valoraciones.len(), 2);
    }

    #[test]
    fn zero_price_behaves_like_missing_price() {
        let mut estado = estado_base();
        estado.precio_escritura = Some(dec!(0));

        assert_eq!(recompute(&mut estado), RecomputeOutcome::Cleared);
        assert_eq!(estado.valor_adquisicion, None);
    }

    #[test]
    fn clearing_cycle_preserves_human_decision() {
        let mut estado = estado_base();
        estado.comite.decision.estado = DecisionEstado::Aprobada;
        estado.comite.decision.comentario = "Buena zona".into();
        estado.precio_escritura = None;

        recompute(&mut estado);

        assert_eq!(estado.comite.decision.estado, DecisionEstado::Aprobada);
        assert_eq!(estado.comite.decision.comentario, "Buena zona");
    }

    #[test]
    fn no_positive_valuations_leaves_transmission_blank() {
        let mut estado = estado_base();
        estado.valoraciones.clear();
        estado.valoraciones.insert("val_tasacion".into(), dec!(0));

        recompute(&mut estado);

        assert_eq!(estado.valor_adquisicion, Some(dec!(205000.00)));
        assert_eq!(estado.media_valoraciones, None);
        assert_eq!(estado.valor_transmision, None);
        assert_eq!(estado.comite.beneficio_bruto, None);
        assert_eq!(estado.comite.breakeven, dec!(235000.00));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut estado = estado_base();
        recompute(&mut estado);
        let first = estado.clone();

        recompute(&mut estado);

        assert_eq!(estado, first);
    }

    #[test]
    fn stale_derived_values_are_overwritten_not_reused() {
        let mut estado = estado_base();
        recompute(&mut estado);
        // Simulate an out-of-band write; the next cycle must win.
        estado.itp = Some(dec!(1));
        estado.comite.roi = Some(dec!(99));

        recompute(&mut estado);

        assert_eq!(estado.itp, Some(dec!(4000.00)));
        assert_eq!(estado.comite.roi, Some(dec!(24.39)));
    }
}
