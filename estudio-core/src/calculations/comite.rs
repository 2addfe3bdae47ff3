//! Committee metrics worksheet.
//!
//! Derives the viability figures the committee reviews from the two totals
//! the rest of the sheet produces:
//!
//! | Line | Description |
//! |------|-------------|
//! | 1 | Gross profit: transmission − acquisition |
//! | 2 | ROI: line 1 / acquisition × 100 (0 when acquisition ≤ 0) |
//! | 3 | Margin: line 1 / transmission × 100 (0 when transmission ≤ 0) |
//! | 4 | Tier: ROI ≥ 20 → verde, ≥ 10 → amarillo, else rojo |
//! | 5 | €-profit ratio: line 1 / acquisition |
//! | 6 | Safety cushion: line 1 − 30 000 € (0 when no transmission) |
//! | 7 | Breakeven: acquisition + 30 000 € (0 when no acquisition) |
//!
//! The thresholds and the profit target are committee policy; they are kept
//! as named constants rather than re-derived.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::Semaforo;

/// Minimum ROI (percent) for the green tier.
pub const ROI_VERDE_MIN: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Minimum ROI (percent) for the yellow tier.
pub const ROI_AMARILLO_MIN: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Fixed gross-profit target per operation (30 000 €).
pub const OBJETIVO_BENEFICIO: Decimal = Decimal::from_parts(30_000, 0, 0, false, 0);

/// Computed committee metrics for one recompute cycle.
///
/// Profit, ROI, margin, tier and the €-profit ratio are `None` when the
/// study has no transmission value yet; the cushion and breakeven degrade
/// to zero per the sheet's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricasComite {
    pub beneficio_bruto: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub margen_pct: Option<Decimal>,
    pub semaforo: Option<Semaforo>,
    pub ratio_euro_beneficio: Option<Decimal>,
    pub colchon_seguridad: Decimal,
    pub breakeven: Decimal,
}

/// Maps an ROI percentage to its tier.
pub fn semaforo_por_roi(roi: Decimal) -> Semaforo {
    if roi >= ROI_VERDE_MIN {
        Semaforo::Verde
    } else if roi >= ROI_AMARILLO_MIN {
        Semaforo::Amarillo
    } else {
        Semaforo::Rojo
    }
}

/// Evaluates the committee worksheet.
///
/// `valor_transmision` is `None` while no positive valuation exists; in
/// that case only the breakeven line is computable.
pub fn evaluar(
    valor_adquisicion: Decimal,
    valor_transmision: Option<Decimal>,
) -> MetricasComite {
    let breakeven = if valor_adquisicion > Decimal::ZERO {
        round_half_up(valor_adquisicion + OBJETIVO_BENEFICIO)
    } else {
        Decimal::ZERO
    };

    let Some(transmision) = valor_transmision else {
        return MetricasComite {
            breakeven,
            ..Default::default()
        };
    };

    let beneficio = round_half_up(transmision - valor_adquisicion);
    let roi = if valor_adquisicion > Decimal::ZERO {
        round_half_up(beneficio / valor_adquisicion * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    let margen = if transmision > Decimal::ZERO {
        round_half_up(beneficio / transmision * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    let ratio = if valor_adquisicion > Decimal::ZERO {
        (beneficio / valor_adquisicion)
            .round_dp_with_strategy(4, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    let colchon = if transmision > Decimal::ZERO {
        round_half_up(beneficio - OBJETIVO_BENEFICIO)
    } else {
        Decimal::ZERO
    };

    MetricasComite {
        beneficio_bruto: Some(beneficio),
        roi: Some(roi),
        margen_pct: Some(margen),
        semaforo: Some(semaforo_por_roi(roi)),
        ratio_euro_beneficio: Some(ratio),
        colchon_seguridad: colchon,
        breakeven,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // semaforo_por_roi tests
    // =========================================================================

    #[test]
    fn roi_at_or_above_twenty_is_verde() {
        assert_eq!(semaforo_por_roi(dec!(20)), Semaforo::Verde);
        assert_eq!(semaforo_por_roi(dec!(30)), Semaforo::Verde);
    }

    #[test]
    fn roi_between_ten_and_twenty_is_amarillo() {
        assert_eq!(semaforo_por_roi(dec!(10)), Semaforo::Amarillo);
        assert_eq!(semaforo_por_roi(dec!(15)), Semaforo::Amarillo);
        assert_eq!(semaforo_por_roi(dec!(19.99)), Semaforo::Amarillo);
    }

    #[test]
    fn roi_below_ten_is_rojo() {
        assert_eq!(semaforo_por_roi(dec!(5)), Semaforo::Rojo);
        assert_eq!(semaforo_por_roi(dec!(0)), Semaforo::Rojo);
        assert_eq!(semaforo_por_roi(dec!(-12)), Semaforo::Rojo);
    }

    // =========================================================================
    // evaluar tests
    // =========================================================================

    #[test]
    fn profitable_study_is_verde_with_low_risk_metrics() {
        let m = evaluar(dec!(100000), Some(dec!(130000)));

        assert_eq!(m.beneficio_bruto, Some(dec!(30000.00)));
        assert_eq!(m.roi, Some(dec!(30.00)));
        assert_eq!(m.margen_pct, Some(dec!(23.08)));
        assert_eq!(m.semaforo, Some(Semaforo::Verde));
        assert_eq!(m.ratio_euro_beneficio, Some(dec!(0.3000)));
        assert_eq!(m.colchon_seguridad, dec!(0.00));
        assert_eq!(m.breakeven, dec!(130000.00));
    }

    #[test]
    fn cushion_is_profit_minus_target() {
        let m = evaluar(dec!(100000), Some(dec!(145000)));

        assert_eq!(m.beneficio_bruto, Some(dec!(45000.00)));
        assert_eq!(m.colchon_seguridad, dec!(15000.00));
    }

    #[test]
    fn thin_margin_is_amarillo() {
        let m = evaluar(dec!(200000), Some(dec!(230000)));

        assert_eq!(m.roi, Some(dec!(15.00)));
        assert_eq!(m.semaforo, Some(Semaforo::Amarillo));
    }

    #[test]
    fn losing_study_is_rojo_with_negative_cushion() {
        let m = evaluar(dec!(200000), Some(dec!(190000)));

        assert_eq!(m.beneficio_bruto, Some(dec!(-10000.00)));
        assert_eq!(m.roi, Some(dec!(-5.00)));
        assert_eq!(m.semaforo, Some(Semaforo::Rojo));
        assert_eq!(m.colchon_seguridad, dec!(-40000.00));
    }

    #[test]
    fn missing_transmission_leaves_only_breakeven() {
        let m = evaluar(dec!(205000), None);

        assert_eq!(m.beneficio_bruto, None);
        assert_eq!(m.roi, None);
        assert_eq!(m.semaforo, None);
        assert_eq!(m.colchon_seguridad, dec!(0));
        assert_eq!(m.breakeven, dec!(235000.00));
    }

    #[test]
    fn zero_acquisition_degrades_roi_to_zero() {
        let m = evaluar(dec!(0), Some(dec!(130000)));

        assert_eq!(m.roi, Some(dec!(0)));
        assert_eq!(m.ratio_euro_beneficio, Some(dec!(0)));
        assert_eq!(m.breakeven, dec!(0));
        // ROI degraded to 0 lands in the red tier.
        assert_eq!(m.semaforo, Some(Semaforo::Rojo));
    }
}
