//! Investor panel: a read-only projection of already-computed totals.
//!
//! Derives the commission, net profit and net ROI for the selected
//! commission percentage and writes them to its own display elements. It
//! never writes the study state and never triggers a recompute; the
//! controller runs it from the post-recompute hook list.

use rust_decimal::Decimal;

use estudio_core::EstadoEstudio;
use estudio_core::calculations::common::{max, round_half_up};
use estudio_core::money::format_currency;

use crate::controller::{CicloInfo, PostRecomputeHook};
use crate::registry::{FieldRegistry, campos};
use crate::view::porcentaje;

/// Net figures for the investor at a given commission percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CifrasInversor {
    pub comision: Option<Decimal>,
    pub beneficio_neto: Option<Decimal>,
    pub roi_neto: Option<Decimal>,
}

/// Pure derivation: commission only accrues on positive gross profit.
pub fn calcular(
    estado: &EstadoEstudio,
    comision_pct: Decimal,
) -> CifrasInversor {
    let Some(beneficio) = estado.comite.beneficio_bruto else {
        return CifrasInversor::default();
    };
    let comision = round_half_up(
        max(beneficio, Decimal::ZERO) * comision_pct / Decimal::ONE_HUNDRED,
    );
    let beneficio_neto = round_half_up(beneficio - comision);
    let roi_neto = match estado.valor_adquisicion {
        Some(adq) if adq > Decimal::ZERO => {
            round_half_up(beneficio_neto / adq * Decimal::ONE_HUNDRED)
        }
        _ => Decimal::ZERO,
    };
    CifrasInversor {
        comision: Some(comision),
        beneficio_neto: Some(beneficio_neto),
        roi_neto: Some(roi_neto),
    }
}

/// Writes the investor figures to their display elements.
pub fn refresh(
    estado: &EstadoEstudio,
    comision_pct: Decimal,
    registry: &mut FieldRegistry,
) {
    let cifras = calcular(estado, comision_pct);
    registry.project(campos::INV_COMISION, format_currency(cifras.comision));
    registry.project(
        campos::INV_BENEFICIO_NETO,
        format_currency(cifras.beneficio_neto),
    );
    registry.project(campos::INV_ROI_NETO, porcentaje(cifras.roi_neto));
}

/// The investor panel as a post-recompute hook.
pub fn hook() -> PostRecomputeHook {
    Box::new(|estado: &EstadoEstudio, info: &CicloInfo, registry: &mut FieldRegistry| {
        refresh(estado, info.comision_pct, registry);
    })
}
