//! Acquisition cost worksheet.
//!
//! From the notarized purchase price the sheet derives the transfer tax and
//! the notary/registry fees, then totals the acquisition cost:
//!
//! | Line | Description |
//! |------|-------------|
//! | 1 | Purchase price (escritura) |
//! | 2 | ITP: line 1 × 2 % |
//! | 3 | Notary fee: max(line 1 × 0.2 %, 500 €) |
//! | 4 | Registry fee: same rule as line 3 |
//! | 5 | Extra costs (user input, defaults to 0) |
//! | 6 | Acquisition value: 1 + 2 + 3 + 4 + 5 |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, round_half_up};

/// ITP transfer-tax rate applied to the purchase price (2 %).
pub const ITP_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Rate for both the notary and registry fees (0.2 %).
pub const NOTARIA_REGISTRO_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

/// Floor for both the notary and registry fees (500 €).
pub const NOTARIA_REGISTRO_MIN: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Result of the acquisition worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostesAdquisicion {
    pub itp: Decimal,
    pub notaria: Decimal,
    pub registro: Decimal,
    pub valor_adquisicion: Decimal,
}

/// Computes the acquisition worksheet for a non-zero purchase price.
///
/// Callers are expected to handle the "no price yet" case before calling;
/// the engine clears the derived fields instead of computing them.
pub fn calcular(
    precio_escritura: Decimal,
    gastos_extras: Decimal,
) -> CostesAdquisicion {
    let itp = round_half_up(precio_escritura * ITP_RATE);
    let notaria = max(
        round_half_up(precio_escritura * NOTARIA_REGISTRO_RATE),
        NOTARIA_REGISTRO_MIN,
    );
    // Registry follows the same rule as notary in the current form version.
    let registro = notaria;
    let valor_adquisicion =
        round_half_up(precio_escritura + itp + notaria + registro + gastos_extras);

    CostesAdquisicion {
        itp,
        notaria,
        registro,
        valor_adquisicion,
    }
}
