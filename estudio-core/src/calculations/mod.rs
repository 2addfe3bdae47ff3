//! Feasibility worksheets: acquisition costs, valuation averaging and the
//! committee metrics derived from them.

pub mod adquisicion;
pub mod comite;
pub mod common;
pub mod valoraciones;

pub use adquisicion::{CostesAdquisicion, ITP_RATE, NOTARIA_REGISTRO_MIN, NOTARIA_REGISTRO_RATE};
pub use comite::{MetricasComite, OBJETIVO_BENEFICIO, ROI_AMARILLO_MIN, ROI_VERDE_MIN};
