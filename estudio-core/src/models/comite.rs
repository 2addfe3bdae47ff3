use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Three-tier color-coded viability indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semaforo {
    Verde,
    Amarillo,
    Rojo,
}

impl Semaforo {
    /// Qualitative risk level shown next to the indicator.
    pub fn nivel_riesgo(self) -> &'static str {
        match self {
            Semaforo::Verde => "Bajo",
            Semaforo::Amarillo => "Medio",
            Semaforo::Rojo => "Alto",
        }
    }

    /// Fixed recommendation line for the committee sheet.
    pub fn decision_texto(self) -> &'static str {
        match self {
            Semaforo::Verde => {
                "Operación recomendada. La rentabilidad esperada supera el objetivo del comité."
            }
            Semaforo::Amarillo => {
                "Operación a revisar. La rentabilidad esperada es ajustada respecto al objetivo."
            }
            Semaforo::Rojo => {
                "Operación no recomendada. La rentabilidad esperada no alcanza el mínimo exigido."
            }
        }
    }

    /// Fixed closing paragraph for the committee sheet.
    pub fn conclusion(self) -> &'static str {
        match self {
            Semaforo::Verde => {
                "El estudio presenta un margen sólido. Se recomienda elevarlo al comité para su aprobación."
            }
            Semaforo::Amarillo => {
                "El estudio presenta un margen moderado. Se recomienda reforzar las valoraciones antes de decidir."
            }
            Semaforo::Rojo => {
                "El estudio no alcanza el umbral de rentabilidad. Se recomienda descartarlo o renegociar el precio."
            }
        }
    }
}

/// Outcome recorded by the human reviewers, independent of the computed
/// metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionEstado {
    Aprobada,
    Estudio,
    Denegada,
    #[default]
    #[serde(rename = "")]
    SinDecidir,
}

/// Human decision sub-record: the committee's verdict, its qualitative
/// ratings and free-text commentary. Never touched by the recompute engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionComite {
    pub estado: DecisionEstado,
    pub valoracion_ubicacion: Option<String>,
    pub valoracion_estado: Option<String>,
    pub valoracion_mercado: Option<String>,
    pub valoracion_riesgo: Option<String>,
    pub comentario: String,
    pub resumen_ejecutivo: String,
    pub fecha_decision: Option<DateTime<Utc>>,
}

/// Committee sub-record: metrics derived from the acquisition and
/// transmission totals, the resulting tier and narrative, plus the nested
/// human decision.
///
/// Every field except `decision` is an output of the recompute engine.
/// Profit, ROI and margin are `None` (rendered blank) when the study has no
/// usable transmission value yet; `colchon_seguridad` and `breakeven`
/// degrade to zero instead, matching the sheet they feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Comite {
    pub beneficio_bruto: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub margen_pct: Option<Decimal>,
    pub semaforo: Option<Semaforo>,
    pub ratio_euro_beneficio: Option<Decimal>,
    pub colchon_seguridad: Decimal,
    pub breakeven: Decimal,
    pub nivel_riesgo: String,
    pub decision_texto: String,
    pub conclusion: String,
    pub decision: DecisionComite,
}
