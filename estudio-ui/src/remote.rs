//! HTTP client for the study endpoints.
//!
//! Thin reqwest wrapper: JSON bodies, the anti-forgery token echoed as the
//! `X-CSRFToken` header on mutating calls, non-success statuses mapped to
//! [`ApiError::Api`] with the response body. No retries and no timeout
//! policy beyond the client defaults; failures surface to the controller,
//! which alerts the user and leaves the local state untouched.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use estudio_core::EstadoEstudio;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("respuesta inesperada del servidor")]
    UnexpectedResponse,
}

/// Save-endpoint payload. The flat totals and the nested `inmueble` block
/// duplicate state fields on purpose: the server reads the flat copies and
/// the PDF snapshot reads the nested ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardarEstudio {
    pub id: Option<String>,
    pub nombre: String,
    pub direccion: String,
    pub referencia_catastral: String,
    pub datos: DatosEstudio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatosEstudio {
    pub valor_adquisicion: Option<Decimal>,
    pub valor_transmision: Option<Decimal>,
    pub beneficio_bruto: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub valor_referencia: Option<Decimal>,
    pub tipologia: String,
    pub superficie_m2: Option<Decimal>,
    pub estado_inmueble: String,
    pub situacion: String,
    pub inmueble: DatosInmueble,
    pub inversure_comision_pct: Decimal,
    pub snapshot: EstadoEstudio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatosInmueble {
    pub tipologia: String,
    pub superficie_m2: Option<Decimal>,
    pub estado_inmueble: String,
    pub situacion: String,
}

impl GuardarEstudio {
    /// Value snapshot of the state at call time; later local edits do not
    /// affect an in-flight save.
    pub fn desde(
        estado: &EstadoEstudio,
        inversure_comision_pct: Decimal,
    ) -> Self {
        Self {
            id: estado.id.clone(),
            nombre: estado.nombre.clone(),
            direccion: estado.direccion.clone(),
            referencia_catastral: estado.referencia_catastral.clone(),
            datos: DatosEstudio {
                valor_adquisicion: estado.valor_adquisicion,
                valor_transmision: estado.valor_transmision,
                beneficio_bruto: estado.comite.beneficio_bruto,
                roi: estado.comite.roi,
                valor_referencia: estado.valor_referencia,
                tipologia: estado.tipologia.clone(),
                superficie_m2: estado.superficie_m2,
                estado_inmueble: estado.estado_inmueble.clone(),
                situacion: estado.situacion.clone(),
                inmueble: DatosInmueble {
                    tipologia: estado.tipologia.clone(),
                    superficie_m2: estado.superficie_m2,
                    estado_inmueble: estado.estado_inmueble.clone(),
                    situacion: estado.situacion.clone(),
                },
                inversure_comision_pct,
                snapshot: estado.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuardarRespuesta {
    id: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConvertirRespuesta {
    ok: bool,
}

#[derive(Serialize)]
struct ConvertirCuerpo<'a> {
    #[serde(rename = "estudioIdActual")]
    estudio_id_actual: &'a str,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: String,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: csrf_token.into(),
        }
    }

    /// Saves a study snapshot; returns the id the server assigned (or kept).
    pub async fn guardar_estudio(&self, payload: &GuardarEstudio) -> Result<String, ApiError> {
        let resp = self.post_json("guardar-estudio/", payload).await?;
        let cuerpo: GuardarRespuesta = resp.json().await?;
        parse_id(cuerpo.id)
    }

    /// Converts a saved study into a project.
    pub async fn convertir_a_proyecto(&self, estudio_id: &str) -> Result<(), ApiError> {
        let cuerpo = ConvertirCuerpo {
            estudio_id_actual: estudio_id,
        };
        let resp = self.post_json("convertir-proyecto/", &cuerpo).await?;
        let respuesta: ConvertirRespuesta = resp.json().await?;
        if respuesta.ok {
            Ok(())
        } else {
            Err(ApiError::UnexpectedResponse)
        }
    }

    /// URL for the cadastral lookup, opened in a separate browsing context.
    /// `None` when the reference does not have the 20-character shape.
    pub fn catastro_url(&self, referencia: &str) -> Option<String> {
        let referencia = referencia.trim().to_uppercase();
        if !referencia_catastral_valida(&referencia) {
            return None;
        }
        Some(format!("{}/catastro/obtener/?ref={referencia}", self.base_url))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .header("X-CSRFToken", &self.csrf_token)
            .json(body)
            .send()
            .await?;
        check_response(resp).await
    }
}

/// Non-success statuses become [`ApiError::Api`] with the body text.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if !resp.status().is_success() {
        return Err(ApiError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// The server may answer with a numeric or string id; both are adopted
/// verbatim as the opaque study id.
fn parse_id(value: Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ApiError::UnexpectedResponse),
    }
}

/// Spanish cadastral references are 20 alphanumeric characters.
fn referencia_catastral_valida(referencia: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[0-9A-Z]{20}$").unwrap())
        .is_match(referencia)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use estudio_core::recompute;

    use super::*;

    fn mock_response(
        status: u16,
        body: &'static str,
    ) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    // =========================================================================
    // check_response tests
    // =========================================================================

    #[tokio::test]
    async fn check_response_passes_success_through() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_maps_server_error() {
        let resp = mock_response(500, "boom");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn check_response_keeps_error_body() {
        let resp = mock_response(403, "CSRF token missing");
        match check_response(resp).await.unwrap_err() {
            ApiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "CSRF token missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // =========================================================================
    // parse_id tests
    // =========================================================================

    #[test]
    fn parse_id_accepts_string_and_number() {
        assert_eq!(parse_id(Value::String("12".into())).unwrap(), "12");
        assert_eq!(parse_id(serde_json::json!(12)).unwrap(), "12");
    }

    #[test]
    fn parse_id_rejects_null_and_empty() {
        assert!(parse_id(Value::Null).is_err());
        assert!(parse_id(Value::String(String::new())).is_err());
    }

    // =========================================================================
    // payload tests
    // =========================================================================

    #[test]
    fn payload_duplicates_property_block_and_embeds_snapshot() {
        let mut estado = EstadoEstudio::new();
        estado.nombre = "Piso Chamberí".into();
        estado.tipologia = "vivienda".into();
        estado.superficie_m2 = Some(dec!(85));
        estado.precio_escritura = Some(dec!(200000));
        estado
            .valoraciones
            .insert("val_idealista".into(), dec!(255000));
        recompute(&mut estado);

        let payload = GuardarEstudio::desde(&estado, dec!(10));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["nombre"], "Piso Chamberí");
        assert_eq!(json["datos"]["tipologia"], "vivienda");
        assert_eq!(json["datos"]["inmueble"]["tipologia"], "vivienda");
        assert_eq!(json["datos"]["inversure_comision_pct"], "10");
        // The full state rides along for the PDF snapshot.
        assert_eq!(json["datos"]["snapshot"]["nombre"], "Piso Chamberí");
        assert!(json["datos"]["snapshot"]["comite"]["roi"].is_string());
    }

    #[test]
    fn payload_is_a_value_snapshot() {
        let mut estado = EstadoEstudio::new();
        estado.precio_escritura = Some(dec!(100000));
        recompute(&mut estado);

        let payload = GuardarEstudio::desde(&estado, dec!(0));
        estado.precio_escritura = Some(dec!(999999));
        recompute(&mut estado);

        assert_eq!(payload.datos.snapshot.precio_escritura, Some(dec!(100000)));
    }

    // =========================================================================
    // catastro_url tests
    // =========================================================================

    #[test]
    fn catastro_url_requires_twenty_alphanumerics() {
        let api = ApiClient::new("http://localhost:8000/", "tok");

        assert_eq!(
            api.catastro_url("9872023VH5797S0001WX"),
            Some("http://localhost:8000/catastro/obtener/?ref=9872023VH5797S0001WX".to_string())
        );
        assert_eq!(api.catastro_url("corta"), None);
        assert_eq!(api.catastro_url(""), None);
    }

    #[test]
    fn catastro_url_normalizes_case_and_whitespace() {
        let api = ApiClient::new("http://localhost:8000", "tok");

        assert_eq!(
            api.catastro_url(" 9872023vh5797s0001wx "),
            Some("http://localhost:8000/catastro/obtener/?ref=9872023VH5797S0001WX".to_string())
        );
    }

    #[test]
    fn convertir_body_uses_camel_case_key() {
        let cuerpo = ConvertirCuerpo {
            estudio_id_actual: "12",
        };
        assert_eq!(
            serde_json::to_string(&cuerpo).unwrap(),
            r#"{"estudioIdActual":"12"}"#
        );
    }
}
