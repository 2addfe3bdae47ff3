//! The application controller.
//!
//! `Simulador` owns the study state and everything around it: the field
//! registry, the snapshot bridge, the post-recompute hook list and the
//! remote client. Every input event runs the full synchronous cycle
//! (mutate one scalar, recompute, render, hooks, persist) before the next
//! event is handled. There is no debouncing; the cycle is cheap enough to
//! run per keystroke.

use rust_decimal::Decimal;

use estudio_core::money::{optional_currency, parse_currency, parse_quantity};
use estudio_core::{DecisionEstado, EstadoEstudio, engine};
use estudio_store::{EntradaIndice, SessionStore, SnapshotBridge};

use crate::registry::{FieldRegistry, campos};
use crate::remote::{ApiClient, GuardarEstudio};
use crate::view;

/// Cycle context passed to post-recompute hooks alongside the state.
#[derive(Debug, Clone, Copy)]
pub struct CicloInfo {
    pub comision_pct: Decimal,
}

/// Observer run after every recompute cycle, once the main render pass has
/// finished. Hooks read the state and write display elements only.
pub type PostRecomputeHook = Box<dyn FnMut(&EstadoEstudio, &CicloInfo, &mut FieldRegistry)>;

/// Sink for blocking user-facing alerts (the browser's `alert()` dialog).
pub type AlertSink = Box<dyn FnMut(&str)>;

pub struct Simulador<S: SessionStore> {
    estado: EstadoEstudio,
    registry: FieldRegistry,
    bridge: SnapshotBridge<S>,
    api: Option<ApiClient>,
    /// Active study code, tracked separately from `estado.id` so a reset
    /// state and the id lifecycle stay independently managed.
    codigo: Option<String>,
    comision_pct: Decimal,
    hooks: Vec<PostRecomputeHook>,
    alert: AlertSink,
}

impl<S: SessionStore> Simulador<S> {
    /// Builds a controller over an explicit registry, restoring the
    /// `codigo`-scoped snapshot when one exists (falling back to the
    /// last-used one).
    pub fn new(
        store: S,
        registry: FieldRegistry,
        codigo: Option<String>,
    ) -> Self {
        let bridge = SnapshotBridge::new(store);
        let estado = bridge.load(codigo.as_deref()).unwrap_or_default();
        let codigo = codigo.or_else(|| estado.id.clone());
        Self {
            estado,
            registry,
            bridge,
            api: None,
            codigo,
            comision_pct: Decimal::ZERO,
            hooks: Vec::new(),
            alert: Box::new(|msg| tracing::error!("{msg}")),
        }
    }

    /// Controller for the full study page: every field bound and the
    /// investor panel registered as a hook.
    pub fn pagina_completa(
        store: S,
        codigo: Option<String>,
    ) -> Self {
        let mut sim = Self::new(store, FieldRegistry::pagina_estudio(), codigo);
        sim.add_hook(crate::investor::hook());
        sim.ciclo();
        sim
    }

    pub fn estado(&self) -> &EstadoEstudio {
        &self.estado
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn codigo(&self) -> Option<&str> {
        self.codigo.as_deref()
    }

    pub fn set_api(&mut self, api: ApiClient) {
        self.api = Some(api);
    }

    pub fn add_hook(&mut self, hook: PostRecomputeHook) {
        self.hooks.push(hook);
    }

    pub fn set_alert_handler(&mut self, alert: AlertSink) {
        self.alert = alert;
    }

    /// Pre-rendered markup values: write them into the registry, pull them
    /// into the state once, then run a first cycle. After hydration the
    /// display is a pure projection and is never re-read.
    pub fn hydrate(&mut self, valores: &[(&str, &str)]) {
        for (id, text) in valores {
            if !self.registry.is_bound(id) {
                continue;
            }
            self.registry.set_text(id, text);
            self.apply_input(id, text);
        }
        self.ciclo();
    }

    /// One keystroke: show the raw text, take focus, mutate the one backing
    /// scalar and run the full cycle.
    pub fn on_input(
        &mut self,
        id: &str,
        text: &str,
    ) {
        if !self.registry.is_bound(id) {
            tracing::debug!(campo = id, "input for unbound field ignored");
            return;
        }
        self.registry.set_text(id, text);
        self.registry.focus(id);
        self.apply_input(id, text);
        self.ciclo();
    }

    /// Focus keeps the render pass from clobbering in-progress text.
    pub fn on_focus(&mut self, id: &str) {
        self.registry.focus(id);
    }

    /// Blur releases the field; the follow-up cycle rewrites it in
    /// canonical form.
    pub fn on_blur(&mut self, id: &str) {
        self.registry.blur(id);
        self.ciclo();
    }

    fn apply_input(
        &mut self,
        id: &str,
        text: &str,
    ) {
        use campos::*;
        let estado = &mut self.estado;
        match id {
            NOMBRE => estado.nombre = text.to_string(),
            DIRECCION => estado.direccion = text.to_string(),
            REFERENCIA_CATASTRAL => estado.referencia_catastral = text.trim().to_string(),
            TIPOLOGIA => estado.tipologia = text.to_string(),
            ESTADO_INMUEBLE => estado.estado_inmueble = text.to_string(),
            SITUACION => estado.situacion = text.to_string(),
            SUPERFICIE_M2 => estado.superficie_m2 = parse_quantity(text),
            PRECIO_ESCRITURA => estado.precio_escritura = optional_currency(text),
            VALOR_REFERENCIA => estado.valor_referencia = optional_currency(text),
            GASTOS_EXTRAS => estado.gastos_extras = optional_currency(text),
            INVERSURE_COMISION_PCT => {
                self.comision_pct = parse_quantity(text).unwrap_or(Decimal::ZERO);
            }
            DECISION_ESTADO => {
                let decision = &mut estado.comite.decision;
                decision.estado = match text {
                    "aprobada" => DecisionEstado::Aprobada,
                    "estudio" => DecisionEstado::Estudio,
                    "denegada" => DecisionEstado::Denegada,
                    _ => DecisionEstado::SinDecidir,
                };
                decision.fecha_decision = match decision.estado {
                    DecisionEstado::SinDecidir => None,
                    _ => Some(chrono::Utc::now()),
                };
            }
            DECISION_UBICACION => {
                estado.comite.decision.valoracion_ubicacion = no_vacio(text);
            }
            DECISION_ESTADO_INMUEBLE => {
                estado.comite.decision.valoracion_estado = no_vacio(text);
            }
            DECISION_MERCADO => estado.comite.decision.valoracion_mercado = no_vacio(text),
            DECISION_RIESGO => estado.comite.decision.valoracion_riesgo = no_vacio(text),
            DECISION_COMENTARIO => estado.comite.decision.comentario = text.to_string(),
            DECISION_RESUMEN => estado.comite.decision.resumen_ejecutivo = text.to_string(),
            id if es_valoracion(id) => {
                if text.trim().is_empty() {
                    estado.valoraciones.remove(id);
                } else {
                    estado.valoraciones.insert(id.to_string(), parse_currency(text));
                }
            }
            // Derived fields render as editable text; a direct edit is
            // accepted into the display but the next recompute wins.
            ITP | NOTARIA | REGISTRO | VALOR_ADQUISICION | MEDIA_VALORACIONES => {}
            _ => tracing::debug!(campo = id, "input without state mapping"),
        }
    }

    /// The full cycle: recompute, render, hooks, persist. Runs even after
    /// the engine's early-exit guard so a cleared sheet is also rendered
    /// and persisted.
    fn ciclo(&mut self) {
        engine::recompute(&mut self.estado);
        view::render(&self.estado, &mut self.registry);
        let info = CicloInfo {
            comision_pct: self.comision_pct,
        };
        let mut hooks = std::mem::take(&mut self.hooks);
        for hook in &mut hooks {
            hook(&self.estado, &info, &mut self.registry);
        }
        self.hooks = hooks;
        self.bridge.persist(&self.estado);
    }

    /// Saves a snapshot of the current values to the server and adopts the
    /// returned id. On failure the user is alerted and the local state is
    /// left as-is.
    pub async fn guardar(&mut self) {
        let Some(api) = self.api.as_ref() else {
            (self.alert)("No hay servidor configurado.");
            return;
        };
        let payload = GuardarEstudio::desde(&self.estado, self.comision_pct);
        match api.guardar_estudio(&payload).await {
            Ok(id) => {
                tracing::info!(%id, "estudio guardado");
                self.estado.id = Some(id.clone());
                self.codigo = Some(id);
                self.bridge.persist(&self.estado);
            }
            Err(e) => (self.alert)(&format!("No se pudo guardar el estudio: {e}")),
        }
    }

    /// Removes the study locally (index and scoped key) and resets the
    /// sheet to a fresh, id-less study.
    pub fn borrar(&mut self) {
        if let Some(id) = self.codigo.take() {
            self.bridge.remove(&id);
        }
        self.estado.reset();
        self.ciclo();
    }

    /// Converts an approved, saved study into a project, then resets like
    /// [`Self::borrar`].
    pub async fn convertir_a_proyecto(&mut self) {
        if self.estado.comite.decision.estado != DecisionEstado::Aprobada {
            (self.alert)("Solo un estudio aprobado puede convertirse en proyecto.");
            return;
        }
        let Some(id) = self.codigo.clone() else {
            (self.alert)("Guarda el estudio antes de convertirlo.");
            return;
        };
        let Some(api) = self.api.as_ref() else {
            (self.alert)("No hay servidor configurado.");
            return;
        };
        match api.convertir_a_proyecto(&id).await {
            Ok(()) => {
                tracing::info!(%id, "estudio convertido a proyecto");
                self.borrar();
            }
            Err(e) => (self.alert)(&format!("No se pudo convertir el estudio: {e}")),
        }
    }

    /// Cadastral lookup URL for the current reference, to be opened in a
    /// new browsing context. Alerts when the reference is malformed.
    pub fn abrir_catastro(&mut self) -> Option<String> {
        let Some(api) = self.api.as_ref() else {
            (self.alert)("No hay servidor configurado.");
            return None;
        };
        match api.catastro_url(&self.estado.referencia_catastral) {
            Some(url) => Some(url),
            None => {
                (self.alert)("La referencia catastral no es válida.");
                None
            }
        }
    }

    /// Placeholder; the PDF is generated server-side in a later phase.
    pub fn generar_pdf(&mut self) {
        (self.alert)("La generación de PDF no está disponible todavía.");
    }

    /// Saved-studies index, for the listing view.
    pub fn estudios_guardados(&self) -> Vec<EntradaIndice> {
        self.bridge.list()
    }

    /// The snapshot currently persisted under the last-used key.
    pub fn snapshot_persistido(&self) -> Option<EstadoEstudio> {
        self.bridge.load(None)
    }
}

fn no_vacio(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
