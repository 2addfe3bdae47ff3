use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use estudio_store::MemoryStore;
use estudio_ui::registry::campos;
use estudio_ui::remote::ApiClient;
use estudio_ui::{FieldRegistry, Simulador};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Feasibility calculator for residential purchase studies.
///
/// Feeds the given figures through the study worksheet and prints the
/// committee metrics. With `--guardar` the study is also sent to the
/// configured server.
#[derive(Debug, Parser)]
struct Cli {
    /// Study code to resume, when a saved snapshot exists.
    #[arg(long)]
    codigo: Option<String>,

    /// Base URL of the backend server.
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// CSRF token for write endpoints.
    #[arg(long, default_value = "")]
    csrf_token: String,

    /// Deed price, in euros (e.g. `200000` or `200.000,00`).
    #[arg(long)]
    precio_escritura: Option<String>,

    /// Extra acquisition costs, in euros.
    #[arg(long)]
    gastos_extras: Option<String>,

    /// Market valuation as `fuente=importe`
    /// (e.g. `val_idealista=250000`). Repeatable.
    #[arg(long = "valoracion")]
    valoraciones: Vec<String>,

    /// Net commission percentage shown to the investor.
    #[arg(long, default_value = "0")]
    comision_pct: String,

    /// Save the study to the server after computing.
    #[arg(long)]
    guardar: bool,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut sim = Simulador::pagina_completa(MemoryStore::new(), cli.codigo.clone());
    sim.set_api(ApiClient::new(&cli.base_url, &cli.csrf_token));

    if let Some(precio) = &cli.precio_escritura {
        sim.on_input(campos::PRECIO_ESCRITURA, precio);
        sim.on_blur(campos::PRECIO_ESCRITURA);
    }
    if let Some(gastos) = &cli.gastos_extras {
        sim.on_input(campos::GASTOS_EXTRAS, gastos);
        sim.on_blur(campos::GASTOS_EXTRAS);
    }
    for par in &cli.valoraciones {
        let (fuente, importe) = par
            .split_once('=')
            .with_context(|| format!("valoración '{par}' no tiene la forma fuente=importe"))?;
        if !campos::es_valoracion(fuente) || !sim.registry().is_bound(fuente) {
            bail!("fuente de valoración desconocida: '{fuente}'");
        }
        sim.on_input(fuente, importe);
        sim.on_blur(fuente);
    }
    sim.on_input(campos::INVERSURE_COMISION_PCT, &cli.comision_pct);
    sim.on_blur(campos::INVERSURE_COMISION_PCT);

    info!("{}", resumen(sim.registry()));

    if cli.guardar {
        sim.guardar().await;
        if let Some(id) = sim.codigo() {
            info!("estudio guardado con id {id}");
        }
    }

    Ok(())
}

/// Multi-line KPI summary in display form.
fn resumen(registry: &FieldRegistry) -> String {
    use campos::*;
    let linea = |etiqueta: &str, id: &str| {
        format!("{etiqueta:<22} {}", registry.text(id).unwrap_or_default())
    };
    [
        linea("Valor adquisición", KPI_VALOR_ADQUISICION),
        linea("Valor transmisión", KPI_VALOR_TRANSMISION),
        linea("Beneficio bruto", KPI_BENEFICIO_BRUTO),
        linea("ROI", KPI_ROI),
        linea("Margen", KPI_MARGEN),
        linea("Colchón de seguridad", KPI_COLCHON_SEGURIDAD),
        linea("Breakeven", KPI_BREAKEVEN),
        linea("Nivel de riesgo", KPI_NIVEL_RIESGO),
        linea("Decisión", KPI_DECISION_TEXTO),
    ]
    .join("\n")
}
