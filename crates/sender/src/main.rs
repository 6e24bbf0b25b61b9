//! # Telemetry Node
//!
//! Amostra pressão, umidade e nível acústico, calibra e transmite um pacote
//! a cada intervalo fixo. Leituras acima dos thresholds viram alertas no log.
//!
//! ## Uso
//! ```bash
//! telemetry_node            # usa config.toml ao lado do executável
//! RUST_LOG=debug telemetry_node
//! ```

mod adc;
mod radio_udp;

use adc::SimulatedAdc;
use radio_udp::UdpRadio;
use std::time::Duration;
use telemetry_core::calibration::{JitterSource, NoJitter, SeededJitter, SensorCalibrator};
use telemetry_core::clock::MonotonicClock;
use telemetry_core::config::AppConfig;
use telemetry_core::error::NodeError;
use telemetry_core::scheduler::{SchedulerTiming, TelemetryScheduler};
use telemetry_core::source::{FixedSource, SampleSource};
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Boot: referência dos timestamps do nó
    let clock = MonotonicClock::new();
    info!("Telemetry node iniciando...");

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        halt(NodeError::InvalidConfig(errors));
    }

    // ── Rádio ──
    let radio = match UdpRadio::open(&config.radio) {
        Ok(radio) => radio,
        Err(e) => halt(e),
    };

    // ── Fonte e calibração ──
    let node = &config.node;
    let source: Box<dyn SampleSource> = match config.source.mode.as_str() {
        "fixed" => Box::new(FixedSource::from(config.source.fixed_raw)),
        _ => Box::new(SimulatedAdc::new(node.raw_max, node.jitter_seed)),
    };
    let jitter: Box<dyn JitterSource> = match (node.jitter_enabled, node.jitter_seed) {
        (false, _) => Box::new(NoJitter),
        (true, Some(seed)) => Box::new(SeededJitter::new(seed)),
        (true, None) => Box::new(SeededJitter::from_entropy()),
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📡 TELEMETRY NODE – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Destino:   {}", radio.dest());
    println!("  Intervalo: {} ms", node.interval_ms);
    println!("  Fonte:     {}", config.source.mode);
    println!("  Jitter:    {}", if node.jitter_enabled { "on" } else { "off" });
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut scheduler = TelemetryScheduler::new(
        source,
        SensorCalibrator::new(node.raw_max, jitter),
        radio,
        clock,
        config.alerts.clone(),
        SchedulerTiming {
            interval_ms: node.interval_ms,
            idle_pause: Duration::from_millis(node.idle_pause_ms),
        },
    );
    scheduler.run_forever()
}

/// Erro fatal de inicialização: sem rádio não há telemetria.
fn halt(err: NodeError) -> ! {
    error!("{err}");
    error!("Nó parado.");
    std::process::exit(1)
}
