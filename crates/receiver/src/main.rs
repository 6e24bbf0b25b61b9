//! # Telemetry Receiver
//!
//! Estação base: recebe os pacotes do nó, decodifica, reavalia os alertas
//! com os mesmos thresholds e reporta tudo no log. Não persiste histórico.

mod net_thread;

use net_thread::{NetMessage, spawn_receiver_thread};
use telemetry_core::alerts::evaluate_alerts;
use telemetry_core::config::{AlertThresholds, AppConfig};
use tracing::{info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }

    let rx = spawn_receiver_thread(config.receiver.port, config.receiver.sender_ip.clone());

    let mut received: u64 = 0;
    let mut last_id: Option<u32> = None;
    for msg in rx.iter() {
        if let Some(gap) = missing_packets(last_id, msg.packet.id) {
            warn!("{gap} pacote(s) perdido(s) antes de #{}", msg.packet.id);
        }
        last_id = Some(msg.packet.id);
        report(received, &msg, &config.alerts);
        received += 1;
    }
}

/// Pacotes perdidos entre dois ids consecutivos (sem ACK, só diagnóstico).
fn missing_packets(last: Option<u32>, current: u32) -> Option<u32> {
    let last = last?;
    let gap = current.wrapping_sub(last).wrapping_sub(1);
    // Id menor que o anterior: o nó reiniciou
    if gap == 0 || current <= last {
        None
    } else {
        Some(gap)
    }
}

fn report(count: u64, msg: &NetMessage, thresholds: &AlertThresholds) {
    let p = &msg.packet;
    info!("=== Pacote #{count} recebido de {} ===", msg.source_addr);
    info!("Raw Payload: {} ({} bytes)", msg.raw, msg.raw_size);
    info!("Packet ID: {}", p.id);
    info!("Pressure:  {:.2} PSI", p.pressure);
    info!("Moisture:  {:.2} %", p.moisture);
    info!("Acoustic:  {:.2} dB", p.acoustic);
    info!("Node time: {} ms", p.timestamp);

    for flag in evaluate_alerts(&p.to_snapshot(), thresholds).iter() {
        warn!("ALERTA: {flag}!");
    }
}
