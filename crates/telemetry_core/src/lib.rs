//! # Telemetry Core
//!
//! Núcleo do nó de telemetria ambiental: amostra três canais analógicos
//! (pressão, umidade, nível acústico), calibra, avalia alertas e transmite
//! um pacote texto a intervalo fixo.
//!
//! ## Módulos
//! - [`types`] – Canais e snapshot por ciclo
//! - [`calibration`] – Reescala afim + jitter + clamp por canal
//! - [`alerts`] – Thresholds e flags de alerta
//! - [`protocol`] – Encode/decode do payload texto
//! - [`source`] / [`radio`] / [`clock`] – Colaboradores externos (traits)
//! - [`scheduler`] – Laço de intervalo fixo
//! - [`config`] – Configuração unificada via TOML
//! - [`error`] – Erros de rádio e inicialização

pub mod types;
pub mod calibration;
pub mod alerts;
pub mod protocol;
pub mod source;
pub mod radio;
pub mod clock;
pub mod scheduler;
pub mod config;
pub mod error;

// Re-exports convenientes
pub use types::{Channel, TelemetrySnapshot};
pub use alerts::{AlertFlag, AlertSet, evaluate_alerts};
pub use protocol::{decode_packet, encode_snapshot, MAX_PACKET_SIZE};
pub use scheduler::{SchedulerTiming, TelemetryScheduler};
pub use config::AppConfig;
pub use error::{NodeError, RadioError};
