//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável, lido uma vez na inicialização.

use crate::calibration::DEFAULT_RAW_MAX;
use crate::protocol::MAX_PACKET_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Temporização e calibração do nó.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Intervalo fixo entre transmissões (ms)
    pub interval_ms: u64,
    /// Pausa curta quando ocioso (ms)
    pub idle_pause_ms: u64,
    /// Teto do ADC (4095 para 12 bits)
    pub raw_max: u16,
    /// Jitter sintético na calibração
    pub jitter_enabled: bool,
    /// Seed do jitter (ausente = entropia do sistema)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_seed: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            idle_pause_ms: 10,
            raw_max: DEFAULT_RAW_MAX,
            jitter_enabled: true,
            jitter_seed: None,
        }
    }
}

/// Origem das amostras brutas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// "simulated" (sinal de bancada) ou "fixed"
    pub mode: String,
    /// Valores brutos [pressure, moisture, acoustic] no modo "fixed"
    pub fixed_raw: [u16; 3],
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: "simulated".into(),
            fixed_raw: [2048, 1024, 3000],
        }
    }
}

/// Enlace de rádio.
///
/// Os parâmetros LoRa são validados na abertura do rádio; o transporte
/// efetivo é um socket UDP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// IP de destino (255.255.255.255 para broadcast)
    pub dest_ip: String,
    /// Porta UDP
    pub port: u16,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
    /// Frequência (Hz): 433, 868 ou 915 MHz
    pub frequency_hz: u64,
    /// SF6 a SF12
    pub spreading_factor: u8,
    /// Largura de banda (Hz)
    pub bandwidth_hz: u32,
    /// Denominador do coding rate 4/x (5–8)
    pub coding_rate: u8,
    pub sync_word: u8,
    pub crc: bool,
    /// Tamanho máximo de um frame (bytes)
    pub max_packet_size: usize,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            dest_ip: "255.255.255.255".into(),
            port: 5005,
            bind_ip: String::new(),
            frequency_hz: 915_000_000,
            spreading_factor: 7,
            bandwidth_hz: 125_000,
            coding_rate: 5,
            sync_word: 0x12,
            crc: true,
            max_packet_size: MAX_PACKET_SIZE,
        }
    }
}

/// Larguras de banda suportadas pelo transceptor (Hz).
pub const LORA_BANDWIDTHS: [u32; 10] = [
    7_800, 10_400, 15_600, 20_800, 31_250, 41_700, 62_500, 125_000, 250_000, 500_000,
];

/// Bandas ISM aceitas (Hz, inclusivo).
const LORA_BANDS: [(u64, u64); 3] = [
    (433_050_000, 434_790_000),
    (863_000_000, 870_000_000),
    (902_000_000, 928_000_000),
];

impl RadioConfig {
    /// Valida os parâmetros do enlace e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Porta do rádio não pode ser 0".into());
        }
        if !LORA_BANDS
            .iter()
            .any(|(lo, hi)| (*lo..=*hi).contains(&self.frequency_hz))
        {
            errors.push(format!("Frequência fora das bandas ISM: {} Hz", self.frequency_hz));
        }
        if !(6..=12).contains(&self.spreading_factor) {
            errors.push(format!(
                "Spreading factor inválido: {} (6–12)",
                self.spreading_factor
            ));
        }
        if !LORA_BANDWIDTHS.contains(&self.bandwidth_hz) {
            errors.push(format!("Largura de banda inválida: {} Hz", self.bandwidth_hz));
        }
        if !(5..=8).contains(&self.coding_rate) {
            errors.push(format!("Coding rate inválido: 4/{} (4/5–4/8)", self.coding_rate));
        }
        if self.max_packet_size == 0 || self.max_packet_size > MAX_PACKET_SIZE {
            errors.push(format!(
                "max_packet_size inválido: {} (1–{MAX_PACKET_SIZE})",
                self.max_packet_size
            ));
        }

        errors
    }
}

/// Thresholds de alerta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Umidade acima disso (%) → HighMoisture
    pub moisture_high: f32,
    /// Nível acústico acima disso (dB) → HighAcoustic
    pub acoustic_high: f32,
    /// Pressão abaixo disso (PSI) → AbnormalPressure
    pub pressure_low: f32,
    /// Pressão acima disso (PSI) → AbnormalPressure
    pub pressure_high: f32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            moisture_high: 70.0,
            acoustic_high: 75.0,
            pressure_low: 20.0,
            pressure_high: 80.0,
        }
    }
}

/// Configuração do Receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Porta UDP para escutar
    pub port: u16,
    /// IP do nó (vazio = aceita qualquer origem)
    pub sender_ip: String,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: 5005,
            sender_ip: String::new(),
        }
    }
}

/// Configuração raiz (nó + receiver).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub node: NodeConfig,
    pub source: SourceConfig,
    pub radio: RadioConfig,
    pub alerts: AlertThresholds,
    pub receiver: ReceiverConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.node.interval_ms < 100 || self.node.interval_ms > 3_600_000 {
            errors.push(format!(
                "Intervalo do nó inválido: {} ms (100–3600000)",
                self.node.interval_ms
            ));
        }
        if self.node.idle_pause_ms == 0 || self.node.idle_pause_ms >= self.node.interval_ms {
            errors.push(format!(
                "Pausa ociosa inválida: {} ms (1–{})",
                self.node.idle_pause_ms,
                self.node.interval_ms.saturating_sub(1)
            ));
        }
        if self.node.raw_max == 0 {
            errors.push("raw_max não pode ser 0".into());
        }
        if self.source.mode != "simulated" && self.source.mode != "fixed" {
            errors.push(format!(
                "Modo de fonte desconhecido: \"{}\" (simulated | fixed)",
                self.source.mode
            ));
        }
        if self.alerts.pressure_low >= self.alerts.pressure_high {
            errors.push(format!(
                "Thresholds de pressão invertidos: {} ≥ {}",
                self.alerts.pressure_low, self.alerts.pressure_high
            ));
        }
        errors.extend(self.radio.validate());
        if self.receiver.port == 0 {
            errors.push("Porta do receiver não pode ser 0".into());
        }

        errors
    }
}
