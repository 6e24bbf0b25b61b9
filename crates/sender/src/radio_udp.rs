//! Enlace de rádio sobre UDP.
//!
//! Cada frame fechado vira um datagrama. Os parâmetros LoRa do config são
//! validados na abertura, como a inicialização do transceptor faria.

use std::net::{SocketAddr, UdpSocket};
use telemetry_core::config::RadioConfig;
use telemetry_core::error::{NodeError, RadioError};
use telemetry_core::radio::RadioTransport;
use tracing::{debug, info};

pub struct UdpRadio {
    sock: UdpSocket,
    dest: SocketAddr,
    max_packet_size: usize,
    frame: Option<Vec<u8>>,
}

impl UdpRadio {
    /// Inicializa o enlace. Qualquer falha aqui é fatal para o nó.
    pub fn open(cfg: &RadioConfig) -> Result<Self, NodeError> {
        let errors = cfg.validate();
        if !errors.is_empty() {
            return Err(NodeError::RadioInit(errors.join("; ")));
        }

        let dest: SocketAddr = format!("{}:{}", cfg.dest_ip, cfg.port)
            .parse()
            .map_err(|e| NodeError::RadioInit(format!("destino inválido {}: {e}", cfg.dest_ip)))?;

        let bind_addr = if cfg.bind_ip.is_empty() {
            "0.0.0.0:0".to_string()
        } else {
            format!("{}:0", cfg.bind_ip)
        };
        let sock = UdpSocket::bind(&bind_addr)
            .map_err(|e| NodeError::RadioInit(format!("bind {bind_addr}: {e}")))?;

        if cfg.dest_ip == "255.255.255.255" {
            sock.set_broadcast(true)
                .map_err(|e| NodeError::RadioInit(format!("broadcast: {e}")))?;
            info!("Modo BROADCAST ativado");
        } else {
            info!("Modo UNICAST → {dest}");
        }

        info!(
            "Rádio pronto: {:.1} MHz | SF{} | BW {:.1} kHz | CR 4/{} | sync 0x{:02X} | CRC {}",
            cfg.frequency_hz as f64 / 1e6,
            cfg.spreading_factor,
            cfg.bandwidth_hz as f64 / 1e3,
            cfg.coding_rate,
            cfg.sync_word,
            if cfg.crc { "on" } else { "off" },
        );

        Ok(Self {
            sock,
            dest,
            max_packet_size: cfg.max_packet_size,
            frame: None,
        })
    }

    pub fn dest(&self) -> SocketAddr {
        self.dest
    }
}

impl RadioTransport for UdpRadio {
    fn open_frame(&mut self) -> Result<(), RadioError> {
        // Frame anterior abandonado (write falhou) é descartado
        self.frame = Some(Vec::with_capacity(self.max_packet_size));
        Ok(())
    }

    fn write(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        let frame = self.frame.as_mut().ok_or(RadioError::FrameNotOpen)?;
        let size = frame.len() + payload.len();
        if size > self.max_packet_size {
            self.frame = None;
            return Err(RadioError::FrameTooLarge {
                size,
                max: self.max_packet_size,
            });
        }
        frame.extend_from_slice(payload);
        Ok(())
    }

    fn close_frame(&mut self) -> Result<(), RadioError> {
        let frame = self.frame.take().ok_or(RadioError::FrameNotOpen)?;
        let sent = self.sock.send_to(&frame, self.dest)?;
        debug!("→ {sent} bytes para {}", self.dest);
        Ok(())
    }
}
