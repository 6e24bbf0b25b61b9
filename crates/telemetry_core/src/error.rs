//! Erros do nó e do enlace de rádio.

/// Falhas de um envio individual. Recuperáveis: o ciclo termina normalmente.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("Nenhum frame aberto")]
    FrameNotOpen,

    #[error("Frame muito grande: {size} bytes (máximo {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Erro de I/O no rádio: {0}")]
    Io(#[from] std::io::Error),
}

/// Falhas fatais de inicialização do nó.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Falha ao inicializar o rádio: {0}")]
    RadioInit(String),

    #[error("Configuração inválida: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
