//! Error types shared by every front end

use thiserror::Error;

/// Common error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Ninguna zona seleccionada")]
    NoZoneSelected,

    #[error("El índice de fila {index} está fuera de rango (1..={len})")]
    UnknownIndex { index: usize, len: usize },

    #[error("No se puede centrar un mapa sin registros")]
    EmptyActiveSet,

    #[error("Color de marcador desconocido: {0}")]
    UnknownColor(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
