use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistMapError {
    #[error("Error de configuración: {0}")]
    Config(String),

    #[error("No se encontró el dataset: {0}. Ejecute primero `distmap convert` o configure la ruta con `distmap config --set-data-path`")]
    DatasetNotFound(String),

    #[error("Error al leer el dataset: {0}")]
    DatasetParse(String),

    #[error("Error de hoja de cálculo: {0}")]
    Spreadsheet(String),

    #[error("Formato de dataset no soportado: {0}")]
    UnsupportedFormat(String),

    #[error("Archivo no encontrado: {0}")]
    FileNotFound(String),

    #[error("Error al dibujar el mapa: {0}")]
    MapRender(String),

    #[error("Error al generar el PDF: {0}")]
    PdfGeneration(String),

    #[error("Error al generar el Excel: {0}")]
    ExcelGeneration(String),

    #[error("Error de conversión: {0}")]
    Conversion(String),

    #[error("Error de entrada: {0}")]
    Prompt(String),

    #[error("Error de CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error de JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] distmap_common::Error),
}

pub type Result<T> = std::result::Result<T, DistMapError>;
