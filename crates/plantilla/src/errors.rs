// Archivo: errors.rs
// Propósito: definir los errores del dominio de plantillas y el alias
// Result<T> usado por las APIs del crate. Los comentarios y variantes están
// en español.
use forma_domain::DomainError;
use thiserror::Error;

/// Errores comunes del dominio de plantillas.
///
/// - `NotFound`: entidad no encontrada.
/// - `Validacion`: entrada malformada o mal tipada.
/// - `Almacenamiento`: error al acceder al almacenamiento.
/// - `Composicion`: fallo durante la creación multi-paso de una plantilla,
///   siempre después de ejecutar la compensación.
#[derive(Error, Debug)]
pub enum PlantillaError {
    /// Entidad no encontrada (módulo, formulario+versión, sección o
    /// elemento del catálogo).
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// Entrada inválida: el mensaje ofensor se devuelve tal cual.
    #[error("Error de validación: {0}")]
    Validacion(String),
    /// Error genérico de almacenamiento (colección, lock, serialización).
    #[error("Error de almacenamiento: {0}")]
    Almacenamiento(String),
    /// Fallo al componer una plantilla. El error original sólo se conserva
    /// textualmente dentro del mensaje.
    #[error("{0}")]
    Composicion(String),
}

impl From<DomainError> for PlantillaError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validacion(msg) => Self::Validacion(msg),
        }
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, PlantillaError>;
