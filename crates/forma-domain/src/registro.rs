// registro.rs
use crate::DomainError;
use uuid::Uuid;

/// Columnas comunes de todo registro persistido. Las colecciones genéricas
/// y la eliminación lógica trabajan sobre este trait.
pub trait Registro {
  fn id(&self) -> Uuid;
  fn activo(&self) -> bool;
  /// Eliminación lógica: el registro nunca se borra físicamente desde los
  /// servicios, sólo se apaga.
  fn desactivar(&mut self);
  /// Sella `fecha_modificacion` con la hora actual.
  fn marcar_modificado(&mut self);
}

pub(crate) fn requerido<T>(valor: Option<T>, campo: &str) -> Result<T, DomainError> {
  valor.ok_or_else(|| DomainError::Validacion(format!("El campo {} es obligatorio", campo)))
}

pub(crate) fn texto_requerido(valor: Option<String>, campo: &str) -> Result<String, DomainError> {
  texto_no_vacio(requerido(valor, campo)?, campo)
}

pub(crate) fn texto_no_vacio(valor: String, campo: &str) -> Result<String, DomainError> {
  if valor.trim().is_empty() {
    return Err(DomainError::Validacion(format!("El campo {} no puede estar vacío", campo)));
  }
  Ok(valor)
}
