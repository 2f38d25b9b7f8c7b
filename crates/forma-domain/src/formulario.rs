// formulario.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Instantánea versionada de la definición de un formulario dinámico.
///
/// Cada formulario pertenece a exactamente un módulo; la `version` es única
/// por módulo y a lo sumo un formulario activo por módulo lleva
/// `version_actual = true`. Esa invariante la sostiene el motor de
/// plantillas, no el almacenamiento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formulario {
  pub id: Uuid,
  pub nombre: String,
  pub descripcion: Option<String>,
  pub version: i64,
  pub version_actual: bool,
  pub creado_por_id: i64,
  pub modificado_por_id: Option<i64>,
  pub modulo_id: Uuid,
  pub traduccion: bool,
  pub etiqueta: Option<JsonValue>,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormularioDto {
  pub nombre: Option<String>,
  pub descripcion: Option<String>,
  pub version: Option<i64>,
  pub version_actual: Option<bool>,
  pub creado_por_id: Option<i64>,
  pub modificado_por_id: Option<i64>,
  pub modulo_id: Option<Uuid>,
  pub traduccion: Option<bool>,
  pub etiqueta: Option<JsonValue>,
}

impl Formulario {
  pub fn nuevo(dto: FormularioDto) -> Result<Self, DomainError> {
    let version = requerido(dto.version, "version")?;
    if version <= 0 {
      return Err(DomainError::Validacion("La versión debe ser un entero positivo".into()));
    }
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              nombre: texto_requerido(dto.nombre, "nombre")?,
              descripcion: dto.descripcion,
              version,
              version_actual: dto.version_actual.unwrap_or(false),
              creado_por_id: dto.creado_por_id.unwrap_or(0),
              modificado_por_id: dto.modificado_por_id,
              modulo_id: requerido(dto.modulo_id, "modulo_id")?,
              traduccion: dto.traduccion.unwrap_or(false),
              etiqueta: dto.etiqueta,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  /// Actualización parcial. La `fecha_creacion` es inmutable: el DTO ni
  /// siquiera la transporta.
  pub fn aplicar(&mut self, dto: FormularioDto) -> Result<(), DomainError> {
    if let Some(nombre) = dto.nombre {
      self.nombre = texto_no_vacio(nombre, "nombre")?;
    }
    if dto.descripcion.is_some() {
      self.descripcion = dto.descripcion;
    }
    if let Some(version) = dto.version {
      if version <= 0 {
        return Err(DomainError::Validacion("La versión debe ser un entero positivo".into()));
      }
      self.version = version;
    }
    if let Some(version_actual) = dto.version_actual {
      self.version_actual = version_actual;
    }
    if dto.modificado_por_id.is_some() {
      self.modificado_por_id = dto.modificado_por_id;
    }
    if let Some(modulo_id) = dto.modulo_id {
      self.modulo_id = modulo_id;
    }
    if let Some(traduccion) = dto.traduccion {
      self.traduccion = traduccion;
    }
    if dto.etiqueta.is_some() {
      self.etiqueta = dto.etiqueta;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for Formulario {
  fn id(&self) -> Uuid {
    self.id
  }

  fn activo(&self) -> bool {
    self.activo
  }

  fn desactivar(&mut self) {
    self.activo = false;
  }

  fn marcar_modificado(&mut self) {
    self.fecha_modificacion = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dto_base(modulo_id: Uuid) -> FormularioDto {
    FormularioDto { nombre: Some("registro civil".into()),
                    version: Some(1),
                    version_actual: Some(true),
                    creado_por_id: Some(10),
                    modulo_id: Some(modulo_id),
                    ..Default::default() }
  }

  #[test]
  fn nuevo_rechaza_version_no_positiva() {
    let mut dto = dto_base(Uuid::new_v4());
    dto.version = Some(0);
    assert!(Formulario::nuevo(dto).is_err());
  }

  #[test]
  fn nuevo_requiere_modulo() {
    let mut dto = dto_base(Uuid::new_v4());
    dto.modulo_id = None;
    assert!(Formulario::nuevo(dto).is_err());
  }

  #[test]
  fn aplicar_no_toca_fecha_creacion() -> Result<(), DomainError> {
    let mut formulario = Formulario::nuevo(dto_base(Uuid::new_v4()))?;
    let creacion = formulario.fecha_creacion;
    formulario.aplicar(FormularioDto { version_actual: Some(false), ..Default::default() })?;
    assert_eq!(formulario.fecha_creacion, creacion);
    assert!(!formulario.version_actual);
    Ok(())
  }
}
