// seccion.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Nodo del árbol de disposición de un formulario. Una sección raíz no
/// tiene `padre_id`; las anidadas referencian a otra sección del mismo
/// formulario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seccion {
  pub id: Uuid,
  pub nombre: String,
  pub descripcion: Option<String>,
  pub formulario_id: Uuid,
  pub padre_id: Option<Uuid>,
  pub etiqueta: Option<JsonValue>,
  pub icono: Option<String>,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeccionDto {
  pub nombre: Option<String>,
  pub descripcion: Option<String>,
  pub formulario_id: Option<Uuid>,
  pub padre_id: Option<Uuid>,
  pub etiqueta: Option<JsonValue>,
  pub icono: Option<String>,
}

impl Seccion {
  pub fn nuevo(dto: SeccionDto) -> Result<Self, DomainError> {
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              nombre: texto_requerido(dto.nombre, "nombre")?,
              descripcion: dto.descripcion,
              formulario_id: requerido(dto.formulario_id, "formulario_id")?,
              padre_id: dto.padre_id,
              etiqueta: dto.etiqueta,
              icono: dto.icono,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  pub fn aplicar(&mut self, dto: SeccionDto) -> Result<(), DomainError> {
    if let Some(nombre) = dto.nombre {
      self.nombre = texto_no_vacio(nombre, "nombre")?;
    }
    if dto.descripcion.is_some() {
      self.descripcion = dto.descripcion;
    }
    if let Some(formulario_id) = dto.formulario_id {
      self.formulario_id = formulario_id;
    }
    if dto.padre_id.is_some() {
      self.padre_id = dto.padre_id;
    }
    if dto.etiqueta.is_some() {
      self.etiqueta = dto.etiqueta;
    }
    if dto.icono.is_some() {
      self.icono = dto.icono;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for Seccion {
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
