// elemento_html.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Entrada de catálogo que describe un tipo de control reutilizable con
/// sus validadores y parámetros por defecto. Los elementos personalizados
/// la referencian, nunca la poseen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementoHtml {
  pub id: Uuid,
  pub nombre: String,
  pub descripcion: Option<String>,
  pub tipo_id: i64,
  pub tipo_dato_id: i64,
  pub validadores: Option<JsonValue>,
  pub parametros: Option<JsonValue>,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementoHtmlDto {
  pub nombre: Option<String>,
  pub descripcion: Option<String>,
  pub tipo_id: Option<i64>,
  pub tipo_dato_id: Option<i64>,
  pub validadores: Option<JsonValue>,
  pub parametros: Option<JsonValue>,
}

impl ElementoHtml {
  pub fn nuevo(dto: ElementoHtmlDto) -> Result<Self, DomainError> {
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              nombre: texto_requerido(dto.nombre, "nombre")?,
              descripcion: dto.descripcion,
              tipo_id: requerido(dto.tipo_id, "tipo_id")?,
              tipo_dato_id: requerido(dto.tipo_dato_id, "tipo_dato_id")?,
              validadores: dto.validadores,
              parametros: dto.parametros,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  pub fn aplicar(&mut self, dto: ElementoHtmlDto) -> Result<(), DomainError> {
    if let Some(nombre) = dto.nombre {
      self.nombre = texto_no_vacio(nombre, "nombre")?;
    }
    if dto.descripcion.is_some() {
      self.descripcion = dto.descripcion;
    }
    if let Some(tipo_id) = dto.tipo_id {
      self.tipo_id = tipo_id;
    }
    if let Some(tipo_dato_id) = dto.tipo_dato_id {
      self.tipo_dato_id = tipo_dato_id;
    }
    if dto.validadores.is_some() {
      self.validadores = dto.validadores;
    }
    if dto.parametros.is_some() {
      self.parametros = dto.parametros;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for ElementoHtml {
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
