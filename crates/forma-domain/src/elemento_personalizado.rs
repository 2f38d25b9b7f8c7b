// elemento_personalizado.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Hoja del árbol de un formulario: un control concreto dentro de una
/// sección, ligado a un `ElementoHtml` del catálogo que aporta el tipo de
/// control y sus valores por defecto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementoPersonalizado {
  pub id: Uuid,
  pub nombre: String,
  pub descripcion: Option<String>,
  pub seccion_id: Uuid,
  pub elemento_html_id: Uuid,
  pub etiqueta: JsonValue,
  pub deshabilitado: bool,
  pub solo_lectura: bool,
  pub placeholder: Option<JsonValue>,
  pub requerido: bool,
  pub validadores_personalizados: Option<JsonValue>,
  pub parametros_personalizados: Option<JsonValue>,
  pub dependencia: Option<JsonValue>,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementoPersonalizadoDto {
  pub nombre: Option<String>,
  pub descripcion: Option<String>,
  pub seccion_id: Option<Uuid>,
  pub elemento_html_id: Option<Uuid>,
  pub etiqueta: Option<JsonValue>,
  pub deshabilitado: Option<bool>,
  pub solo_lectura: Option<bool>,
  pub placeholder: Option<JsonValue>,
  pub requerido: Option<bool>,
  pub validadores_personalizados: Option<JsonValue>,
  pub parametros_personalizados: Option<JsonValue>,
  pub dependencia: Option<JsonValue>,
}

impl ElementoPersonalizado {
  pub fn nuevo(dto: ElementoPersonalizadoDto) -> Result<Self, DomainError> {
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              nombre: texto_requerido(dto.nombre, "nombre")?,
              descripcion: dto.descripcion,
              seccion_id: requerido(dto.seccion_id, "seccion_id")?,
              elemento_html_id: requerido(dto.elemento_html_id, "elemento_html_id")?,
              etiqueta: dto.etiqueta.unwrap_or(JsonValue::Null),
              deshabilitado: dto.deshabilitado.unwrap_or(false),
              solo_lectura: dto.solo_lectura.unwrap_or(false),
              placeholder: dto.placeholder,
              requerido: dto.requerido.unwrap_or(false),
              validadores_personalizados: dto.validadores_personalizados,
              parametros_personalizados: dto.parametros_personalizados,
              dependencia: dto.dependencia,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  pub fn aplicar(&mut self, dto: ElementoPersonalizadoDto) -> Result<(), DomainError> {
    if let Some(nombre) = dto.nombre {
      self.nombre = texto_no_vacio(nombre, "nombre")?;
    }
    if dto.descripcion.is_some() {
      self.descripcion = dto.descripcion;
    }
    if let Some(seccion_id) = dto.seccion_id {
      self.seccion_id = seccion_id;
    }
    if let Some(elemento_html_id) = dto.elemento_html_id {
      self.elemento_html_id = elemento_html_id;
    }
    if let Some(etiqueta) = dto.etiqueta {
      self.etiqueta = etiqueta;
    }
    if let Some(deshabilitado) = dto.deshabilitado {
      self.deshabilitado = deshabilitado;
    }
    if let Some(solo_lectura) = dto.solo_lectura {
      self.solo_lectura = solo_lectura;
    }
    if dto.placeholder.is_some() {
      self.placeholder = dto.placeholder;
    }
    if let Some(requerido) = dto.requerido {
      self.requerido = requerido;
    }
    if dto.validadores_personalizados.is_some() {
      self.validadores_personalizados = dto.validadores_personalizados;
    }
    if dto.parametros_personalizados.is_some() {
      self.parametros_personalizados = dto.parametros_personalizados;
    }
    if dto.dependencia.is_some() {
      self.dependencia = dto.dependencia;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for ElementoPersonalizado {
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
