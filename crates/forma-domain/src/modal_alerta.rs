// modal_alerta.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Diálogo de alerta asociado a un formulario. Queda fuera del motor de
/// plantillas pero comparte el patrón de validación de referencias de los
/// demás servicios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalAlerta {
  pub id: Uuid,
  pub titulo: String,
  pub descripcion: String,
  pub formulario_id: Uuid,
  pub titulo_boton_principal: String,
  pub titulo_boton_secundario: Option<String>,
  pub tipo_id: i64,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalAlertaDto {
  pub titulo: Option<String>,
  pub descripcion: Option<String>,
  pub formulario_id: Option<Uuid>,
  pub titulo_boton_principal: Option<String>,
  pub titulo_boton_secundario: Option<String>,
  pub tipo_id: Option<i64>,
}

impl ModalAlerta {
  pub fn nuevo(dto: ModalAlertaDto) -> Result<Self, DomainError> {
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              titulo: texto_requerido(dto.titulo, "titulo")?,
              descripcion: texto_requerido(dto.descripcion, "descripcion")?,
              formulario_id: requerido(dto.formulario_id, "formulario_id")?,
              titulo_boton_principal: texto_requerido(dto.titulo_boton_principal, "titulo_boton_principal")?,
              titulo_boton_secundario: dto.titulo_boton_secundario,
              tipo_id: requerido(dto.tipo_id, "tipo_id")?,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  pub fn aplicar(&mut self, dto: ModalAlertaDto) -> Result<(), DomainError> {
    if let Some(titulo) = dto.titulo {
      self.titulo = texto_no_vacio(titulo, "titulo")?;
    }
    if let Some(descripcion) = dto.descripcion {
      self.descripcion = texto_no_vacio(descripcion, "descripcion")?;
    }
    if let Some(formulario_id) = dto.formulario_id {
      self.formulario_id = formulario_id;
    }
    if let Some(titulo_boton_principal) = dto.titulo_boton_principal {
      self.titulo_boton_principal = texto_no_vacio(titulo_boton_principal, "titulo_boton_principal")?;
    }
    if dto.titulo_boton_secundario.is_some() {
      self.titulo_boton_secundario = dto.titulo_boton_secundario;
    }
    if let Some(tipo_id) = dto.tipo_id {
      self.tipo_id = tipo_id;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for ModalAlerta {
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
