// modulo.rs
use crate::registro::{requerido, texto_no_vacio, texto_requerido, Registro};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unidad raíz de clasificación: un módulo es dueño del historial de
/// versiones de sus formularios y tiene ciclo de vida independiente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modulo {
  pub id: Uuid,
  pub nombre: String,
  pub descripcion: Option<String>,
  pub sistema_id: i64,
  pub activo: bool,
  pub fecha_creacion: DateTime<Utc>,
  pub fecha_modificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuloDto {
  pub nombre: Option<String>,
  pub descripcion: Option<String>,
  pub sistema_id: Option<i64>,
}

impl Modulo {
  pub fn nuevo(dto: ModuloDto) -> Result<Self, DomainError> {
    let fecha = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              nombre: texto_requerido(dto.nombre, "nombre")?,
              descripcion: dto.descripcion,
              sistema_id: requerido(dto.sistema_id, "sistema_id")?,
              activo: true,
              fecha_creacion: fecha,
              fecha_modificacion: fecha })
  }

  /// Aplica una actualización parcial. Los campos ausentes del DTO se
  /// conservan; las fechas de creación nunca cambian.
  pub fn aplicar(&mut self, dto: ModuloDto) -> Result<(), DomainError> {
    if let Some(nombre) = dto.nombre {
      self.nombre = texto_no_vacio(nombre, "nombre")?;
    }
    if dto.descripcion.is_some() {
      self.descripcion = dto.descripcion;
    }
    if let Some(sistema_id) = dto.sistema_id {
      self.sistema_id = sistema_id;
    }
    self.marcar_modificado();
    Ok(())
  }
}

impl Registro for Modulo {
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
