// arbol.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Carga de entrada del motor de plantillas: el árbol completo de un
/// formulario con sus secciones anidadas y elementos hoja.
///
/// El cuerpo llega como JSON dinámico desde fuera; aquí se tipa de forma
/// explícita y se valida con `validar` antes de cualquier interacción con
/// el almacenamiento, rechazando formas malformadas de entrada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbolPlantilla {
  pub modulo_id: Uuid,
  pub formulario: NodoFormulario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodoFormulario {
  pub nombre: String,
  pub descripcion: Option<String>,
  #[serde(default)]
  pub creado_por_id: i64,
  #[serde(default)]
  pub traduccion: bool,
  pub etiqueta: Option<JsonValue>,
  #[serde(default)]
  pub secciones: Vec<NodoSeccion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodoSeccion {
  pub nombre: String,
  pub descripcion: Option<String>,
  pub etiqueta: Option<JsonValue>,
  pub icono: Option<String>,
  #[serde(default)]
  pub elementos: Vec<NodoElemento>,
  #[serde(default)]
  pub secciones: Vec<NodoSeccion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodoElemento {
  pub nombre: String,
  pub descripcion: Option<String>,
  pub elemento_html_id: Uuid,
  pub etiqueta: Option<JsonValue>,
  #[serde(default)]
  pub deshabilitado: bool,
  #[serde(default)]
  pub solo_lectura: bool,
  pub placeholder: Option<JsonValue>,
  #[serde(default)]
  pub requerido: bool,
  pub validadores_personalizados: Option<JsonValue>,
  pub parametros_personalizados: Option<JsonValue>,
  pub dependencia: Option<JsonValue>,
}

impl ArbolPlantilla {
  /// Valida la forma del árbol completo: nombres no vacíos en el
  /// formulario, en cada sección y en cada elemento, a cualquier nivel de
  /// anidamiento.
  pub fn validar(&self) -> Result<(), DomainError> {
    if self.formulario.nombre.trim().is_empty() {
      return Err(DomainError::Validacion("El nombre del formulario no puede estar vacío".into()));
    }
    validar_secciones(&self.formulario.secciones)
  }

  /// Recolecta todos los `elemento_html_id` referenciados por las hojas
  /// del árbol, para la prevalidación del catálogo antes de escribir.
  pub fn elementos_html(&self) -> Vec<Uuid> {
    let mut ids = Vec::new();
    recolectar_elementos_html(&self.formulario.secciones, &mut ids);
    ids
  }
}

fn validar_secciones(secciones: &[NodoSeccion]) -> Result<(), DomainError> {
  for seccion in secciones {
    if seccion.nombre.trim().is_empty() {
      return Err(DomainError::Validacion("El nombre de la sección no puede estar vacío".into()));
    }
    for elemento in &seccion.elementos {
      if elemento.nombre.trim().is_empty() {
        return Err(DomainError::Validacion("El nombre del elemento no puede estar vacío".into()));
      }
    }
    validar_secciones(&seccion.secciones)?;
  }
  Ok(())
}

fn recolectar_elementos_html(secciones: &[NodoSeccion], ids: &mut Vec<Uuid>) {
  for seccion in secciones {
    for elemento in &seccion.elementos {
      ids.push(elemento.elemento_html_id);
    }
    recolectar_elementos_html(&seccion.secciones, ids);
  }
}
