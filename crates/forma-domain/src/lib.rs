//! Crate `forma-domain` — entidades del dominio de plantillas de formularios.
//!
//! Define los registros persistidos (`Modulo`, `Formulario`, `Seccion`,
//! `ElementoPersonalizado`, `ElementoHtml`, `ModalAlerta`), sus DTOs de
//! creación/actualización, el trait `Registro` con las columnas comunes y
//! el árbol de entrada `ArbolPlantilla` que el motor valida antes de tocar
//! el almacenamiento.

pub mod arbol;
pub mod elemento_html;
pub mod elemento_personalizado;
pub mod errors;
pub mod formulario;
pub mod modal_alerta;
pub mod modulo;
pub mod registro;
pub mod seccion;

pub use arbol::*;
pub use elemento_html::*;
pub use elemento_personalizado::*;
pub use errors::*;
pub use formulario::*;
pub use modal_alerta::*;
pub use modulo::*;
pub use registro::*;
pub use seccion::*;
