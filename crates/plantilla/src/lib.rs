//! Crate `plantilla`: servicios de entidad y motor de composición de
//! plantillas de formularios.
//!
//! Este crate define el contrato de almacenamiento `Coleccion<T>` con su
//! implementación en memoria (`ColeccionEnMemoria`), los servicios CRUD por
//! entidad con validación de referencias, el traductor de consultas
//! `FiltrosService` y el motor `PlantillaEngine` que crea, reconstruye y
//! elimina árboles de plantillas completos.
//!
//! Diseño resumido:
//! - Versionado por módulo: cada creación publica la versión máxima
//!   histórica + 1 y deja a lo sumo una versión marcada como actual.
//! - Sin transacciones multi-colección: el motor compensa a mano los
//!   efectos parciales de una creación fallida.
//! - Eliminación siempre lógica en los servicios; el borrado físico queda
//!   reservado a la compensación.
//!
//! Ejemplo rápido:
//! ```rust
//! use plantilla::{Almacen, PlantillaEngine};
//! let almacen = Almacen::en_memoria();
//! let engine = PlantillaEngine::new(&almacen);
//! ```
pub mod engine;
pub mod errors;
pub mod filtros;
pub mod repositorio;
pub mod servicios;
pub mod stubs;

pub use engine::*;
pub use errors::*;
pub use filtros::*;
pub use repositorio::*;
pub use servicios::*;
pub use stubs::*;
