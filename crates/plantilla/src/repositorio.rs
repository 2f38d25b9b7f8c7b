// Archivo: repositorio.rs
// Propósito: definir el trait `Coleccion<T>` —el contrato que deben
// implementar las colecciones persistidas— el conjunto `Almacen` inyectado
// en servicios y motor, y el validador de referencias compartido.
use crate::errors::{PlantillaError, Result};
use forma_domain::{ElementoHtml, ElementoPersonalizado, Formulario, ModalAlerta, Modulo, Registro, Seccion};
use std::sync::Arc;
use uuid::Uuid;

/// Contrato mínimo de una colección de registros de una entidad.
///
/// Cada colección confirma sus escrituras de forma independiente: no existe
/// atomicidad entre colecciones, y el motor de plantillas compensa a mano
/// cuando una operación multi-colección falla a medias.
pub trait Coleccion<T>: Send + Sync
    where T: Registro + Clone
{
    /// Inserta un registro nuevo. Falla si el id ya existe.
    fn insertar(&self, registro: T) -> Result<T>;

    /// Lee un registro por id, esté activo o no. `None` si no existe.
    fn obtener(&self, id: &Uuid) -> Result<Option<T>>;

    /// Reemplaza el registro con el mismo id. `None` si no existe.
    fn actualizar(&self, registro: T) -> Result<Option<T>>;

    /// Borrado físico. Sólo la compensación del motor lo usa: los
    /// servicios siempre eliminan de forma lógica.
    fn eliminar(&self, id: &Uuid) -> Result<bool>;

    /// Devuelve todos los registros de la colección, activos o no.
    fn listar(&self) -> Result<Vec<T>>;
}

/// Confirma que la entidad referenciada existe antes de insertar o
/// actualizar. Es la única guarda de integridad referencial: el
/// almacenamiento no impone claves foráneas.
pub fn verificar_referencia<T>(coleccion: &dyn Coleccion<T>, id: &Uuid, entidad: &str) -> Result<()>
    where T: Registro + Clone
{
    match coleccion.obtener(id)? {
        Some(_) => Ok(()),
        None => Err(PlantillaError::NotFound(format!("{} con id {} no existe", entidad, id))),
    }
}

/// Conjunto de colecciones del dominio. Se construye una vez al arrancar el
/// proceso y se inyecta por constructor en servicios y motor; las
/// implementaciones gestionan su propia sincronización.
#[derive(Clone)]
pub struct Almacen {
    pub modulos: Arc<dyn Coleccion<Modulo>>,
    pub formularios: Arc<dyn Coleccion<Formulario>>,
    pub secciones: Arc<dyn Coleccion<Seccion>>,
    pub elementos: Arc<dyn Coleccion<ElementoPersonalizado>>,
    pub elementos_html: Arc<dyn Coleccion<ElementoHtml>>,
    pub modales: Arc<dyn Coleccion<ModalAlerta>>,
}
