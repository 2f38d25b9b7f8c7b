// Archivo: stubs.rs
// Propósito: implementación en memoria de `Coleccion<T>` para pruebas y
// wiring rápido. No es durable; modela colecciones de documentos que
// confirman cada escritura de forma independiente, como el almacenamiento
// real del diseño.
use crate::errors::{PlantillaError, Result};
use crate::repositorio::{Almacen, Coleccion};
use forma_domain::Registro;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Colección de registros en memoria indexada por id.
pub struct ColeccionEnMemoria<T> {
    registros: Mutex<HashMap<Uuid, T>>,
}

impl<T> ColeccionEnMemoria<T> {
    /// Crea una colección vacía.
    pub fn new() -> Self {
        Self { registros: Mutex::new(HashMap::new()) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `PlantillaError::Almacenamiento`.
    fn lock(&self) -> std::result::Result<MutexGuard<'_, HashMap<Uuid, T>>, PlantillaError> {
        self.registros
            .lock()
            .map_err(|e| PlantillaError::Almacenamiento(format!("mutex poisoned: {:?}", e)))
    }
}

impl<T> Default for ColeccionEnMemoria<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Coleccion<T> for ColeccionEnMemoria<T> where T: Registro + Clone + Send
{
    fn insertar(&self, registro: T) -> Result<T> {
        let mut registros = self.lock()?;
        if registros.contains_key(&registro.id()) {
            return Err(PlantillaError::Almacenamiento(format!("id duplicado: {}", registro.id())));
        }
        registros.insert(registro.id(), registro.clone());
        Ok(registro)
    }

    fn obtener(&self, id: &Uuid) -> Result<Option<T>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn actualizar(&self, registro: T) -> Result<Option<T>> {
        let mut registros = self.lock()?;
        if !registros.contains_key(&registro.id()) {
            return Ok(None);
        }
        registros.insert(registro.id(), registro.clone());
        Ok(Some(registro))
    }

    fn eliminar(&self, id: &Uuid) -> Result<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }

    fn listar(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

impl Almacen {
    /// Construye el conjunto completo de colecciones en memoria.
    pub fn en_memoria() -> Self {
        Self { modulos: Arc::new(ColeccionEnMemoria::new()),
               formularios: Arc::new(ColeccionEnMemoria::new()),
               secciones: Arc::new(ColeccionEnMemoria::new()),
               elementos: Arc::new(ColeccionEnMemoria::new()),
               elementos_html: Arc::new(ColeccionEnMemoria::new()),
               modales: Arc::new(ColeccionEnMemoria::new()) }
    }
}
