// Archivo: servicios.rs
// Propósito: servicios CRUD por entidad. Cada servicio sella las fechas,
// valida las referencias declaradas mediante `verificar_referencia` antes
// de persistir, y elimina siempre de forma lógica. El motor de plantillas
// los consume como bloques de construcción.
use crate::errors::{PlantillaError, Result};
use crate::filtros::{FiltroParams, FiltrosService};
use crate::repositorio::{verificar_referencia, Almacen, Coleccion};
use forma_domain::{ElementoHtml, ElementoHtmlDto, ElementoPersonalizado, ElementoPersonalizadoDto, Formulario,
                   FormularioDto, ModalAlerta, ModalAlertaDto, Modulo, ModuloDto, Registro, Seccion, SeccionDto};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Lee un registro por id o falla con `NotFound`. No filtra por `activo`:
/// la lectura devuelve el registro esté o no eliminado lógicamente.
pub(crate) fn obtener_registro<T>(coleccion: &dyn Coleccion<T>, id: &Uuid) -> Result<T>
    where T: Registro + Clone
{
    coleccion.obtener(id)?
             .ok_or_else(|| PlantillaError::NotFound(format!("{} no existe", id)))
}

pub(crate) fn guardar<T>(coleccion: &dyn Coleccion<T>, registro: T) -> Result<T>
    where T: Registro + Clone
{
    let id = registro.id();
    coleccion.actualizar(registro)?
             .ok_or_else(|| PlantillaError::NotFound(format!("{} no existe", id)))
}

/// Eliminación lógica: apaga `activo` y sella la fecha de modificación.
pub(crate) fn eliminar_logico<T>(coleccion: &dyn Coleccion<T>, id: &Uuid) -> Result<T>
    where T: Registro + Clone
{
    let mut registro = obtener_registro(coleccion, id)?;
    registro.desactivar();
    registro.marcar_modificado();
    guardar(coleccion, registro)
}

/// Proyección JSON de una colección filtrada, ordenada y paginada según
/// los parámetros de consulta. El poblamiento de referencias corre por
/// cuenta de cada servicio.
pub(crate) fn listar_documentos<T>(coleccion: &dyn Coleccion<T>, filtros: &FiltrosService) -> Result<Vec<JsonValue>>
    where T: Registro + Clone + Serialize
{
    let mut docs = Vec::new();
    for registro in coleccion.listar()? {
        let doc = a_documento(&registro)?;
        if filtros.cumple(&doc) {
            docs.push(doc);
        }
    }
    filtros.ordenar(&mut docs);
    Ok(filtros.paginar(docs))
}

pub(crate) fn a_documento<T: Serialize>(registro: &T) -> Result<JsonValue> {
    serde_json::to_value(registro).map_err(|e| PlantillaError::Almacenamiento(e.to_string()))
}

/// Reemplaza un campo de referencia por el documento completo del registro
/// referenciado, si existe.
pub(crate) fn poblar_referencia<T>(doc: &mut JsonValue, campo: &str, coleccion: &dyn Coleccion<T>) -> Result<()>
    where T: Registro + Clone + Serialize
{
    let id = match doc.get(campo).and_then(|v| v.as_str()).and_then(|s| Uuid::parse_str(s).ok()) {
        Some(id) => id,
        None => return Ok(()),
    };
    if let Some(registro) = coleccion.obtener(&id)? {
        let valor = a_documento(&registro)?;
        if let Some(objeto) = doc.as_object_mut() {
            objeto.insert(campo.to_string(), valor);
        }
    }
    Ok(())
}

fn proyectar_todos(filtros: &FiltrosService, docs: Vec<JsonValue>) -> Vec<JsonValue> {
    docs.iter().map(|d| filtros.proyectar(d)).collect()
}

// ---------------------------------------------------------------------------

/// Servicio CRUD de módulos. Sin referencias declaradas.
pub struct ModuloService {
    modulos: Arc<dyn Coleccion<Modulo>>,
}

impl ModuloService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { modulos: almacen.modulos.clone() }
    }

    pub fn crear(&self, dto: ModuloDto) -> Result<Modulo> {
        let modulo = Modulo::nuevo(dto)?;
        self.modulos.insertar(modulo)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let docs = listar_documentos(self.modulos.as_ref(), &filtros)?;
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<Modulo> {
        obtener_registro(self.modulos.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: ModuloDto) -> Result<Modulo> {
        let mut modulo = self.obtener(id)?;
        modulo.aplicar(dto)?;
        guardar(self.modulos.as_ref(), modulo)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<Modulo> {
        eliminar_logico(self.modulos.as_ref(), id)
    }
}

/// Servicio CRUD de formularios. Valida `modulo_id` contra la colección de
/// módulos en cada escritura.
pub struct FormularioService {
    formularios: Arc<dyn Coleccion<Formulario>>,
    modulos: Arc<dyn Coleccion<Modulo>>,
}

impl FormularioService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { formularios: almacen.formularios.clone(),
               modulos: almacen.modulos.clone() }
    }

    fn verificar_relaciones(&self, formulario: &Formulario) -> Result<()> {
        verificar_referencia(self.modulos.as_ref(), &formulario.modulo_id, "Modulo")
    }

    pub fn crear(&self, dto: FormularioDto) -> Result<Formulario> {
        let formulario = Formulario::nuevo(dto)?;
        self.verificar_relaciones(&formulario)?;
        self.formularios.insertar(formulario)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let mut docs = listar_documentos(self.formularios.as_ref(), &filtros)?;
        if filtros.es_poblado() {
            for doc in &mut docs {
                poblar_referencia(doc, "modulo_id", self.modulos.as_ref())?;
            }
        }
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<Formulario> {
        obtener_registro(self.formularios.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: FormularioDto) -> Result<Formulario> {
        let mut formulario = self.obtener(id)?;
        formulario.aplicar(dto)?;
        self.verificar_relaciones(&formulario)?;
        guardar(self.formularios.as_ref(), formulario)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<Formulario> {
        eliminar_logico(self.formularios.as_ref(), id)
    }
}

/// Servicio CRUD de secciones. Además de validar `formulario_id`, exige
/// que la sección padre, si la hay, pertenezca al mismo formulario.
pub struct SeccionService {
    secciones: Arc<dyn Coleccion<Seccion>>,
    formularios: Arc<dyn Coleccion<Formulario>>,
}

impl SeccionService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { secciones: almacen.secciones.clone(),
               formularios: almacen.formularios.clone() }
    }

    fn verificar_relaciones(&self, seccion: &Seccion) -> Result<()> {
        verificar_referencia(self.formularios.as_ref(), &seccion.formulario_id, "Formulario")?;
        if let Some(padre_id) = seccion.padre_id {
            if padre_id == seccion.id {
                return Err(PlantillaError::Validacion("Una sección no puede ser su propio padre".into()));
            }
            let padre = self.secciones
                            .obtener(&padre_id)?
                            .ok_or_else(|| PlantillaError::NotFound(format!("Seccion con id {} no existe", padre_id)))?;
            if padre.formulario_id != seccion.formulario_id {
                return Err(PlantillaError::Validacion(format!("La sección padre {} pertenece a otro formulario",
                                                              padre_id)));
            }
        }
        Ok(())
    }

    pub fn crear(&self, dto: SeccionDto) -> Result<Seccion> {
        let seccion = Seccion::nuevo(dto)?;
        self.verificar_relaciones(&seccion)?;
        self.secciones.insertar(seccion)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let mut docs = listar_documentos(self.secciones.as_ref(), &filtros)?;
        if filtros.es_poblado() {
            for doc in &mut docs {
                poblar_referencia(doc, "formulario_id", self.formularios.as_ref())?;
                poblar_referencia(doc, "padre_id", self.secciones.as_ref())?;
            }
        }
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<Seccion> {
        obtener_registro(self.secciones.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: SeccionDto) -> Result<Seccion> {
        let mut seccion = self.obtener(id)?;
        seccion.aplicar(dto)?;
        self.verificar_relaciones(&seccion)?;
        guardar(self.secciones.as_ref(), seccion)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<Seccion> {
        eliminar_logico(self.secciones.as_ref(), id)
    }
}

/// Servicio CRUD de elementos personalizados. Valida la sección dueña y la
/// entrada del catálogo de elementos HTML.
pub struct ElementoPersonalizadoService {
    elementos: Arc<dyn Coleccion<ElementoPersonalizado>>,
    secciones: Arc<dyn Coleccion<Seccion>>,
    elementos_html: Arc<dyn Coleccion<ElementoHtml>>,
}

impl ElementoPersonalizadoService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { elementos: almacen.elementos.clone(),
               secciones: almacen.secciones.clone(),
               elementos_html: almacen.elementos_html.clone() }
    }

    fn verificar_relaciones(&self, elemento: &ElementoPersonalizado) -> Result<()> {
        verificar_referencia(self.secciones.as_ref(), &elemento.seccion_id, "Seccion")?;
        verificar_referencia(self.elementos_html.as_ref(), &elemento.elemento_html_id, "Elemento-html")
    }

    pub fn crear(&self, dto: ElementoPersonalizadoDto) -> Result<ElementoPersonalizado> {
        let elemento = ElementoPersonalizado::nuevo(dto)?;
        self.verificar_relaciones(&elemento)?;
        self.elementos.insertar(elemento)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let mut docs = listar_documentos(self.elementos.as_ref(), &filtros)?;
        if filtros.es_poblado() {
            for doc in &mut docs {
                poblar_referencia(doc, "seccion_id", self.secciones.as_ref())?;
                poblar_referencia(doc, "elemento_html_id", self.elementos_html.as_ref())?;
            }
        }
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<ElementoPersonalizado> {
        obtener_registro(self.elementos.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: ElementoPersonalizadoDto) -> Result<ElementoPersonalizado> {
        let mut elemento = self.obtener(id)?;
        elemento.aplicar(dto)?;
        self.verificar_relaciones(&elemento)?;
        guardar(self.elementos.as_ref(), elemento)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<ElementoPersonalizado> {
        eliminar_logico(self.elementos.as_ref(), id)
    }
}

/// Servicio CRUD del catálogo de elementos HTML. Sin referencias
/// declaradas; ciclo de vida independiente del resto del árbol.
pub struct ElementoHtmlService {
    elementos_html: Arc<dyn Coleccion<ElementoHtml>>,
}

impl ElementoHtmlService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { elementos_html: almacen.elementos_html.clone() }
    }

    pub fn crear(&self, dto: ElementoHtmlDto) -> Result<ElementoHtml> {
        let elemento = ElementoHtml::nuevo(dto)?;
        self.elementos_html.insertar(elemento)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let docs = listar_documentos(self.elementos_html.as_ref(), &filtros)?;
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<ElementoHtml> {
        obtener_registro(self.elementos_html.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: ElementoHtmlDto) -> Result<ElementoHtml> {
        let mut elemento = self.obtener(id)?;
        elemento.aplicar(dto)?;
        guardar(self.elementos_html.as_ref(), elemento)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<ElementoHtml> {
        eliminar_logico(self.elementos_html.as_ref(), id)
    }
}

/// Servicio CRUD de modales de alerta. Valida `formulario_id`.
pub struct ModalAlertaService {
    modales: Arc<dyn Coleccion<ModalAlerta>>,
    formularios: Arc<dyn Coleccion<Formulario>>,
}

impl ModalAlertaService {
    pub fn new(almacen: &Almacen) -> Self {
        Self { modales: almacen.modales.clone(),
               formularios: almacen.formularios.clone() }
    }

    fn verificar_relaciones(&self, modal: &ModalAlerta) -> Result<()> {
        verificar_referencia(self.formularios.as_ref(), &modal.formulario_id, "Formulario")
    }

    pub fn crear(&self, dto: ModalAlertaDto) -> Result<ModalAlerta> {
        let modal = ModalAlerta::nuevo(dto)?;
        self.verificar_relaciones(&modal)?;
        self.modales.insertar(modal)
    }

    pub fn listar(&self, params: &FiltroParams) -> Result<Vec<JsonValue>> {
        let filtros = FiltrosService::new(params);
        let mut docs = listar_documentos(self.modales.as_ref(), &filtros)?;
        if filtros.es_poblado() {
            for doc in &mut docs {
                poblar_referencia(doc, "formulario_id", self.formularios.as_ref())?;
            }
        }
        Ok(proyectar_todos(&filtros, docs))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<ModalAlerta> {
        obtener_registro(self.modales.as_ref(), id)
    }

    pub fn actualizar(&self, id: &Uuid, dto: ModalAlertaDto) -> Result<ModalAlerta> {
        let mut modal = self.obtener(id)?;
        modal.aplicar(dto)?;
        self.verificar_relaciones(&modal)?;
        guardar(self.modales.as_ref(), modal)
    }

    pub fn eliminar(&self, id: &Uuid) -> Result<ModalAlerta> {
        eliminar_logico(self.modales.as_ref(), id)
    }
}
