// Archivo: engine.rs
// Propósito: implementar el `PlantillaEngine`, el motor de composición y
// versionado de plantillas. Orquesta la creación multi-entidad del árbol
// completo bajo una versión nueva, reconstruye el árbol desde los registros
// planos para lectura, y cascada la eliminación lógica con traspaso de la
// versión actual.
//
// Nota sobre atomicidad: el almacenamiento confirma cada colección por
// separado, sin transacción multi-documento. El motor registra cada efecto
// que produce y lo deshace a mano en caso de fallo (saga con compensación,
// no transacción): entre el volteo de banderas y la compensación, un lector
// concurrente puede observar un módulo sin versión actual.
use crate::errors::{PlantillaError, Result};
use crate::filtros::{FiltroParams, FiltrosService};
use crate::repositorio::{verificar_referencia, Almacen, Coleccion};
use crate::servicios::{a_documento, eliminar_logico, guardar, poblar_referencia, ElementoPersonalizadoService,
                       FormularioService, SeccionService};
use chrono::{DateTime, Utc};
use forma_domain::{ArbolPlantilla, ElementoHtml, ElementoPersonalizado, ElementoPersonalizadoDto, Formulario,
                   FormularioDto, Modulo, NodoSeccion, Registro, Seccion, SeccionDto};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Confirmación de `crear_plantilla`: la versión recién publicada.
#[derive(Debug, Clone, Serialize)]
pub struct ResumenCreacion {
    pub mensaje: String,
    pub version: i64,
}

/// Página de resúmenes de formularios para `listar_plantillas`, con el
/// total de registros que cumplen el filtro antes de paginar.
#[derive(Debug, Clone, Serialize)]
pub struct Pagina {
    pub registros: usize,
    pub formularios: Vec<JsonValue>,
}

/// Árbol reconstruido de una plantilla, listo para serializar.
#[derive(Debug, Clone, Serialize)]
pub struct VistaPlantilla {
    pub modulo_id: Uuid,
    pub formulario: VistaFormulario,
}

#[derive(Debug, Clone, Serialize)]
pub struct VistaFormulario {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub version: i64,
    pub version_actual: bool,
    pub creado_por_id: i64,
    pub traduccion: bool,
    pub etiqueta: Option<JsonValue>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
    pub secciones: Vec<VistaSeccion>,
}

/// Sección reconstruida. Las claves `campos` y `secciones` se omiten por
/// completo cuando están vacías, en lugar de emitir listas vacías.
#[derive(Debug, Clone, Serialize)]
pub struct VistaSeccion {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub etiqueta: Option<JsonValue>,
    pub icono: Option<String>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campos: Option<Vec<VistaElemento>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secciones: Option<Vec<VistaSeccion>>,
}

/// Elemento hoja reconstruido, con su entrada de catálogo resuelta de
/// forma anticipada.
#[derive(Debug, Clone, Serialize)]
pub struct VistaElemento {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub etiqueta: JsonValue,
    pub elemento_html: ElementoHtml,
    pub deshabilitado: bool,
    pub solo_lectura: bool,
    pub placeholder: Option<JsonValue>,
    pub requerido: bool,
    pub validadores_personalizados: Option<JsonValue>,
    pub parametros_personalizados: Option<JsonValue>,
    pub dependencia: Option<JsonValue>,
}

/// Ids generados durante la construcción del árbol, en el orden en que se
/// escribieron. La compensación los deshace: elementos, luego secciones,
/// luego el formulario.
#[derive(Default)]
struct Creados {
    formulario: Option<Uuid>,
    secciones: Vec<Uuid>,
    elementos: Vec<Uuid>,
}

/// Motor de composición y versionado de plantillas.
///
/// Responsabilidades principales:
/// - Crear el árbol completo (formulario, secciones, elementos) bajo la
///   siguiente versión del módulo, como unidad lógica.
/// - Mantener la invariante de una sola versión actual por módulo.
/// - Reconstruir el árbol desde los registros planos para lectura.
/// - Cascada de eliminación lógica con traspaso de la versión actual.
pub struct PlantillaEngine {
    modulos: Arc<dyn Coleccion<Modulo>>,
    formularios: Arc<dyn Coleccion<Formulario>>,
    secciones: Arc<dyn Coleccion<Seccion>>,
    elementos: Arc<dyn Coleccion<ElementoPersonalizado>>,
    elementos_html: Arc<dyn Coleccion<ElementoHtml>>,
    formulario_service: FormularioService,
    seccion_service: SeccionService,
    elemento_service: ElementoPersonalizadoService,
}

impl PlantillaEngine {
    /// Crea el motor inyectando el almacén; los servicios de entidad se
    /// construyen internamente sobre las mismas colecciones.
    pub fn new(almacen: &Almacen) -> Self {
        Self { modulos: almacen.modulos.clone(),
               formularios: almacen.formularios.clone(),
               secciones: almacen.secciones.clone(),
               elementos: almacen.elementos.clone(),
               elementos_html: almacen.elementos_html.clone(),
               formulario_service: FormularioService::new(almacen),
               seccion_service: SeccionService::new(almacen),
               elemento_service: ElementoPersonalizadoService::new(almacen) }
    }

    /// Crea una plantilla completa bajo la siguiente versión del módulo.
    ///
    /// Orden de la operación:
    /// 1. Validar la forma del árbol (sin tocar el almacenamiento).
    /// 2. Resolver el módulo.
    /// 3. Prevalidar todas las referencias al catálogo de elementos HTML
    ///    antes de escribir nada, para evitar árboles a medio construir en
    ///    el caso común. No sustituye a la compensación: un borrado
    ///    concurrente entre la verificación y la escritura sigue siendo
    ///    posible.
    /// 4. Calcular la versión nueva y apagar las banderas de versión
    ///    actual del módulo.
    /// 5. Crear el formulario y recorrer el árbol creando secciones y
    ///    elementos, registrando cada id generado.
    /// 6. Ante cualquier fallo, compensar y re-lanzar como `Composicion`.
    pub fn crear_plantilla(&self, arbol: &ArbolPlantilla) -> Result<ResumenCreacion> {
        arbol.validar()?;

        let modulo = self.modulos
                         .obtener(&arbol.modulo_id)?
                         .ok_or_else(|| {
                             PlantillaError::NotFound(format!("Módulo con id {} no encontrado", arbol.modulo_id))
                         })?;

        self.prevalidar_catalogo(arbol)?;

        let (version_anterior, nueva_version) = self.rotar_versiones(&modulo.id)?;

        let mut creados = Creados::default();
        match self.construir_arbol(arbol, &modulo, nueva_version, &mut creados) {
            Ok(()) => Ok(ResumenCreacion { mensaje: "Plantilla creada exitosamente".into(),
                                           version: nueva_version }),
            Err(error) => {
                self.compensar(&creados, &modulo.id, version_anterior);
                Err(PlantillaError::Composicion(format!("Error al crear el formulario: {}", error)))
            }
        }
    }

    /// Reconstruye el árbol de una plantilla. Con `version` resuelve esa
    /// versión exacta; sin ella, la versión actual del módulo. Lectura
    /// pura: no muta nada.
    pub fn obtener_plantilla(&self, modulo_id: &Uuid, version: Option<i64>) -> Result<VistaPlantilla> {
        let formulario = self.buscar_formulario(modulo_id, version)?;

        // registros planos: secciones activas del formulario y elementos
        // activos de esas secciones
        let secciones: Vec<Seccion> = self.secciones
                                          .listar()?
                                          .into_iter()
                                          .filter(|s| s.formulario_id == formulario.id && s.activo)
                                          .collect();
        let ids_seccion: Vec<Uuid> = secciones.iter().map(|s| s.id).collect();

        let mut campos_por_seccion: HashMap<Uuid, Vec<VistaElemento>> = HashMap::new();
        for elemento in self.elementos.listar()? {
            if !elemento.activo || !ids_seccion.contains(&elemento.seccion_id) {
                continue;
            }
            let seccion_id = elemento.seccion_id;
            let vista = self.resolver_elemento(elemento)?;
            campos_por_seccion.entry(seccion_id).or_default().push(vista);
        }

        let raices: Vec<VistaSeccion> = secciones.iter()
                                                 .filter(|s| s.padre_id.is_none())
                                                 .map(|s| armar_seccion(s, &secciones, &campos_por_seccion))
                                                 .collect();

        Ok(VistaPlantilla { modulo_id: *modulo_id,
                            formulario: VistaFormulario { id: formulario.id,
                                                          nombre: formulario.nombre,
                                                          descripcion: formulario.descripcion,
                                                          version: formulario.version,
                                                          version_actual: formulario.version_actual,
                                                          creado_por_id: formulario.creado_por_id,
                                                          traduccion: formulario.traduccion,
                                                          etiqueta: formulario.etiqueta,
                                                          activo: formulario.activo,
                                                          fecha_creacion: formulario.fecha_creacion,
                                                          fecha_modificacion: formulario.fecha_modificacion,
                                                          secciones: raices } })
    }

    /// Lista resúmenes de formularios paginados, con el total de registros
    /// que cumplen el filtro antes de la paginación.
    pub fn listar_plantillas(&self, params: &FiltroParams) -> Result<Pagina> {
        let filtros = FiltrosService::new(params);
        let mut docs = Vec::new();
        for formulario in self.formularios.listar()? {
            let doc = a_documento(&formulario)?;
            if filtros.cumple(&doc) {
                docs.push(doc);
            }
        }
        let registros = docs.len();
        filtros.ordenar(&mut docs);
        let pagina = filtros.paginar(docs);

        let mut formularios = Vec::with_capacity(pagina.len());
        for doc in pagina {
            let mut resumen = resumir_formulario(&doc);
            if filtros.es_poblado() {
                poblar_referencia(&mut resumen, "modulo_id", self.modulos.as_ref())?;
            }
            formularios.push(resumen);
        }

        Ok(Pagina { registros, formularios })
    }

    /// Eliminación lógica en cascada de una versión exacta de la
    /// plantilla, con traspaso de la versión actual si hace falta.
    ///
    /// La cascada apaga los elementos antes que las secciones: la consulta
    /// de elementos se apoya en el conjunto de secciones aún legible, por
    /// lo que el orden importa para la corrección, no sólo para el estilo.
    pub fn eliminar_plantilla(&self, modulo_id: &Uuid, version: i64) -> Result<String> {
        let formulario = self.buscar_formulario(modulo_id, Some(version))?;
        let era_actual = formulario.version_actual;

        eliminar_logico(self.formularios.as_ref(), &formulario.id)?;

        let ids_seccion: Vec<Uuid> = self.secciones
                                         .listar()?
                                         .into_iter()
                                         .filter(|s| s.formulario_id == formulario.id)
                                         .map(|s| s.id)
                                         .collect();

        if !ids_seccion.is_empty() {
            for elemento in self.elementos.listar()? {
                if ids_seccion.contains(&elemento.seccion_id) && elemento.activo {
                    eliminar_logico(self.elementos.as_ref(), &elemento.id)?;
                }
            }
            for id in &ids_seccion {
                eliminar_logico(self.secciones.as_ref(), id)?;
            }
        }

        let mut mensaje = format!("Plantilla con modulo_id {} y versión {} eliminada exitosamente",
                                  modulo_id, version);

        if era_actual {
            match self.traspasar_version_actual(modulo_id, &formulario.id)? {
                Some(promovida) => {
                    mensaje.push_str(&format!(", la versión actual ha sido actualizada a la versión {}.", promovida));
                }
                None => {
                    mensaje.push_str(". La última versión activa ha sido eliminada, y no quedan versiones activas.");
                }
            }
        }

        Ok(mensaje)
    }

    // --- pasos internos de crear_plantilla -------------------------------

    /// Recorre el árbol y confirma que cada `elemento_html_id` existe en
    /// el catálogo, antes de cualquier mutación.
    fn prevalidar_catalogo(&self, arbol: &ArbolPlantilla) -> Result<()> {
        for id in arbol.elementos_html() {
            verificar_referencia(self.elementos_html.as_ref(), &id, "Elemento-html")?;
        }
        Ok(())
    }

    /// Calcula la versión nueva (máxima histórica del módulo + 1, sin
    /// reutilizar nunca una versión borrada) y apaga las banderas
    /// `version_actual` vigentes. Devuelve la versión que estaba marcada
    /// como actual, si la había, para poder restaurarla al compensar.
    fn rotar_versiones(&self, modulo_id: &Uuid) -> Result<(Option<i64>, i64)> {
        let mut version_anterior = None;
        let mut version_maxima = 0;
        for formulario in self.formularios.listar()? {
            if formulario.modulo_id != *modulo_id {
                continue;
            }
            version_maxima = version_maxima.max(formulario.version);
            if formulario.version_actual {
                version_anterior = Some(formulario.version);
                let mut apagado = formulario;
                apagado.version_actual = false;
                apagado.marcar_modificado();
                guardar(self.formularios.as_ref(), apagado)?;
            }
        }
        Ok((version_anterior, version_maxima + 1))
    }

    fn construir_arbol(&self, arbol: &ArbolPlantilla, modulo: &Modulo, version: i64, creados: &mut Creados)
                       -> Result<()> {
        let nodo = &arbol.formulario;
        let formulario = self.formulario_service
                             .crear(FormularioDto { nombre: Some(nodo.nombre.clone()),
                                                    descripcion: nodo.descripcion.clone(),
                                                    version: Some(version),
                                                    version_actual: Some(true),
                                                    creado_por_id: Some(nodo.creado_por_id),
                                                    modificado_por_id: None,
                                                    modulo_id: Some(modulo.id),
                                                    traduccion: Some(nodo.traduccion),
                                                    etiqueta: nodo.etiqueta.clone() })?;
        creados.formulario = Some(formulario.id);
        self.crear_secciones(&nodo.secciones, formulario.id, None, creados)
    }

    /// Camina el árbol de secciones en profundidad: crea la sección, luego
    /// sus elementos hoja, luego recurre en las subsecciones usando el
    /// mismo formulario y el id recién generado como padre.
    fn crear_secciones(&self, nodos: &[NodoSeccion], formulario_id: Uuid, padre_id: Option<Uuid>,
                       creados: &mut Creados)
                       -> Result<()> {
        for nodo in nodos {
            let seccion = self.seccion_service
                              .crear(SeccionDto { nombre: Some(nodo.nombre.clone()),
                                                  descripcion: nodo.descripcion.clone(),
                                                  formulario_id: Some(formulario_id),
                                                  padre_id,
                                                  etiqueta: nodo.etiqueta.clone(),
                                                  icono: nodo.icono.clone() })?;
            creados.secciones.push(seccion.id);

            for elemento in &nodo.elementos {
                let creado = self.elemento_service
                                 .crear(ElementoPersonalizadoDto { nombre: Some(elemento.nombre.clone()),
                                                                   descripcion: elemento.descripcion.clone(),
                                                                   seccion_id: Some(seccion.id),
                                                                   elemento_html_id: Some(elemento.elemento_html_id),
                                                                   etiqueta: elemento.etiqueta.clone(),
                                                                   deshabilitado: Some(elemento.deshabilitado),
                                                                   solo_lectura: Some(elemento.solo_lectura),
                                                                   placeholder: elemento.placeholder.clone(),
                                                                   requerido: Some(elemento.requerido),
                                                                   validadores_personalizados:
                                                                       elemento.validadores_personalizados.clone(),
                                                                   parametros_personalizados:
                                                                       elemento.parametros_personalizados.clone(),
                                                                   dependencia: elemento.dependencia.clone() })?;
                creados.elementos.push(creado.id);
            }

            self.crear_secciones(&nodo.secciones, formulario_id, Some(seccion.id), creados)?;
        }
        Ok(())
    }

    /// Deshace los efectos de una creación fallida: borrado físico de los
    /// elementos, luego de las secciones, luego del formulario (nunca se
    /// publicó), y restaura la bandera de la versión actual anterior. Los
    /// fallos durante la compensación se registran y la compensación
    /// continúa con el resto.
    fn compensar(&self, creados: &Creados, modulo_id: &Uuid, version_anterior: Option<i64>) {
        for id in &creados.elementos {
            if let Err(e) = self.elementos.eliminar(id) {
                log::warn!("compensación: no se pudo borrar el elemento {}: {}", id, e);
            }
        }
        for id in &creados.secciones {
            if let Err(e) = self.secciones.eliminar(id) {
                log::warn!("compensación: no se pudo borrar la sección {}: {}", id, e);
            }
        }
        if let Some(id) = creados.formulario {
            if let Err(e) = self.formularios.eliminar(&id) {
                log::warn!("compensación: no se pudo borrar el formulario {}: {}", id, e);
            }
        }
        if let Some(version) = version_anterior {
            if let Err(e) = self.restaurar_version_actual(modulo_id, version) {
                log::warn!("compensación: no se pudo restaurar la versión actual {} del módulo {}: {}",
                           version, modulo_id, e);
            }
        }
    }

    fn restaurar_version_actual(&self, modulo_id: &Uuid, version: i64) -> Result<()> {
        for formulario in self.formularios.listar()? {
            if formulario.modulo_id == *modulo_id && formulario.version == version {
                let mut restaurado = formulario;
                restaurado.version_actual = true;
                restaurado.marcar_modificado();
                guardar(self.formularios.as_ref(), restaurado)?;
            }
        }
        Ok(())
    }

    // --- helpers de lectura ----------------------------------------------

    fn buscar_formulario(&self, modulo_id: &Uuid, version: Option<i64>) -> Result<Formulario> {
        self.formularios
            .listar()?
            .into_iter()
            .find(|f| {
                f.modulo_id == *modulo_id
                && match version {
                       Some(v) => f.version == v,
                       None => f.version_actual,
                   }
            })
            .ok_or_else(|| {
                let version = version.map_or_else(|| "actual".to_string(), |v| v.to_string());
                PlantillaError::NotFound(format!("Formulario con modulo_id {} y versión {} no encontrado",
                                                 modulo_id, version))
            })
    }

    /// Resuelve de forma anticipada la entrada de catálogo de un elemento.
    fn resolver_elemento(&self, elemento: ElementoPersonalizado) -> Result<VistaElemento> {
        let catalogo = self.elementos_html
                           .obtener(&elemento.elemento_html_id)?
                           .ok_or_else(|| {
                               PlantillaError::NotFound(format!("Elemento-html con id {} no existe",
                                                                elemento.elemento_html_id))
                           })?;
        Ok(VistaElemento { id: elemento.id,
                           nombre: elemento.nombre,
                           descripcion: elemento.descripcion,
                           etiqueta: elemento.etiqueta,
                           elemento_html: catalogo,
                           deshabilitado: elemento.deshabilitado,
                           solo_lectura: elemento.solo_lectura,
                           placeholder: elemento.placeholder,
                           requerido: elemento.requerido,
                           validadores_personalizados: elemento.validadores_personalizados,
                           parametros_personalizados: elemento.parametros_personalizados,
                           dependencia: elemento.dependencia })
    }

    /// Quita la bandera del formulario eliminado y promueve la mayor
    /// versión activa restante del módulo, si la hay. Que un módulo quede
    /// sin versión actual es un estado terminal válido.
    fn traspasar_version_actual(&self, modulo_id: &Uuid, formulario_id: &Uuid) -> Result<Option<i64>> {
        let eliminado = self.formularios
                            .obtener(formulario_id)?
                            .ok_or_else(|| PlantillaError::NotFound(format!("{} no existe", formulario_id)))?;
        let mut apagado = eliminado;
        apagado.version_actual = false;
        apagado.marcar_modificado();
        guardar(self.formularios.as_ref(), apagado)?;

        let candidata = self.formularios
                            .listar()?
                            .into_iter()
                            .filter(|f| f.modulo_id == *modulo_id && f.activo)
                            .max_by_key(|f| f.version);

        match candidata {
            Some(mut promovida) => {
                promovida.version_actual = true;
                promovida.marcar_modificado();
                let version = promovida.version;
                guardar(self.formularios.as_ref(), promovida)?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }
}

/// Construye recursivamente la vista de una sección a partir del arreglo
/// plano, omitiendo las claves `campos`/`secciones` cuando no hay nada que
/// colgar.
fn armar_seccion(seccion: &Seccion, todas: &[Seccion], campos: &HashMap<Uuid, Vec<VistaElemento>>) -> VistaSeccion {
    let hijas: Vec<VistaSeccion> = todas.iter()
                                        .filter(|s| s.padre_id == Some(seccion.id))
                                        .map(|s| armar_seccion(s, todas, campos))
                                        .collect();
    let propios = campos.get(&seccion.id).cloned().filter(|c| !c.is_empty());
    VistaSeccion { id: seccion.id,
                   nombre: seccion.nombre.clone(),
                   descripcion: seccion.descripcion.clone(),
                   etiqueta: seccion.etiqueta.clone(),
                   icono: seccion.icono.clone(),
                   activo: seccion.activo,
                   fecha_creacion: seccion.fecha_creacion,
                   fecha_modificacion: seccion.fecha_modificacion,
                   campos: propios,
                   secciones: if hijas.is_empty() { None } else { Some(hijas) } }
}

/// Resumen plano de un formulario para los listados: sólo los campos que
/// interesan a la página de versiones.
fn resumir_formulario(doc: &JsonValue) -> JsonValue {
    let mut resumen = serde_json::Map::new();
    for campo in ["id", "nombre", "modulo_id", "version", "version_actual"] {
        if let Some(valor) = doc.get(campo) {
            resumen.insert(campo.to_string(), valor.clone());
        }
    }
    JsonValue::Object(resumen)
}
