use std::error::Error;
use std::io::{self, Write};
use serde_json::json;
use uuid::Uuid;
use forma_domain::{ArbolPlantilla, ElementoHtmlDto, ModuloDto};
use plantilla::{Almacen, ElementoHtmlService, FiltroParams, ModuloService, PlantillaEngine};

/// Pequeño menú interactivo para administrar plantillas de formularios
/// sobre el almacén en memoria.
///
/// Opciones soportadas:
/// 1) Ver módulos (tabla con id y nombre)
/// 2) Crear módulo
/// 3) Crear plantilla de ejemplo para un módulo
/// 4) Ver plantilla (árbol JSON de la versión actual)
/// 5) Listar plantillas (paginado)
/// 6) Eliminar una versión de plantilla
/// 7) Salir
fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let almacen = Almacen::en_memoria();
    let modulos = ModuloService::new(&almacen);
    let catalogo = ElementoHtmlService::new(&almacen);
    let engine = PlantillaEngine::new(&almacen);

    // Catálogo mínimo para poder componer plantillas desde el menú
    let texto = catalogo.crear(ElementoHtmlDto { nombre: Some("input-texto".into()),
                                                 descripcion: Some("Campo de texto simple".into()),
                                                 tipo_id: Some(1),
                                                 tipo_dato_id: Some(1),
                                                 validadores: None,
                                                 parametros: None })?;
    let selector = catalogo.crear(ElementoHtmlDto { nombre: Some("selector".into()),
                                                    descripcion: Some("Lista desplegable".into()),
                                                    tipo_id: Some(2),
                                                    tipo_dato_id: Some(1),
                                                    validadores: None,
                                                    parametros: None })?;

    loop {
        println!("\n== Plantillas CLI menu ==");
        println!("1) Ver módulos");
        println!("2) Crear módulo");
        println!("3) Crear plantilla de ejemplo para un módulo");
        println!("4) Ver plantilla (versión actual)");
        println!("5) Listar plantillas");
        println!("6) Eliminar una versión de plantilla");
        println!("7) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                match modulos.listar(&FiltroParams::default()) {
                    Ok(docs) => {
                        println!("\nID                                   | NOMBRE");
                        println!("--------------------------------------------------------------");
                        for doc in docs {
                            let id = doc.get("id").and_then(|v| v.as_str()).unwrap_or("-");
                            let nombre = doc.get("nombre").and_then(|v| v.as_str()).unwrap_or("<sin-nombre>");
                            println!("{} | {}", id, nombre);
                        }
                    }
                    Err(e) => eprintln!("Error listando módulos: {}", e),
                }
            }
            "2" => {
                let nombre = prompt("Nombre del módulo: ")?;
                let descripcion = prompt("Descripción (enter para vacío): ")?;
                let descripcion = if descripcion.trim().is_empty() { None } else { Some(descripcion.trim().to_string()) };
                match modulos.crear(ModuloDto { nombre: Some(nombre.trim().to_string()),
                                                descripcion,
                                                sistema_id: Some(1) }) {
                    Ok(modulo) => println!("Módulo creado: {}", modulo.id),
                    Err(e) => eprintln!("Error creando módulo: {}", e),
                }
            }
            "3" => {
                let modulo_id = match leer_uuid("Módulo id (UUID): ")? {
                    Some(id) => id,
                    None => continue,
                };
                let nombre = prompt("Nombre del formulario: ")?;
                let payload = json!({
                    "modulo_id": modulo_id,
                    "formulario": {
                        "nombre": nombre.trim(),
                        "creado_por_id": 1,
                        "secciones": [
                            {
                                "nombre": "Datos generales",
                                "elementos": [
                                    { "nombre": "nombre", "elemento_html_id": texto.id, "etiqueta": { "es": "Nombre" }, "requerido": true }
                                ],
                                "secciones": [
                                    {
                                        "nombre": "Detalle",
                                        "elementos": [
                                            { "nombre": "categoria", "elemento_html_id": selector.id, "etiqueta": { "es": "Categoría" } }
                                        ]
                                    }
                                ]
                            }
                        ]
                    }
                });
                let arbol: ArbolPlantilla = match serde_json::from_value(payload) {
                    Ok(a) => a,
                    Err(e) => { eprintln!("Payload inválido: {}", e); continue; }
                };
                match engine.crear_plantilla(&arbol) {
                    Ok(resumen) => println!("{} (versión {})", resumen.mensaje, resumen.version),
                    Err(e) => eprintln!("Error creando plantilla: {}", e),
                }
            }
            "4" => {
                let modulo_id = match leer_uuid("Módulo id (UUID): ")? {
                    Some(id) => id,
                    None => continue,
                };
                match engine.obtener_plantilla(&modulo_id, None) {
                    Ok(vista) => println!("{}", serde_json::to_string_pretty(&vista)?),
                    Err(e) => eprintln!("Error obteniendo plantilla: {}", e),
                }
            }
            "5" => {
                // PLANTILLAS_LIMITE controla el tamaño de página del listado
                let params = FiltroParams { limit: std::env::var("PLANTILLAS_LIMITE").ok(),
                                            ..FiltroParams::default() };
                match engine.listar_plantillas(&params) {
                    Ok(pagina) => {
                        println!("Registros totales: {}", pagina.registros);
                        for doc in pagina.formularios {
                            println!("{}", serde_json::to_string(&doc)?);
                        }
                    }
                    Err(e) => eprintln!("Error listando plantillas: {}", e),
                }
            }
            "6" => {
                let modulo_id = match leer_uuid("Módulo id (UUID): ")? {
                    Some(id) => id,
                    None => continue,
                };
                let version_s = prompt("Versión a eliminar (número entero): ")?;
                let version: i64 = match version_s.trim().parse() {
                    Ok(n) => n,
                    Err(_) => { eprintln!("Versión inválida"); continue; }
                };
                let confirm = prompt(&format!("Confirma borrado de la versión {}? escribir 'yes' para confirmar: ", version))?;
                if confirm.trim().to_lowercase() == "yes" {
                    match engine.eliminar_plantilla(&modulo_id, version) {
                        Ok(mensaje) => println!("{}", mensaje),
                        Err(e) => eprintln!("Error eliminando plantilla: {}", e),
                    }
                } else {
                    println!("Borrado cancelado");
                }
            }
            "7" => {
                println!("Saliendo...");
                break;
            }
            _ => println!("Opción no reconocida"),
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String, Box<dyn Error>> {
    print!("{}", msg);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn leer_uuid(msg: &str) -> Result<Option<Uuid>, Box<dyn Error>> {
    let texto = prompt(msg)?;
    match Uuid::parse_str(texto.trim()) {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            eprintln!("UUID inválido");
            Ok(None)
        }
    }
}
