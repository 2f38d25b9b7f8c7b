use plantilla::{FiltroParams, FiltrosService};
use serde_json::json;

fn params(query: &str) -> FiltroParams {
  FiltroParams { query: Some(query.into()), ..FiltroParams::default() }
}

fn cumple(query: &str, doc: serde_json::Value) -> bool {
  FiltrosService::new(&params(query)).cumple(&doc)
}

#[test]
fn igualdad_simple_sobre_texto() {
  assert!(cumple("nombre:Inventario", json!({ "nombre": "Inventario" })));
  assert!(!cumple("nombre:Inventario", json!({ "nombre": "Ventas" })));
  assert!(!cumple("nombre:Inventario", json!({})));
}

#[test]
fn contains_distingue_mayusculas_e_icontains_no() {
  let doc = json!({ "nombre": "Alta de Producto" });
  assert!(cumple("nombre__contains:Producto", doc.clone()));
  assert!(!cumple("nombre__contains:producto", doc.clone()));
  assert!(cumple("nombre__icontains:producto", doc.clone()));
  assert!(cumple("nombre__icontains:PRODUCTO", doc));
}

#[test]
fn comparadores_numericos_con_sufijo_tipado() {
  let doc = json!({ "version": 3 });
  assert!(cumple("version__gt:2<n>", doc.clone()));
  assert!(cumple("version__gte:3<n>", doc.clone()));
  assert!(cumple("version__lt:4<n>", doc.clone()));
  assert!(cumple("version__lte:3<n>", doc.clone()));
  assert!(!cumple("version__gt:3<n>", doc.clone()));
  // sin sufijo el literal es texto y no compara contra un número
  assert!(!cumple("version__gt:2", doc));
}

#[test]
fn comparadores_de_fecha() {
  let doc = json!({ "fecha_creacion": "2026-03-10T12:00:00Z" });
  assert!(cumple("fecha_creacion__gte:2026-03-01<d>", doc.clone()));
  assert!(cumple("fecha_creacion__lt:2026-04-01<d>", doc.clone()));
  assert!(!cumple("fecha_creacion__lt:2026-03-01<d>", doc));
}

#[test]
fn literal_booleano_y_nulo() {
  assert!(cumple("version_actual:true<b>", json!({ "version_actual": true })));
  assert!(!cumple("version_actual:true<b>", json!({ "version_actual": false })));
  assert!(cumple("padre_id__isnull:true", json!({ "padre_id": null })));
  assert!(!cumple("padre_id__isnull:true", json!({ "padre_id": "x" })));
  assert!(cumple("padre_id__isnull:false", json!({ "padre_id": "x" })));
}

#[test]
fn pertenencia_con_valores_separados_por_barra() {
  let doc = json!({ "nombre": "b" });
  assert!(cumple("nombre__in:a|b|c", doc.clone()));
  assert!(!cumple("nombre__in:x|y", doc));
  assert!(cumple("version__in:1<n>|2<n>", json!({ "version": 2 })));
}

#[test]
fn negacion_y_busqueda_en_arreglos() {
  assert!(cumple("nombre__not:a", json!({ "nombre": "b" })));
  assert!(!cumple("nombre__not:b", json!({ "nombre": "b" })));
  assert!(cumple("etiquetas__inarray:rojo", json!({ "etiquetas": ["rojo", "azul"] })));
  assert!(!cumple("etiquetas__inarray:verde", json!({ "etiquetas": ["rojo", "azul"] })));
  assert!(!cumple("etiquetas__inarray:rojo", json!({ "etiquetas": "rojo" })));
}

#[test]
fn condiciones_multiples_son_conjuncion() {
  let doc = json!({ "nombre": "Alta", "version": 2 });
  assert!(cumple("nombre:Alta,version__gte:2<n>", doc.clone()));
  assert!(!cumple("nombre:Alta,version__gte:3<n>", doc));
}

#[test]
fn valores_multibyte_se_tratan_como_texto() {
  // un carácter de varios bytes cerca del final no debe confundirse con
  // un sufijo de tipo
  assert!(cumple("nombre:a💚", json!({ "nombre": "a💚" })));
  assert!(!cumple("nombre:a💚", json!({ "nombre": "otro" })));
  assert!(cumple("nombre__icontains:💚", json!({ "nombre": "a💚b" })));
  assert!(cumple("nombre__in:á|é|í", json!({ "nombre": "é" })));
}

#[test]
fn operador_desconocido_se_ignora() {
  // la condición malformada no filtra nada
  assert!(cumple("nombre__regex:^A", json!({ "nombre": "B" })));
}

#[test]
fn proyeccion_conserva_el_id() {
  let filtros = FiltrosService::new(&FiltroParams { fields: Some("nombre".into()), ..FiltroParams::default() });
  let doc = filtros.proyectar(&json!({ "id": "u-1", "nombre": "Alta", "version": 2 }));
  assert_eq!(doc, json!({ "id": "u-1", "nombre": "Alta" }));
}

#[test]
fn ordenamiento_con_direccion_por_campo() {
  let filtros = FiltrosService::new(&FiltroParams { sortby: Some("nombre,version".into()),
                                                    order: Some("asc,desc".into()),
                                                    ..FiltroParams::default() });
  let mut docs = vec![json!({ "nombre": "a", "version": 1 }),
                      json!({ "nombre": "a", "version": 3 }),
                      json!({ "nombre": "b", "version": 2 })];
  filtros.ordenar(&mut docs);
  assert_eq!(docs[0]["version"], 3);
  assert_eq!(docs[1]["version"], 1);
  assert_eq!(docs[2]["nombre"], "b");
}

#[test]
fn una_sola_direccion_se_comparte() {
  let filtros = FiltrosService::new(&FiltroParams { sortby: Some("nombre,version".into()),
                                                    order: Some("desc".into()),
                                                    ..FiltroParams::default() });
  let mut docs = vec![json!({ "nombre": "a", "version": 1 }),
                      json!({ "nombre": "a", "version": 2 })];
  filtros.ordenar(&mut docs);
  assert_eq!(docs[0]["version"], 2);
}

#[test]
fn tamanos_desparejos_caen_en_ascendente() {
  let filtros = FiltrosService::new(&FiltroParams { sortby: Some("nombre,version".into()),
                                                    order: Some("desc,asc,desc".into()),
                                                    ..FiltroParams::default() });
  let mut docs = vec![json!({ "nombre": "b", "version": 1 }),
                      json!({ "nombre": "a", "version": 2 })];
  filtros.ordenar(&mut docs);
  assert_eq!(docs[0]["nombre"], "a");
}

#[test]
fn paginacion_con_defectos_diez_y_cero() {
  let filtros = FiltrosService::new(&FiltroParams::default());
  let docs: Vec<_> = (0..25).map(|i| json!({ "i": i })).collect();
  let pagina = filtros.paginar(docs.clone());
  assert_eq!(pagina.len(), 10);
  assert_eq!(pagina[0]["i"], 0);

  let filtros = FiltrosService::new(&FiltroParams { limit: Some("7".into()),
                                                    offset: Some("20".into()),
                                                    ..FiltroParams::default() });
  let pagina = filtros.paginar(docs);
  assert_eq!(pagina.len(), 5);
  assert_eq!(pagina[0]["i"], 20);
}

#[test]
fn populate_solo_con_true_literal() {
  assert!(FiltrosService::new(&FiltroParams { populate: Some("true".into()), ..FiltroParams::default() }).es_poblado());
  assert!(!FiltrosService::new(&FiltroParams { populate: Some("True".into()), ..FiltroParams::default() }).es_poblado());
  assert!(!FiltrosService::new(&FiltroParams::default()).es_poblado());
}

#[test]
fn valores_de_fecha_con_hora_completa() {
  // el valor puede contener ':' porque sólo el primero separa campo y valor
  let doc = json!({ "fecha_creacion": "2026-03-10T12:00:00Z" });
  assert!(cumple("fecha_creacion__gte:2026-03-10T00:00:00Z<d>", doc));
}
