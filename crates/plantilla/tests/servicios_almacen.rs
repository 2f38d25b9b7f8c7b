use forma_domain::{ElementoHtmlDto, ElementoPersonalizadoDto, FormularioDto, ModalAlertaDto, ModuloDto, SeccionDto};
use plantilla::{Almacen, ElementoHtmlService, ElementoPersonalizadoService, FiltroParams, FormularioService,
                ModalAlertaService, ModuloService, PlantillaError, SeccionService};
use uuid::Uuid;

fn modulo_dto(nombre: &str) -> ModuloDto {
  ModuloDto { nombre: Some(nombre.into()), descripcion: None, sistema_id: Some(1) }
}

fn formulario_dto(modulo_id: Uuid) -> FormularioDto {
  FormularioDto { nombre: Some("Alta".into()),
                  descripcion: None,
                  version: Some(1),
                  version_actual: Some(true),
                  creado_por_id: Some(1),
                  modificado_por_id: None,
                  modulo_id: Some(modulo_id),
                  traduccion: None,
                  etiqueta: None }
}

#[test]
fn crud_basico_de_modulos() {
  let almacen = Almacen::en_memoria();
  let servicio = ModuloService::new(&almacen);

  let modulo = servicio.crear(modulo_dto("Inventario")).expect("crear");
  assert!(modulo.activo);

  let leido = servicio.obtener(&modulo.id).expect("obtener");
  assert_eq!(leido.nombre, "Inventario");

  let actualizado = servicio.actualizar(&modulo.id, ModuloDto { nombre: Some("Inventario v2".into()),
                                                                descripcion: Some("revisado".into()),
                                                                sistema_id: None })
                            .expect("actualizar");
  assert_eq!(actualizado.nombre, "Inventario v2");
  assert_eq!(actualizado.sistema_id, modulo.sistema_id);
  // la fecha de creación nunca cambia en una actualización
  assert_eq!(actualizado.fecha_creacion, modulo.fecha_creacion);

  let eliminado = servicio.eliminar(&modulo.id).expect("eliminar");
  assert!(!eliminado.activo);
  // la eliminación es lógica: el registro sigue siendo legible
  assert!(!servicio.obtener(&modulo.id).unwrap().activo);
}

#[test]
fn formulario_exige_modulo_existente() {
  let almacen = Almacen::en_memoria();
  let servicio = FormularioService::new(&almacen);

  let resultado = servicio.crear(formulario_dto(Uuid::new_v4()));
  assert!(matches!(resultado, Err(PlantillaError::NotFound(_))));
}

#[test]
fn formulario_rechaza_version_no_positiva() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("M")).unwrap();

  let mut dto = formulario_dto(modulo.id);
  dto.version = Some(0);
  let resultado = FormularioService::new(&almacen).crear(dto);
  assert!(matches!(resultado, Err(PlantillaError::Validacion(_))));
}

#[test]
fn seccion_padre_debe_pertenecer_al_mismo_formulario() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("M")).unwrap();
  let formularios = FormularioService::new(&almacen);
  let f1 = formularios.crear(formulario_dto(modulo.id)).unwrap();
  let mut dto2 = formulario_dto(modulo.id);
  dto2.version = Some(2);
  dto2.version_actual = Some(false);
  let f2 = formularios.crear(dto2).unwrap();

  let secciones = SeccionService::new(&almacen);
  let raiz = secciones.crear(SeccionDto { nombre: Some("Raíz".into()),
                                          descripcion: None,
                                          formulario_id: Some(f1.id),
                                          padre_id: None,
                                          etiqueta: None,
                                          icono: None })
                      .expect("seccion raiz");

  // padre del mismo formulario: válido
  let hija = secciones.crear(SeccionDto { nombre: Some("Hija".into()),
                                          descripcion: None,
                                          formulario_id: Some(f1.id),
                                          padre_id: Some(raiz.id),
                                          etiqueta: None,
                                          icono: None })
                      .expect("seccion hija");
  assert_eq!(hija.padre_id, Some(raiz.id));

  // padre de otro formulario: rechazado
  let cruzada = secciones.crear(SeccionDto { nombre: Some("Cruzada".into()),
                                             descripcion: None,
                                             formulario_id: Some(f2.id),
                                             padre_id: Some(raiz.id),
                                             etiqueta: None,
                                             icono: None });
  assert!(matches!(cruzada, Err(PlantillaError::Validacion(_))));

  // padre inexistente: NotFound
  let huerfana = secciones.crear(SeccionDto { nombre: Some("Huérfana".into()),
                                              descripcion: None,
                                              formulario_id: Some(f1.id),
                                              padre_id: Some(Uuid::new_v4()),
                                              etiqueta: None,
                                              icono: None });
  assert!(matches!(huerfana, Err(PlantillaError::NotFound(_))));
}

#[test]
fn una_seccion_no_puede_ser_su_propio_padre() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("M")).unwrap();
  let formulario = FormularioService::new(&almacen).crear(formulario_dto(modulo.id)).unwrap();

  let secciones = SeccionService::new(&almacen);
  let seccion = secciones.crear(SeccionDto { nombre: Some("S".into()),
                                             descripcion: None,
                                             formulario_id: Some(formulario.id),
                                             padre_id: None,
                                             etiqueta: None,
                                             icono: None })
                         .unwrap();

  let resultado = secciones.actualizar(&seccion.id, SeccionDto { nombre: None,
                                                                 descripcion: None,
                                                                 formulario_id: None,
                                                                 padre_id: Some(seccion.id),
                                                                 etiqueta: None,
                                                                 icono: None });
  assert!(matches!(resultado, Err(PlantillaError::Validacion(_))));
}

#[test]
fn elemento_valida_seccion_y_catalogo() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("M")).unwrap();
  let formulario = FormularioService::new(&almacen).crear(formulario_dto(modulo.id)).unwrap();
  let seccion = SeccionService::new(&almacen).crear(SeccionDto { nombre: Some("S".into()),
                                                                 descripcion: None,
                                                                 formulario_id: Some(formulario.id),
                                                                 padre_id: None,
                                                                 etiqueta: None,
                                                                 icono: None })
                                             .unwrap();
  let html = ElementoHtmlService::new(&almacen).crear(ElementoHtmlDto { nombre: Some("input".into()),
                                                                        descripcion: None,
                                                                        tipo_id: Some(1),
                                                                        tipo_dato_id: Some(1),
                                                                        validadores: None,
                                                                        parametros: None })
                                               .unwrap();

  let elementos = ElementoPersonalizadoService::new(&almacen);
  let dto = |seccion_id, html_id| ElementoPersonalizadoDto { nombre: Some("campo".into()),
                                                             descripcion: None,
                                                             seccion_id: Some(seccion_id),
                                                             elemento_html_id: Some(html_id),
                                                             etiqueta: Some(serde_json::json!({ "es": "Campo" })),
                                                             deshabilitado: None,
                                                             solo_lectura: None,
                                                             placeholder: None,
                                                             requerido: Some(true),
                                                             validadores_personalizados: None,
                                                             parametros_personalizados: None,
                                                             dependencia: None };

  let creado = elementos.crear(dto(seccion.id, html.id)).expect("crear elemento");
  assert!(creado.requerido);
  assert!(!creado.deshabilitado);

  assert!(matches!(elementos.crear(dto(Uuid::new_v4(), html.id)), Err(PlantillaError::NotFound(_))));
  assert!(matches!(elementos.crear(dto(seccion.id, Uuid::new_v4())), Err(PlantillaError::NotFound(_))));
}

#[test]
fn modal_alerta_valida_su_formulario() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("M")).unwrap();
  let formulario = FormularioService::new(&almacen).crear(formulario_dto(modulo.id)).unwrap();

  let modales = ModalAlertaService::new(&almacen);
  let dto = |formulario_id| ModalAlertaDto { titulo: Some("Confirmación".into()),
                                             descripcion: Some("Desea continuar?".into()),
                                             formulario_id: Some(formulario_id),
                                             titulo_boton_principal: Some("Aceptar".into()),
                                             titulo_boton_secundario: Some("Cancelar".into()),
                                             tipo_id: Some(1) };

  let modal = modales.crear(dto(formulario.id)).expect("crear modal");
  assert_eq!(modal.formulario_id, formulario.id);

  assert!(matches!(modales.crear(dto(Uuid::new_v4())), Err(PlantillaError::NotFound(_))));
}

#[test]
fn listar_proyecta_y_pobla_referencias() {
  let almacen = Almacen::en_memoria();
  let modulo = ModuloService::new(&almacen).crear(modulo_dto("Inventario")).unwrap();
  FormularioService::new(&almacen).crear(formulario_dto(modulo.id)).unwrap();

  let params = FiltroParams { fields: Some("nombre,modulo_id".into()),
                              populate: Some("true".into()),
                              ..FiltroParams::default() };
  let docs = FormularioService::new(&almacen).listar(&params).expect("listar");
  assert_eq!(docs.len(), 1);
  // la proyección siempre conserva el id
  assert!(docs[0].get("id").is_some());
  assert!(docs[0].get("version").is_none());
  // el populate corre antes de proyectar: la referencia viaja expandida
  assert_eq!(docs[0]["modulo_id"]["nombre"], "Inventario");
}

#[test]
fn obtener_registro_inexistente_es_not_found() {
  let almacen = Almacen::en_memoria();
  let resultado = ModuloService::new(&almacen).obtener(&Uuid::new_v4());
  assert!(matches!(resultado, Err(PlantillaError::NotFound(_))));
}
