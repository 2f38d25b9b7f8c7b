// Archivo: filtros.rs
// Propósito: traducir los parámetros genéricos de consulta (filtro,
// proyección, ordenamiento, paginación y poblamiento) a predicados
// aplicables sobre los documentos JSON de las colecciones. Todos los
// listados del dominio delegan aquí.
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

/// Parámetros crudos de un listado, tal como llegan del exterior (todos
/// opcionales y en texto).
///
/// - `query`: pares `campo:valor` o `campo__operador:valor` separados por
///   comas.
/// - `fields`: lista de campos a proyectar, separada por comas.
/// - `sortby` / `order`: campos de ordenamiento y sus direcciones.
/// - `limit` / `offset`: paginación; por defecto 10 / 0.
/// - `populate`: `"true"` habilita la expansión de referencias.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroParams {
    pub query: Option<String>,
    pub fields: Option<String>,
    pub sortby: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub populate: Option<String>,
}

/// Literal tipado de una condición. El sufijo de tres caracteres de la
/// convención de consulta decide el tipo: `<n>` número, `<d>` fecha,
/// `<b>` booleano; sin sufijo, texto.
#[derive(Debug, Clone, PartialEq)]
pub enum Valor {
    Texto(String),
    Numero(f64),
    Fecha(DateTime<Utc>),
    Booleano(bool),
    Nulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparador {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Condición individual parseada desde `query`.
#[derive(Debug, Clone)]
pub enum Condicion {
    Igual { campo: String, valor: Valor },
    Compara { campo: String, comparador: Comparador, valor: Valor },
    Contiene { campo: String, patron: String, ignora_mayusculas: bool },
    En { campo: String, valores: Vec<Valor> },
    Distinto { campo: String, valor: Valor },
    EnArreglo { campo: String, valor: Valor },
    EsNulo { campo: String, nulo: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direccion {
    Asc,
    Desc,
}

/// Traductor de consulta: parsea los parámetros una sola vez y después
/// ofrece predicado (`cumple`), proyección, ordenamiento y paginación
/// sobre documentos JSON.
pub struct FiltrosService {
    condiciones: Vec<Condicion>,
    campos: Vec<String>,
    orden: Vec<(String, Direccion)>,
    skip: usize,
    limite: usize,
    poblar: bool,
}

impl FiltrosService {
    pub fn new(params: &FiltroParams) -> Self {
        Self { condiciones: parsear_query(params.query.as_deref()),
               campos: parsear_lista(params.fields.as_deref()),
               orden: parsear_orden(params.sortby.as_deref(), params.order.as_deref()),
               skip: parsear_entero(params.offset.as_deref(), 0),
               limite: parsear_entero(params.limit.as_deref(), 10),
               poblar: params.populate.as_deref() == Some("true") }
    }

    /// Evalúa todas las condiciones (conjunción) contra un documento.
    pub fn cumple(&self, doc: &JsonValue) -> bool {
        self.condiciones.iter().all(|c| cumple_condicion(c, doc))
    }

    /// Proyección: conserva sólo los campos pedidos (más `id`, que siempre
    /// viaja). Sin `fields`, el documento pasa completo.
    pub fn proyectar(&self, doc: &JsonValue) -> JsonValue {
        if self.campos.is_empty() {
            return doc.clone();
        }
        let mut objeto = serde_json::Map::new();
        if let Some(id) = doc.get("id") {
            objeto.insert("id".into(), id.clone());
        }
        for campo in &self.campos {
            if let Some(valor) = doc.get(campo) {
                objeto.insert(campo.clone(), valor.clone());
            }
        }
        JsonValue::Object(objeto)
    }

    /// Ordena en sitio según `sortby`/`order`.
    pub fn ordenar(&self, docs: &mut [JsonValue]) {
        if self.orden.is_empty() {
            return;
        }
        docs.sort_by(|a, b| {
                for (campo, direccion) in &self.orden {
                    let izquierda = a.get(campo).unwrap_or(&JsonValue::Null);
                    let derecha = b.get(campo).unwrap_or(&JsonValue::Null);
                    let mut orden = comparar_json(izquierda, derecha);
                    if *direccion == Direccion::Desc {
                        orden = orden.reverse();
                    }
                    if orden != Ordering::Equal {
                        return orden;
                    }
                }
                Ordering::Equal
            });
    }

    /// Página actual según `offset`/`limit`.
    pub fn paginar(&self, docs: Vec<JsonValue>) -> Vec<JsonValue> {
        docs.into_iter().skip(self.skip).take(self.limite).collect()
    }

    pub fn es_poblado(&self) -> bool {
        self.poblar
    }
}

fn parsear_lista(texto: Option<&str>) -> Vec<String> {
    texto.map(|t| {
             t.split(',')
              .map(|p| p.trim().to_string())
              .filter(|p| !p.is_empty())
              .collect()
         })
         .unwrap_or_default()
}

fn parsear_entero(texto: Option<&str>, defecto: usize) -> usize {
    texto.and_then(|t| t.trim().parse().ok()).unwrap_or(defecto)
}

fn parsear_query(query: Option<&str>) -> Vec<Condicion> {
    let mut condiciones = Vec::new();
    let Some(query) = query else {
        return condiciones;
    };
    for par in query.split(',') {
        // separar en el primer ':' — el valor puede contener ':' (fechas)
        let Some((clave, valor)) = par.split_once(':') else {
            continue;
        };
        let (campo, operador) = match clave.split_once("__") {
            Some((campo, operador)) => (campo.to_string(), Some(operador)),
            None => (clave.to_string(), None),
        };
        let condicion = match operador {
            None => Condicion::Igual { campo, valor: convertir(valor) },
            Some("icontains") => Condicion::Contiene { campo, patron: valor.to_string(), ignora_mayusculas: true },
            Some("contains") => Condicion::Contiene { campo, patron: valor.to_string(), ignora_mayusculas: false },
            Some("gt") => Condicion::Compara { campo, comparador: Comparador::Gt, valor: convertir(valor) },
            Some("gte") => Condicion::Compara { campo, comparador: Comparador::Gte, valor: convertir(valor) },
            Some("lt") => Condicion::Compara { campo, comparador: Comparador::Lt, valor: convertir(valor) },
            Some("lte") => Condicion::Compara { campo, comparador: Comparador::Lte, valor: convertir(valor) },
            Some("in") => Condicion::En { campo, valores: valor.split('|').map(convertir).collect() },
            Some("not") => Condicion::Distinto { campo, valor: convertir(valor) },
            Some("inarray") => Condicion::EnArreglo { campo, valor: convertir(valor) },
            Some("isnull") => Condicion::EsNulo { campo, nulo: valor.eq_ignore_ascii_case("true") },
            // operador desconocido: la condición se descarta sin filtrar
            Some(_) => continue,
        };
        condiciones.push(condicion);
    }
    condiciones
}

fn parsear_orden(sortby: Option<&str>, order: Option<&str>) -> Vec<(String, Direccion)> {
    let campos = parsear_lista(sortby);
    if campos.is_empty() {
        return Vec::new();
    }
    let direcciones = parsear_lista(order);
    if direcciones.len() == 1 {
        // una sola dirección compartida por todos los campos
        let direccion = direccion_de(&direcciones[0]);
        return campos.into_iter().map(|c| (c, direccion)).collect();
    }
    if direcciones.len() == campos.len() {
        // dirección específica por campo
        return campos.into_iter()
                     .zip(direcciones.iter().map(|d| direccion_de(d)))
                     .collect();
    }
    // tamaños distintos (o sin order): ascendente para todo
    campos.into_iter().map(|c| (c, Direccion::Asc)).collect()
}

fn direccion_de(texto: &str) -> Direccion {
    if texto == "desc" {
        Direccion::Desc
    } else {
        Direccion::Asc
    }
}

/// Convierte un literal de consulta según el sufijo de tipo de tres
/// caracteres: `5<n>` número, `2024-01-31<d>` fecha, `true<b>` booleano.
fn convertir(valor: &str) -> Valor {
    if valor.is_empty() {
        return Valor::Nulo;
    }
    if valor.len() > 3 {
        if let Some(base) = valor.strip_suffix("<n>") {
            if let Ok(numero) = base.parse::<f64>() {
                return Valor::Numero(numero);
            }
        } else if let Some(base) = valor.strip_suffix("<d>") {
            if let Some(fecha) = parsear_fecha(base) {
                return Valor::Fecha(fecha);
            }
        } else if let Some(base) = valor.strip_suffix("<b>") {
            return Valor::Booleano(base.eq_ignore_ascii_case("true"));
        }
    }
    Valor::Texto(valor.to_string())
}

fn parsear_fecha(texto: &str) -> Option<DateTime<Utc>> {
    if let Ok(fecha) = DateTime::parse_from_rfc3339(texto) {
        return Some(fecha.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(texto, "%Y-%m-%d").ok()
                                                .and_then(|d| d.and_hms_opt(0, 0, 0))
                                                .map(|d| d.and_utc())
}

fn cumple_condicion(condicion: &Condicion, doc: &JsonValue) -> bool {
    match condicion {
        Condicion::Igual { campo, valor } => es_igual(valor_documento(doc, campo), valor),
        Condicion::Compara { campo, comparador, valor } => {
            match comparar_valor(valor_documento(doc, campo), valor) {
                Some(orden) => match comparador {
                    Comparador::Gt => orden == Ordering::Greater,
                    Comparador::Gte => orden != Ordering::Less,
                    Comparador::Lt => orden == Ordering::Less,
                    Comparador::Lte => orden != Ordering::Greater,
                },
                None => false,
            }
        }
        Condicion::Contiene { campo, patron, ignora_mayusculas } => {
            match valor_documento(doc, campo).as_str() {
                Some(texto) if *ignora_mayusculas => texto.to_lowercase().contains(&patron.to_lowercase()),
                Some(texto) => texto.contains(patron.as_str()),
                None => false,
            }
        }
        Condicion::En { campo, valores } => {
            let actual = valor_documento(doc, campo);
            valores.iter().any(|v| es_igual(actual, v))
        }
        Condicion::Distinto { campo, valor } => !es_igual(valor_documento(doc, campo), valor),
        Condicion::EnArreglo { campo, valor } => {
            valor_documento(doc, campo).as_array()
                                       .map(|arreglo| arreglo.iter().any(|v| es_igual(v, valor)))
                                       .unwrap_or(false)
        }
        Condicion::EsNulo { campo, nulo } => valor_documento(doc, campo).is_null() == *nulo,
    }
}

fn valor_documento<'a>(doc: &'a JsonValue, campo: &str) -> &'a JsonValue {
    doc.get(campo).unwrap_or(&JsonValue::Null)
}

fn es_igual(actual: &JsonValue, valor: &Valor) -> bool {
    matches!(comparar_valor(actual, valor), Some(Ordering::Equal))
}

/// Compara el valor de un documento con un literal tipado. `None` cuando
/// los tipos no son comparables.
fn comparar_valor(actual: &JsonValue, valor: &Valor) -> Option<Ordering> {
    match valor {
        Valor::Numero(numero) => actual.as_f64()?.partial_cmp(numero),
        Valor::Texto(texto) => Some(actual.as_str()?.cmp(texto.as_str())),
        Valor::Fecha(fecha) => {
            let actual = DateTime::parse_from_rfc3339(actual.as_str()?).ok()?.with_timezone(&Utc);
            Some(actual.cmp(fecha))
        }
        Valor::Booleano(booleano) => Some(actual.as_bool()?.cmp(booleano)),
        Valor::Nulo => {
            if actual.is_null() {
                Some(Ordering::Equal)
            } else {
                None
            }
        }
    }
}

/// Orden total aproximado entre valores JSON para el ordenamiento de
/// listados: números, textos y booleanos entre sí; nulos primero.
fn comparar_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => Ordering::Equal,
        (JsonValue::Null, _) => Ordering::Less,
        (_, JsonValue::Null) => Ordering::Greater,
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
