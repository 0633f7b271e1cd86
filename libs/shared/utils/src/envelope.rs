//! Decoding of the response envelopes the backend wraps around its payloads.
//!
//! Endpoints are inconsistent: some return a bare array, others
//! `{ "registros": [...] }`, `{ "dados": [...] }` or
//! `{ "dados": { "registros": [...] } }`. Each shape has a matcher; matchers
//! are tried in priority order and the first hit wins.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    BareArray,
    Registros,
    Dados,
    DadosRegistros,
    Data,
    DataRegistros,
}

type ShapeMatcher = fn(&Value) -> Option<&Vec<Value>>;

const SHAPE_MATCHERS: [(EnvelopeShape, ShapeMatcher); 6] = [
    (EnvelopeShape::BareArray, bare_array),
    (EnvelopeShape::Registros, registros),
    (EnvelopeShape::Dados, dados),
    (EnvelopeShape::DadosRegistros, dados_registros),
    (EnvelopeShape::Data, data),
    (EnvelopeShape::DataRegistros, data_registros),
];

fn bare_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array()
}

fn registros(value: &Value) -> Option<&Vec<Value>> {
    value.get("registros")?.as_array()
}

fn dados(value: &Value) -> Option<&Vec<Value>> {
    value.get("dados")?.as_array()
}

fn dados_registros(value: &Value) -> Option<&Vec<Value>> {
    value.get("dados")?.get("registros")?.as_array()
}

fn data(value: &Value) -> Option<&Vec<Value>> {
    value.get("data")?.as_array()
}

fn data_registros(value: &Value) -> Option<&Vec<Value>> {
    value.get("data")?.get("registros")?.as_array()
}

/// Finds the record array inside `value`, reporting which shape matched.
pub fn decode_envelope(value: &Value) -> Option<(EnvelopeShape, &[Value])> {
    SHAPE_MATCHERS
        .iter()
        .find_map(|(shape, matcher)| matcher(value).map(|records| (*shape, records.as_slice())))
}

/// Returns the payload's record array, or an empty one for unknown shapes.
pub fn extract_records(value: &Value) -> Vec<Value> {
    match decode_envelope(value) {
        Some((shape, records)) => {
            debug!("Decoded {} records from {:?} envelope", records.len(), shape);
            records.to_vec()
        }
        None => {
            warn!("Unrecognized response envelope, treating as empty: {}", shape_hint(value));
            Vec::new()
        }
    }
}

/// Decodes every record into `T`, skipping (and logging) the ones that don't fit.
pub fn extract_typed<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    extract_records(value)
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<T>(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}

/// Unwraps a single-object envelope (`dados`, then `data`), falling back to the value itself.
pub fn extract_object(value: &Value) -> &Value {
    ["dados", "data"]
        .iter()
        .find_map(|key| value.get(*key).filter(|inner| !inner.is_null()))
        .unwrap_or(value)
}

fn shape_hint(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object with keys {:?}", map.keys().collect::<Vec<_>>()),
        Value::Null => "null".to_string(),
        other => format!("{} value", json_type(other)),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Value {
        json!([{ "id": "1", "nome": "Ana" }, { "id": "2", "nome": "Bruno" }])
    }

    #[test]
    fn test_supported_shapes() {
        let cases = vec![
            (records(), EnvelopeShape::BareArray),
            (json!({ "registros": records() }), EnvelopeShape::Registros),
            (json!({ "dados": records() }), EnvelopeShape::Dados),
            (json!({ "dados": { "registros": records() } }), EnvelopeShape::DadosRegistros),
            (json!({ "data": records() }), EnvelopeShape::Data),
            (json!({ "data": { "registros": records(), "total": 2 } }), EnvelopeShape::DataRegistros),
        ];

        for (input, expected_shape) in cases {
            let (shape, found) = decode_envelope(&input).unwrap();
            assert_eq!(shape, expected_shape);
            assert_eq!(Value::Array(found.to_vec()), records());
        }
    }

    #[test]
    fn test_registros_wins_over_dados() {
        let input = json!({ "registros": [1], "dados": [2, 3] });
        assert_eq!(extract_records(&input), vec![json!(1)]);
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let inputs = vec![
            records(),
            json!({ "registros": records() }),
            json!({ "dados": records() }),
            json!({ "dados": { "registros": records() } }),
            json!({ "sucesso": true, "mensagem": "ok" }),
            json!(null),
        ];

        for input in inputs {
            let once = extract_records(&input);
            let twice = extract_records(&Value::Array(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_unknown_shapes_are_empty() {
        assert!(extract_records(&json!(null)).is_empty());
        assert!(extract_records(&json!("registros")).is_empty());
        assert!(extract_records(&json!({ "dados": { "id": "1" } })).is_empty());
        assert!(extract_records(&json!({ "registros": "nope" })).is_empty());
    }

    #[test]
    fn test_extract_typed_skips_bad_records() {
        #[derive(serde::Deserialize)]
        struct Named {
            nome: String,
        }

        let input = json!({ "dados": { "registros": [{ "nome": "Ana" }, { "id": 3 }] } });
        let named: Vec<Named> = extract_typed(&input);
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].nome, "Ana");
    }

    #[test]
    fn test_extract_object() {
        let inner = json!({ "chave": "t" });
        assert_eq!(extract_object(&json!({ "dados": inner.clone() })), &inner);
        assert_eq!(extract_object(&json!({ "data": inner.clone() })), &inner);
        assert_eq!(extract_object(&inner), &inner);
        assert_eq!(extract_object(&json!({ "dados": null, "chave": "t" })), &json!({ "dados": null, "chave": "t" }));
    }
}
