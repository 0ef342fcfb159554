//! Proposal Record Assembler — merges refined/extracted pre-fill values with
//! operator edits into the flat template record.
//!
//! Precedence per field: operator edit > pre-fill value > empty default.
//! Both form flows (upload-driven and manual entry) go through this single
//! function; manual entry is just an assembly with no pre-fill.

use serde_json::Value;

use crate::proposal::record::{
    FinalProposalRecord, SubscriptionLine, BOOL_FIELDS, NUMERIC_FIELDS, PROPOSAL_FIELDS,
};

/// Builds the final flat record. Every key in `PROPOSAL_FIELDS` is present in
/// the result, stringified: booleans as "True"/"False", counts as decimal
/// strings (safe-int, default 0), lists joined with newlines.
pub fn assemble(
    prefill: &serde_json::Map<String, Value>,
    edits: &serde_json::Map<String, Value>,
) -> FinalProposalRecord {
    let mut record = FinalProposalRecord::new();

    for field in PROPOSAL_FIELDS {
        let value = edits
            .get(field)
            .or_else(|| prefill.get(field))
            .map(|v| stringify_field(field, v))
            .unwrap_or_default();

        let value = if BOOL_FIELDS.contains(&field) {
            stringify_bool(&value)
        } else if NUMERIC_FIELDS.contains(&field) {
            safe_int(&value).to_string()
        } else {
            value
        };

        record.insert(field.to_string(), value);
    }

    record
}

/// Stringifies one field value from the review form or a pre-fill map.
fn stringify_field(field: &str, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => {
            if *b {
                "True".to_string()
            } else {
                "False".to_string()
            }
        }
        Value::Array(items) if field == "suscripciones" => items
            .iter()
            .map(subscription_line)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Renders one subscription line for the flat record.
fn subscription_line(item: &Value) -> String {
    match serde_json::from_value::<SubscriptionLine>(item.clone()) {
        Ok(line) => format!("{}: {} = {}", line.producto, line.detalle, line.monto_total_anual),
        Err(_) => item.to_string(),
    }
}

/// Normalizes a checkbox value to the literal "True"/"False" text the
/// template expects.
fn stringify_bool(value: &str) -> String {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "si" | "sí" => "True".to_string(),
        _ => "False".to_string(),
    }
}

/// Parses a count field, defaulting to 0 on anything unparseable.
fn safe_int(value: &str) -> i64 {
    value.trim().parse::<i64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::record::RefinedRecord;
    use serde_json::json;

    fn as_map(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_assemble_has_every_template_field() {
        let record = assemble(&serde_json::Map::new(), &serde_json::Map::new());
        assert_eq!(record.len(), PROPOSAL_FIELDS.len());
        for field in PROPOSAL_FIELDS {
            assert!(record.contains_key(field), "missing {field}");
        }
    }

    #[test]
    fn test_edits_take_precedence_over_prefill() {
        let prefill = as_map(json!({"nombre_empresa": "Acme SpA"}));
        let edits = as_map(json!({"nombre_empresa": "Acme Chile SpA"}));
        let record = assemble(&prefill, &edits);
        assert_eq!(record["nombre_empresa"], "Acme Chile SpA");
    }

    #[test]
    fn test_prefill_used_when_no_edit() {
        let prefill = as_map(json!({"vigencia_contrato": "12 meses"}));
        let record = assemble(&prefill, &serde_json::Map::new());
        assert_eq!(record["vigencia_contrato"], "12 meses");
    }

    #[test]
    fn test_bool_fields_stringify_as_python_style_literals() {
        let edits = as_map(json!({
            "servicio_sub": true,
            "servicio_proyecto": "true",
            "servicio_soporte": "no"
        }));
        let record = assemble(&serde_json::Map::new(), &edits);
        assert_eq!(record["servicio_sub"], "True");
        assert_eq!(record["servicio_proyecto"], "True");
        assert_eq!(record["servicio_soporte"], "False");
    }

    #[test]
    fn test_numeric_fields_default_to_zero() {
        let edits = as_map(json!({"cantidad_licencias": "muchas"}));
        let record = assemble(&serde_json::Map::new(), &edits);
        assert_eq!(record["cantidad_licencias"], "0");
        assert_eq!(record["cantidad_meses"], "0");
    }

    #[test]
    fn test_list_fields_join_with_newlines() {
        let prefill = as_map(json!({
            "requerimientos_y_desafios": ["Visibilidad de ventas", "Procesos manuales"],
            "tipo_licencia": ["CRM", "Dev"]
        }));
        let record = assemble(&prefill, &serde_json::Map::new());
        assert_eq!(
            record["requerimientos_y_desafios"],
            "Visibilidad de ventas\nProcesos manuales"
        );
        assert_eq!(record["tipo_licencia"], "CRM\nDev");
    }

    #[test]
    fn test_subscription_lines_flatten_one_per_line() {
        let prefill = as_map(json!({
            "suscripciones": [
                {"producto": "CRM", "detalle": "5000 x 10 x 12", "monto_total_anual": "600000 + IVA"},
                {"producto": "Dev", "detalle": "3000 x 5 x 12", "monto_total_anual": "180000 + IVA"}
            ]
        }));
        let record = assemble(&prefill, &serde_json::Map::new());
        assert_eq!(
            record["suscripciones"],
            "CRM: 5000 x 10 x 12 = 600000 + IVA\nDev: 3000 x 5 x 12 = 180000 + IVA"
        );
    }

    #[test]
    fn test_round_trip_refined_record_without_edits() {
        let refined = RefinedRecord {
            nombre_empresa: "Acme SpA".to_string(),
            descripcion_empresa: "Distribuidora regional".to_string(),
            cantidad_licencias: "10".to_string(),
            vigencia_contrato: "12 meses".to_string(),
            total_suscripciones_anual: "600000 + IVA".to_string(),
            horas_implementacion: "80".to_string(),
            duracion_proyecto_implementacion: "6 semanas".to_string(),
            monto_implementacion_anual: "120 UF + IVA".to_string(),
            ..RefinedRecord::default()
        };
        let record = assemble(&refined.field_map(), &serde_json::Map::new());
        assert_eq!(record["nombre_empresa"], refined.nombre_empresa);
        assert_eq!(record["descripcion_empresa"], refined.descripcion_empresa);
        assert_eq!(record["cantidad_licencias"], refined.cantidad_licencias);
        assert_eq!(record["vigencia_contrato"], refined.vigencia_contrato);
        assert_eq!(
            record["total_suscripciones_anual"],
            refined.total_suscripciones_anual
        );
        assert_eq!(record["horas_implementacion"], refined.horas_implementacion);
        assert_eq!(
            record["monto_implementacion_anual"],
            refined.monto_implementacion_anual
        );
        assert_eq!(record["emails"], "");
    }
}
