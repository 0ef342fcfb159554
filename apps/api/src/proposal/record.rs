//! Proposal records — the three shapes a proposal passes through.
//!
//! `PartialRecord` is the deterministic best-effort extraction (any field may
//! be absent). `RefinedRecord` is the fixed LLM schema (every key present,
//! defaulting to empty). `FinalProposalRecord` is the flat stringified map
//! handed to persistence and deck rendering after operator review.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Product catalog for subscription lines. The refinement prompt restricts
/// `producto` to these values; the initial extractor scans for them verbatim.
pub const PRODUCT_CATALOG: [&str; 4] = ["Work Management", "CRM", "Dev", "Service"];

/// Every field of the final proposal template, in template order.
/// The assembler guarantees each one is present in a `FinalProposalRecord`.
pub const PROPOSAL_FIELDS: [&str; 31] = [
    "nombre_empresa",
    "descripcion_empresa",
    "requerimientos_y_desafios",
    "cantidad_licencias",
    "vigencia_contrato",
    "tipo_licencia",
    "suscripciones",
    "total_suscripciones_anual",
    "caracteristicas_principales",
    "tabla_solucion",
    "precio_sub",
    "cantidad_meses",
    "servicio_sub",
    "servicio_proyecto",
    "servicio_soporte",
    "lugar_factura_sub",
    "mes_facturacion_sub",
    "modo_pago_sub",
    "horas_implementacion",
    "duracion_proyecto_implementacion",
    "monto_implementacion_anual",
    "principales_caracteristicas_pi",
    "alcances_pi",
    "confi_capacitacion_cantidad_usr",
    "duracion_implementacion_pi",
    "hora_de_trabajo_pi",
    "costo_individual_hora_pi",
    "tipo_factura_pi",
    "modo_factura_pi",
    "lugar_factura_pi",
    "emails",
];

/// Checkbox fields — stringified as literal "True"/"False".
pub const BOOL_FIELDS: [&str; 3] = ["servicio_sub", "servicio_proyecto", "servicio_soporte"];

/// Count fields — normalized through safe-int (unparseable input becomes 0).
pub const NUMERIC_FIELDS: [&str; 4] = [
    "cantidad_licencias",
    "cantidad_meses",
    "horas_implementacion",
    "hora_de_trabajo_pi",
];

/// Best-effort deterministic extraction. Absent fields are simply omitted;
/// there is no error representation for a field the scanners did not find.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_empresa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requerimientos_y_desafios: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cantidad_licencias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vigencia_contrato: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_licencia: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horas_implementacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_proyecto_implementacion: Option<String>,
}

impl PartialRecord {
    pub fn is_empty(&self) -> bool {
        *self == PartialRecord::default()
    }

    /// Field-name → JSON value view, omitting absent fields.
    pub fn field_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// One product's pricing entry within the subscriptions section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionLine {
    #[serde(default, deserialize_with = "stringly")]
    pub producto: String,
    #[serde(default, deserialize_with = "stringly")]
    pub detalle: String,
    #[serde(default, deserialize_with = "stringly")]
    pub monto_total_anual: String,
}

/// The fixed refinement schema. Decoded from untrusted LLM output, so every
/// field defaults rather than erroring when the model omits a key, and the
/// scalar fields accept bare JSON numbers where the model ignores the
/// strings-only instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinedRecord {
    #[serde(deserialize_with = "stringly")]
    pub nombre_empresa: String,
    #[serde(deserialize_with = "stringly")]
    pub descripcion_empresa: String,
    pub requerimientos_y_desafios: Vec<String>,
    #[serde(deserialize_with = "stringly")]
    pub cantidad_licencias: String,
    #[serde(deserialize_with = "stringly")]
    pub vigencia_contrato: String,
    pub tipo_licencia: Vec<String>,
    pub suscripciones: Vec<SubscriptionLine>,
    #[serde(deserialize_with = "stringly")]
    pub total_suscripciones_anual: String,
    #[serde(deserialize_with = "stringly")]
    pub horas_implementacion: String,
    #[serde(deserialize_with = "stringly")]
    pub duracion_proyecto_implementacion: String,
    #[serde(deserialize_with = "stringly")]
    pub monto_implementacion_anual: String,
    #[serde(deserialize_with = "stringly")]
    pub emails: String,
}

impl RefinedRecord {
    /// Field-name → JSON value view over the full fixed key set.
    pub fn field_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// The flat, fully stringified record persisted per submission and handed to
/// the deck renderer. Keys are exactly `PROPOSAL_FIELDS`.
pub type FinalProposalRecord = BTreeMap<String, String>;

/// Accepts a JSON string, number, bool, or null where a string is expected.
fn stringly<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
