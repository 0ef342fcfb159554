//! Refinement Orchestrator — reconciles the deterministic extraction and the
//! raw text into the fixed proposal schema through one LLM call.
//!
//! The model response is untrusted input: a permissive brace scan locates the
//! candidate JSON payload, then a strict schema decode validates it. Any
//! failure along the way (network, auth, prose-only response, malformed
//! payload) degrades to the initial extraction unchanged — refinement never
//! aborts the pipeline.

use tracing::{info, warn};

use crate::extraction::prompts::{REFINE_PROMPT_TEMPLATE, REFINE_SYSTEM};
use crate::llm_client::CompletionModel;
use crate::proposal::record::{PartialRecord, RefinedRecord};

/// Outcome of a refinement attempt. `Fallback` carries the input
/// `PartialRecord` verbatim, so callers always have the best available data.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    Refined(RefinedRecord),
    Fallback(PartialRecord),
}

impl RefineOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, RefineOutcome::Fallback(_))
    }

    /// Field-name → JSON value view of whichever record the outcome holds.
    /// The fallback side may be missing keys; consumers default them.
    pub fn field_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match self {
            RefineOutcome::Refined(record) => record.field_map(),
            RefineOutcome::Fallback(partial) => partial.field_map(),
        }
    }
}

/// Refines the initial extraction against the full text. Issues exactly one
/// LLM call and falls back to `initial` on any failure.
pub async fn refine_extraction(
    text: &str,
    initial: PartialRecord,
    llm: &dyn CompletionModel,
) -> RefineOutcome {
    let initial_json =
        serde_json::to_string(&initial).unwrap_or_else(|_| "{}".to_string());
    let prompt = REFINE_PROMPT_TEMPLATE
        .replace("{initial_data}", &initial_json)
        .replace("{text}", text);

    let response = match llm.complete(REFINE_SYSTEM, &prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Refinement call failed, falling back to initial extraction: {e}");
            return RefineOutcome::Fallback(initial);
        }
    };

    match decode_response(&response) {
        Some(record) => {
            info!("Refinement succeeded: {} subscription lines", record.suscripciones.len());
            RefineOutcome::Refined(record)
        }
        None => {
            warn!(
                "Refinement response not decodable as proposal schema ({} chars), \
                 falling back to initial extraction",
                response.len()
            );
            RefineOutcome::Fallback(initial)
        }
    }
}

/// Locates the JSON payload in the response and decodes it strictly.
fn decode_response(response: &str) -> Option<RefinedRecord> {
    let payload = extract_json_block(response)?;
    serde_json::from_str(payload).ok()
}

/// Returns the substring from the first `{` to the last `}` inclusive, the
/// candidate JSON payload of a response that may carry surrounding prose.
/// None when either brace is absent or the last `}` is not strictly after
/// the first `{`.
fn extract_json_block(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end > start {
        Some(&response[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;

    /// Completion backend scripted with a fixed result.
    struct ScriptedModel(Result<&'static str, LlmError>);

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            match &self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(LlmError::EmptyContent) => Err(LlmError::EmptyContent),
                Err(LlmError::Api { status, message }) => Err(LlmError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                Err(other) => Err(LlmError::Api {
                    status: 0,
                    message: other.to_string(),
                }),
            }
        }
    }

    fn sample_initial() -> PartialRecord {
        PartialRecord {
            nombre_empresa: Some("Acme SpA".to_string()),
            cantidad_licencias: Some("10".to_string()),
            tipo_licencia: Some(vec!["CRM".to_string()]),
            ..PartialRecord::default()
        }
    }

    #[tokio::test]
    async fn test_refine_falls_back_identically_when_call_fails() {
        let llm = ScriptedModel(Err(LlmError::Api {
            status: 401,
            message: "Invalid API Key".to_string(),
        }));
        let initial = sample_initial();
        let outcome = refine_extraction("texto de la reunión", initial.clone(), &llm).await;
        assert_eq!(outcome, RefineOutcome::Fallback(initial));
    }

    #[tokio::test]
    async fn test_refine_falls_back_identically_on_prose_response() {
        let llm = ScriptedModel(Ok("no json here"));
        let initial = sample_initial();
        let outcome = refine_extraction("texto de la reunión", initial.clone(), &llm).await;
        assert_eq!(outcome, RefineOutcome::Fallback(initial));
    }

    #[tokio::test]
    async fn test_refine_returns_refined_record_on_valid_response() {
        let llm = ScriptedModel(Ok(
            "{\"nombre_empresa\": \"Acme SpA\", \"cantidad_licencias\": \"10\"}",
        ));
        let outcome = refine_extraction("texto", sample_initial(), &llm).await;
        match outcome {
            RefineOutcome::Refined(record) => {
                assert_eq!(record.nombre_empresa, "Acme SpA");
                assert_eq!(record.emails, "");
            }
            RefineOutcome::Fallback(_) => panic!("expected refined outcome"),
        }
    }

    #[test]
    fn test_extract_json_block_no_json() {
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn test_extract_json_block_with_surrounding_prose() {
        assert_eq!(
            extract_json_block("prefix {\"a\":1} suffix"),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_extract_json_block_unterminated() {
        assert_eq!(extract_json_block("{unterminated"), None);
    }

    #[test]
    fn test_extract_json_block_close_before_open() {
        assert_eq!(extract_json_block("} then {"), None);
    }

    #[test]
    fn test_extract_json_block_nested_objects_span_full_range() {
        let response = "```json\n{\"suscripciones\": [{\"producto\": \"CRM\"}]}\n```";
        assert_eq!(
            extract_json_block(response),
            Some("{\"suscripciones\": [{\"producto\": \"CRM\"}]}")
        );
    }

    #[test]
    fn test_decode_response_rejects_prose() {
        assert!(decode_response("Lo siento, no puedo ayudar con eso.").is_none());
    }

    #[test]
    fn test_decode_response_rejects_non_object_payload() {
        // Braces present but the payload between them is not valid JSON.
        assert!(decode_response("set {a, b} and {c").is_none());
    }

    #[test]
    fn test_decode_response_accepts_full_schema_with_prose() {
        let response = r#"Aquí está la propuesta:
{
  "nombre_empresa": "Acme SpA",
  "descripcion_empresa": "",
  "requerimientos_y_desafios": ["Visibilidad de ventas"],
  "cantidad_licencias": "10",
  "vigencia_contrato": "12 meses",
  "tipo_licencia": ["CRM"],
  "suscripciones": [
    {"producto": "CRM", "detalle": "5000 x 10 x 12 meses", "monto_total_anual": "600000 + IVA"}
  ],
  "total_suscripciones_anual": "600000 + IVA",
  "horas_implementacion": "",
  "duracion_proyecto_implementacion": "",
  "monto_implementacion_anual": "",
  "emails": ""
}
Espero que sirva."#;
        let record = decode_response(response).unwrap();
        assert_eq!(record.nombre_empresa, "Acme SpA");
        assert_eq!(record.suscripciones[0].monto_total_anual, "600000 + IVA");
        // No implementation info in the meeting: fields stay empty, never fabricated.
        assert_eq!(record.horas_implementacion, "");
        assert_eq!(record.monto_implementacion_anual, "");
        assert_eq!(record.emails, "");
    }

    #[test]
    fn test_decode_response_defaults_missing_keys() {
        let record = decode_response("{\"nombre_empresa\": \"Acme\"}").unwrap();
        assert_eq!(record.nombre_empresa, "Acme");
        assert_eq!(record.emails, "");
        assert!(record.suscripciones.is_empty());
    }

    #[test]
    fn test_outcome_field_map_sides() {
        let partial = PartialRecord {
            cantidad_licencias: Some("10".to_string()),
            ..PartialRecord::default()
        };
        let fallback = RefineOutcome::Fallback(partial.clone());
        assert!(fallback.is_fallback());
        assert_eq!(fallback.field_map().len(), 1);

        let refined = RefineOutcome::Refined(RefinedRecord::default());
        assert!(!refined.is_fallback());
        assert_eq!(refined.field_map().len(), 12);
    }

    #[test]
    fn test_prompt_template_embeds_both_variables() {
        let initial_json = "{\"cantidad_licencias\":\"10\"}";
        let prompt = REFINE_PROMPT_TEMPLATE
            .replace("{initial_data}", initial_json)
            .replace("{text}", "texto de la reunión");
        assert!(prompt.contains(initial_json));
        assert!(prompt.contains("texto de la reunión"));
        assert!(!prompt.contains("{initial_data}"));
        assert!(!prompt.contains("{text}"));
    }
}
