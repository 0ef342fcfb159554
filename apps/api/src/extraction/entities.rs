//! Initial Extractor — deterministic field scanners over raw meeting text.
//!
//! Pure function of its input: no LLM, no IO, no failure mode. Each scanner
//! is independent, so one field not matching never blocks the others; a field
//! the scanners cannot find is simply absent from the result.

use regex::Regex;
use std::sync::OnceLock;

use crate::proposal::record::{PartialRecord, PRODUCT_CATALOG};

fn company_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:la\s+empresa|el\s+cliente|la\s+compañ[ií]a)\s+(?:se\s+llama\s+|es\s+)?([A-ZÁÉÍÓÚÑ][\wÁÉÍÓÚÜÑáéíóúüñ&.-]*(?:\s+[A-ZÁÉÍÓÚÑ][\wÁÉÍÓÚÜÑáéíóúüñ&.-]*){0,3})",
        )
        .unwrap()
    })
}

fn licenses_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+licencias?").unwrap())
}

fn contract_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:vigencia|contrato|período|periodo)\s+(?:de\s+|por\s+)?(\d+\s+(?:meses|mes|años|año))")
            .unwrap()
    })
}

fn duration_fallback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)por\s+(\d+\s+(?:meses|mes|años|año))").unwrap())
}

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s+horas(?:\s+de)?\s+(?:implementaci[oó]n|consultor[ií]a)").unwrap()
    })
}

fn weeks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+semanas").unwrap())
}

/// Keywords that mark a sentence as a requirement or challenge.
const REQUIREMENT_MARKERS: [&str; 6] = [
    "requiere",
    "necesita",
    "desafío",
    "desafio",
    "problema",
    "busca",
];

/// Cap on collected requirement sentences; meeting transcripts ramble.
const MAX_REQUIREMENTS: usize = 6;

/// Scans raw text for recognizable proposal fields. Never fails; an empty or
/// unrecognizable input yields an empty record.
pub fn extract_entities(text: &str) -> PartialRecord {
    let mut record = PartialRecord::default();
    if text.trim().is_empty() {
        return record;
    }

    record.nombre_empresa = company_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    record.cantidad_licencias = licenses_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    record.vigencia_contrato = contract_re()
        .captures(text)
        .or_else(|| duration_fallback_re().captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    let products: Vec<String> = PRODUCT_CATALOG
        .iter()
        .filter(|p| text.to_lowercase().contains(&p.to_lowercase()))
        .map(|p| p.to_string())
        .collect();
    if !products.is_empty() {
        record.tipo_licencia = Some(products);
    }

    record.horas_implementacion = hours_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    record.duracion_proyecto_implementacion = weeks_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| format!("{} semanas", m.as_str()));

    let requirements = extract_requirements(text);
    if !requirements.is_empty() {
        record.requerimientos_y_desafios = Some(requirements);
    }

    record
}

/// Collects sentences that read like requirements or pain points.
fn extract_requirements(text: &str) -> Vec<String> {
    text.split(['.', '\n', ';'])
        .map(str::trim)
        .filter(|sentence| {
            if sentence.is_empty() {
                return false;
            }
            let lower = sentence.to_lowercase();
            REQUIREMENT_MARKERS.iter().any(|m| lower.contains(m))
        })
        .take(MAX_REQUIREMENTS)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEETING_TEXT: &str = "La empresa Acme Logística necesita mejorar la visibilidad \
        de su pipeline de ventas. El cliente requiere 10 licencias de CRM por 12 meses a \
        $5000 cada una. Se estiman 80 horas de implementación en 6 semanas.";

    #[test]
    fn test_extracts_company_name() {
        let record = extract_entities(MEETING_TEXT);
        assert_eq!(record.nombre_empresa.as_deref(), Some("Acme Logística"));
    }

    #[test]
    fn test_extracts_license_count_and_contract_term() {
        let record = extract_entities(MEETING_TEXT);
        assert_eq!(record.cantidad_licencias.as_deref(), Some("10"));
        assert_eq!(record.vigencia_contrato.as_deref(), Some("12 meses"));
    }

    #[test]
    fn test_extracts_products_from_catalog() {
        let record = extract_entities(MEETING_TEXT);
        assert_eq!(record.tipo_licencia, Some(vec!["CRM".to_string()]));
    }

    #[test]
    fn test_extracts_implementation_hours_and_weeks() {
        let record = extract_entities(MEETING_TEXT);
        assert_eq!(record.horas_implementacion.as_deref(), Some("80"));
        assert_eq!(
            record.duracion_proyecto_implementacion.as_deref(),
            Some("6 semanas")
        );
    }

    #[test]
    fn test_collects_requirement_sentences() {
        let record = extract_entities(MEETING_TEXT);
        let reqs = record.requerimientos_y_desafios.unwrap();
        assert_eq!(reqs.len(), 2);
        assert!(reqs[0].contains("necesita mejorar"));
        assert!(reqs[1].contains("requiere 10 licencias"));
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        assert!(extract_entities("").is_empty());
        assert!(extract_entities("   \n  ").is_empty());
    }

    #[test]
    fn test_unrelated_text_yields_empty_record() {
        let record = extract_entities("hoy hablamos del clima y del partido de anoche");
        assert!(record.is_empty());
    }

    #[test]
    fn test_one_missing_field_does_not_block_others() {
        let record = extract_entities("El cliente requiere 25 licencias de Work Management");
        assert_eq!(record.cantidad_licencias.as_deref(), Some("25"));
        assert_eq!(
            record.tipo_licencia,
            Some(vec!["Work Management".to_string()])
        );
        assert!(record.nombre_empresa.is_none());
        assert!(record.horas_implementacion.is_none());
    }

    #[test]
    fn test_requirement_cap() {
        let text = "requiere a. requiere b. requiere c. requiere d. requiere e. \
            requiere f. requiere g. requiere h.";
        let record = extract_entities(text);
        assert_eq!(record.requerimientos_y_desafios.unwrap().len(), 6);
    }
}
