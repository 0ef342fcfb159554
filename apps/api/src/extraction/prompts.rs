// All LLM prompt constants for the extraction module.
// The refinement prompt is the output contract: it enumerates the exact key
// set of `RefinedRecord` and is the only place that instructs the model on
// the computed pricing fields.

/// System prompt for refinement — enforces JSON-only output.
pub const REFINE_SYSTEM: &str =
    "Eres un asistente experto en generación de propuestas comerciales, en español. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Refinement prompt template. Replace `{initial_data}` and `{text}` before
/// sending. Monetary fields carry the literal suffix ' + IVA'; the tax itself
/// is never computed.
pub const REFINE_PROMPT_TEMPLATE: &str = r#"Tu tarea es analizar el texto transcrito de reuniones y extraer / calcular toda la información necesaria para rellenar dos secciones de la propuesta:

1. Suscripciones:
   - Lista únicamente los productos que el cliente ha solicitado (1 a 4).
   - Para cada producto, indica:
     * producto: Work Management, CRM, Dev o Service.
     * detalle: calcula (precio por usuario) x (número de usuarios) x 12 meses.
     * monto_total_anual: muestra el resultado del cálculo seguido de ' + IVA'.
   - total_suscripciones_anual: suma de cada monto_total_anual (sin calcular IVA), seguido de ' + IVA'.

2. Implementación:
   - Extrae horas_implementacion (número de horas) y duracion_proyecto_implementacion (en semanas).
   - monto_implementacion_anual: muestra 'horas_implementacion x 1.5 UF + IVA'.

Instrucciones generales:
- Si no encuentras un dato, deja el campo como cadena vacía ''.
- El campo 'emails' se mantiene siempre vacío.
- Todos los valores son cadenas de texto, salvo las listas indicadas.

Devuelve solo un bloque JSON con estas claves exactas:
{
  "nombre_empresa": "",
  "descripcion_empresa": "",
  "requerimientos_y_desafios": [],
  "cantidad_licencias": "",
  "vigencia_contrato": "",
  "tipo_licencia": [],
  "suscripciones": [
    {
      "producto": "",
      "detalle": "",
      "monto_total_anual": "<valor> + IVA"
    }
  ],
  "total_suscripciones_anual": "<suma> + IVA",
  "horas_implementacion": "",
  "duracion_proyecto_implementacion": "",
  "monto_implementacion_anual": "<horas> x 1.5 UF + IVA",
  "emails": ""
}

Datos iniciales:
{initial_data}

Texto completo:
{text}"#;
