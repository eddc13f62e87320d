//! Structured outputs produced by the responders.
//!
//! Each output is a plain data contract: a serde type, a field-level schema
//! handed to the completion service, and a `validate` step run on receipt.
//! Nothing here depends on a provider SDK.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::foundation::{require_non_empty, ValidationError};

use super::errors::ExtractionError;

/// Default ceiling on simulation turns.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Upper bound accepted for a configured turn ceiling.
pub const MAX_TURNS_LIMIT: u32 = 100;

/// Schema for structured output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

/// A field in an output schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: String,
}

/// Field types in output schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    StringArray,
    Object(OutputSchema),
}

impl SchemaField {
    fn new(name: &str, field_type: FieldType, required: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required,
            description: description.to_string(),
        }
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = match &self.field_type {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            FieldType::Object(inner) => inner.to_json_schema(),
        };
        if let Value::Object(map) = &mut schema {
            map.insert("description".to_string(), Value::String(self.description.clone()));
            if !self.required {
                map.insert("nullable".to_string(), Value::Bool(true));
            }
        }
        schema
    }
}

impl OutputSchema {
    /// Renders the schema as a JSON-schema object (the OpenAPI subset both
    /// Gemini and OpenAI accept).
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.to_json_schema());
        }
        let required: Vec<Value> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| Value::String(f.name.clone()))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Names of the required fields.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Trait for structured output from any responder
pub trait StructuredOutput: Serialize + DeserializeOwned + Send + Sync {
    /// The schema the completion service must conform to.
    fn schema() -> OutputSchema;

    /// Semantic checks serde cannot express.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Parses and validates a completion reply against `T`.
///
/// Tolerates Markdown code fences and prose around a single JSON object.
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> Result<T, ExtractionError> {
    let json = extract_json_object(raw)?;
    let parsed: T = serde_json::from_str(json).map_err(|e| {
        let message = e.to_string();
        match message.strip_prefix("missing field `") {
            Some(rest) => ExtractionError::MissingField(
                rest.split('`').next().unwrap_or_default().to_string(),
            ),
            None => ExtractionError::ParseError(message),
        }
    })?;
    parsed
        .validate()
        .map_err(|e| ExtractionError::Invalid(e.to_string()))?;
    Ok(parsed)
}

fn extract_json_object(raw: &str) -> Result<&str, ExtractionError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(ExtractionError::InvalidFormat(
            "reply does not contain a JSON object".to_string(),
        )),
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn require_items(field: &str, items: &[String]) -> Result<(), ValidationError> {
    for item in items {
        require_non_empty(field, item)?;
    }
    Ok(())
}

/// Summary of the user's problem, produced at the end of intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSummary {
    /// The core problem being faced.
    pub problem: String,
    /// The proposed solution.
    pub proposed_solution: String,
    /// The main benefit of the solution.
    pub key_benefit: String,
    /// The primary obstacle to overcome.
    pub core_challenge: String,
    /// Initial advice for the user.
    pub preliminary_advice: String,
}

impl ProblemSummary {
    /// Markdown rendering shown to the user and fed to later prompts.
    pub fn render(&self) -> String {
        format!(
            "**Problem:** {}\n**Proposed solution:** {}\n**Key benefit:** {}\n**Core challenge:** {}\n**Preliminary advice:** {}",
            self.problem,
            self.proposed_solution,
            self.key_benefit,
            self.core_challenge,
            self.preliminary_advice
        )
    }
}

impl StructuredOutput for ProblemSummary {
    fn schema() -> OutputSchema {
        OutputSchema {
            name: "problem_summary".to_string(),
            fields: vec![
                SchemaField::new("problem", FieldType::String, true, "The core problem being faced"),
                SchemaField::new("proposed_solution", FieldType::String, true, "The proposed solution"),
                SchemaField::new("key_benefit", FieldType::String, true, "The main benefit of the solution"),
                SchemaField::new("core_challenge", FieldType::String, true, "The primary obstacle to overcome"),
                SchemaField::new("preliminary_advice", FieldType::String, true, "Initial advice for the user"),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("problem", &self.problem)?;
        require_non_empty("proposed_solution", &self.proposed_solution)?;
        require_non_empty("key_benefit", &self.key_benefit)?;
        require_non_empty("core_challenge", &self.core_challenge)?;
        require_non_empty("preliminary_advice", &self.preliminary_advice)
    }
}

/// Persona and meeting setup agreed with the Coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// The persona to simulate (e.g. "Stephen").
    pub target_persona: String,
    /// Description of the persona's characteristics.
    pub persona_description: String,
    /// Context for the simulated meeting.
    pub meeting_context: String,
    /// Maximum simulation turns. `None` until the configured ceiling is
    /// filled in by `with_default_max_turns`.
    #[serde(default)]
    pub max_turns: Option<u32>,
}

impl SimulationConfig {
    /// Fills an omitted `max_turns` with `default`.
    pub fn with_default_max_turns(mut self, default: u32) -> Self {
        self.max_turns.get_or_insert(default);
        self
    }

    pub fn render(&self) -> String {
        let mut text = format!(
            "**Persona:** {}\n**Description:** {}\n**Meeting context:** {}",
            self.target_persona, self.persona_description, self.meeting_context
        );
        if let Some(max_turns) = self.max_turns {
            text.push_str(&format!("\n**Maximum turns:** {}", max_turns));
        }
        text
    }
}

impl StructuredOutput for SimulationConfig {
    fn schema() -> OutputSchema {
        OutputSchema {
            name: "simulation_config".to_string(),
            fields: vec![
                SchemaField::new("target_persona", FieldType::String, true, "The persona to simulate (e.g., 'Stephen')"),
                SchemaField::new("persona_description", FieldType::String, true, "Description of the persona's characteristics"),
                SchemaField::new("meeting_context", FieldType::String, true, "Context for the simulated meeting"),
                SchemaField::new("max_turns", FieldType::Integer, false, "Maximum conversation turns"),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("target_persona", &self.target_persona)?;
        require_non_empty("persona_description", &self.persona_description)?;
        require_non_empty("meeting_context", &self.meeting_context)?;
        if let Some(max_turns) = self.max_turns {
            if max_turns == 0 || max_turns > MAX_TURNS_LIMIT {
                return Err(ValidationError::out_of_range(
                    "max_turns",
                    1,
                    i64::from(MAX_TURNS_LIMIT),
                    i64::from(max_turns),
                ));
            }
        }
        Ok(())
    }
}

/// Debrief produced after the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub what_went_well: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub actionable_suggestions: Vec<String>,
}

impl Feedback {
    pub fn render(&self) -> String {
        format!(
            "**What Went Well:**\n{}\n\n**Areas for Improvement:**\n{}\n\n**Actionable Suggestions:**\n{}",
            bullet_list(&self.what_went_well),
            bullet_list(&self.areas_for_improvement),
            bullet_list(&self.actionable_suggestions)
        )
    }
}

impl StructuredOutput for Feedback {
    fn schema() -> OutputSchema {
        OutputSchema {
            name: "feedback".to_string(),
            fields: vec![
                SchemaField::new("what_went_well", FieldType::StringArray, true, "List of things that went well"),
                SchemaField::new("areas_for_improvement", FieldType::StringArray, true, "List of areas that need improvement"),
                SchemaField::new("actionable_suggestions", FieldType::StringArray, true, "Specific suggestions for improvement"),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_items("what_went_well", &self.what_went_well)?;
        require_items("areas_for_improvement", &self.areas_for_improvement)?;
        require_items("actionable_suggestions", &self.actionable_suggestions)
    }
}

/// Listener reply: conversational text plus a summary once intake is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerReply {
    pub reply: String,
    #[serde(default)]
    pub problem_summary: Option<ProblemSummary>,
}

impl StructuredOutput for ListenerReply {
    fn schema() -> OutputSchema {
        OutputSchema {
            name: "listener_reply".to_string(),
            fields: vec![
                SchemaField::new("reply", FieldType::String, true, "Your message to the user"),
                SchemaField::new(
                    "problem_summary",
                    FieldType::Object(ProblemSummary::schema()),
                    false,
                    "Structured summary, only once enough information has been gathered",
                ),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("reply", &self.reply)?;
        match &self.problem_summary {
            Some(summary) => summary.validate(),
            None => Ok(()),
        }
    }
}

/// Coordinator reply: conversational text plus the agreed setup once settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorReply {
    pub reply: String,
    #[serde(default)]
    pub simulation_config: Option<SimulationConfig>,
}

impl StructuredOutput for CoordinatorReply {
    fn schema() -> OutputSchema {
        OutputSchema {
            name: "coordinator_reply".to_string(),
            fields: vec![
                SchemaField::new("reply", FieldType::String, true, "Your message to the user"),
                SchemaField::new(
                    "simulation_config",
                    FieldType::Object(SimulationConfig::schema()),
                    false,
                    "Simulation configuration, once the persona details are settled",
                ),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("reply", &self.reply)?;
        match &self.simulation_config {
            Some(config) => config.validate(),
            None => Ok(()),
        }
    }
}
