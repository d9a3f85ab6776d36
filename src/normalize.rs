use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::identity::{RecipeId, SourceKind};
use crate::model::{
    CanonicalRecipe, InstructionGroup, InstructionStep, CATALOG_IMAGE_BASE, PLACEHOLDER_IMAGE,
};

/// Reshape a raw recipe payload into the canonical display model.
///
/// `kind` is decided once by [`SourceKind::classify`] and selects which of
/// the two source schemas applies; the payload shape is never re-sniffed.
/// A payload missing its identity (`id`, `title`) or not recipe-shaped at
/// all fails with [`Error::MalformedRecipe`], which callers surface as
/// "not found" rather than a crash.
pub fn normalize(raw: &Value, kind: SourceKind) -> Result<CanonicalRecipe, Error> {
    match kind {
        SourceKind::Catalog => CatalogPayload::deserialize(raw)
            .map(CanonicalRecipe::from)
            .map_err(|e| Error::MalformedRecipe(e.to_string())),
        SourceKind::Generated => GeneratedPayload::deserialize(raw)
            .map(CanonicalRecipe::from)
            .map_err(|e| Error::MalformedRecipe(e.to_string())),
    }
}

const DEFAULT_READY_IN_MINUTES: u32 = 20;
const DEFAULT_SERVINGS: u32 = 2;

/// Numeric field that may arrive as something other than a number.
/// Anything non-numeric (or zero) falls back to the field default.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaybeNumber {
    Number(u32),
    Other(Value),
}

fn number_or(value: Option<MaybeNumber>, default: u32) -> u32 {
    match value {
        Some(MaybeNumber::Number(n)) if n > 0 => n,
        _ => default,
    }
}

// --- Catalog schema ---

#[derive(Debug, Deserialize)]
struct CatalogPayload {
    id: RecipeId,
    title: String,
    image: Option<String>,
    #[serde(rename = "readyInMinutes")]
    ready_in_minutes: Option<MaybeNumber>,
    servings: Option<MaybeNumber>,
    summary: Option<String>,
    #[serde(rename = "extendedIngredients", default)]
    extended_ingredients: Vec<CatalogIngredient>,
    #[serde(rename = "analyzedInstructions", default)]
    analyzed_instructions: Vec<AnalyzedInstruction>,
    #[serde(default)]
    instructions: Option<FlatInstructions>,
}

#[derive(Debug, Deserialize)]
struct CatalogIngredient {
    /// The catalog's pre-rendered human-readable line
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedInstruction {
    name: Option<String>,
    #[serde(default)]
    steps: Vec<AnalyzedStep>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedStep {
    number: Option<u32>,
    step: String,
}

/// Catalog payloads usually carry `instructions` as one HTML blob, but
/// some responses use a plain string list. Only the list form feeds the
/// fallback; a blob is ignored in favor of `analyzedInstructions`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlatInstructions {
    Lines(Vec<String>),
    Text(String),
}

/// Resolve the catalog image field to an absolute URL: full URLs pass
/// through, bare filenames get the catalog image host prepended, and a
/// missing image becomes the shared placeholder.
fn resolve_catalog_image(image: Option<String>) -> String {
    match image {
        Some(image) if image.starts_with("http") => image,
        Some(image) if !image.is_empty() => format!("{}{}", CATALOG_IMAGE_BASE, image),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

fn number_steps(lines: Vec<String>) -> Vec<InstructionStep> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| InstructionStep {
            number: i as u32 + 1,
            text,
        })
        .collect()
}

impl From<CatalogPayload> for CanonicalRecipe {
    fn from(payload: CatalogPayload) -> Self {
        let analyzed: Vec<InstructionGroup> = payload
            .analyzed_instructions
            .into_iter()
            .filter(|group| !group.steps.is_empty())
            .map(|group| InstructionGroup {
                name: group.name.filter(|name| !name.is_empty()),
                steps: group
                    .steps
                    .into_iter()
                    .enumerate()
                    .map(|(i, step)| InstructionStep {
                        number: step.number.unwrap_or(i as u32 + 1),
                        text: step.step,
                    })
                    .collect(),
            })
            .collect();

        let instruction_groups = if analyzed.is_empty() {
            match payload.instructions {
                Some(FlatInstructions::Lines(lines)) if !lines.is_empty() => {
                    vec![InstructionGroup {
                        name: None,
                        steps: number_steps(lines),
                    }]
                }
                _ => Vec::new(),
            }
        } else {
            analyzed
        };

        CanonicalRecipe {
            id: payload.id,
            title: payload.title,
            image_url: resolve_catalog_image(payload.image),
            ready_in_minutes: number_or(payload.ready_in_minutes, DEFAULT_READY_IN_MINUTES),
            servings: number_or(payload.servings, DEFAULT_SERVINGS),
            ingredients: payload
                .extended_ingredients
                .into_iter()
                .filter_map(|i| i.original)
                .collect(),
            instruction_groups,
            summary_html: payload.summary,
            source_kind: SourceKind::Catalog,
        }
    }
}

// --- Generated schema ---

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    id: RecipeId,
    title: String,
    #[serde(rename = "readyInMinutes")]
    ready_in_minutes: Option<MaybeNumber>,
    servings: Option<MaybeNumber>,
    #[serde(default)]
    ingredients: Vec<GeneratedIngredient>,
    #[serde(default)]
    instructions: Vec<String>,
    /// Present when re-normalizing an already-canonical stored document;
    /// reproduced verbatim so normalization is idempotent.
    #[serde(rename = "instructionGroups", default)]
    instruction_groups: Vec<InstructionGroup>,
}

/// Generated ingredient entries come either as plain display strings or as
/// structured quantity/unit/name records, any subset of which may be set.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedIngredient {
    Structured {
        quantity: Option<QuantityValue>,
        unit: Option<String>,
        name: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuantityValue {
    Text(String),
    Number(f64),
}

impl QuantityValue {
    fn render(self) -> String {
        match self {
            QuantityValue::Text(text) => text,
            // LLMs emit quantities as bare numbers about as often as strings
            QuantityValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

impl GeneratedIngredient {
    /// Compose one display line, skipping absent fields so nothing renders
    /// as a literal "undefined" or leaves doubled spaces.
    fn into_line(self) -> String {
        match self {
            GeneratedIngredient::Text(line) => line,
            GeneratedIngredient::Structured {
                quantity,
                unit,
                name,
            } => {
                let parts: Vec<String> = [
                    quantity.map(QuantityValue::render),
                    unit,
                    name,
                ]
                .into_iter()
                .flatten()
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
                parts.join(" ")
            }
        }
    }
}

impl From<GeneratedPayload> for CanonicalRecipe {
    fn from(payload: GeneratedPayload) -> Self {
        let instruction_groups = if !payload.instruction_groups.is_empty() {
            payload.instruction_groups
        } else if payload.instructions.is_empty() {
            Vec::new()
        } else {
            vec![InstructionGroup {
                name: None,
                steps: number_steps(payload.instructions),
            }]
        };

        CanonicalRecipe {
            id: payload.id,
            title: payload.title,
            // generated recipes carry no real image
            image_url: PLACEHOLDER_IMAGE.to_string(),
            ready_in_minutes: number_or(payload.ready_in_minutes, DEFAULT_READY_IN_MINUTES),
            servings: number_or(payload.servings, DEFAULT_SERVINGS),
            ingredients: payload
                .ingredients
                .into_iter()
                .map(GeneratedIngredient::into_line)
                .collect(),
            instruction_groups,
            summary_html: None,
            source_kind: SourceKind::Generated,
        }
    }
}
