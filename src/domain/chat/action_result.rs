//! Action results attached to assistant turns.
//!
//! The backend tags each result's `data` with a closed `entity_type` string.
//! Parsing maps that open wire tag onto the closed `ActionData` sum so the
//! interpreter can match exhaustively; anything outside the known set lands
//! in the explicit `Unsupported` variant instead of crashing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::schema::EntityKind;

use super::EntityDraft;

/// Severity of a business-analysis insight.
///
/// Ordering is by urgency: `Alert > Warning > Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    Warning,
    Success,
}

impl Severity {
    /// Urgency rank, highest first. Used to order insight lists.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Alert => 0,
            Severity::Warning => 1,
            Severity::Success => 2,
        }
    }

    fn from_tag(tag: &str) -> Self {
        match tag {
            "alert" => Severity::Alert,
            "warning" => Severity::Warning,
            _ => Severity::Success,
        }
    }
}

/// One insight inside a business-analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Declared severity, driving display order.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Optional longer explanation.
    #[serde(default)]
    pub detail: Option<String>,
}

/// A renderable chart specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart family understood by the drawing collaborator (bar, line, pie…).
    pub chart_type: String,
    /// Display title; part of the artifact dedup key.
    pub chart_title: String,
    /// Series/points payload, passed through untouched.
    pub chart_data: JsonValue,
    /// Rendering options, passed through untouched.
    #[serde(default)]
    pub chart_config: JsonValue,
}

impl ChartSpec {
    fn from_value(value: &JsonValue) -> Self {
        Self {
            chart_type: value
                .get("chart_type")
                .and_then(JsonValue::as_str)
                .unwrap_or("bar")
                .to_string(),
            chart_title: value
                .get("chart_title")
                .or_else(|| value.get("title"))
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string(),
            chart_data: value.get("chart_data").cloned().unwrap_or(JsonValue::Null),
            chart_config: value.get("chart_config").cloned().unwrap_or(JsonValue::Null),
        }
    }
}

/// A follow-up affordance the backend attaches to a successful creation
/// (navigate to the record, download a PDF, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessAction {
    /// Action discriminator as sent by the backend.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Display label.
    pub label: String,
    /// Target URL, when the action navigates.
    #[serde(default)]
    pub url: Option<String>,
    /// Target record ids, when the action references entities.
    #[serde(default)]
    pub ids: Option<Vec<i64>>,
}

/// Closed classification of an action result's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionData {
    /// A single renderable chart.
    Visualization(ChartSpec),
    /// Ordered insights followed by zero or more charts.
    BusinessAnalysis {
        insights: Vec<Insight>,
        charts: Vec<ChartSpec>,
    },
    /// A raw statistics block plus optional charts.
    Statistics {
        stats: JsonValue,
        charts: Vec<ChartSpec>,
    },
    /// A collection result rendered behind an "open list" affordance.
    ItemList {
        /// Wire tag of the collection, kept for display.
        tag: String,
        items: Vec<JsonValue>,
    },
    /// A single business entity, created or referenced.
    Entity {
        kind: EntityKind,
        /// Backend record id; navigate/edit/PDF affordances require it.
        id: Option<i64>,
        fields: JsonValue,
    },
    /// Anything outside the known tag set. Reported, never fatal.
    Unsupported { entity_type: String },
}

impl ActionData {
    /// Parses the backend's `data` object by its `entity_type` tag.
    ///
    /// Deterministic: the same input value always yields the same variant.
    pub fn from_value(value: &JsonValue) -> Self {
        let tag = value
            .get("entity_type")
            .and_then(JsonValue::as_str)
            .unwrap_or_default();

        match tag {
            "visualization" => ActionData::Visualization(ChartSpec::from_value(value)),
            "business_analysis" => {
                let mut insights: Vec<Insight> = value
                    .get("insights")
                    .and_then(JsonValue::as_array)
                    .map(|entries| entries.iter().filter_map(parse_insight).collect())
                    .unwrap_or_default();
                // Stable sort keeps same-severity insights in declared order
                insights.sort_by_key(|i| i.severity.rank());
                ActionData::BusinessAnalysis {
                    insights,
                    charts: parse_charts(value),
                }
            }
            "statistics" => ActionData::Statistics {
                stats: value.get("stats").cloned().unwrap_or(JsonValue::Null),
                charts: parse_charts(value),
            },
            tag => {
                if let Ok(kind) = tag.parse::<EntityKind>() {
                    return ActionData::Entity {
                        kind,
                        id: value.get("id").and_then(JsonValue::as_i64),
                        fields: value.clone(),
                    };
                }
                if let Some(items) = value.get("items").and_then(JsonValue::as_array) {
                    if !items.is_empty() {
                        return ActionData::ItemList {
                            tag: tag.to_string(),
                            items: items.clone(),
                        };
                    }
                }
                ActionData::Unsupported {
                    entity_type: tag.to_string(),
                }
            }
        }
    }
}

fn parse_insight(value: &JsonValue) -> Option<Insight> {
    Some(Insight {
        severity: Severity::from_tag(
            value.get("severity").and_then(JsonValue::as_str).unwrap_or_default(),
        ),
        title: value.get("title").and_then(JsonValue::as_str)?.to_string(),
        detail: value
            .get("detail")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
    })
}

fn parse_charts(value: &JsonValue) -> Vec<ChartSpec> {
    value
        .get("charts")
        .and_then(JsonValue::as_array)
        .map(|entries| entries.iter().map(ChartSpec::from_value).collect())
        .unwrap_or_default()
}

/// A read-only preview of a dependent entity that will be created as a side
/// effect of confirming its parent.
///
/// Deliberately exposes no confirm/modify/cancel operations: nested drafts
/// are never independently actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedPreview {
    kind: EntityKind,
    draft: EntityDraft,
    message: String,
}

impl NestedPreview {
    /// Creates a nested preview.
    pub fn new(kind: EntityKind, draft: EntityDraft, message: impl Into<String>) -> Self {
        Self {
            kind,
            draft,
            message: message.into(),
        }
    }

    /// Returns the dependent entity's kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the dependent draft, for display only.
    pub fn draft(&self) -> &EntityDraft {
        &self.draft
    }

    /// Returns the explanatory message shown on the card.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One structured outcome attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the backend reports this action as successful.
    pub success: bool,
    /// Classified data payload.
    pub data: ActionData,
    /// Optional human-readable status message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error description when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
    /// True when the result proposes an entity awaiting confirmation.
    #[serde(default)]
    pub needs_confirmation: bool,
    /// The proposed draft, present when confirmation is needed.
    #[serde(default)]
    pub draft: Option<EntityDraft>,
    /// Read-only previews of dependent entities.
    #[serde(default)]
    pub nested_previews: Vec<NestedPreview>,
    /// Follow-up affordances for successful creations.
    #[serde(default)]
    pub success_actions: Vec<SuccessAction>,
}

impl ActionResult {
    /// Parses one wire action result.
    ///
    /// The draft's entity kind comes from the `data.entity_type` tag; a
    /// confirmation-needing result whose tag is not a creatable kind keeps
    /// `draft = None` and falls through to normal classification.
    pub fn from_value(value: &JsonValue) -> Self {
        let data_value = value.get("data").cloned().unwrap_or(JsonValue::Null);
        let data = ActionData::from_value(&data_value);

        let needs_confirmation = value
            .get("needs_confirmation")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);

        let draft_kind = data_value
            .get("entity_type")
            .and_then(JsonValue::as_str)
            .and_then(|tag| tag.parse::<EntityKind>().ok());

        let draft = match (needs_confirmation, draft_kind) {
            (true, Some(kind)) => value
                .get("draft_data")
                .map(|raw| EntityDraft::from_value(kind, raw)),
            _ => None,
        };

        let nested_previews = value
            .get("nested_previews")
            .and_then(JsonValue::as_array)
            .map(|entries| entries.iter().filter_map(parse_nested_preview).collect())
            .unwrap_or_default();

        let success_actions = value
            .get("success_actions")
            .and_then(JsonValue::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            success: value
                .get("success")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            data,
            message: value
                .get("message")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            error: value
                .get("error")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            needs_confirmation,
            draft,
            nested_previews,
            success_actions,
        }
    }
}

fn parse_nested_preview(value: &JsonValue) -> Option<NestedPreview> {
    let kind = value
        .get("entity_type")
        .and_then(JsonValue::as_str)?
        .parse::<EntityKind>()
        .ok()?;
    let draft = EntityDraft::from_value(kind, value.get("draft_data")?);
    let message = value
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    Some(NestedPreview::new(kind, draft, message))
}
