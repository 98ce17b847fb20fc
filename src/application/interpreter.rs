//! Action result interpretation.
//!
//! Maps each structured outcome attached to an assistant turn onto exactly
//! one presentation decision. Pure and deterministic: same result, same
//! decision, no I/O. Classification is first-match-wins in a fixed order,
//! so a confirmation request always wins over its data payload and a
//! failure always wins over whatever partial data came with it.

use serde_json::Value as JsonValue;

use crate::domain::chat::{
    ActionData, ActionResult, ChartSpec, EntityDraft, Insight, NestedPreview, SuccessAction,
};
use crate::domain::schema::EntityKind;

/// Affordances offered on an entity detail card.
///
/// All three require a backend record id; a detail without an id renders
/// with no affordances at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAffordance {
    Navigate,
    Edit,
    DownloadPdf,
}

/// How one action result should be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderDecision {
    /// Start the confirm-before-create workflow on the proposed draft.
    Confirmation {
        draft: EntityDraft,
        nested_previews: Vec<NestedPreview>,
        message: Option<String>,
    },
    /// The action failed; show the error.
    Failure { error: String },
    /// Render a single chart with a pin affordance.
    Chart(ChartSpec),
    /// Render ordered insights, then charts.
    Analysis {
        insights: Vec<Insight>,
        charts: Vec<ChartSpec>,
    },
    /// Render a statistics block, then charts.
    Statistics {
        stats: JsonValue,
        charts: Vec<ChartSpec>,
    },
    /// Offer an "open list" affordance; items render only on demand.
    DeferredList { tag: String, items: Vec<JsonValue> },
    /// Render an entity detail card.
    EntityDetail {
        kind: EntityKind,
        id: Option<i64>,
        fields: JsonValue,
        affordances: Vec<EntityAffordance>,
        success_actions: Vec<SuccessAction>,
    },
    /// Report an unrecognized result kind. Never fatal.
    Unsupported { entity_type: String },
}

/// Classifies one action result into its presentation decision.
pub fn interpret(result: &ActionResult) -> RenderDecision {
    if result.needs_confirmation {
        if let Some(draft) = &result.draft {
            return RenderDecision::Confirmation {
                draft: draft.clone(),
                nested_previews: result.nested_previews.clone(),
                message: result.message.clone(),
            };
        }
        // Confirmation requested without a usable draft: treat as failure
        return RenderDecision::Failure {
            error: result
                .error
                .clone()
                .unwrap_or_else(|| "Proposition incomplète reçue du serveur".to_string()),
        };
    }

    if !result.success {
        return RenderDecision::Failure {
            error: result
                .error
                .clone()
                .or_else(|| result.message.clone())
                .unwrap_or_else(|| "L'action a échoué".to_string()),
        };
    }

    match &result.data {
        ActionData::Visualization(chart) => RenderDecision::Chart(chart.clone()),
        ActionData::BusinessAnalysis { insights, charts } => RenderDecision::Analysis {
            insights: insights.clone(),
            charts: charts.clone(),
        },
        ActionData::Statistics { stats, charts } => RenderDecision::Statistics {
            stats: stats.clone(),
            charts: charts.clone(),
        },
        ActionData::ItemList { tag, items } => RenderDecision::DeferredList {
            tag: tag.clone(),
            items: items.clone(),
        },
        ActionData::Entity { kind, id, fields } => RenderDecision::EntityDetail {
            kind: *kind,
            id: *id,
            fields: fields.clone(),
            affordances: entity_affordances(*id),
            success_actions: result.success_actions.clone(),
        },
        ActionData::Unsupported { entity_type } => RenderDecision::Unsupported {
            entity_type: entity_type.clone(),
        },
    }
}

fn entity_affordances(id: Option<i64>) -> Vec<EntityAffordance> {
    match id {
        Some(_) => vec![
            EntityAffordance::Navigate,
            EntityAffordance::Edit,
            EntityAffordance::DownloadPdf,
        ],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_from(value: JsonValue) -> ActionResult {
        ActionResult::from_value(&value)
    }

    #[test]
    fn confirmation_wins_over_data_payload() {
        let result = result_from(json!({
            "success": true,
            "needs_confirmation": true,
            "data": {"entity_type": "invoice"},
            "draft_data": {"client_name": "Jean Dupont"},
            "message": "Vérifiez la proposition"
        }));

        match interpret(&result) {
            RenderDecision::Confirmation { draft, message, .. } => {
                assert_eq!(draft.kind(), EntityKind::Invoice);
                assert_eq!(message.as_deref(), Some("Vérifiez la proposition"));
            }
            other => panic!("expected Confirmation, got {:?}", other),
        }
    }

    #[test]
    fn failure_wins_over_successful_looking_data() {
        let result = result_from(json!({
            "success": false,
            "data": {"entity_type": "visualization", "chart_title": "CA"},
            "error": "Données indisponibles"
        }));

        assert_eq!(
            interpret(&result),
            RenderDecision::Failure {
                error: "Données indisponibles".to_string()
            }
        );
    }

    #[test]
    fn confirmation_without_draft_degrades_to_failure() {
        let result = result_from(json!({
            "success": true,
            "needs_confirmation": true,
            "data": {"entity_type": "hologram"}
        }));

        assert!(matches!(interpret(&result), RenderDecision::Failure { .. }));
    }

    #[test]
    fn visualization_renders_as_chart() {
        let result = result_from(json!({
            "success": true,
            "data": {
                "entity_type": "visualization",
                "chart_type": "line",
                "chart_title": "Revenus Mensuels",
                "chart_data": {"labels": [], "values": []}
            }
        }));

        match interpret(&result) {
            RenderDecision::Chart(chart) => assert_eq!(chart.chart_title, "Revenus Mensuels"),
            other => panic!("expected Chart, got {:?}", other),
        }
    }

    #[test]
    fn analysis_keeps_insight_order() {
        let result = result_from(json!({
            "success": true,
            "data": {
                "entity_type": "business_analysis",
                "insights": [
                    {"severity": "success", "title": "CA en hausse"},
                    {"severity": "alert", "title": "Facture impayée"}
                ]
            }
        }));

        match interpret(&result) {
            RenderDecision::Analysis { insights, .. } => {
                assert_eq!(insights[0].title, "Facture impayée");
                assert_eq!(insights[1].title, "CA en hausse");
            }
            other => panic!("expected Analysis, got {:?}", other),
        }
    }

    #[test]
    fn item_list_is_deferred() {
        let result = result_from(json!({
            "success": true,
            "data": {"entity_type": "invoice_list", "items": [{"id": 1}, {"id": 2}]}
        }));

        match interpret(&result) {
            RenderDecision::DeferredList { tag, items } => {
                assert_eq!(tag, "invoice_list");
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected DeferredList, got {:?}", other),
        }
    }

    #[test]
    fn entity_with_id_gets_all_affordances() {
        let result = result_from(json!({
            "success": true,
            "data": {"entity_type": "invoice", "id": 42, "client_name": "Jean Dupont"},
            "success_actions": [
                {"type": "pdf", "label": "Télécharger", "ids": [42]}
            ]
        }));

        match interpret(&result) {
            RenderDecision::EntityDetail {
                id,
                affordances,
                success_actions,
                ..
            } => {
                assert_eq!(id, Some(42));
                assert_eq!(affordances.len(), 3);
                assert_eq!(success_actions.len(), 1);
            }
            other => panic!("expected EntityDetail, got {:?}", other),
        }
    }

    #[test]
    fn entity_without_id_gets_no_affordances() {
        let result = result_from(json!({
            "success": true,
            "data": {"entity_type": "client", "name": "Jean Dupont"}
        }));

        match interpret(&result) {
            RenderDecision::EntityDetail { id, affordances, .. } => {
                assert_eq!(id, None);
                assert!(affordances.is_empty());
            }
            other => panic!("expected EntityDetail, got {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_is_reported_not_fatal() {
        let result = result_from(json!({
            "success": true,
            "data": {"entity_type": "hologram"}
        }));

        assert_eq!(
            interpret(&result),
            RenderDecision::Unsupported {
                entity_type: "hologram".to_string()
            }
        );
    }

    #[test]
    fn interpretation_is_deterministic() {
        let result = result_from(json!({
            "success": true,
            "data": {"entity_type": "statistics", "stats": {"total": 12}}
        }));
        assert_eq!(interpret(&result), interpret(&result));
    }
}
