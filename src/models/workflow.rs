use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language model the translation step is delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranslationModel {
    Haiku,
    Sonnet,
    Opus,
}

impl TranslationModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            TranslationModel::Haiku => "Claude Haiku 3.5",
            TranslationModel::Sonnet => "Claude Sonnet 4.5",
            TranslationModel::Opus => "Claude Opus 4.5",
        }
    }

    /// Rough per-article cost, for operator display only.
    pub fn estimated_cost(&self) -> &'static str {
        match self {
            TranslationModel::Haiku => "~$0.002-0.003",
            TranslationModel::Sonnet => "~$0.05-0.07",
            TranslationModel::Opus => "~$0.35-0.50",
        }
    }
}

impl std::fmt::Display for TranslationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TranslationModel::Haiku => "haiku",
            TranslationModel::Sonnet => "sonnet",
            TranslationModel::Opus => "opus",
        };
        f.write_str(name)
    }
}

/// Snapshot of run parameters saved as `.workflow.json`.
///
/// Observational only: publish logic never reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub original_url: String,
    pub timestamp: DateTime<Utc>,
    pub model: TranslationModel,
    pub model_name: String,
    pub estimated_cost: String,
    pub steps: Vec<String>,
}

impl WorkflowRecord {
    pub fn new(original_url: impl Into<String>, model: TranslationModel) -> Self {
        Self {
            original_url: original_url.into(),
            timestamp: Utc::now(),
            model,
            model_name: model.display_name().to_string(),
            estimated_cost: model.estimated_cost().to_string(),
            steps: vec![
                "Extract article content".to_string(),
                format!("Translate with {}", model.display_name()),
                "Generate thumbnail".to_string(),
                "Publish to Ghost".to_string(),
                "Commit to Git".to_string(),
            ],
        }
    }
}
