//! Conversation analysis: LLM scoring of sales conversations against the
//! consultative script.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Conversation, ConversationAnalysis, NewConversation};
use crate::interfaces::outbound::GenerationRequest;
use crate::interfaces::{GameStore, TextGenerator};

use super::gamification::SalespersonBrief;
use super::Result;

/// The consultative sales script the analysis grades against, as rendered
/// into the prompt. Stage weights mirror how much each step moves a deal.
const SALES_SCRIPT: &str = "\
1. Saudação Profissional (peso 1.0): cumprimento educado + apresentação pessoal\n\
2. Identificação (peso 1.5): nome + empresa + motivo do contato\n\
3. Descoberta de Necessidades (peso 2.0): perguntas abertas para entender a dor do cliente\n\
4. Apresentação de Solução (peso 2.0): explicar os principais benefícios do produto\n\
5. Tratamento de Objeções (peso 1.5): responder dúvidas e objeções com empatia\n\
6. Fechamento com CTA (peso 2.0): propor próximo passo claro\n\
7. Follow-up (peso 1.0): combinar próximo contato ou enviar material";

/// The JSON shape the generator is asked to return. Every field defaults
/// so a partially-filled answer still parses.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    stage_score: f64,
    quality_score: f64,
    objection_score: f64,
    outcome_score: f64,
    overall_score: f64,
    stages_met: Vec<String>,
    improvements: Vec<String>,
    outcome: String,
    summary: Option<String>,
}

impl Default for RawAnalysis {
    fn default() -> Self {
        Self {
            stage_score: 5.0,
            quality_score: 5.0,
            objection_score: 5.0,
            outcome_score: 5.0,
            overall_score: 5.0,
            stages_met: Vec::new(),
            improvements: Vec::new(),
            outcome: "no_interest".to_string(),
            summary: None,
        }
    }
}

impl From<RawAnalysis> for ConversationAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        Self {
            stage_score: raw.stage_score,
            quality_score: raw.quality_score,
            objection_score: raw.objection_score,
            outcome_score: raw.outcome_score,
            overall_score: raw.overall_score,
            stages_met: raw.stages_met,
            improvements: raw.improvements,
            outcome: raw.outcome,
            summary: raw.summary,
        }
    }
}

/// Analysis summary for one salesperson.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub salesperson: SalespersonBrief,
    pub average_score: Option<f64>,
    pub total_analyzed: i64,
    pub recent: Vec<ConversationView>,
}

/// Conversation subset for listings (no transcript).
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: i64,
    pub customer_name: Option<String>,
    pub channel: crate::domain::Channel,
    pub overall_score: f64,
    pub stage_score: f64,
    pub quality_score: f64,
    pub objection_score: f64,
    pub outcome_score: f64,
    pub outcome: String,
    pub happened_at: chrono::DateTime<chrono::Utc>,
    pub duration_secs: Option<i64>,
}

impl From<&Conversation> for ConversationView {
    fn from(c: &Conversation) -> Self {
        Self {
            id: c.id,
            customer_name: c.customer_name.clone(),
            channel: c.channel,
            overall_score: c.analysis.overall_score,
            stage_score: c.analysis.stage_score,
            quality_score: c.analysis.quality_score,
            objection_score: c.analysis.objection_score,
            outcome_score: c.analysis.outcome_score,
            outcome: c.analysis.outcome.clone(),
            happened_at: c.happened_at,
            duration_secs: c.duration_secs,
        }
    }
}

/// Conversation scoring and retrieval.
pub struct AnalysisService {
    store: Arc<dyn GameStore>,
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisService {
    pub fn new(store: Arc<dyn GameStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// Score a conversation with the generator and persist it.
    ///
    /// Generator or parse failures degrade to a neutral analysis — a bad
    /// LLM day must not lose the transcript.
    pub async fn analyze_and_store(&self, new: NewConversation) -> Result<Conversation> {
        self.store.salesperson(new.salesperson_id).await?;

        let analysis = match self.score_transcript(&new.transcript).await {
            Ok(analysis) => analysis,
            Err(reason) => {
                warn!(
                    salesperson = new.salesperson_id,
                    reason = %reason,
                    "conversation analysis failed, storing neutral scores"
                );
                ConversationAnalysis::fallback("análise automática indisponível")
            }
        };

        Ok(self.store.insert_conversation(&new, &analysis).await?)
    }

    /// Average score and recent conversations for one salesperson.
    pub async fn summary(&self, salesperson_id: i64) -> Result<AnalysisSummary> {
        let sp = self.store.salesperson(salesperson_id).await?;
        let average_score = self.store.average_conversation_score(salesperson_id).await?;
        let recent = self.store.recent_conversations(salesperson_id, 10).await?;

        Ok(AnalysisSummary {
            salesperson: SalespersonBrief::from(&sp),
            average_score,
            total_analyzed: recent.iter().filter(|c| c.analyzed).count() as i64,
            recent: recent.iter().map(ConversationView::from).collect(),
        })
    }

    async fn score_transcript(&self, transcript: &str) -> std::result::Result<ConversationAnalysis, String> {
        let prompt = format!(
            "Você é um especialista em análise de vendas consultivas. Analise a \
             conversa abaixo entre um vendedor e um cliente.\n\n\
             **SCRIPT DE VENDAS ESPERADO:**\n\n{SALES_SCRIPT}\n\n\
             **CONVERSA A SER ANALISADA:**\n\n{transcript}\n\n---\n\n\
             Avalie de 0 a 10: cumprimento das etapas, qualidade da abordagem, \
             tratamento de objeções e resultado obtido.\n\n\
             **RETORNE APENAS UM JSON com esta estrutura:**\n\n\
             {{\n\
             \x20 \"stage_score\": 8.5,\n\
             \x20 \"quality_score\": 9.0,\n\
             \x20 \"objection_score\": 7.5,\n\
             \x20 \"outcome_score\": 8.0,\n\
             \x20 \"overall_score\": 8.25,\n\
             \x20 \"stages_met\": [\"saudacao\", \"identificacao\", \"descoberta\"],\n\
             \x20 \"improvements\": [\"Aprofundar o tratamento de objeções\"],\n\
             \x20 \"outcome\": \"scheduled\",\n\
             \x20 \"summary\": \"Resumo curto da conversa.\"\n\
             }}\n\n\
             - Seja rigoroso mas justo\n\
             - overall_score deve ser a média ponderada das 4 notas\n\
             - Em stages_met, liste apenas etapas REALMENTE cumpridas\n\
             - Em outcome, use: \"closed_won\", \"scheduled\", \"interested\", \
             \"no_interest\" ou \"lost\""
        );

        let request = GenerationRequest::new(prompt)
            .with_system(
                "Você é um especialista em análise de vendas consultivas. \
                 Retorne APENAS JSON válido.",
            )
            .with_temperature(0.3)
            .with_max_tokens(1500);

        let answer = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| e.to_string())?;

        let json = strip_code_fences(&answer);
        let raw: RawAnalysis =
            serde_json::from_str(json).map_err(|e| format!("unparseable analysis: {e}"))?;
        Ok(raw.into())
    }
}

/// Pull the JSON body out of a possibly markdown-fenced answer.
fn strip_code_fences(answer: &str) -> &str {
    let trimmed = answer.trim();
    if let Some(rest) = trimmed.split("```json").nth(1) {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some(rest) = trimmed.split("```").nth(1) {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_passthrough() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_json_fence() {
        let fenced = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\":1}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let fenced = "```\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\":1}");
    }

    #[test]
    fn test_partial_analysis_fills_defaults() {
        let raw: RawAnalysis =
            serde_json::from_str(r#"{"overall_score": 8.2, "outcome": "scheduled"}"#).unwrap();
        assert_eq!(raw.overall_score, 8.2);
        assert_eq!(raw.outcome, "scheduled");
        assert_eq!(raw.stage_score, 5.0);
        assert!(raw.stages_met.is_empty());
    }

    #[test]
    fn test_full_analysis_parses() {
        let raw: RawAnalysis = serde_json::from_str(
            r#"{
                "stage_score": 8.5,
                "quality_score": 9.0,
                "objection_score": 7.5,
                "outcome_score": 8.0,
                "overall_score": 8.25,
                "stages_met": ["saudacao", "descoberta"],
                "improvements": ["Follow-up mais claro"],
                "outcome": "scheduled",
                "summary": "Boa conversa."
            }"#,
        )
        .unwrap();
        let analysis: ConversationAnalysis = raw.into();
        assert_eq!(analysis.overall_score, 8.25);
        assert_eq!(analysis.stages_met.len(), 2);
        assert_eq!(analysis.summary.as_deref(), Some("Boa conversa."));
    }
}
