use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use farewatch_core::scorer::ScoredDeal;
use farewatch_core::ReferenceTables;

/// One candidate as presented to the classifier, with the computed
/// context it needs to judge quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub index: usize,
    pub route: String,
    pub price: f64,
    pub currency: String,
    /// Percent below the destination's expected price, when known
    pub discount_pct: Option<f64>,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub trip_length_days: i64,
    pub stops: u32,
    pub airline: String,
    pub pre_score: u8,
}

impl CandidateSummary {
    pub fn from_scored(index: usize, scored: &ScoredDeal, tables: &ReferenceTables) -> Self {
        let deal = &scored.deal;
        let discount_pct = tables
            .threshold(&deal.destination.country)
            .filter(|t| *t > 0.0)
            .map(|t| (1.0 - deal.price / t) * 100.0);
        Self {
            index,
            route: deal.route(),
            price: deal.price,
            currency: deal.currency.clone(),
            discount_pct,
            departure_date: deal.departure_date,
            return_date: deal.return_date,
            trip_length_days: deal.trip_length_days(),
            stops: deal.stops,
            airline: deal.airline.clone(),
            pre_score: scored.score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRequest {
    pub locale: String,
    pub candidates: Vec<CandidateSummary>,
    /// Human-readable enumeration of the candidates plus tier instructions
    pub prompt: String,
}

/// One pick from the classifier's reply. Untrusted until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub index: usize,
    pub tier: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierResponse {
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("classifier timed out")]
    Timeout,

    #[error("classifier returned HTTP {0}")]
    Http(u16),

    #[error("classifier reply was not parseable: {0}")]
    Malformed(String),
}

/// External natural-language classifier. Non-deterministic and
/// unreliable; callers must validate every reply and keep a
/// deterministic fallback ready.
#[async_trait]
pub trait DealClassifier: Send + Sync {
    async fn classify(&self, request: &ClassifierRequest)
        -> Result<ClassifierResponse, ClassifierError>;
}

/// JSON-over-HTTP classifier collaborator.
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpClassifier {
    pub fn new(
        endpoint: String,
        api_key: String,
        timeout_seconds: u64,
    ) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl DealClassifier for HttpClassifier {
    async fn classify(
        &self,
        request: &ClassifierRequest,
    ) -> Result<ClassifierResponse, ClassifierError> {
        tracing::debug!(
            locale = %request.locale,
            candidates = request.candidates.len(),
            "querying deal classifier"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else {
                    ClassifierError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Http(status.as_u16()));
        }

        response
            .json::<ClassifierResponse>()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))
    }
}

/// Canned classifier for tests and offline development.
pub struct MockClassifier {
    pub reply: Result<ClassifierResponse, ClassifierError>,
}

impl MockClassifier {
    pub fn replying(response: ClassifierResponse) -> Self {
        Self { reply: Ok(response) }
    }

    pub fn failing(error: ClassifierError) -> Self {
        Self { reply: Err(error) }
    }
}

#[async_trait]
impl DealClassifier for MockClassifier {
    async fn classify(
        &self,
        _request: &ClassifierRequest,
    ) -> Result<ClassifierResponse, ClassifierError> {
        match &self.reply {
            Ok(r) => Ok(r.clone()),
            Err(ClassifierError::Timeout) => Err(ClassifierError::Timeout),
            Err(ClassifierError::Http(code)) => Err(ClassifierError::Http(*code)),
            Err(ClassifierError::Transport(msg)) => Err(ClassifierError::Transport(msg.clone())),
            Err(ClassifierError::Malformed(msg)) => Err(ClassifierError::Malformed(msg.clone())),
        }
    }
}
