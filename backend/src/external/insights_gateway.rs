//! Sales-insights gateway client
//!
//! Client for the LLM-backed insights microservice. Both analysis modes are
//! single synchronous request/response calls: no streaming, no cancellation,
//! and one retry-free attempt per call. An answer without structured output
//! is a terminal failure for that request.

use reqwest::Client;
use serde::Serialize;
use shared::models::{BusinessAnalysis, ProductSalesSummary, SalesInsightsAnswer, WholesaleSnapshot};

use crate::error::{AppError, AppResult};

/// Client for the insights gateway microservice
#[derive(Clone)]
pub struct InsightsGatewayClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Mode A request: a question plus the pre-aggregated sales slice
#[derive(Debug, Serialize)]
pub struct SalesAnalysisRequest {
    pub natural_language_query: String,
    pub sales_data: Vec<ProductSalesSummary>,
}

/// Mode B request: the full business snapshot plus an optional focus
#[derive(Debug, Serialize)]
pub struct BusinessAnalysisRequest {
    pub wholesale_data: WholesaleSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_focus: Option<String>,
}

impl InsightsGatewayClient {
    /// Create a new insights gateway client
    pub fn new(api_endpoint: String, api_key: String) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint,
            api_key,
            http_client,
        })
    }

    /// Mode A: answer a natural-language question over the sales aggregate
    pub async fn analyze_sales(
        &self,
        request: SalesAnalysisRequest,
    ) -> AppResult<SalesInsightsAnswer> {
        let url = format!("{}/insights/sales", self.api_endpoint);
        let answer: SalesInsightsAnswer = self.post_json(&url, &request).await?;

        if answer.summary.trim().is_empty() {
            return Err(AppError::InsightsEmptyResponse);
        }

        Ok(answer)
    }

    /// Mode B: open-ended business analysis over the full snapshot
    pub async fn analyze_business(
        &self,
        request: BusinessAnalysisRequest,
    ) -> AppResult<BusinessAnalysis> {
        let url = format!("{}/insights/business", self.api_endpoint);
        let analysis: BusinessAnalysis = self.post_json(&url, &request).await?;

        if analysis.insights.trim().is_empty() {
            return Err(AppError::InsightsEmptyResponse);
        }

        Ok(analysis)
    }

    async fn post_json<Req, Resp>(&self, url: &str, request: &Req) -> AppResult<Resp>
    where
        Req: Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::InsightsGateway(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::InsightsGateway(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::InsightsGateway(format!("Failed to parse response: {}", e)))
    }
}
