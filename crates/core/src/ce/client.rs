use crate::ce::types::{
    AccountAliasesResponse, ReservationRecommendationRequest, ReservationRecommendationResponse,
    SavingsPlansRecommendationRequest, SavingsPlansRecommendationResponse,
};
use crate::config::Settings;
use crate::domain::account::AccountContext;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SAVINGS_PLANS_PATH: &str = "/v1/savings-plans-purchase-recommendation";
const RESERVATIONS_PATH: &str = "/v1/reservation-purchase-recommendation";
const ACCOUNT_ALIASES_PATH: &str = "/v1/account-aliases";

/// Cost Explorer query boundary. One call per (account, parameter combination);
/// the implementation resolves credentials from the account's profile name.
#[async_trait::async_trait]
pub trait CostExplorerApi: Send + Sync {
    async fn savings_plans_recommendation(
        &self,
        account: &AccountContext,
        req: &SavingsPlansRecommendationRequest,
    ) -> Result<SavingsPlansRecommendationResponse>;

    async fn reservation_recommendation(
        &self,
        account: &AccountContext,
        req: &ReservationRecommendationRequest,
    ) -> Result<ReservationRecommendationResponse>;

    async fn account_aliases(&self, account: &AccountContext) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct HttpCostExplorerApi {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCostExplorerApi {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_cost_explorer_base_url()?.to_string();
        let api_key = settings.cost_explorer_api_key.clone();

        let timeout_secs = std::env::var("COST_EXPLORER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build cost explorer http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self, account: &AccountContext) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        headers.insert(
            "x-account-profile",
            HeaderValue::from_str(&account.profile)
                .with_context(|| format!("profile is not a valid header value: {}", account.profile))?,
        );
        Ok(headers)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        account: &AccountContext,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let headers = self.headers(account)?;

        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .with_context(|| format!("cost explorer request failed ({path})"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read cost explorer response")?;
        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("cost explorer response is not valid JSON: {text}"))?;

        if !status.is_success() {
            anyhow::bail!("cost explorer HTTP {status} ({path}): {raw_json}");
        }

        serde_json::from_value::<T>(raw_json)
            .with_context(|| format!("failed to parse cost explorer response ({path})"))
    }
}

#[async_trait::async_trait]
impl CostExplorerApi for HttpCostExplorerApi {
    async fn savings_plans_recommendation(
        &self,
        account: &AccountContext,
        req: &SavingsPlansRecommendationRequest,
    ) -> Result<SavingsPlansRecommendationResponse> {
        tracing::debug!(
            profile = %account.profile,
            term = %req.term_in_years,
            payment_option = %req.payment_option,
            "querying savings plans recommendation"
        );
        self.post_json(account, SAVINGS_PLANS_PATH, req).await
    }

    async fn reservation_recommendation(
        &self,
        account: &AccountContext,
        req: &ReservationRecommendationRequest,
    ) -> Result<ReservationRecommendationResponse> {
        tracing::debug!(
            profile = %account.profile,
            service = %req.service,
            term = %req.term_in_years,
            payment_option = %req.payment_option,
            "querying reservation recommendation"
        );
        self.post_json(account, RESERVATIONS_PATH, req).await
    }

    async fn account_aliases(&self, account: &AccountContext) -> Result<Vec<String>> {
        let res: AccountAliasesResponse = self
            .post_json(account, ACCOUNT_ALIASES_PATH, &serde_json::json!({}))
            .await?;
        Ok(res.account_aliases)
    }
}
