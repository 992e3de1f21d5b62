use crate::domain::params::{AccountScope, LookbackWindow, PaymentOption, SavingsPlansType, Term};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recommendation records are carried as raw JSON maps end to end: the
/// flattener is schema-agnostic and the provider adds fields over time.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavingsPlansRecommendationRequest {
    pub savings_plans_type: SavingsPlansType,
    pub term_in_years: Term,
    pub payment_option: PaymentOption,
    pub account_scope: AccountScope,
    pub lookback_period_in_days: LookbackWindow,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavingsPlansRecommendationResponse {
    #[serde(default)]
    pub savings_plans_purchase_recommendation: Option<SavingsPlansPurchaseRecommendation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavingsPlansPurchaseRecommendation {
    #[serde(default)]
    pub savings_plans_purchase_recommendation_details: Vec<RawRecord>,
}

impl SavingsPlansRecommendationResponse {
    /// First recommendation detail record, if the provider produced any.
    pub fn into_first_detail(self) -> Option<RawRecord> {
        self.savings_plans_purchase_recommendation?
            .savings_plans_purchase_recommendation_details
            .into_iter()
            .next()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationRecommendationRequest {
    pub lookback_period_in_days: LookbackWindow,
    pub term_in_years: Term,
    pub payment_option: PaymentOption,
    pub service: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationRecommendationResponse {
    #[serde(default)]
    pub recommendations: Vec<RawRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountAliasesResponse {
    #[serde(default)]
    pub account_aliases: Vec<String>,
}
