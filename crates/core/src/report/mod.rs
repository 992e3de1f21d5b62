pub mod flatten;
pub mod reservations;
pub mod savings_plans;
pub mod workbook;

use crate::ce::CostExplorerApi;
use crate::domain::account::AccountContext;
use crate::domain::params::{AccountScope, LookbackWindow, PaymentOption, Term};
use anyhow::Result;

/// Substring that selects the heatmap column in a flattened row: the first
/// label containing it gets the 3-color-scale treatment.
pub const HEATMAP_LABEL_MARKER: &str = "Percentage";

/// Parameter space one report run traverses. Defaults match the standard run:
/// both terms, no-upfront and partial-upfront, thirty-day lookback, linked
/// account scope, and the default/billing profiles excluded by policy.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub terms: Vec<Term>,
    pub payment_options: Vec<PaymentOption>,
    pub lookback: LookbackWindow,
    pub account_scope: AccountScope,
    pub ignored_profiles: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            terms: vec![Term::OneYear, Term::ThreeYears],
            payment_options: vec![PaymentOption::NoUpfront, PaymentOption::PartialUpfront],
            lookback: LookbackWindow::ThirtyDays,
            account_scope: AccountScope::Linked,
            ignored_profiles: vec!["default".to_string(), "Billing".to_string()],
        }
    }
}

impl ReportOptions {
    pub fn is_ignored(&self, profile: &str) -> bool {
        self.ignored_profiles.iter().any(|p| p == profile)
    }
}

/// Display alias for the account, resolved per fetch. Accounts without a
/// configured alias fall back to the profile name.
pub(crate) async fn resolve_alias(
    api: &dyn CostExplorerApi,
    account: &AccountContext,
) -> Result<String> {
    let aliases = api.account_aliases(account).await?;
    Ok(aliases
        .into_iter()
        .next()
        .unwrap_or_else(|| account.profile.clone()))
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::ce::types::{
        ReservationRecommendationRequest, ReservationRecommendationResponse,
        SavingsPlansRecommendationRequest, SavingsPlansRecommendationResponse,
    };
    use crate::ce::CostExplorerApi;
    use crate::domain::account::AccountContext;
    use anyhow::Result;
    use serde_json::Value;
    use std::collections::BTreeMap;

    /// Canned-response stand-in for the query service. Keyed by profile name;
    /// profiles with no entry get the empty "no recommendation" response.
    #[derive(Debug, Default)]
    pub struct FakeCostExplorer {
        pub savings_plans: BTreeMap<String, Value>,
        pub reservations: BTreeMap<String, Value>,
        pub aliases: BTreeMap<String, Vec<String>>,
        pub fail_savings_plans: bool,
        pub fail_reservations: bool,
    }

    #[async_trait::async_trait]
    impl CostExplorerApi for FakeCostExplorer {
        async fn savings_plans_recommendation(
            &self,
            account: &AccountContext,
            _req: &SavingsPlansRecommendationRequest,
        ) -> Result<SavingsPlansRecommendationResponse> {
            if self.fail_savings_plans {
                anyhow::bail!("savings plans query transport failure");
            }
            match self.savings_plans.get(&account.profile) {
                Some(v) => Ok(serde_json::from_value(v.clone())?),
                None => Ok(SavingsPlansRecommendationResponse::default()),
            }
        }

        async fn reservation_recommendation(
            &self,
            account: &AccountContext,
            _req: &ReservationRecommendationRequest,
        ) -> Result<ReservationRecommendationResponse> {
            if self.fail_reservations {
                anyhow::bail!("reservation query transport failure");
            }
            match self.reservations.get(&account.profile) {
                Some(v) => Ok(serde_json::from_value(v.clone())?),
                None => Ok(ReservationRecommendationResponse::default()),
            }
        }

        async fn account_aliases(&self, account: &AccountContext) -> Result<Vec<String>> {
            Ok(self
                .aliases
                .get(&account.profile)
                .cloned()
                .unwrap_or_default())
        }
    }
}
