use crate::ce::types::{RawRecord, SavingsPlansRecommendationRequest};
use crate::ce::CostExplorerApi;
use crate::domain::account::AccountContext;
use crate::domain::params::{AccountScope, LookbackWindow, PaymentOption, SavingsPlansType, Term};
use crate::report::flatten::flatten_record;
use crate::report::workbook::ReportWorkbook;
use crate::report::{resolve_alias, ReportOptions, HEATMAP_LABEL_MARKER};
use anyhow::Result;
use serde_json::Value;

pub const SAVINGS_PLANS_SHEET: &str = "Savings Plans";

/// One savings-plan query for one parameter combination. Returns the first
/// recommendation detail enriched with the account alias and the parameters
/// that produced it, or `None` when the provider has nothing to suggest.
pub async fn fetch_savings_plans_recommendation(
    api: &dyn CostExplorerApi,
    account: &AccountContext,
    term: Term,
    payment_option: PaymentOption,
    account_scope: AccountScope,
    lookback: LookbackWindow,
) -> Result<Option<RawRecord>> {
    let req = SavingsPlansRecommendationRequest {
        savings_plans_type: SavingsPlansType::ComputeSp,
        term_in_years: term,
        payment_option,
        account_scope,
        lookback_period_in_days: lookback,
    };

    let res = api.savings_plans_recommendation(account, &req).await?;
    let Some(mut record) = res.into_first_detail() else {
        return Ok(None);
    };

    let alias = resolve_alias(api, account).await?;
    record.insert("AccountAliases".to_string(), Value::String(alias));
    record.insert(
        "Term".to_string(),
        Value::String(term.as_str().to_string()),
    );
    record.insert(
        "PaymentOption".to_string(),
        Value::String(payment_option.as_str().to_string()),
    );
    Ok(Some(record))
}

/// Savings-plan report section: every non-ignored account crossed with every
/// payment option and term, one sheet, one row per recommendation.
pub async fn write_savings_plans_report(
    api: &dyn CostExplorerApi,
    accounts: &[AccountContext],
    opts: &ReportOptions,
    xl: &mut ReportWorkbook,
) -> Result<()> {
    xl.add_worksheet(SAVINGS_PLANS_SHEET)?;

    for account in accounts {
        if opts.is_ignored(&account.profile) {
            continue;
        }
        tracing::info!(profile = %account.profile, "gathering savings plans recommendations");

        for &payment_option in &opts.payment_options {
            for &term in &opts.terms {
                let record = fetch_savings_plans_recommendation(
                    api,
                    account,
                    term,
                    payment_option,
                    opts.account_scope,
                    opts.lookback,
                )
                .await?;
                let Some(record) = record else {
                    continue;
                };

                for row in flatten_record(&record) {
                    xl.add_header_row(SAVINGS_PLANS_SHEET, &row.headers)?;
                    xl.add_row(SAVINGS_PLANS_SHEET, &row)?;
                    if let Some(col) = row
                        .headers
                        .iter()
                        .position(|h| h.contains(HEATMAP_LABEL_MARKER))
                    {
                        xl.add_conditional_format_column(SAVINGS_PLANS_SHEET, col as u16)?;
                    }
                    xl.add_autofilter(SAVINGS_PLANS_SHEET, (row.len() - 1) as u16)?;
                }
            }
        }
    }

    Ok(())
}
