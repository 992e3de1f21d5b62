use crate::ce::types::{RawRecord, ReservationRecommendationRequest};
use crate::ce::CostExplorerApi;
use crate::domain::account::AccountContext;
use crate::domain::params::{LookbackWindow, PaymentOption, Term};
use crate::report::flatten::{flatten_detail_item, flatten_scalars};
use crate::report::workbook::ReportWorkbook;
use crate::report::{resolve_alias, ReportOptions, HEATMAP_LABEL_MARKER};
use anyhow::Result;
use serde_json::Value;

/// Services the reservation section queries, one output sheet each.
/// Redshift, ElastiCache and OpenSearch reservations are not tracked.
pub const TRACKED_SERVICES: &[TrackedService] = &[
    TrackedService {
        service: "Amazon Elastic Compute Cloud - Compute",
        sheet: "RI EC2",
    },
    TrackedService {
        service: "Amazon Relational Database Service",
        sheet: "RI RDS",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct TrackedService {
    /// Service name as the provider spells it in requests.
    pub service: &'static str,
    pub sheet: &'static str,
}

/// A reservation recommendation split for emission: the record's scalar
/// fields (plus injected context) and the raw per-resource detail sequence.
#[derive(Debug, Clone)]
pub struct ReservationRecommendation {
    pub prefix: RawRecord,
    pub details: Vec<RawRecord>,
}

/// One reservation query for one parameter combination. Takes the first
/// recommendation, injects {alias, term, payment option} into its scalar
/// prefix and splits off the detail sequence. `None` when the provider
/// returned no recommendations.
pub async fn fetch_reservation_recommendation(
    api: &dyn CostExplorerApi,
    account: &AccountContext,
    service: &str,
    term: Term,
    payment_option: PaymentOption,
    lookback: LookbackWindow,
) -> Result<Option<ReservationRecommendation>> {
    let req = ReservationRecommendationRequest {
        lookback_period_in_days: lookback,
        term_in_years: term,
        payment_option,
        service: service.to_string(),
    };

    let res = api.reservation_recommendation(account, &req).await?;
    let Some(record) = res.recommendations.into_iter().next() else {
        return Ok(None);
    };

    let mut prefix = RawRecord::new();
    let mut details = Vec::new();
    for (key, value) in record {
        match value {
            Value::Array(items) if key.contains("RecommendationDetails") => {
                details = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(m) => Some(m),
                        _ => None,
                    })
                    .collect();
            }
            Value::Object(_) | Value::Array(_) => {}
            scalar => {
                prefix.insert(key, scalar);
            }
        }
    }

    let alias = resolve_alias(api, account).await?;
    prefix.insert("AccountAliases".to_string(), Value::String(alias));
    prefix.insert("Term".to_string(), Value::String(term.as_str().to_string()));
    prefix.insert(
        "PaymentOption".to_string(),
        Value::String(payment_option.as_str().to_string()),
    );

    Ok(Some(ReservationRecommendation { prefix, details }))
}

/// Reservation report section: every non-ignored account crossed with every
/// tracked service, payment option and term; one sheet per service, one row
/// per recommended resource.
pub async fn write_reservations_report(
    api: &dyn CostExplorerApi,
    accounts: &[AccountContext],
    opts: &ReportOptions,
    xl: &mut ReportWorkbook,
) -> Result<()> {
    for tracked in TRACKED_SERVICES {
        xl.add_worksheet(tracked.sheet)?;
    }

    for account in accounts {
        if opts.is_ignored(&account.profile) {
            continue;
        }

        for tracked in TRACKED_SERVICES {
            for &payment_option in &opts.payment_options {
                for &term in &opts.terms {
                    tracing::info!(
                        profile = %account.profile,
                        service = tracked.service,
                        term = %term,
                        "gathering reservation recommendations"
                    );

                    let rec = fetch_reservation_recommendation(
                        api,
                        account,
                        tracked.service,
                        term,
                        payment_option,
                        opts.lookback,
                    )
                    .await?;
                    let Some(rec) = rec else {
                        continue;
                    };

                    let prefix_row = flatten_scalars(&rec.prefix);
                    for item in &rec.details {
                        let mut row = prefix_row.clone();
                        row.extend(flatten_detail_item(item));

                        xl.add_header_row(tracked.sheet, &row.headers)?;
                        xl.add_row(tracked.sheet, &row)?;
                        if let Some(col) = row
                            .headers
                            .iter()
                            .position(|h| h.contains(HEATMAP_LABEL_MARKER))
                        {
                            xl.add_conditional_format_column(tracked.sheet, col as u16)?;
                        }
                        xl.add_autofilter(tracked.sheet, (row.len() - 1) as u16)?;
                    }
                }
            }
        }
    }

    Ok(())
}
