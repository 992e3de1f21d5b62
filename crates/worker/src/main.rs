use anyhow::Context;
use clap::Parser;
use costrec_core::ce::HttpCostExplorerApi;
use costrec_core::config::Settings;
use costrec_core::domain::account::AccountContext;
use costrec_core::domain::params::{LookbackWindow, PaymentOption, Term};
use costrec_core::report::reservations::write_reservations_report;
use costrec_core::report::savings_plans::write_savings_plans_report;
use costrec_core::report::workbook::{report_file_name, ReportWorkbook};
use costrec_core::report::ReportOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FILE_NAME_PREFIX: &str = "CostSavingRecommendations";

#[derive(Debug, Parser)]
#[command(name = "costrec_worker")]
struct Args {
    /// Commitment terms to evaluate (comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = [Term::OneYear, Term::ThreeYears])]
    terms: Vec<Term>,

    /// Payment options to evaluate (comma-separated).
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [PaymentOption::NoUpfront, PaymentOption::PartialUpfront]
    )]
    payment_options: Vec<PaymentOption>,

    /// Historical usage window the provider analyzes.
    #[arg(long, default_value_t = LookbackWindow::ThirtyDays)]
    lookback: LookbackWindow,

    /// Skip the savings-plan report section.
    #[arg(long)]
    skip_savings_plans: bool,

    /// Skip the reservation report section.
    #[arg(long)]
    skip_reservations: bool,

    /// Directory the dated workbook is written into.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    // Any fetch failure aborts the whole run: the workbook is only persisted
    // at the very end, so nothing partial is left behind.
    if let Err(err) = run(&settings, &args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "report run failed");
        return Err(err);
    }

    Ok(())
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    anyhow::ensure!(!args.terms.is_empty(), "at least one term is required");
    anyhow::ensure!(
        !args.payment_options.is_empty(),
        "at least one payment option is required"
    );

    let api = HttpCostExplorerApi::from_settings(settings)?;

    let accounts: Vec<AccountContext> = settings
        .require_account_profiles()?
        .iter()
        .map(|profile| AccountContext::new(profile.as_str()))
        .collect();

    let opts = ReportOptions {
        terms: args.terms.clone(),
        payment_options: args.payment_options.clone(),
        lookback: args.lookback,
        ignored_profiles: settings.ignored_profiles.clone(),
        ..ReportOptions::default()
    };

    let mut xl = ReportWorkbook::new();

    if args.skip_savings_plans {
        tracing::info!("skipping savings plans section");
    } else {
        write_savings_plans_report(&api, &accounts, &opts, &mut xl).await?;
    }

    if args.skip_reservations {
        tracing::info!("skipping reservations section");
    } else {
        write_reservations_report(&api, &accounts, &opts, &mut xl).await?;
    }

    let file_name = report_file_name(FILE_NAME_PREFIX, chrono::Local::now().date_naive());
    let path = args.output_dir.join(file_name);
    xl.save(&path)
        .with_context(|| format!("failed to write report to {}", path.display()))?;

    tracing::info!(path = %path.display(), "report saved");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
