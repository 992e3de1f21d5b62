pub mod ce;
pub mod domain;
pub mod report;

pub mod config {
    use anyhow::Context;

    const DEFAULT_IGNORED_PROFILES: &[&str] = &["default", "Billing"];

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub cost_explorer_base_url: Option<String>,
        pub cost_explorer_api_key: Option<String>,
        pub account_profiles: Vec<String>,
        pub ignored_profiles: Vec<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                cost_explorer_base_url: std::env::var("COST_EXPLORER_BASE_URL").ok(),
                cost_explorer_api_key: std::env::var("COST_EXPLORER_API_KEY").ok(),
                account_profiles: split_profiles(std::env::var("ACCOUNT_PROFILES").ok()),
                ignored_profiles: std::env::var("IGNORED_ACCOUNT_PROFILES")
                    .ok()
                    .map(|s| split_profiles(Some(s)))
                    .unwrap_or_else(|| {
                        DEFAULT_IGNORED_PROFILES
                            .iter()
                            .map(|s| s.to_string())
                            .collect()
                    }),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_cost_explorer_base_url(&self) -> anyhow::Result<&str> {
            self.cost_explorer_base_url
                .as_deref()
                .context("COST_EXPLORER_BASE_URL is required")
        }

        pub fn require_account_profiles(&self) -> anyhow::Result<&[String]> {
            anyhow::ensure!(
                !self.account_profiles.is_empty(),
                "ACCOUNT_PROFILES is required (comma-separated profile names)"
            );
            Ok(&self.account_profiles)
        }
    }

    fn split_profiles(raw: Option<String>) -> Vec<String> {
        raw.map(|s| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
    }

    #[cfg(test)]
    mod tests {
        use super::split_profiles;

        #[test]
        fn split_profiles_trims_and_drops_empties() {
            let got = split_profiles(Some(" prod-main, prod-eu ,,dev ".to_string()));
            assert_eq!(got, vec!["prod-main", "prod-eu", "dev"]);
        }

        #[test]
        fn split_profiles_handles_absent_var() {
            assert!(split_profiles(None).is_empty());
        }
    }
}
