use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commitment term of a purchase recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "ONE_YEAR")]
    OneYear,
    #[serde(rename = "THREE_YEARS")]
    ThreeYears,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::OneYear => "ONE_YEAR",
            Term::ThreeYears => "THREE_YEARS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOption {
    #[serde(rename = "NO_UPFRONT")]
    NoUpfront,
    #[serde(rename = "PARTIAL_UPFRONT")]
    PartialUpfront,
    #[serde(rename = "ALL_UPFRONT")]
    AllUpfront,
}

impl PaymentOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOption::NoUpfront => "NO_UPFRONT",
            PaymentOption::PartialUpfront => "PARTIAL_UPFRONT",
            PaymentOption::AllUpfront => "ALL_UPFRONT",
        }
    }
}

/// Historical usage window the provider analyzes for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookbackWindow {
    #[serde(rename = "SEVEN_DAYS")]
    SevenDays,
    #[serde(rename = "THIRTY_DAYS")]
    ThirtyDays,
    #[serde(rename = "SIXTY_DAYS")]
    SixtyDays,
}

impl LookbackWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackWindow::SevenDays => "SEVEN_DAYS",
            LookbackWindow::ThirtyDays => "THIRTY_DAYS",
            LookbackWindow::SixtyDays => "SIXTY_DAYS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountScope {
    #[serde(rename = "PAYER")]
    Payer,
    #[serde(rename = "LINKED")]
    Linked,
}

impl AccountScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountScope::Payer => "PAYER",
            AccountScope::Linked => "LINKED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavingsPlansType {
    #[serde(rename = "COMPUTE_SP")]
    ComputeSp,
    #[serde(rename = "EC2_INSTANCE_SP")]
    Ec2InstanceSp,
    #[serde(rename = "SAGEMAKER_SP")]
    SagemakerSp,
}

impl SavingsPlansType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsPlansType::ComputeSp => "COMPUTE_SP",
            SavingsPlansType::Ec2InstanceSp => "EC2_INSTANCE_SP",
            SavingsPlansType::SagemakerSp => "SAGEMAKER_SP",
        }
    }
}

macro_rules! impl_param_strings {
    ($($ty:ident),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = anyhow::Error;

                // Accepts the wire spelling case-insensitively, with `-` or `_`.
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
                    serde_json::from_value(serde_json::Value::String(normalized))
                        .map_err(|_| anyhow::anyhow!(concat!("invalid ", stringify!($ty), ": {}"), s))
                }
            }
        )+
    };
}

impl_param_strings!(
    Term,
    PaymentOption,
    LookbackWindow,
    AccountScope,
    SavingsPlansType
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_spelling() {
        assert_eq!(
            serde_json::to_value(Term::ThreeYears).unwrap(),
            serde_json::json!("THREE_YEARS")
        );
        assert_eq!(
            serde_json::to_value(PaymentOption::NoUpfront).unwrap(),
            serde_json::json!("NO_UPFRONT")
        );
    }

    #[test]
    fn from_str_accepts_flag_spellings() {
        assert_eq!("one_year".parse::<Term>().unwrap(), Term::OneYear);
        assert_eq!("THREE-YEARS".parse::<Term>().unwrap(), Term::ThreeYears);
        assert_eq!(
            " partial_upfront ".parse::<PaymentOption>().unwrap(),
            PaymentOption::PartialUpfront
        );
        assert_eq!(
            "sixty-days".parse::<LookbackWindow>().unwrap(),
            LookbackWindow::SixtyDays
        );
        assert!("FOUR_YEARS".parse::<Term>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(LookbackWindow::ThirtyDays.to_string(), "THIRTY_DAYS");
        assert_eq!(SavingsPlansType::ComputeSp.to_string(), "COMPUTE_SP");
    }
}
