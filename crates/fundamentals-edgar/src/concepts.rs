//! Candidate `us-gaap` tags for commonly requested metrics.
//!
//! Filers disclose the same line item under different tags, and switch tags
//! across taxonomy years. Each list is in preference order; the engine still
//! lets the tag with the widest coverage lead.

use fundamentals_core::{MetricSpec, SeriesBasis};

/// Net cash from operating activities.
pub const OPERATING_CASH_FLOW: &[&str] = &[
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
    "CashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInOperatingActivitiesDomesticOperations",
];

/// Purchases of property, plant and equipment.
pub const CAPITAL_EXPENDITURE: &[&str] = &[
    "PaymentsToAcquirePropertyPlantAndEquipment",
    "PaymentsForPropertyPlantAndEquipment",
    "PaymentsToAcquireProductiveAssets",
    "CapitalExpenditures",
    "PurchaseOfPropertyAndEquipment",
    "AcquisitionOfPropertyPlantAndEquipment",
    "PaymentsToAcquireFixedAssets",
    "PaymentsForCapitalExpenditures",
    // Bundles intangibles with PP&E.
    "CapitalExpendituresFixedAssetsIntangibleAssets",
];

/// Gross profit.
pub const GROSS_PROFIT: &[&str] = &["GrossProfit", "GrossProfitLoss"];

/// Operating income.
pub const OPERATING_INCOME: &[&str] = &["OperatingIncomeLoss", "OperatingIncome"];

/// Net income.
pub const NET_INCOME: &[&str] = &[
    "NetIncomeLoss",
    "ProfitLoss",
    "NetIncomeLossAvailableToCommonStockholdersBasic",
];

/// Interest expense.
pub const INTEREST_EXPENSE: &[&str] = &["InterestExpenseNonoperating", "InterestExpense"];

/// Operating cash flow, reported year-to-date.
#[must_use]
pub fn cfoa() -> MetricSpec {
    MetricSpec::new("cfoa", OPERATING_CASH_FLOW.iter().copied()).with_basis(SeriesBasis::YearToDate)
}

/// Capital expenditure. Some filers report it negative.
#[must_use]
pub fn capex() -> MetricSpec {
    MetricSpec::new("capex", CAPITAL_EXPENDITURE.iter().copied())
        .sign_ambiguous()
        .with_basis(SeriesBasis::YearToDate)
}

/// Gross profit, year-to-date chain.
#[must_use]
pub fn gross_profit() -> MetricSpec {
    MetricSpec::new("gross_profit", GROSS_PROFIT.iter().copied()).with_basis(SeriesBasis::YearToDate)
}

/// Operating income, year-to-date chain.
#[must_use]
pub fn operating_income() -> MetricSpec {
    MetricSpec::new("operating_income", OPERATING_INCOME.iter().copied())
        .with_basis(SeriesBasis::YearToDate)
}

/// Net income, year-to-date chain.
#[must_use]
pub fn net_income() -> MetricSpec {
    MetricSpec::new("net_income", NET_INCOME.iter().copied()).with_basis(SeriesBasis::YearToDate)
}

/// Interest expense, filed as three-month quarters plus the fiscal year.
#[must_use]
pub fn interest_expense() -> MetricSpec {
    MetricSpec::new("interest_expense", INTEREST_EXPENSE.iter().copied())
}

/// Operating cash flow and capital expenditure.
#[must_use]
pub fn cash_flow_metrics() -> Vec<MetricSpec> {
    vec![cfoa(), capex()]
}

/// Gross profit, operating income and net income.
#[must_use]
pub fn income_metrics() -> Vec<MetricSpec> {
    vec![gross_profit(), operating_income(), net_income()]
}

/// Looks up a catalog metric by name.
#[must_use]
pub fn lookup(name: &str) -> Option<MetricSpec> {
    match name {
        "cfoa" => Some(cfoa()),
        "capex" => Some(capex()),
        "gross_profit" => Some(gross_profit()),
        "operating_income" => Some(operating_income()),
        "net_income" => Some(net_income()),
        "interest_expense" => Some(interest_expense()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("capex"), Some(capex()));
        assert_eq!(lookup("interest_expense").unwrap().basis, SeriesBasis::Classified);
        assert!(lookup("ebitda").is_none());
    }

    #[test]
    fn test_only_capex_is_sign_ambiguous() {
        let mut all = cash_flow_metrics();
        all.extend(income_metrics());
        all.push(interest_expense());
        let ambiguous: Vec<_> = all.iter().filter(|m| m.sign_ambiguous).map(|m| m.name.as_str()).collect();
        assert_eq!(ambiguous, vec!["capex"]);
    }

    #[test]
    fn test_candidates_preserve_preference_order() {
        let spec = cfoa();
        assert_eq!(spec.candidates.len(), OPERATING_CASH_FLOW.len());
        assert_eq!(spec.candidates[0], "NetCashProvidedByUsedInOperatingActivities");
        assert!(!spec.required);
    }
}
