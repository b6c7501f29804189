//! Derived views over the full record set: the active user's rows and the two aggregates that
//! drive the category pie and the vehicle bars.
//!
//! Nothing here is cached. Every call is a fresh pass over the records it is given.

use crate::model::{Amount, Category, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The records belonging to `user`, in storage order. The match is exact and case-sensitive.
pub fn filtered<'a>(records: &'a [Record], user: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| r.user() == user).collect()
}

/// The sum of all amounts, zero for no records.
pub fn total(filtered: &[&Record]) -> Amount {
    filtered.iter().map(|r| r.amount()).sum()
}

/// Summed amounts per category. Categories without records are omitted.
pub fn by_category(filtered: &[&Record]) -> BTreeMap<Category, Amount> {
    let mut sums = BTreeMap::new();
    for record in filtered {
        *sums.entry(record.category()).or_insert(Amount::ZERO) += record.amount();
    }
    sums
}

/// Summed amounts per vehicle. Vehicles without records are omitted.
pub fn by_vehicle(filtered: &[&Record]) -> BTreeMap<String, Amount> {
    let mut sums = BTreeMap::new();
    for record in filtered {
        *sums
            .entry(record.vehicle().to_string())
            .or_insert(Amount::ZERO) += record.amount();
    }
    sums
}

/// The distinct non-empty vehicle names across all users, for offering a previously used vehicle
/// instead of typing it again.
pub fn known_vehicles(records: &[Record]) -> BTreeSet<String> {
    records
        .iter()
        .map(|r| r.vehicle().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Newest first. Records on the same date keep their storage order.
pub fn sorted_for_display<'a>(filtered: &[&'a Record]) -> Vec<&'a Record> {
    let mut sorted = filtered.to_vec();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}

/// Everything the summary display needs for one user.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    user: String,
    rows: Vec<Record>,
    total: Amount,
    by_category: BTreeMap<Category, Amount>,
    by_vehicle: BTreeMap<String, Amount>,
    /// Each category's share of the total in percent, rounded to one decimal.
    shares: BTreeMap<Category, Decimal>,
}

impl Summary {
    pub fn new(records: &[Record], user: &str) -> Self {
        let mine = filtered(records, user);
        let total = total(&mine);
        let by_category = by_category(&mine);
        let shares = by_category
            .iter()
            .map(|(category, amount)| (*category, percent(*amount, total)))
            .collect();
        Self {
            user: user.to_string(),
            rows: sorted_for_display(&mine).into_iter().cloned().collect(),
            total,
            by_category,
            by_vehicle: by_vehicle(&mine),
            shares,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The user's records, newest first.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn by_category(&self) -> &BTreeMap<Category, Amount> {
        &self.by_category
    }

    pub fn by_vehicle(&self) -> &BTreeMap<String, Amount> {
        &self.by_vehicle
    }

    pub fn shares(&self) -> &BTreeMap<Category, Decimal> {
        &self.shares
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn percent(part: Amount, whole: Amount) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part.value() * Decimal::ONE_HUNDRED / whole.value()).round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn record(user: &str, day: u32, vehicle: &str, category: Category, value: &str) -> Record {
        Record::new(
            user,
            NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            vehicle,
            category,
            amount(value),
            "",
        )
    }

    fn scenario() -> Vec<Record> {
        vec![
            record("Ana", 1, "Golf", Category::Fuel, "50"),
            record("Ana", 2, "Golf", Category::Parking, "20"),
            record("Bo", 3, "Yaris", Category::Fuel, "100"),
        ]
    }

    #[test]
    fn test_scenario_ana() {
        let records = scenario();
        let ana = filtered(&records, "Ana");
        assert_eq!(ana, vec![&records[0], &records[1]]);
        assert_eq!(total(&ana), amount("70"));

        let mut expected = BTreeMap::new();
        expected.insert(Category::Fuel, amount("50"));
        expected.insert(Category::Parking, amount("20"));
        assert_eq!(by_category(&ana), expected);

        let mut expected = BTreeMap::new();
        expected.insert("Golf".to_string(), amount("70"));
        assert_eq!(by_vehicle(&ana), expected);
    }

    #[test]
    fn test_filtered_is_exact_and_case_sensitive() {
        let records = vec![
            record("Ana", 1, "Golf", Category::Fuel, "1"),
            record("ana", 2, "Golf", Category::Fuel, "2"),
            record("Ana ", 3, "Golf", Category::Fuel, "3"),
            record("Ana", 4, "Golf", Category::Fuel, "4"),
        ];
        let ana = filtered(&records, "Ana");
        assert_eq!(ana, vec![&records[0], &records[3]]);
    }

    #[test]
    fn test_empty_user_groups_under_empty_string() {
        let records = vec![
            record("", 1, "Golf", Category::Fuel, "1"),
            record("Ana", 2, "Golf", Category::Fuel, "2"),
        ];
        assert_eq!(filtered(&records, ""), vec![&records[0]]);
    }

    #[test]
    fn test_unknown_user() {
        let records = scenario();
        let nobody = filtered(&records, "Cy");
        assert!(nobody.is_empty());
        assert_eq!(total(&nobody), Amount::ZERO);
        assert!(by_category(&nobody).is_empty());
        assert!(by_vehicle(&nobody).is_empty());
    }

    #[test]
    fn test_aggregates_sum_to_total() {
        let records = vec![
            record("Ana", 1, "Golf", Category::Fuel, "50.10"),
            record("Ana", 2, "Golf", Category::Parking, "20.25"),
            record("Ana", 3, "Vespa", Category::Insurance, "310"),
            record("Ana", 4, "Vespa", Category::Fuel, "12.65"),
            record("Bo", 5, "Yaris", Category::Fuel, "100"),
        ];
        let ana = filtered(&records, "Ana");
        let total = total(&ana);
        assert_eq!(total, amount("393"));
        assert_eq!(by_category(&ana).values().sum::<Amount>(), total);
        assert_eq!(by_vehicle(&ana).values().sum::<Amount>(), total);
    }

    #[test]
    fn test_known_vehicles() {
        let records = vec![
            record("Ana", 1, "Golf", Category::Fuel, "1"),
            record("Ana", 1, "Golf", Category::Fuel, "1"),
            record("Bo", 1, "Yaris", Category::Fuel, "1"),
            record("Bo", 1, "", Category::Fuel, "1"),
        ];
        let expected: BTreeSet<String> = ["Golf", "Yaris"].iter().map(|s| s.to_string()).collect();
        assert_eq!(known_vehicles(&records), expected);
    }

    #[test]
    fn test_sorted_for_display_is_stable() {
        let records = vec![
            record("Ana", 1, "first", Category::Fuel, "1"),
            record("Ana", 9, "second", Category::Fuel, "1"),
            record("Ana", 1, "third", Category::Fuel, "1"),
            record("Ana", 5, "fourth", Category::Fuel, "1"),
        ];
        let ana = filtered(&records, "Ana");
        let vehicles: Vec<&str> = sorted_for_display(&ana)
            .iter()
            .map(|r| r.vehicle())
            .collect();
        assert_eq!(vehicles, vec!["second", "fourth", "first", "third"]);
    }

    #[test]
    fn test_summary() {
        let records = scenario();
        let summary = Summary::new(&records, "Ana");
        assert_eq!(summary.user(), "Ana");
        assert_eq!(summary.total(), amount("70"));
        assert_eq!(summary.rows()[0], records[1]);
        assert_eq!(summary.rows()[1], records[0]);
        assert_eq!(
            summary.shares().get(&Category::Fuel),
            Some(&Decimal::from_str("71.4").unwrap())
        );
        assert_eq!(
            summary.shares().get(&Category::Parking),
            Some(&Decimal::from_str("28.6").unwrap())
        );
    }

    #[test]
    fn test_summary_all_zero() {
        let records = vec![record("Ana", 1, "Golf", Category::Other, "0")];
        let summary = Summary::new(&records, "Ana");
        assert!(summary.total().is_zero());
        assert_eq!(
            summary.shares().get(&Category::Other),
            Some(&Decimal::ZERO)
        );
    }
}
