//! Sales reports answered by the wide-column store.
//!
//! Each query reads exactly the table whose partition and clustering keys
//! match it, so no result is ever sorted after the fact.

use std::sync::Arc;

use tracing::debug;

use crate::application::projection::column::{
    SALES_BY_MONTH, SALES_BY_RESTAURANT, SALES_BY_TOTAL,
};
use crate::domain::{
    Measure, Month, QueryNotFound, QueryOutcome, Report, ReportRow, StoreKind,
};
use crate::error::StoreError;
use crate::port::inbound::SalesQuery;
use crate::port::outbound::column::{CqlValue, Relation, Row, Statement};
use crate::port::outbound::ColumnStore;

const TOP: usize = 3;

/// Source of "the current month".
pub trait Clock: Send + Sync {
    fn current_month(&self) -> Month;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_month(&self) -> Month {
        Month::current()
    }
}

/// A clock stuck on one month.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Month);

impl Clock for FixedClock {
    fn current_month(&self) -> Month {
        self.0
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a CqlValue, StoreError> {
    row.get(name).ok_or_else(|| {
        StoreError::unavailable(StoreKind::Column, format!("result row lacks column {name}"))
    })
}

/// `(restaurant, amount, month)` as a report row.
fn sales_row(row: &Row) -> Result<ReportRow, StoreError> {
    let restaurant = column(row, "restaurant")?.as_text().unwrap_or_default();
    let amount = column(row, "total_sales")?.as_bigint().unwrap_or_default();
    let mut out = ReportRow::new(restaurant, Measure::Sales(amount));
    if let Some(month) = column(row, "month")?.as_text().and_then(Month::resolve) {
        out = out.with_secondary(Measure::Month(month));
    }
    Ok(out)
}

fn select(
    table: &'static str,
    restrictions: Vec<(&'static str, Relation)>,
    limit: Option<usize>,
) -> Statement {
    Statement::Select {
        table,
        columns: vec!["restaurant", "month", "total_sales"],
        restrictions,
        limit,
    }
}

pub struct ColumnQueries {
    store: Arc<dyn ColumnStore>,
    clock: Arc<dyn Clock>,
}

impl ColumnQueries {
    #[must_use]
    pub fn new(store: Arc<dyn ColumnStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn run(&self, query: &SalesQuery) -> Result<QueryOutcome, StoreError> {
        debug!(?query, "Sales query");
        match query {
            SalesQuery::CurrentMonth => self.month(self.clock.current_month(), None).await,
            SalesQuery::CurrentMonthTop => {
                self.month(self.clock.current_month(), Some(TOP)).await
            }
            SalesQuery::All => self.all().await,
            SalesQuery::ByMonth { month } => match Month::resolve(month) {
                Some(m) => self.month(m, None).await,
                None => Ok(QueryNotFound::Month(month.clone()).into()),
            },
            SalesQuery::ByRestaurant { restaurant } => self.restaurant(restaurant, None).await,
            SalesQuery::ByRestaurantAndMonth { restaurant, month } => {
                match Month::resolve(month) {
                    Some(m) => self.restaurant(restaurant, Some(m)).await,
                    None => Ok(QueryNotFound::Month(month.clone()).into()),
                }
            }
            SalesQuery::InRange { min, max } => self.range(*min, *max).await,
        }
    }

    async fn rows(
        &self,
        statement: &Statement,
        values: &[CqlValue],
    ) -> Result<Vec<ReportRow>, StoreError> {
        self.store
            .execute(statement, values)
            .await?
            .iter()
            .map(sales_row)
            .collect()
    }

    /// One month's sales. With a limit, the highest amounts first; without,
    /// every restaurant in name order.
    async fn month(
        &self,
        month: Month,
        top: Option<usize>,
    ) -> Result<QueryOutcome, StoreError> {
        let (table, title) = match top {
            Some(n) => (SALES_BY_TOTAL, format!("Top {n} sales for {month}")),
            None => (SALES_BY_MONTH, format!("Sales for {month}")),
        };
        let statement = select(table, vec![("month", Relation::Eq)], top);
        let rows = self.rows(&statement, &[month.as_str().into()]).await?;
        Ok(Report::new(title, rows).into())
    }

    /// Every fact, month by month in calendar order.
    async fn all(&self) -> Result<QueryOutcome, StoreError> {
        let statement = select(SALES_BY_MONTH, vec![("month", Relation::Eq)], None);
        let mut rows = Vec::new();
        for month in Month::ALL {
            rows.extend(self.rows(&statement, &[month.as_str().into()]).await?);
        }
        Ok(Report::new("All monthly sales", rows).into())
    }

    async fn restaurant(
        &self,
        restaurant: &str,
        month: Option<Month>,
    ) -> Result<QueryOutcome, StoreError> {
        let mut restrictions = vec![("restaurant", Relation::Eq)];
        let mut values = vec![CqlValue::from(restaurant)];
        if let Some(m) = month {
            restrictions.push(("month_number", Relation::Eq));
            values.push(CqlValue::BigInt(i64::from(m.number())));
        }
        let statement = select(SALES_BY_RESTAURANT, restrictions, None);
        let rows = self.rows(&statement, &values).await?;
        if rows.is_empty() {
            return Ok(QueryNotFound::Restaurant(restaurant.to_string()).into());
        }
        let title = match month {
            Some(m) => format!("Sales of {restaurant} in {m}"),
            None => format!("Sales of {restaurant}"),
        };
        Ok(Report::new(title, rows).into())
    }

    /// Facts whose amount lies in `[min, max]`, highest first within each
    /// month, months in calendar order.
    async fn range(&self, min: i64, max: i64) -> Result<QueryOutcome, StoreError> {
        let title = format!("Sales between {min} and {max}");
        if min > max {
            return Ok(Report::new(title, Vec::new()).into());
        }
        let statement = select(
            SALES_BY_TOTAL,
            vec![
                ("month", Relation::Eq),
                ("total_sales", Relation::Gte),
                ("total_sales", Relation::Lte),
            ],
            None,
        );
        let mut rows = Vec::new();
        for month in Month::ALL {
            let values = [
                month.as_str().into(),
                CqlValue::BigInt(min),
                CqlValue::BigInt(max),
            ];
            rows.extend(self.rows(&statement, &values).await?);
        }
        Ok(Report::new(title, rows).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::stores::{loaded, Loaded};

    fn queries(loaded: &Loaded, month: Month) -> ColumnQueries {
        ColumnQueries::new(loaded.stores.column.clone(), Arc::new(FixedClock(month)))
    }

    fn amounts(outcome: &QueryOutcome) -> Vec<i64> {
        outcome
            .report()
            .unwrap()
            .rows
            .iter()
            .map(|r| match r.metric {
                Measure::Sales(n) => n,
                _ => panic!("unexpected metric"),
            })
            .collect()
    }

    #[tokio::test]
    async fn month_names_in_both_languages_and_numerals_agree() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::June);
        let by_month = |month: &str| SalesQuery::ByMonth {
            month: month.into(),
        };
        let spanish = q.run(&by_month("enero")).await.unwrap();
        let english = q.run(&by_month("January")).await.unwrap();
        let numeral = q.run(&by_month(" 1 ")).await.unwrap();
        assert_eq!(spanish, english);
        assert_eq!(english, numeral);
        assert_eq!(
            spanish.report().unwrap().rows.len(),
            loaded.model.restaurants().len()
        );
    }

    #[tokio::test]
    async fn unresolvable_month_is_not_found() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::June);
        for bad in ["13", "0", "brumaire"] {
            let outcome = q
                .run(&SalesQuery::ByMonth { month: bad.into() })
                .await
                .unwrap();
            assert_eq!(
                outcome,
                QueryOutcome::NotFound(QueryNotFound::Month(bad.into()))
            );
        }
    }

    #[tokio::test]
    async fn current_month_top_is_sorted_by_amount() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let top = q.run(&SalesQuery::CurrentMonthTop).await.unwrap();
        let got = amounts(&top);

        let mut expected: Vec<i64> = loaded
            .model
            .restaurants()
            .iter()
            .map(|r| r.sales.amount(Month::March))
            .collect();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(3);
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn restaurant_sales_come_in_calendar_order() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let restaurant = &loaded.model.restaurants()[0];
        let outcome = q
            .run(&SalesQuery::ByRestaurant {
                restaurant: restaurant.name.clone(),
            })
            .await
            .unwrap();
        assert_eq!(amounts(&outcome), restaurant.sales.as_slice());
        let months: Vec<_> = outcome
            .report()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.secondary_metric.clone())
            .collect();
        assert_eq!(months[0], Some(Measure::Month(Month::January)));
        assert_eq!(months[11], Some(Measure::Month(Month::December)));
    }

    #[tokio::test]
    async fn restaurant_and_month_narrow_to_one_fact() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let restaurant = &loaded.model.restaurants()[0];
        let outcome = q
            .run(&SalesQuery::ByRestaurantAndMonth {
                restaurant: restaurant.name.clone(),
                month: "mayo".into(),
            })
            .await
            .unwrap();
        assert_eq!(amounts(&outcome), vec![restaurant.sales.amount(Month::May)]);
    }

    #[tokio::test]
    async fn unknown_restaurant_is_not_found() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let outcome = q
            .run(&SalesQuery::ByRestaurant {
                restaurant: "Nowhere".into(),
            })
            .await
            .unwrap();
        assert!(outcome.is_not_found());
    }

    #[tokio::test]
    async fn range_is_inclusive_at_both_ends() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let outcome = q
            .run(&SalesQuery::InRange { min: 100, max: 300 })
            .await
            .unwrap();
        let got = amounts(&outcome);
        assert!(got.contains(&100));
        assert!(got.contains(&300));
        assert!(got.iter().all(|a| (100..=300).contains(a)));

        let expected = loaded
            .model
            .sales_records()
            .filter(|f| (100..=300).contains(&f.amount))
            .count();
        assert_eq!(got.len(), expected);
    }

    #[tokio::test]
    async fn inverted_range_is_empty_not_an_error() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let outcome = q
            .run(&SalesQuery::InRange { min: 10, max: 1 })
            .await
            .unwrap();
        assert!(outcome.report().unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_sales_cover_every_fact() {
        let loaded = loaded(2).await;
        let q = queries(&loaded, Month::March);
        let outcome = q.run(&SalesQuery::All).await.unwrap();
        assert_eq!(
            outcome.report().unwrap().rows.len(),
            loaded.model.restaurants().len() * 12
        );
    }
}
