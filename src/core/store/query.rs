//! Query builder shared by entity stores and static reference catalogues.
//!
//! A [`Query`] is a conjunction of filters, an optional ordering and an
//! optional limit. Ordering is a stable sort, so ties keep insertion order,
//! and the limit truncates the already filtered and sorted sequence.

use chrono::NaiveDate;
use std::cmp::Ordering;

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;
type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a>;

/// Filter, order and limit over a homogeneous record family.
pub struct Query<'a, T> {
    filters: Vec<Predicate<'a, T>>,
    order: Option<Comparator<'a, T>>,
    limit: Option<usize>,
}

impl<'a, T> Query<'a, T> {
    /// A query matching every record in insertion order.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add a predicate. All predicates must hold for a record to match.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'a) -> Self {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Add a predicate only when `value` is present.
    pub fn filter_opt<V>(self, value: Option<V>, predicate: impl Fn(&T, &V) -> bool + Send + Sync + 'a) -> Self
    where
        V: Send + Sync + 'a,
    {
        match value {
            Some(value) => self.filter(move |record| predicate(record, &value)),
            None => self,
        }
    }

    /// Sort matches with a stable comparator.
    pub fn order_by(mut self, compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'a) -> Self {
        self.order = Some(Box::new(compare));
        self
    }

    /// Truncate the result. `None` leaves it unbounded.
    pub fn limit(mut self, limit: impl Into<Option<usize>>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Whether a single record passes every filter.
    pub fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|predicate| predicate(record))
    }

    /// Run the query over any borrowed sequence of records.
    pub fn apply<'r>(&self, records: impl IntoIterator<Item = &'r T>) -> Vec<T>
    where
        T: Clone + 'r,
    {
        let mut matched: Vec<T> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();

        if let Some(compare) = &self.order {
            matched.sort_by(|a, b| compare(a, b));
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }

        matched
    }
}

impl<T> Default for Query<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive exact match.
pub fn text_eq(value: &str, wanted: &str) -> bool {
    value.to_lowercase() == wanted.to_lowercase()
}

/// Case-insensitive substring match.
pub fn text_contains(value: &str, needle: &str) -> bool {
    value.to_lowercase().contains(&needle.to_lowercase())
}

/// Inclusive date range check; missing bounds are open.
pub fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        rank: u8,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "a", rank: 2 },
            Row { name: "b", rank: 1 },
            Row { name: "c", rank: 2 },
            Row { name: "d", rank: 1 },
        ]
    }

    #[test]
    fn test_stable_order_keeps_insertion_order_on_ties() {
        let rows = rows();
        let result = Query::new().order_by(|a: &Row, b: &Row| a.rank.cmp(&b.rank)).apply(&rows);
        let names: Vec<_> = result.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_limit_truncates_after_filter_and_sort() {
        let rows = rows();
        let result = Query::new()
            .filter(|r: &Row| r.name != "b")
            .order_by(|a: &Row, b: &Row| a.rank.cmp(&b.rank))
            .limit(2)
            .apply(&rows);
        let names: Vec<_> = result.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["d", "a"]);
    }

    #[test]
    fn test_filter_opt_skips_missing_values() {
        let rows = rows();
        let all = Query::new()
            .filter_opt(None::<u8>, |r: &Row, rank| r.rank == *rank)
            .apply(&rows);
        assert_eq!(all.len(), 4);

        let ones = Query::new()
            .filter_opt(Some(1u8), |r: &Row, rank| r.rank == *rank)
            .apply(&rows);
        assert_eq!(ones.len(), 2);
    }

    #[test]
    fn test_text_helpers_ignore_case() {
        assert!(text_eq("Food", "food"));
        assert!(!text_eq("Food", "foo"));
        assert!(text_contains("Fruits & Vegetables", "veg"));
    }

    #[test]
    fn test_within_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        assert!(within(d(10), Some(d(10)), Some(d(10))));
        assert!(!within(d(9), Some(d(10)), None));
        assert!(within(d(9), None, None));
    }
}
