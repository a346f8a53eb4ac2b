//! Typed positional parameter binding.
//!
//! [`ParameterBinder`] is the seam between the key codec and a driver's
//! prepared statement. Positions are 1-based, as in JDBC-style drivers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::core::SqlValue;
use crate::error::Result;

/// Receiver of typed bind parameters.
pub trait ParameterBinder {
    fn set_int(&mut self, position: usize, value: i32) -> Result<()>;

    fn set_long(&mut self, position: usize, value: i64) -> Result<()>;

    fn set_string(&mut self, position: usize, value: &str) -> Result<()>;

    fn set_date(&mut self, position: usize, value: NaiveDate) -> Result<()>;

    fn set_time(&mut self, position: usize, value: NaiveTime) -> Result<()>;

    fn set_timestamp(&mut self, position: usize, value: DateTime<Utc>) -> Result<()>;
}

/// Binder that records parameters as [`SqlValue`]s.
///
/// Useful for handing the values to a driver later, or for inspecting what a
/// document id binds to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: Vec<Option<SqlValue<'static>>>,
}

impl BoundParameters {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, position: usize, value: SqlValue<'static>) {
        assert!(position >= 1, "parameter positions start at 1");
        if self.values.len() < position {
            self.values.resize(position, None);
        }
        self.values[position - 1] = Some(value);
    }

    /// Value bound at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&SqlValue<'static>> {
        position
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .and_then(Option::as_ref)
    }

    /// Highest bound position.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound values in position order as `(position, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SqlValue<'static>)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i + 1, v)))
    }

    /// Values in position order; unbound gaps become NULL.
    pub fn into_values(self) -> Vec<SqlValue<'static>> {
        self.values
            .into_iter()
            .map(|v| v.unwrap_or(SqlValue::Null))
            .collect()
    }
}

impl ParameterBinder for BoundParameters {
    fn set_int(&mut self, position: usize, value: i32) -> Result<()> {
        self.put(position, SqlValue::I32(value));
        Ok(())
    }

    fn set_long(&mut self, position: usize, value: i64) -> Result<()> {
        self.put(position, SqlValue::I64(value));
        Ok(())
    }

    fn set_string(&mut self, position: usize, value: &str) -> Result<()> {
        self.put(position, SqlValue::text_owned(value.to_string()));
        Ok(())
    }

    fn set_date(&mut self, position: usize, value: NaiveDate) -> Result<()> {
        self.put(position, SqlValue::Date(value));
        Ok(())
    }

    fn set_time(&mut self, position: usize, value: NaiveTime) -> Result<()> {
        self.put(position, SqlValue::Time(value));
        Ok(())
    }

    fn set_timestamp(&mut self, position: usize, value: DateTime<Utc>) -> Result<()> {
        self.put(position, SqlValue::Timestamp(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_parameters_positions_are_one_based() {
        let mut params = BoundParameters::new();
        params.set_string(2, "b").unwrap();
        params.set_int(1, 7).unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get(1), Some(&SqlValue::I32(7)));
        assert_eq!(params.get(2), Some(&SqlValue::from("b")));
        assert_eq!(params.get(0), None);
        assert_eq!(params.get(3), None);
    }

    #[test]
    fn test_gaps_become_null() {
        let mut params = BoundParameters::new();
        params.set_long(3, 9).unwrap();
        let positions: Vec<usize> = params.iter().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![3]);
        assert_eq!(
            params.into_values(),
            vec![SqlValue::Null, SqlValue::Null, SqlValue::I64(9)]
        );
    }

    #[test]
    #[should_panic(expected = "positions start at 1")]
    fn test_position_zero_panics() {
        let mut params = BoundParameters::new();
        let _ = params.set_int(0, 1);
    }
}
