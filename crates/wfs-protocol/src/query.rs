//! Translation of a [`FeatureQueryFilter`] into parameterized SQL.
//!
//! Every request value is bound through a numbered placeholder (`?1`, `?2`,
//! ...). Slot names (`param0`, `param1`, ...) follow placeholder order, so
//! `params[i]` always binds to `?{i + 1}`.

use std::fmt;

use wfs_common::{WfsError, WfsResult};

use crate::filter::FeatureQueryFilter;

/// A value bound to a query placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// A named parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub name: String,
    pub value: SqlValue,
}

/// SQL text together with the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl FeatureQuery {
    /// Look up a bound value by slot name.
    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// The queries needed to answer one GetFeature request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Selects the rows to return.
    pub fetch: FeatureQuery,
    /// Counts every matching row, ignoring the limit. Only present when the
    /// filter carries a count; otherwise the fetched rows are the total.
    pub total_count: Option<FeatureQuery>,
}

/// Builds GetFeature queries against a single feature view.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    view: String,
}

impl QueryBuilder {
    /// Create a builder for the given view or table name.
    ///
    /// The name is interpolated into SQL, so it must be a plain identifier.
    pub fn new(view: impl Into<String>) -> WfsResult<Self> {
        let view = view.into();
        if !is_sql_identifier(&view) {
            return Err(WfsError::Configuration(format!(
                "feature view '{}' is not a valid SQL identifier",
                view
            )));
        }
        Ok(Self { view })
    }

    pub fn build(&self, filter: &FeatureQueryFilter) -> QueryPlan {
        let mut slots = ParamSlots::default();
        let mut predicates = Vec::with_capacity(5);

        let type_slots: Vec<String> = filter
            .type_names()
            .iter()
            .map(|name| slots.bind(SqlValue::Text(name.clone())))
            .collect();
        predicates.push(format!("featureset IN ({})", type_slots.join(", ")));

        if let Some(bbox) = filter.bbox() {
            let [min_x, min_y, max_x, max_y] =
                bbox.to_array().map(|v| slots.bind(SqlValue::Real(v)));
            predicates.push(format!("x > {}", min_x));
            predicates.push(format!("y > {}", min_y));
            predicates.push(format!("x < {}", max_x));
            predicates.push(format!("y < {}", max_y));
        }

        let where_clause = predicates.join(" AND ");

        let Some(count) = filter.count() else {
            return QueryPlan {
                fetch: FeatureQuery {
                    sql: format!("SELECT * FROM {} WHERE {}", self.view, where_clause),
                    params: slots.into_params(),
                },
                total_count: None,
            };
        };

        // The total query shares every predicate slot but never sees the limit.
        let total_count = FeatureQuery {
            sql: format!(
                "SELECT COUNT(*) AS total FROM {} WHERE {}",
                self.view, where_clause
            ),
            params: slots.params.clone(),
        };

        let limit = slots.bind(SqlValue::Integer(i64::from(count)));
        let fetch = FeatureQuery {
            sql: format!(
                "SELECT * FROM {} WHERE {} LIMIT {}",
                self.view, where_clause, limit
            ),
            params: slots.into_params(),
        };

        QueryPlan {
            fetch,
            total_count: Some(total_count),
        }
    }
}

#[derive(Default)]
struct ParamSlots {
    params: Vec<QueryParam>,
}

impl ParamSlots {
    /// Append a value and return its placeholder.
    fn bind(&mut self, value: SqlValue) -> String {
        let index = self.params.len();
        self.params.push(QueryParam {
            name: format!("param{}", index),
            value,
        });
        format!("?{}", index + 1)
    }

    fn into_params(self) -> Vec<QueryParam> {
        self.params
    }
}

fn is_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfs_common::BoundingBox;

    fn filter(names: &[&str]) -> FeatureQueryFilter {
        FeatureQueryFilter::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_type_names_only() {
        let plan = QueryBuilder::new("features")
            .unwrap()
            .build(&filter(&["parks", "trails"]));

        assert_eq!(
            plan.fetch.sql,
            "SELECT * FROM features WHERE featureset IN (?1, ?2)"
        );
        assert_eq!(plan.fetch.params.len(), 2);
        assert_eq!(
            plan.fetch.param("param0"),
            Some(&SqlValue::Text("parks".to_string()))
        );
        assert_eq!(
            plan.fetch.param("param1"),
            Some(&SqlValue::Text("trails".to_string()))
        );
        assert!(plan.total_count.is_none());
    }

    #[test]
    fn test_bbox_predicates() {
        let plan = QueryBuilder::new("features")
            .unwrap()
            .build(&filter(&["parks"]).with_bbox(BoundingBox::new(1.0, 2.0, 3.0, 4.0)));

        assert_eq!(
            plan.fetch.sql,
            "SELECT * FROM features WHERE featureset IN (?1) \
             AND x > ?2 AND y > ?3 AND x < ?4 AND y < ?5"
        );
        let values: Vec<&SqlValue> = plan.fetch.params.iter().map(|p| &p.value).collect();
        assert_eq!(
            values[1..],
            [
                &SqlValue::Real(1.0),
                &SqlValue::Real(2.0),
                &SqlValue::Real(3.0),
                &SqlValue::Real(4.0)
            ]
        );
        assert!(plan.total_count.is_none());
    }

    #[test]
    fn test_count_adds_limit_and_total_query() {
        let plan = QueryBuilder::new("features").unwrap().build(
            &filter(&["parks"])
                .with_bbox(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
                .with_count(5),
        );

        assert!(plan.fetch.sql.ends_with("LIMIT ?6"));
        assert_eq!(plan.fetch.param("param5"), Some(&SqlValue::Integer(5)));

        let total = plan.total_count.expect("count query");
        assert_eq!(
            total.sql,
            "SELECT COUNT(*) AS total FROM features WHERE featureset IN (?1) \
             AND x > ?2 AND y > ?3 AND x < ?4 AND y < ?5"
        );
        assert!(!total.sql.contains("LIMIT"));
    }

    #[test]
    fn test_total_query_never_binds_limit_slot() {
        let plan = QueryBuilder::new("features")
            .unwrap()
            .build(&filter(&["a", "b", "c"]).with_count(1));

        let total = plan.total_count.unwrap();
        assert_eq!(total.params.len(), 3);
        assert!(total.param("param3").is_none());
        assert!(total
            .params
            .iter()
            .all(|p| !matches!(p.value, SqlValue::Integer(_))));
        // Shared slots are identical between both queries.
        assert_eq!(total.params[..], plan.fetch.params[..3]);
    }

    #[test]
    fn test_placeholders_match_slot_names() {
        let plan = QueryBuilder::new("features").unwrap().build(
            &filter(&["x"])
                .with_bbox(BoundingBox::new(0.0, 0.0, 1.0, 1.0))
                .with_count(9),
        );
        for (i, param) in plan.fetch.params.iter().enumerate() {
            assert_eq!(param.name, format!("param{}", i));
            assert!(plan.fetch.sql.contains(&format!("?{}", i + 1)));
        }
    }

    #[test]
    fn test_view_name_validation() {
        assert!(QueryBuilder::new("feature_view_2").is_ok());
        assert!(QueryBuilder::new("features; DROP TABLE x").is_err());
        assert!(QueryBuilder::new("1features").is_err());
        assert!(QueryBuilder::new("").is_err());
    }
}
