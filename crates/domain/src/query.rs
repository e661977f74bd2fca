use std::str::FromStr;

use quarry_core::AppError;
use serde::{Deserialize, Serialize};

/// Sort direction of one ordering entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("asc") {
            return Ok(Self::Asc);
        }

        if value.eq_ignore_ascii_case("desc") {
            return Ok(Self::Desc);
        }

        Err(AppError::Validation(format!(
            "unknown sort direction '{value}'"
        )))
    }
}

/// Filter operator, including the logical combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equality.
    Eq,
    /// Case-insensitive equality.
    Eqi,
    /// Inequality.
    Ne,
    /// Case-insensitive inequality.
    Nei,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Membership in a set of values.
    In,
    /// Exclusion from a set of values.
    NotIn,
    /// Substring match.
    Contains,
    /// Negated substring match.
    NotContains,
    /// Case-insensitive substring match.
    Containsi,
    /// Negated case-insensitive substring match.
    NotContainsi,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Inclusive range given as a two-element array.
    Between,
    /// Value is null.
    Null,
    /// Value is not null.
    NotNull,
    /// Every child matches.
    And,
    /// Any child matches.
    Or,
    /// The child does not match.
    Not,
}

impl FilterOperator {
    /// Returns the operator key as written in queries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Eqi => "$eqi",
            Self::Ne => "$ne",
            Self::Nei => "$nei",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::In => "$in",
            Self::NotIn => "$notIn",
            Self::Contains => "$contains",
            Self::NotContains => "$notContains",
            Self::Containsi => "$containsi",
            Self::NotContainsi => "$notContainsi",
            Self::StartsWith => "$startsWith",
            Self::EndsWith => "$endsWith",
            Self::Between => "$between",
            Self::Null => "$null",
            Self::NotNull => "$notNull",
            Self::And => "$and",
            Self::Or => "$or",
            Self::Not => "$not",
        }
    }

    /// Returns whether the operator combines child filters.
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }

    /// Returns whether a query key looks like an operator.
    #[must_use]
    pub fn is_operator_key(key: &str) -> bool {
        key.starts_with('$')
    }
}

impl FromStr for FilterOperator {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "$eq" => Ok(Self::Eq),
            "$eqi" => Ok(Self::Eqi),
            "$ne" => Ok(Self::Ne),
            "$nei" => Ok(Self::Nei),
            "$lt" => Ok(Self::Lt),
            "$lte" => Ok(Self::Lte),
            "$gt" => Ok(Self::Gt),
            "$gte" => Ok(Self::Gte),
            "$in" => Ok(Self::In),
            "$notIn" => Ok(Self::NotIn),
            "$contains" => Ok(Self::Contains),
            "$notContains" => Ok(Self::NotContains),
            "$containsi" => Ok(Self::Containsi),
            "$notContainsi" => Ok(Self::NotContainsi),
            "$startsWith" => Ok(Self::StartsWith),
            "$endsWith" => Ok(Self::EndsWith),
            "$between" => Ok(Self::Between),
            "$null" => Ok(Self::Null),
            "$notNull" => Ok(Self::NotNull),
            "$and" => Ok(Self::And),
            "$or" => Ok(Self::Or),
            "$not" => Ok(Self::Not),
            _ => Err(AppError::Validation(format!(
                "unknown filter operator '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{FilterOperator, SortDirection};

    #[test]
    fn logical_operators_are_flagged() {
        assert!(FilterOperator::And.is_logical());
        assert!(FilterOperator::Not.is_logical());
        assert!(!FilterOperator::Contains.is_logical());
    }

    #[test]
    fn operators_parse_their_own_keys() {
        for operator in [
            FilterOperator::Eq,
            FilterOperator::NotIn,
            FilterOperator::NotContainsi,
            FilterOperator::StartsWith,
            FilterOperator::NotNull,
            FilterOperator::Or,
        ] {
            let parsed = FilterOperator::from_str(operator.as_str());
            assert!(matches!(parsed, Ok(value) if value == operator));
        }
    }

    #[test]
    fn unknown_operators_are_rejected() {
        assert!(FilterOperator::from_str("$like").is_err());
        assert!(FilterOperator::from_str("eq").is_err());
    }

    proptest! {
        #[test]
        fn sort_direction_parsing_ignores_case(upper in proptest::bool::ANY, descending in proptest::bool::ANY) {
            let raw = if descending { "desc" } else { "asc" };
            let raw = if upper { raw.to_ascii_uppercase() } else { raw.to_owned() };

            let parsed = SortDirection::from_str(raw.as_str());
            let expected = if descending { SortDirection::Desc } else { SortDirection::Asc };
            prop_assert!(matches!(parsed, Ok(direction) if direction == expected));
        }

        #[test]
        fn sort_direction_rejects_other_words(word in "[a-z]{1,8}") {
            prop_assume!(word != "asc" && word != "desc");
            prop_assert!(SortDirection::from_str(word.as_str()).is_err());
        }
    }
}
