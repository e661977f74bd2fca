use super::*;

/// Groups of operators sharing type requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OperatorFamily {
    Logical,
    Equality,
    Ordering,
    Text,
    Presence,
}

pub(super) fn family(operator: FilterOperator) -> OperatorFamily {
    match operator {
        FilterOperator::And | FilterOperator::Or | FilterOperator::Not => OperatorFamily::Logical,
        FilterOperator::Eq | FilterOperator::Ne | FilterOperator::In | FilterOperator::NotIn => {
            OperatorFamily::Equality
        }
        FilterOperator::Lt
        | FilterOperator::Lte
        | FilterOperator::Gt
        | FilterOperator::Gte
        | FilterOperator::Between => OperatorFamily::Ordering,
        FilterOperator::Eqi
        | FilterOperator::Nei
        | FilterOperator::Contains
        | FilterOperator::NotContains
        | FilterOperator::Containsi
        | FilterOperator::NotContainsi
        | FilterOperator::StartsWith
        | FilterOperator::EndsWith => OperatorFamily::Text,
        FilterOperator::Null | FilterOperator::NotNull => OperatorFamily::Presence,
    }
}

/// Returns whether `operator` applies to values of `scalar_type`.
pub(super) fn is_legal(scalar_type: ScalarType, operator: FilterOperator) -> bool {
    match family(operator) {
        OperatorFamily::Logical | OperatorFamily::Equality | OperatorFamily::Presence => true,
        OperatorFamily::Ordering => scalar_type.is_ordered(),
        OperatorFamily::Text => scalar_type.is_string_like(),
    }
}

/// Returns whether the operand has the shape the operator expects.
pub(super) fn accepts_value(operator: FilterOperator, value: &Value) -> bool {
    match operator {
        FilterOperator::In | FilterOperator::NotIn => {
            is_primitive(value) || is_primitive_list(value)
        }
        FilterOperator::Between => value
            .as_array()
            .is_some_and(|items| items.len() == 2 && items.iter().all(is_primitive)),
        _ => is_primitive(value),
    }
}

pub(super) fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

pub(super) fn is_primitive_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(is_primitive))
}

/// `{}` clause bodies carry no constraint.
pub(super) fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FilterOperator, ScalarType, accepts_value, is_legal};

    #[test]
    fn text_operators_require_string_like_types() {
        assert!(is_legal(ScalarType::String, FilterOperator::Containsi));
        assert!(is_legal(ScalarType::Enumeration, FilterOperator::StartsWith));
        assert!(!is_legal(ScalarType::Integer, FilterOperator::Contains));
        assert!(!is_legal(ScalarType::Boolean, FilterOperator::Eqi));
    }

    #[test]
    fn ordering_operators_require_ordered_types() {
        assert!(is_legal(ScalarType::Integer, FilterOperator::Gt));
        assert!(is_legal(ScalarType::DateTime, FilterOperator::Between));
        assert!(!is_legal(ScalarType::Boolean, FilterOperator::Lte));
        assert!(!is_legal(ScalarType::Json, FilterOperator::Lt));
    }

    #[test]
    fn equality_and_presence_apply_everywhere() {
        for scalar_type in [ScalarType::Boolean, ScalarType::Json, ScalarType::Blocks] {
            assert!(is_legal(scalar_type, FilterOperator::Eq));
            assert!(is_legal(scalar_type, FilterOperator::NotIn));
            assert!(is_legal(scalar_type, FilterOperator::Null));
        }
    }

    #[test]
    fn operand_shapes_are_checked() {
        assert!(accepts_value(FilterOperator::In, &json!([1, 2])));
        assert!(accepts_value(FilterOperator::In, &json!(1)));
        assert!(!accepts_value(FilterOperator::In, &json!([[1]])));
        assert!(accepts_value(FilterOperator::Between, &json!([1, 3])));
        assert!(!accepts_value(FilterOperator::Between, &json!([1])));
        assert!(!accepts_value(FilterOperator::Eq, &json!({ "nested": true })));
    }
}
