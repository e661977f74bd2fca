use super::*;

use super::operators::{accepts_value, is_empty_object, is_legal, is_primitive, is_primitive_list};

impl<'a> QueryWalker<'a> {
    /// Narrows a `filters` tree against `schema`. `None` means nothing
    /// survived.
    pub(super) fn filters(
        &self,
        schema: &'a Schema,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Value>> {
        let Some(group) = value.as_object() else {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                    .with_detail("filters must be an object"),
            )?;
            return Ok(None);
        };

        Ok(self
            .filter_group(schema, group, path, depth, false)?
            .map(Value::Object))
    }

    /// One filter object: attribute keys and group-level operators.
    /// `relational` is set below a relation, component or media attribute,
    /// where `$null`/`$notNull` test the reference itself.
    fn filter_group(
        &self,
        schema: &'a Schema,
        group: &Map<String, Value>,
        path: &str,
        depth: usize,
        relational: bool,
    ) -> AppResult<Option<Map<String, Value>>> {
        let mut narrowed = Map::new();

        for (key, value) in group {
            if FilterOperator::is_operator_key(key) {
                if let Some(clause) =
                    self.group_operator(schema, key, value, path, depth, relational)?
                {
                    narrowed.insert(key.clone(), clause);
                }
                continue;
            }

            let attribute_path = join_path(path, key);
            let Some(attribute) =
                self.admit(QueryParameter::Filters, schema, key, &attribute_path)?
            else {
                continue;
            };

            if let Some(clause) = self.attribute_clause(attribute, value, &attribute_path, depth)? {
                narrowed.insert(key.clone(), clause);
            }
        }

        Ok((!narrowed.is_empty()).then_some(narrowed))
    }

    fn group_operator(
        &self,
        schema: &'a Schema,
        key: &str,
        value: &Value,
        path: &str,
        depth: usize,
        relational: bool,
    ) -> AppResult<Option<Value>> {
        let Ok(operator) = FilterOperator::from_str(key) else {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::OperatorIncompatible)
                    .with_detail(key),
            )?;
            return Ok(None);
        };

        match operator {
            FilterOperator::And | FilterOperator::Or => {
                let Some(children) = value.as_array() else {
                    self.deny(
                        Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                            .with_detail(format!("'{key}' takes an array of filters")),
                    )?;
                    return Ok(None);
                };
                let Some(next) = self.descend(QueryParameter::Filters, path, depth)? else {
                    return Ok(None);
                };

                let mut kept = Vec::new();
                for child in children {
                    let Some(child_group) = child.as_object() else {
                        self.deny(
                            Denial::new(
                                QueryParameter::Filters,
                                path,
                                DeniedReason::InvalidStructure,
                            )
                            .with_detail(format!("'{key}' children must be objects")),
                        )?;
                        continue;
                    };

                    if let Some(group) =
                        self.filter_group(schema, child_group, path, next, relational)?
                    {
                        kept.push(Value::Object(group));
                    }
                }

                Ok((!kept.is_empty()).then_some(Value::Array(kept)))
            }
            FilterOperator::Not => {
                let Some(child_group) = value.as_object() else {
                    self.deny(
                        Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                            .with_detail("'$not' takes a filter object"),
                    )?;
                    return Ok(None);
                };
                let Some(next) = self.descend(QueryParameter::Filters, path, depth)? else {
                    return Ok(None);
                };

                Ok(self
                    .filter_group(schema, child_group, path, next, relational)?
                    .map(Value::Object))
            }
            FilterOperator::Null | FilterOperator::NotNull if relational => {
                self.operand(operator, value, path)
            }
            _ => {
                self.deny(
                    Denial::new(QueryParameter::Filters, path, DeniedReason::OperatorIncompatible)
                        .with_detail(operator.as_str()),
                )?;
                Ok(None)
            }
        }
    }

    fn attribute_clause(
        &self,
        attribute: &'a Attribute,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Value>> {
        match attribute.kind() {
            AttributeKind::Scalar(scalar_type) => {
                self.scalar_clause(*scalar_type, value, path, depth)
            }
            AttributeKind::Relation { .. }
            | AttributeKind::Component { .. }
            | AttributeKind::Media { .. } => self.relational_clause(attribute, value, path, depth),
            AttributeKind::DynamicZone { .. } => {
                self.deny(
                    Denial::new(QueryParameter::Filters, path, DeniedReason::NotSelectable)
                        .with_detail("dynamic zones cannot be filtered"),
                )?;
                Ok(None)
            }
        }
    }

    fn scalar_clause(
        &self,
        scalar_type: ScalarType,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Value>> {
        // Bare values are `$eq`, bare lists `$in`.
        if is_primitive(value) || is_primitive_list(value) {
            return Ok(Some(value.clone()));
        }

        let Some(group) = value.as_object() else {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                    .with_detail("expected a value, a list of values or an operator object"),
            )?;
            return Ok(None);
        };

        Ok(self
            .operator_group(scalar_type, group, path, depth)?
            .map(Value::Object))
    }

    /// Operator object on one scalar attribute, possibly nesting logical
    /// operators over further operator objects.
    fn operator_group(
        &self,
        scalar_type: ScalarType,
        group: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Map<String, Value>>> {
        let mut narrowed = Map::new();

        for (key, value) in group {
            let Ok(operator) = FilterOperator::from_str(key) else {
                let (reason, detail) = if FilterOperator::is_operator_key(key) {
                    (DeniedReason::OperatorIncompatible, key.clone())
                } else {
                    (
                        DeniedReason::InvalidStructure,
                        format!("unexpected key '{key}' in an attribute filter"),
                    )
                };
                self.deny(Denial::new(QueryParameter::Filters, path, reason).with_detail(detail))?;
                continue;
            };

            let clause = match operator {
                FilterOperator::And | FilterOperator::Or => {
                    self.operator_list(scalar_type, key, value, path, depth)?
                }
                FilterOperator::Not if is_primitive(value) => Some(value.clone()),
                FilterOperator::Not => {
                    let Some(child_group) = value.as_object() else {
                        self.deny(
                            Denial::new(
                                QueryParameter::Filters,
                                path,
                                DeniedReason::InvalidStructure,
                            )
                            .with_detail("'$not' takes a value or an operator object"),
                        )?;
                        continue;
                    };
                    let Some(next) = self.descend(QueryParameter::Filters, path, depth)? else {
                        continue;
                    };

                    self.operator_group(scalar_type, child_group, path, next)?
                        .map(Value::Object)
                }
                _ => self.operator_clause(scalar_type, operator, value, path)?,
            };

            if let Some(clause) = clause {
                narrowed.insert(key.clone(), clause);
            }
        }

        Ok((!narrowed.is_empty()).then_some(narrowed))
    }

    fn operator_list(
        &self,
        scalar_type: ScalarType,
        key: &str,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Value>> {
        let Some(children) = value.as_array() else {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                    .with_detail(format!("'{key}' takes an array of operator objects")),
            )?;
            return Ok(None);
        };
        let Some(next) = self.descend(QueryParameter::Filters, path, depth)? else {
            return Ok(None);
        };

        let mut kept = Vec::new();
        for child in children {
            let Some(child_group) = child.as_object() else {
                self.deny(
                    Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                        .with_detail(format!("'{key}' children must be operator objects")),
                )?;
                continue;
            };

            if let Some(group) = self.operator_group(scalar_type, child_group, path, next)? {
                kept.push(Value::Object(group));
            }
        }

        Ok((!kept.is_empty()).then_some(Value::Array(kept)))
    }

    fn operator_clause(
        &self,
        scalar_type: ScalarType,
        operator: FilterOperator,
        value: &Value,
        path: &str,
    ) -> AppResult<Option<Value>> {
        if is_empty_object(value) {
            return Ok(None);
        }

        if !is_legal(scalar_type, operator) {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::OperatorIncompatible)
                    .with_detail(operator.as_str()),
            )?;
            return Ok(None);
        }

        self.operand(operator, value, path)
    }

    fn operand(
        &self,
        operator: FilterOperator,
        value: &Value,
        path: &str,
    ) -> AppResult<Option<Value>> {
        if is_empty_object(value) {
            return Ok(None);
        }

        if !accepts_value(operator, value) {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                    .with_detail(format!("invalid operand for '{}'", operator.as_str())),
            )?;
            return Ok(None);
        }

        Ok(Some(value.clone()))
    }

    fn relational_clause(
        &self,
        attribute: &'a Attribute,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<Value>> {
        // Identifier shorthand on the reference itself.
        if is_primitive(value) || is_primitive_list(value) {
            return Ok(Some(value.clone()));
        }

        let Some(group) = value.as_object() else {
            self.deny(
                Denial::new(QueryParameter::Filters, path, DeniedReason::InvalidStructure)
                    .with_detail("expected an identifier or a nested filter object"),
            )?;
            return Ok(None);
        };

        if group.is_empty() {
            return Ok(None);
        }

        let Some(next) = self.descend(QueryParameter::Filters, path, depth)? else {
            return Ok(None);
        };
        let target = self.attribute_target(attribute)?;

        Ok(self
            .filter_group(target, group, path, next, true)?
            .map(Value::Object))
    }
}
