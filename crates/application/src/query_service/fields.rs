use super::*;

const WILDCARD: &str = "*";

impl QueryWalker<'_> {
    /// Narrows `fields`. An empty list selects every visible attribute, and
    /// so does a wildcard anywhere in the list, which is then rendered alone.
    /// A list where nothing survives selects identifiers only and is
    /// rendered as the primary key.
    pub(super) fn fields(
        &self,
        schema: &Schema,
        value: &Value,
        path: &str,
    ) -> AppResult<(Option<Value>, FieldSelection)> {
        let entries: Vec<Option<&str>> = match value {
            Value::String(text) => text
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(Some)
                .collect(),
            Value::Array(items) => items.iter().map(Value::as_str).collect(),
            _ => {
                self.deny(
                    Denial::new(QueryParameter::Fields, path, DeniedReason::InvalidStructure)
                        .with_detail("fields must be a string or an array of strings"),
                )?;
                return Ok((None, self.all_fields(schema, path)));
            }
        };

        if entries.is_empty() {
            return Ok((Some(value.clone()), self.all_fields(schema, path)));
        }

        if entries.contains(&Some(WILDCARD)) {
            let narrowed = match value {
                Value::String(_) => Value::String(WILDCARD.to_owned()),
                _ => Value::Array(vec![Value::String(WILDCARD.to_owned())]),
            };
            return Ok((Some(narrowed), self.all_fields(schema, path)));
        }

        let mut kept = Vec::new();
        let mut attributes: Vec<String> = Vec::new();
        for entry in entries {
            let Some(name) = entry else {
                self.deny(
                    Denial::new(QueryParameter::Fields, path, DeniedReason::InvalidStructure)
                        .with_detail("field entries must be strings"),
                )?;
                continue;
            };

            let attribute_path = join_path(path, name);
            let Some(attribute) =
                self.admit(QueryParameter::Fields, schema, name, &attribute_path)?
            else {
                continue;
            };

            if attribute.kind().scalar_type().is_none() {
                self.deny(
                    Denial::new(QueryParameter::Fields, attribute_path, DeniedReason::NotSelectable)
                        .with_detail("only scalar attributes can be selected, populate the rest"),
                )?;
                continue;
            }

            kept.push(name);
            if !attribute.is_identifier() && !attributes.iter().any(|selected| selected == name) {
                attributes.push(name.to_owned());
            }
        }

        let selection = FieldSelection {
            identifiers: self.all_fields(schema, path).identifiers,
            attributes,
            wildcard: false,
        };

        let dropped = kept.len() < count_entries(value);
        if !dropped {
            return Ok((Some(value.clone()), selection));
        }

        if kept.is_empty() {
            kept.push(schema.primary_key());
        }

        let narrowed = match value {
            Value::String(_) => Value::String(kept.join(",")),
            _ => Value::Array(
                kept.into_iter()
                    .map(|name| Value::String(name.to_owned()))
                    .collect(),
            ),
        };
        Ok((Some(narrowed), selection))
    }
}

fn count_entries(value: &Value) -> usize {
    match value {
        Value::String(text) => text
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .count(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}
