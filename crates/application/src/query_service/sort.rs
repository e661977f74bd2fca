use super::*;

impl<'a> QueryWalker<'a> {
    /// Narrows `sort` and returns the surviving entries in priority order.
    pub(super) fn sort(
        &self,
        schema: &'a Schema,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<(Option<Value>, Vec<SortEntry>)> {
        match value {
            Value::String(text) => self.sort_text(schema, text, path, depth),
            Value::Object(map) => {
                let (narrowed, entries) = self.sort_object(schema, map, path, "", depth)?;
                Ok((narrowed.map(Value::Object), entries))
            }
            Value::Array(items) => {
                let mut kept = Vec::new();
                let mut entries = Vec::new();
                for item in items {
                    let (narrowed, item_entries) = match item {
                        Value::String(text) => self.sort_text(schema, text, path, depth)?,
                        Value::Object(map) => {
                            let (narrowed, item_entries) =
                                self.sort_object(schema, map, path, "", depth)?;
                            (narrowed.map(Value::Object), item_entries)
                        }
                        _ => {
                            self.deny(
                                Denial::new(
                                    QueryParameter::Sort,
                                    path,
                                    DeniedReason::InvalidStructure,
                                )
                                .with_detail("sort entries must be strings or objects"),
                            )?;
                            continue;
                        }
                    };

                    if let Some(narrowed) = narrowed {
                        kept.push(narrowed);
                        entries.extend(item_entries);
                    }
                }

                Ok(((!kept.is_empty()).then_some(Value::Array(kept)), entries))
            }
            _ => {
                self.deny(
                    Denial::new(QueryParameter::Sort, path, DeniedReason::InvalidStructure)
                        .with_detail("sort must be a string, an object or an array"),
                )?;
                Ok((None, Vec::new()))
            }
        }
    }

    /// `name:asc,relations.name:desc` notation.
    fn sort_text(
        &self,
        schema: &'a Schema,
        text: &str,
        path: &str,
        depth: usize,
    ) -> AppResult<(Option<Value>, Vec<SortEntry>)> {
        let mut kept = Vec::new();
        let mut entries = Vec::new();
        let mut dropped = false;

        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            match self.sort_entry(schema, part, path, depth)? {
                Some(entry) => {
                    kept.push(part);
                    entries.push(entry);
                }
                None => dropped = true,
            }
        }

        if kept.is_empty() {
            return Ok((None, entries));
        }

        let narrowed = if dropped {
            kept.join(",")
        } else {
            text.to_owned()
        };
        Ok((Some(Value::String(narrowed)), entries))
    }

    fn sort_entry(
        &self,
        schema: &'a Schema,
        text: &str,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<SortEntry>> {
        let (field, direction, explicit) = match text.split_once(':') {
            Some((field, direction)) => match SortDirection::from_str(direction.trim()) {
                Ok(direction) => (field.trim(), direction, true),
                Err(_) => {
                    self.deny(
                        Denial::new(
                            QueryParameter::Sort,
                            join_path(path, field.trim()),
                            DeniedReason::InvalidStructure,
                        )
                        .with_detail(format!("invalid sort direction '{direction}'")),
                    )?;
                    return Ok(None);
                }
            },
            None => (text, SortDirection::Asc, false),
        };

        if !self.sortable_path(schema, field, path, depth)? {
            return Ok(None);
        }

        Ok(Some(SortEntry {
            path: field.to_owned(),
            direction,
            explicit,
        }))
    }

    /// Intermediate segments must reach another schema and the last one
    /// must be a scalar.
    fn sortable_path(
        &self,
        schema: &'a Schema,
        field: &str,
        path: &str,
        depth: usize,
    ) -> AppResult<bool> {
        let segments: Vec<&str> = field.split('.').collect();
        let mut current = schema;
        let mut current_path = path.to_owned();
        let mut depth = depth;

        for (index, segment) in segments.iter().enumerate() {
            let segment_path = join_path(&current_path, segment);
            let Some(attribute) =
                self.admit(QueryParameter::Sort, current, segment, &segment_path)?
            else {
                return Ok(false);
            };
            let last = index + 1 == segments.len();

            match attribute.kind() {
                AttributeKind::Scalar(_) if last => return Ok(true),
                AttributeKind::Scalar(_) => {
                    self.deny(
                        Denial::new(
                            QueryParameter::Sort,
                            segment_path,
                            DeniedReason::InvalidStructure,
                        )
                        .with_detail(format!("'{segment}' does not lead to another schema")),
                    )?;
                    return Ok(false);
                }
                AttributeKind::DynamicZone { .. } => {
                    self.deny(
                        Denial::new(QueryParameter::Sort, segment_path, DeniedReason::NotSelectable)
                            .with_detail("dynamic zones cannot be sorted"),
                    )?;
                    return Ok(false);
                }
                _ if last => {
                    self.deny(
                        Denial::new(QueryParameter::Sort, segment_path, DeniedReason::NotSelectable)
                            .with_detail("sort on a scalar attribute of the target instead"),
                    )?;
                    return Ok(false);
                }
                _ => {
                    let Some(next) = self.descend(QueryParameter::Sort, &segment_path, depth)?
                    else {
                        return Ok(false);
                    };
                    if let AttributeKind::Relation { cardinality, .. } = attribute.kind()
                        && cardinality.is_to_many()
                    {
                        debug!(path = %segment_path, "sorting through a to-many relation");
                    }
                    depth = next;
                    current = self.attribute_target(attribute)?;
                    current_path = segment_path;
                }
            }
        }

        Ok(false)
    }

    /// `{ name: "asc", relations: { name: "desc" } }` notation. `relative`
    /// is the entry path prefix from the sorted schema.
    fn sort_object(
        &self,
        schema: &'a Schema,
        map: &Map<String, Value>,
        path: &str,
        relative: &str,
        depth: usize,
    ) -> AppResult<(Option<Map<String, Value>>, Vec<SortEntry>)> {
        let mut narrowed = Map::new();
        let mut entries = Vec::new();

        for (key, value) in map {
            let attribute_path = join_path(path, key);
            let Some(attribute) =
                self.admit(QueryParameter::Sort, schema, key, &attribute_path)?
            else {
                continue;
            };

            match attribute.kind() {
                AttributeKind::Scalar(_) => {
                    let direction = value
                        .as_str()
                        .and_then(|text| SortDirection::from_str(text).ok());
                    let Some(direction) = direction else {
                        self.deny(
                            Denial::new(
                                QueryParameter::Sort,
                                attribute_path,
                                DeniedReason::InvalidStructure,
                            )
                            .with_detail("sort direction must be 'asc' or 'desc'"),
                        )?;
                        continue;
                    };

                    entries.push(SortEntry {
                        path: join_path(relative, key),
                        direction,
                        explicit: true,
                    });
                    narrowed.insert(key.clone(), value.clone());
                }
                AttributeKind::DynamicZone { .. } => {
                    self.deny(
                        Denial::new(
                            QueryParameter::Sort,
                            attribute_path,
                            DeniedReason::NotSelectable,
                        )
                        .with_detail("dynamic zones cannot be sorted"),
                    )?;
                }
                _ => {
                    let Some(nested) = value.as_object() else {
                        self.deny(
                            Denial::new(
                                QueryParameter::Sort,
                                attribute_path,
                                DeniedReason::NotSelectable,
                            )
                            .with_detail("sort on a scalar attribute of the target instead"),
                        )?;
                        continue;
                    };
                    let Some(next) = self.descend(QueryParameter::Sort, &attribute_path, depth)?
                    else {
                        continue;
                    };
                    let target = self.attribute_target(attribute)?;

                    let (nested, nested_entries) = self.sort_object(
                        target,
                        nested,
                        &attribute_path,
                        &join_path(relative, key),
                        next,
                    )?;
                    if let Some(nested) = nested {
                        narrowed.insert(key.clone(), Value::Object(nested));
                        entries.extend(nested_entries);
                    }
                }
            }
        }

        Ok(((!narrowed.is_empty()).then_some(narrowed), entries))
    }
}
