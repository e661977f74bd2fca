use super::*;

const WILDCARD: &str = "*";

/// Narrowed populate value and the branch it loads, if any.
type PopulateOutcome = Option<(Value, Option<PopulateBranch>)>;

impl<'a> QueryWalker<'a> {
    /// Narrows `populate` and resolves the populated branches.
    pub(super) fn populate(
        &self,
        schema: &'a Schema,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<(Option<Value>, Vec<PopulateBranch>)> {
        match value {
            Value::Bool(true) => Ok((Some(value.clone()), self.populate_all(schema, path)?)),
            Value::Bool(false) => Ok((Some(value.clone()), Vec::new())),
            Value::String(text) if text.trim() == WILDCARD => {
                Ok((Some(value.clone()), self.populate_all(schema, path)?))
            }
            Value::String(text) => {
                let entries: Vec<&str> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect();
                if entries.contains(&WILDCARD) {
                    return Ok((
                        Some(Value::String(WILDCARD.to_owned())),
                        self.populate_all(schema, path)?,
                    ));
                }

                let total = entries.len();
                let (kept, branches) = self.populate_paths(schema, entries, path, depth)?;

                let narrowed = match kept.len() {
                    0 => None,
                    count if count == total => Some(value.clone()),
                    _ => Some(Value::String(kept.join(","))),
                };
                Ok((narrowed, branches))
            }
            Value::Array(items) => {
                if items.iter().any(|item| item.as_str() == Some(WILDCARD)) {
                    return Ok((
                        Some(Value::Array(vec![Value::String(WILDCARD.to_owned())])),
                        self.populate_all(schema, path)?,
                    ));
                }

                let mut entries = Vec::new();
                for item in items {
                    match item.as_str() {
                        Some(entry) => entries.push(entry),
                        None => self.deny(
                            Denial::new(
                                QueryParameter::Populate,
                                path,
                                DeniedReason::InvalidStructure,
                            )
                            .with_detail("populate entries must be strings"),
                        )?,
                    }
                }
                let (kept, branches) = self.populate_paths(schema, entries, path, depth)?;

                let narrowed = match kept.len() {
                    0 => None,
                    count if count == items.len() => Some(value.clone()),
                    _ => Some(Value::Array(
                        kept.into_iter()
                            .map(|entry| Value::String(entry.to_owned()))
                            .collect(),
                    )),
                };
                Ok((narrowed, branches))
            }
            Value::Object(map) => self.populate_object(schema, map, path, depth),
            Value::Null | Value::Number(_) => {
                self.deny(
                    Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                        .with_detail("populate must be a boolean, a string, an array or an object"),
                )?;
                Ok((None, Vec::new()))
            }
        }
    }

    /// Every visible non-scalar attribute with its default query. Private
    /// attributes are left out without a denial.
    fn populate_all(&self, schema: &'a Schema, path: &str) -> AppResult<Vec<PopulateBranch>> {
        let mut branches = Vec::new();
        for attribute in schema.attributes() {
            let attribute_path = join_path(path, attribute.name());
            if attribute.kind().scalar_type().is_some()
                || !self.is_visible(attribute, &attribute_path)
            {
                continue;
            }

            branches.push(self.default_branch(attribute, &attribute_path)?);
        }

        Ok(branches)
    }

    fn default_branch(&self, attribute: &Attribute, path: &str) -> AppResult<PopulateBranch> {
        let target = match attribute.kind() {
            AttributeKind::DynamicZone { components } => {
                let mut fragments = Vec::with_capacity(components.len());
                for component in components {
                    let schema = self.schema(component.as_str())?;
                    fragments.push(PopulateFragment {
                        component: component.clone(),
                        query: self.default_query(schema, path),
                    });
                }
                PopulateTarget::Fragments(fragments)
            }
            _ => {
                let target = self.attribute_target(attribute)?;
                PopulateTarget::Schema {
                    uid: target.uid().clone(),
                    query: Box::new(self.default_query(target, path)),
                }
            }
        };

        Ok(PopulateBranch {
            attribute: attribute.name().to_owned(),
            target,
        })
    }

    /// Dotted paths such as `relations.componentA`. A path counts only when
    /// every segment resolves.
    fn populate_paths<'e>(
        &self,
        schema: &'a Schema,
        entries: Vec<&'e str>,
        path: &str,
        depth: usize,
    ) -> AppResult<(Vec<&'e str>, Vec<PopulateBranch>)> {
        let mut kept = Vec::new();
        let mut branches = Vec::new();

        for entry in entries {
            let segments: Vec<&str> = entry.split('.').collect();
            if let Some(branch) = self.populate_path(schema, &segments, path, depth)? {
                kept.push(entry);
                merge_branch(&mut branches, branch);
            }
        }

        Ok((kept, branches))
    }

    fn populate_path(
        &self,
        schema: &'a Schema,
        segments: &[&str],
        path: &str,
        depth: usize,
    ) -> AppResult<Option<PopulateBranch>> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(None);
        };
        let attribute_path = join_path(path, first);
        let Some(attribute) =
            self.admit(QueryParameter::Populate, schema, first, &attribute_path)?
        else {
            return Ok(None);
        };

        match attribute.kind() {
            AttributeKind::Scalar(_) => {
                self.deny(
                    Denial::new(
                        QueryParameter::Populate,
                        attribute_path,
                        DeniedReason::NotSelectable,
                    )
                    .with_detail("scalar attributes cannot be populated"),
                )?;
                Ok(None)
            }
            _ if rest.is_empty() => Ok(Some(self.default_branch(attribute, &attribute_path)?)),
            AttributeKind::DynamicZone { .. } => {
                self.deny(
                    Denial::new(
                        QueryParameter::Populate,
                        attribute_path,
                        DeniedReason::InvalidStructure,
                    )
                    .with_detail("dynamic zones are populated through an 'on' fragment map"),
                )?;
                Ok(None)
            }
            _ => {
                let Some(next) =
                    self.descend(QueryParameter::Populate, &attribute_path, depth)?
                else {
                    return Ok(None);
                };
                let target = self.attribute_target(attribute)?;
                let Some(child) = self.populate_path(target, rest, &attribute_path, next)? else {
                    return Ok(None);
                };

                let mut query = self.default_query(target, &attribute_path);
                query.populate.push(child);
                Ok(Some(PopulateBranch {
                    attribute: attribute.name().to_owned(),
                    target: PopulateTarget::Schema {
                        uid: target.uid().clone(),
                        query: Box::new(query),
                    },
                }))
            }
        }
    }

    fn populate_object(
        &self,
        schema: &'a Schema,
        map: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> AppResult<(Option<Value>, Vec<PopulateBranch>)> {
        let mut narrowed = Map::new();
        let mut branches = Vec::new();

        for (key, value) in map {
            let attribute_path = join_path(path, key);
            let Some(attribute) =
                self.admit(QueryParameter::Populate, schema, key, &attribute_path)?
            else {
                continue;
            };

            let outcome = match attribute.kind() {
                AttributeKind::Scalar(_) => {
                    self.deny(
                        Denial::new(
                            QueryParameter::Populate,
                            attribute_path,
                            DeniedReason::NotSelectable,
                        )
                        .with_detail("scalar attributes cannot be populated"),
                    )?;
                    continue;
                }
                AttributeKind::DynamicZone { components } => self.populate_dynamic_zone(
                    attribute,
                    components,
                    value,
                    &attribute_path,
                    depth,
                )?,
                AttributeKind::Relation { .. } => {
                    self.populate_target(attribute, value, &attribute_path, depth, true)?
                }
                AttributeKind::Component { .. } | AttributeKind::Media { .. } => {
                    self.populate_target(attribute, value, &attribute_path, depth, false)?
                }
            };

            if let Some((kept, branch)) = outcome {
                narrowed.insert(key.clone(), kept);
                branches.extend(branch);
            }
        }

        Ok(((!narrowed.is_empty()).then_some(Value::Object(narrowed)), branches))
    }

    /// Relation, component or media attribute: `true`, `"*"`, `false` or a
    /// nested query on the target.
    fn populate_target(
        &self,
        attribute: &Attribute,
        value: &Value,
        path: &str,
        depth: usize,
        relation: bool,
    ) -> AppResult<PopulateOutcome> {
        match value {
            Value::Bool(true) => Ok(Some((
                value.clone(),
                Some(self.default_branch(attribute, path)?),
            ))),
            Value::String(text) if text == WILDCARD => {
                Ok(Some((value.clone(), Some(self.default_branch(attribute, path)?))))
            }
            Value::Bool(false) => Ok(Some((value.clone(), None))),
            Value::Object(map) => {
                let Some(next) = self.descend(QueryParameter::Populate, path, depth)? else {
                    return Ok(None);
                };
                let target = self.attribute_target(attribute)?;
                let (narrowed, query) =
                    self.query_level(target, map, path, next, QueryScope::Populate { relation })?;

                Ok(Some((
                    Value::Object(narrowed),
                    Some(PopulateBranch {
                        attribute: attribute.name().to_owned(),
                        target: PopulateTarget::Schema {
                            uid: target.uid().clone(),
                            query: Box::new(query),
                        },
                    }),
                )))
            }
            _ => {
                self.deny(
                    Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                        .with_detail("expected true, false, '*' or a nested query"),
                )?;
                Ok(None)
            }
        }
    }

    /// `{ on: { "<component uid>": ... } }`. An `on` map that selects no
    /// component leaves the dynamic zone out entirely.
    fn populate_dynamic_zone(
        &self,
        attribute: &Attribute,
        components: &[SchemaUid],
        value: &Value,
        path: &str,
        depth: usize,
    ) -> AppResult<PopulateOutcome> {
        let map = match value {
            Value::Bool(true) => {
                return Ok(Some((value.clone(), Some(self.default_branch(attribute, path)?))));
            }
            Value::String(text) if text == WILDCARD => {
                return Ok(Some((value.clone(), Some(self.default_branch(attribute, path)?))));
            }
            Value::Bool(false) => return Ok(Some((value.clone(), None))),
            Value::Object(map) if map.is_empty() => {
                return Ok(Some((value.clone(), Some(self.default_branch(attribute, path)?))));
            }
            Value::Object(map) => map,
            _ => {
                self.deny(
                    Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                        .with_detail("expected true, false, '*' or an 'on' fragment map"),
                )?;
                return Ok(None);
            }
        };

        let mut narrowed = Map::new();
        let mut fragments = None;
        for (key, value) in map {
            if key != "on" {
                self.deny(
                    Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                        .with_detail(format!("dynamic zones only accept 'on', found '{key}'")),
                )?;
                continue;
            }

            let Some(on) = value.as_object() else {
                self.deny(
                    Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                        .with_detail("'on' must map component UIDs to populate values"),
                )?;
                continue;
            };

            if on.is_empty() {
                self.deny(Denial::new(
                    QueryParameter::Populate,
                    path,
                    DeniedReason::EmptyFragment,
                ))?;
                continue;
            }

            let Some(next) = self.descend(QueryParameter::Populate, path, depth)? else {
                continue;
            };
            let (kept, selected) = self.populate_fragments(components, on, path, next)?;
            if kept.is_empty() {
                continue;
            }

            narrowed.insert(key.clone(), Value::Object(kept));
            fragments = Some(selected);
        }

        Ok(fragments.map(|fragments| {
            (
                Value::Object(narrowed),
                Some(PopulateBranch {
                    attribute: attribute.name().to_owned(),
                    target: PopulateTarget::Fragments(fragments),
                }),
            )
        }))
    }

    fn populate_fragments(
        &self,
        components: &[SchemaUid],
        on: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> AppResult<(Map<String, Value>, Vec<PopulateFragment>)> {
        let mut kept = Map::new();
        let mut fragments = Vec::new();

        for (uid, value) in on {
            let Some(component) = components.iter().find(|component| component.as_str() == uid)
            else {
                self.deny(
                    Denial::new(
                        QueryParameter::Populate,
                        join_path(path, uid),
                        DeniedReason::UnknownField,
                    )
                    .with_detail(format!("'{uid}' is not a component of this dynamic zone")),
                )?;
                continue;
            };
            let schema = self.schema(component.as_str())?;

            match value {
                Value::Bool(true) => {
                    fragments.push(PopulateFragment {
                        component: component.clone(),
                        query: self.default_query(schema, path),
                    });
                }
                Value::String(text) if text == WILDCARD => {
                    fragments.push(PopulateFragment {
                        component: component.clone(),
                        query: self.default_query(schema, path),
                    });
                }
                Value::Bool(false) => continue,
                Value::Object(map) => {
                    let (narrowed, query) = self.query_level(
                        schema,
                        map,
                        path,
                        depth,
                        QueryScope::Populate { relation: false },
                    )?;
                    fragments.push(PopulateFragment {
                        component: component.clone(),
                        query,
                    });
                    kept.insert(uid.clone(), Value::Object(narrowed));
                    continue;
                }
                _ => {
                    self.deny(
                        Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                            .with_detail("expected true, false, '*' or a nested query"),
                    )?;
                    continue;
                }
            }

            kept.insert(uid.clone(), value.clone());
        }

        Ok((kept, fragments))
    }
}

/// Merges dotted populate paths sharing a prefix into one branch.
fn merge_branch(branches: &mut Vec<PopulateBranch>, branch: PopulateBranch) {
    let Some(existing) = branches
        .iter_mut()
        .find(|existing| existing.attribute == branch.attribute)
    else {
        branches.push(branch);
        return;
    };

    if let (
        PopulateTarget::Schema {
            query: existing_query,
            ..
        },
        PopulateTarget::Schema { query, .. },
    ) = (&mut existing.target, branch.target)
    {
        for child in query.populate {
            merge_branch(&mut existing_query.populate, child);
        }
    }
}
