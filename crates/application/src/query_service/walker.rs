use super::*;

/// Where a set of query parameters appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QueryScope {
    /// The request query; unknown keys pass through.
    Root,
    /// A nested populate query; `relation` enables `count`.
    Populate { relation: bool },
}

/// One engine invocation: registry, caller access and failure policy.
pub(super) struct QueryWalker<'a> {
    registry: &'a dyn SchemaRegistry,
    access: &'a PrivateFieldAccess,
    policy: &'a dyn DenialPolicy,
    limits: QueryLimits,
}

impl<'a> QueryWalker<'a> {
    pub(super) fn new(
        registry: &'a dyn SchemaRegistry,
        access: &'a PrivateFieldAccess,
        policy: &'a dyn DenialPolicy,
        limits: QueryLimits,
    ) -> Self {
        Self {
            registry,
            access,
            policy,
            limits,
        }
    }

    /// Reports a denial. `Ok` means the offending clause is dropped.
    pub(super) fn deny(&self, denial: Denial) -> AppResult<()> {
        match self.policy.on_denied(&denial) {
            DenialAction::Drop => Ok(()),
            DenialAction::Abort(violation) => {
                debug!(mode = self.policy.mode().as_str(), %violation, "rejecting query");
                Err(AppError::InvalidQuery(violation))
            }
        }
    }

    /// Returns the depth of a nested level, or `None` once the budget is
    /// spent.
    pub(super) fn descend(
        &self,
        parameter: QueryParameter,
        path: &str,
        depth: usize,
    ) -> AppResult<Option<usize>> {
        let next = depth + 1;
        if next > self.limits.max_depth() {
            self.deny(
                Denial::new(parameter, path, DeniedReason::DepthExceeded).with_detail(format!(
                    "query nesting exceeds {} levels",
                    self.limits.max_depth()
                )),
            )?;
            return Ok(None);
        }

        Ok(Some(next))
    }

    /// Resolves a known, visible attribute or reports why it is denied.
    pub(super) fn admit<'s>(
        &self,
        parameter: QueryParameter,
        schema: &'s Schema,
        name: &str,
        path: &str,
    ) -> AppResult<Option<&'s Attribute>> {
        let Some(attribute) = classifier::classify(schema, name) else {
            self.deny(Denial::new(parameter, path, DeniedReason::UnknownField))?;
            return Ok(None);
        };

        match classifier::visibility(attribute, path, self.access) {
            Visibility::Allowed => Ok(Some(attribute)),
            Visibility::Denied(reason) => {
                self.deny(Denial::new(parameter, path, reason))?;
                Ok(None)
            }
        }
    }

    pub(super) fn is_visible(&self, attribute: &Attribute, path: &str) -> bool {
        classifier::visibility(attribute, path, self.access) == Visibility::Allowed
    }

    pub(super) fn schema(&self, uid: &str) -> AppResult<&'a Schema> {
        self.registry
            .find_schema(uid)
            .ok_or_else(|| AppError::Internal(format!("schema '{uid}' is not registered")))
    }

    /// Returns the schema a relation, component or media attribute points to.
    pub(super) fn attribute_target(&self, attribute: &Attribute) -> AppResult<&'a Schema> {
        let uid = attribute.kind().target_uid().ok_or_else(|| {
            AppError::Internal(format!(
                "attribute '{}' of kind '{}' has no single target schema",
                attribute.name(),
                attribute.kind().as_str()
            ))
        })?;

        self.schema(uid)
    }

    /// Every visible scalar attribute of a schema.
    pub(super) fn all_fields(&self, schema: &Schema, path: &str) -> FieldSelection {
        let mut identifiers = Vec::new();
        let mut attributes = Vec::new();
        for attribute in schema.attributes() {
            if attribute.kind().scalar_type().is_none()
                || !self.is_visible(attribute, join_path(path, attribute.name()).as_str())
            {
                continue;
            }

            if attribute.is_identifier() {
                identifiers.push(attribute.name().to_owned());
            } else {
                attributes.push(attribute.name().to_owned());
            }
        }

        FieldSelection {
            identifiers,
            attributes,
            wildcard: true,
        }
    }

    pub(super) fn default_order(schema: &Schema) -> Vec<SortEntry> {
        vec![SortEntry {
            path: schema.primary_key().to_owned(),
            direction: SortDirection::Asc,
            explicit: false,
        }]
    }

    /// Plan used when a level is populated without a nested query.
    pub(super) fn default_query(&self, schema: &Schema, path: &str) -> ResolvedQuery {
        ResolvedQuery {
            filters: None,
            order: Self::default_order(schema),
            selection: self.all_fields(schema, path),
            populate: Vec::new(),
            search: None,
            count: false,
        }
    }

    pub(super) fn root_query(
        &self,
        schema: &'a Schema,
        query: &Value,
    ) -> AppResult<ProcessedQuery> {
        let Some(object) = query.as_object() else {
            self.deny(
                Denial::new(QueryParameter::Query, "", DeniedReason::InvalidStructure)
                    .with_detail("query must be an object"),
            )?;
            return Ok(ProcessedQuery {
                query: Value::Object(Map::new()),
                resolved: self.default_query(schema, ""),
            });
        };

        let (narrowed, resolved) = self.query_level(schema, object, "", 0, QueryScope::Root)?;
        Ok(ProcessedQuery {
            query: Value::Object(narrowed),
            resolved,
        })
    }

    /// Dispatches the parameters of one schema level to their engines.
    pub(super) fn query_level(
        &self,
        schema: &'a Schema,
        object: &Map<String, Value>,
        path: &str,
        depth: usize,
        scope: QueryScope,
    ) -> AppResult<(Map<String, Value>, ResolvedQuery)> {
        let mut narrowed = Map::new();
        let mut resolved = self.default_query(schema, path);
        resolved.order.clear();

        for (key, value) in object {
            match key.as_str() {
                "filters" => {
                    if let Some(filters) = self.filters(schema, value, path, depth)? {
                        resolved.filters = Some(filters.clone());
                        narrowed.insert(key.clone(), filters);
                    }
                }
                "sort" => {
                    let (sort, entries) = self.sort(schema, value, path, depth)?;
                    if let Some(sort) = sort {
                        narrowed.insert(key.clone(), sort);
                    }
                    resolved.order.extend(entries);
                }
                "fields" => {
                    let (fields, selection) = self.fields(schema, value, path)?;
                    if let Some(fields) = fields {
                        narrowed.insert(key.clone(), fields);
                    }
                    resolved.selection = selection;
                }
                "populate" => {
                    let (populate, branches) = self.populate(schema, value, path, depth)?;
                    if let Some(populate) = populate {
                        narrowed.insert(key.clone(), populate);
                    }
                    resolved.populate = branches;
                }
                "_q" if scope == QueryScope::Root => {
                    let (search, plan) = self.search(schema, value)?;
                    if let Some(search) = search {
                        narrowed.insert(key.clone(), search);
                    }
                    resolved.search = plan;
                }
                "count" if scope == (QueryScope::Populate { relation: true }) => {
                    if let Some(count) = value.as_bool() {
                        resolved.count = count;
                        narrowed.insert(key.clone(), value.clone());
                    } else {
                        self.deny(
                            Denial::new(
                                QueryParameter::Populate,
                                path,
                                DeniedReason::InvalidStructure,
                            )
                            .with_detail("'count' must be a boolean"),
                        )?;
                    }
                }
                _ if scope == QueryScope::Root => {
                    narrowed.insert(key.clone(), value.clone());
                }
                _ => {
                    self.deny(
                        Denial::new(QueryParameter::Populate, path, DeniedReason::InvalidStructure)
                            .with_detail(format!("unsupported nested query key '{key}'")),
                    )?;
                }
            }
        }

        if resolved.order.is_empty() {
            resolved.order = Self::default_order(schema);
        }

        Ok((narrowed, resolved))
    }
}

/// Appends an attribute name to a dotted path.
pub(super) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_owned();
    }

    format!("{prefix}.{name}")
}
