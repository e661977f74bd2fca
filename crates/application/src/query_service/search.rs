use super::*;

impl QueryWalker<'_> {
    /// Resolves `_q` into the attributes the term is matched against.
    /// Blank terms are dropped.
    pub(super) fn search(
        &self,
        schema: &Schema,
        value: &Value,
    ) -> AppResult<(Option<Value>, Option<SearchPlan>)> {
        let Some(term) = value.as_str() else {
            self.deny(
                Denial::new(QueryParameter::Search, "", DeniedReason::InvalidStructure)
                    .with_detail("_q must be a string"),
            )?;
            return Ok((None, None));
        };

        if term.trim().is_empty() {
            return Ok((None, None));
        }

        let numeric = term.trim().parse::<f64>().is_ok_and(f64::is_finite);
        let attributes = schema
            .attributes()
            .iter()
            .filter(|attribute| classifier::search_visibility(attribute) == Visibility::Allowed)
            .filter(|attribute| {
                attribute.kind().scalar_type().is_some_and(|scalar_type| {
                    scalar_type.is_string_like() || (numeric && scalar_type.is_numeric())
                })
            })
            .map(|attribute| attribute.name().to_owned())
            .collect();

        Ok((
            Some(value.clone()),
            Some(SearchPlan {
                term: term.to_owned(),
                attributes,
            }),
        ))
    }
}
