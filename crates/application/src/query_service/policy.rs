use super::*;

/// Why a clause was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DeniedReason {
    Private,
    Password,
    UnknownField,
    NonSearchable,
    OperatorIncompatible,
    /// A dynamic-zone `on` map with no component. Dropped in both modes.
    EmptyFragment,
    InvalidStructure,
    NotSelectable,
    DepthExceeded,
}

impl DeniedReason {
    pub(super) fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Password => "password",
            Self::UnknownField => "unknown",
            Self::NonSearchable => "non-searchable",
            Self::OperatorIncompatible => "operator-incompatible",
            Self::EmptyFragment => "empty-fragment",
            Self::InvalidStructure => "invalid-structure",
            Self::NotSelectable => "not-selectable",
            Self::DepthExceeded => "depth-exceeded",
        }
    }

    /// Returns whether validate mode drops the clause instead of failing.
    pub(super) fn is_tolerated(&self) -> bool {
        matches!(self, Self::EmptyFragment)
    }
}

/// One refused clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Denial {
    pub(super) parameter: QueryParameter,
    pub(super) path: String,
    pub(super) reason: DeniedReason,
    pub(super) detail: Option<String>,
}

impl Denial {
    pub(super) fn new(
        parameter: QueryParameter,
        path: impl Into<String>,
        reason: DeniedReason,
    ) -> Self {
        Self {
            parameter,
            path: path.into(),
            reason,
            detail: None,
        }
    }

    #[must_use]
    pub(super) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(super) fn into_violation(self) -> QueryViolation {
        let Self {
            parameter,
            path,
            reason,
            detail,
        } = self;

        match reason {
            DeniedReason::UnknownField => QueryViolation::UnknownField { parameter, path },
            DeniedReason::Private | DeniedReason::Password | DeniedReason::NonSearchable => {
                QueryViolation::ForbiddenField {
                    parameter,
                    path,
                    reason: reason.as_str().to_owned(),
                }
            }
            DeniedReason::OperatorIncompatible => QueryViolation::IncompatibleOperator {
                parameter,
                path,
                operator: detail.unwrap_or_default(),
            },
            DeniedReason::EmptyFragment
            | DeniedReason::InvalidStructure
            | DeniedReason::NotSelectable
            | DeniedReason::DepthExceeded => QueryViolation::InvalidStructure {
                parameter,
                path,
                detail: detail.unwrap_or_else(|| reason.as_str().to_owned()),
            },
        }
    }
}

/// What the walker does with a refused clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DenialAction {
    Drop,
    Abort(QueryViolation),
}

/// Decides the fate of every refused clause for one engine run.
pub(super) trait DenialPolicy: Send + Sync {
    fn mode(&self) -> QueryMode;

    fn on_denied(&self, denial: &Denial) -> DenialAction;
}

pub(super) struct SanitizePolicy;

impl DenialPolicy for SanitizePolicy {
    fn mode(&self) -> QueryMode {
        QueryMode::Sanitize
    }

    fn on_denied(&self, denial: &Denial) -> DenialAction {
        debug!(
            parameter = %denial.parameter,
            path = %denial.path,
            reason = denial.reason.as_str(),
            "dropping query clause"
        );
        DenialAction::Drop
    }
}

pub(super) struct ValidatePolicy;

impl DenialPolicy for ValidatePolicy {
    fn mode(&self) -> QueryMode {
        QueryMode::Validate
    }

    fn on_denied(&self, denial: &Denial) -> DenialAction {
        if denial.reason.is_tolerated() {
            return DenialAction::Drop;
        }

        DenialAction::Abort(denial.clone().into_violation())
    }
}
