use super::*;

/// Whether an attribute may be read at a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Visibility {
    Allowed,
    Denied(DeniedReason),
}

pub(super) fn classify<'a>(schema: &'a Schema, name: &str) -> Option<&'a Attribute> {
    schema.attribute(name)
}

/// Password attributes are never readable. Private ones only with an
/// explicit grant for their path.
pub(super) fn visibility(
    attribute: &Attribute,
    path: &str,
    access: &PrivateFieldAccess,
) -> Visibility {
    if attribute.is_password() {
        return Visibility::Denied(DeniedReason::Password);
    }

    if attribute.is_private() && !access.allows(path) {
        return Visibility::Denied(DeniedReason::Private);
    }

    Visibility::Allowed
}

/// Search ignores the private flag: matching on a private column does not
/// return its value.
pub(super) fn search_visibility(attribute: &Attribute) -> Visibility {
    if attribute.is_password() {
        return Visibility::Denied(DeniedReason::Password);
    }

    if !attribute.is_searchable() {
        return Visibility::Denied(DeniedReason::NonSearchable);
    }

    Visibility::Allowed
}
