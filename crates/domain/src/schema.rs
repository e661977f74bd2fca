use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use quarry_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Schema UID of the upload file model targeted by every media attribute.
pub const MEDIA_SCHEMA_UID: &str = "plugin::upload.file";

const ID: &str = "id";
const DOCUMENT_ID: &str = "documentId";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";
const PUBLISHED_AT: &str = "publishedAt";

const RESERVED_ATTRIBUTE_NAMES: [&str; 5] = [ID, DOCUMENT_ID, CREATED_AT, UPDATED_AT, PUBLISHED_AT];

/// Unique identifier of a content type or component schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaUid(NonEmptyString);

impl SchemaUid {
    /// Creates a validated schema UID.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?))
    }

    /// Returns the UID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SchemaUid {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Kind of schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
    /// Content type with many entries.
    CollectionType,
    /// Content type with a single entry.
    SingleType,
    /// Reusable component embedded in other schemas.
    Component,
}

impl SchemaKind {
    /// Returns the stable document value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectionType => "collectionType",
            Self::SingleType => "singleType",
            Self::Component => "component",
        }
    }

    /// Returns whether the schema is a content type rather than a component.
    #[must_use]
    pub fn is_content_type(&self) -> bool {
        !matches!(self, Self::Component)
    }
}

impl FromStr for SchemaKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "collectionType" => Ok(Self::CollectionType),
            "singleType" => Ok(Self::SingleType),
            "component" => Ok(Self::Component),
            _ => Err(AppError::Validation(format!(
                "unknown schema kind '{value}'"
            ))),
        }
    }
}

/// Concrete type of a scalar attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// Short string.
    String,
    /// Long text.
    Text,
    /// Markdown rich text.
    RichText,
    /// Structured block content.
    Blocks,
    /// Email address.
    Email,
    /// Hashed password. Never readable through queries.
    Password,
    /// Unique slug.
    Uid,
    /// One of a fixed set of strings.
    Enumeration,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Floating point number.
    Float,
    /// Decimal number.
    Decimal,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Date with time.
    DateTime,
    /// Time of day.
    Time,
    /// Unix timestamp.
    Timestamp,
    /// Arbitrary JSON.
    Json,
}

impl ScalarType {
    /// Returns the stable document value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::RichText => "richtext",
            Self::Blocks => "blocks",
            Self::Email => "email",
            Self::Password => "password",
            Self::Uid => "uid",
            Self::Enumeration => "enumeration",
            Self::Integer => "integer",
            Self::BigInteger => "biginteger",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }

    /// Returns whether values are matched as text.
    #[must_use]
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Text
                | Self::RichText
                | Self::Email
                | Self::Uid
                | Self::Enumeration
        )
    }

    /// Returns whether values are numbers.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::BigInteger | Self::Float | Self::Decimal
        )
    }

    /// Returns whether values are points in time.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTime | Self::Time | Self::Timestamp
        )
    }

    /// Returns whether values have a total order usable by range operators.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.is_string_like() || self.is_numeric() || self.is_temporal()
    }
}

impl FromStr for ScalarType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "string" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "richtext" => Ok(Self::RichText),
            "blocks" => Ok(Self::Blocks),
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            "uid" => Ok(Self::Uid),
            "enumeration" => Ok(Self::Enumeration),
            "integer" => Ok(Self::Integer),
            "biginteger" => Ok(Self::BigInteger),
            "float" => Ok(Self::Float),
            "decimal" => Ok(Self::Decimal),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "time" => Ok(Self::Time),
            "timestamp" => Ok(Self::Timestamp),
            "json" => Ok(Self::Json),
            _ => Err(AppError::Validation(format!(
                "unknown scalar type '{value}'"
            ))),
        }
    }
}

/// Cardinality of a relation attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationCardinality {
    /// One entry on each side.
    OneToOne,
    /// Many entries on the target side.
    OneToMany,
    /// Many entries on the owning side.
    ManyToOne,
    /// Many entries on both sides.
    ManyToMany,
}

impl RelationCardinality {
    /// Returns the stable document value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "oneToOne",
            Self::OneToMany => "oneToMany",
            Self::ManyToOne => "manyToOne",
            Self::ManyToMany => "manyToMany",
        }
    }

    /// Returns whether one entry may reference many targets.
    #[must_use]
    pub fn is_to_many(&self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

impl FromStr for RelationCardinality {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "oneToOne" => Ok(Self::OneToOne),
            "oneToMany" => Ok(Self::OneToMany),
            "manyToOne" => Ok(Self::ManyToOne),
            "manyToMany" => Ok(Self::ManyToMany),
            _ => Err(AppError::Validation(format!(
                "unknown relation cardinality '{value}'"
            ))),
        }
    }
}

/// Shape of an attribute and the schemas it reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// Plain value column.
    Scalar(ScalarType),
    /// Reference to entries of another content type.
    Relation {
        /// Target content type.
        target: SchemaUid,
        /// Relation cardinality.
        cardinality: RelationCardinality,
    },
    /// Embedded component.
    Component {
        /// Component schema.
        component: SchemaUid,
        /// Whether the attribute holds a list of components.
        repeatable: bool,
    },
    /// List of components picked per entry from a fixed set.
    DynamicZone {
        /// Allowed component schemas.
        components: Vec<SchemaUid>,
    },
    /// Upload file reference.
    Media {
        /// Whether the attribute holds several files.
        multiple: bool,
    },
}

impl AttributeKind {
    /// Returns a short label used in messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Relation { .. } => "relation",
            Self::Component { .. } => "component",
            Self::DynamicZone { .. } => "dynamiczone",
            Self::Media { .. } => "media",
        }
    }

    /// Returns the scalar type for scalar attributes.
    #[must_use]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(scalar_type) => Some(*scalar_type),
            _ => None,
        }
    }

    /// Returns the single schema a relation, component or media attribute
    /// points to. Dynamic zones reach several schemas and return `None`.
    #[must_use]
    pub fn target_uid(&self) -> Option<&str> {
        match self {
            Self::Relation { target, .. } => Some(target.as_str()),
            Self::Component { component, .. } => Some(component.as_str()),
            Self::Media { .. } => Some(MEDIA_SCHEMA_UID),
            Self::Scalar(_) | Self::DynamicZone { .. } => None,
        }
    }

    /// Returns every schema UID referenced by the attribute.
    #[must_use]
    pub fn referenced_uids(&self) -> Vec<&str> {
        match self {
            Self::DynamicZone { components } => {
                components.iter().map(SchemaUid::as_str).collect()
            }
            _ => self.target_uid().into_iter().collect(),
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: NonEmptyString,
    kind: AttributeKind,
    private: bool,
    searchable: Option<bool>,
    system: bool,
}

impl Attribute {
    /// Creates a public attribute with default searchability.
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().contains('.') || name.as_str().contains(',') {
            return Err(AppError::Validation(format!(
                "attribute name '{}' must not contain '.' or ','",
                name.as_str()
            )));
        }

        if let AttributeKind::DynamicZone { components } = &kind
            && components.is_empty()
        {
            return Err(AppError::Validation(format!(
                "dynamic zone '{}' must allow at least one component",
                name.as_str()
            )));
        }

        Ok(Self {
            name,
            kind,
            private: false,
            searchable: None,
            system: false,
        })
    }

    /// Marks the attribute private.
    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Sets the explicit searchable flag.
    #[must_use]
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = Some(searchable);
        self
    }

    fn system(name: &str, scalar_type: ScalarType) -> AppResult<Self> {
        let mut attribute = Self::new(name, AttributeKind::Scalar(scalar_type))?;
        attribute.system = true;
        Ok(attribute)
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the attribute kind.
    #[must_use]
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Returns whether the attribute is private.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Returns whether the attribute is a password scalar.
    #[must_use]
    pub fn is_password(&self) -> bool {
        self.kind.scalar_type() == Some(ScalarType::Password)
    }

    /// Returns whether the attribute always appears in a field selection.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.system && matches!(self.name(), ID | DOCUMENT_ID)
    }

    /// Returns whether the attribute may take part in full-text search.
    ///
    /// Only scalar, non-password attributes are searchable, and an explicit
    /// `searchable: false` opts out.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        match self.kind.scalar_type() {
            Some(ScalarType::Password) | None => false,
            Some(_) => self.searchable.unwrap_or(true),
        }
    }
}

/// Content type or component schema.
///
/// Attributes keep declaration order. System attributes (`id`, and for
/// content types `documentId` and the timestamps) are added on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    uid: SchemaUid,
    kind: SchemaKind,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Creates a schema and appends its system attributes.
    pub fn new(
        uid: SchemaUid,
        kind: SchemaKind,
        draft_and_publish: bool,
        attributes: Vec<Attribute>,
    ) -> AppResult<Self> {
        if draft_and_publish && !kind.is_content_type() {
            return Err(AppError::Validation(format!(
                "component '{uid}' cannot enable draft and publish"
            )));
        }

        let mut seen = HashSet::new();
        for attribute in &attributes {
            if RESERVED_ATTRIBUTE_NAMES.contains(&attribute.name()) {
                return Err(AppError::Validation(format!(
                    "attribute name '{}' is reserved in schema '{uid}'",
                    attribute.name()
                )));
            }

            if !seen.insert(attribute.name().to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate attribute '{}' in schema '{uid}'",
                    attribute.name()
                )));
            }

            if matches!(attribute.kind(), AttributeKind::DynamicZone { .. })
                && !kind.is_content_type()
            {
                return Err(AppError::Validation(format!(
                    "component '{uid}' cannot declare dynamic zone '{}'",
                    attribute.name()
                )));
            }
        }

        let mut all_attributes = vec![Attribute::system(ID, ScalarType::Integer)?];
        if kind.is_content_type() {
            all_attributes.push(Attribute::system(DOCUMENT_ID, ScalarType::String)?);
        }
        all_attributes.extend(attributes);
        if kind.is_content_type() {
            all_attributes.push(Attribute::system(CREATED_AT, ScalarType::DateTime)?);
            all_attributes.push(Attribute::system(UPDATED_AT, ScalarType::DateTime)?);
            if draft_and_publish {
                all_attributes.push(Attribute::system(PUBLISHED_AT, ScalarType::DateTime)?);
            }
        }

        Ok(Self {
            uid,
            kind,
            attributes: all_attributes,
        })
    }

    /// Returns the schema UID.
    #[must_use]
    pub fn uid(&self) -> &SchemaUid {
        &self.uid
    }

    /// Returns the schema kind.
    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Returns every attribute, system attributes included.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name() == name)
    }

    /// Returns the name of the primary key used for default ordering.
    #[must_use]
    pub fn primary_key(&self) -> &'static str {
        ID
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Attribute, AttributeKind, ScalarType, Schema, SchemaKind, SchemaUid};

    fn uid(value: &str) -> SchemaUid {
        SchemaUid::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn scalar(name: &str, scalar_type: ScalarType) -> Attribute {
        Attribute::new(name, AttributeKind::Scalar(scalar_type)).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn schema_rejects_duplicate_attributes() {
        let result = Schema::new(
            uid("api::document.document"),
            SchemaKind::CollectionType,
            false,
            vec![
                scalar("name", ScalarType::String),
                scalar("name", ScalarType::Text),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn schema_rejects_reserved_attribute_names() {
        let result = Schema::new(
            uid("api::document.document"),
            SchemaKind::CollectionType,
            false,
            vec![scalar("documentId", ScalarType::String)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn content_types_receive_system_attributes() {
        let schema = Schema::new(
            uid("api::document.document"),
            SchemaKind::CollectionType,
            true,
            vec![scalar("name", ScalarType::String)],
        )
        .unwrap_or_else(|_| unreachable!());

        let names: Vec<&str> = schema.attributes().iter().map(Attribute::name).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "documentId",
                "name",
                "createdAt",
                "updatedAt",
                "publishedAt"
            ]
        );
        assert!(schema.attribute("documentId").is_some_and(Attribute::is_identifier));
        assert!(schema.attribute("createdAt").is_some_and(|attribute| !attribute.is_identifier()));
    }

    #[test]
    fn components_only_receive_an_id() {
        let schema = Schema::new(
            uid("default.component-a"),
            SchemaKind::Component,
            false,
            vec![scalar("name", ScalarType::String)],
        )
        .unwrap_or_else(|_| unreachable!());

        let names: Vec<&str> = schema.attributes().iter().map(Attribute::name).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn components_cannot_declare_dynamic_zones() {
        let dz = Attribute::new(
            "dz",
            AttributeKind::DynamicZone {
                components: vec![uid("default.component-a")],
            },
        )
        .unwrap_or_else(|_| unreachable!());

        let result = Schema::new(
            uid("default.component-b"),
            SchemaKind::Component,
            false,
            vec![dz],
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_dynamic_zones_are_rejected() {
        let result = Attribute::new("dz", AttributeKind::DynamicZone { components: Vec::new() });
        assert!(result.is_err());
    }

    #[test]
    fn password_and_relational_attributes_are_never_searchable() {
        assert!(!scalar("password", ScalarType::Password).is_searchable());
        assert!(!scalar("name", ScalarType::String).with_searchable(false).is_searchable());
        assert!(scalar("name", ScalarType::String).with_private(true).is_searchable());

        let media = Attribute::new("media", AttributeKind::Media { multiple: true })
            .unwrap_or_else(|_| unreachable!());
        assert!(!media.with_searchable(true).is_searchable());
    }

    #[test]
    fn scalar_types_round_trip_through_document_values() {
        for value in ["string", "password", "biginteger", "datetime", "json"] {
            let parsed = ScalarType::from_str(value).unwrap_or_else(|_| unreachable!());
            assert_eq!(parsed.as_str(), value);
        }
        assert!(ScalarType::from_str("geometry").is_err());
    }
}
