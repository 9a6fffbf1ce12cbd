use chrono::NaiveDateTime;

/// Declared storage type of an attribute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FieldType {
    Text,
    Long,
    Double,
    Date,
    Geometry,
    ObjectId,
}

impl FieldType {
    /// Whether values of this type are stored as character data.
    pub fn is_string_like(self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_geometry(self) -> bool {
        matches!(self, Self::Geometry)
    }

    /// Whether an existing field of type `existing` satisfies a request for
    /// `self`. Types match exactly, except that a `Text` request accepts any
    /// string-like storage type.
    pub fn accepts(self, existing: FieldType) -> bool {
        self == existing || (self == Self::Text && existing.is_string_like())
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Text(String),
    Long(i64),
    Double(f64),
    Date(NaiveDateTime),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Coerces numeric-looking values to an integer. Text is parsed after
    /// trimming; doubles convert only when they carry no fraction.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(value) => Some(*value),
            Self::Double(value) if value.fract() == 0.0 => Some(*value as i64),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// The storage type this value naturally belongs to, if any.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Text(_) => Some(FieldType::Text),
            Self::Long(_) => Some(FieldType::Long),
            Self::Double(_) => Some(FieldType::Double),
            Self::Date(_) => Some(FieldType::Date),
            Self::Null => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_accepts_string_like_storage() {
        assert!(FieldType::Text.accepts(FieldType::Text));
        assert!(!FieldType::Text.accepts(FieldType::Long));
        assert!(!FieldType::Long.accepts(FieldType::Text));
        assert!(FieldType::Long.accepts(FieldType::Long));
    }

    #[test]
    fn long_coercion() {
        assert_eq!(Value::Long(20230101).as_long(), Some(20230101));
        assert_eq!(Value::Text(" 2023 ".to_string()).as_long(), Some(2023));
        assert_eq!(Value::Double(5.0).as_long(), Some(5));
        assert_eq!(Value::Double(5.5).as_long(), None);
        assert_eq!(Value::Null.as_long(), None);
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Long(7));
    }
}
