use plist::{Dictionary, Value};

use plistrw_base::{PlistError, PlistResult};

/// Container kind expected at the root of a plist file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RootKind {
    #[default]
    Mapping,
    Sequence,
}

impl RootKind {
    /// Returns the container kind of `value`, or `None` for scalars.
    pub fn of(value: &Value) -> Option<RootKind> {
        match value {
            Value::Dictionary(_) => Some(RootKind::Mapping),
            Value::Array(_) => Some(RootKind::Sequence),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RootKind::Mapping => "mapping",
            RootKind::Sequence => "sequence",
        }
    }
}

impl std::fmt::Display for RootKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Human readable name of a plist value's type, used in error messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "sequence",
        Value::Dictionary(_) => "mapping",
        Value::Boolean(_) => "boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "date",
        Value::Real(_) => "real",
        Value::Integer(_) => "integer",
        Value::String(_) => "string",
        Value::Uid(_) => "uid",
        _ => "unknown value",
    }
}

/// The root container of a plist file.
///
/// Built by [`crate::PlistStore::load`], owned and mutated by the caller
/// afterwards and handed back to [`crate::PlistStore::save`] as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistRoot {
    Mapping(Dictionary),
    Sequence(Vec<Value>),
}

impl PlistRoot {
    pub fn kind(&self) -> RootKind {
        match self {
            PlistRoot::Mapping(_) => RootKind::Mapping,
            PlistRoot::Sequence(_) => RootKind::Sequence,
        }
    }

    pub fn as_mapping(&self) -> Option<&Dictionary> {
        match self {
            PlistRoot::Mapping(dict) => Some(dict),
            PlistRoot::Sequence(_) => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            PlistRoot::Mapping(dict) => Some(dict),
            PlistRoot::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            PlistRoot::Sequence(items) => Some(items),
            PlistRoot::Mapping(_) => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            PlistRoot::Sequence(items) => Some(items),
            PlistRoot::Mapping(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            PlistRoot::Mapping(dict) => Value::Dictionary(dict),
            PlistRoot::Sequence(items) => Value::Array(items),
        }
    }
}

impl TryFrom<Value> for PlistRoot {
    type Error = Box<PlistError>;

    /// Fails with `InvalidArgument` for anything but a dictionary or an array.
    fn try_from(value: Value) -> PlistResult<Self> {
        match value {
            Value::Dictionary(dict) => Ok(PlistRoot::Mapping(dict)),
            Value::Array(items) => Ok(PlistRoot::Sequence(items)),
            other => Err(Box::new(PlistError::invalid_argument(format!(
                "expected a mapping or a sequence, was {}",
                value_type_name(&other)
            )))),
        }
    }
}

impl From<PlistRoot> for Value {
    fn from(root: PlistRoot) -> Self {
        root.into_value()
    }
}

impl From<Dictionary> for PlistRoot {
    fn from(dict: Dictionary) -> Self {
        PlistRoot::Mapping(dict)
    }
}

impl From<Vec<Value>> for PlistRoot {
    fn from(items: Vec<Value>) -> Self {
        PlistRoot::Sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_containers() {
        assert_eq!(
            RootKind::of(&Value::Dictionary(Dictionary::new())),
            Some(RootKind::Mapping)
        );
        assert_eq!(RootKind::of(&Value::Array(vec![])), Some(RootKind::Sequence));
        assert_eq!(RootKind::of(&Value::Boolean(true)), None);
    }

    #[test]
    fn test_default_kind_is_mapping() {
        assert_eq!(RootKind::default(), RootKind::Mapping);
    }

    #[test]
    fn test_try_from_rejects_scalars() {
        let scalars = vec![
            Value::String("text".to_string()),
            Value::Integer(7i64.into()),
            Value::Real(1.5),
            Value::Boolean(false),
            Value::Data(vec![1, 2, 3]),
        ];
        for scalar in scalars {
            let err = PlistRoot::try_from(scalar).unwrap_err();
            assert!(err.is_invalid_argument(), "{}", err);
        }
    }

    #[test]
    fn test_try_from_error_names_the_type() {
        let err = PlistRoot::try_from(Value::String("text".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: expected a mapping or a sequence, was string"
        );
    }

    #[test]
    fn test_mapping_accessors() {
        let mut root = PlistRoot::from(Dictionary::new());
        root.as_mapping_mut()
            .unwrap()
            .insert("version".to_string(), Value::Integer(1i64.into()));

        assert_eq!(root.kind(), RootKind::Mapping);
        assert!(root.as_sequence().is_none());
        assert_eq!(
            root.as_mapping().unwrap().get("version"),
            Some(&Value::Integer(1i64.into()))
        );
    }

    #[test]
    fn test_sequence_into_value() {
        let mut root = PlistRoot::from(vec![Value::Boolean(true)]);
        root.as_sequence_mut().unwrap().push(Value::Boolean(false));

        assert_eq!(
            root.into_value(),
            Value::Array(vec![Value::Boolean(true), Value::Boolean(false)])
        );
    }
}
