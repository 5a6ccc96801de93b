//! Self-describing documentation for method inputs and outputs.
//!
//! Every type that crosses the adapter implements [`Describe`], normally
//! through `#[derive(Describe)]`, and returns a [`Property`] tree that the
//! `/help` endpoints serialize as-is.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structural type reported for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Number,
    Boolean,
    #[default]
    Object,
    Array,
}

/// Describes one field (or a whole record) of a method input or output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
}

impl Property {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn object(properties: BTreeMap<String, Property>) -> Self {
        Self {
            kind: Kind::Object,
            properties,
            ..Self::default()
        }
    }

    pub fn array(items: Property) -> Self {
        Self {
            kind: Kind::Array,
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Overlays per-field hints. Only hints that are present replace the
    /// type-derived values.
    pub fn with_hints(mut self, hints: FieldHints) -> Self {
        if let Some(example) = hints.example {
            self.example = Some(example.to_string());
        }
        if let Some(format) = hints.format {
            self.format = Some(format.to_string());
        }
        if let Some(validate) = hints.validate {
            self.validate = Some(validate.to_string());
        }
        self
    }
}

/// Out-of-band metadata attached to a field with `#[describe(..)]` or
/// `#[validate(..)]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldHints {
    pub example: Option<&'static str>,
    pub format: Option<&'static str>,
    pub validate: Option<&'static str>,
}

/// Produces the documentation tree for a type.
///
/// UUID and timestamp examples are generated on every call.
pub trait Describe {
    fn describe() -> Property;
}

/// Body of `GET /{service}/help`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHelp {
    pub methods: Vec<String>,
}

/// Body of `GET /{service}/{method}/help`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodHelp {
    pub request: Property,
    pub response: Property,
}

thread_local! {
    static DESCRIBING: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Describes the record `T` with `fields`, unless `T` is already being
/// described further up the current call stack, in which case a bare
/// `object` is returned so self-referential types terminate.
///
/// Used by `#[derive(Describe)]`.
pub fn describe_record<T: ?Sized>(fields: impl FnOnce() -> BTreeMap<String, Property>) -> Property {
    let name = std::any::type_name::<T>();
    let entered = DESCRIBING.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.contains(&name) {
            false
        } else {
            stack.push(name);
            true
        }
    });
    if !entered {
        return Property::new(Kind::Object);
    }

    struct Leave;
    impl Drop for Leave {
        fn drop(&mut self) {
            DESCRIBING.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
    let _leave = Leave;

    Property::object(fields())
}

macro_rules! describe_as {
    ($kind:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> Property {
                    Property::new($kind)
                }
            }
        )*
    };
}

describe_as!(Kind::String => String, str, char);
describe_as!(Kind::Boolean => bool);
describe_as!(Kind::Number => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
describe_as!(Kind::Object => serde_json::Value, serde_json::Map<String, serde_json::Value>);

impl Describe for Uuid {
    fn describe() -> Property {
        Property::new(Kind::String)
            .format("uuid")
            .example(Uuid::new_v4().to_string())
    }
}

impl<Tz: TimeZone> Describe for DateTime<Tz> {
    fn describe() -> Property {
        Property::new(Kind::String)
            .format("rfc3339")
            .example(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

macro_rules! describe_transparent {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn describe() -> Property {
                    T::describe()
                }
            }
        )*
    };
}

describe_transparent!(Box, Arc, Rc);

impl<T: Describe> Describe for Option<T> {
    fn describe() -> Property {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> Property {
        T::describe()
    }
}

macro_rules! describe_sequence {
    ($($seq:ident),*) => {
        $(
            impl<T: Describe> Describe for $seq<T> {
                fn describe() -> Property {
                    Property::array(T::describe())
                }
            }
        )*
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> Property {
        Property::array(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> Property {
        Property::array(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> Property {
        Property::array(T::describe())
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe() -> Property {
        Property::new(Kind::Object)
    }
}

impl<K, V, S> Describe for HashMap<K, V, S> {
    fn describe() -> Property {
        Property::new(Kind::Object)
    }
}
