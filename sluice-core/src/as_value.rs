use crate::{EnumValue, Error, Result, Value, truncate_long};
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    any,
    borrow::Cow,
    ops::{Deref, DerefMut},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Every entity field type implements this trait: the derive uses
/// [`AsValue::as_empty_value`] as the column type prototype,
/// [`AsValue::as_value`] to produce statement parameters and
/// [`AsValue::try_from_value`] while materializing rows.
///
/// # Examples
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The `None` variant matching this type, never allocates.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    /// Convert back from a value. Integer widths are interchangeable as long as
    /// the content fits, anything else must be the canonical variant.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Whether `NULL` is a legal value for this type.
    fn nullable() -> bool {
        false
    }
}

fn mismatch<T>(value: &Value) -> Error {
    let value = format!("{value:?}");
    Error::msg(format!(
        "Cannot convert {} to {}",
        truncate_long!(value),
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(Some(v)) = value {
                    return Ok(v);
                }
                let Some(v) = value.as_i128() else {
                    return Err(mismatch::<Self>(&value));
                };
                <$source>::try_from(v).map_err(|_| {
                    Error::msg(format!(
                        "Value {v} is out of range for {}",
                        any::type_name::<Self>()
                    ))
                })
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            ref v if v.is_integer() && !v.is_null() => Ok(v.as_i128() != Some(0)),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(Some(v)) = value {
                    return Ok(v);
                }
                value
                    .as_f64()
                    .map(|v| v as _)
                    .ok_or_else(|| mismatch::<Self>(&value))
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None, 0, 0)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self), 0, 0)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Value::Varchar(Some(v)) = &value {
            return v.trim().parse().map_err(|_| mismatch::<Self>(&value));
        }
        value.as_decimal().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl AsValue for char {
    fn as_empty_value() -> Value {
        Value::Char(None)
    }
    fn as_value(self) -> Value {
        Value::Char(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) if v.chars().count() == 1 => {
                v.chars().next().ok_or_else(|| mismatch::<Self>(&value))
            }
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Char(Some(v)) => Ok(v.into()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Cow<'static, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

macro_rules! impl_as_value_exact {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    v => Err(mismatch::<Self>(&v)),
                }
            }
        }
    };
}
impl_as_value_exact!(Date, Value::Date);
impl_as_value_exact!(Time, Value::Time);
impl_as_value_exact!(PrimitiveDateTime, Value::Timestamp);
impl_as_value_exact!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value_exact!(Uuid, Value::Uuid);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn nullable() -> bool {
        true
    }
}

/// Field stored as a JSON document in a single column, used for nested
/// sub-objects and lists that have no table of their own.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Json<T>(pub T);

impl<T> Deref for Json<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Serialize + DeserializeOwned> AsValue for Json<T> {
    fn as_empty_value() -> Value {
        Value::Json(None)
    }
    fn as_value(self) -> Value {
        match serde_json::to_value(&self.0) {
            Ok(v) => Value::Json(Some(v)),
            Err(e) => {
                log::warn!(
                    "Could not serialize {} as json: {e:#}",
                    any::type_name::<T>()
                );
                Value::Json(None)
            }
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let result = match value {
            Value::Json(Some(v)) => serde_json::from_value(v),
            Value::Varchar(Some(v)) => serde_json::from_str(&v),
            v => return Err(mismatch::<Self>(&v)),
        };
        result.map(Json).map_err(|e| {
            Error::new(e).context(format!(
                "While decoding {} from json",
                any::type_name::<T>()
            ))
        })
    }
}

/// Unit-only enums stored in a column, either by name, by ordinal or as a
/// single character. Implement it and then call [`impl_as_value_enum!`].
///
/// ```rust
/// use sluice_core::{SqlEnum, impl_as_value_enum};
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     Active = 1,
///     Suspended = 2,
/// }
/// impl SqlEnum for Status {
///     const VARIANTS: &'static [Self] = &[Status::Active, Status::Suspended];
///     fn name(&self) -> &'static str {
///         match self {
///             Status::Active => "Active",
///             Status::Suspended => "Suspended",
///         }
///     }
///     fn ordinal(&self) -> i64 {
///         *self as i64
///     }
/// }
/// impl_as_value_enum!(Status);
/// ```
pub trait SqlEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];
    fn name(&self) -> &'static str;
    fn ordinal(&self) -> i64;

    fn to_enum_value(&self) -> EnumValue {
        EnumValue::new(self.name(), self.ordinal())
    }

    /// Resolve a stored value: names compare case insensitively, integers are
    /// ordinals and characters are ordinals expressed as code points.
    fn from_enum_value(value: &Value) -> Result<Self> {
        let found = match value {
            Value::Enum(Some(EnumValue {
                name: Some(name), ..
            })) => Self::find_name(name),
            Value::Enum(Some(EnumValue {
                ordinal: Some(ordinal),
                ..
            })) => Self::find_ordinal(*ordinal),
            Value::Varchar(Some(name)) => Self::find_name(name),
            Value::Char(Some(c)) => Self::find_ordinal(*c as i64)
                .or_else(|| Self::find_name(c.encode_utf8(&mut [0; 4]))),
            v => v
                .as_i128()
                .and_then(|v| i64::try_from(v).ok())
                .and_then(Self::find_ordinal),
        };
        found.ok_or_else(|| mismatch::<Self>(value))
    }

    fn find_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|v| v.name().eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    fn find_ordinal(ordinal: i64) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|v| v.ordinal() == ordinal)
            .copied()
    }
}

/// Implement [`AsValue`] for a type implementing [`SqlEnum`].
#[macro_export]
macro_rules! impl_as_value_enum {
    ($enum:ty) => {
        impl $crate::AsValue for $enum {
            fn as_empty_value() -> $crate::Value {
                $crate::Value::Enum(None)
            }
            fn as_value(self) -> $crate::Value {
                $crate::Value::Enum(Some($crate::SqlEnum::to_enum_value(&self)))
            }
            fn try_from_value(value: $crate::Value) -> $crate::Result<Self> {
                <Self as $crate::SqlEnum>::from_enum_value(&value)
            }
        }
    };
}
