use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{borrow::Cow, cmp::Ordering, mem};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moving between entities, expressions and drivers.
///
/// Every variant carries an `Option` payload: the `None` form doubles as the
/// type prototype stored in a [`ColumnDef`](crate::ColumnDef).
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>, /* prec: */ u8, /* scale: */ u8),
    Char(Option<char>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    Enum(Option<EnumValue>),
    Json(Option<serde_json::Value>),
}

/// Host side enum value, knows both representations so that each column can
/// pick the one it is stored as.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: Option<Cow<'static, str>>,
    pub ordinal: Option<i64>,
}

impl EnumValue {
    pub fn new(name: &'static str, ordinal: i64) -> Self {
        Self {
            name: Some(name.into()),
            ordinal: Some(ordinal),
        }
    }
    pub fn from_name(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
            ordinal: None,
        }
    }
    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            name: None,
            ordinal: Some(ordinal),
        }
    }
}

/// Normalized form of a key value, used to match rows across tables whose key
/// columns are declared with different widths or representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Integer(i128),
    Text(String),
    Uuid(Uuid),
    Bytes(Box<[u8]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None, ..)
            | Value::Char(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None)
            | Value::Uuid(None)
            | Value::Enum(None)
            | Value::Json(None) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// The `None` version of this value, keeping decimal precision and scale.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(_, precision, scale) => Value::Decimal(None, *precision, *scale),
            Value::Char(..) => Value::Char(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::Enum(..) => Value::Enum(None),
            Value::Json(..) => Value::Json(None),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::Int8(..)
                | Value::Int16(..)
                | Value::Int32(..)
                | Value::Int64(..)
                | Value::UInt8(..)
                | Value::UInt16(..)
                | Value::UInt32(..)
                | Value::UInt64(..)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => *v,
            _ => None,
        }
    }

    /// Integer content of the value, when it has one and no precision is lost.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int8(Some(v)) => Some(*v as _),
            Value::Int16(Some(v)) => Some(*v as _),
            Value::Int32(Some(v)) => Some(*v as _),
            Value::Int64(Some(v)) => Some(*v as _),
            Value::UInt8(Some(v)) => Some(*v as _),
            Value::UInt16(Some(v)) => Some(*v as _),
            Value::UInt32(Some(v)) => Some(*v as _),
            Value::UInt64(Some(v)) => Some(*v as _),
            Value::Decimal(Some(v), ..) if v.fract().is_zero() => v.to_i128(),
            Value::Float32(Some(v)) if v.fract() == 0.0 && v.is_finite() => Some(*v as _),
            Value::Float64(Some(v)) if v.fract() == 0.0 && v.is_finite() => Some(*v as _),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(Some(v)) => Some(*v as _),
            Value::Float64(Some(v)) => Some(*v),
            Value::Decimal(Some(v), ..) => v.to_f64(),
            v => v.as_i128().map(|v| v as _),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(Some(v), ..) => Some(*v),
            Value::Float32(Some(v)) => Decimal::from_f32_retain(*v),
            Value::Float64(Some(v)) => Decimal::from_f64_retain(*v),
            v => v
                .as_i128()
                .and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Textual content, used when folding string functions and concatenations.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(match self {
            Value::Varchar(Some(v)) => Cow::Borrowed(v.as_str()),
            Value::Char(Some(v)) => Cow::Owned(v.to_string()),
            Value::Boolean(Some(v)) => Cow::Owned(v.to_string()),
            Value::Float32(Some(v)) => Cow::Owned(v.to_string()),
            Value::Float64(Some(v)) => Cow::Owned(v.to_string()),
            Value::Decimal(Some(v), ..) => Cow::Owned(v.to_string()),
            Value::Uuid(Some(v)) => Cow::Owned(v.to_string()),
            Value::Enum(Some(EnumValue { name: Some(v), .. })) => Cow::Borrowed(v.as_ref()),
            v if v.is_integer() => Cow::Owned(v.as_i128()?.to_string()),
            _ => return None,
        })
    }

    /// Normalized key, integer widths and textual forms of the same key compare equal.
    pub fn as_key(&self) -> Option<ValueKey> {
        Some(match self {
            v if v.is_integer() => ValueKey::Integer(v.as_i128()?),
            Value::Decimal(Some(v), ..) if v.fract().is_zero() => ValueKey::Integer(v.to_i128()?),
            Value::Varchar(Some(v)) => match Uuid::try_parse(v) {
                Ok(v) => ValueKey::Uuid(v),
                Err(..) => ValueKey::Text(v.clone()),
            },
            Value::Char(Some(v)) => ValueKey::Text(v.to_string()),
            Value::Uuid(Some(v)) => ValueKey::Uuid(*v),
            Value::Blob(Some(v)) => match Uuid::from_slice(v) {
                Ok(v) => ValueKey::Uuid(v),
                Err(..) => ValueKey::Bytes(v.clone()),
            },
            Value::Enum(Some(EnumValue {
                name: Some(v), ..
            })) => ValueKey::Text(v.to_string()),
            Value::Enum(Some(EnumValue {
                ordinal: Some(v), ..
            })) => ValueKey::Integer(*v as _),
            _ => return None,
        })
    }

    /// Host side comparison used while folding constant expressions. Returns
    /// `None` when the two values cannot be compared.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if let (Some(l), Some(r)) = (self.as_i128(), other.as_i128()) {
            return Some(l.cmp(&r));
        }
        match (self, other) {
            (Value::Decimal(Some(l), ..), r) => return r.as_decimal().map(|r| l.cmp(&r)),
            (l, Value::Decimal(Some(r), ..)) => return l.as_decimal().map(|l| l.cmp(r)),
            _ => {}
        }
        if let (Some(l), Some(r)) = (self.as_f64(), other.as_f64()) {
            return l.partial_cmp(&r);
        }
        match (self, other) {
            (Value::Boolean(Some(l)), Value::Boolean(Some(r))) => Some(l.cmp(r)),
            (Value::Varchar(..) | Value::Char(..), Value::Varchar(..) | Value::Char(..)) => {
                Some(self.to_text()?.cmp(&other.to_text()?))
            }
            (Value::Date(Some(l)), Value::Date(Some(r))) => Some(l.cmp(r)),
            (Value::Time(Some(l)), Value::Time(Some(r))) => Some(l.cmp(r)),
            (Value::Timestamp(Some(l)), Value::Timestamp(Some(r))) => Some(l.cmp(r)),
            (Value::TimestampWithTimezone(Some(l)), Value::TimestampWithTimezone(Some(r))) => {
                Some(l.cmp(r))
            }
            (Value::Uuid(Some(l)), Value::Uuid(Some(r))) => Some(l.cmp(r)),
            (Value::Blob(Some(l)), Value::Blob(Some(r))) => Some(l.cmp(r)),
            (Value::Enum(Some(l)), Value::Enum(Some(r))) => match (l, r) {
                (
                    EnumValue {
                        name: Some(l), ..
                    },
                    EnumValue {
                        name: Some(r), ..
                    },
                ) => Some(l.cmp(r)),
                (
                    EnumValue {
                        ordinal: Some(l), ..
                    },
                    EnumValue {
                        ordinal: Some(r), ..
                    },
                ) => Some(l.cmp(r)),
                _ => None,
            },
            (Value::Json(Some(l)), Value::Json(Some(r))) if l == r => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l, ..), Self::Decimal(r, ..)) => l == r,
            (Self::Char(l), Self::Char(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Enum(l), Self::Enum(r)) => l == r,
            (Self::Json(l), Self::Json(r)) => l == r,
            _ => self.is_null() && other.is_null(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}
