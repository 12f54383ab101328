use crate::{EnumValue, Value};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);
const TIMESTAMP_OFFSET_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour]:[offset_minute]"
);

macro_rules! convert_integer {
    ($value:expr, $destination:path, $target:ty) => {{
        let value = $value;
        let converted = match &value {
            Value::Boolean(Some(v)) => Some(*v as i128),
            Value::Varchar(Some(v)) => v.trim().parse::<i128>().ok(),
            Value::Char(Some(v)) => v.to_digit(10).map(|v| v as i128),
            Value::Enum(Some(EnumValue {
                ordinal: Some(v), ..
            })) => Some(*v as i128),
            v => v.as_i128(),
        };
        converted
            .and_then(|v| <$target>::try_from(v).ok())
            .map_or(Value::Null, |v| $destination(Some(v)))
    }};
}

/// Best effort conversion of `value` to the variant of `prototype`.
///
/// Used to normalize what drivers return into the declared type of a column.
/// Never fails: combinations that make no sense produce [`Value::Null`].
pub fn convert_value(value: Value, prototype: &Value) -> Value {
    if value.is_null() || matches!(prototype, Value::Null) {
        return value;
    }
    if value.same_type(prototype) {
        return match (value, prototype) {
            (Value::Decimal(v, ..), Value::Decimal(_, precision, scale)) => {
                Value::Decimal(v, *precision, *scale)
            }
            (v, _) => v,
        };
    }
    match prototype {
        Value::Boolean(..) => Value::Boolean(match &value {
            Value::Varchar(Some(v)) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "y" | "yes" => Some(true),
                "false" | "f" | "0" | "n" | "no" => Some(false),
                _ => None,
            },
            Value::Char(Some(v)) => match v {
                '1' | 't' | 'T' | 'y' | 'Y' => Some(true),
                '0' | 'f' | 'F' | 'n' | 'N' => Some(false),
                _ => None,
            },
            v => v.as_i128().map(|v| v != 0),
        }),
        Value::Int8(..) => convert_integer!(value, Value::Int8, i8),
        Value::Int16(..) => convert_integer!(value, Value::Int16, i16),
        Value::Int32(..) => convert_integer!(value, Value::Int32, i32),
        Value::Int64(..) => convert_integer!(value, Value::Int64, i64),
        Value::UInt8(..) => convert_integer!(value, Value::UInt8, u8),
        Value::UInt16(..) => convert_integer!(value, Value::UInt16, u16),
        Value::UInt32(..) => convert_integer!(value, Value::UInt32, u32),
        Value::UInt64(..) => match value {
            // Row versions generated by the server arrive as 8 big endian bytes
            Value::Blob(Some(v)) if v.len() == 8 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&v);
                Value::UInt64(Some(u64::from_be_bytes(bytes)))
            }
            v => convert_integer!(v, Value::UInt64, u64),
        },
        Value::Float32(..) => Value::Float32(match &value {
            Value::Varchar(Some(v)) => v.trim().parse().ok(),
            v => v.as_f64().map(|v| v as _),
        }),
        Value::Float64(..) => Value::Float64(match &value {
            Value::Varchar(Some(v)) => v.trim().parse().ok(),
            v => v.as_f64(),
        }),
        Value::Decimal(_, precision, scale) => {
            let v = match &value {
                Value::Varchar(Some(v)) => v
                    .trim()
                    .parse::<Decimal>()
                    .ok()
                    .or_else(|| Decimal::from_scientific(v.trim()).ok()),
                Value::Float64(Some(v)) => Decimal::from_f64(*v),
                v => v.as_decimal(),
            };
            Value::Decimal(v, *precision, *scale)
        }
        Value::Char(..) => Value::Char(match &value {
            Value::Varchar(Some(v)) if v.chars().count() == 1 => v.chars().next(),
            v => v
                .as_i128()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32),
        }),
        Value::Varchar(..) => match &value {
            Value::Json(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::Date(Some(v)) => Value::Varchar(v.format(DATE_FORMAT).ok()),
            Value::Timestamp(Some(v)) => Value::Varchar(v.format(TIMESTAMP_FORMAT).ok()),
            v => Value::Varchar(v.to_text().map(Into::into)),
        },
        Value::Blob(..) => Value::Blob(match value {
            Value::Uuid(Some(v)) => Some(v.as_bytes().to_vec().into_boxed_slice()),
            Value::Varchar(Some(v)) => Some(v.into_bytes().into_boxed_slice()),
            _ => None,
        }),
        Value::Date(..) => Value::Date(match &value {
            Value::Varchar(Some(v)) => {
                let v = v.trim();
                Date::parse(v, DATE_FORMAT)
                    .ok()
                    .or_else(|| parse_timestamp(v).map(|v| v.date()))
            }
            Value::Timestamp(Some(v)) => Some(v.date()),
            Value::TimestampWithTimezone(Some(v)) => Some(v.date()),
            _ => None,
        }),
        Value::Time(..) => Value::Time(match &value {
            Value::Varchar(Some(v)) => Time::parse(v.trim(), TIME_FORMAT).ok(),
            Value::Timestamp(Some(v)) => Some(v.time()),
            _ => None,
        }),
        Value::Timestamp(..) => Value::Timestamp(match &value {
            Value::Varchar(Some(v)) => parse_timestamp(v),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                Some(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Date(Some(v)) => Some(v.midnight()),
            _ => None,
        }),
        Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(match &value {
            Value::Varchar(Some(v)) => {
                let v = v.trim();
                OffsetDateTime::parse(v, &Rfc3339)
                    .ok()
                    .or_else(|| OffsetDateTime::parse(&v.replacen('T', " ", 1), TIMESTAMP_OFFSET_FORMAT).ok())
                    .or_else(|| parse_timestamp(v).map(|v| v.assume_utc()))
            }
            Value::Timestamp(Some(v)) => Some(v.assume_utc()),
            _ => None,
        }),
        Value::Uuid(..) => Value::Uuid(match &value {
            Value::Varchar(Some(v)) => Uuid::try_parse(v.trim()).ok(),
            Value::Blob(Some(v)) => Uuid::from_slice(v).ok(),
            _ => None,
        }),
        Value::Enum(..) => Value::Enum(match value {
            Value::Varchar(Some(v)) => Some(EnumValue::from_name(v)),
            Value::Char(Some(v)) => Some(EnumValue::from_ordinal(v as i64)),
            v => v.as_i128().and_then(|v| i64::try_from(v).ok()).map(EnumValue::from_ordinal),
        }),
        Value::Json(..) => Value::Json(match &value {
            Value::Varchar(Some(v)) => serde_json::from_str(v).ok(),
            Value::Blob(Some(v)) => serde_json::from_slice(v).ok(),
            _ => None,
        }),
        Value::Null => value,
    }
}

fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    let value = value.trim().replacen('T', " ", 1);
    let value = value.trim_end_matches('Z');
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| Date::parse(value, DATE_FORMAT).ok().map(Date::midnight))
}
