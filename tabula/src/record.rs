//! Typed field accessors for record shapes.
//!
//! Every record shape gets one accessor table, usually generated by
//! `#[derive(Record)]`. Each entry is a pair of plain function pointers, so
//! field access never goes through reflection or string lookups at read time.

use std::fmt;

use crate::widget::InputKind;

type Setter<R, T> = fn(&mut R, T) -> Result<(), T>;

/// A named getter/setter pair for one field of `R`.
///
/// The setter hands the value back when the field cannot hold it.
pub struct Field<R, T> {
    name: &'static str,
    get: fn(&R) -> T,
    set: Setter<R, T>,
}

impl<R, T> Field<R, T> {
    pub const fn new(name: &'static str, get: fn(&R) -> T, set: Setter<R, T>) -> Self {
        Self { name, get, set }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from `record`.
    pub fn get(&self, record: &R) -> T {
        (self.get)(record)
    }

    /// Write `value` into `record` in place.
    ///
    /// A value the field cannot represent comes back as `Err` and `record`
    /// keeps its old value.
    pub fn set(&self, record: &mut R, value: T) -> Result<(), T> {
        (self.set)(record, value)
    }
}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for Field<R, T> {}

impl<R, T> fmt::Debug for Field<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// A field accessor tagged with the value channel it speaks.
///
/// Text inputs carry `String`, number inputs carry `f64`.
pub enum Accessor<R> {
    Text(Field<R, String>),
    Number(Field<R, f64>),
}

impl<R> Accessor<R> {
    pub fn name(&self) -> &'static str {
        match self {
            Accessor::Text(field) => field.name(),
            Accessor::Number(field) => field.name(),
        }
    }

    /// Whether an input of `kind` can be bound to this field.
    pub fn accepts(&self, kind: InputKind) -> bool {
        matches!(
            (self, kind),
            (Accessor::Text(_), InputKind::Text | InputKind::Search)
                | (Accessor::Number(_), InputKind::Number)
        )
    }

    /// Channel name, for diagnostics.
    pub fn channel(&self) -> &'static str {
        match self {
            Accessor::Text(_) => "text",
            Accessor::Number(_) => "number",
        }
    }

    /// Render the current value of this field as a string.
    pub fn display(&self, record: &R) -> String {
        match self {
            Accessor::Text(field) => field.get(record),
            Accessor::Number(field) => field.get(record).to_string(),
        }
    }
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Accessor<R> {}

impl<R> fmt::Debug for Accessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor::{}({})", self.channel(), self.name())
    }
}

/// A Rust field type that can sit behind an input widget.
///
/// The generated accessor converts between the field type and its channel;
/// bindings only ever see the channel type.
pub trait FieldValue: Sized {
    /// `String` for text fields, `f64` for numeric fields.
    type Channel;

    fn to_channel(&self) -> Self::Channel;

    /// Convert back from the channel, returning the channel value unchanged
    /// if this type cannot represent it exactly.
    fn from_channel(value: Self::Channel) -> Result<Self, Self::Channel>;

    fn accessor<R>(field: Field<R, Self::Channel>) -> Accessor<R>;
}

impl FieldValue for String {
    type Channel = String;

    fn to_channel(&self) -> String {
        self.clone()
    }

    fn from_channel(value: String) -> Result<Self, String> {
        Ok(value)
    }

    fn accessor<R>(field: Field<R, String>) -> Accessor<R> {
        Accessor::Text(field)
    }
}

macro_rules! numeric_field_value {
    (@impl $ty:ty, |$value:ident| $from:expr) => {
        impl FieldValue for $ty {
            type Channel = f64;

            fn to_channel(&self) -> f64 {
                *self as f64
            }

            fn from_channel($value: f64) -> Result<Self, f64> {
                $from
            }

            fn accessor<R>(field: Field<R, f64>) -> Accessor<R> {
                Accessor::Number(field)
            }
        }
    };
    (int: $($ty:ty),* $(,)?) => {
        $(
            // `as` truncates and saturates, so only accept exact round trips.
            numeric_field_value!(@impl $ty, |value| {
                let cast = value as $ty;
                if cast as f64 == value { Ok(cast) } else { Err(value) }
            });
        )*
    };
    (float: $($ty:ty),* $(,)?) => {
        $(
            numeric_field_value!(@impl $ty, |value| Ok(value as $ty));
        )*
    };
}

numeric_field_value!(int: i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
numeric_field_value!(float: f32, f64);

/// A record shape with a generated accessor table.
///
/// # Example
///
/// ```
/// use tabula::Record;
///
/// #[derive(Record)]
/// struct Item {
///     a: i64,
///     label: String,
/// }
///
/// assert_eq!(Item::field_keys(), vec!["a", "label"]);
/// ```
pub trait Record: Send + Sync + 'static {
    /// The accessor table, in declaration order.
    fn accessors() -> Vec<Accessor<Self>>
    where
        Self: Sized;

    /// All field keys, in declaration order.
    fn field_keys() -> Vec<&'static str>
    where
        Self: Sized,
    {
        Self::accessors().iter().map(Accessor::name).collect()
    }

    /// Look up the accessor for `key`.
    fn accessor(key: &str) -> Option<Accessor<Self>>
    where
        Self: Sized,
    {
        Self::accessors().into_iter().find(|a| a.name() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        tag: String,
    }

    fn x_field() -> Field<Point, f64> {
        Field::new(
            "x",
            |p: &Point| FieldValue::to_channel(&p.x),
            |p: &mut Point, v| <i32 as FieldValue>::from_channel(v).map(|x| p.x = x),
        )
    }

    #[test]
    fn test_numeric_field_round_trips_through_channel() {
        let mut p = Point { x: 4, tag: "a".into() };
        let field = x_field();
        assert_eq!(field.get(&p), 4.0);
        field.set(&mut p, 9.0).unwrap();
        assert_eq!(p.x, 9);
        assert_eq!(p.tag, "a");
    }

    #[test]
    fn test_integer_fields_refuse_inexact_values() {
        let mut p = Point { x: 4, tag: String::new() };
        let field = x_field();
        for value in [2.7, -0.5, 1e30, f64::INFINITY] {
            assert_eq!(field.set(&mut p, value), Err(value));
        }
        assert!(field.set(&mut p, f64::NAN).is_err());
        assert_eq!(p.x, 4);

        assert_eq!(<u8 as FieldValue>::from_channel(255.0), Ok(255));
        assert_eq!(<u8 as FieldValue>::from_channel(256.0), Err(256.0));
        assert_eq!(<u8 as FieldValue>::from_channel(-1.0), Err(-1.0));
        assert_eq!(<i64 as FieldValue>::from_channel(-0.0), Ok(0));
    }

    #[test]
    fn test_float_fields_take_any_channel_value() {
        assert_eq!(<f64 as FieldValue>::from_channel(2.7), Ok(2.7));
        assert_eq!(<f32 as FieldValue>::from_channel(0.5), Ok(0.5f32));
        assert!(<f64 as FieldValue>::from_channel(f64::NAN).is_ok_and(f64::is_nan));
    }

    #[test]
    fn test_accessor_accepts_matching_inputs() {
        let number = <i32 as FieldValue>::accessor(x_field());
        assert!(number.accepts(InputKind::Number));
        assert!(!number.accepts(InputKind::Text));

        let text = <String as FieldValue>::accessor(Field::new(
            "tag",
            |p: &Point| p.tag.clone(),
            |p: &mut Point, v| {
                p.tag = v;
                Ok(())
            },
        ));
        assert!(text.accepts(InputKind::Text));
        assert!(text.accepts(InputKind::Search));
        assert!(!text.accepts(InputKind::Number));
    }

    #[test]
    fn test_display_formats_whole_numbers_without_fraction() {
        let p = Point { x: 7, tag: String::new() };
        assert_eq!(<i32 as FieldValue>::accessor(x_field()).display(&p), "7");
    }
}
