//! Type inspection: turn any `Serialize` value into a canonical [`Value`].
//!
//! The serde data model is mapped onto the five value kinds. Scalars, text,
//! bytes and ordered composites are supported; `None`, unit, maps, structs and
//! enum variants are not and fail with [`Error::UnsupportedValue`], including
//! when they are nested deep inside an otherwise supported composite.
//!
//! [`Buffer`] serializes itself as a newtype struct under a private name so a
//! typed buffer keeps its element kind when it is nested in a composite.

use serde::ser::{
    Impossible, Serialize, SerializeSeq, SerializeTuple, SerializeTupleStruct, Serializer,
};

use crate::error::{Error, Result};
use crate::value::{Buffer, ElementKind, Float, Sequence, Text, Value};

/// Newtype-struct name used by [`Buffer`]'s `Serialize` impl.
const BUFFER_TOKEN: &str = "$murmur_hyperloglog::private::Buffer";

/// Canonicalize `value`.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Serializer producing a [`Value`].
pub struct ValueSerializer;

fn unsupported(kind: &str) -> Error {
    Error::UnsupportedValue(kind.to_owned())
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SequenceBuilder;
    type SerializeTuple = SequenceBuilder;
    type SerializeTupleStruct = SequenceBuilder;
    type SerializeTupleVariant = Impossible<Value, Error>;
    type SerializeMap = Impossible<Value, Error>;
    type SerializeStruct = Impossible<Value, Error>;
    type SerializeStructVariant = Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Text(Text(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Buffer(Buffer::raw(v)))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(unsupported("none"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(unsupported("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(unsupported(&format!("unit struct {name}")))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Err(unsupported(&format!("enum variant {name}::{variant}")))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value> {
        if name == BUFFER_TOKEN {
            return value.serialize(self).and_then(buffer_from_parts);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Value> {
        Err(unsupported(&format!("enum variant {name}::{variant}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::with_capacity(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported(&format!("enum variant {name}::{variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(unsupported("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(unsupported(&format!("struct {name}")))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported(&format!("enum variant {name}::{variant}")))
    }
}

/// Rebuild a [`Buffer`] from the `(typecode, bytes)` pair it serializes as.
fn buffer_from_parts(parts: Value) -> Result<Value> {
    if let Value::Sequence(Sequence(items)) = &parts {
        if let [Value::Text(Text(code)), Value::Buffer(raw)] = items.as_slice() {
            let mut chars = code.chars();
            if let (Some(code), None) = (chars.next(), chars.next()) {
                if let Some(kind) = ElementKind::from_typecode(code) {
                    return Buffer::new(kind, raw.bytes().to_vec()).map(Value::Buffer);
                }
            }
        }
    }
    Err(unsupported("malformed buffer"))
}

/// Collects the elements of a sequence, tuple or tuple struct.
pub struct SequenceBuilder {
    items: Vec<Value>,
}

impl SequenceBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Sequence(Sequence(self.items))
    }
}

impl SerializeSeq for SequenceBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl SerializeTuple for SequenceBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl SerializeTupleStruct for SequenceBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(BUFFER_TOKEN, &BufferParts(self))
    }
}

/// `(typecode, bytes)` view of a [`Buffer`].
struct BufferParts<'a>(&'a Buffer);

impl Serialize for BufferParts<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.0.kind().typecode())?;
        tup.serialize_element(&RawBytes(self.0.bytes()))?;
        tup.end()
    }
}

struct RawBytes<'a>(&'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Serialize;
    use test_case::test_case;

    use super::*;
    use crate::value::Integer;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    struct Pair(u8, &'static str);

    #[derive(Serialize)]
    struct Wrapper(f32);

    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
    }

    #[test]
    fn test_scalars() {
        assert_eq!(to_value(&5u8), Ok(Value::from(5i64)));
        assert_eq!(to_value(&-5i16), Ok(Value::from(-5i64)));
        assert_eq!(to_value(&false), Ok(Value::from(0i64)));
        assert_eq!(to_value(&1.5f32), Ok(Value::from(1.5f64)));
        assert_eq!(to_value(&'x'), Ok(Value::from("x")));
        assert_eq!(to_value("abc"), Ok(Value::from("abc")));
        assert_eq!(to_value(&Some(3u32)), Ok(Value::from(3i64)));
        assert_eq!(to_value(&Wrapper(0.5)), Ok(Value::from(0.5f64)));
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(
            to_value(&u64::MAX),
            Ok(Value::Integer(Integer::from_u128(u128::from(u64::MAX))))
        );
        assert_eq!(to_value(&(i64::MAX as u64)), Ok(Value::from(i64::MAX)));
        assert_eq!(to_value(&-1i128), Ok(Value::from(-1i64)));
    }

    #[test]
    fn test_composites() {
        let expected = Value::from(vec![Value::from(1i64), Value::from("a")]);
        assert_eq!(to_value(&Pair(1, "a")), Ok(expected.clone()));
        assert_eq!(to_value(&(1u64, "a")), Ok(expected));
        assert_eq!(
            to_value(&vec![vec![1u8], vec![]]),
            Ok(Value::from(vec![
                Value::from(vec![Value::from(1i64)]),
                Value::from(Vec::<Value>::new()),
            ]))
        );
    }

    #[test]
    fn test_buffers() {
        let buffer = Buffer::from_elements(&[1.0f32, 2.0]);
        assert_eq!(to_value(&buffer), Ok(Value::Buffer(buffer.clone())));
        assert_eq!(
            to_value(&("x", buffer.clone())),
            Ok(Value::from(vec![Value::from("x"), Value::Buffer(buffer)]))
        );
    }

    struct Tagged(&'static str, &'static [u8]);

    impl Serialize for Tagged {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_newtype_struct(BUFFER_TOKEN, &(self.0, RawBytes(self.1)))
        }
    }

    #[test]
    fn test_buffer_parts_are_validated() {
        assert_eq!(
            to_value(&Tagged("H", &[1, 0])),
            Ok(Value::Buffer(Buffer::from_elements(&[1u16])))
        );
        assert_eq!(
            to_value(&Tagged("I", &[1, 2, 3])),
            Err(Error::MisalignedBuffer {
                typecode: 'I',
                len: 3,
                width: 4
            })
        );
        assert_eq!(
            to_value(&Tagged("x", &[1])),
            Err(Error::UnsupportedValue("malformed buffer".into()))
        );
    }

    #[test]
    fn test_buffer_with_other_serializers() {
        let buffer = Buffer::from_elements(&[1u16]);
        let json = serde_json::to_string(&buffer).expect("serialization failed");
        assert_eq!(json, r#"["H",[1,0]]"#);
    }

    #[test_case(to_value(&()) => "unit"; "unit")]
    #[test_case(to_value(&None::<u8>) => "none"; "none")]
    #[test_case(to_value(&Marker) => "unit struct Marker"; "unit struct")]
    #[test_case(to_value(&Point { x: 1, y: 2 }) => "struct Point"; "struct")]
    #[test_case(to_value(&Shape::Empty) => "enum variant Shape::Empty"; "unit variant")]
    #[test_case(to_value(&Shape::Circle(1.0)) => "enum variant Shape::Circle"; "newtype variant")]
    #[test_case(to_value(&HashMap::from([(1, 2)])) => "map"; "map")]
    #[test_case(to_value(&vec![(1, Point { x: 0, y: 0 })]) => "struct Point"; "nested struct")]
    fn test_unsupported(result: Result<Value>) -> String {
        match result {
            Err(Error::UnsupportedValue(kind)) => kind,
            other => panic!("unexpected result {:?}", other),
        }
    }
}
