//! Canonical value model.
//!
//! Every hashable value is reduced to one of five kinds. Each kind writes a
//! one-byte tag followed by its payload, so two values of different kinds never
//! produce the same byte stream:
//!
//! | tag    | kind              | payload                                      |
//! |--------|-------------------|----------------------------------------------|
//! | `0x01` | word integer      | `i64`, little-endian                         |
//! | `0x02` | wide integer      | decimal digits, with a leading `-` if signed |
//! | `0x03` | float             | IEEE-754 bits of the `f64`, little-endian    |
//! | `0x04` | text              | UTF-8 bytes                                  |
//! | `0x05` | buffer            | element typecode, then raw bytes             |
//! | `0x06` | sequence          | 16-byte digest of every element, in order    |

use enum_dispatch::enum_dispatch;

use crate::error::{Error, Result};
use crate::hash::HashDigest;
use crate::murmur3::{murmur3_x64_128, SEED};

const TAG_WORD: u8 = 0x01;
const TAG_WIDE: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_TEXT: u8 = 0x04;
const TAG_BUFFER: u8 = 0x05;
const TAG_SEQUENCE: u8 = 0x06;

/// A value the hash engine knows how to canonicalize.
#[derive(Debug, Clone, PartialEq, Eq)]
#[enum_dispatch]
pub enum Value {
    Integer(Integer),
    Float(Float),
    Text(Text),
    Buffer(Buffer),
    Sequence(Sequence),
}

/// Canonical encoding, implemented once per value kind.
#[enum_dispatch(Value)]
pub trait Canonical {
    /// Append the canonical byte stream of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

impl Value {
    /// Canonical byte stream of this value.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// MurmurHash3 x64-128 digest of the canonical byte stream.
    #[inline]
    pub fn hash128(&self) -> HashDigest {
        murmur3_x64_128(&self.to_canonical_bytes(), SEED)
    }
}

/// Integer of any width.
///
/// Values that fit an `i64` are encoded by their fixed-width binary form. Wider
/// values fall back to their decimal representation rather than being
/// truncated, so distinct large integers never collide. The representation is
/// only reachable through the normalizing constructors, so one logical integer
/// always has exactly one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer(Repr);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    Word(i64),
    Wide { negative: bool, magnitude: u128 },
}

impl Integer {
    pub fn from_i128(v: i128) -> Self {
        match i64::try_from(v) {
            Ok(word) => Integer(Repr::Word(word)),
            Err(_) => Integer(Repr::Wide {
                negative: v < 0,
                magnitude: v.unsigned_abs(),
            }),
        }
    }

    pub fn from_u128(v: u128) -> Self {
        match i64::try_from(v) {
            Ok(word) => Integer(Repr::Word(word)),
            Err(_) => Integer(Repr::Wide {
                negative: false,
                magnitude: v,
            }),
        }
    }

    /// The value as an `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Repr::Word(v) => Some(v),
            Repr::Wide { .. } => None,
        }
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer(Repr::Word(v))
    }
}

impl Canonical for Integer {
    fn encode(&self, out: &mut Vec<u8>) {
        match self.0 {
            Repr::Word(v) => {
                out.push(TAG_WORD);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Repr::Wide {
                negative,
                magnitude,
            } => {
                out.push(TAG_WIDE);
                if negative {
                    out.push(b'-');
                }
                out.extend_from_slice(magnitude.to_string().as_bytes());
            }
        }
    }
}

/// Floating point scalar, compared and encoded by its bit pattern.
#[derive(Debug, Clone, Copy)]
pub struct Float(pub f64);

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Float {}

impl Canonical for Float {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_FLOAT);
        out.extend_from_slice(&self.0.to_bits().to_le_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Canonical for Text {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_TEXT);
        out.extend_from_slice(self.0.as_bytes());
    }
}

/// Element type of a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// Unicode scalar values, four bytes each.
    Char,
}

impl ElementKind {
    const ALL: [ElementKind; 11] = [
        ElementKind::U8,
        ElementKind::I8,
        ElementKind::U16,
        ElementKind::I16,
        ElementKind::U32,
        ElementKind::I32,
        ElementKind::U64,
        ElementKind::I64,
        ElementKind::F32,
        ElementKind::F64,
        ElementKind::Char,
    ];

    /// Single-letter code written in front of the buffer bytes.
    pub fn typecode(self) -> char {
        match self {
            ElementKind::U8 => 'B',
            ElementKind::I8 => 'b',
            ElementKind::U16 => 'H',
            ElementKind::I16 => 'h',
            ElementKind::U32 => 'I',
            ElementKind::I32 => 'i',
            ElementKind::U64 => 'Q',
            ElementKind::I64 => 'q',
            ElementKind::F32 => 'f',
            ElementKind::F64 => 'd',
            ElementKind::Char => 'w',
        }
    }

    pub fn from_typecode(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.typecode() == code)
    }

    /// Width of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 | ElementKind::Char => 4,
            ElementKind::U64 | ElementKind::I64 | ElementKind::F64 => 8,
        }
    }
}

/// Fixed-width element that can be laid out in a [`Buffer`].
pub trait Element: Copy {
    const KIND: ElementKind;
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_element! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl Element for char {
    const KIND: ElementKind = ElementKind::Char;
    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&u32::from(self).to_le_bytes());
    }
}

/// Raw byte buffer tagged with its element type.
///
/// Two buffers over the same bytes but with different element kinds hash
/// differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    kind: ElementKind,
    bytes: Vec<u8>,
}

impl Buffer {
    /// Tag `bytes` with an element kind. The length must be a whole number of
    /// elements.
    pub fn new(kind: ElementKind, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % kind.width() != 0 {
            return Err(Error::MisalignedBuffer {
                typecode: kind.typecode(),
                len: bytes.len(),
                width: kind.width(),
            });
        }
        Ok(Self { kind, bytes })
    }

    /// Plain bytes, element kind `u8`.
    pub fn raw(bytes: &[u8]) -> Self {
        Self {
            kind: ElementKind::U8,
            bytes: bytes.to_vec(),
        }
    }

    /// Lay out `elements` little-endian so the encoding does not depend on the
    /// host byte order.
    pub fn from_elements<E: Element>(elements: &[E]) -> Self {
        let mut bytes = Vec::with_capacity(elements.len() * E::KIND.width());
        for &element in elements {
            element.write_le(&mut bytes);
        }
        Self {
            kind: E::KIND,
            bytes,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Canonical for Buffer {
    fn encode(&self, out: &mut Vec<u8>) {
        out.reserve(self.bytes.len() + 2);
        out.push(TAG_BUFFER);
        // typecodes are all ASCII
        out.push(self.kind.typecode() as u8);
        out.extend_from_slice(&self.bytes);
    }
}

/// Ordered composite. Element order is part of the hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence(pub Vec<Value>);

impl Canonical for Sequence {
    fn encode(&self, out: &mut Vec<u8>) {
        out.reserve(1 + 16 * self.0.len());
        out.push(TAG_SEQUENCE);
        for item in &self.0 {
            out.extend_from_slice(&item.hash128().to_le_bytes());
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(Integer::from(i64::from(v)))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(Integer::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(Integer::from_u128(u128::from(v)))
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Integer(Integer::from_i128(v))
    }
}

impl From<u128> for Value {
    fn from(v: u128) -> Self {
        Value::Integer(Integer::from_u128(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Text(v.to_owned()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Text(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Buffer(Buffer::raw(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Sequence(Sequence(v))
    }
}
