//! Bencode, the wire encoding of nREPL messages.
//!
//! Four kinds of value: integers (`i42e`), byte strings (`5:hello`), lists
//! (`l...e`) and dictionaries with byte-string keys (`d...e`). Dictionaries
//! are encoded with sorted keys.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Read, Write};

use crate::error::BencodeError;

/// Deepest list/dictionary nesting the decoder accepts.
pub const MAX_DEPTH: usize = 256;

/// Longest integer or length prefix, sign included.
const MAX_DIGITS: usize = 21;

/// A decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(BTreeMap<Vec<u8>, Value>),
}

impl Value {
    /// Build a dictionary from string keys.
    pub fn dict<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Vec<u8>>,
        V: Into<Value>,
    {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Byte string contents, when they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Dictionary entry under `key`; `None` for other kinds of value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?.get(key.as_bytes())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::Int(n) => write!(out, "i{n}e"),
            Self::Bytes(b) => write_bytes(b, out),
            Self::List(items) => {
                out.write_all(b"l")?;
                for item in items {
                    item.write_to(out)?;
                }
                out.write_all(b"e")
            },
            Self::Dict(map) => {
                out.write_all(b"d")?;
                for (key, value) in map {
                    write_bytes(key, out)?;
                    value.write_to(out)?;
                }
                out.write_all(b"e")
            },
        }
    }
}

fn write_bytes<W: Write + ?Sized>(bytes: &[u8], out: &mut W) -> io::Result<()> {
    write!(out, "{}:", bytes.len())?;
    out.write_all(bytes)
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

/// Decode exactly one value; trailing input is an error.
pub fn decode(mut input: &[u8]) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::new(&mut input);
    let value = decoder
        .read_value()?
        .ok_or(BencodeError::UnexpectedEof)?;
    if !input.is_empty() {
        return Err(BencodeError::TrailingBytes(input.len()));
    }
    Ok(value)
}

/// Decode a concatenation of values.
pub fn decode_all(input: &[u8]) -> Result<Vec<Value>, BencodeError> {
    let mut decoder = Decoder::new(input);
    let mut values = Vec::new();
    while let Some(value) = decoder.read_value()? {
        values.push(value);
    }
    Ok(values)
}

/// Streaming decoder over any buffered reader.
///
/// After an error the stream position is unspecified.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Next value, or `None` at a clean end of input.
    pub fn read_value(&mut self) -> Result<Option<Value>, BencodeError> {
        match self.peek()? {
            None => Ok(None),
            Some(_) => self.value(0).map(Some),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_byte(&mut self) -> Result<u8, BencodeError> {
        let byte = self.peek()?.ok_or(BencodeError::UnexpectedEof)?;
        self.reader.consume(1);
        Ok(byte)
    }

    /// Consume the `e` closing a list or dictionary, if it is next.
    fn at_end(&mut self) -> Result<bool, BencodeError> {
        match self.peek()? {
            None => Err(BencodeError::UnexpectedEof),
            Some(b'e') => {
                self.reader.consume(1);
                Ok(true)
            },
            Some(_) => Ok(false),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::TooDeep(MAX_DEPTH));
        }
        match self.next_byte()? {
            b'i' => {
                let raw = self.read_until(b'e', Vec::new())?;
                parse_int(&raw).map(Value::Int)
            },
            b'l' => {
                let mut items = Vec::new();
                while !self.at_end()? {
                    items.push(self.value(depth + 1)?);
                }
                Ok(Value::List(items))
            },
            b'd' => {
                let mut map = BTreeMap::new();
                while !self.at_end()? {
                    let Value::Bytes(key) = self.value(depth + 1)? else {
                        return Err(BencodeError::NonStringKey);
                    };
                    let value = self.value(depth + 1)?;
                    map.insert(key, value);
                }
                Ok(Value::Dict(map))
            },
            digit @ b'0'..=b'9' => {
                let raw = self.read_until(b':', vec![digit])?;
                let len = parse_length(&raw)?;
                self.read_exact_vec(len).map(Value::Bytes)
            },
            other => Err(BencodeError::UnexpectedByte(other)),
        }
    }

    /// Collect bytes up to `end`, giving up once the prefix is too long to
    /// be valid.
    fn read_until(&mut self, end: u8, mut raw: Vec<u8>) -> Result<Vec<u8>, BencodeError> {
        while raw.len() <= MAX_DIGITS {
            let byte = self.next_byte()?;
            if byte == end {
                return Ok(raw);
            }
            raw.push(byte);
        }
        Ok(raw)
    }

    fn read_exact_vec(&mut self, len: usize) -> Result<Vec<u8>, BencodeError> {
        let mut buf = Vec::new();
        self.reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(BencodeError::UnexpectedEof);
        }
        Ok(buf)
    }
}

/// Canonical decimal: no leading zeros, no `-0`.
fn canonical_digits(digits: &str) -> bool {
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

fn parse_int(raw: &[u8]) -> Result<i64, BencodeError> {
    let invalid = || BencodeError::InvalidInteger(String::from_utf8_lossy(raw).into_owned());
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !canonical_digits(digits) || text == "-0" {
        return Err(invalid());
    }
    text.parse().map_err(|_| invalid())
}

fn parse_length(raw: &[u8]) -> Result<usize, BencodeError> {
    let invalid = || BencodeError::InvalidLength(String::from_utf8_lossy(raw).into_owned());
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    if !canonical_digits(text) {
        return Err(invalid());
    }
    text.parse().map_err(|_| invalid())
}
