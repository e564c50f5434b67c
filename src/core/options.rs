//! # Option Records
//!
//! Flat, self-describing name/value records. Each entry is written as
//!
//! ```text
//! [Tag(1)] [NameLen(1)] [Name(NameLen)] [Value(fixed size per tag)]
//! ```
//!
//! There is no header, count or terminator: a stream of options ends where the
//! data ends. Values use the codec's encodings, so their byte order follows the
//! inversion flag of the stream they are written to.
//!
//! ## Lookup
//! Getters scan entries in order and return the first one whose name *and*
//! type match. A missing name, or a name stored under another type, yields the
//! caller's default. That fallback is part of the contract, not an error.
//!
//! ## Usage
//! ```rust
//! use wire_io::core::options::{OptionInput, OptionOutput};
//! use wire_io::io;
//!
//! let mut writer = OptionOutput::new(io::array_output(32));
//! writer.write_int("a", 1).unwrap();
//! writer.write_string("b", "x").unwrap();
//!
//! let mut input = io::array_input(writer.into_inner().into_written());
//! let options = OptionInput::read(&mut input).unwrap();
//! assert_eq!(options.get_int("a", -1), 1);
//! assert_eq!(options.get_int("b", -1), -1);
//! ```

use tracing::{debug, warn};

use crate::core::codec::{Input, Output};
use crate::error::{IoError, Result};
use crate::utils::metrics::global_metrics;

/// Type tag carried in the first byte of every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionKind {
    Byte = 0,
    Char = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    String = 7,
    Boolean = 8,
}

impl OptionKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(OptionKind::Byte),
            1 => Some(OptionKind::Char),
            2 => Some(OptionKind::Short),
            3 => Some(OptionKind::Int),
            4 => Some(OptionKind::Long),
            5 => Some(OptionKind::Float),
            6 => Some(OptionKind::Double),
            7 => Some(OptionKind::String),
            8 => Some(OptionKind::Boolean),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OptionKind::Byte => "byte",
            OptionKind::Char => "char",
            OptionKind::Short => "short",
            OptionKind::Int => "int",
            OptionKind::Long => "long",
            OptionKind::Float => "float",
            OptionKind::Double => "double",
            OptionKind::String => "string",
            OptionKind::Boolean => "boolean",
        }
    }
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Byte(u8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Boolean(bool),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Byte(_) => OptionKind::Byte,
            OptionValue::Char(_) => OptionKind::Char,
            OptionValue::Short(_) => OptionKind::Short,
            OptionValue::Int(_) => OptionKind::Int,
            OptionValue::Long(_) => OptionKind::Long,
            OptionValue::Float(_) => OptionKind::Float,
            OptionValue::Double(_) => OptionKind::Double,
            OptionValue::String(_) => OptionKind::String,
            OptionValue::Boolean(_) => OptionKind::Boolean,
        }
    }

    fn read_from<I: Input + ?Sized>(kind: OptionKind, input: &mut I) -> Result<Self> {
        Ok(match kind {
            OptionKind::Byte => OptionValue::Byte(input.read_byte()?),
            OptionKind::Char => OptionValue::Char(input.read_char()?),
            OptionKind::Short => OptionValue::Short(input.read_short()?),
            OptionKind::Int => OptionValue::Int(input.read_int()?),
            OptionKind::Long => OptionValue::Long(input.read_long()?),
            OptionKind::Float => OptionValue::Float(input.read_float()?),
            OptionKind::Double => OptionValue::Double(input.read_double()?),
            OptionKind::String => OptionValue::String(input.read_string()?),
            OptionKind::Boolean => OptionValue::Boolean(input.read_bool()?),
        })
    }

    fn write_to<O: Output + ?Sized>(&self, output: &mut O) -> Result<()> {
        match self {
            OptionValue::Byte(v) => output.write_byte(*v),
            OptionValue::Char(v) => output.write_char(*v),
            OptionValue::Short(v) => output.write_short(*v),
            OptionValue::Int(v) => output.write_int(*v),
            OptionValue::Long(v) => output.write_long(*v),
            OptionValue::Float(v) => output.write_float(*v),
            OptionValue::Double(v) => output.write_double(*v),
            OptionValue::String(v) => output.write_string(v),
            OptionValue::Boolean(v) => output.write_bool(*v),
        }
    }
}

impl From<u8> for OptionValue {
    fn from(value: u8) -> Self {
        OptionValue::Byte(value)
    }
}

impl From<char> for OptionValue {
    fn from(value: char) -> Self {
        OptionValue::Char(value)
    }
}

impl From<i16> for OptionValue {
    fn from(value: i16) -> Self {
        OptionValue::Short(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Long(value)
    }
}

impl From<f32> for OptionValue {
    fn from(value: f32) -> Self {
        OptionValue::Float(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Double(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

/// One decoded `name -> value` record.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub name: String,
    pub value: OptionValue,
}

impl OptionEntry {
    pub fn new(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> OptionKind {
        self.value.kind()
    }
}

/// Encodes options onto any [`Output`], flushing after every entry so that an
/// interrupted writer leaves only whole records behind.
#[derive(Debug)]
pub struct OptionOutput<O: Output> {
    output: O,
}

impl<O: Output> OptionOutput<O> {
    pub fn new(output: O) -> Self {
        Self { output }
    }

    pub fn get_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_inner(self) -> O {
        self.output
    }

    /// Write `[tag][name][value]` and flush.
    pub fn write(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        self.output.write_byte(value.kind().tag())?;
        self.output.write_string(name)?;
        value.write_to(&mut self.output)?;
        self.output.flush()
    }

    pub fn write_entry(&mut self, entry: &OptionEntry) -> Result<()> {
        self.write(&entry.name, entry.value.clone())
    }

    pub fn write_byte(&mut self, name: &str, value: u8) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_char(&mut self, name: &str, value: char) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_short(&mut self, name: &str, value: i16) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_int(&mut self, name: &str, value: i32) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_long(&mut self, name: &str, value: i64) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_float(&mut self, name: &str, value: f32) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_double(&mut self, name: &str, value: f64) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_string(&mut self, name: &str, value: &str) -> Result<()> {
        self.write(name, value)
    }

    pub fn write_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.write(name, value)
    }
}

/// Options decoded eagerly from an [`Input`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionInput {
    entries: Vec<OptionEntry>,
}

impl OptionInput {
    /// Drain `input` completely.
    pub fn read<I: Input + ?Sized>(input: &mut I) -> Result<Self> {
        Self::read_with(input, |_| {})
    }

    /// Drain `input` completely, handing each entry to `collector` as it is decoded.
    ///
    /// # Errors
    /// Returns `IoError::MalformedOption` with the tag's byte offset if a tag is
    /// not one of the nine known kinds. Nothing decoded so far is returned.
    pub fn read_with<I, F>(input: &mut I, mut collector: F) -> Result<Self>
    where
        I: Input + ?Sized,
        F: FnMut(&OptionEntry),
    {
        let mut entries = Vec::new();
        while input.has_remaining()? {
            let offset = input.position();
            let tag = input.read_byte()?;
            let Some(kind) = OptionKind::from_tag(tag) else {
                warn!(tag, offset, "Unknown option tag");
                global_metrics().decode_error();
                return Err(IoError::MalformedOption { tag, offset });
            };
            let name = input.read_string()?;
            let value = OptionValue::read_from(kind, input)?;
            let entry = OptionEntry { name, value };
            collector(&entry);
            entries.push(entry);
        }
        debug!(entries = entries.len(), "Decoded option stream");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value stored under `name`, whatever its type.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    fn find(&self, name: &str, kind: OptionKind) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && entry.kind() == kind)
            .map(|entry| &entry.value)
    }

    pub fn get_byte(&self, name: &str, default: u8) -> u8 {
        match self.find(name, OptionKind::Byte) {
            Some(OptionValue::Byte(v)) => *v,
            _ => default,
        }
    }

    pub fn get_char(&self, name: &str, default: char) -> char {
        match self.find(name, OptionKind::Char) {
            Some(OptionValue::Char(v)) => *v,
            _ => default,
        }
    }

    pub fn get_short(&self, name: &str, default: i16) -> i16 {
        match self.find(name, OptionKind::Short) {
            Some(OptionValue::Short(v)) => *v,
            _ => default,
        }
    }

    pub fn get_int(&self, name: &str, default: i32) -> i32 {
        match self.find(name, OptionKind::Int) {
            Some(OptionValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_long(&self, name: &str, default: i64) -> i64 {
        match self.find(name, OptionKind::Long) {
            Some(OptionValue::Long(v)) => *v,
            _ => default,
        }
    }

    pub fn get_float(&self, name: &str, default: f32) -> f32 {
        match self.find(name, OptionKind::Float) {
            Some(OptionValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn get_double(&self, name: &str, default: f64) -> f64 {
        match self.find(name, OptionKind::Double) {
            Some(OptionValue::Double(v)) => *v,
            _ => default,
        }
    }

    pub fn get_string<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.find(name, OptionKind::String) {
            Some(OptionValue::String(v)) => v.as_str(),
            _ => default,
        }
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.find(name, OptionKind::Boolean) {
            Some(OptionValue::Boolean(v)) => *v,
            _ => default,
        }
    }
}
