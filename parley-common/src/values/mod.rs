//! Answer and limit values
//!
//! Front-ends mostly reply with text, but the engine and richer front-ends
//! may reply with typed values directly (an enumeration member, a buffer
//! tuple). Limits use the same representation.

mod enums;

pub use enums::{AspectRatio, Enumeration, InputMode, Instrument, RenderMode, RenderModeInfo};
pub(crate) use enums::normalize;

use serde::{Deserialize, Serialize};

/// A single answer or limit value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value")]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    InputMode(InputMode),
    RenderMode(RenderMode),
    AspectRatio(AspectRatio),
    Instrument(Instrument),
    /// Ordered tuple of text buffers (notes, chords, lyrics...)
    Buffers(Vec<String>),
    List(Vec<Value>),
}

/// Shape tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Text,
    Integer,
    Float,
    Bool,
    InputMode,
    RenderMode,
    AspectRatio,
    Instrument,
    Buffers,
    List,
}

impl ValueShape {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueShape::Integer | ValueShape::Float)
    }

    /// Whether two shapes count as the same for limit uniformity
    pub fn same_family(&self, other: &ValueShape) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }
}

impl Value {
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Text(_) => ValueShape::Text,
            Value::Integer(_) => ValueShape::Integer,
            Value::Float(_) => ValueShape::Float,
            Value::Bool(_) => ValueShape::Bool,
            Value::InputMode(_) => ValueShape::InputMode,
            Value::RenderMode(_) => ValueShape::RenderMode,
            Value::AspectRatio(_) => ValueShape::AspectRatio,
            Value::Instrument(_) => ValueShape::Instrument,
            Value::Buffers(_) => ValueShape::Buffers,
            Value::List(_) => ValueShape::List,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric reading of the value; numeric text is parsed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(x) if x.is_finite() => Some(*x),
            Value::Text(text) => text.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        }
    }

    /// Blank text, an empty list or empty buffers
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(text) => text.trim().is_empty(),
            Value::Buffers(buffers) => buffers.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{}", text),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::InputMode(mode) => write!(f, "{}", mode),
            Value::RenderMode(mode) => write!(f, "{}", mode),
            Value::AspectRatio(ratio) => write!(f, "{}", ratio),
            Value::Instrument(instrument) => write!(f, "{}", instrument),
            Value::Buffers(buffers) => write!(f, "{}", buffers.join(" | ")),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<InputMode> for Value {
    fn from(mode: InputMode) -> Self {
        Value::InputMode(mode)
    }
}

impl From<RenderMode> for Value {
    fn from(mode: RenderMode) -> Self {
        Value::RenderMode(mode)
    }
}

impl From<AspectRatio> for Value {
    fn from(ratio: AspectRatio) -> Self {
        Value::AspectRatio(ratio)
    }
}

impl From<Instrument> for Value {
    fn from(instrument: Instrument) -> Self {
        Value::Instrument(instrument)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
