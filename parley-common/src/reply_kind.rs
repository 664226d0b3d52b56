//! Reply kind taxonomy
//!
//! A reply kind constrains the shape of an acceptable answer. The table
//! below is the whole registry: no state, no errors, no side effects.

use crate::values::{AspectRatio, Enumeration, InputMode, Instrument, RenderMode, Value, ValueShape};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyKind {
    /// Free text
    Text,
    /// Short note text
    Note,
    /// Integer or floating number
    Number,
    InputMode,
    RenderModes,
    AspectRatio,
    Instrument,
    /// Path to an existing file
    FilePath,
    /// Structured buffer tuple
    Buffers,
    /// Anything
    Other,
}

const ACCEPTED_SHAPES: &[(ReplyKind, &[ValueShape])] = &[
    (ReplyKind::Text, &[ValueShape::Text]),
    (ReplyKind::Note, &[ValueShape::Text]),
    (ReplyKind::Number, &[ValueShape::Integer, ValueShape::Float, ValueShape::Text]),
    (ReplyKind::InputMode, &[ValueShape::InputMode, ValueShape::Text, ValueShape::Integer]),
    (
        ReplyKind::RenderModes,
        &[ValueShape::RenderMode, ValueShape::Text, ValueShape::Integer, ValueShape::List],
    ),
    (ReplyKind::AspectRatio, &[ValueShape::AspectRatio, ValueShape::Text, ValueShape::Integer]),
    (ReplyKind::Instrument, &[ValueShape::Instrument, ValueShape::Text, ValueShape::Integer]),
    (ReplyKind::FilePath, &[ValueShape::Text]),
    (ReplyKind::Buffers, &[ValueShape::Buffers, ValueShape::List]),
    (
        ReplyKind::Other,
        &[
            ValueShape::Text,
            ValueShape::Integer,
            ValueShape::Float,
            ValueShape::Bool,
            ValueShape::InputMode,
            ValueShape::RenderMode,
            ValueShape::AspectRatio,
            ValueShape::Instrument,
            ValueShape::Buffers,
            ValueShape::List,
        ],
    ),
];

impl ReplyKind {
    pub fn all_variants() -> &'static [ReplyKind] {
        &[
            ReplyKind::Text,
            ReplyKind::Note,
            ReplyKind::Number,
            ReplyKind::InputMode,
            ReplyKind::RenderModes,
            ReplyKind::AspectRatio,
            ReplyKind::Instrument,
            ReplyKind::FilePath,
            ReplyKind::Buffers,
            ReplyKind::Other,
        ]
    }

    /// Value shapes this kind accepts
    pub fn accepted_shapes(&self) -> &'static [ValueShape] {
        ACCEPTED_SHAPES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, shapes)| *shapes)
            .unwrap_or(&[])
    }

    pub fn accepts_shape(&self, shape: ValueShape) -> bool {
        self.accepted_shapes().contains(&shape)
    }

    /// Shape acceptance plus content: numeric text for `Number`, resolvable
    /// members for the enumeration kinds, text elements for `Buffers` lists
    pub fn accepts(&self, value: &Value) -> bool {
        if !self.accepts_shape(value.shape()) {
            return false;
        }
        match self {
            ReplyKind::Number => value.as_f64().is_some(),
            ReplyKind::InputMode
            | ReplyKind::RenderModes
            | ReplyKind::AspectRatio
            | ReplyKind::Instrument => self.resolve(value).is_some(),
            ReplyKind::Buffers => match value {
                Value::List(items) => items.iter().all(|item| item.as_text().is_some()),
                _ => true,
            },
            _ => true,
        }
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(
            self,
            ReplyKind::InputMode | ReplyKind::RenderModes | ReplyKind::AspectRatio | ReplyKind::Instrument
        )
    }

    pub fn is_text_like(&self) -> bool {
        matches!(self, ReplyKind::Text | ReplyKind::Note | ReplyKind::FilePath)
    }

    /// Resolve a value to the member(s) of this kind's enumeration.
    ///
    /// `RenderModes` also resolves lists and whitespace/comma separated text
    /// into a `Value::List` of render modes. Non-enumeration kinds resolve to
    /// None.
    pub fn resolve(&self, value: &Value) -> Option<Value> {
        match self {
            ReplyKind::InputMode => resolve_member::<InputMode>(value).map(Value::InputMode),
            ReplyKind::AspectRatio => resolve_member::<AspectRatio>(value).map(Value::AspectRatio),
            ReplyKind::Instrument => resolve_member::<Instrument>(value).map(Value::Instrument),
            ReplyKind::RenderModes => resolve_render_modes(value),
            _ => None,
        }
    }

    /// Infer a kind from a limits sample when none was given
    pub fn infer_from(sample: &Value) -> ReplyKind {
        match sample {
            Value::Text(_) => ReplyKind::Text,
            Value::Integer(_) | Value::Float(_) => ReplyKind::Number,
            Value::InputMode(_) => ReplyKind::InputMode,
            Value::RenderMode(_) => ReplyKind::RenderModes,
            Value::AspectRatio(_) => ReplyKind::AspectRatio,
            Value::Instrument(_) => ReplyKind::Instrument,
            Value::Buffers(_) => ReplyKind::Buffers,
            Value::Bool(_) | Value::List(_) => ReplyKind::Other,
        }
    }
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

trait Member: Enumeration {
    fn extract(value: &Value) -> Option<Self>;
}

impl Member for InputMode {
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::InputMode(mode) => Some(*mode),
            _ => None,
        }
    }
}

impl Member for AspectRatio {
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::AspectRatio(ratio) => Some(*ratio),
            _ => None,
        }
    }
}

impl Member for Instrument {
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::Instrument(instrument) => Some(*instrument),
            _ => None,
        }
    }
}

impl Member for RenderMode {
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::RenderMode(mode) => Some(*mode),
            _ => None,
        }
    }
}

fn resolve_member<T: Member>(value: &Value) -> Option<T> {
    match value {
        Value::Text(text) => T::parse_loose(text),
        Value::Integer(ordinal) => T::from_ordinal(*ordinal),
        other => T::extract(other),
    }
}

fn resolve_render_modes(value: &Value) -> Option<Value> {
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| resolve_member::<RenderMode>(item).map(Value::RenderMode))
            .collect::<Option<Vec<_>>>()
            .filter(|modes| !modes.is_empty())
            .map(Value::List),
        Value::Text(text) => {
            if let Some(mode) = RenderMode::parse_loose(text) {
                return Some(Value::RenderMode(mode));
            }
            let modes = text
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|token| !token.is_empty())
                .map(|token| RenderMode::parse_loose(token).map(Value::RenderMode))
                .collect::<Option<Vec<_>>>()?;
            if modes.is_empty() {
                None
            } else {
                Some(Value::List(modes))
            }
        }
        other => resolve_member::<RenderMode>(other).map(Value::RenderMode),
    }
}
