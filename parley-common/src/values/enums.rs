//! Enumeration axes a reply can select from
//!
//! Each axis is a plain tag. Behavior attached to a tag (file extension of a
//! render mode, for instance) lives in a side table keyed by the tag, so the
//! query/reply core only ever depends on the tag itself.

use serde::{Deserialize, Serialize};

/// Normalize text for loose comparison: lowercase, whitespace removed
pub(crate) fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A closed set of named members that answers may refer to by name or ordinal
pub trait Enumeration: Sized + Copy + PartialEq + 'static {
    /// All members in ordinal order
    fn all_variants() -> &'static [Self];

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Extra accepted spellings
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Case/space-insensitive lookup by display name or alias
    fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Self::all_variants().iter().copied().find(|member| {
            normalize(member.display_name()) == wanted
                || member.aliases().iter().any(|alias| normalize(alias) == wanted)
        })
    }

    /// Lookup by zero-based ordinal
    fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::all_variants().get(index).copied())
    }

    /// Resolve free text: a name first, then a numeric ordinal
    fn parse_loose(text: &str) -> Option<Self> {
        Self::from_name(text).or_else(|| {
            text.trim()
                .parse::<i64>()
                .ok()
                .and_then(Self::from_ordinal)
        })
    }
}

/// How the user enters music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    Notes,
    Chords,
    Keys,
}

impl Enumeration for InputMode {
    fn all_variants() -> &'static [Self] {
        &[InputMode::Notes, InputMode::Chords, InputMode::Keys]
    }

    fn display_name(&self) -> &'static str {
        match self {
            InputMode::Notes => "Notes",
            InputMode::Chords => "Chords",
            InputMode::Keys => "Keys",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            InputMode::Notes => &["note", "melody"],
            InputMode::Chords => &["chord", "harmony"],
            InputMode::Keys => &["key", "keyboard"],
        }
    }
}

/// Output format of a rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    Html,
    Svg,
    Png,
    Midi,
    Json,
    Ascii,
}

/// Metadata attached to a render mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderModeInfo {
    pub mode: RenderMode,
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub binary: bool,
}

const RENDER_MODE_INFO: &[RenderModeInfo] = &[
    RenderModeInfo { mode: RenderMode::Html, extension: "html", mime_type: "text/html", binary: false },
    RenderModeInfo { mode: RenderMode::Svg, extension: "svg", mime_type: "image/svg+xml", binary: false },
    RenderModeInfo { mode: RenderMode::Png, extension: "png", mime_type: "image/png", binary: true },
    RenderModeInfo { mode: RenderMode::Midi, extension: "mid", mime_type: "audio/midi", binary: true },
    RenderModeInfo { mode: RenderMode::Json, extension: "json", mime_type: "application/json", binary: false },
    RenderModeInfo { mode: RenderMode::Ascii, extension: "txt", mime_type: "text/plain", binary: false },
];

impl RenderMode {
    pub fn info(&self) -> &'static RenderModeInfo {
        RENDER_MODE_INFO
            .iter()
            .find(|info| info.mode == *self)
            .unwrap_or(&RENDER_MODE_INFO[0])
    }

    pub fn extension(&self) -> &'static str {
        self.info().extension
    }

    /// Find the render mode producing files with this extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        let wanted = extension.trim_start_matches('.').to_lowercase();
        RENDER_MODE_INFO
            .iter()
            .find(|info| info.extension == wanted)
            .map(|info| info.mode)
    }
}

impl Enumeration for RenderMode {
    fn all_variants() -> &'static [Self] {
        &[
            RenderMode::Html,
            RenderMode::Svg,
            RenderMode::Png,
            RenderMode::Midi,
            RenderMode::Json,
            RenderMode::Ascii,
        ]
    }

    fn display_name(&self) -> &'static str {
        match self {
            RenderMode::Html => "HTML",
            RenderMode::Svg => "SVG",
            RenderMode::Png => "PNG",
            RenderMode::Midi => "MIDI",
            RenderMode::Json => "JSON",
            RenderMode::Ascii => "ASCII",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            RenderMode::Html => &["htm", "web"],
            RenderMode::Midi => &["mid"],
            RenderMode::Ascii => &["text", "txt"],
            _ => &[],
        }
    }
}

/// Page shape of a visual rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    Square,
    Standard,
    Widescreen,
    Portrait,
    Vertical,
}

impl AspectRatio {
    /// Width and height terms of the ratio
    pub fn terms(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Standard => (4, 3),
            AspectRatio::Widescreen => (16, 9),
            AspectRatio::Portrait => (3, 4),
            AspectRatio::Vertical => (9, 16),
        }
    }

    pub fn as_f64(&self) -> f64 {
        let (width, height) = self.terms();
        f64::from(width) / f64::from(height)
    }
}

impl Enumeration for AspectRatio {
    fn all_variants() -> &'static [Self] {
        &[
            AspectRatio::Square,
            AspectRatio::Standard,
            AspectRatio::Widescreen,
            AspectRatio::Portrait,
            AspectRatio::Vertical,
        ]
    }

    fn display_name(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Vertical => "9:16",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            AspectRatio::Square => &["square"],
            AspectRatio::Standard => &["standard", "landscape"],
            AspectRatio::Widescreen => &["widescreen", "wide"],
            AspectRatio::Portrait => &["portrait"],
            AspectRatio::Vertical => &["vertical", "story"],
        }
    }
}

/// Instrument a chord diagram is drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    Piano,
    Guitar,
    Ukulele,
    Bass,
    Mandolin,
}

impl Instrument {
    /// Number of strings, None for keyboards
    pub fn strings(&self) -> Option<u8> {
        match self {
            Instrument::Piano => None,
            Instrument::Guitar => Some(6),
            Instrument::Ukulele => Some(4),
            Instrument::Bass => Some(4),
            Instrument::Mandolin => Some(8),
        }
    }
}

impl Enumeration for Instrument {
    fn all_variants() -> &'static [Self] {
        &[
            Instrument::Piano,
            Instrument::Guitar,
            Instrument::Ukulele,
            Instrument::Bass,
            Instrument::Mandolin,
        ]
    }

    fn display_name(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Ukulele => "Ukulele",
            Instrument::Bass => "Bass",
            Instrument::Mandolin => "Mandolin",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Instrument::Piano => &["keyboard"],
            Instrument::Ukulele => &["uke"],
            Instrument::Bass => &["bass guitar"],
            _ => &[],
        }
    }
}

macro_rules! display_via_name {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.display_name())
                }
            }
        )*
    };
}

display_via_name!(InputMode, RenderMode, AspectRatio, Instrument);
