//! Key strokes and trigger sequences.
//!
//! This module provides:
//! - `Modifiers` - Modifier key flags (cmd, ctrl, alt, shift)
//! - `KeyStroke` - One key press with modifiers, key name canonicalized
//! - `TriggerSequence` - An ordered, non-empty list of strokes (single key or chord)
//!
//! Text syntax ("ctrl+x ctrl+s") is produced for diagnostics only; parsing
//! strokes from text belongs to the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{BindingError, Result};

/// Modifier keys for a stroke.
///
/// `cmd` is the platform accelerator: Command on macOS, Super elsewhere.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Modifiers {
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub fn cmd() -> Self {
        Self {
            cmd: true,
            ..Default::default()
        }
    }
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }
    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Default::default()
        }
    }
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
    /// Number of pressed modifiers.
    pub fn count(&self) -> usize {
        [self.cmd, self.ctrl, self.alt, self.shift]
            .iter()
            .filter(|pressed| **pressed)
            .count()
    }
    pub fn none(&self) -> bool {
        self.count() == 0
    }
}

/// A single key press: a canonical key name plus modifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyStroke {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyStroke {
    pub fn new(key: impl AsRef<str>, modifiers: Modifiers) -> Self {
        Self {
            key: canonicalize_key(key.as_ref()),
            modifiers,
        }
    }

    /// A stroke without modifiers.
    pub fn key(key: impl AsRef<str>) -> Self {
        Self::new(key, Modifiers::default())
    }

    pub fn to_canonical_string(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.modifiers.alt {
            parts.push("alt");
        }
        if self.modifiers.cmd {
            parts.push("cmd");
        }
        if self.modifiers.ctrl {
            parts.push("ctrl");
        }
        if self.modifiers.shift {
            parts.push("shift");
        }
        parts.push(&self.key);
        parts.join("+")
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

/// An ordered sequence of key strokes that invokes a command.
///
/// Equality, hashing and ordering use the full stroke list, so sequences are
/// usable as map keys throughout the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerSequence {
    strokes: SmallVec<[KeyStroke; 2]>,
}

impl TriggerSequence {
    /// Build a sequence. Fails with `InvalidArgument` when `strokes` is empty.
    pub fn new(strokes: impl IntoIterator<Item = KeyStroke>) -> Result<Self> {
        let strokes: SmallVec<[KeyStroke; 2]> = strokes.into_iter().collect();
        if strokes.is_empty() {
            return Err(BindingError::invalid_argument(
                "trigger sequence needs at least one stroke",
            ));
        }
        Ok(Self { strokes })
    }

    pub fn single(stroke: KeyStroke) -> Self {
        let mut strokes = SmallVec::new();
        strokes.push(stroke);
        Self { strokes }
    }

    pub fn strokes(&self) -> &[KeyStroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All proper, non-empty prefixes, shortest first.
    pub fn prefixes(&self) -> Vec<TriggerSequence> {
        (1..self.strokes.len())
            .map(|end| TriggerSequence {
                strokes: self.strokes[..end].iter().cloned().collect(),
            })
            .collect()
    }

    /// Total pressed modifiers across all strokes.
    pub fn modifier_count(&self) -> usize {
        self.strokes.iter().map(|s| s.modifiers.count()).sum()
    }
}

impl From<KeyStroke> for TriggerSequence {
    fn from(stroke: KeyStroke) -> Self {
        Self::single(stroke)
    }
}

impl fmt::Display for TriggerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stroke) in self.strokes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", stroke)?;
        }
        Ok(())
    }
}

/// Spellings folded onto one key name. `+` and space are the separators of
/// the display syntax, so they are always named.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("esc", "escape"),
    ("return", "enter"),
    ("back", "backspace"),
    ("del", "delete"),
    ("arrowup", "up"),
    ("arrowdown", "down"),
    ("arrowleft", "left"),
    ("arrowright", "right"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("spacebar", "space"),
    (" ", "space"),
    ("+", "plus"),
];

/// Lowercase `key` and resolve aliases, so strokes from different sources
/// compare equal as map keys.
pub fn canonicalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    let name = match lower.trim() {
        "" if !lower.is_empty() => " ",
        trimmed => trimmed,
    };
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or_else(|| name.to_string(), |(_, canonical)| canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(key: &str) -> KeyStroke {
        KeyStroke::new(key, Modifiers::ctrl())
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = TriggerSequence::new(Vec::new()).unwrap_err();
        assert!(matches!(err, BindingError::InvalidArgument(_)));
    }

    #[test]
    fn single_stroke_has_no_prefixes() {
        let seq = TriggerSequence::single(ctrl("k"));
        assert!(seq.prefixes().is_empty());
    }

    #[test]
    fn prefixes_are_proper_and_shortest_first() {
        let seq = TriggerSequence::new([ctrl("x"), ctrl("r"), KeyStroke::key("t")]).unwrap();
        let prefixes = seq.prefixes();
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[0].strokes(), &[ctrl("x")]);
        assert_eq!(prefixes[1].strokes(), &[ctrl("x"), ctrl("r")]);
        assert!(prefixes
            .iter()
            .all(|p| p.len() < seq.len() && seq.strokes().starts_with(p.strokes())));
    }

    #[test]
    fn equality_uses_the_whole_stroke_list() {
        let a = TriggerSequence::new([ctrl("x"), ctrl("s")]).unwrap();
        let b = TriggerSequence::new([ctrl("x"), ctrl("s")]).unwrap();
        let c = TriggerSequence::new([ctrl("s"), ctrl("x")]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_names_are_canonicalized() {
        assert_eq!(KeyStroke::key("Esc"), KeyStroke::key("escape"));
        assert_eq!(KeyStroke::key("ArrowUp").key, "up");
        assert_eq!(KeyStroke::key("K").key, "k");
        assert_eq!(canonicalize_key("/"), "/");
    }

    #[test]
    fn separator_keys_are_named() {
        assert_eq!(canonicalize_key("+"), "plus");
        assert_eq!(canonicalize_key(" "), "space");
        assert_eq!(canonicalize_key("Spacebar"), "space");

        let stroke = KeyStroke::new("+", Modifiers::ctrl().with_shift());
        assert_eq!(stroke.to_string(), "ctrl+shift+plus");
        assert_eq!(KeyStroke::key(" "), KeyStroke::key("space"));
    }

    #[test]
    fn display_is_canonical() {
        let seq = TriggerSequence::new([
            KeyStroke::new("x", Modifiers::ctrl()),
            KeyStroke::new("s", Modifiers::cmd().with_shift()),
        ])
        .unwrap();
        assert_eq!(seq.to_string(), "ctrl+x cmd+shift+s");
    }

    #[test]
    fn modifier_count_sums_strokes() {
        let seq = TriggerSequence::new([
            KeyStroke::new("x", Modifiers::ctrl()),
            KeyStroke::new("s", Modifiers::cmd().with_shift()),
        ])
        .unwrap();
        assert_eq!(seq.modifier_count(), 3);
        assert!(KeyStroke::key("a").modifiers.none());
    }
}
