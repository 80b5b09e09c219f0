//! Incoming question shapes and their normalization.
//!
//! The conversational collaborator hands over the last user message in
//! whatever shape its transport produced: a plain string, a list of
//! message fragments, or a structured message object. [`Question`]
//! models those shapes as an untagged enum and [`Question::normalize`]
//! flattens any of them to the single plain-text string the embedder
//! receives.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A question as received from the conversational collaborator.
///
/// Deserializes untagged from the wire shape: a JSON string, an array
/// of fragments, or an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Question {
    /// A plain string, used as-is.
    Text(String),
    /// An ordered sequence of message fragments, joined with spaces.
    Fragments(Vec<Fragment>),
    /// A structured message object; `content` is preferred, then `text`.
    Structured(Map<String, Value>),
}

/// One fragment of a multi-part question.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    /// A bare string fragment.
    Text(String),
    /// An object fragment exposing a `text` field.
    Object(FragmentObject),
    /// Any other shape, which contributes no text.
    Other(Value),
}

/// An object fragment; fields other than `text` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentObject {
    /// The fragment's text content.
    pub text: String,
}

impl Fragment {
    fn text(&self) -> String {
        match self {
            Fragment::Text(s) => s.clone(),
            Fragment::Object(o) => o.text.clone(),
            Fragment::Other(_) => String::new(),
        }
    }
}

impl Question {
    /// Flatten the question to a single plain-text string.
    ///
    /// - `Text` is used as-is.
    /// - `Fragments` joins each fragment's text with a single space;
    ///   unrecognized fragment shapes contribute an empty string.
    /// - `Structured` prefers `content` (stringified when not already a
    ///   string), then a string `text` field, then the serialization of
    ///   the whole object.
    ///
    /// This precedence matches what the collaborator has always sent and
    /// must be preserved for behavioral compatibility.
    pub fn normalize(&self) -> String {
        match self {
            Question::Text(s) => s.clone(),
            Question::Fragments(fragments) => {
                fragments.iter().map(Fragment::text).collect::<Vec<_>>().join(" ")
            }
            Question::Structured(map) => {
                if let Some(content) = map.get("content") {
                    match content {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    }
                } else if let Some(Value::String(s)) = map.get("text") {
                    s.clone()
                } else {
                    Value::Object(map.clone()).to_string()
                }
            }
        }
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::Text(s.to_string())
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::Text(s)
    }
}
