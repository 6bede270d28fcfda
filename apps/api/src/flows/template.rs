//! Prompt Template Renderer — single-pass `{slot}` substitution.
//!
//! Only `{name}` tokens that name a supplied slot are replaced; any other brace
//! text (JSON examples inside a template, braces typed by the user) passes
//! through untouched. Substituted values are never re-scanned.

use crate::flows::schema::DataUri;

/// One piece of the user turn sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// An uploaded document embedded by reference rather than as inline text.
    Media(DataUri),
}

/// The complete instruction payload for one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: &'static str,
    pub parts: Vec<PromptPart>,
}

impl Prompt {
    pub fn new(system: &'static str, parts: Vec<PromptPart>) -> Self {
        Self { system, parts }
    }

    /// Concatenated text parts; media parts are skipped.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::Media(_) => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn media(&self) -> impl Iterator<Item = &DataUri> {
        self.parts.iter().filter_map(|p| match p {
            PromptPart::Media(uri) => Some(uri),
            PromptPart::Text(_) => None,
        })
    }
}

/// A value bound to a template placeholder.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Text(&'a str),
    Media(&'a DataUri),
}

/// Renders `template`, substituting each `{name}` found in `slots`.
pub fn render(template: &str, slots: &[(&str, Slot<'_>)]) -> Vec<PromptPart> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let bound = after.find('}').and_then(|close| {
            let name = &after[..close];
            slots
                .iter()
                .find(|(slot_name, _)| *slot_name == name)
                .map(|(_, slot)| (close, *slot))
        });

        match bound {
            Some((close, Slot::Text(value))) => {
                text.push_str(value);
                rest = &after[close + 1..];
            }
            Some((close, Slot::Media(uri))) => {
                flush(&mut parts, &mut text);
                parts.push(PromptPart::Media(uri.clone()));
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }

    text.push_str(rest);
    flush(&mut parts, &mut text);
    parts
}

fn flush(parts: &mut Vec<PromptPart>, text: &mut String) {
    if !text.is_empty() {
        parts.push(PromptPart::Text(std::mem::take(text)));
    }
}
