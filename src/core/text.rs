/// Option text templating: `{entity.name}` and
/// `{entity.attributeValues.<key>}` substitution for generated options.
use serde::{Deserialize, Serialize};

use crate::schema::entity::Entity;

const NAME_SLOT: &str = "entity.name";
const ATTRIBUTE_PREFIX: &str = "entity.attributeValues.";

/// A segment of a parsed option text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `{entity.name}`.
    EntityName,
    /// `{entity.attributeValues.<key>}`.
    EntityAttribute { key: String },
}

/// A parsed option text: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OptionText {
    pub segments: Vec<TextSegment>,
}

/// What a missing or null attribute renders as.
pub fn missing_placeholder(key: &str) -> String {
    format!("[{}?]", key)
}

impl OptionText {
    /// Parse an option template.
    ///
    /// Never fails: braces that do not form a known slot are kept as
    /// literal text so a bad template still renders something readable.
    /// There is no escape syntax; doubled braces are ordinary text.
    pub fn parse(input: &str) -> OptionText {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' => {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|c| *c == '}' || *c == '{')
                        .map(|offset| i + 1 + offset)
                        .filter(|end| chars[*end] == '}');

                    let Some(end) = close else {
                        literal_buf.push('{');
                        i += 1;
                        continue;
                    };

                    let content: String = chars[i + 1..end].iter().collect();
                    match Self::parse_slot(content.trim()) {
                        Some(segment) => {
                            if !literal_buf.is_empty() {
                                segments.push(TextSegment::Literal(std::mem::take(&mut literal_buf)));
                            }
                            segments.push(segment);
                        }
                        None => {
                            literal_buf.push('{');
                            literal_buf.push_str(&content);
                            literal_buf.push('}');
                        }
                    }
                    i = end + 1;
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TextSegment::Literal(literal_buf));
        }

        OptionText { segments }
    }

    fn parse_slot(content: &str) -> Option<TextSegment> {
        if content == NAME_SLOT {
            return Some(TextSegment::EntityName);
        }
        content
            .strip_prefix(ATTRIBUTE_PREFIX)
            .filter(|key| !key.is_empty())
            .map(|key| TextSegment::EntityAttribute {
                key: key.to_string(),
            })
    }

    /// Substitute `entity` into the template.
    pub fn render(&self, entity: &Entity) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TextSegment::Literal(text) => out.push_str(text),
                TextSegment::EntityName => out.push_str(&entity.name),
                TextSegment::EntityAttribute { key } => match entity.value(key) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => out.push_str(&missing_placeholder(key)),
                },
            }
        }
        out
    }

    /// Attribute keys the template reads.
    pub fn referenced_keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TextSegment::EntityAttribute { key } => Some(key.as_str()),
            _ => None,
        })
    }
}

/// Parse and render in one step.
pub fn render_option_text(template: &str, entity: &Entity) -> String {
    OptionText::parse(template).render(entity)
}
