use crate::error::InterconnectionError;
use serde::Serialize;

/// Marks an interconnection as a negated reference.
pub const NEGATION_MARKER: char = '-';
const QUOTE: char = '"';
const BLOCK_SEPARATOR: char = '\\';
const PORT_SEPARATOR: char = '.';
const PORT_TERMINATOR: char = ')';

/// The source side of a cross-diagram negation reference.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Interconnection {
    pub source_diagram: String,
    pub source_block: String,
    pub source_port_id: String,
}

/// Parses an interconnection reference of the shape
/// `-"<quoted>"<diagram>\<block>.<port>`, optionally followed by `)` and
/// arbitrary trailing text, e.g. `-" "DiagramA\BlockX.PortY`.
///
/// The reference may be embedded in surrounding text, but exactly one
/// negation marker followed by a quote must be present.
/// The diagram runs up to the first backslash, the block up to the next `.`,
/// and the port up to `)` or the end of the text.
pub fn parse_interconnection(text: &str) -> Result<Interconnection, InterconnectionError> {
    let owned = || text.to_string();

    if !text.contains(NEGATION_MARKER) {
        return Err(InterconnectionError::MissingNegationMarker(owned()));
    }

    let markers: Vec<usize> = text
        .match_indices(NEGATION_MARKER)
        .filter(|(at, _)| text[at + 1..].starts_with(QUOTE))
        .map(|(at, _)| at)
        .collect();
    let marker = match markers.as_slice() {
        [] => return Err(InterconnectionError::MissingQuote(owned())),
        [single] => *single,
        many => {
            return Err(InterconnectionError::Ambiguous {
                text: owned(),
                count: many.len(),
            });
        }
    };

    // Skip the marker and the opening quote.
    let quoted = &text[marker + NEGATION_MARKER.len_utf8() + QUOTE.len_utf8()..];
    let closing = quoted
        .find(QUOTE)
        .ok_or_else(|| InterconnectionError::UnterminatedQuote(owned()))?;
    let after_quote = &quoted[closing + QUOTE.len_utf8()..];

    let (source_diagram, after_diagram) = after_quote
        .split_once(BLOCK_SEPARATOR)
        .ok_or_else(|| InterconnectionError::MissingBackslash(owned()))?;

    let (source_block, after_block) = after_diagram
        .split_once(PORT_SEPARATOR)
        .ok_or_else(|| InterconnectionError::MissingPortSeparator(owned()))?;
    if source_block.is_empty() {
        return Err(InterconnectionError::EmptyBlock(owned()));
    }

    let source_port_id = after_block
        .split(PORT_TERMINATOR)
        .next()
        .unwrap_or_default();
    if source_port_id.is_empty() {
        return Err(InterconnectionError::EmptyPort(owned()));
    }

    Ok(Interconnection {
        source_diagram: source_diagram.to_string(),
        source_block: source_block.to_string(),
        source_port_id: source_port_id.to_string(),
    })
}
