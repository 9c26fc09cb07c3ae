//! Conversation input format (§6): plain text, one line per turn,
//! `<Speaker>: <text>`. Blank lines and lines without the `<label>:` prefix
//! are ignored. Malformed lines are never fatal (§7): they're skipped and
//! collected for the caller to log as warnings.

use chrono::Utc;

use crate::model::Utterance;

/// One line that didn't parse as `<Speaker>: <text>`.
#[derive(Debug, Clone)]
pub struct SkippedLine {
    pub line_number: usize,
    pub raw: String,
}

/// Result of parsing a whole conversation transcript.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub utterances: Vec<Utterance>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse a conversation transcript into turn-ordered utterances. `turn_index`
/// is assigned sequentially over the successfully parsed lines (blank and
/// unparseable lines do not consume a turn index), starting at 0.
pub fn parse_conversation(text: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut turn_index = 0u32;
    for (line_number, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        match split_speaker_line(trimmed) {
            Some((speaker, utterance_text)) => {
                result.utterances.push(Utterance {
                    turn_index,
                    speaker: speaker.to_string(),
                    text: utterance_text.to_string(),
                    timestamp: Utc::now(),
                });
                turn_index += 1;
            }
            None => result.skipped.push(SkippedLine {
                line_number: line_number + 1,
                raw: raw.to_string(),
            }),
        }
    }
    tracing::debug!(
        parsed = result.utterances.len(),
        skipped = result.skipped.len(),
        "conversation transcript parsed"
    );
    result
}

/// Split a trimmed line on the first `<label>:` prefix. The label may not
/// contain a colon itself; everything after the first colon (trimmed) is the
/// utterance text. Lines with an empty label or empty text are malformed.
fn split_speaker_line(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(':')?;
    let (speaker, rest) = line.split_at(idx);
    let speaker = speaker.trim();
    let text = rest[1..].trim();
    if speaker.is_empty() || text.is_empty() {
        return None;
    }
    Some((speaker, text))
}
