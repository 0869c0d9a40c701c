//! Transcript → command matching.
//!
//! Matching is a case-insensitive substring test, so "next" also fires
//! inside words such as "nextdoor".  Callers get exactly what was said.

/// Command recognised in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    Next,
    Repeat,
}

impl VoiceCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceCommand::Next => "next",
            VoiceCommand::Repeat => "repeat",
        }
    }
}

/// Find a command in `text`.  `"next"` takes precedence over `"repeat"`.
///
/// ```
/// use prayer_coach::voice::{parse_command, VoiceCommand};
///
/// assert_eq!(parse_command("Next please"), Some(VoiceCommand::Next));
/// assert_eq!(parse_command("REPEAT"), Some(VoiceCommand::Repeat));
/// assert_eq!(parse_command("allahu akbar"), None);
/// ```
pub fn parse_command(text: &str) -> Option<VoiceCommand> {
    let lower = text.to_lowercase();
    if lower.contains("next") {
        Some(VoiceCommand::Next)
    } else if lower.contains("repeat") {
        Some(VoiceCommand::Repeat)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert_eq!(parse_command("NEXT"), Some(VoiceCommand::Next));
        assert_eq!(parse_command("Repeat that"), Some(VoiceCommand::Repeat));
    }

    #[test]
    fn matches_inside_other_words() {
        assert_eq!(parse_command("the house nextdoor"), Some(VoiceCommand::Next));
    }

    #[test]
    fn next_wins_over_repeat() {
        assert_eq!(parse_command("repeat, no, next"), Some(VoiceCommand::Next));
    }

    #[test]
    fn empty_and_unrelated_text() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("subhana rabbiyal azim"), None);
    }
}
