//! REPL command parsing.

use moodmeter_core::error::Result;
use moodmeter_core::mood::Mood;

pub const COMMAND_NAMES: &[&str] = &[
    "/pick", "/board", "/who", "/moods", "/reset", "/status", "/help", "/quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick a mood by label or by `row col` (1-based).
    Pick(Mood),
    Board,
    Who,
    Moods,
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    Usage(&'static str),
    Mood(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Unknown(cmd) => write!(f, "Unknown command '{}'. Type /help.", cmd),
            ParseError::Usage(usage) => write!(f, "Usage: {}", usage),
            ParseError::Mood(message) => write!(f, "{}", message),
        }
    }
}

fn parse_mood(args: &str) -> Result<Mood> {
    let mut parts = args.split_whitespace();
    if let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next())
        && let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>())
        && let Some(mood) = row
            .checked_sub(1)
            .zip(col.checked_sub(1))
            .and_then(|(r, c)| Mood::at(r, c))
    {
        return Ok(mood);
    }
    Mood::parse(args)
}

/// Parses one input line. A bare mood label is shorthand for `/pick`.
pub fn parse(line: &str) -> std::result::Result<Command, ParseError> {
    let line = line.trim();
    let (head, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args = args.trim();

    match head {
        "/pick" | "/p" => {
            if args.is_empty() {
                return Err(ParseError::Usage("/pick <mood> | /pick <row> <col>"));
            }
            parse_mood(args)
                .map(Command::Pick)
                .map_err(|e| ParseError::Mood(e.to_string()))
        }
        "/board" | "/b" => Ok(Command::Board),
        "/who" | "/w" => Ok(Command::Who),
        "/moods" => Ok(Command::Moods),
        "/reset" => Ok(Command::Reset),
        "/status" => Ok(Command::Status),
        "/help" | "/h" => Ok(Command::Help),
        "/quit" | "/exit" | "quit" | "exit" => Ok(Command::Quit),
        other if other.starts_with('/') => Err(ParseError::Unknown(other.to_string())),
        _ => Mood::parse(line)
            .map(Command::Pick)
            .map_err(|e| ParseError::Mood(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_by_label_and_position() {
        let calm = Mood::parse("Calm").unwrap();
        assert_eq!(parse("/pick calm"), Ok(Command::Pick(calm)));
        assert_eq!(parse("calm"), Ok(Command::Pick(calm)));
        assert_eq!(parse("/pick 1 1"), Ok(Command::Pick(Mood::at(0, 0).unwrap())));
    }

    #[test]
    fn test_pick_errors() {
        assert!(matches!(parse("/pick"), Err(ParseError::Usage(_))));
        assert!(matches!(parse("/pick 0 0"), Err(ParseError::Mood(_))));
        assert!(matches!(parse("/pick Grumpy"), Err(ParseError::Mood(_))));
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(parse("/board"), Ok(Command::Board));
        assert_eq!(parse("  /who "), Ok(Command::Who));
        assert_eq!(parse("quit"), Ok(Command::Quit));
        assert_eq!(parse("/nope"), Err(ParseError::Unknown("/nope".to_string())));
    }
}
