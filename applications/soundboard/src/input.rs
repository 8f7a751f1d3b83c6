/// Commands typed at the soundboard prompt
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "Commands: <number> play/stop that sound, s sync, x stop, q quit, h help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Toggle the sound at a 1-based display position
    Toggle(usize),
    Stop,
    Resync,
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for InputCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();

        if let Ok(position) = trimmed.parse::<usize>() {
            if position == 0 {
                return Err(UnknownCommand(trimmed.to_string()));
            }
            return Ok(Self::Toggle(position));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "x" | "stop" => Ok(Self::Stop),
            "s" | "sync" => Ok(Self::Resync),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "h" | "help" | "?" => Ok(Self::Help),
            _ => Err(UnknownCommand(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_toggle_positions() {
        assert_eq!("3".parse(), Ok(InputCommand::Toggle(3)));
        assert_eq!("  12 \n".parse(), Ok(InputCommand::Toggle(12)));
    }

    #[test]
    fn zero_is_not_a_position() {
        assert!("0".parse::<InputCommand>().is_err());
    }

    #[test]
    fn words_and_letters() {
        assert_eq!("x".parse(), Ok(InputCommand::Stop));
        assert_eq!("STOP".parse(), Ok(InputCommand::Stop));
        assert_eq!("s".parse(), Ok(InputCommand::Resync));
        assert_eq!("q".parse(), Ok(InputCommand::Quit));
        assert_eq!("?".parse(), Ok(InputCommand::Help));
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(
            "dance".parse::<InputCommand>(),
            Err(UnknownCommand("dance".to_string()))
        );
        assert!("".parse::<InputCommand>().is_err());
    }

    #[test]
    fn unknown_command_names_the_input() {
        let err = "dance".parse::<InputCommand>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown command: dance");
    }
}
