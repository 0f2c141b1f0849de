//! Typed command parsing: one line of terminal input becomes one request

use shared::{ActionKind, ClientMessage};
use thiserror::Error;

/// What a line of input asks the client to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(ClientMessage),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command /{0} (try /help)")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a player id")]
    BadTarget(String),
}

pub const HELP: &str = "\
Commands:
  /name NAME           set your display name
  /start               start the match (host)
  /end                 end the current phase (host)
  /kill ID             night: vote to kill (killer, blackjack)
  /seer ID             night: check a player (seer)
  /heal                night: offer a heal (doctor)
  /guess ID ALIGNMENT  discussion: guess good/evil (blackjack, whitejack)
  /vote ID             voting: vote to eliminate
  /help                show this help
  /quit                leave
Anything else is sent as chat.";

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(ClientMessage::Chat {
            text: line.to_string(),
        })));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match name.as_str() {
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,
        "name" | "join" => Command::Send(ClientMessage::Join {
            name: (!args.is_empty()).then(|| args.join(" ")),
        }),
        "start" => Command::Send(ClientMessage::StartRequest),
        "end" => Command::Send(ClientMessage::EndPhase),
        "vote" => Command::Send(ClientMessage::Vote {
            target: target_arg(&args)?,
        }),
        "heal" => Command::Send(action(ActionKind::Heal, None, None)),
        "kill" => Command::Send(action(ActionKind::Kill, Some(target_arg(&args)?), None)),
        "seer" => Command::Send(action(ActionKind::Seer, Some(target_arg(&args)?), None)),
        "guess" => {
            let target = target_arg(&args)?;
            let guess = args
                .get(1)
                .ok_or(InputError::MissingArgument("alignment (good or evil)"))?;
            Command::Send(action(
                ActionKind::Guess,
                Some(target),
                Some(guess.to_string()),
            ))
        }
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn target_arg(args: &[&str]) -> Result<u32, InputError> {
    let raw = args.first().ok_or(InputError::MissingArgument("player id"))?;
    raw.parse()
        .map_err(|_| InputError::BadTarget(raw.to_string()))
}

fn action(kind: ActionKind, target: Option<u32>, extra: Option<String>) -> ClientMessage {
    ClientMessage::Action {
        action: kind.name().to_string(),
        target,
        extra,
    }
}
