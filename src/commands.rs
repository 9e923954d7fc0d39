use crate::types::ListId;
use combine::error::ParseError;
use combine::parser::char::{char, letter, spaces};
use combine::{any, many, many1, stream::position, EasyParser, Parser, Stream};
use std::fmt::Display;

/// What a line typed into the entry field asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    AddTask(String),
    /// `None` opens the name prompt.
    NewList(Option<String>),
    RenameList(Option<String>),
    SelectList(ListId),
    Complete,
    Remove,
    DeleteList,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandParseError {
    UnknownCommand(String),
    InvalidArgument(String),
    Syntax(String),
}

impl Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandParseError::UnknownCommand(verb) => write!(f, "Unknown command :{verb}"),
            CommandParseError::InvalidArgument(arg) => write!(f, "Invalid argument '{arg}'"),
            CommandParseError::Syntax(msg) => write!(f, "Could not parse command: {msg}"),
        }
    }
}

/// `:verb rest of line`
fn command_line<Input>() -> impl Parser<Input, Output = (String, String)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        char(':'),
        many1(letter().or(char('-'))),
        spaces().silent(),
        many(any()),
    )
        .map(|(_, verb, _, rest): (char, String, (), String)| (verb, rest))
}

fn optional_arg(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Parses one entry line. Text without a leading `:` is a new task, and a
/// doubled `::` escapes a task that starts with a colon.
pub(crate) fn parse_command(input: &str) -> Result<Command, CommandParseError> {
    if let Some(escaped) = input.strip_prefix("::") {
        return Ok(Command::AddTask(format!(":{escaped}")));
    }
    if !input.starts_with(':') {
        return Ok(Command::AddTask(input.to_string()));
    }
    let ((verb, rest), _) = command_line()
        .easy_parse(position::Stream::new(input))
        .map_err(|e| CommandParseError::Syntax(e.to_string()))?;
    let verb = verb.to_ascii_lowercase();
    Ok(match verb.as_str() {
        "n" | "new" => Command::NewList(optional_arg(&rest)),
        "r" | "rename" => Command::RenameList(optional_arg(&rest)),
        "l" | "list" => {
            let arg = rest.trim();
            let id = arg
                .parse()
                .map_err(|_| CommandParseError::InvalidArgument(arg.to_string()))?;
            Command::SelectList(id)
        }
        "d" | "done" => Command::Complete,
        "rm" | "remove" => Command::Remove,
        "delete-list" => Command::DeleteList,
        "q" | "quit" => Command::Quit,
        _ => return Err(CommandParseError::UnknownCommand(verb)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_task() {
        assert_eq!(
            parse_command("Buy milk"),
            Ok(Command::AddTask("Buy milk".into()))
        );
        assert_eq!(
            parse_command("::colon first"),
            Ok(Command::AddTask(":colon first".into()))
        );
    }

    #[test]
    fn list_commands() {
        assert_eq!(
            parse_command(":new Home"),
            Ok(Command::NewList(Some("Home".into())))
        );
        assert_eq!(parse_command(":new"), Ok(Command::NewList(None)));
        assert_eq!(parse_command(":n   "), Ok(Command::NewList(None)));
        assert_eq!(
            parse_command(":rename Side projects"),
            Ok(Command::RenameList(Some("Side projects".into())))
        );
        assert_eq!(parse_command(":list 3"), Ok(Command::SelectList(3)));
        assert_eq!(parse_command(":delete-list"), Ok(Command::DeleteList));
    }

    #[test]
    fn task_commands() {
        assert_eq!(parse_command(":done"), Ok(Command::Complete));
        assert_eq!(parse_command(":RM"), Ok(Command::Remove));
        assert_eq!(parse_command(":q"), Ok(Command::Quit));
    }

    #[test]
    fn bad_commands() {
        assert_eq!(
            parse_command(":frobnicate"),
            Err(CommandParseError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            parse_command(":list home"),
            Err(CommandParseError::InvalidArgument("home".into()))
        );
        assert!(matches!(
            parse_command(": new"),
            Err(CommandParseError::Syntax(_))
        ));
    }
}
