use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "\
usage: encwatch [watch]          poll the status endpoint and redraw every tick
       encwatch upload <path>    upload a file for encoding
       encwatch download <name>  download a finished item
       encwatch help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Watch,
    Upload { path: PathBuf },
    Download { name: String },
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown command {0:?}\n{USAGE}")]
    UnknownCommand(String),
    #[error("{0} needs an argument\n{USAGE}")]
    MissingArgument(&'static str),
    #[error("unexpected argument {0:?}\n{USAGE}")]
    Unexpected(String),
}

/// Parses arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        None | Some("watch") => Command::Watch,
        Some("help" | "-h" | "--help") => Command::Help,
        Some("upload") => Command::Upload {
            path: args
                .next()
                .map(PathBuf::from)
                .ok_or(CliError::MissingArgument("upload"))?,
        },
        Some("download") => Command::Download {
            name: args.next().ok_or(CliError::MissingArgument("download"))?,
        },
        Some(other) => return Err(CliError::UnknownCommand(other.to_string())),
    };
    match args.next() {
        Some(extra) => Err(CliError::Unexpected(extra)),
        None => Ok(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CliError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_watch() {
        assert_eq!(parse(&[]), Ok(Command::Watch));
        assert_eq!(parse(&["watch"]), Ok(Command::Watch));
    }

    #[test]
    fn parses_transfers() {
        assert_eq!(
            parse(&["upload", "clip.mp4"]),
            Ok(Command::Upload {
                path: PathBuf::from("clip.mp4")
            })
        );
        assert_eq!(
            parse(&["download", "Lobster Jumpscare.mp4"]),
            Ok(Command::Download {
                name: "Lobster Jumpscare.mp4".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse(&["upload"]), Err(CliError::MissingArgument("upload")));
        assert_eq!(
            parse(&["serve"]),
            Err(CliError::UnknownCommand("serve".to_string()))
        );
        assert_eq!(
            parse(&["watch", "now"]),
            Err(CliError::Unexpected("now".to_string()))
        );
    }
}
