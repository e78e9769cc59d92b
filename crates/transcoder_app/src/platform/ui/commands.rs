use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_warn;
use transcoder_core::{InputFile, Msg};

use super::constants::*;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Open(PathBuf),
    Action,
    Transcode,
    Download,
    Status,
    Help,
    Quit,
}

impl UserCommand {
    /// Session message for commands that map directly onto one.
    pub fn as_msg(&self) -> Option<Msg> {
        match self {
            UserCommand::Action => Some(Msg::ActionClicked),
            UserCommand::Transcode => Some(Msg::TranscodeClicked),
            UserCommand::Download => Some(Msg::DownloadClicked),
            UserCommand::Open(_)
            | UserCommand::Status
            | UserCommand::Help
            | UserCommand::Quit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    MissingPath,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Result<UserCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        COMMAND_OPEN => {
            if rest.is_empty() {
                Err(ParseError::MissingPath)
            } else {
                Ok(UserCommand::Open(PathBuf::from(unquote(rest))))
            }
        }
        COMMAND_ACTION => Ok(UserCommand::Action),
        COMMAND_TRANSCODE => Ok(UserCommand::Transcode),
        COMMAND_DOWNLOAD => Ok(UserCommand::Download),
        COMMAND_STATUS => Ok(UserCommand::Status),
        COMMAND_HELP => Ok(UserCommand::Help),
        COMMAND_QUIT | "exit" => Ok(UserCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

/// Reads a picked file into memory and guesses its media type from the extension.
pub fn read_input_file(path: &Path) -> io::Result<InputFile> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    let file = InputFile::new(name, media_type, bytes);
    if !file.is_video() {
        engine_warn!(
            "{:?} does not look like a video ({:?}); the engine may reject it",
            path,
            file.media_type
        );
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("go"), Ok(UserCommand::Action));
        assert_eq!(parse_command("  Transcode "), Ok(UserCommand::Transcode));
        assert_eq!(parse_command("download"), Ok(UserCommand::Download));
        assert_eq!(parse_command("exit"), Ok(UserCommand::Quit));
        assert_eq!(
            parse_command("open \"my clip.mov\""),
            Ok(UserCommand::Open(PathBuf::from("my clip.mov")))
        );
        assert_eq!(
            parse_command("open /tmp/a b.mov"),
            Ok(UserCommand::Open(PathBuf::from("/tmp/a b.mov")))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(parse_command("open"), Err(ParseError::MissingPath));
        assert_eq!(
            parse_command("play now"),
            Err(ParseError::Unknown("play".to_string()))
        );
    }

    #[test]
    fn action_commands_map_to_messages() {
        assert_eq!(UserCommand::Action.as_msg(), Some(Msg::ActionClicked));
        assert_eq!(UserCommand::Download.as_msg(), Some(Msg::DownloadClicked));
        assert_eq!(UserCommand::Quit.as_msg(), None);
    }

    #[test]
    fn reads_file_with_guessed_media_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mov");
        fs::write(&path, b"moov").unwrap();

        let file = read_input_file(&path).unwrap();
        assert_eq!(file.name, "clip.mov");
        assert_eq!(file.media_type.as_deref(), Some("video/quicktime"));
        assert_eq!(file.bytes.as_ref(), b"moov");
        assert!(file.is_video());
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(read_input_file(&temp.path().join("nope.mp4")).is_err());
    }
}
