use clipquery_core::Msg;

pub const HELP: &str = "\
Commands:
  process <url>     start processing a video
  ask <question>    ask about the processed video
  stop              stop the current session
  cancel            stop waiting for the current job
  status            show all panels again
  help              show this text
  quit              exit";

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Process(String),
    Ask(String),
    Stop,
    Cancel,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> LineCommand {
    let line = line.trim();
    if line.is_empty() {
        return LineCommand::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_ascii_lowercase().as_str() {
        "process" | "p" => LineCommand::Process(rest.to_string()),
        "ask" | "a" => LineCommand::Ask(rest.to_string()),
        "stop" => LineCommand::Stop,
        "cancel" => LineCommand::Cancel,
        "status" => LineCommand::Status,
        "help" | "?" => LineCommand::Help,
        "quit" | "exit" | "q" => LineCommand::Quit,
        _ => LineCommand::Unknown(word.to_string()),
    }
}

/// Messages a command feeds into the controller, in order.
pub fn to_msgs(command: LineCommand) -> Vec<Msg> {
    match command {
        LineCommand::Process(url) => vec![Msg::UrlInputChanged(url), Msg::StartClicked],
        LineCommand::Ask(query) => vec![Msg::QueryInputChanged(query), Msg::QueryClicked],
        LineCommand::Stop => vec![Msg::StopClicked],
        LineCommand::Cancel => vec![Msg::CancelClicked],
        LineCommand::Status
        | LineCommand::Help
        | LineCommand::Quit
        | LineCommand::Empty
        | LineCommand::Unknown(_) => Vec::new(),
    }
}
