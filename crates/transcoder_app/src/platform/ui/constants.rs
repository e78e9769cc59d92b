pub const COMMAND_OPEN: &str = "open";
pub const COMMAND_ACTION: &str = "go";
pub const COMMAND_TRANSCODE: &str = "transcode";
pub const COMMAND_DOWNLOAD: &str = "download";
pub const COMMAND_STATUS: &str = "status";
pub const COMMAND_HELP: &str = "help";
pub const COMMAND_QUIT: &str = "quit";

pub const LOADING_LABEL: &str = "Loading engine...";
pub const PROMPT_HINT: &str = "commands: open <path> | go | transcode | download | status | help | quit";
