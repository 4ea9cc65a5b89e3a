use std::path::PathBuf;

/// Rejected game requests. None of these end the game or the process; the
/// front-end turns them into a message for whoever asked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid column")]
    InvalidColumn(usize),

    #[error("column is full")]
    ColumnFull(usize),

    #[error("game is already over")]
    GameAlreadyOver,

    #[error("only players can do that")]
    NotAParticipant,

    #[error("it's not your turn")]
    NotYourTurn,

    #[error("there's already an active game in this session")]
    GameAlreadyActive,

    #[error("no active game in this session")]
    NoActiveGame,

    #[error("you can't play against yourself")]
    SamePlayer,

    #[error("{handle} can't play: automated accounts are not allowed")]
    NotHuman { handle: String },

    #[error("invalid minefield: {0}")]
    InvalidMinefield(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
