#[derive(Debug, thiserror::Error)]
pub enum CodepairError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("judge error: {0}")]
    Judge(String),

    #[error("ai error: {0}")]
    Ai(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Other(String),
}
