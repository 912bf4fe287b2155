use chess_core::MoveError;

#[derive(Debug, thiserror::Error)]
pub enum CommError {
    #[error("Viewer disconnected")]
    Disconnected,

    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("It is not your turn")]
    NotYourTurn,

    #[error("The session has ended")]
    Terminated,

    #[error(transparent)]
    Move(#[from] MoveError),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin keyword '{0}' is already registered")]
    DuplicatePlugin(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
