use railo_order::{BuildError, SelectionError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    /// Server answered with a non-success status
    #[error("Reservation service returned {status}: {body}")]
    Network { status: u16, body: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Unauthorized => Some(401),
            ClientError::Network { status, .. } => Some(*status),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("A reservation call is already in flight for this session")]
    Busy,

    #[error("Booking session is closed")]
    Closed,
}

pub type SessionResult<T> = Result<T, SessionError>;
