use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Sender {0} has not completed registration")]
    CustomerNotFound(i64),

    #[error("No ticket for channel message {0}")]
    TicketNotFound(i64),

    #[error("Contact lookup error: {0}")]
    Lookup(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
