use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream is already running; stop it before starting again")]
    AlreadyStreaming,

    #[error("stream is not running")]
    NotStreaming,

    #[error("failed to spawn the generation thread")]
    Spawn(#[source] std::io::Error),

    #[error("generation thread panicked")]
    WorkerPanicked,
}

pub type StreamResult<T> = Result<T, StreamError>;
