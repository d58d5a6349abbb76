use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Request producer failed: {0:#}")]
    Producer(anyhow::Error),

    #[error("Request producer for entity {0} panicked")]
    Panicked(u32),

    #[error("Request was dropped before it could be processed")]
    Abandoned,
}
