#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Completion service credential is not configured")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),
}
