use depot_derive::depot_error;
use std::borrow::Cow;

#[depot_error]
pub enum StoreError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn missing() -> Result<(), StoreError> {
    Err(StoreError::NotFound { message: "avatars/a.png".into(), context: None })
}

fn io() -> Result<(), StoreError> {
    Err(std::io::Error::other("disk full")).context("Writing avatar")
}

fn main() {
    let err = missing().context("Reading avatar").unwrap_err();
    assert_eq!(err.context_message(), Some("Reading avatar"));
    assert_eq!(err.to_string(), "Not found (Reading avatar): avatars/a.png");

    let err = io().unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(err.to_string(), "I/O failure (Writing avatar): disk full");
}
