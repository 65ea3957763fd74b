//! Unified error type for Snippetbox.

use snippetbox_models::ModelError;
use snippetbox_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// Handlers return `Result<Response, AppError>` and use `?` on model and
/// session calls; the `#[from]` attributes generate the conversions. Any
/// `AppError` that reaches [`App::handle`](crate::App::handle) is logged
/// and turned into a generic server error page.
///
/// Expected outcomes such as a failed form or wrong credentials are never
/// `AppError`s. Handlers match those `ModelError` variants themselves and
/// only forward the rest.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The session could not be loaded, renewed, or committed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A model call failed in a way the handler did not expect.
    #[error(transparent)]
    Model(#[from] ModelError),
}
