/// Router Module Index
///
/// Splits the HTTP surface by who may call it. Access control is applied per module
/// (via Axum layers and extractors), so a route cannot end up exposed by accident.

/// Routes open to anonymous callers: health and the landing redirect, which reads
/// the session itself.
pub mod public;

/// Routes behind the `AuthUser` middleware. Requires a valid session and an
/// unblocked profile.
pub mod authenticated;

/// Platform operator routes, nested under `/backoffice`. Handlers check the
/// super-admin role.
pub mod backoffice;
