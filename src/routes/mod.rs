/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.

/// Routes accessible to all clients (login flows, registration, public catalog).
/// Data handlers here must only serve rows explicitly marked public/published.
pub mod public;

/// Routes protected by the `AuthPrincipal` extractor middleware.
/// Requires a validated session for any tenant family.
pub mod authenticated;

/// Routes restricted to administrative roles. The role check itself lives in
/// the handlers, after the authentication layer has resolved the principal.
pub mod admin;
