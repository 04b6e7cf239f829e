//! DTOs for auth endpoints.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthenticatedResponse {
    pub authenticated: bool,
}
