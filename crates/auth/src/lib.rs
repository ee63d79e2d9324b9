//! `labelforge-auth`: bearer-token boundary.
//!
//! Decodes and validates the token issued by the login service; everything
//! past this point only sees the acting [`UserId`](labelforge_core::UserId).

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
