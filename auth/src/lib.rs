//! # Recipe Hub Authentication
//!
//! Credential and session-token primitives for Recipe Hub.
//!
//! ## Features
//!
//! - **Passwords**: Argon2id hashing with per-password salts
//! - **Sessions**: stateless HS256 JWTs, 24 hour default lifetime
//! - **Testable**: expiry is checked against an injected `Clock`
//!
//! ## Example
//!
//! ```rust
//! use recipe_hub_auth::{hash_password, verify_password, SigningKey, TokenConfig, TokenService};
//! use recipe_hub_core::{SystemClock, UserId};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), recipe_hub_auth::AuthError> {
//! let hash = hash_password("correct horse")?;
//! assert!(verify_password("correct horse", &hash));
//!
//! let key = SigningKey::new(vec![7u8; 32])?;
//! let tokens = TokenService::new(&key, TokenConfig::default(), Arc::new(SystemClock));
//! let user = UserId::new();
//! let issued = tokens.issue(user, "cook@example.com")?;
//! assert_eq!(tokens.validate(&issued.token)?.user_id, user);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod error;
pub mod password;
pub mod token;

pub use config::TokenConfig;
pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, SigningKey, TokenService};
