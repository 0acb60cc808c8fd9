//! Authentication primitives
//!
//! - [`token`]: signed bearer tokens (issue / verify)
//! - [`gate`]: `Authorization` header → authenticated user ID
//! - [`password`]: Argon2id password hashing

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authenticate, GateError};
pub use token::{Claims, Rejection, TokenCodec, TokenError};
