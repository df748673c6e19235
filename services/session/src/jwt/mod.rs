//! Token claims and the signing codec.

pub mod claims;
pub mod codec;

pub use claims::{ClaimSet, TokenType};
pub use codec::TokenCodec;
