pub mod base58;
pub mod hash;
pub mod hmac;
pub mod script;
