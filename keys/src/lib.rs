pub mod derivation;
pub mod error;
pub mod extended_key;
pub mod keypair;
pub mod nep2;
pub mod point;
pub mod signature;
pub mod wif;

pub use derivation::DerivationPath;
pub use error::KeyError;
pub use extended_key::{ExtendedPrivKey, ExtendedPubKey, HARDENED_OFFSET, Network};
pub use keypair::{ADDRESS_VERSION, KeyPair};
pub use nep2::ScryptParams;
pub use point::EcPoint;
pub use signature::EcdsaSignature;
