//! `stockscan-security` — API key encryption and storage.
//!
//! AES-256-CBC with a per-operation random IV, wrapped in the wire
//! format existing clients already store, plus the encrypted per-user
//! key file the settings endpoints read and write.

pub mod crypto;
pub mod keys;

pub use crypto::{decrypt, encrypt, generate_key, parse_key};
pub use keys::{is_valid_anthropic_key, is_valid_openai_key, ApiKeyStore, KeyStatus, UserKeys};
