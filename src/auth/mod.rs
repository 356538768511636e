mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{UserClaims, generate_token, process_token};
mod validate;
pub use validate::{is_valid_email, validate_password};
mod error;
pub use error::{CryptError, CryptResult};
