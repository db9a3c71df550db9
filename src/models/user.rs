/// A registered account as held by the credential store.
///
/// Users are created on registration and never mutated or deleted afterwards.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    /// bcrypt hash (salt and cost embedded); never the plaintext password.
    pub password_hash: String,
}
