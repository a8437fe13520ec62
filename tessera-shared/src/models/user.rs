use crate::pii::Masked;

/// An account that can log in. Regular users reserve with their own email;
/// admins additionally manage events.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: Masked<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Masked<String>,
    pub is_admin: bool,
}
