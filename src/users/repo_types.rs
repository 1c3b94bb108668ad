use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String, // argon2 PHC string, never serialized
}

/// Fields required to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
}
