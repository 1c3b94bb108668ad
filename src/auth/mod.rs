pub mod extractors;
pub mod password;

pub use extractors::CurrentUser;
