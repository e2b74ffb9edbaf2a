pub mod department;
pub mod profile;
pub mod user;
