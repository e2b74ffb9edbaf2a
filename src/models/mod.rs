pub mod department;
pub mod page;
pub mod profile;
pub mod report;
pub mod user;

pub use department::*;
pub use page::*;
pub use profile::*;
pub use report::*;
pub use user::*;
