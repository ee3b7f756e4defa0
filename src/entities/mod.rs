pub mod category;
pub mod file;
pub mod preference;

pub use category::Entity as Category;
pub use file::Entity as File;
pub use preference::Entity as Preference;
