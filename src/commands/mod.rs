pub mod apply;
pub mod data;
pub mod destroy;
pub mod files;
pub mod import;
pub mod refresh;
pub mod schema;
pub mod validate;

pub use apply::ApplyCommand;
pub use data::DataCommand;
pub use destroy::DestroyCommand;
pub use import::ImportCommand;
pub use refresh::RefreshCommand;
pub use schema::SchemaCommand;
pub use validate::ValidateCommand;
