//! External lookups the order engine depends on
//!
//! Each concern sits behind a trait so tests can substitute fixed data.
//! Production wiring uses the JSON-file implementations loaded at startup.

pub mod catalog;
pub mod directory;
pub mod notify;

pub use catalog::{Catalog, CatalogItem, JsonCatalog};
pub use directory::{Employee, EmployeeDirectory, JsonEmployeeDirectory};
pub use notify::{LogNotifier, Notifier, Notify};
