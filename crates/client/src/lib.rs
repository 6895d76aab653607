//! Client side of the catalog: a typed HTTP API and the page state machines
//! that keep UI-bound state in sync with the server.

pub mod api;
pub mod pages;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{CatalogApi, ClientError, HttpCatalogApi};
pub use pages::{LoadStatus, Navigation, ProductListPage, ProductViewPage};
pub use state::{LocalState, NormalizedStore, StateStore};
