pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{compare_names, sort_products, SortOrder};
pub use domain::comment::{Comment, CommentId, CommentInput, NewComment};
pub use domain::product::{
    NewProduct, Product, ProductChanges, ProductId, ProductInput, Size, SizeInput,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
