//! Storage strategies for UI-bound catalog state.
//!
//! Pages talk to a [`StateStore`] only, so the same fetch, mutate and refetch
//! flow works whether a page owns its values directly ([`LocalState`]) or
//! shares a normalized cache ([`NormalizedStore`]).

use std::collections::HashMap;

use catalog_core::domain::comment::{Comment, CommentId};
use catalog_core::domain::product::{Product, ProductId};

pub trait StateStore: Send + Sync {
    /// Replaces the listed products, keeping the given order.
    fn set_products(&mut self, products: Vec<Product>);

    fn products(&self) -> Vec<Product>;

    /// Makes `product` the one under view. Its embedded comments are not
    /// copied into the comment state; use [`StateStore::set_comments`].
    fn set_current(&mut self, product: Product);

    fn current(&self) -> Option<Product>;

    fn clear_current(&mut self);

    fn set_comments(&mut self, product_id: ProductId, comments: Vec<Comment>);

    fn comments(&self, product_id: ProductId) -> Vec<Comment>;

    fn push_comment(&mut self, comment: Comment);

    fn remove_comment(&mut self, product_id: ProductId, comment_id: CommentId);
}

/// Per-page owned values: a product list, the product under view and its
/// comment list.
#[derive(Debug, Default)]
pub struct LocalState {
    products: Vec<Product>,
    current: Option<Product>,
    comments: Vec<Comment>,
}

impl StateStore for LocalState {
    fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    fn products(&self) -> Vec<Product> {
        self.products.clone()
    }

    fn set_current(&mut self, product: Product) {
        self.current = Some(product);
    }

    fn current(&self) -> Option<Product> {
        self.current.clone()
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.comments.clear();
    }

    fn set_comments(&mut self, _product_id: ProductId, comments: Vec<Comment>) {
        self.comments = comments;
    }

    fn comments(&self, product_id: ProductId) -> Vec<Comment> {
        self.comments.iter().filter(|comment| comment.product_id == product_id).cloned().collect()
    }

    fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    fn remove_comment(&mut self, _product_id: ProductId, comment_id: CommentId) {
        self.comments.retain(|comment| comment.id != comment_id);
    }
}

/// Entities keyed by id with separate ordering lists. Products are stored
/// without their comments; comments are reattached on read.
#[derive(Debug, Default)]
pub struct NormalizedStore {
    products: HashMap<ProductId, Product>,
    product_order: Vec<ProductId>,
    current: Option<ProductId>,
    comments: HashMap<CommentId, Comment>,
    comments_by_product: HashMap<ProductId, Vec<CommentId>>,
}

impl NormalizedStore {
    fn upsert_product(&mut self, mut product: Product) -> (ProductId, Vec<Comment>) {
        let id = product.id;
        let comments = std::mem::take(&mut product.comments);
        self.products.insert(id, product);
        (id, comments)
    }

    fn assemble(&self, id: ProductId) -> Option<Product> {
        let mut product = self.products.get(&id)?.clone();
        product.comments = self.comments(id);
        Some(product)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

impl StateStore for NormalizedStore {
    fn set_products(&mut self, products: Vec<Product>) {
        let listed = products.iter().map(|product| product.id).collect::<Vec<_>>();
        let current = self.current;
        self.products.retain(|id, _| Some(*id) == current);
        self.product_order.clear();

        for product in products {
            let (id, comments) = self.upsert_product(product);
            self.set_comments(id, comments);
            self.product_order.push(id);
        }

        let mut known = listed;
        known.extend(current);
        self.comments.retain(|_, comment| known.contains(&comment.product_id));
        self.comments_by_product.retain(|id, _| known.contains(id));
    }

    fn products(&self) -> Vec<Product> {
        self.product_order.iter().filter_map(|id| self.assemble(*id)).collect()
    }

    fn set_current(&mut self, product: Product) {
        let (id, _) = self.upsert_product(product);
        self.current = Some(id);
    }

    fn current(&self) -> Option<Product> {
        self.current.and_then(|id| self.assemble(id))
    }

    fn clear_current(&mut self) {
        self.current = None;
    }

    fn set_comments(&mut self, product_id: ProductId, comments: Vec<Comment>) {
        if let Some(previous) = self.comments_by_product.remove(&product_id) {
            for id in previous {
                self.comments.remove(&id);
            }
        }

        let ids = comments.iter().map(|comment| comment.id).collect();
        for comment in comments {
            self.comments.insert(comment.id, comment);
        }
        self.comments_by_product.insert(product_id, ids);
    }

    fn comments(&self, product_id: ProductId) -> Vec<Comment> {
        self.comments_by_product
            .get(&product_id)
            .map(|ids| ids.iter().filter_map(|id| self.comments.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    fn push_comment(&mut self, comment: Comment) {
        self.comments_by_product.entry(comment.product_id).or_default().push(comment.id);
        self.comments.insert(comment.id, comment);
    }

    fn remove_comment(&mut self, product_id: ProductId, comment_id: CommentId) {
        self.comments.remove(&comment_id);
        if let Some(ids) = self.comments_by_product.get_mut(&product_id) {
            ids.retain(|id| *id != comment_id);
        }
    }
}
