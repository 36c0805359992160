//! Catalog listing
//!
//! Filtering, fuzzy keyword search, sorting and pagination over the product
//! catalog. The category filter is pushed into the store; everything else
//! runs in process over the candidate set.

pub mod search;

pub use search::{Pagination, ProductPage, ProductQuery, filter_sort_paginate};
