//! Product listing pipeline: filter, fuzzy match, sort, paginate.
//!
//! Keyword search is delegated to a third-party fuzzy matcher scoring over
//! name/description/category; matches are kept in relevance order until the
//! sort step runs (the default sort is `newest`).

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::models::Product;

const DEFAULT_PAGE_LIMIT: usize = 10;
const MAX_PAGE_LIMIT: usize = 100;

/// Listing query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i64>,
    pub keyword: Option<String>,
    /// price_asc | price_desc | name | newest (default)
    pub sort: Option<String>,
}

/// Pagination envelope
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub pagination: Pagination,
}

/// Run the in-process part of the listing pipeline over `products`
/// (already narrowed by category at the store).
pub fn filter_sort_paginate(products: Vec<Product>, query: &ProductQuery) -> ProductPage {
    let mut products = apply_filters(products, query);

    if let Some(keyword) = query.keyword.as_deref() {
        let keyword = keyword.trim();
        if !keyword.is_empty() {
            products = fuzzy_filter(products, keyword);
        }
    }

    apply_sort(&mut products, query.sort.as_deref());

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let page = query.page.unwrap_or(1).max(1);
    let total_items = products.len();
    let total_pages = total_items.div_ceil(limit);
    let skip = (page - 1) * limit;

    let data: Vec<Product> = products.into_iter().skip(skip).take(limit).collect();

    ProductPage {
        data,
        pagination: Pagination {
            current_page: page,
            limit,
            total_items,
            total_pages,
        },
    }
}

fn apply_filters(products: Vec<Product>, query: &ProductQuery) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
        .filter(|p| query.min_stock.is_none_or(|min| p.stock >= min))
        .collect()
}

/// Keep fuzzy matches, best score first
fn fuzzy_filter(products: Vec<Product>, keyword: &str) -> Vec<Product> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, Product)> = products
        .into_iter()
        .filter_map(|p| {
            let haystack = format!("{} {} {}", p.name, p.description, p.category);
            matcher
                .fuzzy_match(&haystack, keyword)
                .map(|score| (score, p))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p).collect()
}

fn apply_sort(products: &mut [Product], sort: Option<&str>) {
    match sort {
        Some("price_asc") => products.sort_by(|a, b| a.price.cmp(&b.price)),
        Some("price_desc") => products.sort_by(|a, b| b.price.cmp(&a.price)),
        Some("name") => products.sort_by(|a, b| a.name.cmp(&b.name)),
        // "newest" and anything unrecognized
        _ => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}
