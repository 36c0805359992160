//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录 / 账号接口
//! - [`products`] - 商品管理接口 (含收藏 / 评论 / 统计)
//! - [`cart`] - 购物车接口
//! - [`orders`] - 结算与订单查询接口

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok};
