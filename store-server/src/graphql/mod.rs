//! GraphQL 端点
//!
//! 购物车与订单的查询 / 变更入口。与 REST 入口共用同一套仓储和结算编排器，
//! 两侧观察到完全一致的语义。认证在 HTTP 层完成，[`CurrentUser`] 随请求注入
//! resolver 上下文。

pub mod types;

use async_graphql::{Context, EmptySubscription, Object, Result, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{Extension, Router, routing::post};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{CartRepository, OrderRepository, ProductRepository, UserRepository};
use self::types::{CheckoutPayload, GqlCart, GqlCheckoutItem, GqlOrder};

/// GraphQL schema over the shared server state
pub type StoreSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The calling user's cart (empty when no lines exist)
    async fn cart(&self, ctx: &Context<'_>) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;

        let lines = CartRepository::new(state.db.clone()).get(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, lines))
    }

    /// The calling user's orders, newest first
    async fn my_orders(&self, ctx: &Context<'_>) -> Result<Vec<GqlOrder>> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;

        let orders = OrderRepository::new(state.db.clone())
            .find_by_user(&user_rid)
            .await?;
        Ok(orders.into_iter().map(GqlOrder::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Add a product to the cart (merges into an existing line)
    async fn add_to_cart(
        &self,
        ctx: &Context<'_>,
        product_id: async_graphql::ID,
        quantity: i64,
    ) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;

        let products = ProductRepository::new(state.db.clone());
        let product = products
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| async_graphql::Error::new(format!("Product {} not found", *product_id)))?;
        let product_rid = product
            .id
            .ok_or_else(|| async_graphql::Error::new("Product record has no id"))?;

        let carts = CartRepository::new(state.db.clone());
        carts.add_item(&user_rid, &product_rid, quantity).await?;

        let lines = carts.get(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, lines))
    }

    /// Overwrite a line's quantity; <= 0 removes the line
    async fn update_cart_item(
        &self,
        ctx: &Context<'_>,
        product_id: async_graphql::ID,
        quantity: i64,
    ) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;
        let product_rid = ProductRepository::record_id(&product_id)?;

        let carts = CartRepository::new(state.db.clone());
        carts.set_quantity(&user_rid, &product_rid, quantity).await?;

        let lines = carts.get(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, lines))
    }

    /// Remove a product's line from the cart
    async fn remove_from_cart(
        &self,
        ctx: &Context<'_>,
        product_id: async_graphql::ID,
    ) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;
        let product_rid = ProductRepository::record_id(&product_id)?;

        let carts = CartRepository::new(state.db.clone());
        carts.remove_item(&user_rid, &product_rid).await?;

        let lines = carts.get(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, lines))
    }

    /// Flip the selected flag on the given products' lines
    async fn toggle_select_items(
        &self,
        ctx: &Context<'_>,
        product_ids: Vec<async_graphql::ID>,
        selected: bool,
    ) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;

        let mut product_rids = Vec::with_capacity(product_ids.len());
        for id in &product_ids {
            product_rids.push(ProductRepository::record_id(id)?);
        }

        let carts = CartRepository::new(state.db.clone());
        carts.set_selected(&user_rid, &product_rids, selected).await?;

        let lines = carts.get(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, lines))
    }

    /// Empty the cart
    async fn clear_cart(&self, ctx: &Context<'_>) -> Result<GqlCart> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;
        let user_rid = UserRepository::record_id(&user.id)?;

        CartRepository::new(state.db.clone()).clear(&user_rid).await?;
        Ok(GqlCart::from_lines(&user.id, Vec::new()))
    }

    /// Checkout: explicit items, or the selected cart lines when absent.
    /// Business failures land in the payload's code/message, not in the
    /// GraphQL error channel.
    async fn checkout(
        &self,
        ctx: &Context<'_>,
        items: Option<Vec<GqlCheckoutItem>>,
    ) -> Result<CheckoutPayload> {
        let state = ctx.data::<ServerState>()?;
        let user = ctx.data::<CurrentUser>()?;

        let items = items.map(|list| list.into_iter().map(Into::into).collect());

        let service = state.checkout_service();
        let payload = match service.create_order(&user.id, items).await {
            Ok(order) => CheckoutPayload {
                code: "OK".to_string(),
                message: "Checkout accepted".to_string(),
                order: Some(order.into()),
            },
            Err(err) => CheckoutPayload {
                code: err.code().to_string(),
                message: err.to_string(),
                order: None,
            },
        };
        Ok(payload)
    }
}

/// Build the schema over the shared state
pub fn build_schema(state: &ServerState) -> StoreSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state.clone())
        .finish()
}

/// GraphQL 路由 (POST /graphql, 认证由 require_auth 中间件保证)
pub fn router(state: &ServerState) -> Router<ServerState> {
    let schema = build_schema(state);
    Router::new()
        .route("/graphql", post(graphql_handler))
        .layer(Extension(schema))
}

/// Execute a request with the authenticated user injected into resolver context
pub async fn graphql_handler(
    Extension(schema): Extension<StoreSchema>,
    user: CurrentUser,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner().data(user)).await.into()
}
