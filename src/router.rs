use axum::{Router, middleware::from_fn, routing::get};

use crate::{AppState, error::AppError, middleware::log_requests, routes};

// 用户相关的路由
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(routes::user::list_users)
                .post(routes::user::create_users)
                .put(routes::user::update_users)
                .delete(routes::user::delete_users),
        )
        .route("/users/{id}", get(routes::user::get_user))
}

async fn not_found() -> AppError {
    AppError::RouteNotFound
}

// 创建主路由，访问日志覆盖所有请求（包括未匹配的路径）
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(user_routes())
        .fallback(not_found)
        .layer(from_fn(log_requests))
        .with_state(state)
}
