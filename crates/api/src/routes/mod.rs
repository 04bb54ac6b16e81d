//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod batches;
pub mod floats;
pub mod gl;
pub mod health;
pub mod reports;
pub mod transactions;


/// Creates the `/api` router: public health plus everything behind the JWT check.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(floats::routes())
        .merge(transactions::routes())
        .merge(batches::routes())
        .merge(gl::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
