use crate::auth::{require_admin, require_auth, require_management};
use crate::handlers::{
    auth::{login, logout, set_password},
    budgets::{budget_status, list_budgets, lock_budget, monitoring, set_budget},
    categories::{create_category, get_category, list_categories, toggle_category, update_category},
    expenses::{create_expense, delete_expense, expense_insights, list_expenses},
    health::health_check,
    pages,
    users::{create_user, get_user, list_users, update_role},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
///
/// Routes are grouped by the access they require. Groups are merged rather
/// than nested so the access-control middleware sees full request paths.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/set-password", post(set_password))
        .route("/login", get(pages::login_page))
        .route("/set-password", get(pages::set_password_page));

    // Any logged in user
    let authenticated = Router::new()
        .route("/api/logout", post(logout))
        .route("/api/expenses", get(list_expenses).post(create_expense))
        .route("/api/expenses/insights", get(expense_insights))
        .route("/api/expenses/:id", delete(delete_expense))
        .route("/", get(pages::dashboard_page))
        .route("/expenses", get(pages::expenses_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Management and admin
    let management = Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).patch(toggle_category),
        )
        .route("/api/budgets", get(list_budgets).post(set_budget))
        .route("/api/budgets/status", get(budget_status))
        .route("/api/budgets/:id/lock", post(lock_budget))
        .route("/api/monitoring", get(monitoring))
        .route("/categories", get(pages::categories_page))
        .route("/budgets", get(pages::budgets_page))
        .route("/monitoring", get(pages::monitoring_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_management,
        ));

    // Admin only
    let admin = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/create", post(create_user))
        .route("/api/users/update-role", patch(update_role))
        .route("/api/users/:id", get(get_user))
        .route("/users", get(pages::users_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(management)
        .merge(admin)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
