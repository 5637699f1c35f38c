// Blog CMS server - page tree, blog posts and editor API over HTTP

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_cms::{
    app_state::AppState,
    blog_interface::create_blog_router,
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    let blog_router = create_blog_router(app_state.blog_interface.clone());

    // Build main application router
    let app = Router::new()
        .nest("/api/v1/blog", blog_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr = config.server_address();
    info!("Blog CMS server starting on http://{}", addr);
    info!("  GET    /api/v1/blog/pages/{{*path}}          - Render a live page");
    info!("  GET    /api/v1/blog/search?q=               - Search live pages");
    info!("  POST   /api/v1/blog/admin/pages             - Create page");
    info!("  POST   /api/v1/blog/admin/pages/{{id}}/publish - Publish page");
    info!("  GET    /api/v1/blog/admin/panels/{{entity}}  - Editor panels");

    let listener = TcpListener::bind(addr.as_str()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
