use backend::routes;
use backend::shared::config;
use backend::shared::data::db;
use backend::shared::meta::{registry, MetaRegistry};
use backend::system;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    let cfg = config::load_config()?;

    // Meta bindings are validated once, before any request is served
    let registry = MetaRegistry::wordpress(cfg.meta.strict_bindings)
        .map_err(|e| anyhow::anyhow!("invalid meta bindings: {e}"))?;
    registry::install(registry)?;

    let db_path = config::get_database_path(&cfg)?;
    db::initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure_routes(db::get_connection().clone()).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
