use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use loft_api::middleware::require_auth;
use loft_api::{admin, auth, channels, dms, messages, standups, users, workspace, AppState};
use loft_store::persist::JsonFileBackend;
use loft_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loft=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let data_path = std::env::var("LOFT_DATA_PATH").unwrap_or_else(|_| "loft.json".into());
    let host = std::env::var("LOFT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LOFT_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Shared state
    let backend = JsonFileBackend::new(PathBuf::from(&data_path));
    let store: AppState = Arc::new(Store::open(Box::new(backend))?);

    // Timer worker: delayed sends and standup flushes
    tokio::spawn(loft_store::scheduler::run(store.clone()));

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(store.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list))
        .route("/users/{user_id}", get(users::profile))
        .route("/users/me/name", put(users::set_name))
        .route("/users/me/email", put(users::set_email))
        .route("/users/me/handle", put(users::set_handle))
        .route("/users/me/stats", get(users::my_stats))
        .route("/channels", post(channels::create).get(channels::list))
        .route("/channels/all", get(channels::list_all))
        .route("/channels/{channel_id}", get(channels::details))
        .route("/channels/{channel_id}/join", post(channels::join))
        .route("/channels/{channel_id}/invite", post(channels::invite))
        .route("/channels/{channel_id}/leave", post(channels::leave))
        .route("/channels/{channel_id}/owners", post(channels::add_owner))
        .route(
            "/channels/{channel_id}/owners/{user_id}",
            delete(channels::remove_owner),
        )
        .route(
            "/channels/{channel_id}/messages",
            get(channels::messages).post(channels::send),
        )
        .route(
            "/channels/{channel_id}/messages/later",
            post(channels::send_later),
        )
        .route(
            "/channels/{channel_id}/standup",
            post(standups::start).get(standups::active),
        )
        .route("/channels/{channel_id}/standup/send", post(standups::send))
        .route("/dms", post(dms::create).get(dms::list))
        .route("/dms/{dm_id}", get(dms::details).delete(dms::remove))
        .route("/dms/{dm_id}/leave", post(dms::leave))
        .route("/dms/{dm_id}/messages", get(dms::messages).post(dms::send))
        .route("/dms/{dm_id}/messages/later", post(dms::send_later))
        .route(
            "/messages/{message_id}",
            put(messages::edit).delete(messages::remove),
        )
        .route("/messages/share", post(messages::share))
        .route("/messages/{message_id}/reactions", post(messages::react))
        .route(
            "/messages/{message_id}/reactions/{react_id}",
            delete(messages::unreact),
        )
        .route("/messages/{message_id}/pin", post(messages::pin))
        .route("/messages/{message_id}/unpin", post(messages::unpin))
        .route("/notifications", get(workspace::notifications))
        .route("/search", get(workspace::search))
        .route("/workspace/stats", get(workspace::stats))
        .route("/admin/users/{user_id}", delete(admin::remove_user))
        .route(
            "/admin/users/{user_id}/permission",
            put(admin::set_permission),
        )
        .layer(middleware::from_fn_with_state(store.clone(), require_auth))
        .with_state(store);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Loft server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
