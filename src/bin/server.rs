use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use maze_chase::config::RoundConfig;
use maze_chase::constants::TICK_MS;
use maze_chase::engine::GameEngine;
use maze_chase::server_protocol::{
    error_message, parse_client_message, pong_message, state_message, welcome_message,
    ParsedClientMessage,
};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One round per websocket connection; the socket is the renderer.
type SharedSession = Arc<Mutex<GameEngine>>;

#[derive(Clone)]
struct AppState {
    config: RoundConfig,
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let config = RoundConfig::from_env();
    log_line(&format!(
        "round config: lives={} frightened_ms={} ready_ms={}",
        config.starting_lives, config.frightened_duration_ms, config.ready_delay_ms
    ));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(AppState { config });

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        log_line(&format!(
            "static file root: {}",
            static_dir.to_string_lossy()
        ));
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found. set STATIC_DIR to serve a renderer.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("[server] failed to bind {bind_addr}: {error}");
            std::process::exit(1);
        }
    };

    log_line(&format!("listening on :{port}"));
    if let Err(error) = axum::serve(listener, app).await {
        eprintln!("[server] runtime failed: {error}");
        std::process::exit(1);
    }
}

fn log_line(message: &str) {
    println!("[server] {} {message}", Utc::now().to_rfc3339());
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    [PathBuf::from("dist/client"), PathBuf::from("public")]
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state.config, socket))
}

async fn handle_socket(config: RoundConfig, socket: WebSocket) {
    let session_id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let seed = rand::random::<u32>();
    log_line(&format!("session {session_id} opened (seed {seed})"));

    let engine = GameEngine::new(config.clone(), seed);
    let welcome = welcome_message(&config, &engine.grid.to_view());
    let session: SharedSession = Arc::new(Mutex::new(engine));
    let (tx, mut rx) = mpsc::channel::<String>(256);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    send(&tx, &welcome);
    let ticker = start_tick_loop(session.clone(), tx.clone());

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };
        match message {
            Message::Text(raw) => handle_client_message(&session, &tx, raw.as_str()).await,
            Message::Binary(raw) => match std::str::from_utf8(&raw) {
                Ok(text) => handle_client_message(&session, &tx, text).await,
                Err(_) => send(&tx, &error_message("invalid utf8 message")),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    ticker.abort();
    drop(tx);
    let _ = writer.await;
    let engine = session.lock().await;
    log_line(&format!(
        "session {session_id} closed (phase {:?}, score {})",
        engine.phase(),
        engine.score()
    ));
}

async fn handle_client_message(session: &SharedSession, tx: &mpsc::Sender<String>, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send(tx, &error_message("invalid message"));
        return;
    };

    let mut engine = session.lock().await;
    match message {
        ParsedClientMessage::Input { dir } => engine.request_direction(dir),
        ParsedClientMessage::Begin => {
            if !engine.begin() {
                send(tx, &error_message("round already started"));
            }
        }
        ParsedClientMessage::Restart => {
            if !engine.restart() {
                send(tx, &error_message("round is not over"));
            }
        }
        ParsedClientMessage::Ping { t } => send(tx, &pong_message(t)),
    }
}

fn start_tick_loop(
    session: SharedSession,
    tx: mpsc::Sender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        let dt = TICK_MS as f32 / 1000.0;
        loop {
            interval.tick().await;
            let snapshot = {
                let mut engine = session.lock().await;
                engine.tick(dt);
                engine.build_snapshot(true)
            };
            if tx.is_closed() {
                break;
            }
            send(&tx, &state_message(&snapshot));
        }
    })
}

/// Drops the message when the writer is backed up; the next state frame
/// supersedes it anyway.
fn send(tx: &mpsc::Sender<String>, message: &Value) {
    if let Ok(payload) = serde_json::to_string(message) {
        let _ = tx.try_send(payload);
    }
}
