//! Servidor Axum com WebSocket para reescrita de etiquetas em tempo real

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use retag_core::{
    InputFormat, PipelineEvent, RetagConfig, RetagPipeline, RewriteStep, RuleSummary,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Estado compartilhado da aplicação
struct AppState {
    /// Um pipeline por formato; as regras são as mesmas e somente leitura.
    lines: RetagPipeline,
    conll: RetagPipeline,
}

impl AppState {
    fn pipeline(&self, format: InputFormat) -> &RetagPipeline {
        match format {
            InputFormat::Lines => &self.lines,
            InputFormat::Conll => &self.conll,
        }
    }
}

#[derive(Deserialize)]
struct RewriteRequest {
    text: String,
    #[serde(default)]
    format: Option<InputFormat>,
    #[serde(default)]
    trace: bool,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
    #[serde(default)]
    format: Option<InputFormat>,
}

#[derive(Serialize)]
struct RewriteResponse {
    output: String,
    lines: usize,
    changed_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<RewriteStep>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let state = match build_state() {
        Ok(state) => Arc::new(state),
        Err(err) => {
            error!("Falha ao carregar as tabelas: {err}");
            std::process::exit(1);
        }
    };

    let addr = std::env::var("RETAG_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Não foi possível escutar em {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("🚀 Servidor retag iniciado em http://{addr}");

    if let Err(err) = axum::serve(listener, app(state)).await {
        error!("Servidor encerrado com erro: {err}");
    }
}

/// Carrega a configuração do ambiente e compila as regras dos dois formatos.
///
/// A tabela NER embutida segue a regra da configuração para cada formato.
fn build_state() -> retag_core::Result<AppState> {
    let config = RetagConfig::from_env()?;
    let lines = RetagPipeline::from_config(&RetagConfig {
        format: InputFormat::Lines,
        ..config.clone()
    })?;
    let conll = RetagPipeline::from_config(&RetagConfig {
        format: InputFormat::Conll,
        ..config
    })?;
    Ok(AppState { lines, conll })
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/rules", get(rules_handler))
        .route("/rewrite", post(rewrite_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Regras compiladas (formato de linhas)
async fn rules_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RuleSummary>> {
    Json(state.lines.rules().summaries())
}

/// Reescrita via HTTP POST (sem streaming)
async fn rewrite_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RewriteRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let pipeline = state.pipeline(req.format.unwrap_or_default());
    let result = if req.trace {
        pipeline
            .rewrite_text_traced(&req.text)
            .map(|(rewritten, steps)| (rewritten, Some(steps)))
    } else {
        pipeline.rewrite_text(&req.text).map(|rewritten| (rewritten, None))
    };
    let (rewritten, steps) = match result {
        Ok(result) => result,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": err.to_string()})),
            )
                .into_response();
        }
    };

    Json(RewriteResponse {
        output: rewritten.output,
        lines: rewritten.lines,
        changed_lines: rewritten.changed_lines,
        steps,
    })
    .into_response()
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // JSON {text, format}; senão o texto puro no formato de linhas
                let (text, format) = match serde_json::from_str::<WsRequest>(&text) {
                    Ok(req) => (req.text, req.format.unwrap_or_default()),
                    Err(_) => (text.to_string(), InputFormat::Lines),
                };

                if text.trim().is_empty() {
                    continue;
                }

                info!("Reescrevendo via WebSocket [{:?}]: {} chars", format, text.len());

                // O pipeline é síncrono: roda fora do runtime
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    state.pipeline(format).rewrite_streaming(&text, tx);
                });
                if handle.await.is_err() {
                    error!("Tarefa de reescrita abortada");
                    return;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use retag_core::CorrespondenceTable;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let table = CorrespondenceTable::parse("NN NOUN\nNNS NOUN\nNNP NOUN\nJJ ADJ\nDT DET\n").unwrap();
        let mut with_ner = table.clone();
        with_ner.merge(&CorrespondenceTable::conll_ner()).unwrap();
        Arc::new(AppState {
            lines: RetagPipeline::from_table(&table).unwrap(),
            conll: RetagPipeline::from_table(&with_ner)
                .unwrap()
                .with_format(InputFormat::Conll),
        })
    }

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app(test_state())
            .oneshot(
                Request::post("/rewrite")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rewrite_lines() {
        let (status, json) = post_json(serde_json::json!({"text": "DT\tJJ\tO\n"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["output"], "DET\tADJ\tO\n");
        assert_eq!(json["changed_lines"], 1);
        assert!(json.get("steps").is_none());
    }

    #[tokio::test]
    async fn test_rewrite_conll_with_ner() {
        let (status, json) = post_json(serde_json::json!({
            "text": "Acme NNP I-ORGANIZATION\n",
            "format": "conll"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["output"], "Acme\tNOUN\tI-ORG\n");
    }

    #[tokio::test]
    async fn test_rewrite_trace() {
        let (_, json) = post_json(serde_json::json!({"text": "DT JJ", "trace": true})).await;
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["universal"], "ADJ");
    }

    #[tokio::test]
    async fn test_rewrite_trace_conll() {
        let (status, json) = post_json(serde_json::json!({
            "text": "Acme NNP I-ORGANIZATION\n",
            "format": "conll",
            "trace": true
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["before"], "NNP");
        assert_eq!(steps[1]["after"], "I-ORG");
    }

    #[tokio::test]
    async fn test_empty_text_is_bad_request() {
        let (status, _) = post_json(serde_json::json!({"text": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_record_is_bad_request() {
        let (status, json) =
            post_json(serde_json::json!({"text": "sozinho\n", "format": "conll"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("linha 1"));
    }

    #[tokio::test]
    async fn test_rules_endpoint() {
        let response = app(test_state())
            .oneshot(Request::get("/rules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let rules: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rules[0]["universal"], "NOUN");
        assert_eq!(rules[0]["sources"][0], "NNS");
    }
}
