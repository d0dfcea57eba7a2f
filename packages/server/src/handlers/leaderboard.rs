use axum::Json;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument};

use crate::error::{AppError, ErrorBody};
use crate::grading::scoreboard;
use crate::models::leaderboard::{LeaderboardQuery, StandingsResponse};
use crate::state::AppState;

/// Current standings.
#[utoipa::path(
    get,
    path = "/",
    tag = "Leaderboard",
    operation_id = "getLeaderboard",
    summary = "Current standings",
    description = "Teams sorted by score, best first. The same payload is pushed over the WebSocket at `/leaderboard/ws` whenever a score changes.",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Standings", body = StandingsResponse),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(year = query.year))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<StandingsResponse>, AppError> {
    let standings = scoreboard::fetch_standings(&state.db, query.year).await?;
    Ok(Json(standings))
}

/// Live standings over WebSocket: a snapshot on connect, then a full
/// standings payload after every score change.
pub async fn leaderboard_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Snapshot first so a quiet contest still renders a board.
    match scoreboard::fetch_standings(&state.db, None).await {
        Ok(standings) => {
            if let Ok(json) = serde_json::to_string(&standings)
                && socket.send(Message::Text(json.into())).await.is_err()
            {
                return;
            }
        }
        Err(e) => {
            debug!("Failed to fetch standings snapshot for new socket: {:?}", e);
        }
    }

    let mut updates = state.scoreboard.subscribe();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(json) => {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                // Missed some updates; the next one carries full standings
                // anyway, so just keep going.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ignore client chatter and pings
                Some(Err(_)) => break,
            },
        }
    }
}
