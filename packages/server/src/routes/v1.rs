use axum::routing::get;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/questions", question_routes())
        .nest("/submissions", submission_routes())
        .nest("/leaderboard", leaderboard_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::request_otp))
        .routes(routes!(handlers::auth::verify_otp))
        .routes(routes!(handlers::auth::me))
}

fn question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::question::list_questions))
        .routes(routes!(handlers::question::get_question))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submission::submit_code))
        .routes(routes!(handlers::submission::get_submission))
}

fn leaderboard_routes() -> OpenApiRouter<AppState> {
    // The WebSocket endpoint is registered without an OpenAPI entry; the
    // upgrade handshake doesn't document usefully.
    OpenApiRouter::new()
        .routes(routes!(handlers::leaderboard::get_leaderboard))
        .route("/ws", get(handlers::leaderboard::leaderboard_ws))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", admin_auth_routes())
        .nest("/teams", admin_team_routes())
        .nest("/questions", admin_question_routes())
        .nest("/round", admin_round_routes())
}

fn admin_auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::login))
        .routes(routes!(handlers::admin::register))
}

fn admin_team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::admin::list_teams,
            handlers::admin::create_team
        ))
        .routes(routes!(handlers::admin::remove_team))
}

fn admin_question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::question::list_all_questions,
            handlers::question::create_question
        ))
        .routes(routes!(handlers::question::update_question))
        .routes(routes!(handlers::question::check_question))
}

fn admin_round_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::admin::update_round))
}
