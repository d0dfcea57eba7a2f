use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::broadcast::ScoreboardHub;
use crate::config::AppConfig;
use crate::grading::compiler::CompilerService;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub compiler: Arc<dyn CompilerService>,
    pub mailer: Arc<dyn Mailer>,
    pub scoreboard: ScoreboardHub,
}
