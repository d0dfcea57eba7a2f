pub mod admin;
pub mod auth;
pub mod leaderboard;
pub mod question;
pub mod submission;
