pub mod admin;
pub mod question;
pub mod submission;
pub mod submission_log;
pub mod team;
pub mod team_member;
pub mod test_case;
