pub mod activity;
pub mod auth;
pub mod chat;
pub mod coach;
pub mod dashboard;
pub mod giveup;
pub mod history;
