pub mod auth;
pub mod drive;
pub mod gmail;
pub mod gtasks;
