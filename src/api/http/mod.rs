pub mod axum;
pub mod rest;
