//! Use-case services composed over the API client.

pub mod history;
