pub mod api_client;
pub mod export;
pub mod geocodio;
pub mod labeler;
