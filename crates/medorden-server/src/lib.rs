pub mod config;
pub mod correo;
pub mod geoip;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use observability::{init_tracing, shutdown_tracing};
pub use server::{MedordenServer, ServerBuilder, build_app};
pub use state::AppState;
