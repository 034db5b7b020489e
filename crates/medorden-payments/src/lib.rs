pub mod gate;
pub mod provider;

pub use gate::{Montos, PagoIniciado, PaymentGate};
pub use provider::ProviderClient;
