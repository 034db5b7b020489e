pub mod documento;
mod pdf;

pub use documento::{DocumentoClinico, por_modulo};
