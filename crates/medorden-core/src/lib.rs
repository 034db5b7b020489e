pub mod error;
pub mod geo;
pub mod record;
pub mod space;

pub use error::{CoreError, ErrorCategory, Result};
pub use geo::GeoSnapshot;
pub use record::{
    CaseRecord, FormularioRm, GeneralesRecord, IaRecord, MetaRecord, Paciente, PreopRecord,
    TraumaRecord,
};
pub use space::Space;
