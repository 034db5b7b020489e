pub mod directory;
pub mod resolver;
pub mod rules;

pub use directory::{doctor_para, especialidad_para};
pub use resolver::{Derivacion, DerivacionClinica, resolver, resolver_clinico};
pub use rules::{DerivationRule, default_rules, rules_desde_archivo};
