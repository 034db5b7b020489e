use medorden_core::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One ordered derivation rule. Order is priority: region-specific rules are
/// listed before country-wide ones, and a trailing `pais = "*"` rule
/// guarantees every scan terminates with a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRule {
    pub id: String,
    pub pais: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_contiene: Option<String>,
    pub sede: String,
    pub mensaje: String,
    pub accion: String,
}

impl DerivationRule {
    pub fn es_comodin(&self) -> bool {
        self.pais == "*"
    }
}

#[derive(Debug, Deserialize)]
struct Catalogo {
    reglas: Vec<DerivationRule>,
}

/// Built-in derivation catalog used when no catalog file is configured.
pub fn default_rules() -> Vec<DerivationRule> {
    vec![
        DerivationRule {
            id: "maule".into(),
            pais: "CL".into(),
            region_contiene: Some("maule".into()),
            sede: "Clínica del Maule".into(),
            mensaje: "Atención presencial en Talca".into(),
            accion: "agendar".into(),
        },
        DerivationRule {
            id: "metropolitana".into(),
            pais: "CL".into(),
            region_contiene: Some("metropolitana".into()),
            sede: "Centro Médico Santiago".into(),
            mensaje: "Atención presencial en Providencia".into(),
            accion: "agendar".into(),
        },
        DerivationRule {
            id: "chile".into(),
            pais: "CL".into(),
            region_contiene: None,
            sede: "Centro Médico Santiago".into(),
            mensaje: "Derivación nacional con traslado coordinado".into(),
            accion: "agendar".into(),
        },
        DerivationRule {
            id: "internacional".into(),
            pais: "*".into(),
            region_contiene: None,
            sede: "Telemedicina".into(),
            mensaje: "Atención por telemedicina".into(),
            accion: "contactar".into(),
        },
    ]
}

/// Load a derivation catalog from a TOML file.
///
/// The file must declare `[[reglas]]` entries in priority order. A catalog
/// without a trailing wildcard rule is accepted but logged, since resolution
/// then depends on the sentinel fallback.
pub fn rules_desde_archivo(path: impl AsRef<Path>) -> Result<Vec<DerivationRule>> {
    let path = path.as_ref();
    let contenido = std::fs::read_to_string(path).map_err(|e| {
        CoreError::configuration(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    let catalogo: Catalogo = toml::from_str(&contenido).map_err(|e| {
        CoreError::configuration(format!("invalid catalog {}: {e}", path.display()))
    })?;
    if catalogo.reglas.is_empty() {
        return Err(CoreError::configuration(format!(
            "catalog {} declares no rules",
            path.display()
        )));
    }
    if !catalogo.reglas.iter().any(|r| r.es_comodin()) {
        tracing::warn!(
            path = %path.display(),
            "derivation catalog has no wildcard rule; unmatched requests fall back to the sentinel"
        );
    }
    Ok(catalogo.reglas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_rules_end_in_wildcard() {
        let rules = default_rules();
        assert!(rules.last().unwrap().es_comodin());
        // Specific before general, by convention.
        assert!(rules[0].region_contiene.is_some());
        assert!(rules[rules.len() - 2].region_contiene.is_none());
    }

    #[test]
    fn test_catalog_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[reglas]]
id = "maule"
pais = "CL"
region_contiene = "maule"
sede = "Clínica del Maule"
mensaje = "Atención presencial"
accion = "agendar"

[[reglas]]
id = "resto"
pais = "*"
sede = "Telemedicina"
mensaje = "Atención remota"
accion = "contactar"
"#
        )
        .unwrap();

        let rules = rules_desde_archivo(file.path()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "maule");
        assert_eq!(rules[0].region_contiene.as_deref(), Some("maule"));
        assert!(rules[1].es_comodin());
    }

    #[test]
    fn test_missing_catalog_is_configuration_error() {
        let err = rules_desde_archivo("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "reglas = []").unwrap();
        let err = rules_desde_archivo(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
