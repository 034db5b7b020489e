use crate::directory::{doctor_para, especialidad_para};
use crate::rules::DerivationRule;
use medorden_core::GeoSnapshot;
use serde::Serialize;

/// Result of resolving geography against the derivation catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivacion {
    pub id: String,
    pub sede: String,
    pub mensaje: String,
    pub accion: String,
}

impl Derivacion {
    /// Well-formed sentinel for the unreachable no-match path.
    fn sin_derivacion() -> Self {
        Self {
            id: "sin-derivacion".into(),
            sede: String::new(),
            mensaje: "No se encontró derivación para la ubicación".into(),
            accion: "contactar".into(),
        }
    }
}

/// Site derivation plus the clinical routing layered on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivacionClinica {
    pub derivacion: Derivacion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub especialidad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    pub nota: String,
}

fn regla_coincide(regla: &DerivationRule, geo: &GeoSnapshot) -> bool {
    let pais_ok = regla.es_comodin() || geo.pais.as_deref() == Some(regla.pais.as_str());
    if !pais_ok {
        return false;
    }
    match &regla.region_contiene {
        None => true,
        Some(fragmento) => geo
            .region
            .as_deref()
            .map(|region| region.to_lowercase().contains(&fragmento.to_lowercase()))
            .unwrap_or(false),
    }
}

/// Resolve a geo snapshot against the ordered rule list. First match wins;
/// the engine itself enforces no specificity ordering. Never fails: without
/// a match (a catalog missing its wildcard) the sentinel result is returned.
pub fn resolver(reglas: &[DerivationRule], geo: &GeoSnapshot) -> Derivacion {
    for regla in reglas {
        if regla_coincide(regla, geo) {
            return Derivacion {
                id: regla.id.clone(),
                sede: regla.sede.clone(),
                mensaje: regla.mensaje.clone(),
                accion: regla.accion.clone(),
            };
        }
    }
    tracing::warn!(?geo, "no derivation rule matched; returning sentinel");
    Derivacion::sin_derivacion()
}

/// Clinically enriched resolution: site from geography, specialty from the
/// pain region, treating doctor from the site directory, and a composed
/// human-readable note.
pub fn resolver_clinico(
    reglas: &[DerivationRule],
    geo: &GeoSnapshot,
    zona: &str,
    lado: Option<&str>,
) -> DerivacionClinica {
    let derivacion = resolver(reglas, geo);
    let especialidad = especialidad_para(zona);
    let doctor = especialidad.and_then(|esp| doctor_para(&derivacion.sede, esp));

    let zona_normalizada = zona.trim().to_lowercase();
    let mut nota = match lado.map(str::trim).filter(|l| !l.is_empty()) {
        Some(lado) => format!(
            "Derivado a {}: {} {}.",
            derivacion.sede, zona_normalizada, lado
        ),
        None => format!("Derivado a {}: {}.", derivacion.sede, zona_normalizada),
    };
    if let Some(doctor) = doctor {
        nota.push_str(&format!(" Médico tratante: {doctor}."));
    }

    DerivacionClinica {
        derivacion,
        especialidad: especialidad.map(str::to_string),
        doctor: doctor.map(str::to_string),
        nota,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_rules;

    fn regla(id: &str, pais: &str, region: Option<&str>, sede: &str) -> DerivationRule {
        DerivationRule {
            id: id.into(),
            pais: pais.into(),
            region_contiene: region.map(Into::into),
            sede: sede.into(),
            mensaje: format!("mensaje {id}"),
            accion: "agendar".into(),
        }
    }

    #[test]
    fn test_first_match_wins_over_general_rules() {
        let reglas = vec![
            regla("maule", "CL", Some("maule"), "Clínica del Maule"),
            regla("chile", "CL", None, "Centro Médico Santiago"),
            regla("fallback", "*", None, "Telemedicina"),
        ];
        let geo = GeoSnapshot::nuevo("CL", "Región del Maule");
        let d = resolver(&reglas, &geo);
        assert_eq!(d.id, "maule");
        assert_eq!(d.sede, "Clínica del Maule");
    }

    #[test]
    fn test_country_rule_when_region_does_not_match() {
        let reglas = vec![
            regla("maule", "CL", Some("maule"), "Clínica del Maule"),
            regla("chile", "CL", None, "Centro Médico Santiago"),
            regla("fallback", "*", None, "Telemedicina"),
        ];
        let geo = GeoSnapshot::nuevo("CL", "Región de Valparaíso");
        assert_eq!(resolver(&reglas, &geo).id, "chile");
    }

    #[test]
    fn test_wildcard_for_foreign_country() {
        let geo = GeoSnapshot::nuevo("AR", "Mendoza");
        assert_eq!(resolver(&default_rules(), &geo).id, "internacional");
    }

    #[test]
    fn test_region_match_is_case_insensitive_contains() {
        let reglas = default_rules();
        let geo = GeoSnapshot::nuevo("CL", "REGIÓN DEL MAULE");
        assert_eq!(resolver(&reglas, &geo).id, "maule");
    }

    #[test]
    fn test_termination_on_empty_geo() {
        // Empty snapshot still resolves through the wildcard rule.
        let d = resolver(&default_rules(), &GeoSnapshot::vacio());
        assert_eq!(d.id, "internacional");
    }

    #[test]
    fn test_sentinel_when_catalog_lacks_wildcard() {
        let reglas = vec![regla("maule", "CL", Some("maule"), "Clínica del Maule")];
        let d = resolver(&reglas, &GeoSnapshot::nuevo("PE", "Lima"));
        assert_eq!(d.id, "sin-derivacion");
        assert_eq!(d.accion, "contactar");
    }

    #[test]
    fn test_region_rule_requires_region_present() {
        let reglas = vec![
            regla("maule", "CL", Some("maule"), "Clínica del Maule"),
            regla("fallback", "*", None, "Telemedicina"),
        ];
        let geo = GeoSnapshot {
            pais: Some("CL".into()),
            ..Default::default()
        };
        assert_eq!(resolver(&reglas, &geo).id, "fallback");
    }

    #[test]
    fn test_resolver_clinico_composes_doctor_note() {
        let geo = GeoSnapshot::nuevo("CL", "Región del Maule");
        let rc = resolver_clinico(&default_rules(), &geo, "Rodilla", Some("izquierda"));
        assert_eq!(rc.derivacion.sede, "Clínica del Maule");
        assert_eq!(rc.especialidad.as_deref(), Some("Rodilla"));
        assert_eq!(rc.doctor.as_deref(), Some("Dr. Pablo Herrera"));
        assert_eq!(
            rc.nota,
            "Derivado a Clínica del Maule: rodilla izquierda. Médico tratante: Dr. Pablo Herrera."
        );
    }

    #[test]
    fn test_resolver_clinico_without_doctor_keeps_site_note() {
        let geo = GeoSnapshot::nuevo("US", "California");
        let rc = resolver_clinico(&default_rules(), &geo, "rodilla", None);
        assert_eq!(rc.derivacion.sede, "Telemedicina");
        // Specialty resolves, but Telemedicina has no doctor directory entry.
        assert_eq!(rc.especialidad.as_deref(), Some("Rodilla"));
        assert!(rc.doctor.is_none());
        assert_eq!(rc.nota, "Derivado a Telemedicina: rodilla.");
    }

    #[test]
    fn test_resolver_clinico_unknown_zone() {
        let geo = GeoSnapshot::nuevo("CL", "Región del Maule");
        let rc = resolver_clinico(&default_rules(), &geo, "abdomen", None);
        assert!(rc.especialidad.is_none());
        assert!(rc.doctor.is_none());
        assert_eq!(rc.nota, "Derivado a Clínica del Maule: abdomen.");
    }
}
