/// Pain region to traumatology specialty. Lookup is exact after trimming and
/// lowercasing; clinical terms are never fuzzy-matched.
const ESPECIALIDADES: &[(&str, &str)] = &[
    ("rodilla", "Rodilla"),
    ("hombro", "Hombro y codo"),
    ("codo", "Hombro y codo"),
    ("cadera", "Cadera y pelvis"),
    ("columna", "Columna"),
    ("columna lumbar", "Columna"),
    ("columna cervical", "Columna"),
    ("tobillo", "Tobillo y pie"),
    ("pie", "Tobillo y pie"),
    ("mano", "Mano y muñeca"),
    ("muñeca", "Mano y muñeca"),
];

/// Treating doctor per `(site, specialty)` pair.
const DOCTORES: &[(&str, &str, &str)] = &[
    ("Clínica del Maule", "Rodilla", "Dr. Pablo Herrera"),
    ("Clínica del Maule", "Columna", "Dra. Carolina Soto"),
    ("Clínica del Maule", "Hombro y codo", "Dr. Ignacio Fuentes"),
    ("Clínica del Maule", "Tobillo y pie", "Dra. Valentina Rojas"),
    ("Centro Médico Santiago", "Rodilla", "Dr. Andrés Vergara"),
    ("Centro Médico Santiago", "Columna", "Dr. Felipe Aránguiz"),
    ("Centro Médico Santiago", "Cadera y pelvis", "Dra. María José Lagos"),
    ("Centro Médico Santiago", "Mano y muñeca", "Dra. Francisca Ibáñez"),
    ("Centro Médico Santiago", "Hombro y codo", "Dr. Rodrigo Palma"),
];

/// Resolve the specialty for a reported pain region.
///
/// Returns `None` for regions outside the table; callers keep the referral
/// site-only in that case.
pub fn especialidad_para(zona: &str) -> Option<&'static str> {
    let zona = zona.trim().to_lowercase();
    ESPECIALIDADES
        .iter()
        .find(|(z, _)| *z == zona)
        .map(|(_, esp)| *esp)
}

/// Resolve the treating doctor for a `(site, specialty)` pair.
pub fn doctor_para(sede: &str, especialidad: &str) -> Option<&'static str> {
    DOCTORES
        .iter()
        .find(|(s, e, _)| *s == sede && *e == especialidad)
        .map(|(_, _, d)| *d)
}
