//! Deterministic clinical catalogs.
//!
//! Every language-model call site falls back to these rule-based
//! computations, so the user-facing flow completes even when the model is
//! unreachable or answers garbage.

use crate::generator::NotaClinica;
use medorden_core::FormularioRm;

/// Per-zone imaging table for the trauma module.
const IMAGENES_POR_ZONA: &[(&str, &[&str])] = &[
    (
        "rodilla",
        &[
            "Radiografía de rodilla (AP y lateral)",
            "Resonancia magnética de rodilla",
        ],
    ),
    ("hombro", &["Radiografía de hombro", "Ecografía de hombro"]),
    ("codo", &["Radiografía de codo (AP y lateral)"]),
    (
        "cadera",
        &["Radiografía de pelvis AP", "Radiografía de cadera axial"],
    ),
    (
        "columna",
        &["Radiografía de columna total", "Resonancia magnética de columna"],
    ),
    (
        "columna lumbar",
        &[
            "Radiografía de columna lumbar (AP y lateral)",
            "Resonancia magnética lumbar",
        ],
    ),
    (
        "columna cervical",
        &["Radiografía de columna cervical", "Resonancia magnética cervical"],
    ),
    (
        "tobillo",
        &["Radiografía de tobillo (AP y lateral)", "Ecografía de tobillo"],
    ),
    ("pie", &["Radiografía de pie (AP y oblicua)"]),
    ("mano", &["Radiografía de mano (AP y oblicua)"]),
    ("muñeca", &["Radiografía de muñeca (AP y lateral)"]),
];

fn imagenes_para(zona: &str) -> Vec<String> {
    let zona = zona.trim().to_lowercase();
    IMAGENES_POR_ZONA
        .iter()
        .find(|(z, _)| *z == zona)
        .map(|(_, examenes)| examenes.iter().map(|e| e.to_string()).collect())
        .unwrap_or_else(|| vec!["Radiografía simple de la zona comprometida".to_string()])
}

/// Imaging suggestion and narrative for a trauma intake.
pub fn nota_trauma(zona: &str, lado: Option<&str>, sintomas: Option<&str>) -> NotaClinica {
    let examenes = imagenes_para(zona);
    let zona = zona.trim().to_lowercase();
    let lado = lado.map(str::trim).filter(|l| !l.is_empty());
    let mut informe = match lado {
        Some(lado) => format!("Paciente consulta por dolor de {zona} {lado}."),
        None => format!("Paciente consulta por dolor de {zona}."),
    };
    if let Some(sintomas) = sintomas.map(str::trim).filter(|s| !s.is_empty()) {
        informe.push_str(&format!(" Refiere: {sintomas}."));
    }
    informe.push_str(" Se solicita estudio de imágenes para precisar diagnóstico.");
    NotaClinica { examenes, informe }
}

/// Preoperative battery: fixed base plus age- and comorbidity-conditional
/// additions.
pub fn nota_preop(edad: Option<u32>, comorbilidades: &[String], tipo_cirugia: Option<&str>) -> NotaClinica {
    let mut examenes = vec![
        "Hemograma completo".to_string(),
        "Perfil bioquímico".to_string(),
        "Pruebas de coagulación (TP y TTPA)".to_string(),
        "Grupo sanguíneo y Rh".to_string(),
        "Orina completa".to_string(),
    ];
    if edad.is_some_and(|e| e >= 40) {
        examenes.push("Electrocardiograma de reposo".to_string());
    }
    if edad.is_some_and(|e| e >= 60) {
        examenes.push("Radiografía de tórax".to_string());
    }

    let comorbilidades_norm: Vec<String> =
        comorbilidades.iter().map(|c| c.trim().to_lowercase()).collect();
    if comorbilidades_norm.iter().any(|c| c.contains("diabetes")) {
        examenes.push("Hemoglobina glicosilada (HbA1c)".to_string());
    }
    if comorbilidades_norm
        .iter()
        .any(|c| c.contains("hipertensión") || c.contains("hipertension") || c.contains("cardiopatía") || c.contains("cardiopatia"))
    {
        examenes.push("Evaluación cardiológica preoperatoria".to_string());
    }

    let mut informe = match tipo_cirugia.map(str::trim).filter(|t| !t.is_empty()) {
        Some(cirugia) => format!("Evaluación preoperatoria para {cirugia}."),
        None => "Evaluación preoperatoria.".to_string(),
    };
    if !comorbilidades.is_empty() {
        informe.push_str(&format!(
            " Antecedentes relevantes: {}.",
            comorbilidades.join(", ")
        ));
    }
    informe.push_str(" Se solicita batería de exámenes según protocolo.");
    NotaClinica { examenes, informe }
}

/// General checkup battery, conditional on age and sex.
pub fn nota_generales(edad: Option<u32>, sexo: Option<&str>) -> NotaClinica {
    let mut examenes = vec![
        "Hemograma completo".to_string(),
        "Perfil lipídico".to_string(),
        "Glicemia en ayunas".to_string(),
        "Orina completa".to_string(),
    ];
    if edad.is_some_and(|e| e >= 40) {
        examenes.push("Electrocardiograma de reposo".to_string());
    }
    if edad.is_some_and(|e| e >= 50) {
        examenes.push("Sangre oculta en deposiciones".to_string());
        match sexo.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("masculino") | Some("hombre") | Some("m") => {
                examenes.push("Antígeno prostático específico".to_string());
            }
            Some("femenino") | Some("mujer") | Some("f") => {
                examenes.push("Mamografía".to_string());
            }
            _ => {}
        }
    }

    let informe =
        "Chequeo médico general. Se solicita batería de tamizaje según edad y sexo.".to_string();
    NotaClinica { examenes, informe }
}

/// MRI order analysis for the imaging-AI module: suggested study plus safety
/// alerts surfaced from the questionnaire.
pub fn nota_ia(
    tipo_examen: Option<&str>,
    zona: Option<&str>,
    formulario: Option<&FormularioRm>,
) -> NotaClinica {
    let examen = match (tipo_examen, zona) {
        (Some(tipo), _) if !tipo.trim().is_empty() => tipo.trim().to_string(),
        (_, Some(zona)) if !zona.trim().is_empty() => {
            format!("Resonancia magnética de {}", zona.trim().to_lowercase())
        }
        _ => "Resonancia magnética según indicación clínica".to_string(),
    };

    let mut informe = format!("Orden de estudio: {examen}.");
    match formulario {
        Some(form) => {
            let alertas = form.alertas();
            if alertas.is_empty() {
                informe.push_str(" Formulario de seguridad sin contraindicaciones declaradas.");
            } else {
                informe.push_str(&format!(
                    " ATENCIÓN: contraindicaciones declaradas: {}. Requiere evaluación previa.",
                    alertas.join(", ")
                ));
            }
        }
        None => informe.push_str(" Formulario de seguridad pendiente."),
    }

    NotaClinica {
        examenes: vec![examen],
        informe,
    }
}
