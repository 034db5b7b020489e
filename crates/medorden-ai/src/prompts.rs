//! Prompt builders for the clinical note generator.
//!
//! Every prompt pins the response contract the strict parser expects: an
//! `EXAMENES:` section with bulleted exam lines and an `INFORME:` section
//! with the narrative.

const CONTRATO: &str = "Responde exactamente en este formato:\nEXAMENES:\n- <un examen por línea>\nINFORME:\n<informe clínico breve>";

pub fn prompt_trauma(zona: &str, lado: Option<&str>, sintomas: Option<&str>) -> String {
    let mut prompt = format!(
        "Eres traumatólogo. Sugiere los exámenes de imagen para un paciente con dolor de {zona}"
    );
    if let Some(lado) = lado.filter(|l| !l.trim().is_empty()) {
        prompt.push_str(&format!(" ({lado})"));
    }
    if let Some(sintomas) = sintomas.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(". Síntomas: {sintomas}"));
    }
    prompt.push_str(&format!(".\n{CONTRATO}"));
    prompt
}

pub fn prompt_preop(tipo_cirugia: Option<&str>, edad: Option<u32>, comorbilidades: &[String]) -> String {
    let mut prompt = String::from("Eres médico internista. Indica la batería preoperatoria");
    if let Some(cirugia) = tipo_cirugia.filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!(" para {cirugia}"));
    }
    if let Some(edad) = edad {
        prompt.push_str(&format!(". Edad: {edad} años"));
    }
    if !comorbilidades.is_empty() {
        prompt.push_str(&format!(". Comorbilidades: {}", comorbilidades.join(", ")));
    }
    prompt.push_str(&format!(".\n{CONTRATO}"));
    prompt
}

pub fn prompt_generales(edad: Option<u32>, sexo: Option<&str>, motivo: Option<&str>) -> String {
    let mut prompt = String::from("Eres médico general. Indica los exámenes de un chequeo general");
    if let Some(edad) = edad {
        prompt.push_str(&format!(". Edad: {edad} años"));
    }
    if let Some(sexo) = sexo.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(". Sexo: {sexo}"));
    }
    if let Some(motivo) = motivo.filter(|m| !m.trim().is_empty()) {
        prompt.push_str(&format!(". Motivo de consulta: {motivo}"));
    }
    prompt.push_str(&format!(".\n{CONTRATO}"));
    prompt
}

pub fn prompt_ia(tipo_examen: Option<&str>, zona: Option<&str>) -> String {
    let mut prompt = String::from("Eres radiólogo. Propón el estudio de resonancia adecuado");
    if let Some(tipo) = tipo_examen.filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!(". Estudio solicitado: {tipo}"));
    }
    if let Some(zona) = zona.filter(|z| !z.trim().is_empty()) {
        prompt.push_str(&format!(". Zona: {zona}"));
    }
    prompt.push_str(&format!(".\n{CONTRATO}"));
    prompt
}
