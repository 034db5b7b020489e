use crate::generator::NotaClinica;
use medorden_core::{CoreError, Result};

/// Parse the model's free-text answer into a structured clinical note.
///
/// Contract: the text carries an `EXAMENES:` section with one exam per
/// bulleted line and an `INFORME:` section with the narrative. The parser is
/// strict — both sections present, at least one exam, non-empty narrative —
/// and otherwise fails whole, so partially-parsed data never reaches a case
/// record. Callers fall back to the deterministic catalog on failure.
pub fn parsear_nota(texto: &str) -> Result<NotaClinica> {
    let inicio_examenes = posicion_seccion(texto, &["EXAMENES:", "EXÁMENES:"])
        .ok_or_else(|| parse_error("missing EXAMENES section"))?;
    let inicio_informe =
        posicion_seccion(texto, &["INFORME:"]).ok_or_else(|| parse_error("missing INFORME section"))?;

    if inicio_informe < inicio_examenes {
        return Err(parse_error("INFORME section precedes EXAMENES"));
    }

    let bloque_examenes = &texto[inicio_examenes..inicio_informe];
    let examenes: Vec<String> = bloque_examenes
        .lines()
        .skip(1)
        .map(str::trim)
        .filter_map(|linea| {
            linea
                .strip_prefix('-')
                .or_else(|| linea.strip_prefix('*'))
                .map(str::trim)
        })
        .filter(|linea| !linea.is_empty())
        .map(str::to_string)
        .collect();
    if examenes.is_empty() {
        return Err(parse_error("EXAMENES section lists no exams"));
    }

    let informe = texto[inicio_informe..]
        .split_once(':')
        .map(|(_, resto)| resto.trim())
        .unwrap_or("");
    if informe.is_empty() {
        return Err(parse_error("INFORME section is empty"));
    }

    Ok(NotaClinica {
        examenes,
        informe: informe.to_string(),
    })
}

fn posicion_seccion(texto: &str, encabezados: &[&str]) -> Option<usize> {
    encabezados.iter().filter_map(|e| texto.find(e)).min()
}

fn parse_error(detalle: &str) -> CoreError {
    CoreError::upstream("ia", format!("unparseable model response: {detalle}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_well_formed_response() {
        let texto = "EXAMENES:\n- Radiografía de rodilla\n- Resonancia magnética de rodilla\nINFORME:\nPaciente con dolor mecánico de rodilla derecha.";
        let nota = parsear_nota(texto).unwrap();
        assert_eq!(
            nota.examenes,
            vec!["Radiografía de rodilla", "Resonancia magnética de rodilla"]
        );
        assert!(nota.informe.starts_with("Paciente con dolor"));
    }

    #[test]
    fn test_accepts_accented_header_and_star_bullets() {
        let texto = "EXÁMENES:\n* Ecografía de hombro\nINFORME:\nDolor de hombro.";
        let nota = parsear_nota(texto).unwrap();
        assert_eq!(nota.examenes, vec!["Ecografía de hombro"]);
    }

    #[test]
    fn test_missing_examenes_section_fails() {
        let err = parsear_nota("INFORME:\nSolo informe.").unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
    }

    #[test]
    fn test_missing_informe_section_fails() {
        let err = parsear_nota("EXAMENES:\n- Radiografía").unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
    }

    #[test]
    fn test_empty_exam_list_fails_whole() {
        // No partially-parsed result even though INFORME is usable.
        let err = parsear_nota("EXAMENES:\nINFORME:\nTexto.").unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
    }

    #[test]
    fn test_empty_informe_fails() {
        let err = parsear_nota("EXAMENES:\n- Radiografía\nINFORME:\n   ").unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
    }

    #[test]
    fn test_sections_out_of_order_fail() {
        let err = parsear_nota("INFORME:\nTexto.\nEXAMENES:\n- Radiografía").unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
    }

    #[test]
    fn test_non_bulleted_lines_are_ignored() {
        let texto =
            "EXAMENES:\nSegún la clínica descrita:\n- Radiografía de tobillo\nINFORME:\nEsguince.";
        let nota = parsear_nota(texto).unwrap();
        assert_eq!(nota.examenes, vec!["Radiografía de tobillo"]);
    }
}
