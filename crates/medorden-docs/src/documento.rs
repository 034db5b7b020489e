use crate::pdf::PaginaClinica;
use medorden_core::{
    CaseRecord, CoreError, GeneralesRecord, IaRecord, PreopRecord, Result, Space, TraumaRecord,
};

/// One renderable clinical document.
///
/// The renderer is an opaque collaborator from the gate's point of view: it
/// consumes a merged case record and produces paginated bytes.
pub trait DocumentoClinico: Send + Sync {
    fn titulo(&self) -> &'static str;
    fn nombre_archivo(&self) -> &'static str;
    fn render(&self) -> Result<Vec<u8>>;
}

/// Select the document implementation for an authorized, paid case.
///
/// The record shape must match the requested module; `meta` never renders.
pub fn por_modulo(modulo: Space, record: &CaseRecord) -> Result<Box<dyn DocumentoClinico>> {
    match (modulo, record) {
        (Space::Trauma, CaseRecord::Trauma(r)) => Ok(Box::new(OrdenExamenes(r.clone()))),
        (Space::Preop, CaseRecord::Preop(r)) => Ok(Box::new(FormularioPreoperatorio(r.clone()))),
        (Space::Generales, CaseRecord::Generales(r)) => {
            Ok(Box::new(OrdenChequeoGeneral(r.clone())))
        }
        (Space::Ia, CaseRecord::Ia(r)) => Ok(Box::new(FormularioSeguridadRm(r.clone()))),
        (Space::Meta, _) => Err(CoreError::validation("'meta' has no printable document")),
        (modulo, record) => Err(CoreError::validation(format!(
            "record shape '{}' does not match requested module '{modulo}'",
            record.espacio()
        ))),
    }
}

struct OrdenExamenes(TraumaRecord);

impl DocumentoClinico for OrdenExamenes {
    fn titulo(&self) -> &'static str {
        "Orden de Exámenes — Traumatología"
    }

    fn nombre_archivo(&self) -> &'static str {
        "orden-examenes.pdf"
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut pagina = PaginaClinica::nueva(self.titulo())?;
        pagina.datos_paciente(&self.0.paciente);

        pagina.seccion("MOTIVO");
        match (&self.0.zona_dolor, &self.0.lado) {
            (Some(zona), Some(lado)) => pagina.parrafo(&format!("Dolor de {zona} ({lado}).")),
            (Some(zona), None) => pagina.parrafo(&format!("Dolor de {zona}.")),
            _ => pagina.parrafo("Consulta traumatológica."),
        }

        if !self.0.examenes_ia.is_empty() {
            pagina.seccion("EXÁMENES SOLICITADOS");
            pagina.lista(&self.0.examenes_ia);
        }
        if let Some(diagnostico) = &self.0.diagnostico_ia {
            pagina.seccion("HIPÓTESIS DIAGNÓSTICA");
            pagina.parrafo(diagnostico);
        }
        if let Some(justificacion) = &self.0.justificacion_ia {
            pagina.seccion("JUSTIFICACIÓN");
            pagina.parrafo(justificacion);
        }
        if let Some(informe) = &self.0.informe {
            pagina.seccion("INFORME");
            pagina.parrafo(informe);
        }
        if let Some(derivacion) = &self.0.derivacion {
            pagina.seccion("DERIVACIÓN");
            pagina.parrafo(derivacion);
        }
        pagina.terminar()
    }
}

struct FormularioPreoperatorio(PreopRecord);

impl DocumentoClinico for FormularioPreoperatorio {
    fn titulo(&self) -> &'static str {
        "Formulario Preoperatorio"
    }

    fn nombre_archivo(&self) -> &'static str {
        "formulario-preoperatorio.pdf"
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut pagina = PaginaClinica::nueva(self.titulo())?;
        pagina.datos_paciente(&self.0.paciente);

        if let Some(cirugia) = &self.0.tipo_cirugia {
            pagina.seccion("CIRUGÍA PROGRAMADA");
            pagina.parrafo(cirugia);
        }
        if !self.0.comorbilidades.is_empty() {
            pagina.seccion("COMORBILIDADES");
            pagina.lista(&self.0.comorbilidades);
        }
        if let Some(medicamentos) = &self.0.medicamentos {
            pagina.seccion("MEDICAMENTOS EN USO");
            pagina.parrafo(medicamentos);
        }
        if !self.0.examenes.is_empty() {
            pagina.seccion("EXÁMENES PREOPERATORIOS");
            pagina.lista(&self.0.examenes);
        }
        if let Some(informe) = &self.0.informe {
            pagina.seccion("INFORME");
            pagina.parrafo(informe);
        }
        if let Some(derivacion) = &self.0.derivacion {
            pagina.seccion("DERIVACIÓN");
            pagina.parrafo(derivacion);
        }
        pagina.terminar()
    }
}

struct OrdenChequeoGeneral(GeneralesRecord);

impl DocumentoClinico for OrdenChequeoGeneral {
    fn titulo(&self) -> &'static str {
        "Orden de Chequeo General"
    }

    fn nombre_archivo(&self) -> &'static str {
        "orden-chequeo-general.pdf"
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut pagina = PaginaClinica::nueva(self.titulo())?;
        pagina.datos_paciente(&self.0.paciente);

        if let Some(motivo) = &self.0.motivo_consulta {
            pagina.seccion("MOTIVO DE CONSULTA");
            pagina.parrafo(motivo);
        }
        if !self.0.examenes.is_empty() {
            pagina.seccion("EXÁMENES DE TAMIZAJE");
            pagina.lista(&self.0.examenes);
        }
        if let Some(informe) = &self.0.informe {
            pagina.seccion("INFORME");
            pagina.parrafo(informe);
        }
        if let Some(derivacion) = &self.0.derivacion {
            pagina.seccion("DERIVACIÓN");
            pagina.parrafo(derivacion);
        }
        pagina.terminar()
    }
}

struct FormularioSeguridadRm(IaRecord);

impl FormularioSeguridadRm {
    fn respuesta(valor: Option<bool>) -> &'static str {
        match valor {
            Some(true) => "SÍ",
            Some(false) => "No",
            None => "Sin respuesta",
        }
    }
}

impl DocumentoClinico for FormularioSeguridadRm {
    fn titulo(&self) -> &'static str {
        "Formulario de Seguridad — Resonancia Magnética"
    }

    fn nombre_archivo(&self) -> &'static str {
        "formulario-seguridad-rm.pdf"
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut pagina = PaginaClinica::nueva(self.titulo())?;
        pagina.datos_paciente(&self.0.paciente);

        pagina.seccion("ESTUDIO");
        match (&self.0.tipo_examen, &self.0.zona_dolor) {
            (Some(tipo), _) => pagina.parrafo(tipo),
            (None, Some(zona)) => pagina.parrafo(&format!("Resonancia magnética de {zona}.")),
            _ => pagina.parrafo("Resonancia magnética según indicación."),
        }

        pagina.seccion("CUESTIONARIO DE SEGURIDAD");
        match &self.0.formulario_rm {
            Some(form) => {
                pagina.linea(&format!("Marcapasos: {}", Self::respuesta(form.marcapasos)));
                pagina.linea(&format!(
                    "Implantes metálicos: {}",
                    Self::respuesta(form.implantes_metalicos)
                ));
                pagina.linea(&format!(
                    "Clips quirúrgicos: {}",
                    Self::respuesta(form.clips)
                ));
                pagina.linea(&format!("Embarazo: {}", Self::respuesta(form.embarazo)));
                pagina.linea(&format!(
                    "Claustrofobia: {}",
                    Self::respuesta(form.claustrofobia)
                ));
                if let Some(peso) = form.peso {
                    pagina.linea(&format!("Peso: {peso} kg"));
                }
                let alertas = form.alertas();
                if !alertas.is_empty() {
                    pagina.parrafo(&format!(
                        "ATENCIÓN: contraindicaciones declaradas: {}.",
                        alertas.join(", ")
                    ));
                }
            }
            None => pagina.parrafo("Cuestionario pendiente de completar."),
        }

        if let Some(observaciones) = &self.0.observaciones_rm {
            pagina.seccion("OBSERVACIONES");
            pagina.parrafo(observaciones);
        }
        if !self.0.examenes_ia.is_empty() {
            pagina.seccion("EXÁMENES SUGERIDOS");
            pagina.lista(&self.0.examenes_ia);
        }
        if let Some(diagnostico) = &self.0.diagnostico_ia {
            pagina.seccion("HIPÓTESIS DIAGNÓSTICA");
            pagina.parrafo(diagnostico);
        }
        if let Some(informe) = &self.0.informe {
            pagina.seccion("INFORME");
            pagina.parrafo(informe);
        }
        pagina.terminar()
    }
}
