use crate::error::{CoreError, Result};
use crate::space::Space;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Patient identity shared by every clinical module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Paciente {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edad: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sexo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

impl Paciente {
    fn fusionar(&mut self, entrante: Paciente) {
        fusionar_texto(&mut self.nombre, entrante.nombre);
        fusionar_texto(&mut self.rut, entrante.rut);
        fusionar_valor(&mut self.edad, entrante.edad);
        fusionar_texto(&mut self.sexo, entrante.sexo);
        fusionar_texto(&mut self.email, entrante.email);
        fusionar_texto(&mut self.telefono, entrante.telefono);
    }
}

/// MRI safety questionnaire answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormularioRm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marcapasos: Option<bool>,
    #[serde(rename = "implantesMetalicos", skip_serializing_if = "Option::is_none")]
    pub implantes_metalicos: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embarazo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claustrofobia: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peso: Option<f64>,
}

impl FormularioRm {
    fn fusionar(&mut self, entrante: FormularioRm) {
        fusionar_valor(&mut self.marcapasos, entrante.marcapasos);
        fusionar_valor(&mut self.implantes_metalicos, entrante.implantes_metalicos);
        fusionar_valor(&mut self.clips, entrante.clips);
        fusionar_valor(&mut self.embarazo, entrante.embarazo);
        fusionar_valor(&mut self.claustrofobia, entrante.claustrofobia);
        fusionar_valor(&mut self.peso, entrante.peso);
    }

    /// Contraindication flags that must surface on the safety form.
    pub fn alertas(&self) -> Vec<&'static str> {
        let mut alertas = Vec::new();
        if self.marcapasos == Some(true) {
            alertas.push("marcapasos");
        }
        if self.implantes_metalicos == Some(true) {
            alertas.push("implantes metálicos");
        }
        if self.clips == Some(true) {
            alertas.push("clips quirúrgicos");
        }
        if self.embarazo == Some(true) {
            alertas.push("embarazo");
        }
        if self.claustrofobia == Some(true) {
            alertas.push("claustrofobia");
        }
        alertas
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TraumaRecord {
    #[serde(default)]
    pub paciente: Paciente,
    #[serde(rename = "zonaDolor", skip_serializing_if = "Option::is_none")]
    pub zona_dolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sintomas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antecedentes: Option<String>,
    #[serde(rename = "examenesIA", skip_serializing_if = "Vec::is_empty", default)]
    pub examenes_ia: Vec<String>,
    #[serde(rename = "diagnosticoIA", skip_serializing_if = "Option::is_none")]
    pub diagnostico_ia: Option<String>,
    #[serde(rename = "justificacionIA", skip_serializing_if = "Option::is_none")]
    pub justificacion_ia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivacion: Option<String>,
}

impl TraumaRecord {
    fn fusionar(&mut self, entrante: TraumaRecord) {
        self.paciente.fusionar(entrante.paciente);
        fusionar_texto(&mut self.zona_dolor, entrante.zona_dolor);
        fusionar_texto(&mut self.lado, entrante.lado);
        fusionar_texto(&mut self.sintomas, entrante.sintomas);
        fusionar_texto(&mut self.antecedentes, entrante.antecedentes);
        fusionar_lista(&mut self.examenes_ia, entrante.examenes_ia);
        fusionar_texto(&mut self.diagnostico_ia, entrante.diagnostico_ia);
        fusionar_texto(&mut self.justificacion_ia, entrante.justificacion_ia);
        fusionar_texto(&mut self.informe, entrante.informe);
        fusionar_texto(&mut self.derivacion, entrante.derivacion);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PreopRecord {
    #[serde(default)]
    pub paciente: Paciente,
    #[serde(rename = "tipoCirugia", skip_serializing_if = "Option::is_none")]
    pub tipo_cirugia: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub comorbilidades: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicamentos: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examenes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivacion: Option<String>,
}

impl PreopRecord {
    fn fusionar(&mut self, entrante: PreopRecord) {
        self.paciente.fusionar(entrante.paciente);
        fusionar_texto(&mut self.tipo_cirugia, entrante.tipo_cirugia);
        fusionar_lista(&mut self.comorbilidades, entrante.comorbilidades);
        fusionar_texto(&mut self.medicamentos, entrante.medicamentos);
        fusionar_lista(&mut self.examenes, entrante.examenes);
        fusionar_texto(&mut self.informe, entrante.informe);
        fusionar_texto(&mut self.derivacion, entrante.derivacion);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneralesRecord {
    #[serde(default)]
    pub paciente: Paciente,
    #[serde(rename = "motivoConsulta", skip_serializing_if = "Option::is_none")]
    pub motivo_consulta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antecedentes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examenes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivacion: Option<String>,
}

impl GeneralesRecord {
    fn fusionar(&mut self, entrante: GeneralesRecord) {
        self.paciente.fusionar(entrante.paciente);
        fusionar_texto(&mut self.motivo_consulta, entrante.motivo_consulta);
        fusionar_texto(&mut self.antecedentes, entrante.antecedentes);
        fusionar_lista(&mut self.examenes, entrante.examenes);
        fusionar_texto(&mut self.informe, entrante.informe);
        fusionar_texto(&mut self.derivacion, entrante.derivacion);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IaRecord {
    #[serde(default)]
    pub paciente: Paciente,
    #[serde(rename = "tipoExamen", skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
    #[serde(rename = "zonaDolor", skip_serializing_if = "Option::is_none")]
    pub zona_dolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lado: Option<String>,
    #[serde(rename = "formularioRM", skip_serializing_if = "Option::is_none")]
    pub formulario_rm: Option<FormularioRm>,
    #[serde(rename = "observacionesRM", skip_serializing_if = "Option::is_none")]
    pub observaciones_rm: Option<String>,
    #[serde(rename = "examenesIA", skip_serializing_if = "Vec::is_empty", default)]
    pub examenes_ia: Vec<String>,
    #[serde(rename = "diagnosticoIA", skip_serializing_if = "Option::is_none")]
    pub diagnostico_ia: Option<String>,
    #[serde(rename = "justificacionIA", skip_serializing_if = "Option::is_none")]
    pub justificacion_ia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informe: Option<String>,
    #[serde(rename = "pagoConfirmado", default)]
    pub pago_confirmado: bool,
}

impl IaRecord {
    fn fusionar(&mut self, entrante: IaRecord) {
        self.paciente.fusionar(entrante.paciente);
        fusionar_texto(&mut self.tipo_examen, entrante.tipo_examen);
        fusionar_texto(&mut self.zona_dolor, entrante.zona_dolor);
        fusionar_texto(&mut self.lado, entrante.lado);
        match (&mut self.formulario_rm, entrante.formulario_rm) {
            (Some(actual), Some(nuevo)) => actual.fusionar(nuevo),
            (slot @ None, Some(nuevo)) => *slot = Some(nuevo),
            // An absent incoming form never clears the stored one.
            (_, None) => {}
        }
        fusionar_texto(&mut self.observaciones_rm, entrante.observaciones_rm);
        fusionar_lista(&mut self.examenes_ia, entrante.examenes_ia);
        fusionar_texto(&mut self.diagnostico_ia, entrante.diagnostico_ia);
        fusionar_texto(&mut self.justificacion_ia, entrante.justificacion_ia);
        fusionar_texto(&mut self.informe, entrante.informe);
        // Confirmation only latches on, it is never revoked by a merge.
        if entrante.pago_confirmado {
            self.pago_confirmado = true;
        }
    }
}

/// Payment authorization state for a case. Written by the payment gate only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    #[serde(rename = "moduloAutorizado")]
    pub modulo_autorizado: Space,
}

/// One module's view of one patient case.
///
/// The shape is fixed per space; incoming JSON is validated against the
/// space's shape at the merge boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CaseRecord {
    Trauma(TraumaRecord),
    Preop(PreopRecord),
    Generales(GeneralesRecord),
    Ia(IaRecord),
    Meta(MetaRecord),
}

impl CaseRecord {
    pub fn espacio(&self) -> Space {
        match self {
            CaseRecord::Trauma(_) => Space::Trauma,
            CaseRecord::Preop(_) => Space::Preop,
            CaseRecord::Generales(_) => Space::Generales,
            CaseRecord::Ia(_) => Space::Ia,
            CaseRecord::Meta(_) => Space::Meta,
        }
    }

    /// Empty record for a clinical space; `meta` has no empty shape, its
    /// record is always written whole by the payment gate.
    pub fn vacio(espacio: Space) -> Option<CaseRecord> {
        match espacio {
            Space::Trauma => Some(CaseRecord::Trauma(TraumaRecord::default())),
            Space::Preop => Some(CaseRecord::Preop(PreopRecord::default())),
            Space::Generales => Some(CaseRecord::Generales(GeneralesRecord::default())),
            Space::Ia => Some(CaseRecord::Ia(IaRecord::default())),
            Space::Meta => None,
        }
    }

    /// Parse an incoming partial update against the shape of `espacio`.
    pub fn parse(espacio: Space, valor: Value) -> Result<CaseRecord> {
        let record = match espacio {
            Space::Trauma => CaseRecord::Trauma(serde_json::from_value(valor)?),
            Space::Preop => CaseRecord::Preop(serde_json::from_value(valor)?),
            Space::Generales => CaseRecord::Generales(serde_json::from_value(valor)?),
            Space::Ia => CaseRecord::Ia(serde_json::from_value(valor)?),
            Space::Meta => CaseRecord::Meta(serde_json::from_value(valor)?),
        };
        Ok(record)
    }

    /// Non-destructive merge of a partial update into this record.
    ///
    /// Empty incoming values (absent options, blank strings, empty lists)
    /// never erase stored data, so once-computed derived fields survive
    /// later, incomplete updates. Meta records are overwritten whole: the
    /// payment gate re-asserts authorization on every initiation.
    pub fn merge_from(&mut self, entrante: CaseRecord) -> Result<()> {
        match (self, entrante) {
            (CaseRecord::Trauma(actual), CaseRecord::Trauma(nuevo)) => actual.fusionar(nuevo),
            (CaseRecord::Preop(actual), CaseRecord::Preop(nuevo)) => actual.fusionar(nuevo),
            (CaseRecord::Generales(actual), CaseRecord::Generales(nuevo)) => actual.fusionar(nuevo),
            (CaseRecord::Ia(actual), CaseRecord::Ia(nuevo)) => actual.fusionar(nuevo),
            (CaseRecord::Meta(actual), CaseRecord::Meta(nuevo)) => *actual = nuevo,
            (actual, nuevo) => {
                return Err(CoreError::validation(format!(
                    "record shape '{}' does not match stored space '{}'",
                    nuevo.espacio(),
                    actual.espacio()
                )));
            }
        }
        Ok(())
    }
}

fn fusionar_texto(actual: &mut Option<String>, entrante: Option<String>) {
    if let Some(valor) = entrante
        && !valor.trim().is_empty()
    {
        *actual = Some(valor);
    }
}

fn fusionar_lista(actual: &mut Vec<String>, entrante: Vec<String>) {
    if !entrante.is_empty() {
        *actual = entrante;
    }
}

fn fusionar_valor<T>(actual: &mut Option<T>, entrante: Option<T>) {
    if entrante.is_some() {
        *actual = entrante;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trauma(valor: Value) -> CaseRecord {
        CaseRecord::parse(Space::Trauma, valor).unwrap()
    }

    #[test]
    fn test_parse_validates_shape_per_space() {
        let rec = CaseRecord::parse(
            Space::Trauma,
            json!({"paciente": {"nombre": "Ana"}, "zonaDolor": "rodilla"}),
        )
        .unwrap();
        assert_eq!(rec.espacio(), Space::Trauma);

        let err = CaseRecord::parse(Space::Ia, json!({"pagoConfirmado": "yes"})).unwrap_err();
        assert!(matches!(err, CoreError::JsonError(_)));
    }

    #[test]
    fn test_merge_accumulates_fields() {
        let mut rec = trauma(json!({"paciente": {"nombre": "Ana"}}));
        rec.merge_from(trauma(json!({"zonaDolor": "rodilla", "lado": "izquierda"})))
            .unwrap();
        rec.merge_from(trauma(json!({"sintomas": "dolor al caminar"})))
            .unwrap();

        let CaseRecord::Trauma(t) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(t.paciente.nombre.as_deref(), Some("Ana"));
        assert_eq!(t.zona_dolor.as_deref(), Some("rodilla"));
        assert_eq!(t.lado.as_deref(), Some("izquierda"));
        assert_eq!(t.sintomas.as_deref(), Some("dolor al caminar"));
    }

    #[test]
    fn test_empty_values_never_erase() {
        let mut rec = trauma(json!({
            "paciente": {"nombre": "Ana"},
            "zonaDolor": "rodilla",
            "examenesIA": ["Radiografía de rodilla"]
        }));
        rec.merge_from(trauma(json!({
            "paciente": {"nombre": ""},
            "zonaDolor": "   ",
            "examenesIA": []
        })))
        .unwrap();

        let CaseRecord::Trauma(t) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(t.paciente.nombre.as_deref(), Some("Ana"));
        assert_eq!(t.zona_dolor.as_deref(), Some("rodilla"));
        assert_eq!(t.examenes_ia, vec!["Radiografía de rodilla"]);
    }

    #[test]
    fn test_sticky_derived_fields_survive_incomplete_updates() {
        let mut rec = trauma(json!({
            "examenesIA": ["X"],
            "diagnosticoIA": "sospecha de lesión meniscal",
            "justificacionIA": "dolor mecánico con bloqueo",
            "informe": "informe inicial"
        }));
        // A later update carrying only patient data drops none of the above.
        rec.merge_from(trauma(json!({"paciente": {"telefono": "+56911112222"}})))
            .unwrap();

        let CaseRecord::Trauma(t) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(t.examenes_ia, vec!["X"]);
        assert_eq!(
            t.diagnostico_ia.as_deref(),
            Some("sospecha de lesión meniscal")
        );
        assert_eq!(
            t.justificacion_ia.as_deref(),
            Some("dolor mecánico con bloqueo")
        );
        assert_eq!(t.informe.as_deref(), Some("informe inicial"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let base = trauma(json!({"zonaDolor": "hombro", "examenesIA": ["Ecografía"]}));
        let update = trauma(json!({"lado": "derecha"}));

        let mut once = base.clone();
        once.merge_from(update.clone()).unwrap();
        let mut twice = once.clone();
        twice.merge_from(update).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_monotonicity_over_sequence() {
        let updates = [
            json!({"paciente": {"nombre": "Ana", "rut": "11.111.111-1"}}),
            json!({"zonaDolor": "columna lumbar"}),
            json!({"zonaDolor": "", "lado": "bilateral"}),
            json!({"examenesIA": ["Resonancia lumbar"], "diagnosticoIA": "lumbago"}),
            json!({"examenesIA": [], "diagnosticoIA": ""}),
        ];

        let mut rec = trauma(json!({}));
        let mut poblados_prev = 0;
        for update in updates {
            rec.merge_from(trauma(update)).unwrap();
            let CaseRecord::Trauma(t) = &rec else {
                panic!("wrong shape")
            };
            let poblados = [
                t.paciente.nombre.is_some(),
                t.paciente.rut.is_some(),
                t.zona_dolor.is_some(),
                t.lado.is_some(),
                !t.examenes_ia.is_empty(),
                t.diagnostico_ia.is_some(),
            ]
            .iter()
            .filter(|b| **b)
            .count();
            assert!(poblados >= poblados_prev, "populated fields regressed");
            poblados_prev = poblados;
        }

        let CaseRecord::Trauma(t) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(t.zona_dolor.as_deref(), Some("columna lumbar"));
        assert_eq!(t.examenes_ia, vec!["Resonancia lumbar"]);
    }

    #[test]
    fn test_formulario_rm_is_sticky_and_merges_per_field() {
        let mut rec = CaseRecord::parse(
            Space::Ia,
            json!({"formularioRM": {"marcapasos": true, "peso": 82.5}}),
        )
        .unwrap();
        rec.merge_from(CaseRecord::parse(Space::Ia, json!({"observacionesRM": "control"})).unwrap())
            .unwrap();
        rec.merge_from(
            CaseRecord::parse(Space::Ia, json!({"formularioRM": {"claustrofobia": true}})).unwrap(),
        )
        .unwrap();

        let CaseRecord::Ia(ia) = rec else {
            panic!("wrong shape")
        };
        let form = ia.formulario_rm.unwrap();
        assert_eq!(form.marcapasos, Some(true));
        assert_eq!(form.peso, Some(82.5));
        assert_eq!(form.claustrofobia, Some(true));
        assert_eq!(ia.observaciones_rm.as_deref(), Some("control"));
    }

    #[test]
    fn test_pago_confirmado_latches() {
        let mut rec = CaseRecord::parse(Space::Ia, json!({"pagoConfirmado": true})).unwrap();
        rec.merge_from(CaseRecord::parse(Space::Ia, json!({"tipoExamen": "RM rodilla"})).unwrap())
            .unwrap();

        let CaseRecord::Ia(ia) = &rec else {
            panic!("wrong shape")
        };
        assert!(ia.pago_confirmado);

        // An explicit false in a later update does not revoke it either.
        rec.merge_from(CaseRecord::parse(Space::Ia, json!({"pagoConfirmado": false})).unwrap())
            .unwrap();
        let CaseRecord::Ia(ia) = rec else {
            panic!("wrong shape")
        };
        assert!(ia.pago_confirmado);
    }

    #[test]
    fn test_shape_mismatch_is_validation_error() {
        let mut rec = trauma(json!({"zonaDolor": "cadera"}));
        let err = rec
            .merge_from(CaseRecord::parse(Space::Preop, json!({})).unwrap())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_meta_record_is_overwritten_whole() {
        let mut rec = CaseRecord::Meta(MetaRecord {
            modulo_autorizado: Space::Trauma,
        });
        rec.merge_from(CaseRecord::Meta(MetaRecord {
            modulo_autorizado: Space::Ia,
        }))
        .unwrap();
        let CaseRecord::Meta(meta) = rec else {
            panic!("wrong shape")
        };
        assert_eq!(meta.modulo_autorizado, Space::Ia);
    }

    #[test]
    fn test_formulario_alertas() {
        let form = FormularioRm {
            marcapasos: Some(true),
            claustrofobia: Some(true),
            embarazo: Some(false),
            ..Default::default()
        };
        assert_eq!(form.alertas(), vec!["marcapasos", "claustrofobia"]);
        assert!(FormularioRm::default().alertas().is_empty());
    }

    #[test]
    fn test_wire_names_roundtrip() {
        let rec = trauma(json!({
            "zonaDolor": "rodilla",
            "examenesIA": ["Radiografía"],
            "diagnosticoIA": "d",
            "justificacionIA": "j"
        }));
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["zonaDolor"], "rodilla");
        assert_eq!(v["examenesIA"][0], "Radiografía");
        assert_eq!(v["diagnosticoIA"], "d");
        assert_eq!(v["justificacionIA"], "j");
    }
}
