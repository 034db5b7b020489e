//! Shared printpdf layout helpers for the clinical documents.

use medorden_core::{CoreError, Paciente, Result};
use printpdf::*;
use std::io::BufWriter;
use time::OffsetDateTime;
use time::macros::format_description;

fn pdf_err(detalle: impl std::fmt::Display) -> CoreError {
    CoreError::configuration(format!("PDF render error: {detalle}"))
}

/// Word-wrap a line to at most `max` characters.
pub(crate) fn wrap_text(texto: &str, max: usize) -> Vec<String> {
    let mut lineas = Vec::new();
    let mut actual = String::new();
    for palabra in texto.split_whitespace() {
        if !actual.is_empty() && actual.chars().count() + palabra.chars().count() + 1 > max {
            lineas.push(std::mem::take(&mut actual));
        }
        if !actual.is_empty() {
            actual.push(' ');
        }
        actual.push_str(palabra);
    }
    if !actual.is_empty() {
        lineas.push(actual);
    }
    lineas
}

/// A4 page with a heading, built section by section.
pub(crate) struct PaginaClinica {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
}

impl PaginaClinica {
    pub(crate) fn nueva(titulo: &str) -> Result<Self> {
        let (doc, page1, layer1) = PdfDocument::new(titulo, Mm(210.0), Mm(297.0), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        let mut pagina = Self {
            doc,
            layer,
            font,
            bold,
            y: Mm(280.0),
        };

        pagina.layer.use_text(titulo, 14.0, Mm(20.0), pagina.y, &pagina.bold);
        pagina.y -= Mm(6.0);
        let fecha = OffsetDateTime::now_utc()
            .format(format_description!("[day]-[month]-[year]"))
            .map_err(pdf_err)?;
        pagina
            .layer
            .use_text(format!("Fecha de emisión: {fecha}"), 9.0, Mm(20.0), pagina.y, &pagina.font);
        pagina.y -= Mm(10.0);
        Ok(pagina)
    }

    pub(crate) fn seccion(&mut self, titulo: &str) {
        self.layer.use_text(titulo, 11.0, Mm(20.0), self.y, &self.bold);
        self.y -= Mm(6.0);
    }

    pub(crate) fn linea(&mut self, texto: &str) {
        for linea in wrap_text(texto, 90) {
            self.layer.use_text(&linea, 9.0, Mm(25.0), self.y, &self.font);
            self.y -= Mm(4.5);
        }
    }

    pub(crate) fn lista(&mut self, items: &[String]) {
        for item in items {
            self.linea(&format!("· {item}"));
        }
        self.y -= Mm(2.0);
    }

    pub(crate) fn parrafo(&mut self, texto: &str) {
        self.linea(texto);
        self.y -= Mm(4.0);
    }

    pub(crate) fn datos_paciente(&mut self, paciente: &Paciente) {
        self.seccion("DATOS DEL PACIENTE");
        self.linea(&format!(
            "Nombre: {}",
            paciente.nombre.as_deref().unwrap_or("—")
        ));
        self.linea(&format!("RUT: {}", paciente.rut.as_deref().unwrap_or("—")));
        if let Some(edad) = paciente.edad {
            self.linea(&format!("Edad: {edad} años"));
        }
        if let Some(email) = paciente.email.as_deref() {
            self.linea(&format!("Email: {email}"));
        }
        self.y -= Mm(4.0);
    }

    pub(crate) fn terminar(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(pdf_err)
    }
}
