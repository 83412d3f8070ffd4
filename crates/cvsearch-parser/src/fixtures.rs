//! Hand-built documents for tests

/// Font resources naming Helvetica as `/F1`
pub const HELVETICA_RESOURCES: &str = "<< /Font << /F1 3 0 R >> >>";

/// One-page-per-string PDF with a single Helvetica text line per page.
/// Empty strings give blank pages.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let streams: Vec<String> = pages
        .iter()
        .map(|text| {
            if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET")
            }
        })
        .collect();
    pdf_from_streams(&streams, HELVETICA_RESOURCES)
}

/// PDF whose pages carry the given content streams and page resources
pub fn pdf_from_streams(streams: &[String], resources: &str) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..streams.len())
                .map(|i| format!("{} 0 R", 4 + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            streams.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, stream) in streams.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources {resources} /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    out.into_bytes()
}

/// PDF that selects a font its page never defines
pub fn undefined_font_pdf() -> Vec<u8> {
    pdf_from_streams(
        &["BT /F9 12 Tf 72 712 Td (John Doe) Tj ET".to_string()],
        "<< >>",
    )
}
