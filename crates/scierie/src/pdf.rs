//! Invoice rendering to PDF.
//!
//! Produces an A4 document with the company letterhead, the invoice number
//! and date, the client block, one numbered line per product and the total.
//! Text uses the standard Helvetica fonts with `WinAnsiEncoding`, so
//! characters outside Latin-1 are replaced by `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::config::CompanyConfig;
use crate::error::Result;
use crate::model::Invoice;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const BOTTOM: i64 = 70;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f64 = 0.52;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

/// Lays text out top to bottom, starting a new page when the current one
/// is full.
#[derive(Debug)]
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Move down by `gap`, breaking the page if needed.
    fn advance(&mut self, gap: i64) {
        self.y -= gap;
        if self.y < BOTTOM {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, text: &str, font: Font, size: i64, align: Align) {
        let width = estimated_width(text, size);
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => (PAGE_WIDTH - width) / 2,
            Align::Right => PAGE_WIDTH - MARGIN - width,
        }
        .max(MARGIN / 2);
        let y = self.y;

        self.current().extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource().as_bytes().to_vec()), Object::Integer(size)],
            ),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(latin1(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn line(&mut self, text: &str, font: Font, size: i64, align: Align, gap: i64) {
        self.text(text, font, size, align);
        self.advance(gap);
    }

    fn rule(&mut self) {
        let y = self.y;
        self.current().extend([
            Operation::new("w", vec![Object::Integer(1)]),
            Operation::new("m", vec![Object::Integer(MARGIN), Object::Integer(y)]),
            Operation::new(
                "l",
                vec![Object::Integer(PAGE_WIDTH - MARGIN), Object::Integer(y)],
            ),
            Operation::new("S", vec![]),
        ]);
        self.advance(20);
    }
}

/// Render `invoice` with the `company` letterhead.
///
/// # Errors
///
/// Returns an error if the PDF cannot be encoded.
pub fn render_invoice(invoice: &Invoice, company: &CompanyConfig) -> Result<Vec<u8>> {
    let currency = company.currency.as_str();
    let mut page = PageWriter::new();

    page.line(&company.name, Font::Bold, 18, Align::Center, 18);
    if !company.address.is_empty() {
        page.line(&company.address, Font::Regular, 10, Align::Center, 14);
    }
    let contact = match company.email.as_deref() {
        Some(email) => format!("Tel: {} | Email: {}", company.phone, email),
        None => format!("Tel: {}", company.phone),
    };
    page.line(&contact, Font::Regular, 10, Align::Center, 14);
    if let Some(rccm) = company.rccm.as_deref() {
        page.line(&format!("RCCM: {rccm}"), Font::Regular, 10, Align::Center, 14);
    }
    page.advance(6);
    page.rule();

    page.line(
        &format!("Facture N°: {}", invoice.numero_facture),
        Font::Bold,
        14,
        Align::Left,
        18,
    );
    page.line(
        &format!("Date: {}", invoice.date.format("%d/%m/%Y")),
        Font::Regular,
        11,
        Align::Left,
        26,
    );

    page.line(
        &format!("Client : {}", invoice.client_nom),
        Font::Regular,
        11,
        Align::Left,
        15,
    );
    page.line(
        &format!("Téléphone : {}", invoice.client_telephone),
        Font::Regular,
        11,
        Align::Left,
        15,
    );
    if let Some(address) = invoice.client_adresse.as_deref().filter(|a| !a.is_empty()) {
        page.line(
            &format!("Adresse : {address}"),
            Font::Regular,
            11,
            Align::Left,
            15,
        );
    }
    page.advance(11);

    page.line("Produits :", Font::Bold, 12, Align::Left, 18);
    for (idx, line) in invoice.products.iter().enumerate() {
        page.line(
            &format!(
                "{}. {} | Qté: {} | Prix: {} {currency} | Total: {} {currency}",
                idx + 1,
                line.type_de_produit,
                format_amount(line.quantity),
                format_amount(line.price),
                format_amount(line.total),
            ),
            Font::Regular,
            10,
            Align::Left,
            15,
        );
    }
    page.advance(5);
    page.rule();

    page.line(
        &format!("TOTAL: {} {currency}", format_amount(invoice.total)),
        Font::Bold,
        14,
        Align::Right,
        24,
    );
    page.line(
        &format!("Paiement: {}", invoice.mode_paiement),
        Font::Regular,
        11,
        Align::Left,
        15,
    );
    page.line(
        &format!("Statut: {}", invoice.statut),
        Font::Regular,
        11,
        Align::Left,
        36,
    );
    page.line("Merci pour votre confiance", Font::Italic, 11, Align::Center, 0);

    build_document(page.pages)
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |doc: &mut Document, base: &str| -> ObjectId {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let italic = font(&mut doc, "Helvetica-Oblique");

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource() => regular,
            Font::Bold.resource() => bold,
            Font::Italic.resource() => italic,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Encode text for a `WinAnsiEncoding` font.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Approximate rendered width of `text` in points.
#[allow(clippy::cast_possible_truncation)]
fn estimated_width(text: &str, size: i64) -> i64 {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let size = u32::try_from(size).unwrap_or(0);
    let width = f64::from(chars) * f64::from(size) * AVG_GLYPH_WIDTH;
    width.round().min(f64::from(i32::MAX)) as i64
}

/// Format an amount with spaces between thousands and at most two
/// decimals, trailing zeros dropped: `1234567.5` gives `1 234 567.5`.
#[must_use]
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if grouped.chars().all(|c| c == '0' || c == ' ') && frac.is_empty() {
        ""
    } else {
        sign
    };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::Config;
    use crate::model::InvoiceLine;

    fn invoice(lines: Vec<InvoiceLine>) -> Invoice {
        let date = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        Invoice {
            id: 1,
            numero_facture: "FAC-123456".to_string(),
            client_nom: "Menuiserie Tshala".to_string(),
            client_telephone: "0990000000".to_string(),
            client_adresse: Some("Av. du Commerce 12".to_string()),
            type_de_produit: lines[0].type_de_produit.clone(),
            quantity: lines[0].quantity,
            price: lines[0].price,
            total: lines.iter().map(|l| l.total).sum(),
            products: lines,
            mode_paiement: "Espèces".to_string(),
            statut: "En attente".to_string(),
            date,
            created_at: date,
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_render_single_page() {
        let company = Config::default().company;
        let bytes = render_invoice(
            &invoice(vec![InvoiceLine::new("Planche acajou", 10.0, 15_000.0)]),
            &company,
        )
        .unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_long_invoice_breaks_pages() {
        let company = Config::default().company;
        let lines = (0..80)
            .map(|i| InvoiceLine::new(format!("Planche {i}"), 1.0, 100.0))
            .collect();
        let bytes = render_invoice(&invoice(lines), &company).unwrap();

        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn test_latin1_encoding() {
        assert_eq!(latin1("Qté"), vec![b'Q', b't', 0xE9]);
        assert_eq!(latin1("m³"), vec![b'm', 0xB3]);
        assert_eq!(latin1("→"), vec![b'?']);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(1_000.0), "1 000");
        assert_eq!(format_amount(1_234_567.5), "1 234 567.5");
        assert_eq!(format_amount(12.346), "12.35");
        assert_eq!(format_amount(-4_500.0), "-4 500");
    }

    #[test]
    fn test_estimated_width_grows_with_text() {
        assert!(estimated_width("TOTAL: 10 FC", 14) > estimated_width("TOTAL", 14));
        assert_eq!(estimated_width("", 14), 0);
    }
}
