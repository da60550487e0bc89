use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use super::builder::{Element, Page};
use super::fonts::{encode_win_ansi, Font, ASCENT};
use crate::core::{PdfConfig, ServiceResult};

pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

fn text_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

/// Info dictionary strings: plain ASCII as-is, anything else as UTF-16BE
/// with a byte order mark so readers do not fall back to PDFDocEncoding.
fn info_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Translate one page of top-down elements into PDF content operators.
fn page_operations(page: &Page, page_height: f32) -> Vec<Operation> {
    let mut ops = Vec::new();

    for element in &page.elements {
        match element {
            Element::Rect { x, y, width, height, fill } => {
                let [r, g, b] = fill.components();
                ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                ops.push(Operation::new(
                    "re",
                    vec![(*x).into(), (page_height - y - height).into(), (*width).into(), (*height).into()],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            Element::Text { x, y, style, text } => {
                if text.is_empty() {
                    continue;
                }
                let [r, g, b] = style.color.components();
                let baseline = page_height - y - style.size * ASCENT;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                ops.push(Operation::new(
                    "Tf",
                    vec![style.font.resource_name().into(), style.size.into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), baseline.into()]));
                ops.push(Operation::new("Tj", vec![text_string(text)]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops
}

fn font_dictionary(font: Font) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Serialize laid-out pages into a finished PDF file.
pub fn write_pdf(config: &PdfConfig, pages: &[Page], info: &DocumentInfo) -> ServiceResult<Vec<u8>> {
    let (width, height) = config.page_dimensions();
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(Font::Regular));
    let bold_id = doc.add_object(font_dictionary(Font::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, height),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => info_string(&info.title),
        "Author" => info_string(&info.author),
        "Producer" => info_string(concat!("invoice-upload-service ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => info_string(&Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
