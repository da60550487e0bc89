use std::sync::Arc;

use super::builder::{Align, Color, Page, PageBuilder, PageState, TextStyle};
use super::fonts::Font;
use super::writer::{write_pdf, DocumentInfo};
use crate::core::{PdfConfig, ServiceError, ServiceResult};
use crate::models::{InvoiceDocument, InvoiceLineItem};

const SHOP_COLUMN_OFFSET: f32 = 250.0;
const SHOP_COLUMN_WIDTH: f32 = 200.0;

const PARTY_TITLE_Y: f32 = 130.0;
const PARTY_START_Y: f32 = 150.0;
const PARTY_ROW_PITCH: f32 = 15.0;
const SHIPPING_COLUMN_X: f32 = 300.0;

const TABLE_TOP: f32 = 230.0;
const TABLE_HEADER_HEIGHT: f32 = 20.0;
const TABLE_BODY_OFFSET: f32 = 25.0;
const CELL_INSET: f32 = 5.0;
const COLUMNS: [(&str, f32, Align); 4] = [
    ("Product", 220.0, Align::Left),
    ("Qty", 60.0, Align::Center),
    ("Price", 80.0, Align::Right),
    ("Total", 80.0, Align::Right),
];

const TOTALS_GAP: f32 = 10.0;
const TOTALS_WIDTH: f32 = 180.0;
const TOTALS_HEIGHT: f32 = 70.0;
const PAYMENT_OFFSET: f32 = 80.0;
const PAYMENT_HEIGHT: f32 = 40.0;
const FOOTER_OFFSET: f32 = 50.0;
const FOOTER_HEIGHT: f32 = 20.0;

/// Where a table row landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
    pub index: usize,
    pub page: usize,
    pub y: f32,
    pub shaded: bool,
}

#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    pub pages: Vec<Page>,
    pub rows: Vec<RowPlacement>,
}

/// Lays out invoices onto fixed-geometry pages and serializes them to PDF.
pub struct InvoiceRenderer {
    config: PdfConfig,
}

impl Default for InvoiceRenderer {
    fn default() -> Self {
        InvoiceRenderer::new(PdfConfig::default())
    }
}

impl InvoiceRenderer {
    pub fn new(config: PdfConfig) -> Self {
        InvoiceRenderer { config }
    }

    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    /// Render a validated invoice to a complete PDF byte stream.
    pub fn render(&self, doc: &InvoiceDocument) -> ServiceResult<Vec<u8>> {
        let layout = self.layout(doc);
        let info = DocumentInfo {
            title: format!("Invoice {}", doc.invoice_number),
            author: doc.shop.name.clone(),
        };
        write_pdf(&self.config, &layout.pages, &info)
    }

    /// Same as [`render`](Self::render) but on the blocking thread pool.
    pub async fn render_blocking(self: Arc<Self>, doc: InvoiceDocument) -> ServiceResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || self.render(&doc))
            .await
            .map_err(|e| ServiceError::Generation(format!("Render task failed: {}", e)))?
    }

    pub fn layout(&self, doc: &InvoiceDocument) -> InvoiceLayout {
        let mut builder = PageBuilder::new(self.config.clone());

        self.draw_header(&mut builder, doc);
        self.draw_parties(&mut builder, doc);
        let rows = self.draw_items(&mut builder, &doc.items);
        let totals_y = self.draw_totals(&mut builder, doc);
        let payment_y = self.draw_payment(&mut builder, doc, totals_y);
        self.draw_footer(&mut builder, &doc.footer_note, payment_y);

        InvoiceLayout {
            pages: builder.finish(),
            rows,
        }
    }

    fn draw_header(&self, builder: &mut PageBuilder, doc: &InvoiceDocument) {
        let left = self.config.margin.left;
        let top = self.config.margin.top;

        builder.text("INVOICE", left, top, TextStyle::new(Font::Bold, 24.0, Color::TEXT));
        builder.text(
            &format!("#{}", doc.invoice_number),
            left,
            top + 30.0,
            TextStyle::new(Font::Bold, 12.0, Color::GRAY),
        );

        let shop_x = self.config.page_width() - SHOP_COLUMN_OFFSET;
        builder.text_box(
            &doc.shop.name,
            shop_x,
            top,
            SHOP_COLUMN_WIDTH,
            Align::Right,
            TextStyle::new(Font::Bold, 14.0, Color::TEXT),
        );
        let detail = TextStyle::new(Font::Bold, 10.0, Color::GRAY);
        for (line, offset) in [(&doc.shop.address, 20.0), (&doc.shop.email, 35.0), (&doc.shop.phone, 50.0)] {
            builder.text_box(line, shop_x, top + offset, SHOP_COLUMN_WIDTH, Align::Right, detail);
        }
    }

    fn draw_parties(&self, builder: &mut PageBuilder, doc: &InvoiceDocument) {
        let left = self.config.margin.left;
        let title = TextStyle::new(Font::Bold, 12.0, Color::TEXT);
        builder.text("Billing Details", left, PARTY_TITLE_Y, title);
        builder.text("Shipping Details", SHIPPING_COLUMN_X, PARTY_TITLE_Y, title);

        let body = TextStyle::new(Font::Regular, 10.0, Color::GRAY);
        let columns = [(left, doc.billing.lines()), (SHIPPING_COLUMN_X, doc.shipping_party.lines())];
        for (x, lines) in columns {
            for (row, line) in lines.iter().enumerate() {
                builder.text(line, x, PARTY_START_Y + row as f32 * PARTY_ROW_PITCH, body);
            }
        }
    }

    fn table_width(&self) -> f32 {
        self.config.content_width()
    }

    fn draw_table_header(&self, builder: &mut PageBuilder, top: f32) {
        let left = self.config.margin.left;
        builder.fill_rect(left, top, self.table_width(), TABLE_HEADER_HEIGHT, Color::LIGHT_GRAY);

        let style = TextStyle::new(Font::Bold, 10.0, Color::TEXT);
        let mut x = left;
        for (label, width, align) in COLUMNS {
            builder.text_box(label, x + CELL_INSET, top + CELL_INSET, width - 2.0 * CELL_INSET, align, style);
            x += width;
        }
    }

    fn draw_row(&self, builder: &mut PageBuilder, item: &InvoiceLineItem, y: f32, shaded: bool) {
        let left = self.config.margin.left;
        if shaded {
            builder.fill_rect(left, y - CELL_INSET, self.table_width(), self.config.row_height, Color::STRIPE);
        }

        let cells = [
            item.product.clone(),
            item.quantity.to_string(),
            self.config.format_money(item.price),
            self.config.format_money(item.total),
        ];
        let style = TextStyle::new(Font::Regular, 10.0, Color::TEXT);
        let mut x = left;
        for (cell, (_, width, align)) in cells.iter().zip(COLUMNS) {
            builder.text_box(cell, x + CELL_INSET, y, width - 2.0 * CELL_INSET, align, style);
            x += width;
        }
    }

    fn draw_items(&self, builder: &mut PageBuilder, items: &[InvoiceLineItem]) -> Vec<RowPlacement> {
        let row_height = self.config.row_height;
        let mut rows = Vec::with_capacity(items.len());

        self.draw_table_header(builder, TABLE_TOP);
        builder.move_to(TABLE_TOP + TABLE_BODY_OFFSET);

        for (index, item) in items.iter().enumerate() {
            if builder.state_for(builder.cursor().y, row_height) == PageState::NeedsNewPage {
                builder.add_page();
                let top = builder.cursor().y;
                self.draw_table_header(builder, top);
                builder.move_to(top + TABLE_BODY_OFFSET);
            }

            let cursor = builder.cursor();
            // Parity follows the absolute item index, so a page may open on an unshaded row.
            let shaded = index % 2 == 0;
            self.draw_row(builder, item, cursor.y, shaded);
            rows.push(RowPlacement {
                index,
                page: cursor.page,
                y: cursor.y,
                shaded,
            });
            builder.move_to(cursor.y + row_height);
        }

        rows
    }

    fn draw_totals(&self, builder: &mut PageBuilder, doc: &InvoiceDocument) -> f32 {
        let after_rows = builder.cursor().y + TOTALS_GAP;
        builder.move_to(after_rows);
        let y = builder.reserve(TOTALS_HEIGHT);
        let x = self.config.page_width() - self.config.margin.right - TOTALS_WIDTH;

        builder.fill_rect(x, y, TOTALS_WIDTH, TOTALS_HEIGHT, Color::LIGHT_GRAY);

        let regular = TextStyle::new(Font::Regular, 10.0, Color::TEXT);
        let bold = TextStyle::new(Font::Bold, 12.0, Color::TEXT);
        let amount_x = x + 100.0;
        let amount_width = TOTALS_WIDTH - 110.0;
        let lines = [
            ("Subtotal:", doc.subtotal, 10.0, regular),
            ("Shipping:", doc.shipping_cost, 25.0, regular),
            ("Total:", doc.total, 45.0, bold),
        ];
        for (label, amount, offset, style) in lines {
            builder.text(label, x + 10.0, y + offset, style);
            builder.text_box(&self.config.format_money(amount), amount_x, y + offset, amount_width, Align::Right, style);
        }

        y
    }

    fn draw_payment(&self, builder: &mut PageBuilder, doc: &InvoiceDocument, totals_y: f32) -> f32 {
        builder.move_to(totals_y + PAYMENT_OFFSET);
        let y = builder.reserve(PAYMENT_HEIGHT);
        let left = self.config.margin.left;

        builder.fill_rect(left, y, self.config.content_width(), PAYMENT_HEIGHT, Color::LIGHT_GRAY);
        let style = TextStyle::new(Font::Regular, 10.0, Color::TEXT);
        builder.text(&format!("Payment Method: {}", doc.payment_method), left + 10.0, y + 10.0, style);
        builder.text(&format!("Transaction ID: {}", doc.transaction_id), left + 10.0, y + 25.0, style);

        y
    }

    fn draw_footer(&self, builder: &mut PageBuilder, note: &str, payment_y: f32) {
        builder.move_to(payment_y + FOOTER_OFFSET);
        builder.reserve(FOOTER_HEIGHT);
        if note.trim().is_empty() {
            return;
        }
        builder.flow_text(
            note,
            self.config.margin.left,
            self.config.content_width(),
            Align::Center,
            TextStyle::new(Font::Regular, 9.0, Color::GRAY),
        );
    }
}
