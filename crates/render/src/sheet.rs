//! Sticker sheet rendering.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, dictionary};
use thiserror::Error;

use labelforge_labels::Sticker;

use crate::layout::{SheetLayout, Slot};
use crate::text::{chars_per_line, truncate_lines, win_ansi, wrap};

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const LINE_SPACING: f32 = 1.25;
const DATE_FORMAT: &str = "%d-%m-%Y";
const MAX_TITLE_LINES: usize = 2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf encoding failed: {0}")]
    Pdf(String),
    /// Required label text is taller than the slot.
    #[error("{field} for {product:?} does not fit on a {height:.0}pt label")]
    DoesNotFit {
        product: String,
        field: &'static str,
        height: f32,
    },
}

struct Line {
    font: &'static str,
    size: f32,
    text: String,
}

/// Render `stickers` in order onto as many sheets as needed.
///
/// An empty slice yields a valid document with no pages.
pub fn render_stickers(stickers: &[Sticker], layout: &SheetLayout) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
        },
    });

    let frame = LabelFrame::new(layout);
    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages_for(stickers.len()));
    for (page_no, page) in stickers.chunks(layout.slots_per_page()).enumerate() {
        let mut operations = Vec::new();
        for (i, sticker) in page.iter().enumerate() {
            let slot = layout.slot(page_no * layout.slots_per_page() + i);
            let lines = sticker_lines(sticker, layout, &frame)?;
            draw_sticker(&mut operations, &lines, slot, layout);
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), layout.page_width.into(), layout.page_height.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    tracing::debug!(stickers = stickers.len(), pages = count, bytes = bytes.len(), "rendered sticker sheet");
    Ok(bytes)
}

/// Text block of one slot, sized to fit inside its padding.
struct LabelFrame {
    height: f32,
    title_chars: usize,
    body_chars: usize,
}

impl LabelFrame {
    fn new(layout: &SheetLayout) -> Self {
        let width = layout.slot_width() - 2.0 * layout.padding;
        Self {
            height: layout.slot_height() - 2.0 * layout.padding,
            title_chars: chars_per_line(width, layout.title_size),
            body_chars: chars_per_line(width, layout.body_size),
        }
    }
}

/// Lines for one sticker: fixed fields first, then the free-text fields in
/// whatever room is left, truncated if they overflow.
fn sticker_lines(sticker: &Sticker, layout: &SheetLayout, frame: &LabelFrame) -> Result<Vec<Line>, RenderError> {
    let body = |text: String| Line {
        font: REGULAR,
        size: layout.body_size,
        text,
    };
    let body_height = layout.body_size * LINE_SPACING;

    let mut lines: Vec<Line> = truncate_lines(wrap(&sticker.product_name, frame.title_chars), MAX_TITLE_LINES, frame.title_chars)
        .into_iter()
        .map(|text| Line {
            font: BOLD,
            size: layout.title_size,
            text,
        })
        .collect();

    let fixed = [
        ("price", format!("Price: {}", sticker.rate)),
        ("mfg date", format!("Mfg. Date: {}", sticker.mfg_date.format(DATE_FORMAT))),
        ("exp date", format!("Exp. Date: {}", sticker.exp_date.format(DATE_FORMAT))),
        ("net weight", format!("Net Wt: {}", sticker.net_weight)),
        ("batch number", format!("Batch No: {}", sticker.batch_number)),
        ("allergens", labelled("Allergens", &sticker.allergen_information)),
    ];
    let mut used: f32 = lines.iter().map(|l| l.size * LINE_SPACING).sum();
    for (field, text) in fixed {
        if text.is_empty() {
            continue;
        }
        for text in wrap(&text, frame.body_chars) {
            used += body_height;
            if used > frame.height {
                return Err(does_not_fit(sticker, field, frame));
            }
            lines.push(body(text));
        }
    }

    let free: Vec<(&'static str, Vec<String>)> = [
        ("ingredients", labelled("Ingredients", &sticker.ingredients)),
        ("nutritional facts", labelled("Nutritional Facts", &sticker.nutritional_facts)),
    ]
    .into_iter()
    .filter(|(_, text)| !text.is_empty())
    .map(|(field, text)| (field, wrap(&text, frame.body_chars)))
    .collect();

    let budget = ((frame.height - used) / body_height).floor().max(0.0) as usize;
    if let Some((field, _)) = free.get(budget) {
        return Err(does_not_fit(sticker, *field, frame));
    }

    let wanted: Vec<usize> = free.iter().map(|(_, l)| l.len()).collect();
    for ((_, wrapped), keep) in free.into_iter().zip(share_lines(&wanted, budget)) {
        lines.extend(
            truncate_lines(wrapped, keep, frame.body_chars)
                .into_iter()
                .map(body),
        );
    }
    Ok(lines)
}

fn labelled(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("{label}: {}", value.trim())
    }
}

fn does_not_fit(sticker: &Sticker, field: &'static str, frame: &LabelFrame) -> RenderError {
    RenderError::DoesNotFit {
        product: sticker.product_name.clone(),
        field,
        height: frame.height,
    }
}

/// Split `budget` lines between fields wanting `wanted[i]` lines, evenly,
/// handing unused share to the fields that still want more.
fn share_lines(wanted: &[usize], budget: usize) -> Vec<usize> {
    let mut granted = vec![0; wanted.len()];
    let mut left = budget;
    loop {
        let open: Vec<usize> = (0..wanted.len()).filter(|&i| granted[i] < wanted[i]).collect();
        if open.is_empty() || left == 0 {
            return granted;
        }
        let share = (left / open.len()).max(1);
        for i in open {
            let add = share.min(wanted[i] - granted[i]).min(left);
            granted[i] += add;
            left -= add;
        }
    }
}

fn draw_sticker(ops: &mut Vec<Operation>, lines: &[Line], slot: Slot, layout: &SheetLayout) {
    if layout.outline {
        ops.push(Operation::new("w", vec![0.25_f32.into()]));
        ops.push(Operation::new(
            "re",
            vec![slot.x.into(), slot.y.into(), slot.width.into(), slot.height.into()],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    let left = slot.x + layout.padding;
    let mut cursor = slot.y + slot.height - layout.padding;

    for line in lines {
        cursor -= line.size * LINE_SPACING;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![line.font.into(), line.size.into()]));
        ops.push(Operation::new("Td", vec![left.into(), cursor.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]));
        ops.push(Operation::new("ET", vec![]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use labelforge_core::ProductId;
    use labelforge_labels::{BatchNumber, ProductionDates, Product, Quantity, StickerBatch};
    use rust_decimal::Decimal;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            rate: Decimal::new(4550, 2),
            shelf_life_days: 90,
            net_weight: "200 g".to_string(),
            ingredients: "Whole wheat flour, jaggery, ghee, cardamom, cashew nuts, raisins".to_string(),
            nutritional_facts: "Energy 450 kcal, Protein 8 g, Fat 20 g, Carbohydrate 60 g".to_string(),
            allergen_information: "Contains gluten, dairy and tree nuts".to_string(),
        }
    }

    fn batch(p: &Product, batch: &str, qty: u32) -> Vec<Sticker> {
        let dates = ProductionDates::defaults(p, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()).unwrap();
        StickerBatch::assemble(p, dates, BatchNumber::from_stored(batch.to_string()), Quantity::new(qty).unwrap())
            .stickers
    }

    fn text_runs(pdf: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .map(|op| String::from_utf8_lossy(op.operands[0].as_str().unwrap()).into_owned())
                    .collect()
            })
            .collect()
    }

    fn batch_lines(pdf: &[u8]) -> Vec<String> {
        text_runs(pdf)
            .into_iter()
            .flatten()
            .filter(|t| t.starts_with("Batch No: "))
            .collect()
    }

    #[test]
    fn empty_input_renders_zero_pages() {
        let pdf = render_stickers(&[], &SheetLayout::a4_8_up()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn one_slot_per_sticker_across_pages() {
        let p = product(1, "Atta Ladoo");
        let stickers = batch(&p, "ATT-20261019-001", 11);

        let pdf = render_stickers(&stickers, &SheetLayout::a4_8_up()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        assert_eq!(doc.get_pages().len(), 2);
        let lines = batch_lines(&pdf);
        assert_eq!(lines.len(), 11);
        assert!(lines.iter().all(|l| l == "Batch No: ATT-20261019-001"));
    }

    #[test]
    fn sticker_prints_every_field() {
        let p = product(1, "Atta Ladoo");
        let pdf = render_stickers(&batch(&p, "ATT-20261019-001", 1), &SheetLayout::a4_8_up()).unwrap();
        let runs = text_runs(&pdf).concat();

        assert_eq!(runs[0], "Atta Ladoo");
        assert!(runs.contains(&"Price: 45.50".to_string()));
        assert!(runs.contains(&"Mfg. Date: 19-10-2026".to_string()));
        assert!(runs.contains(&"Exp. Date: 17-01-2027".to_string()));
        assert!(runs.contains(&"Net Wt: 200 g".to_string()));
        assert!(runs.iter().any(|r| r.starts_with("Ingredients: ")));
        assert!(runs.iter().any(|r| r.starts_with("Nutritional Facts: ")));
        assert!(runs.iter().any(|r| r.starts_with("Allergens: ")));
    }

    #[test]
    fn interleaved_products_keep_input_order() {
        let a = product(1, "Atta Ladoo");
        let b = product(2, "Besan Barfi");
        let mut stickers = batch(&a, "ATT-20261019-001", 2);
        stickers.extend(batch(&b, "BES-20261019-001", 3));

        let pdf = render_stickers(&stickers, &SheetLayout::a4_8_up()).unwrap();
        assert_eq!(
            batch_lines(&pdf),
            vec![
                "Batch No: ATT-20261019-001",
                "Batch No: ATT-20261019-001",
                "Batch No: BES-20261019-001",
                "Batch No: BES-20261019-001",
                "Batch No: BES-20261019-001",
            ]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = product(1, "Atta Ladoo");
        let stickers = batch(&p, "ATT-20261019-001", 5);
        let layout = SheetLayout::a4_8_up();
        assert_eq!(
            render_stickers(&stickers, &layout).unwrap(),
            render_stickers(&stickers, &layout).unwrap()
        );
    }

    fn long_ingredients() -> String {
        [
            "rolled oats", "almonds", "cashews", "pumpkin seeds", "sunflower seeds", "dates",
            "coconut flakes", "sea salt", "honey", "oat clusters (oats, sugar, palm oil)",
            "dried cranberries (cranberries, sugar, sunflower oil)", "cocoa nibs",
        ]
        .repeat(8)
        .join(", ")
    }

    #[test]
    fn overflowing_ingredients_are_truncated_and_allergens_kept() {
        let mut p = product(1, "Trail Mix");
        p.ingredients = long_ingredients();
        assert!(p.ingredients.len() > 1_000);
        let layout = SheetLayout::a4_8_up();

        let pdf = render_stickers(&batch(&p, "TRA-20261019-001", 1), &layout).unwrap();
        let runs = text_runs(&pdf).concat();

        assert!(runs.contains(&"Allergens: Contains gluten, dairy and tree nuts".to_string()));
        assert!(runs.iter().any(|r| r.starts_with("Nutritional Facts: ")));
        assert!(runs.iter().any(|r| r.starts_with("Ingredients: ")));
        assert!(runs.iter().any(|r| r.ends_with("...")));

        let frame = LabelFrame::new(&layout);
        let height = layout.title_size * LINE_SPACING + (runs.len() - 1) as f32 * layout.body_size * LINE_SPACING;
        assert!(height <= frame.height, "{height} > {}", frame.height);
    }

    #[test]
    fn allergens_that_cannot_fit_fail_the_render() {
        let mut p = product(1, "Trail Mix");
        p.allergen_information = "May contain traces of peanuts. ".repeat(80);

        let err = render_stickers(&batch(&p, "TRA-20261019-001", 1), &SheetLayout::a4_8_up()).unwrap_err();
        assert!(matches!(err, RenderError::DoesNotFit { field: "allergens", .. }));
    }

    #[test]
    fn long_titles_wrap_inside_the_slot() {
        let name = "Organic Stone Ground Whole Wheat Jaggery Cookies With Roasted Almonds And Cardamom Family Pack";
        let mut p = product(1, name);
        p.net_weight = "12 packs of 25 g each, individually wrapped, in a recyclable outer carton of 300 g".to_string();
        let layout = SheetLayout::a4_8_up();
        let frame = LabelFrame::new(&layout);

        let pdf = render_stickers(&batch(&p, "ORG-20261019-001", 1), &layout).unwrap();
        let runs = text_runs(&pdf).concat();
        let title: Vec<&String> = runs.iter().take_while(|r| !r.starts_with("Price: ")).collect();

        assert!(!title.is_empty() && title.len() <= MAX_TITLE_LINES);
        assert!(title.iter().all(|r| r.chars().count() <= frame.title_chars));
        assert!(runs.iter().all(|r| r.chars().count() <= frame.body_chars));
        assert!(runs.iter().any(|r| r.starts_with("Net Wt: 12 packs")));
        assert!(runs.iter().any(|r| r.ends_with("carton of 300 g")));
    }

    #[test]
    fn free_text_lines_are_shared_evenly() {
        assert_eq!(share_lines(&[20, 3], 10), vec![7, 3]);
        assert_eq!(share_lines(&[20, 20], 9), vec![5, 4]);
        assert_eq!(share_lines(&[2, 1], 10), vec![2, 1]);
        assert_eq!(share_lines(&[], 4), Vec::<usize>::new());
    }
}
