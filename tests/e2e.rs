//! End-to-end integration tests for universal-convert.
//!
//! Every fixture is generated inside the test. Tests that need the pdfium
//! shared library or LibreOffice skip themselves when the dependency is
//! missing, so the suite runs anywhere.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   cargo test --test e2e test_slice -- --nocapture

use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use universal_convert::pipeline::docx::{write_docx, PageSize};
use universal_convert::pipeline::render;
use universal_convert::pipeline::tables::Table;
use universal_convert::pipeline::xlsx::write_workbook;
use universal_convert::{
    capabilities_for, default_slice_output_path, slice, ConversionOutcome, ConversionRequest,
    ConvertError, ConvertedOutput, Converter, ConverterConfig, FailureKind, FormatTag, PageRange,
    Platform, CAPABILITY_MATRIX,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless pdfium can be bound.
macro_rules! e2e_skip_unless_pdfium {
    () => {{
        if !render::is_available(&ConverterConfig::default()) {
            println!("SKIP — pdfium not found; set PDFIUM_LIB_PATH to run this test");
            return;
        }
    }};
}

/// Skip this test unless an office renderer is installed; yields the platform.
macro_rules! e2e_skip_unless_office {
    () => {{
        let platform = Platform::detect(&ConverterConfig::default());
        if platform.office_program().is_none() {
            println!("SKIP — LibreOffice not found; set UCONVERT_SOFFICE to run this test");
            return;
        }
        platform
    }};
}

fn offline_converter() -> Converter {
    Converter::with_platform(ConverterConfig::default(), Platform::none())
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Write a PDF whose page `n` shows the text lines produced by `lines(n)`,
/// each line a list of `(x, text)` runs at a shared baseline.
fn write_text_pdf(path: &Path, pages: u32, lines: impl Fn(u32) -> Vec<Vec<(i32, String)>>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let mut content = String::new();
        for (row, runs) in lines(n).iter().enumerate() {
            let y = 720 - 24 * row as i32;
            for (x, text) in runs {
                content.push_str(&format!("BT /F1 12 Tf {x} {y} Td ({text}) Tj ET\n"));
            }
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn numbered_pdf(path: &Path, pages: u32) {
    write_text_pdf(path, pages, |n| vec![vec![(72, format!("Page {n}"))]]);
}

fn table_pdf(path: &Path) {
    write_text_pdf(path, 1, |_| {
        vec![
            vec![(72, "Quarterly figures".to_string())],
            vec![(72, "Item".into()), (260, "Qty".into()), (400, "Price".into())],
            vec![(72, "Apples".into()), (260, "12".into()), (400, "3.50".into())],
            vec![(72, "Pears".into()), (260, "7".into()), (400, "4.25".into())],
        ]
    });
}

/// Two pages, one three-column table on each.
fn two_table_pdf(path: &Path) {
    write_text_pdf(path, 2, |n| {
        if n == 1 {
            vec![
                vec![(72, "Region".into()), (260, "Units".into()), (400, "Revenue".into())],
                vec![(72, "North".into()), (260, "40".into()), (400, "1,200".into())],
                vec![(72, "South".into()), (260, "25".into()), (400, "830".into())],
            ]
        } else {
            vec![
                vec![(72, "Code".into()), (260, "Stock".into()), (400, "Shelf".into())],
                vec![(72, "A1".into()), (260, "3".into()), (400, "007".into())],
                vec![(72, "B2".into()), (260, "9".into()), (400, "012".into())],
            ]
        }
    });
}

fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

fn png_fixture(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            image::Rgba([200, 30, 30, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    })
    .save(path)
    .unwrap();
}

// ── Dispatcher: routing and validation ──────────────────────────────────────

#[test]
fn test_every_pair_outside_the_matrix_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let conv = offline_converter();
    let mut checked = 0;

    for cap in CAPABILITY_MATRIX {
        let input = dir.path().join(format!("source.{}", cap.input));
        std::fs::write(&input, b"contents are never read").unwrap();
        for target in FormatTag::ALL {
            if capabilities_for(cap.input).contains(&target) {
                continue;
            }
            let out = dir.path().join(format!("target.{target}"));
            let outcome = conv
                .convert(&ConversionRequest::new(&input, &out, target))
                .unwrap();
            assert!(!outcome.is_converted(), "{} → {target}", cap.input);
            assert!(outcome.message().contains("not supported"));
            checked += 1;
        }
    }

    assert!(checked > 30, "only {checked} pairs checked");
    // nothing but the inputs
    assert!(file_names(dir.path()).iter().all(|n| n.starts_with("source.")));
}

#[test]
fn test_missing_input_fails_before_anything_runs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.pdf");
    let e = offline_converter()
        .convert(&ConversionRequest::new(dir.path().join("x.png"), &out, FormatTag::Pdf))
        .unwrap_err();
    assert!(matches!(e, ConvertError::InvalidFile { .. }), "{e}");
    assert!(!out.exists());
}

#[test]
fn test_uppercase_extension_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PHOTO.PNG");
    png_fixture(&input, 8, 8);
    let out = dir.path().join("photo.jpg");

    let outcome = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Jpg))
        .unwrap();
    assert!(outcome.is_converted());
    assert_eq!(image::open(&out).unwrap().width(), 8);
}

// ── Image conversions ───────────────────────────────────────────────────────

#[test]
fn test_png_to_jpg_flattens_transparency_onto_white() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("half.png");
    png_fixture(&input, 20, 10);
    let out = dir.path().join("half.jpg");

    offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Jpg))
        .unwrap();

    let rgb = image::open(&out).unwrap().to_rgb8();
    assert_eq!(rgb.dimensions(), (20, 10));
    let px = rgb.get_pixel(17, 5);
    assert!(px.0.iter().all(|&c| c > 240), "transparent area should be white, got {px:?}");
}

#[test]
fn test_png_to_pdf_is_a_single_page_of_the_image_size() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wide.png");
    png_fixture(&input, 192, 96);
    let out = dir.path().join("wide.pdf");

    let outcome = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Pdf))
        .unwrap();
    assert_eq!(outcome.output(), Some(&ConvertedOutput::SingleFile(out.clone())));

    let doc = Document::load(&out).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = doc.get_dictionary(pages[&1]).unwrap();
    let media: Vec<f32> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect();
    // 96 px/in → 72 pt/in
    assert_eq!(media, [0.0, 0.0, 144.0, 72.0]);
}

#[test]
fn test_corrupt_image_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.jpg");
    std::fs::write(&input, b"\xFF\xD8\xFF\xE0 definitely not a jpeg").unwrap();
    let out = dir.path().join("broken.png");

    let e = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Png))
        .unwrap_err();
    assert_eq!(e.kind(), FailureKind::Delegate);
    assert_eq!(file_names(dir.path()), ["broken.jpg"]);
}

// ── Spreadsheet export ──────────────────────────────────────────────────────

#[test]
fn test_xlsx_to_csv_exports_first_sheet_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ledger.xlsx");
    let tables = [
        Table {
            page: 1,
            rows: vec![
                vec!["account".into(), "balance".into()],
                vec!["cash".into(), "1,250".into()],
                vec!["notes \"q1\"".into(), "-3.5".into()],
            ],
        },
        Table {
            page: 2,
            rows: vec![vec!["ignored".into(), "sheet".into()], vec!["x".into(), "y".into()]],
        },
    ];
    write_workbook(std::fs::File::create(&input).unwrap(), &tables).unwrap();
    let out = dir.path().join("ledger.csv");

    offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Csv))
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "account,balance\ncash,1250\n\"notes \"\"q1\"\"\",-3.5\n"
    );
}

#[test]
fn test_xlsx_that_is_not_a_zip_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fake.xlsx");
    std::fs::write(&input, b"plain text").unwrap();
    let out = dir.path().join("fake.csv");

    let e = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Csv))
        .unwrap_err();
    assert_eq!(e.kind(), FailureKind::Delegate);
    assert!(!out.exists());
}

// ── Page slicing ────────────────────────────────────────────────────────────

#[test]
fn test_slice_middle_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pdf");
    numbered_pdf(&input, 10);
    let out = default_slice_output_path(&input, PageRange::new(2, 4).unwrap());
    assert_eq!(out.file_name().unwrap(), "report_pages_2_to_4.pdf");

    let written = slice(&input, "2", "4", &out).unwrap();
    assert_eq!(written, out);

    let original = page_texts(&input);
    let sliced = page_texts(&out);
    assert_eq!(sliced.len(), 3);
    assert_eq!(sliced, original[1..4]);
    assert!(sliced[0].contains("(Page 2)"));
    assert!(sliced[2].contains("(Page 4)"));
}

#[test]
fn test_slice_rejects_bad_ranges_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    numbered_pdf(&input, 3);
    let out = dir.path().join("part.pdf");

    let reversed = slice(&input, "5", "3", &out).unwrap_err();
    assert!(reversed.to_string().starts_with("invalid page range"));

    let text = slice(&input, "a", "2", &out).unwrap_err();
    assert!(text.to_string().starts_with("start and end page must be integers"));

    let zero = slice(&input, "0", "2", &out).unwrap_err();
    assert!(matches!(zero, ConvertError::InvalidPageRange { .. }));

    let beyond = slice(&input, "2", "9", &out).unwrap_err();
    assert!(matches!(beyond, ConvertError::PageOutOfRange { total: 3, .. }));

    for e in [reversed, text, zero, beyond] {
        assert_eq!(e.kind(), FailureKind::Validation);
    }
    assert_eq!(file_names(dir.path()), ["doc.pdf"]);
}

#[test]
fn test_slice_of_non_pdf_is_a_delegate_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.pdf");
    std::fs::write(&input, b"this is not a pdf").unwrap();

    let e = slice(&input, "1", "1", dir.path().join("o.pdf")).unwrap_err();
    assert!(matches!(e, ConvertError::CorruptPdf { .. }), "{e}");
}

// ── pdfium-backed conversions (gated) ───────────────────────────────────────

#[test]
fn test_pdf_to_png_writes_one_file_per_page() {
    e2e_skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pdf");
    numbered_pdf(&input, 3);
    let out_dir = dir.path().join("pages");
    std::fs::create_dir(&out_dir).unwrap();

    let config = ConverterConfig::builder().dpi(72).build().unwrap();
    let outcome = Converter::with_platform(config, Platform::none())
        .convert(&ConversionRequest::new(&input, &out_dir, FormatTag::Png))
        .unwrap();

    let Some(ConvertedOutput::MultiFile(paths)) = outcome.output() else {
        panic!("expected multi-file output, got {outcome:?}");
    };
    assert_eq!(paths.len(), 3);
    assert_eq!(file_names(&out_dir), ["1.png", "2.png", "3.png"]);
    let first = image::open(&paths[0]).unwrap();
    assert_eq!((first.width(), first.height()), (612, 792));
}

#[test]
fn test_pdf_to_jpg_into_a_new_directory() {
    e2e_skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pdf");
    numbered_pdf(&input, 2);
    // trailing separator: "pages" does not exist yet and must be created
    let requested = format!("{}/pages/", dir.path().display());

    let config = ConverterConfig::builder().dpi(72).build().unwrap();
    let outcome = Converter::with_platform(config, Platform::none())
        .convert(&ConversionRequest::new(&input, &requested, FormatTag::Jpg))
        .unwrap();

    let pages = dir.path().join("pages");
    assert_eq!(outcome.output().unwrap().paths().len(), 2);
    assert_eq!(file_names(&pages), ["1.jpg", "2.jpg"]);
    assert_eq!(file_names(dir.path()), ["deck.pdf", "pages"]);
    let first = image::open(pages.join("1.jpg")).unwrap();
    assert_eq!((first.width(), first.height()), (612, 792));
}

#[test]
fn test_failed_rasterisation_leaves_no_pages() {
    e2e_skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, b"%PDF-1.5\nnot really a pdf").unwrap();
    let out_dir = dir.path().join("pages");
    std::fs::create_dir(&out_dir).unwrap();

    let e = offline_converter()
        .convert(&ConversionRequest::new(&input, &out_dir, FormatTag::Jpeg))
        .unwrap_err();
    assert!(matches!(e, ConvertError::CorruptPdf { .. }), "{e}");
    assert!(file_names(&out_dir).is_empty());
}

#[test]
fn test_pdf_to_docx_keeps_text_in_order() {
    e2e_skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("memo.pdf");
    numbered_pdf(&input, 2);
    let out = dir.path().join("memo.docx");

    offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Docx))
        .unwrap();

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("word/document.xml").unwrap(), &mut xml)
        .unwrap();
    let p1 = xml.find("Page 1").expect("page 1 text");
    let p2 = xml.find("Page 2").expect("page 2 text");
    assert!(p1 < p2);
    assert!(xml.contains(r#"w:type="page""#));
}

#[test]
fn test_pdf_to_xlsx_extracts_the_table() {
    e2e_skip_unless_pdfium!();
    use calamine::{open_workbook_auto, Data, Reader};

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("figures.pdf");
    table_pdf(&input);
    let out = dir.path().join("figures.xlsx");

    offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Xlsx))
        .unwrap();

    let mut wb = open_workbook_auto(&out).unwrap();
    assert_eq!(wb.sheet_names(), ["Sheet1"]);
    let range = wb.worksheet_range("Sheet1").unwrap();
    assert_eq!(range.get_size(), (3, 3));
    assert_eq!(range.get((0, 0)), Some(&Data::String("Item".into())));
    assert_eq!(range.get((1, 1)), Some(&Data::Float(12.0)));
    assert_eq!(range.get((2, 2)), Some(&Data::Float(4.25)));
}

#[test]
fn test_pdf_with_two_tables_yields_two_sheets() {
    e2e_skip_unless_pdfium!();
    use calamine::{open_workbook_auto, Data, Reader};

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("inventory.pdf");
    two_table_pdf(&input);
    let out = dir.path().join("inventory.xlsx");

    offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Xlsx))
        .unwrap();

    let mut wb = open_workbook_auto(&out).unwrap();
    assert_eq!(wb.sheet_names(), ["Sheet1", "Sheet2"]);

    let first = wb.worksheet_range("Sheet1").unwrap();
    assert_eq!(first.get((0, 0)), Some(&Data::String("Region".into())));
    assert_eq!(first.get((1, 2)), Some(&Data::Float(1200.0)));

    let second = wb.worksheet_range("Sheet2").unwrap();
    assert_eq!(second.get((0, 0)), Some(&Data::String("Code".into())));
    assert_eq!(second.get((1, 1)), Some(&Data::Float(3.0)));
    assert_eq!(second.get((1, 2)), Some(&Data::String("007".into())));
}

#[test]
fn test_pdf_without_tables_reports_no_tables_found() {
    e2e_skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prose.pdf");
    numbered_pdf(&input, 2);
    let out = dir.path().join("prose.xlsx");

    let e = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Xlsx))
        .unwrap_err();
    assert!(e.to_string().starts_with("no tables found"), "{e}");
    assert!(!out.exists());
}

// ── Office-backed conversions (gated) ───────────────────────────────────────

#[test]
fn test_office_pairs_report_platform_unavailable_without_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    write_docx(
        std::fs::File::create(&input).unwrap(),
        &[vec!["Dear reader".into()]],
        PageSize::default(),
    )
    .unwrap();
    let out = dir.path().join("letter.pdf");

    let e = offline_converter()
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Pdf))
        .unwrap_err();
    assert_eq!(e.kind(), FailureKind::PlatformUnavailable);
    assert!(!out.exists());
}

#[test]
fn test_docx_to_pdf_with_libreoffice() {
    let platform = e2e_skip_unless_office!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    write_docx(
        std::fs::File::create(&input).unwrap(),
        &[vec!["Dear reader".into()], vec!["Second page".into()]],
        PageSize::default(),
    )
    .unwrap();
    let out = dir.path().join("converted/letter.pdf");

    let outcome = Converter::with_platform(ConverterConfig::default(), platform)
        .convert(&ConversionRequest::new(&input, &out, FormatTag::Pdf))
        .unwrap();
    assert!(matches!(outcome, ConversionOutcome::Converted { .. }));
    assert!(Document::load(&out).unwrap().get_pages().len() >= 1);
    assert_eq!(file_names(out.parent().unwrap()), ["letter.pdf"]);
}
