//! A4 PDF rendering. Tables flow from page to page and repeat their header
//! row after every break.
//!
//! Text is drawn with an embedded TrueType face when one is available, so any
//! script the face covers comes out intact. Without one the writer falls back
//! to the built-in Helvetica, which only covers Latin-1. A character the
//! active face cannot draw fails the export.

use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};
use ttf_parser::{name_id, Face};

use crate::config::PDF_FONT_VAR;
use crate::error::{Error, Result};
use crate::report::{CellValue, Report, Table, DATETIME_FORMAT};

use super::PdfFont;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const TOP: f32 = PAGE_HEIGHT - MARGIN;
const BOTTOM: f32 = MARGIN + 20.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 14.0;
/// Rough advance width as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.55;

/// Unicode TrueType faces tried when no font is configured, as
/// (regular, bold) pairs.
const SYSTEM_FONTS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
    ("/Library/Fonts/Arial.ttf", "/Library/Fonts/Arial Bold.ttf"),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

struct FontFile {
    path: PathBuf,
    data: Vec<u8>,
}

impl FontFile {
    fn load(path: &Path) -> std::result::Result<Self, String> {
        let data = fs::read(path)
            .map_err(|err| format!("cannot read font '{}': {err}", path.display()))?;
        Ok(Self {
            path: path.to_owned(),
            data,
        })
    }
}

/// Resolve the configured font into (regular, bold) files. `None` means the
/// built-in Helvetica.
fn locate(choice: &PdfFont) -> Option<(PathBuf, Option<PathBuf>)> {
    match choice {
        PdfFont::Standard => None,
        PdfFont::File(path) => Some((path.clone(), None)),
        PdfFont::System => {
            let found = SYSTEM_FONTS
                .iter()
                .map(|(regular, bold)| (Path::new(regular), Path::new(bold)))
                .find(|(regular, _)| regular.is_file());
            match found {
                Some((regular, bold)) => Some((
                    regular.to_path_buf(),
                    bold.is_file().then(|| bold.to_path_buf()),
                )),
                None => {
                    warn!(
                        "no Unicode TrueType font found, PDF text is limited to Latin-1 \
                         (set {PDF_FONT_VAR} to embed one)"
                    );
                    None
                }
            }
        }
    }
}

/// Replace control characters (line breaks, tabs) with spaces.
fn printable(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

/// Map text to single WinAnsi bytes. Only the Latin-1 printable range maps
/// one to one; anything else is returned as the offending character.
fn latin1(text: &str) -> std::result::Result<Vec<u8>, char> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => Ok(code as u8),
            _ => Err(ch),
        })
        .collect()
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte-order mark
/// otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// A parsed TrueType face and the glyphs drawn with it so far.
struct Embedded<'a> {
    file: &'a FontFile,
    face: Face<'a>,
    name: String,
    /// Glyph id to (character, advance in thousandths of an em).
    used: BTreeMap<u16, (char, i64)>,
}

impl<'a> Embedded<'a> {
    fn parse(file: &'a FontFile) -> std::result::Result<Self, String> {
        let face = Face::parse(&file.data, 0)
            .map_err(|err| format!("cannot parse font '{}': {err}", file.path.display()))?;
        let name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| {
                name.chars()
                    .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
                    .collect::<String>()
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        Ok(Self {
            file,
            face,
            name,
            used: BTreeMap::new(),
        })
    }

    fn scale(&self, units: i64) -> i64 {
        units * 1000 / i64::from(self.face.units_per_em().max(1))
    }

    /// Two-byte glyph ids for Identity-H.
    fn encode(&mut self, text: &str) -> std::result::Result<Vec<u8>, char> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let glyph = self.face.glyph_index(ch).ok_or(ch)?;
            let advance = self.face.glyph_hor_advance(glyph).unwrap_or(0);
            let width = self.scale(i64::from(advance));
            self.used.entry(glyph.0).or_insert((ch, width));
            bytes.extend_from_slice(&glyph.0.to_be_bytes());
        }
        Ok(bytes)
    }
}

enum Typeface<'a> {
    /// One of the standard 14 Type1 faces with WinAnsi encoding.
    Standard(&'static str),
    Embedded(Box<Embedded<'a>>),
}

impl Typeface<'_> {
    fn encode(&mut self, text: &str) -> std::result::Result<Object, String> {
        let text = printable(text);
        match self {
            Typeface::Standard(base_font) => latin1(&text)
                .map(|bytes| Object::String(bytes, StringFormat::Literal))
                .map_err(|ch| {
                    format!(
                        "'{ch}' (U+{:04X}) is outside Latin-1 and cannot be drawn with the \
                         built-in {base_font}; set {PDF_FONT_VAR} to a Unicode TrueType font",
                        u32::from(ch)
                    )
                }),
            Typeface::Embedded(face) => face
                .encode(&text)
                .map(|bytes| Object::String(bytes, StringFormat::Hexadecimal))
                .map_err(|ch| {
                    format!(
                        "'{ch}' (U+{:04X}) has no glyph in font '{}'",
                        u32::from(ch),
                        face.file.path.display()
                    )
                }),
        }
    }
}

/// Regular and bold faces. Without a bold file the regular face stands in.
struct Faces<'a> {
    regular: Typeface<'a>,
    bold: Option<Typeface<'a>>,
}

impl<'a> Faces<'a> {
    fn standard() -> Self {
        Self {
            regular: Typeface::Standard("Helvetica"),
            bold: Some(Typeface::Standard("Helvetica-Bold")),
        }
    }

    fn embedded(
        regular: &'a FontFile,
        bold: Option<&'a FontFile>,
    ) -> std::result::Result<Self, String> {
        Ok(Self {
            regular: Typeface::Embedded(Box::new(Embedded::parse(regular)?)),
            bold: bold
                .map(|file| Embedded::parse(file).map(|face| Typeface::Embedded(Box::new(face))))
                .transpose()?,
        })
    }

    fn get(&mut self, font: Font) -> &mut Typeface<'a> {
        match (font, &mut self.bold) {
            (Font::Bold, Some(bold)) => bold,
            _ => &mut self.regular,
        }
    }

    fn resource(&self, font: Font) -> &'static [u8] {
        match (font, &self.bold) {
            (Font::Bold, Some(_)) => b"F2",
            _ => b"F1",
        }
    }
}

/// Cut `text` so it fits `width` points at `size`, marking the cut with `..`.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = ((width / (size * AVERAGE_GLYPH_WIDTH)) as usize).saturating_sub(1);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    cut.push_str("..");
    cut
}

/// Accumulates drawing operations page by page.
struct Pages<'a> {
    faces: Faces<'a>,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

type Drawn = std::result::Result<(), String>;

impl<'a> Pages<'a> {
    fn new(faces: Faces<'a>) -> Self {
        Self {
            faces,
            finished: Vec::new(),
            current: Vec::new(),
            y: TOP,
        }
    }

    fn break_page(&mut self) {
        self.finished.push(mem::take(&mut self.current));
        self.y = TOP;
    }

    fn has_room(&self, height: f32) -> bool {
        self.y - height >= BOTTOM
    }

    fn text_at(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) -> Drawn {
        let operations = text_operations(&mut self.faces, font, size, x, y, text)?;
        self.current.extend(operations);
        Ok(())
    }

    fn line(&mut self, font: Font, size: f32, text: &str, advance: f32) -> Drawn {
        self.text_at(font, size, MARGIN, self.y, text)?;
        self.y -= advance;
        Ok(())
    }

    fn rule(&mut self, y: f32) {
        self.current.extend([
            Operation::new("w", vec![0.5_f32.into()]),
            Operation::new("m", vec![MARGIN.into(), y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), y.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn row(&mut self, font: Font, cells: &[String]) -> Drawn {
        let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / cells.len().max(1) as f32;
        let y = self.y;
        for (index, cell) in cells.iter().enumerate() {
            let x = MARGIN + index as f32 * column_width;
            let text = fit(cell, column_width, BODY_SIZE);
            self.text_at(font, BODY_SIZE, x, y, &text)?;
        }
        self.y -= LINE_HEIGHT;
        Ok(())
    }

    fn header(&mut self, columns: &[String]) -> Drawn {
        self.row(Font::Bold, columns)?;
        self.rule(self.y + LINE_HEIGHT - 3.0);
        Ok(())
    }

    /// Close the last page and stamp page numbers.
    fn finish(self) -> std::result::Result<(Vec<Vec<Operation>>, Faces<'a>), String> {
        let Pages {
            mut faces,
            mut finished,
            current,
            ..
        } = self;
        finished.push(current);
        let total = finished.len();
        for (index, page) in finished.iter_mut().enumerate() {
            page.extend(text_operations(
                &mut faces,
                Font::Regular,
                BODY_SIZE,
                PAGE_WIDTH - MARGIN - 60.0,
                MARGIN,
                &format!("Page {} of {total}", index + 1),
            )?);
        }
        Ok((finished, faces))
    }
}

fn text_operations(
    faces: &mut Faces<'_>,
    font: Font,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
) -> std::result::Result<[Operation; 5], String> {
    let resource = faces.resource(font);
    let encoded = faces.get(font).encode(text)?;
    Ok([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(resource.to_vec()), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![encoded]),
        Operation::new("ET", vec![]),
    ])
}

fn lay_out_table(pages: &mut Pages<'_>, table: &Table) -> Drawn {
    // Heading, header row and at least one body row stay together.
    if !pages.has_room(HEADING_SIZE * 2.0 + LINE_HEIGHT * 2.0) {
        pages.break_page();
    }
    pages.line(Font::Bold, HEADING_SIZE, &table.name, HEADING_SIZE * 1.5)?;
    pages.header(&table.columns)?;

    if table.rows.is_empty() {
        pages.row(Font::Regular, &["No data".to_string()])?;
    }
    for row in &table.rows {
        if !pages.has_room(LINE_HEIGHT) {
            pages.break_page();
            pages.line(
                Font::Bold,
                HEADING_SIZE,
                &format!("{} (continued)", table.name),
                HEADING_SIZE * 1.5,
            )?;
            pages.header(&table.columns)?;
        }
        let cells: Vec<String> = row.iter().map(CellValue::to_string).collect();
        pages.row(Font::Regular, &cells)?;
    }
    pages.y -= LINE_HEIGHT;
    Ok(())
}

/// ToUnicode CMap so viewers can copy and search the glyph-id encoded text.
fn to_unicode_cmap(used: &BTreeMap<u16, (char, i64)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<_> = used.iter().collect();
    // A bfchar block holds at most 100 entries.
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (glyph, (ch, _)) in chunk {
            let mut units = [0u16; 2];
            let unicode: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{glyph:04X}> <{unicode}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn add_typeface(doc: &mut Document, typeface: &Typeface<'_>) -> lopdf::Result<ObjectId> {
    let face = match typeface {
        Typeface::Standard(base_font) => {
            return Ok(doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => *base_font,
                "Encoding" => "WinAnsiEncoding",
            }));
        }
        Typeface::Embedded(face) => face,
    };

    let mut file = Stream::new(
        dictionary! { "Length1" => face.file.data.len() as i64 },
        face.file.data.clone(),
    );
    file.compress()?;
    let file_id = doc.add_object(file);

    let metrics = &face.face;
    let bbox = metrics.global_bounding_box();
    let ascent = face.scale(i64::from(metrics.ascender()));
    let descriptor = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => face.name.as_str(),
        "Flags" => 32,
        "FontBBox" => vec![
            face.scale(i64::from(bbox.x_min)).into(),
            face.scale(i64::from(bbox.y_min)).into(),
            face.scale(i64::from(bbox.x_max)).into(),
            face.scale(i64::from(bbox.y_max)).into(),
        ],
        "ItalicAngle" => metrics.italic_angle(),
        "Ascent" => ascent,
        "Descent" => face.scale(i64::from(metrics.descender())),
        "CapHeight" => metrics
            .capital_height()
            .map(|height| face.scale(i64::from(height)))
            .unwrap_or(ascent),
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let mut widths: Vec<Object> = Vec::with_capacity(face.used.len() * 2);
    for (glyph, (_, width)) in &face.used {
        widths.push(i64::from(*glyph).into());
        widths.push(vec![Object::Integer(*width)].into());
    }
    let descendant = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => face.name.as_str(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => literal("Adobe"),
            "Ordering" => literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor,
        "DW" => 1000,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(&face.used).into_bytes(),
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => face.name.as_str(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![descendant.into()],
        "ToUnicode" => to_unicode,
    }))
}

fn pdf_date(report: &Report) -> String {
    report.generated_at.format("D:%Y%m%d%H%M%S").to_string()
}

fn draw(report: &Report, font: &PdfFont) -> std::result::Result<Vec<u8>, String> {
    let (regular, bold) = match locate(font) {
        Some((regular, bold)) => (
            Some(FontFile::load(&regular)?),
            bold.as_deref().map(FontFile::load).transpose()?,
        ),
        None => (None, None),
    };
    let faces = match &regular {
        Some(regular) => Faces::embedded(regular, bold.as_ref())?,
        None => Faces::standard(),
    };

    let mut pages = Pages::new(faces);
    pages.line(Font::Bold, TITLE_SIZE, &report.title, TITLE_SIZE * 1.5)?;
    pages.line(
        Font::Regular,
        BODY_SIZE,
        &format!("Generated {}", report.generated_at.format(DATETIME_FORMAT)),
        LINE_HEIGHT * 2.0,
    )?;
    for table in &report.tables {
        lay_out_table(&mut pages, table)?;
    }
    let (pages, faces) = pages.finish()?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut fonts = Dictionary::new();
    fonts.set(
        "F1",
        add_typeface(&mut doc, &faces.regular).map_err(|err| err.to_string())?,
    );
    if let Some(bold) = &faces.bold {
        fonts.set(
            "F2",
            add_typeface(&mut doc, bold).map_err(|err| err.to_string())?,
        );
    }
    let resources = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|err| err.to_string())?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
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
            "Resources" => resources,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info = doc.add_object(dictionary! {
        "Title" => text_string(&report.title),
        "Producer" => literal("troupe-ledger"),
        "CreationDate" => literal(&pdf_date(report)),
    });
    doc.trailer.set("Root", catalog);
    doc.trailer.set("Info", info);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|err| err.to_string())?;
    debug!("rendered {} PDF page(s), {} bytes", page_count, bytes.len());
    Ok(bytes)
}

/// Render the whole report into PDF bytes. `destination` only labels errors.
pub(super) fn render(report: &Report, destination: &Path, font: &PdfFont) -> Result<Vec<u8>> {
    draw(report, font).map_err(|reason| Error::export(destination, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_font() -> FontFile {
        FontFile::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans.ttf"))
            .unwrap()
    }

    #[test]
    fn latin1_rejects_what_helvetica_cannot_draw() {
        assert_eq!(latin1("Café"), Ok(b"Caf\xe9".to_vec()));
        assert_eq!(latin1("Гамлет"), Err('Г'));

        let mut helvetica = Typeface::Standard("Helvetica");
        let reason = helvetica.encode("Отчёт").unwrap_err();
        assert!(reason.contains("U+041E"), "{reason}");
        assert!(reason.contains(PDF_FONT_VAR), "{reason}");
    }

    #[test]
    fn embedded_faces_encode_glyph_ids_and_record_widths() {
        let file = fixture_font();
        let mut face = Embedded::parse(&file).unwrap();
        assert_eq!(face.name, "DejaVuSans");

        let encoded = face.encode("Иван").unwrap();
        assert_eq!(encoded.len(), 8);
        assert_eq!(face.used.len(), 4);
        assert!(face.used.values().any(|(ch, width)| *ch == 'И' && *width > 0));

        let cmap = to_unicode_cmap(&face.used);
        assert!(cmap.contains("<0418>"), "{cmap}");
        assert!(cmap.contains("4 beginbfchar"));
    }

    #[test]
    fn control_characters_print_as_spaces() {
        assert_eq!(printable("Act I\n\tScene 2"), "Act I  Scene 2");
        let mut helvetica = Typeface::Standard("Helvetica");
        assert!(helvetica.encode("line one\nline two").is_ok());
    }

    #[test]
    fn titles_outside_ascii_become_utf16() {
        assert_eq!(
            text_string("Plays"),
            Object::String(b"Plays".to_vec(), StringFormat::Literal)
        );
        assert_eq!(
            text_string("Я"),
            Object::String(vec![0xFE, 0xFF, 0x04, 0x2F], StringFormat::Hexadecimal)
        );
    }

    #[test]
    fn long_cells_are_cut_to_the_column() {
        let text = "x".repeat(200);
        let fitted = fit(&text, 50.0, BODY_SIZE);
        assert!(fitted.ends_with(".."));
        assert!(fitted.chars().count() < 20);
        assert_eq!(fit("Hamlet", 100.0, BODY_SIZE), "Hamlet");
    }
}
