//! SpreadsheetML package serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Workbook, Worksheet};
use crate::error::{Error, Result};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Cell style indices into `cellXfs` of [`STYLES_XML`].
const STYLE_HEADER: &str = "1";
const STYLE_WRAP: &str = "2";

/// Most characters a single cell holds.
const MAX_CELL_CHARS: usize = 32767;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment vertical="top" wrapText="1"/></xf></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// A relationship to write into a `.rels` part.
struct Relationship<'a> {
    id: String,
    rel_type: &'a str,
    target: String,
}

type XmlWriter = Writer<Vec<u8>>;

/// Spreadsheet column letters for a zero-based index: `A`..`Z`, `AA`, ...
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Drop characters XML 1.0 cannot carry and cap the cell length.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let legal = |c: char| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}');
    if text.chars().all(legal) && text.len() <= MAX_CELL_CHARS {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().filter(|&c| legal(c)).take(MAX_CELL_CHARS).collect())
}

pub(super) fn write_package<W: Write + Seek>(workbook: &Workbook, writer: W) -> Result<W> {
    let sheets = workbook.sheets();
    if sheets.is_empty() {
        return Err(Error::InvalidData("workbook has no sheets".to_string()));
    }

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let part = |zip: &mut ZipWriter<W>, name: &str, bytes: &[u8]| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
        Ok(())
    };

    part(&mut zip, "[Content_Types].xml", &content_types_xml(sheets.len())?)?;
    part(&mut zip, "_rels/.rels", &package_rels_xml()?)?;
    part(&mut zip, "xl/workbook.xml", &workbook_xml(sheets)?)?;
    part(&mut zip, "xl/_rels/workbook.xml.rels", &workbook_rels_xml(sheets.len())?)?;
    part(&mut zip, "xl/styles.xml", STYLES_XML.as_bytes())?;
    for (i, sheet) in sheets.iter().enumerate() {
        let name = format!("xl/worksheets/sheet{}.xml", i + 1);
        part(&mut zip, &name, &worksheet_xml(sheet)?)?;
    }

    Ok(zip.finish()?)
}

fn xml_writer() -> Result<XmlWriter> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
    writer.write_event(Event::Start(elem))?;
    Ok(())
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    empty(&mut w, "Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
    empty(&mut w, "Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    empty(&mut w, "Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)])?;
    empty(&mut w, "Override", &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)])?;
    for i in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{}.xml", i);
        empty(&mut w, "Override", &[("PartName", part.as_str()), ("ContentType", CT_WORKSHEET)])?;
    }
    end(&mut w, "Types")?;
    Ok(w.into_inner())
}

fn rels_xml(rels: &[Relationship<'_>]) -> Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    for rel in rels {
        empty(
            &mut w,
            "Relationship",
            &[("Id", rel.id.as_str()), ("Type", rel.rel_type), ("Target", rel.target.as_str())],
        )?;
    }
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    rels_xml(&[Relationship {
        id: "rId1".to_string(),
        rel_type: REL_OFFICE_DOCUMENT,
        target: "xl/workbook.xml".to_string(),
    }])
}

/// Worksheets take `rId1..rIdN`; styles come last.
fn workbook_rels_xml(sheet_count: usize) -> Result<Vec<u8>> {
    let mut rels: Vec<Relationship> = (1..=sheet_count)
        .map(|i| Relationship {
            id: format!("rId{}", i),
            rel_type: REL_WORKSHEET,
            target: format!("worksheets/sheet{}.xml", i),
        })
        .collect();
    rels.push(Relationship {
        id: format!("rId{}", sheet_count + 1),
        rel_type: REL_STYLES,
        target: "styles.xml".to_string(),
    });
    rels_xml(&rels)
}

fn workbook_xml(sheets: &[Worksheet]) -> Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    start(&mut w, "sheets", &[])?;
    for (i, sheet) in sheets.iter().enumerate() {
        let sheet_id = (i + 1).to_string();
        let rel_id = format!("rId{}", i + 1);
        empty(
            &mut w,
            "sheet",
            &[("name", sheet.name()), ("sheetId", sheet_id.as_str()), ("r:id", rel_id.as_str())],
        )?;
    }
    end(&mut w, "sheets")?;
    end(&mut w, "workbook")?;
    Ok(w.into_inner())
}

fn worksheet_xml(sheet: &Worksheet) -> Result<Vec<u8>> {
    let mut w = xml_writer()?;
    start(&mut w, "worksheet", &[("xmlns", NS_MAIN)])?;

    if !sheet.columns.is_empty() {
        start(&mut w, "sheetViews", &[])?;
        start(&mut w, "sheetView", &[("workbookViewId", "0")])?;
        empty(
            &mut w,
            "pane",
            &[("ySplit", "1"), ("topLeftCell", "A2"), ("activePane", "bottomLeft"), ("state", "frozen")],
        )?;
        end(&mut w, "sheetView")?;
        end(&mut w, "sheetViews")?;

        start(&mut w, "cols", &[])?;
        for (i, column) in sheet.columns.iter().enumerate() {
            let index = (i + 1).to_string();
            let width = column.width.to_string();
            empty(
                &mut w,
                "col",
                &[
                    ("min", index.as_str()),
                    ("max", index.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        end(&mut w, "cols")?;
    }

    start(&mut w, "sheetData", &[])?;
    if !sheet.columns.is_empty() {
        let headers: Vec<&str> = sheet.columns.iter().map(|c| c.header.as_str()).collect();
        write_row(&mut w, 1, &headers, Some(STYLE_HEADER))?;
    }
    for (i, row) in sheet.rows.iter().enumerate() {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        write_row(&mut w, i + 2, &cells, None)?;
    }
    end(&mut w, "sheetData")?;

    end(&mut w, "worksheet")?;
    Ok(w.into_inner())
}

fn write_row(w: &mut XmlWriter, number: usize, cells: &[&str], style: Option<&str>) -> Result<()> {
    let r = number.to_string();
    start(w, "row", &[("r", r.as_str())])?;
    for (i, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let reference = format!("{}{}", column_name(i), number);
        let style = style.or(value.contains('\n').then_some(STYLE_WRAP));

        let mut attrs = vec![("r", reference.as_str()), ("t", "inlineStr")];
        if let Some(s) = style {
            attrs.push(("s", s));
        }
        start(w, "c", &attrs)?;
        start(w, "is", &[])?;
        start(w, "t", &[("xml:space", "preserve")])?;
        w.write_event(Event::Text(BytesText::new(&xml_safe(value))))?;
        end(w, "t")?;
        end(w, "is")?;
        end(w, "c")?;
    }
    end(w, "row")
}
