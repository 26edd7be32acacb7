//! 기존 xlsx 파일의 셀 값만 바꿔 쓰기
//!
//! 대상 시트 XML 의 `<sheetData>` 안에서 바뀐 셀만 다시 쓰고, 나머지 파트
//! (스타일, 병합 셀, 열 너비, 다른 시트)는 압축된 바이트 그대로 복사한다.
//! 덮어쓴 셀은 기존 `s` (서식 번호)를 유지한다.

use crate::error::{Error, Result};
use crate::grid::{CellValue, Grid};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

/// 시트 1장에 대한 셀 변경 목록 (1부터 시작하는 좌표)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetPatch {
    cells: BTreeMap<(u32, u32), CellValue>,
}

type RowCells<'a> = BTreeMap<u32, Vec<(u32, &'a CellValue)>>;

impl SheetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        if row == 0 || col == 0 {
            return Err(Error::Grid(format!("({}, {}) is not a 1-based coordinate", row, col)));
        }
        self.cells.insert((row, col), value.into());
        Ok(())
    }

    /// `before` 에서 `after` 로 값이 바뀐 셀. `after` 에서 사라진 값은 비운다
    pub fn diff(before: &Grid, after: &Grid) -> Self {
        let mut cells = BTreeMap::new();
        for ((row, col), cell) in after.cells() {
            let old = before.get(row, col).unwrap_or(&CellValue::Empty);
            if *old != cell.value {
                cells.insert((row, col), cell.value.clone());
            }
        }
        for ((row, col), cell) in before.cells() {
            if cell.value != CellValue::Empty && after.get(row, col).is_none() {
                cells.insert((row, col), CellValue::Empty);
            }
        }
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 값을 쓰는 셀을 모두 덮는 범위
    fn bounds(&self) -> Option<Bounds> {
        self.cells
            .iter()
            .filter(|(_, value)| **value != CellValue::Empty)
            .map(|(&(row, col), _)| Bounds { min_row: row, min_col: col, max_row: row, max_col: col })
            .reduce(Bounds::union)
    }

    fn by_row(&self) -> RowCells<'_> {
        let mut rows: RowCells<'_> = BTreeMap::new();
        for (&(row, col), value) in &self.cells {
            rows.entry(row).or_default().push((col, value));
        }
        rows
    }
}

/// 셀 범위 (1부터 시작, 양 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_row: u32,
    min_col: u32,
    max_row: u32,
    max_col: u32,
}

impl Bounds {
    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_row: self.min_row.min(other.min_row),
            min_col: self.min_col.min(other.min_col),
            max_row: self.max_row.max(other.max_row),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// `A1:B3` 또는 `A1`
    fn parse(reference: &str) -> Option<Bounds> {
        let mut parts = reference.split(':');
        let (min_row, min_col) = parse_cell_ref(parts.next()?)?;
        let (max_row, max_col) = match parts.next() {
            Some(end) => parse_cell_ref(end)?,
            None => (min_row, min_col),
        };
        Some(Bounds { min_row, min_col, max_row, max_col })
    }

    fn to_ref(self) -> String {
        let start = format!("{}{}", column_letters(self.min_col), self.min_row);
        if (self.min_row, self.min_col) == (self.max_row, self.max_col) {
            start
        } else {
            format!("{}:{}{}", start, column_letters(self.max_col), self.max_row)
        }
    }
}

/// 열 번호 → 열 문자 (1 → A, 52 → AZ)
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// `AZ5` → (5, 52). `$` 는 무시
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add(ch as u32 - 'A' as u32 + 1)?;
    }
    let row = digits.parse().ok()?;
    Some((row, col))
}

/// xlsx 바이트의 한 시트에 변경을 적용한 새 xlsx 바이트
pub fn patch_workbook(bytes: &[u8], sheet_name: &str, patch: &SheetPatch) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let sheet_part = worksheet_part(&mut archive, sheet_name)?;
    let original = read_part(&mut archive, &sheet_part)?;
    let (patched, formula_changed) = patch_sheet_xml(&original, patch)?;

    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();

        if name == sheet_part {
            out.start_file(name, options)?;
            out.write_all(&patched)?;
        } else if formula_changed && name == CALC_CHAIN_PART {
            // 수식을 덮어쓴 경우 계산 체인은 엑셀이 다시 만든다
            continue;
        } else {
            out.raw_copy_file(file)?;
        }
    }

    Ok(out.finish()?.into_inner())
}

/// `src` 를 읽어 변경을 적용하고 `dst` 에 쓴다 (`src == dst` 가능)
pub fn patch_file(src: &Path, dst: &Path, sheet_name: &str, patch: &SheetPatch) -> Result<()> {
    let bytes = std::fs::read(src)?;
    let patched = patch_workbook(&bytes, sheet_name, patch)?;
    std::fs::write(dst, patched)?;
    Ok(())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::Package(format!("{}: {}", name, e)))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// 시트 이름 → 워크시트 파트 경로 (`xl/worksheets/sheet1.xml`)
fn worksheet_part<R: Read + Seek>(archive: &mut ZipArchive<R>, sheet_name: &str) -> Result<String> {
    let workbook_xml = read_part(archive, WORKBOOK_PART)?;
    let rel_id = sheet_relationship_id(&workbook_xml, sheet_name)?
        .ok_or_else(|| Error::Package(format!("시트를 찾을 수 없습니다: {}", sheet_name)))?;

    let rels_xml = read_part(archive, WORKBOOK_RELS_PART)?;
    let target = relationship_target(&rels_xml, &rel_id)?
        .ok_or_else(|| Error::Package(format!("시트 관계를 찾을 수 없습니다: {}", rel_id)))?;

    Ok(match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    })
}

fn sheet_relationship_id(workbook_xml: &[u8], sheet_name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(workbook_xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.as_ref() {
                        b"name" => name = Some(value),
                        key if local_name(key) == b"id" => rel_id = Some(value),
                        _ => {}
                    }
                }
                if name.as_deref() == Some(sheet_name) {
                    return Ok(rel_id);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_target(rels_xml: &[u8], rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(rels_xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// 아직 쓰지 않은 변경 행 (행 번호 오름차순)
struct PendingRows<'a> {
    rows: &'a RowCells<'a>,
    order: Vec<u32>,
    next: usize,
    formula_changed: bool,
}

impl<'a> PendingRows<'a> {
    fn new(rows: &'a RowCells<'a>) -> Self {
        Self {
            rows,
            order: rows.keys().copied().collect(),
            next: 0,
            formula_changed: false,
        }
    }

    /// `row` 보다 앞선 변경 행을 새 `<row>` 로 쓴다
    fn write_rows_before(&mut self, writer: &mut Writer<Vec<u8>>, row: u32) -> Result<()> {
        while self.next < self.order.len() && self.order[self.next] < row {
            let pending = self.order[self.next];
            let cells = self.rows.get(&pending).map(Vec::as_slice).unwrap_or_default();
            write_new_row(writer, pending, cells, &mut self.formula_changed);
            self.next += 1;
        }
        Ok(())
    }

    fn write_remaining(&mut self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        self.write_rows_before(writer, u32::MAX)
    }

    /// 기존 `<row r=row>` 에 적용할 변경
    fn take(&mut self, row: u32) -> Option<&'a [(u32, &'a CellValue)]> {
        if self.next < self.order.len() && self.order[self.next] == row {
            self.next += 1;
            self.rows.get(&row).map(Vec::as_slice)
        } else {
            None
        }
    }
}

/// 시트 XML 에 변경을 적용. 두 번째 값은 수식이 바뀌었는지
fn patch_sheet_xml(original: &[u8], patch: &SheetPatch) -> Result<(Vec<u8>, bool)> {
    if patch.is_empty() {
        return Ok((original.to_vec(), false));
    }

    let rows = patch.by_row();
    let mut pending = PendingRows::new(&rows);
    pending.formula_changed = patch.cells.values().any(|v| matches!(v, CellValue::Formula(_)));

    let mut reader = Reader::from_reader(original);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(original.len() + patch.len() * 64));
    let mut buf = Vec::new();
    let mut saw_sheet_data = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"sheetData" => {
                saw_sheet_data = true;
                writer.write_event(Event::Start(e.into_owned()))?;
                patch_sheet_data(&mut reader, &mut writer, &mut pending)?;
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"sheetData" => {
                saw_sheet_data = true;
                let start = e.into_owned();
                if rows.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    let end = start.to_end().into_owned();
                    writer.write_event(Event::Start(start))?;
                    pending.write_remaining(&mut writer)?;
                    writer.write_event(Event::End(end))?;
                }
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"dimension" => {
                let dimension = match patch.bounds() {
                    Some(bounds) => widened_dimension(&e, bounds)?,
                    None => e.into_owned(),
                };
                writer.write_event(Event::Empty(dimension))?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev.into_owned())?,
        }
        buf.clear();
    }

    if !saw_sheet_data && !rows.is_empty() {
        return Err(Error::Package("시트에 sheetData 가 없습니다".to_string()));
    }

    Ok((writer.into_inner(), pending.formula_changed))
}

fn patch_sheet_data<R: BufRead>(
    reader: &mut Reader<R>,
    writer: &mut Writer<Vec<u8>>,
    pending: &mut PendingRows<'_>,
) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"row" => {
                let start = e.into_owned();
                match row_number(&start)? {
                    Some(row) => {
                        pending.write_rows_before(writer, row)?;
                        let cells = pending.take(row);
                        writer.write_event(Event::Start(start))?;
                        if let Some(cells) = cells {
                            patch_row(reader, writer, row, cells, &mut pending.formula_changed)?;
                        }
                    }
                    None => writer.write_event(Event::Start(start))?,
                }
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"row" => {
                let empty = e.into_owned();
                let cells = match row_number(&empty)? {
                    Some(row) => {
                        pending.write_rows_before(writer, row)?;
                        pending.take(row).map(|cells| (row, cells))
                    }
                    None => None,
                };
                match cells {
                    Some((row, cells)) => {
                        // `<row/>` → `<row>...</row>`
                        let end = empty.to_end().into_owned();
                        writer.write_event(Event::Start(empty))?;
                        for (col, value) in cells {
                            write_cell(writer, row, *col, value, None);
                        }
                        writer.write_event(Event::End(end))?;
                    }
                    None => writer.write_event(Event::Empty(empty))?,
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"sheetData" => {
                pending.write_remaining(writer)?;
                writer.write_event(Event::End(e.into_owned()))?;
                return Ok(());
            }
            Event::Eof => {
                return Err(Error::Package("sheetData 가 닫히지 않았습니다".to_string()));
            }
            ev => writer.write_event(ev.into_owned())?,
        }
        buf.clear();
    }
}

/// 셀의 위치와 서식 번호
struct CellAttrs {
    row: u32,
    col: u32,
    style: Option<String>,
}

fn patch_row<R: BufRead>(
    reader: &mut Reader<R>,
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &[(u32, &CellValue)],
    formula_changed: &mut bool,
) -> Result<()> {
    let mut buf = Vec::new();
    let mut next = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"c" => {
                let start = e.into_owned();
                match cell_attrs(&start)?.filter(|attrs| attrs.row == row) {
                    Some(attrs) => {
                        next = write_cells_before(writer, row, cells, next, attrs.col);
                        if next < cells.len() && cells[next].0 == attrs.col {
                            *formula_changed |= skip_cell(reader)?;
                            write_cell(writer, row, attrs.col, cells[next].1, attrs.style.as_deref());
                            next += 1;
                        } else {
                            writer.write_event(Event::Start(start))?;
                        }
                    }
                    None => writer.write_event(Event::Start(start))?,
                }
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"c" => {
                let empty = e.into_owned();
                match cell_attrs(&empty)?.filter(|attrs| attrs.row == row) {
                    Some(attrs) => {
                        next = write_cells_before(writer, row, cells, next, attrs.col);
                        if next < cells.len() && cells[next].0 == attrs.col {
                            write_cell(writer, row, attrs.col, cells[next].1, attrs.style.as_deref());
                            next += 1;
                        } else {
                            writer.write_event(Event::Empty(empty))?;
                        }
                    }
                    None => writer.write_event(Event::Empty(empty))?,
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"row" => {
                write_cells_before(writer, row, cells, next, u32::MAX);
                writer.write_event(Event::End(e.into_owned()))?;
                return Ok(());
            }
            Event::Eof => {
                return Err(Error::Package(format!("{}행이 닫히지 않았습니다", row)));
            }
            ev => writer.write_event(ev.into_owned())?,
        }
        buf.clear();
    }
}

/// `col` 앞 열의 새 셀을 쓰고 다음 위치를 반환
fn write_cells_before(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &[(u32, &CellValue)],
    mut next: usize,
    col: u32,
) -> usize {
    while next < cells.len() && cells[next].0 < col {
        write_cell(writer, row, cells[next].0, cells[next].1, None);
        next += 1;
    }
    next
}

fn write_new_row(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    cells: &[(u32, &CellValue)],
    formula_changed: &mut bool,
) {
    writer
        .get_mut()
        .extend_from_slice(format!(r#"<row r="{}">"#, row).as_bytes());
    for (col, value) in cells {
        *formula_changed |= matches!(value, CellValue::Formula(_));
        write_cell(writer, row, *col, value, None);
    }
    writer.get_mut().extend_from_slice(b"</row>");
}

/// 덮어쓸 셀의 나머지 내용을 건너뛴다. 기존 수식이 있었는지 반환
fn skip_cell<R: BufRead>(reader: &mut Reader<R>) -> Result<bool> {
    let mut buf = Vec::new();
    let mut depth = 1usize;
    let mut had_formula = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if depth == 1 && local_name(e.name().as_ref()) == b"f" {
                    had_formula = true;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 1 && local_name(e.name().as_ref()) == b"f" {
                    had_formula = true;
                }
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(had_formula);
                }
            }
            Event::Eof => return Err(Error::Package("셀이 닫히지 않았습니다".to_string())),
            _ => {}
        }
        buf.clear();
    }
}

fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    col: u32,
    value: &CellValue,
    style: Option<&str>,
) {
    let mut xml = format!(r#"<c r="{}{}""#, column_letters(col), row);
    if let Some(style) = style.filter(|s| *s != "0") {
        xml.push_str(&format!(r#" s="{}""#, escape_text(style)));
    }

    match value {
        CellValue::Empty => xml.push_str("/>"),
        CellValue::Text(text) => {
            let space = if needs_space_preserve(text) { r#" xml:space="preserve""# } else { "" };
            xml.push_str(&format!(
                r#" t="inlineStr"><is><t{}>{}</t></is></c>"#,
                space,
                escape_text(text)
            ));
        }
        CellValue::Int(v) => xml.push_str(&format!("><v>{}</v></c>", v)),
        CellValue::Float(v) | CellValue::DateTime(v) => xml.push_str(&format!("><v>{}</v></c>", v)),
        CellValue::Bool(b) => xml.push_str(&format!(r#" t="b"><v>{}</v></c>"#, u8::from(*b))),
        CellValue::Formula(formula) => {
            xml.push_str(&format!("><f>{}</f></c>", escape_text(formula)));
        }
    }

    writer.get_mut().extend_from_slice(xml.as_bytes());
}

/// `<dimension ref>` 를 변경 셀까지 넓힌다. 다른 속성은 순서대로 유지
fn widened_dimension(original: &BytesStart<'_>, bounds: Bounds) -> Result<BytesStart<'static>> {
    let mut existing = None;
    for attr in original.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ref" {
            existing = Bounds::parse(&attr.unescape_value()?);
        }
    }
    let widened = existing.map_or(bounds, |existing| existing.union(bounds)).to_ref();

    let tag = String::from_utf8_lossy(original.name().as_ref()).into_owned();
    let mut out = BytesStart::new(tag);
    let mut has_ref = false;
    for attr in original.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ref" {
            has_ref = true;
            out.push_attribute(("ref", widened.as_str()));
        } else {
            out.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    if !has_ref {
        out.push_attribute(("ref", widened.as_str()));
    }
    Ok(out)
}

fn row_number(row: &BytesStart<'_>) -> Result<Option<u32>> {
    for attr in row.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            return Ok(attr.unescape_value()?.parse().ok());
        }
    }
    Ok(None)
}

fn cell_attrs(cell: &BytesStart<'_>) -> Result<Option<CellAttrs>> {
    let mut position = None;
    let mut style = None;
    for attr in cell.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"r" => position = parse_cell_ref(&attr.unescape_value()?),
            b"s" => style = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(position.map(|(row, col)| CellAttrs { row, col, style }))
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
