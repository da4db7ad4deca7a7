use crate::errors::IpolError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";

type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

fn xml_error(e: quick_xml::Error) -> IpolError {
    IpolError::Format(format!("XML parsing error: {}", e))
}

fn read_entry(archive: &mut Archive, name: &str) -> Result<Option<String>, IpolError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(IpolError::Format(format!(
                "Failed to read [{}] from the workbook: {}",
                name, e
            )))
        }
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, IpolError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| IpolError::Format(format!("XML attribute error: {}", e)))?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

// 1-based column of a cell reference such as "B3" or "AA10".
fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<char> = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    Some(letters.iter().fold(0, |acc, c| {
        acc * 26 + (c.to_ascii_uppercase() as u8 - b'A') as usize + 1
    }))
}

fn shared_strings(xml: &str) -> Result<Vec<String>, IpolError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = vec![];
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(e) if in_text => current.push_str(&e.unescape().map_err(xml_error)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

// Place `value` at the 1-based (row, col) of the grid.
fn store(grid: &mut Vec<Vec<String>>, row: usize, col: usize, value: String) {
    if row == 0 || col == 0 {
        return;
    }
    if grid.len() < row {
        grid.resize(row, vec![]);
    }
    let cells = &mut grid[row - 1];
    if cells.len() < col {
        cells.resize(col, String::new());
    }
    cells[col - 1] = value;
}

fn sheet_rows(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, IpolError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut grid: Vec<Vec<String>> = vec![];
    let mut row = 0;
    let mut col = 0;
    let mut cell_type = String::new();
    let mut value = String::new();
    let mut in_cell = false;
    let mut in_value = false;
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = attribute(&e, b"r")?
                        .and_then(|r| r.parse::<usize>().ok())
                        .unwrap_or(row + 1);
                    col = 0;
                }
                b"c" => {
                    col = attribute(&e, b"r")?
                        .and_then(|r| column_index(&r))
                        .unwrap_or(col + 1);
                    cell_type = attribute(&e, b"t")?.unwrap_or_default();
                    value.clear();
                    in_cell = true;
                }
                b"v" | b"t" if in_cell => in_value = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = attribute(&e, b"r")?
                        .and_then(|r| r.parse::<usize>().ok())
                        .unwrap_or(row + 1);
                    col = 0;
                }
                b"c" => {
                    col = attribute(&e, b"r")?
                        .and_then(|r| column_index(&r))
                        .unwrap_or(col + 1);
                }
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    let cell = if cell_type == "s" {
                        let idx = value.trim().parse::<usize>().map_err(|_| {
                            IpolError::Format(format!(
                                "Invalid shared string reference [{}] in row {}",
                                value, row
                            ))
                        })?;
                        shared.get(idx).cloned().ok_or_else(|| {
                            IpolError::Format(format!(
                                "Shared string [{}] referenced in row {} does not exist",
                                idx, row
                            ))
                        })?
                    } else {
                        value.clone()
                    };
                    store(&mut grid, row, col, cell);
                    in_cell = false;
                }
                _ => {}
            },
            Event::Text(e) if in_value => value.push_str(&e.unescape().map_err(xml_error)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(grid)
}

/// Cell text of the first worksheet of an xlsx workbook, one vector per
/// spreadsheet row starting at row 1. Rows without cells are empty.
pub fn read_xlsx_rows(data: &[u8]) -> Result<Vec<Vec<String>>, IpolError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| IpolError::Format(format!("Failed to open the xlsx archive: {}", e)))?;

    let shared = match read_entry(&mut archive, SHARED_STRINGS)? {
        Some(xml) => shared_strings(&xml)?,
        None => vec![],
    };

    // sheet1.xml sorts before sheet10.xml by length
    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(WORKSHEET_PREFIX) && name.ends_with(".xml"))
        .map(|name| name.to_owned())
        .collect();
    sheets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    let first = sheets
        .first()
        .ok_or_else(|| IpolError::Format("The workbook does not contain a worksheet".to_owned()))?;

    match read_entry(&mut archive, first)? {
        Some(xml) => sheet_rows(&xml, &shared),
        None => Err(IpolError::Format(format!("Worksheet [{}] not found", first))),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::io::Write;

    /// Build a minimal workbook holding `sheet` and optionally `shared`.
    pub(crate) fn build_xlsx(sheet: &str, shared: Option<&str>) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types/>"#)
            .unwrap();
        if let Some(s) = shared {
            zip.start_file(SHARED_STRINGS, options).unwrap();
            zip.write_all(s.as_bytes()).unwrap();
        }
        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        zip.write_all(sheet.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    pub(crate) const SHARED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
  <si><t>Time (s)</t></si>
  <si><r><t>Torque </t></r><r><t>1 (Nm)</t></r></si>
</sst>"#;

    pub(crate) const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="s"><v>1</v></c>
      <c r="C1" t="inlineStr"><is><t>Speed &amp; rpm</t></is></c>
    </row>
    <row r="2"><c r="A2"><v>0</v></c><c r="B2"><v>10</v></c><c r="C2"><v>100</v></c></row>
    <row r="3"><c r="A3"><v>2</v></c><c r="B3"><v>20</v></c></row>
    <row r="5"><c r="A5"><v>5</v></c><c r="B5"><v>50</v></c><c r="C5"><v>500</v></c></row>
  </sheetData>
</worksheet>"#;

    #[test]
    fn column_references() {
        assert_eq!(column_index("A1"), Some(1));
        assert_eq!(column_index("c7"), Some(3));
        assert_eq!(column_index("Z2"), Some(26));
        assert_eq!(column_index("AA10"), Some(27));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn read_first_sheet() {
        let rows = read_xlsx_rows(&build_xlsx(SHEET, Some(SHARED))).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], vec!["Time (s)", "Torque 1 (Nm)", "Speed & rpm"]);
        assert_eq!(rows[1], vec!["0", "10", "100"]);
        assert_eq!(rows[2], vec!["2", "20"]);
        assert!(rows[3].is_empty());
        assert_eq!(rows[4], vec!["5", "50", "500"]);
    }

    #[test]
    fn missing_shared_string_fails() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>3</v></c></row></sheetData></worksheet>"#;
        assert!(matches!(
            read_xlsx_rows(&build_xlsx(sheet, Some(SHARED))),
            Err(IpolError::Format(_))
        ));
    }

    #[test]
    fn not_a_workbook() {
        assert!(matches!(
            read_xlsx_rows(b"time_s,torque\n0,1\n"),
            Err(IpolError::Format(_))
        ));
    }
}
