//! Append-only side log of raw accessory data.
//!
//! # Responsibility
//! - Record placement and descriptive attributes of accessory elements for
//!   later catalog work.
//!
//! # Invariants
//! - Each element id appears as a `[Element_<id>]` section at most once.
//! - Every field renders independently; missing data renders as `-`.
//! - Failures are returned to the caller, which only logs them.
//! - The file is read once per handle; later records trust the cached ids.

use crate::model::element::{ElementId, ElementSnapshot, Point3};
use crate::model::fields::{PARAM_COMMENT, PARAM_LEVEL, PARAM_MATERIAL};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name used when the caller only supplies a directory.
pub const ACCESSORY_LOG_FILE_NAME: &str = "accessories_raw.ini";

const MISSING: &str = "-";
const HEADER_RULE: &str = "; ------------------------------------------";
const SECTION_PREFIX: &str = "[Element_";

/// What the file already holds, loaded on first record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct KnownSections {
    ids: HashSet<ElementId>,
    file_exists: bool,
    needs_newline: bool,
}

impl KnownSections {
    fn parse(text: &str) -> Self {
        let ids = text
            .lines()
            .filter_map(|line| {
                line.trim()
                    .strip_prefix(SECTION_PREFIX)?
                    .strip_suffix(']')?
                    .parse::<i64>()
                    .ok()
            })
            .map(ElementId)
            .collect();
        Self {
            ids,
            file_exists: true,
            needs_newline: !text.is_empty() && !text.ends_with('\n'),
        }
    }
}

/// Side log file handle.
///
/// Single-threaded: the section cache lives in a `RefCell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryLog {
    path: PathBuf,
    known: RefCell<Option<KnownSections>>,
}

impl AccessoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            known: RefCell::new(None),
        }
    }

    /// Log placed at `ACCESSORY_LOG_FILE_NAME` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(ACCESSORY_LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the element's section unless it is already present.
    ///
    /// Returns `true` when a section was written.
    pub fn record(&self, element: &ElementSnapshot, run_id: &str) -> io::Result<bool> {
        let mut cache = self.known.borrow_mut();
        if cache.is_none() {
            *cache = Some(self.load_known()?);
        }
        let known = cache.get_or_insert_with(KnownSections::default);

        if known.ids.contains(&element.id) {
            return Ok(false);
        }

        let mut out = String::new();
        if !known.file_exists {
            out.push_str(&file_header(run_id));
        } else if known.needs_newline {
            out.push('\n');
        }
        out.push_str(&render_section(element));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(out.as_bytes())?;

        known.ids.insert(element.id);
        known.file_exists = true;
        known.needs_newline = false;
        Ok(true)
    }

    fn load_known(&self) -> io::Result<KnownSections> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(KnownSections::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(KnownSections::default()),
            Err(err) => Err(err),
        }
    }
}

fn file_header(run_id: &str) -> String {
    format!(
        "{HEADER_RULE}\n; {ACCESSORY_LOG_FILE_NAME}  (auto-collected raw data)\n; Created by run: {run_id}\n{HEADER_RULE}\n\n"
    )
}

fn section_header(id: ElementId) -> String {
    format!("{SECTION_PREFIX}{id}]")
}

/// Renders one element section, blank line included.
pub fn render_section(element: &ElementSnapshot) -> String {
    let family = non_blank(Some(element.family_name.as_str()));
    let type_name = non_blank(element.type_name.as_deref());
    let bounding_box = element.bounding_box.map_or_else(
        || MISSING.to_string(),
        |bb| format!("{} - {}", format_point(bb.min), format_point(bb.max)),
    );
    let location = element
        .location
        .map_or_else(|| MISSING.to_string(), format_point);
    let material = param_or_missing(element, PARAM_MATERIAL);
    let comment = param_or_missing(element, PARAM_COMMENT);
    let host = non_blank(element.host_name.as_deref());
    let level = param_or_missing(element, PARAM_LEVEL);

    format!(
        "{}\nFamily = {family}\nType = {type_name}\nBoundingBox = {bounding_box}\nLocation = {location}\nMaterial = {material}\nComment = {comment}\nHost = {host}\nLevel = {level}\n\n",
        section_header(element.id)
    )
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn format_coord(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn format_point(point: Point3) -> String {
    format!(
        "({},{},{})",
        format_coord(point.x),
        format_coord(point.y),
        format_coord(point.z)
    )
}

fn param_or_missing(element: &ElementSnapshot, name: &str) -> String {
    element
        .param_text(name)
        .unwrap_or_else(|| MISSING.to_string())
}

fn non_blank(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_coord, render_section, AccessoryLog, KnownSections};
    use crate::model::element::ElementId;
    use crate::model::element::{BoundingBox, ElementSnapshot, Point3};
    use crate::model::fields::PARAM_MATERIAL;
    use tempfile::TempDir;

    fn accessory(id: i64) -> ElementSnapshot {
        let mut element = ElementSnapshot::new(id, "999_DKC_Accessories")
            .with_text(PARAM_MATERIAL, "Steel");
        element.type_name = Some("Bolt".to_string());
        element.bounding_box = Some(BoundingBox {
            min: Point3 {
                x: 1.0,
                y: -2.456,
                z: 0.0,
            },
            max: Point3 {
                x: 3.5,
                y: 4.0,
                z: 10.126,
            },
        });
        element
    }

    #[test]
    fn coordinates_use_up_to_two_decimals() {
        assert_eq!(format_coord(1.0), "1");
        assert_eq!(format_coord(3.5), "3.5");
        assert_eq!(format_coord(-2.456), "-2.46");
        assert_eq!(format_coord(-0.001), "0");
    }

    #[test]
    fn section_renders_missing_fields_as_dash() {
        let text = render_section(&accessory(42));
        assert!(text.starts_with("[Element_42]\nFamily = 999_DKC_Accessories\nType = Bolt\n"));
        assert!(text.contains("BoundingBox = (1,-2.46,0) - (3.5,4,10.13)\n"));
        assert!(text.contains("Location = -\n"));
        assert!(text.contains("Material = Steel\n"));
        assert!(text.contains("Comment = -\n"));
        assert!(text.contains("Host = -\n"));
        assert!(text.ends_with("Level = -\n\n"));
    }

    #[test]
    fn record_writes_header_once_and_skips_known_sections() {
        let dir = TempDir::new().expect("temp dir");
        let log = AccessoryLog::in_dir(dir.path());

        assert!(log.record(&accessory(1), "run-a").expect("first write"));
        assert!(!log.record(&accessory(1), "run-b").expect("duplicate skip"));
        assert!(log.record(&accessory(2), "run-b").expect("second write"));

        let text = std::fs::read_to_string(log.path()).expect("log readable");
        assert_eq!(text.matches("auto-collected raw data").count(), 1);
        assert!(text.contains("Created by run: run-a"));
        assert_eq!(text.matches("[Element_1]").count(), 1);
        assert_eq!(text.matches("[Element_2]").count(), 1);
    }

    #[test]
    fn known_sections_are_read_from_existing_file() {
        let known = KnownSections::parse("; header\n[Element_7]\nFamily = x\n\n [Element_-3] \n[Element_x]");
        assert!(known.ids.contains(&ElementId(7)));
        assert!(known.ids.contains(&ElementId(-3)));
        assert_eq!(known.ids.len(), 2);
        assert!(known.file_exists);
        assert!(known.needs_newline);
    }

    #[test]
    fn file_is_read_once_per_handle() {
        let dir = TempDir::new().expect("temp dir");
        let log = AccessoryLog::in_dir(dir.path());
        std::fs::write(log.path(), "[Element_1]\nFamily = old\n").expect("seed log");

        assert!(!log.record(&accessory(1), "run-a").expect("known section"));
        std::fs::remove_file(log.path()).expect("remove log");
        assert!(!log.record(&accessory(1), "run-a").expect("cached section"));
        assert!(log.record(&accessory(2), "run-a").expect("new section"));

        let text = std::fs::read_to_string(log.path()).expect("log readable");
        assert!(text.starts_with("[Element_2]\n"), "{text}");
        assert!(!text.contains("auto-collected raw data"));
    }

    #[test]
    fn appended_section_starts_on_its_own_line() {
        let dir = TempDir::new().expect("temp dir");
        let log = AccessoryLog::in_dir(dir.path());
        std::fs::write(log.path(), "; manual note").expect("seed log");

        assert!(log.record(&accessory(5), "run-a").expect("write"));
        let text = std::fs::read_to_string(log.path()).expect("log readable");
        assert!(text.starts_with("; manual note\n[Element_5]\n"), "{text}");
    }
}
