// zipdiff-compare/src/report.rs
//! Report rendering
//!
//! The reporter walks the classified entries and prints the requested
//! sections. Only entries from the reference archive are listed; the other
//! archive shows up through the `referenced by` suffix.
//!
//! Text output:
//!
//! ```text
//! Comparing old.zip and new.zip (Reference set to old.zip)
//!
//! List of Files that are the same in both files
//! docs/readme.txt:5d41402abc4b2a76b9719d911017c592 in old.zip referenced by new.zip
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use zipdiff_core::{ArchiveId, ContentHash, EntryId, ReferenceSide, ReportCategory};

use crate::diff::ArchiveDiff;

/// Output format for reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// What to report and how
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub reference: ReferenceSide,
    pub categories: BTreeSet<ReportCategory>,
    pub format: OutputFormat,
}

impl ReportConfig {
    pub fn new(reference: ReferenceSide) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: ReportCategory) -> Self {
        self.categories.insert(category);
        self
    }

    /// Enable every category
    pub fn with_all(mut self) -> Self {
        self.categories.extend(ReportCategory::ALL);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_enabled(&self, category: ReportCategory) -> bool {
        self.categories.contains(&category)
    }
}

/// One reported entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub hash: ContentHash,
    pub archive: ArchiveId,
    /// Archives of all referenced entries, without repeats
    pub referenced_by: Vec<ArchiveId>,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}", self.name, self.hash, self.archive)?;

        if !self.referenced_by.is_empty() {
            f.write_str(" referenced by ")?;
            for (i, archive) in self.referenced_by.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", archive)?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    archives: Vec<String>,
    reference: &'a ArchiveId,
    errors: Vec<JsonError>,
    sections: Vec<JsonSection>,
}

#[derive(Serialize)]
struct JsonError {
    archive: String,
    message: String,
}

#[derive(Serialize)]
struct JsonSection {
    category: ReportCategory,
    title: String,
    entries: Vec<EntryReport>,
}

/// Renders an [`ArchiveDiff`] according to a [`ReportConfig`]
pub struct Reporter<'a> {
    diff: &'a ArchiveDiff,
    config: &'a ReportConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(diff: &'a ArchiveDiff, config: &'a ReportConfig) -> Self {
        Self { diff, config }
    }

    /// Identifier of the reference archive
    pub fn reference(&self) -> &'a ArchiveId {
        &self.diff.input(self.config.reference).id
    }

    pub fn banner(&self) -> String {
        let [a, b] = [ReferenceSide::A, ReferenceSide::B].map(|s| self.diff.input(s).path.display());
        format!("Comparing {} and {} (Reference set to {})", a, b, self.reference())
    }

    /// Heading printed above a section, `None` for categories without output
    pub fn section_title(&self, category: ReportCategory) -> Option<String> {
        match category {
            ReportCategory::Deleted => {
                let other = &self.diff.input(self.config.reference.other()).id;
                Some(format!("List of files that are deleted in {}", other))
            }
            ReportCategory::Same => Some("List of Files that are the same in both files".to_string()),
            ReportCategory::Added | ReportCategory::Changed | ReportCategory::Renamed => None,
        }
    }

    /// Entries of the reference archive falling into `category`
    pub fn entries(&self, category: ReportCategory) -> Vec<EntryReport> {
        let present = match category {
            ReportCategory::Deleted => false,
            ReportCategory::Same => true,
            ReportCategory::Added | ReportCategory::Changed | ReportCategory::Renamed => {
                return Vec::new();
            }
        };

        let reference = self.reference();
        let classification = self.diff.classification();

        self.diff
            .graph()
            .iter()
            .filter(|(id, e)| &e.archive == reference && classification.is_present(*id) == present)
            .map(|(id, _)| self.entry_report(id))
            .collect()
    }

    /// Build the report line for a single entry
    pub fn entry_report(&self, id: EntryId) -> EntryReport {
        let graph = self.diff.graph();
        let entry = &graph[id];

        let mut referenced_by: Vec<ArchiveId> = Vec::new();
        for r in entry.references() {
            let archive = &graph[*r].archive;
            if !referenced_by.contains(archive) {
                referenced_by.push(archive.clone());
            }
        }

        EntryReport {
            name: entry.name.clone(),
            hash: entry.hash,
            archive: entry.archive.clone(),
            referenced_by,
        }
    }

    /// Write the report in the configured format
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.config.format {
            OutputFormat::Text => self.write_text(out),
            OutputFormat::Json => self.write_json(out),
        }
    }

    fn enabled_sections(&self) -> impl Iterator<Item = (ReportCategory, String)> + '_ {
        ReportCategory::ALL
            .into_iter()
            .filter(|c| self.config.is_enabled(*c))
            .filter_map(|c| self.section_title(c).map(|title| (c, title)))
    }

    fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for failed in self.diff.failures() {
            writeln!(out, "[ERROR] while processing file {}", failed.path.display())?;
        }

        writeln!(out, "{}", self.banner())?;
        writeln!(out)?;

        for (category, title) in self.enabled_sections() {
            writeln!(out, "{}", title)?;
            for entry in self.entries(category) {
                writeln!(out, "{}", entry)?;
            }
        }

        Ok(())
    }

    fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let report = JsonReport {
            archives: self
                .diff
                .inputs()
                .iter()
                .map(|i| i.path.display().to_string())
                .collect(),
            reference: self.reference(),
            errors: self
                .diff
                .failures()
                .map(|i| JsonError {
                    archive: i.path.display().to_string(),
                    message: i.error().map(|e| e.to_string()).unwrap_or_default(),
                })
                .collect(),
            sections: self
                .enabled_sections()
                .map(|(category, title)| JsonSection {
                    category,
                    title,
                    entries: self.entries(category),
                })
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use zipdiff_core::{Error, Result};
    use crate::registry::{ArchiveReader, Member};

    struct StubReader(HashMap<&'static str, Vec<(&'static str, u8)>>);

    impl ArchiveReader for StubReader {
        fn read_members(&self, path: &Path) -> Result<Vec<Member>> {
            let key = path.to_str().unwrap_or_default();
            let members = self
                .0
                .get(key)
                .ok_or_else(|| Error::load_failure(path, "unreadable"))?;

            Ok(members
                .iter()
                .map(|(name, hash)| Member {
                    name: name.to_string(),
                    hash: ContentHash::from_bytes([*hash; 16]),
                })
                .collect())
        }
    }

    fn diff_of(a: Vec<(&'static str, u8)>, b: Vec<(&'static str, u8)>) -> ArchiveDiff {
        let mut stubs = HashMap::new();
        stubs.insert("a.zip", a);
        stubs.insert("b.zip", b);
        ArchiveDiff::compare(Path::new("a.zip"), Path::new("b.zip"), &StubReader(stubs))
    }

    fn render(diff: &ArchiveDiff, config: &ReportConfig) -> String {
        let mut out = Vec::new();
        Reporter::new(diff, config).write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn names(entries: Vec<EntryReport>) -> Vec<String> {
        entries.into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_only_reference_archive_is_listed() {
        let diff = diff_of(vec![("x", 1)], vec![("x", 1), ("y", 2)]);
        let config = ReportConfig::new(ReferenceSide::A).with_all();
        let reporter = Reporter::new(&diff, &config);

        assert_eq!(names(reporter.entries(ReportCategory::Same)), ["x"]);
        assert!(reporter.entries(ReportCategory::Deleted).is_empty());
    }

    #[test]
    fn test_reference_side_b() {
        let diff = diff_of(vec![("x", 1)], vec![("x", 1), ("y", 2)]);
        let config = ReportConfig::new(ReferenceSide::B);
        let reporter = Reporter::new(&diff, &config);

        assert_eq!(reporter.reference().as_str(), "b.zip");
        assert_eq!(names(reporter.entries(ReportCategory::Deleted)), ["y"]);
        assert_eq!(
            reporter.section_title(ReportCategory::Deleted).unwrap(),
            "List of files that are deleted in a.zip"
        );
    }

    #[test]
    fn test_placeholder_categories_are_empty() {
        let diff = diff_of(vec![("x", 1)], vec![("y", 1)]);
        let config = ReportConfig::new(ReferenceSide::A).with_all();
        let reporter = Reporter::new(&diff, &config);

        for category in [ReportCategory::Added, ReportCategory::Changed, ReportCategory::Renamed] {
            assert!(reporter.entries(category).is_empty());
            assert!(reporter.section_title(category).is_none());
        }
    }

    #[test]
    fn test_entry_line_format() {
        let report = EntryReport {
            name: "docs/a.txt".to_string(),
            hash: ContentHash::from_bytes([0xab; 16]),
            archive: ArchiveId::new("a.zip"),
            referenced_by: vec![ArchiveId::new("a.zip"), ArchiveId::new("b.zip")],
        };
        assert_eq!(
            report.to_string(),
            "docs/a.txt:abababababababababababababababab in a.zip referenced by a.zip, b.zip"
        );

        let lonely = EntryReport { referenced_by: Vec::new(), ..report };
        assert_eq!(lonely.to_string(), "docs/a.txt:abababababababababababababababab in a.zip");
    }

    #[test]
    fn test_referenced_by_is_deduplicated() {
        let diff = diff_of(vec![("x", 1), ("x-copy", 1)], vec![("x", 1), ("x", 1)]);
        let config = ReportConfig::new(ReferenceSide::A);
        let report = Reporter::new(&diff, &config).entry_report(EntryId::new(0));

        let archives: Vec<_> = report.referenced_by.iter().map(|a| a.as_str()).collect();
        assert_eq!(archives, ["a.zip", "b.zip"]);
    }

    #[test]
    fn test_text_report() {
        let diff = diff_of(vec![("x", 1), ("gone", 3)], vec![("x", 1)]);
        let config = ReportConfig::new(ReferenceSide::A)
            .with_category(ReportCategory::Deleted)
            .with_category(ReportCategory::Same);

        let text = render(&diff, &config);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Comparing a.zip and b.zip (Reference set to a.zip)");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "List of files that are deleted in b.zip");
        assert!(lines[3].starts_with("gone:03030303"));
        assert!(lines[3].ends_with(" in a.zip"));
        assert_eq!(lines[4], "List of Files that are the same in both files");
        assert!(lines[5].ends_with(" in a.zip referenced by b.zip"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_banner_only_without_categories() {
        let diff = diff_of(vec![("x", 1)], vec![("x", 1)]);
        let text = render(&diff, &ReportConfig::new(ReferenceSide::A));
        assert_eq!(text, "Comparing a.zip and b.zip (Reference set to a.zip)\n\n");
    }

    #[test]
    fn test_load_failure_is_reported_first() {
        let mut stubs = HashMap::new();
        stubs.insert("a.zip", vec![("x", 1)]);
        let diff = ArchiveDiff::compare(Path::new("a.zip"), Path::new("broken.zip"), &StubReader(stubs));

        let text = render(&diff, &ReportConfig::new(ReferenceSide::A).with_all());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "[ERROR] while processing file broken.zip");
        assert_eq!(lines[1], "Comparing a.zip and broken.zip (Reference set to a.zip)");
        assert!(text.contains("List of files that are deleted in broken.zip\nx:"));
    }

    #[test]
    fn test_json_report() {
        let diff = diff_of(vec![("x", 1)], vec![("x", 1), ("y", 2)]);
        let config = ReportConfig::new(ReferenceSide::A)
            .with_category(ReportCategory::Same)
            .with_format(OutputFormat::Json);

        let json: serde_json::Value = serde_json::from_str(&render(&diff, &config)).unwrap();

        assert_eq!(json["reference"], "a.zip");
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
        let section = &json["sections"][0];
        assert_eq!(section["category"], "same");
        assert_eq!(section["entries"][0]["name"], "x");
        assert_eq!(section["entries"][0]["hash"], "01".repeat(16));
        assert_eq!(section["entries"][0]["referenced_by"][0], "b.zip");
    }
}
