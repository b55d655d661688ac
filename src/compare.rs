//! Equivalence comparison of two captured node streams.
//!
//! Both streams are canonicalized with the same [`CanonicalRules`](crate::CanonicalRules) (removal
//! rules are applied per [`Source`](crate::Source)), then compared row by row. The scan always
//! runs to the end of the longer list, so a length difference is reported
//! alongside the first differing row.
//!
//! When the streams differ and persistence is enabled, both canonical lists
//! are written to `<dump_dir>/<dump_name>.markup.txt` and
//! `<dump_dir>/<dump_name>.binary.txt`, one row per line, for offline diffing.
//!
//! ```rust
//! use node_stream_diff::{Comparator, CompareOptions};
//!
//! let comparator = Comparator::new(CompareOptions::new().with_persist_on_failure(false));
//! let result = comparator
//!     .compare_text(
//!         "SO Button\nSM Width\nV 10\nEM\nSM IsEnabled\nV True\nEM\nEO",
//!         "SO Button\nSM IsEnabled\nV true\nEM\nSM Width\nV 10\nEM\nEO",
//!     )
//!     .unwrap();
//! assert!(result.is_equivalent());
//! ```

use crate::canon::Canonicalizer;
use crate::node::NodeReader;
use crate::options::{CompareOptions, EncoderOptions};
use crate::rules::Source;
use crate::ser::encode_reader;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// First position where the canonical lists disagree. A side is `None` when
/// its list ended before `index`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub markup: Option<String>,
    pub binary: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DumpPaths {
    pub markup: PathBuf,
    pub binary: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub equivalent: bool,
    pub markup_len: usize,
    pub binary_len: usize,
    /// Number of positions that differ, counting rows past the shorter list.
    pub differing_rows: usize,
    pub first_mismatch: Option<Mismatch>,
    pub dumps: Option<DumpPaths>,
}

impl Comparison {
    #[must_use]
    pub fn is_equivalent(&self) -> bool {
        self.equivalent
    }
}

#[derive(Clone, Debug, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    pub fn new(options: CompareOptions) -> Self {
        Comparator { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Canonicalizes both captured row lists and compares them.
    pub fn compare<M, B>(&self, markup_rows: &[M], binary_rows: &[B]) -> Result<Comparison>
    where
        M: AsRef<str>,
        B: AsRef<str>,
    {
        let canon = self.canonicalizer();
        let markup = canon.canonicalize_rows(markup_rows, Source::Markup)?;
        let binary = canon.canonicalize_rows(binary_rows, Source::Binary)?;
        self.compare_canonical(&markup, &binary)
    }

    /// Compares two captured texts, one row per line.
    pub fn compare_text(&self, markup: &str, binary: &str) -> Result<Comparison> {
        let canon = self.canonicalizer();
        let markup = canon.canonicalize_text(markup, Source::Markup)?;
        let binary = canon.canonicalize_text(binary, Source::Binary)?;
        self.compare_canonical(&markup, &binary)
    }

    /// Compares two captured text files.
    pub fn compare_files(&self, markup: &Path, binary: &Path) -> Result<Comparison> {
        let markup = read_capture(markup)?;
        let binary = read_capture(binary)?;
        self.compare_text(&markup, &binary)
    }

    /// Encodes two node streams with default options and compares the text.
    pub fn compare_readers<A, B>(&self, markup: &mut A, binary: &mut B) -> Result<Comparison>
    where
        A: NodeReader + ?Sized,
        B: NodeReader + ?Sized,
    {
        let markup = encode_reader(markup, EncoderOptions::default())?;
        let binary = encode_reader(binary, EncoderOptions::default())?;
        self.compare_text(&markup, &binary)
    }

    /// Compares two lists that are already canonical.
    pub fn compare_canonical(&self, markup: &[String], binary: &[String]) -> Result<Comparison> {
        let longest = markup.len().max(binary.len());
        let mut first_mismatch = None;
        let mut differing_rows = 0;

        for index in 0..longest {
            let (m, b) = (markup.get(index), binary.get(index));
            if m == b {
                continue;
            }
            differing_rows += 1;
            if first_mismatch.is_none() {
                first_mismatch = Some(Mismatch {
                    index,
                    markup: m.cloned(),
                    binary: b.cloned(),
                });
            }
        }

        let equivalent = first_mismatch.is_none();
        let mut dumps = None;
        if let Some(mismatch) = &first_mismatch {
            tracing::warn!(
                index = mismatch.index,
                markup = mismatch.markup.as_deref().unwrap_or("<end>"),
                binary = mismatch.binary.as_deref().unwrap_or("<end>"),
                markup_len = markup.len(),
                binary_len = binary.len(),
                "node streams differ"
            );
            if self.options.persist_on_failure {
                dumps = Some(self.persist(markup, binary)?);
            }
        } else {
            tracing::debug!(rows = markup.len(), "node streams are equivalent");
        }

        Ok(Comparison {
            equivalent,
            markup_len: markup.len(),
            binary_len: binary.len(),
            differing_rows,
            first_mismatch,
            dumps,
        })
    }

    /// Writes both canonical lists under the configured dump directory.
    pub fn persist(&self, markup: &[String], binary: &[String]) -> Result<DumpPaths> {
        let dir = &self.options.dump_dir;
        if dir.exists() && !dir.is_dir() {
            return Err(Error::io(&format!(
                "dump directory {} is not a directory",
                dir.display()
            )));
        }
        fs::create_dir_all(dir)?;
        let name = &self.options.dump_name;
        let paths = DumpPaths {
            markup: dir.join(format!("{}.{}.txt", name, Source::Markup.as_str())),
            binary: dir.join(format!("{}.{}.txt", name, Source::Binary.as_str())),
        };
        write_rows(&paths.markup, markup)?;
        write_rows(&paths.binary, binary)?;
        tracing::info!(
            markup = %paths.markup.display(),
            binary = %paths.binary.display(),
            "wrote canonical streams"
        );
        Ok(paths)
    }

    fn canonicalizer(&self) -> Canonicalizer<'_> {
        Canonicalizer::new(&self.options.rules).with_reorder(self.options.reorder_members)
    }
}

fn read_capture(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::missing_input(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Writes to a sibling temp file and renames it into place, so a reader never
/// sees a half-written dump.
fn write_rows(path: &Path, rows: &[String]) -> Result<()> {
    let tmp = path.with_extension("txt.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        for row in rows {
            writeln!(file, "{}", row)?;
        }
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CanonicalRules, RemovalRule};

    fn no_dump() -> Comparator {
        Comparator::new(CompareOptions::new().with_persist_on_failure(false))
    }

    #[test]
    fn test_first_mismatch_and_length() {
        let markup = vec!["SO A".to_string(), "EO".to_string()];
        let binary = vec!["SO B".to_string(), "EO".to_string(), "Closed.".to_string()];
        let result = no_dump().compare_canonical(&markup, &binary).unwrap();
        assert!(!result.is_equivalent());
        assert_eq!(result.differing_rows, 2);
        let mismatch = result.first_mismatch.unwrap();
        assert_eq!(mismatch.index, 0);
        assert_eq!(mismatch.markup.as_deref(), Some("SO A"));
        assert!(result.dumps.is_none());
    }

    #[test]
    fn test_prefix_is_not_equivalent() {
        let result = no_dump()
            .compare(&["SO A", "SM B", "V 1", "EM", "EO"], &["SO A", "EO"])
            .unwrap();
        assert!(!result.equivalent);
        assert_eq!(result.markup_len, 5);
        assert_eq!(result.binary_len, 2);
    }

    #[test]
    fn test_dumps_written_on_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let comparator = Comparator::new(
            CompareOptions::new()
                .with_dump_dir(dir.path())
                .with_dump_name("case"),
        );
        let result = comparator.compare_text("SO A\nEO", "SO B\nEO").unwrap();
        let dumps = result.dumps.unwrap();
        assert_eq!(dumps.markup, dir.path().join("case.markup.txt"));
        assert_eq!(fs::read_to_string(&dumps.markup).unwrap(), "SO A\nEO\n");
        assert_eq!(fs::read_to_string(&dumps.binary).unwrap(), "SO B\nEO\n");
        assert!(!dir.path().join("case.markup.txt.tmp").exists());
    }

    #[test]
    fn test_no_dumps_when_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        let comparator = Comparator::new(CompareOptions::new().with_dump_dir(dir.path()));
        let result = comparator.compare_text("SO A\nEO", "SO A\nEO").unwrap();
        assert!(result.equivalent);
        assert!(result.dumps.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_binary_only_removal() {
        let rules = CanonicalRules::default().with_removal(RemovalRule::new("x:Key").for_source(Source::Binary));
        let comparator = Comparator::new(
            CompareOptions::new()
                .with_rules(rules)
                .with_persist_on_failure(false),
        );
        let markup = "SO Brush\nSM Color\nV Red\nEM\nEO";
        let binary = "SO Brush\nSM x:Key\nV Key1\nEM\nSM Color\nV #FFFF0000\nEM\nEO";
        assert!(comparator.compare_text(markup, binary).unwrap().equivalent);
        // The rule never strips the markup side.
        assert!(!comparator.compare_text(binary, markup).unwrap().equivalent);
    }

    #[test]
    fn test_dump_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, "").unwrap();
        let comparator = Comparator::new(CompareOptions::new().with_dump_dir(&file));
        let err = comparator.compare_text("SO A\nEO", "SO B\nEO").unwrap_err();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("not a directory")));
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.txt");
        fs::write(&present, "SO A\nEO\n").unwrap();
        let err = no_dump()
            .compare_files(&present, &dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }
}
