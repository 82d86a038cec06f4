//! Output formatting.

use interface_synth::Translation;

/// Summary of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Number of `.cs` files discovered.
    pub file_count: usize,
    /// Number of files skipped because they failed to parse.
    pub skipped_count: usize,
    /// Number of interfaces emitted.
    pub declaration_count: usize,
    /// Number of group files emitted.
    pub group_count: usize,
    /// Number of output files that could not be written.
    pub unwritten_count: usize,
}

impl GenerationSummary {
    /// Builds a summary from a translation.
    pub fn new(file_count: usize, skipped_count: usize, translation: &Translation) -> Self {
        Self {
            file_count,
            skipped_count,
            declaration_count: translation.declaration_count(),
            group_count: translation.groups.len(),
            unwritten_count: 0,
        }
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let mut line = format!(
            "====================================\ngenerated {} {} in {} {} from {} {}",
            self.declaration_count,
            plural(self.declaration_count, "interface", "interfaces"),
            self.group_count,
            plural(self.group_count, "module", "modules"),
            self.file_count,
            plural(self.file_count, "file", "files"),
        );
        let mut notes = Vec::new();
        if self.skipped_count > 0 {
            notes.push(format!(
                "{} {} skipped",
                self.skipped_count,
                plural(self.skipped_count, "file", "files")
            ));
        }
        if self.unwritten_count > 0 {
            notes.push(format!(
                "{} {} not written",
                self.unwritten_count,
                plural(self.unwritten_count, "file", "files")
            ));
        }
        if !notes.is_empty() {
            line.push_str(&format!(" ({})", notes.join(", ")));
        }
        line
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
