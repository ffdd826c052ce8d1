//! A single configuration file as an ordered list of [`Line`]s.
//!
//! Sections and variables are not indexed; every query scans the lines. A
//! *section block* runs from a section header to the line before the next
//! header. Sections compare case-insensitively, subsections and variable
//! names case-sensitively. A matching block with no matching variables is
//! still a block, so `set` appends into it instead of repeating the header.
//!
//! Every mutating method writes the whole file back before returning.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::grammar;
use crate::line::{Line, LineEnding};
use crate::matcher::ValueMatcher;
use crate::persist;
use crate::scanner::ParseError;
use crate::types::{ConfigEntry, ConfigKey, ConfigLevel};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy)]
struct Block {
    header: usize,
    /// Exclusive: the next header, or the end of the file.
    end: usize,
}

impl Block {
    fn body(&self) -> std::ops::Range<usize> {
        self.header + 1..self.end
    }
}

#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    level: Option<ConfigLevel>,
    lines: Vec<Line>,
    newline: LineEnding,
    /// The file started with a UTF-8 byte-order mark.
    bom: bool,
}

impl ConfigDocument {
    /// Load `path`. A missing file yields an empty document.
    pub fn load(path: impl Into<PathBuf>, level: Option<ConfigLevel>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = persist::read_optional(&path)?.unwrap_or_default();
        Self::parse(path, level, &content)
    }

    /// Parse `content` as the document backing `path`. Any malformed line
    /// fails the whole document.
    pub fn parse(
        path: impl Into<PathBuf>,
        level: Option<ConfigLevel>,
        content: &str,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        let (bom, content) = match content.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, content),
        };
        let mut lines = Vec::new();
        let mut newline = None;
        let mut in_section = false;

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let (text, ending) = if let Some(text) = raw.strip_suffix("\r\n") {
                (text, LineEnding::CrLf)
            } else if let Some(text) = raw.strip_suffix('\n') {
                (text, LineEnding::Lf)
            } else {
                (raw, LineEnding::None)
            };
            if ending != LineEnding::None {
                newline.get_or_insert(ending);
            }

            let mut line = Line::parse(text, index + 1, in_section);
            if let Some((message, position)) = line.error() {
                return Err(ConfigError::Parse {
                    path,
                    line: position.line,
                    column: position.column,
                    message: message.to_string(),
                    source_line: text.to_string(),
                    offset: position.offset,
                });
            }
            in_section |= line.is_section();
            line.set_ending(ending);
            lines.push(line);
        }

        Ok(Self {
            path,
            level,
            lines,
            newline: newline.unwrap_or(LineEnding::Lf),
            bom,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> Option<ConfigLevel> {
        self.level
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The file content: every line verbatim with its original terminator.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        for line in &self.lines {
            out.push_str(line.text());
            out.push_str(line.ending().as_str());
        }
        out
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        persist::write(&self.path, &self.render())
    }

    // -- reading ------------------------------------------------------------

    /// Every variable line, in file order.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        let mut entries = Vec::new();
        let mut current: Option<(&str, Option<&str>)> = None;

        for line in &self.lines {
            if let Some(section) = line.section() {
                current = Some(section);
            } else if let (Some((section, subsection)), Some((name, value))) =
                (current, line.variable())
            {
                entries.push(ConfigEntry {
                    section: section.to_string(),
                    subsection: subsection.map(str::to_string),
                    variable: name.to_string(),
                    value: value.map(str::to_string),
                    level: self.level,
                    path: self.path.clone(),
                    line: line.number(),
                });
            }
        }
        entries
    }

    /// All entries for `section.subsection.name` whose value satisfies `matcher`.
    pub fn get_all(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        matcher: &ValueMatcher,
    ) -> Vec<ConfigEntry> {
        let key = ConfigKey::new(section, subsection, name);
        self.entries()
            .into_iter()
            .filter(|e| key.matches(&e.section, e.subsection.as_deref(), &e.variable))
            .filter(|e| matcher.matches(e.value.as_deref()))
            .collect()
    }

    /// The effective entry for a key: the last one in the file.
    pub fn get(&self, section: &str, subsection: Option<&str>, name: &str) -> Option<ConfigEntry> {
        self.get_all(section, subsection, name, &ValueMatcher::All)
            .pop()
    }

    // -- writing ------------------------------------------------------------

    /// Append a new variable line; the only way to make a variable multi-valued.
    pub fn add(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, Some(name))?;
        self.insert_variable(section, subsection, name, value)?;
        self.save()
    }

    /// Update the single matching variable, or add it if none matches.
    pub fn set(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        value: Option<&str>,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, Some(name))?;
        let found = self.find_variables(section, subsection, name, matcher);
        match found.as_slice() {
            [] => self.insert_variable(section, subsection, name, value)?,
            [index] => self.lines[*index].set_value(value),
            _ => return Err(multi_valued(section, subsection, name)),
        }
        self.save()
    }

    /// Update every matching variable. Never creates one.
    pub fn set_all(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        value: Option<&str>,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, Some(name))?;
        let found = self.find_variables(section, subsection, name, matcher);
        if found.is_empty() {
            return Ok(());
        }
        for index in found {
            self.lines[index].set_value(value);
        }
        self.save()
    }

    /// Remove the single variable with this name.
    pub fn unset(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, Some(name))?;
        let found = self.find_variables(section, subsection, name, &ValueMatcher::All);
        match found.as_slice() {
            [] => Ok(()),
            [_] => {
                self.remove_variables(section, subsection, &found);
                self.save()
            }
            _ => Err(multi_valued(section, subsection, name)),
        }
    }

    /// Remove every matching variable, across repeated blocks.
    pub fn unset_all(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, Some(name))?;
        let found = self.find_variables(section, subsection, name, matcher);
        if found.is_empty() {
            return Ok(());
        }
        self.remove_variables(section, subsection, &found);
        self.save()
    }

    /// Remove every block headed by a matching section, from the header up
    /// to the next empty line or header.
    pub fn remove_section(
        &mut self,
        section: &str,
        subsection: Option<&str>,
    ) -> Result<(), ConfigError> {
        validate(section, subsection, None)?;
        let mut removed = false;
        let mut index = 0;

        while index < self.lines.len() {
            if !header_matches(&self.lines[index], section, subsection) {
                index += 1;
                continue;
            }
            let end = self.lines[index + 1..]
                .iter()
                .position(|l| l.is_empty() || l.is_section())
                .map_or(self.lines.len(), |offset| index + 1 + offset);
            self.lines.drain(index..end);
            self.collapse_blank_at(index);
            removed = true;
        }

        if !removed {
            return Ok(());
        }
        while self.lines.first().is_some_and(Line::is_empty) {
            self.lines.remove(0);
        }
        while self.lines.last().is_some_and(Line::is_empty) {
            self.lines.pop();
        }
        self.renumber();
        self.save()
    }

    /// Rewrite every matching header, leaving its variables alone.
    pub fn rename_section(
        &mut self,
        old_section: &str,
        old_subsection: Option<&str>,
        new_section: &str,
        new_subsection: Option<&str>,
    ) -> Result<(), ConfigError> {
        validate(old_section, old_subsection, None)?;
        validate(new_section, new_subsection, None)?;

        let mut renamed = false;
        for line in &mut self.lines {
            if header_matches(line, old_section, old_subsection) {
                line.set_section(new_section, new_subsection);
                renamed = true;
            }
        }
        if renamed { self.save() } else { Ok(()) }
    }

    // -- internals ----------------------------------------------------------

    fn blocks(&self, section: &str, subsection: Option<&str>) -> Vec<Block> {
        let headers: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_section())
            .map(|(i, _)| i)
            .collect();

        headers
            .iter()
            .enumerate()
            .filter(|(_, i)| header_matches(&self.lines[**i], section, subsection))
            .map(|(n, header)| Block {
                header: *header,
                end: headers.get(n + 1).copied().unwrap_or(self.lines.len()),
            })
            .collect()
    }

    fn find_variables(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        matcher: &ValueMatcher,
    ) -> Vec<usize> {
        self.blocks(section, subsection)
            .iter()
            .flat_map(|block| block.body())
            .filter(|i| {
                self.lines[*i]
                    .variable()
                    .is_some_and(|(n, value)| n == name && matcher.matches(value))
            })
            .collect()
    }

    fn insert_variable(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), ConfigError> {
        let line = Line::new_variable(name, value).map_err(invalid_name)?;

        match self.blocks(section, subsection).last() {
            Some(block) => {
                let at = block
                    .body()
                    .rev()
                    .find(|i| self.lines[*i].variable().is_some())
                    .unwrap_or(block.header)
                    + 1;
                self.insert_line(at, line);
            }
            None => {
                let header = Line::new_section(section, subsection).map_err(invalid_name)?;
                self.insert_line(self.lines.len(), header);
                self.insert_line(self.lines.len(), line);
            }
        }
        Ok(())
    }

    fn insert_line(&mut self, at: usize, mut line: Line) {
        if at == self.lines.len()
            && let Some(last) = self.lines.last_mut()
            && last.ending() == LineEnding::None
        {
            last.set_ending(self.newline);
        }
        line.set_ending(self.newline);
        self.lines.insert(at, line);
        self.renumber();
    }

    /// Remove the variable lines at `indices` and drop any affected block
    /// left with nothing but blank lines.
    fn remove_variables(&mut self, section: &str, subsection: Option<&str>, indices: &[usize]) {
        for block in self.blocks(section, subsection).iter().rev() {
            let mut targets: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|i| block.body().contains(i))
                .collect();
            if targets.is_empty() {
                continue;
            }
            targets.sort_unstable();
            for index in targets.iter().rev() {
                self.lines.remove(*index);
            }

            // A later block's cleanup may have popped this block's trailing blank.
            let end = (block.end - targets.len()).min(self.lines.len());
            if self.lines[block.header + 1..end].iter().all(Line::is_empty) {
                debug!(section, "removing emptied section");
                self.lines.drain(block.header..end);
                self.collapse_blank_at(block.header);
            }
        }
        self.renumber();
    }

    /// After removing lines at `at`, drop one blank line left dangling at a
    /// file boundary or doubled up at the seam.
    fn collapse_blank_at(&mut self, at: usize) {
        let len = self.lines.len();
        if at == len {
            if at > 0 && self.lines[at - 1].is_empty() {
                self.lines.pop();
            }
        } else if at == 0 {
            if self.lines[0].is_empty() {
                self.lines.remove(0);
            }
        } else if self.lines[at - 1].is_empty() && self.lines[at].is_empty() {
            self.lines.remove(at);
        }
    }

    fn renumber(&mut self) {
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.set_number(index + 1);
        }
    }
}

fn header_matches(line: &Line, section: &str, subsection: Option<&str>) -> bool {
    line.section()
        .is_some_and(|(s, sub)| s.eq_ignore_ascii_case(section) && sub == subsection)
}

fn validate(section: &str, subsection: Option<&str>, name: Option<&str>) -> Result<(), ConfigError> {
    grammar::validate_section(section).map_err(invalid_name)?;
    if let Some(sub) = subsection {
        grammar::validate_subsection(sub).map_err(invalid_name)?;
    }
    if let Some(name) = name {
        grammar::validate_variable(name).map_err(invalid_name)?;
    }
    Ok(())
}

fn invalid_name(e: ParseError) -> ConfigError {
    ConfigError::InvalidName {
        message: e.message,
        position: e.position,
    }
}

fn multi_valued(section: &str, subsection: Option<&str>, name: &str) -> ConfigError {
    ConfigError::MultiValued {
        key: ConfigKey::new(section, subsection, name).to_string(),
    }
}
