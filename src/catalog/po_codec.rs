/*!
 * Gettext PO codec.
 *
 * Converts between PO files and the in-memory [`Catalog`] model. Messages go
 * through `polib`. The header is read and written here and kept as the raw
 * text of the header entry: `polib` only models a fixed set of header fields
 * and refuses headers that lack any of them.
 */

use std::io::Write;
use std::path::Path;

use log::debug;
use polib::catalog::Catalog as PoCatalog;
use polib::message::{Message, MessageFlags, MessageView};
use polib::metadata::CatalogMetadata;
use polib::po_file;
use tempfile::NamedTempFile;

use super::model::{Catalog, DEFAULT_CONTEXT, Entry, EntryMetadata, with_header_field};
use crate::errors::CatalogError;

/// Header handed to `polib` in place of the real one
const PARSER_HEADER: &str = "Project-Id-Version: \n\
    POT-Creation-Date: \n\
    PO-Revision-Date: \n\
    Language-Team: \n\
    MIME-Version: 1.0\n\
    Content-Type: text/plain; charset=UTF-8\n\
    Content-Transfer-Encoding: 8bit\n\
    Language: \n\
    Plural-Forms: nplurals=1; plural=0;\n";

/// A PO file split into its header text and every other line
#[derive(Debug)]
struct PoSource {
    header: Option<String>,
    body: String,
}

/// Parse a PO file into a [`Catalog`]
pub fn parse_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }
    let parse_error = |message: String| CatalogError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    let source = split_source(&text).map_err(parse_error)?;

    let mut staging = NamedTempFile::new().map_err(|e| parse_error(e.to_string()))?;
    write!(staging, "{}\n{}\n", render_header_entry(PARSER_HEADER), source.body)
        .and_then(|_| staging.flush())
        .map_err(|e| parse_error(e.to_string()))?;
    let po = po_file::parse(staging.path()).map_err(|e| parse_error(e.to_string()))?;

    let mut catalog = Catalog::new();
    if let Some(header) = source.header {
        catalog.set_header(header);
    }

    for message in po.messages() {
        // Comment blocks with no entry come back from polib as empty messages
        if message.msgctxt().is_empty() && message.msgid().is_empty() {
            continue;
        }
        let plural_key = if message.is_plural() {
            message.msgid_plural().ok().map(str::to_string)
        } else {
            None
        };
        let forms = if message.is_plural() {
            message.msgstr_plural().map(|forms| forms.to_vec()).unwrap_or_default()
        } else {
            vec![message.msgstr().unwrap_or_default().to_string()]
        };
        let metadata = EntryMetadata {
            comments: message.comments().to_string(),
            source: message.source().to_string(),
            flags: message.flags().entries.clone(),
            plural_key,
        };
        catalog.insert(message.msgctxt(), Entry::new(message.msgid(), forms, metadata));
    }

    debug!("Parsed {} entries from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Write a [`Catalog`] to a PO file.
///
/// The header is written as stored, with `PO-Revision-Date` refreshed. The
/// file is written to a temporary sibling and moved into place, so a failed
/// write never leaves a truncated catalog behind.
pub fn serialize_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let write_error = |source: std::io::Error| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    };

    let revision_date = chrono::Local::now().format("%Y-%m-%d %H:%M%z").to_string();
    let header = with_header_field(
        catalog.header().map(Entry::text).unwrap_or_default(),
        "PO-Revision-Date",
        &revision_date,
    );

    let mut po = PoCatalog::new(CatalogMetadata::new());
    for context in catalog.contexts() {
        let messages = context
            .iter()
            .filter(|entry| !(context.name() == DEFAULT_CONTEXT && entry.is_header()));
        for entry in messages {
            po.append_or_update(to_message(context.name(), entry));
        }
    }

    // polib always emits its own header first; only its messages are kept
    let rendered = NamedTempFile::new().map_err(write_error)?;
    po_file::write(&po, rendered.path()).map_err(write_error)?;
    let rendered = std::fs::read_to_string(rendered.path()).map_err(write_error)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(write_error)?;
    let mut staging = NamedTempFile::new_in(directory).map_err(write_error)?;
    write!(staging, "{}\n{}", render_header_entry(&header), strip_header_entry(&rendered))
        .and_then(|_| staging.flush())
        .map_err(write_error)?;
    staging.persist(path).map_err(|e| write_error(e.error))?;

    debug!("Wrote {} entries to {}", catalog.len(), path.display());
    Ok(())
}

fn to_message(context: &str, entry: &Entry) -> Message {
    let metadata = entry.metadata();
    let mut flags = MessageFlags::new();
    for flag in &metadata.flags {
        flags.add_flag(flag);
    }

    match &metadata.plural_key {
        Some(plural_key) => Message::build_plural()
            .with_msgctxt(context.to_string())
            .with_msgid(entry.key().to_string())
            .with_msgid_plural(plural_key.clone())
            .with_msgstr_plural(entry.forms().to_vec())
            .with_comments(metadata.comments.clone())
            .with_source(metadata.source.clone())
            .with_flags(flags)
            .done(),
        None => Message::build_singular()
            .with_msgctxt(context.to_string())
            .with_msgid(entry.key().to_string())
            .with_msgstr(entry.text().to_string())
            .with_comments(metadata.comments.clone())
            .with_source(metadata.source.clone())
            .with_flags(flags)
            .done(),
    }
}

/// Separate the header entry from the rest of a PO file.
///
/// Lines are normalized on the way: trailing whitespace dropped and keyword
/// values trimmed. Quoted strings must be closed on the line that opens
/// them. Errors carry the 1-based line number.
fn split_source(text: &str) -> Result<PoSource, String> {
    let lines = text
        .lines()
        .enumerate()
        .map(|(number, line)| normalize_line(line).map_err(|message| format!("line {}: {}", number + 1, message)))
        .collect::<Result<Vec<String>, String>>()?;

    // Comment-only blocks ahead of the first entry are dropped
    let mut start = 0;
    while start < lines.len() {
        let end = lines[start..]
            .iter()
            .position(String::is_empty)
            .map_or(lines.len(), |offset| start + offset);
        if lines[start..end].iter().any(|line| split_keyword(line).is_some()) {
            let source = match header_of(&lines[start..end]) {
                Some(header) => PoSource {
                    header: Some(header),
                    body: lines[end..].join("\n"),
                },
                None => PoSource {
                    header: None,
                    body: lines[start..].join("\n"),
                },
            };
            return Ok(source);
        }
        start = end + 1;
    }

    Ok(PoSource {
        header: None,
        body: String::new(),
    })
}

/// Keyword of a content line, or `None` for lines `polib` does not read as one
fn split_keyword(line: &str) -> Option<(&str, &str)> {
    let (keyword, value) = line.split_once(' ')?;
    let plural_index = keyword
        .strip_prefix("msgstr[")
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|index| index.len() == 1 && index.as_bytes()[0].is_ascii_digit());
    let known = plural_index || matches!(keyword, "msgctxt" | "msgid" | "msgid_plural" | "msgstr");
    known.then_some((keyword, value))
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

fn normalize_line(line: &str) -> Result<String, String> {
    let line = line.trim_end();
    if line.starts_with('"') {
        if !is_quoted(line) {
            return Err(format!("unterminated string {}", line));
        }
        return Ok(line.to_string());
    }
    match split_keyword(line) {
        Some((keyword, value)) => {
            let value = value.trim();
            if !is_quoted(value) {
                return Err(format!("{} expects a quoted string", keyword));
            }
            Ok(format!("{} {}", keyword, value))
        }
        None => Ok(line.to_string()),
    }
}

/// Header text when `entry` is the header entry (`msgid ""`, no context)
fn header_of(entry: &[String]) -> Option<String> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    for line in entry {
        if let Some((keyword, value)) = split_keyword(line) {
            fields.push((keyword, value[1..value.len() - 1].to_string()));
        } else if line.starts_with('"') {
            let (_, value) = fields.last_mut()?;
            value.push_str(&line[1..line.len() - 1]);
        }
    }

    let field = |name: &str| fields.iter().find(|(keyword, _)| *keyword == name).map(|(_, value)| value.as_str());
    if field("msgctxt").is_some() || field("msgid_plural").is_some() || field("msgid") != Some("") {
        return None;
    }
    field("msgstr").map(unescape)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

/// Render the header entry with one quoted line per header field
fn render_header_entry(header: &str) -> String {
    let mut entry = String::from("msgid \"\"\nmsgstr \"\"\n");
    for line in header.split_inclusive('\n') {
        entry.push('"');
        entry.push_str(&escape(line));
        entry.push_str("\"\n");
    }
    entry
}

/// Messages of a file written by `polib`, without its leading header entry
fn strip_header_entry(rendered: &str) -> &str {
    let rendered = rendered.trim_start_matches('\n');
    rendered.find("\n\n").map_or("", |end| &rendered[end + 2..])
}
