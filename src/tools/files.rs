/// File Operation Tools
///
/// Thin wrappers around filesystem calls, exposed as MCP tools:
/// `read_file`, `write_file`, `list_directory`, `get_file_info`,
/// `search_files` and `get_current_directory`.
///
/// Each operation is a plain function returning a typed value or a
/// `ToolError`. The text the client sees is produced by the `Display`
/// impls below and by the tool handlers in `register`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::core::error::ToolError;
use crate::core::protocol::{ToolHandler, ToolRegistry};
use crate::tools::{definition, parse_args};

/// Kind of filesystem entry, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    fn of(meta: &Metadata) -> Self {
        if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            EntryKind::File => "📄",
            EntryKind::Directory => "📁",
        }
    }
}

/// Stat `path`, mapping a missing entry to `NotFound` with the given label.
fn stat(path: &str, what: &'static str) -> Result<Metadata, ToolError> {
    fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ToolError::not_found(what, path),
        _ => ToolError::io("read metadata", e),
    })
}

/// Read a file as UTF-8 text.
pub fn read_file(path: &str) -> Result<String, ToolError> {
    if !stat(path, "File")?.is_file() {
        return Err(ToolError::NotAFile(path.to_string()));
    }
    let bytes = fs::read(path).map_err(|e| ToolError::io("read file", e))?;
    String::from_utf8(bytes).map_err(|_| ToolError::InvalidEncoding(path.to_string()))
}

/// Write `content` to `path`, creating parent directories and replacing any
/// existing file. Returns the number of bytes written.
///
/// The write is not atomic: a crash part-way leaves a partial file.
pub fn write_file(path: &str, content: &str) -> Result<usize, ToolError> {
    let target = Path::new(path);
    if target.is_dir() {
        return Err(ToolError::NotAFile(path.to_string()));
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ToolError::io("create parent directories", e))?;
    }
    fs::write(target, content).map_err(|e| ToolError::io("write file", e))?;
    Ok(content.len())
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes; only reported for regular files
    pub size: Option<u64>,
}

/// Sorted listing of a directory's immediate children.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: String,
    pub entries: Vec<DirEntry>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contents of {}:\n\n", self.path)?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let label = match entry.kind {
                EntryKind::Directory => "DIR ",
                EntryKind::File => "FILE",
            };
            match entry.size {
                Some(size) => write!(f, "{} {} {:>8} bytes {}", entry.kind.icon(), label, size, entry.name)?,
                None => write!(f, "{} {}         - {}", entry.kind.icon(), label, entry.name)?,
            }
        }
        Ok(())
    }
}

/// List the immediate children of a directory, sorted by name.
pub fn list_directory(path: &str) -> Result<Listing, ToolError> {
    if !stat(path, "Directory")?.is_dir() {
        return Err(ToolError::NotADirectory(path.to_string()));
    }

    let mut children = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| ToolError::io("list directory", e))? {
        let entry = entry.map_err(|e| ToolError::io("list directory", e))?;
        children.push(entry.path());
    }
    children.sort();

    let entries = children
        .into_iter()
        .map(|child| -> Result<DirEntry, ToolError> {
            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            // Broken symlinks have no target metadata; describe the link itself
            let meta = fs::metadata(&child)
                .or_else(|_| fs::symlink_metadata(&child))
                .map_err(|e| ToolError::io("read metadata", e))?;
            Ok(DirEntry {
                name,
                kind: EntryKind::of(&meta),
                size: meta.is_file().then(|| meta.len()),
            })
        })
        .collect::<Result<Vec<_>, ToolError>>()?;

    Ok(Listing {
        path: path.to_string(),
        entries,
    })
}

/// Metadata snapshot of a single file or directory.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    /// Absolute path, not canonicalized (symlinks are left as-is)
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    /// Seconds since the Unix epoch; null where the platform has no birth time
    pub created: Option<f64>,
    pub modified: Option<f64>,
    /// Permission bits as three octal digits, e.g. "644"
    pub permissions: String,
}

fn epoch_seconds(time: io::Result<SystemTime>) -> Option<f64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> String {
    let bits = if meta.permissions().readonly() { "444" } else { "666" };
    bits.to_string()
}

/// Collect name, absolute path, type, size, timestamps and permissions.
pub fn get_file_info(path: &str) -> Result<FileInfo, ToolError> {
    let meta = stat(path, "Path")?;
    let absolute: PathBuf =
        std::path::absolute(path).map_err(|e| ToolError::io("resolve absolute path", e))?;
    let name = absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileInfo {
        name,
        path: absolute.display().to_string(),
        kind: EntryKind::of(&meta),
        size: meta.len(),
        created: epoch_seconds(meta.created()),
        modified: epoch_seconds(meta.modified()),
        permissions: permission_bits(&meta),
    })
}

/// One path matched by `search_files`, relative to the search root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// `/`-separated path relative to the search directory
    pub path: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub pattern: String,
    pub directory: String,
    pub matches: Vec<SearchMatch>,
}

impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            return write!(
                f,
                "No files found matching pattern '{}' in {}",
                self.pattern, self.directory
            );
        }
        write!(f, "Files matching '{}' in {}:\n\n", self.pattern, self.directory)?;
        for (i, m) in self.matches.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{} {}", m.kind.icon(), m.path)?;
        }
        Ok(())
    }
}

/// `*` and `?` never cross a `/`; `**` as a whole component spans directories.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Drop `.` components and empty segments (`./src//*.rs` -> `src/*.rs`).
fn normalize_pattern(pattern: &str) -> String {
    pattern
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Find every path under `directory` whose relative path matches the
/// shell-glob `pattern`. Files and directories match only on their own path.
///
/// Symlinked directories are reported but not descended into; unreadable
/// entries are skipped.
///
/// # Arguments
/// * `pattern` - Glob relative to `directory`, e.g. `*.py` or `**/*.rs`
/// * `directory` - Root of the search
pub fn search_files(pattern: &str, directory: &str) -> Result<SearchResults, ToolError> {
    let invalid = |reason: String| ToolError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };
    if pattern.starts_with('/') || Path::new(pattern).is_absolute() {
        return Err(invalid("pattern must be relative to the search directory".to_string()));
    }
    let normalized = normalize_pattern(pattern);
    if normalized.is_empty() {
        return Err(invalid("pattern is empty".to_string()));
    }
    let compiled = Pattern::new(&normalized)
        .map_err(|e| invalid(format!("{} at position {}", e.msg, e.pos)))?;

    if !stat(directory, "Directory")?.is_dir() {
        return Err(ToolError::NotADirectory(directory.to_string()));
    }

    // Without `**` nothing deeper than the pattern's own component count can match
    let max_depth = if normalized.contains("**") {
        usize::MAX
    } else {
        normalized.split('/').count()
    };

    let root = Path::new(directory);
    let mut matches: Vec<SearchMatch> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| tracing::debug!(error = %e, "skipping unreadable entry"))
                .ok()
        })
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !compiled.matches_with(&relative, MATCH_OPTIONS) {
                return None;
            }
            let kind = if entry.path().is_dir() { EntryKind::Directory } else { EntryKind::File };
            Some(SearchMatch { path: relative, kind })
        })
        .collect();
    matches.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(SearchResults {
        pattern: pattern.to_string(),
        directory: directory.to_string(),
        matches,
    })
}

/// Absolute path of the process working directory.
pub fn get_current_directory() -> Result<PathBuf, ToolError> {
    std::env::current_dir().map_err(|e| ToolError::io("determine current directory", e))
}

fn current_dir_default() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize)]
struct FilePathArgs {
    #[serde(alias = "path")]
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    #[serde(alias = "path")]
    file_path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ListDirectoryArgs {
    #[serde(alias = "path", default = "current_dir_default")]
    directory_path: String,
}

#[derive(Debug, Deserialize)]
struct SearchFilesArgs {
    pattern: String,
    #[serde(default = "current_dir_default")]
    directory: String,
}

#[derive(Debug, Deserialize)]
struct NoArgs {}

fn path_schema(field: &str, description: &str, required: bool) -> Value {
    let mut schema = serde_json::json!({
        "type": "object",
        "properties": {
            field: { "type": "string", "description": description }
        }
    });
    if required {
        schema["required"] = serde_json::json!([field]);
    }
    schema
}

/// Register the file operation tools with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: FilePathArgs = parse_args(args)?;
        read_file(&args.file_path).map(Value::String)
    });
    registry.register(
        definition(
            "read_file",
            "Read the contents of a file.",
            path_schema("file_path", "Path to the file to read", true),
        ),
        handler,
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: WriteFileArgs = parse_args(args)?;
        let written = write_file(&args.file_path, &args.content)?;
        Ok(Value::String(format!(
            "Successfully wrote {} bytes to {}",
            written, args.file_path
        )))
    });
    registry.register(
        definition(
            "write_file",
            "Write content to a file, creating parent directories as needed.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file to write" },
                    "content": { "type": "string", "description": "Content to write to the file" }
                },
                "required": ["file_path", "content"]
            }),
        ),
        handler,
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: ListDirectoryArgs = parse_args(args)?;
        list_directory(&args.directory_path).map(|listing| Value::String(listing.to_string()))
    });
    registry.register(
        definition(
            "list_directory",
            "List the contents of a directory.",
            path_schema(
                "directory_path",
                "Path to the directory to list (default: current directory)",
                false,
            ),
        ),
        handler,
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: FilePathArgs = parse_args(args)?;
        let info = get_file_info(&args.file_path)?;
        Ok(Value::String(serde_json::to_string_pretty(&info)?))
    });
    registry.register(
        definition(
            "get_file_info",
            "Get detailed information about a file or directory as JSON.",
            path_schema("file_path", "Path to the file or directory", true),
        ),
        handler,
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: SearchFilesArgs = parse_args(args)?;
        search_files(&args.pattern, &args.directory).map(|found| Value::String(found.to_string()))
    });
    registry.register(
        definition(
            "search_files",
            "Search for files matching a glob pattern (e.g. *.py or **/*.rs).",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "File name pattern (supports wildcards like *.py)" },
                    "directory": { "type": "string", "description": "Directory to search in (default: current directory)" }
                },
                "required": ["pattern"]
            }),
        ),
        handler,
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let _: NoArgs = parse_args(args)?;
        let cwd = get_current_directory()?;
        Ok(Value::String(format!("Current directory: {}", cwd.display())))
    });
    registry.register(
        definition(
            "get_current_directory",
            "Get the current working directory.",
            serde_json::json!({ "type": "object", "properties": {} }),
        ),
        handler,
    );
}
