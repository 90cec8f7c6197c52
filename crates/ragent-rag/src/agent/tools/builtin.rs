//! Ready-made tools: arithmetic, fixed lookup tables and read-only file access
//!
//! The file-system tools are bound to a root directory. Any path that resolves
//! outside that root, symlinks included, is refused.

use super::registry::Tool;
use super::schema::{ParameterSpec, ParameterType, ToolSchema};
use anyhow::{anyhow, bail, Context};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Characters of file content returned before truncating
pub const MAX_FILE_CHARS: usize = 5000;

/// Appended to truncated file content
pub const TRUNCATION_MARKER: &str = "\n...[Truncated]";

/// `add(a, b)`: sum of two numbers
///
/// Two integers give an integer, anything else a float.
pub fn add() -> Tool {
    let schema = ToolSchema::new()
        .with(ParameterSpec::required("a", ParameterType::Number, "First number"))
        .with(ParameterSpec::required("b", ParameterType::Number, "Second number"));

    Tool::from_fn("add", "Add two numbers together.", schema, add_numbers)
}

async fn add_numbers(args: Map<String, Value>) -> anyhow::Result<Value> {
    let (a, b) = (&args["a"], &args["b"]);

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Ok(json!(sum));
        }
    }

    let x = a.as_f64().ok_or_else(|| anyhow!("'a' is not a number"))?;
    let y = b.as_f64().ok_or_else(|| anyhow!("'b' is not a number"))?;
    Ok(json!(x + y))
}

/// A tool answering from a fixed table
///
/// The single string parameter `key_param` selects the entry; unknown keys get
/// `fallback`.
pub fn lookup_table<I, K, V>(
    name: impl Into<String>,
    description: impl Into<String>,
    key_param: impl Into<String>,
    table: I,
    fallback: impl Into<String>,
) -> Tool
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let key_param = key_param.into();
    let fallback = fallback.into();
    let table: Arc<HashMap<String, String>> = Arc::new(
        table
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    );

    let schema = ToolSchema::new().with(ParameterSpec::required(
        key_param.clone(),
        ParameterType::String,
        "Lookup key",
    ));

    Tool::from_fn(name, description, schema, move |args: Map<String, Value>| {
        let table = Arc::clone(&table);
        let key = args
            .get(&key_param)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let fallback = fallback.clone();

        async move {
            let answer = table.get(&key).cloned().unwrap_or(fallback);
            Ok::<_, anyhow::Error>(Value::String(answer))
        }
    })
}

/// `list_directory(path)`: entry names under `root`, one per line
///
/// Names are sorted; directories carry a trailing `/`.
pub fn list_directory(root: impl Into<PathBuf>) -> Tool {
    let root = root.into();
    let schema = ToolSchema::new().with(ParameterSpec::required(
        "path",
        ParameterType::String,
        "The directory path to list, relative to the working directory",
    ));

    Tool::from_fn(
        "list_directory",
        "List files in a directory",
        schema,
        move |args: Map<String, Value>| list_entries(root.clone(), args),
    )
}

async fn list_entries(root: PathBuf, args: Map<String, Value>) -> anyhow::Result<Value> {
    let path = resolve_within(&root, string_arg(&args, "path")?).await?;

    let mut reader = tokio::fs::read_dir(&path)
        .await
        .with_context(|| format!("cannot list {}", path.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    debug!(path = %path.display(), entries = names.len(), "Listed directory");
    Ok(Value::String(names.join("\n")))
}

/// `read_file(path)`: UTF-8 content of a file under `root`
///
/// Content longer than [`MAX_FILE_CHARS`] is cut and marked with [`TRUNCATION_MARKER`].
pub fn read_file(root: impl Into<PathBuf>) -> Tool {
    let root = root.into();
    let schema = ToolSchema::new().with(ParameterSpec::required(
        "path",
        ParameterType::String,
        "The path to the file to read",
    ));

    Tool::from_fn(
        "read_file",
        "Read the contents of a file",
        schema,
        move |args: Map<String, Value>| read_contents(root.clone(), args),
    )
}

async fn read_contents(root: PathBuf, args: Map<String, Value>) -> anyhow::Result<Value> {
    let path = resolve_within(&root, string_arg(&args, "path")?).await?;

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;

    debug!(path = %path.display(), bytes = content.len(), "Read file");
    Ok(Value::String(truncate_chars(content, MAX_FILE_CHARS)))
}

/// `list_directory` and `read_file` bound to `root`
pub fn filesystem_tools(root: impl AsRef<Path>) -> Vec<Tool> {
    let root = root.as_ref();
    vec![list_directory(root), read_file(root)]
}

fn string_arg<'a>(args: &'a Map<String, Value>, name: &str) -> anyhow::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("'{name}' must be a string"))
}

/// Canonical form of `relative` joined onto `root`, refusing escapes
async fn resolve_within(root: &Path, relative: &str) -> anyhow::Result<PathBuf> {
    let root = tokio::fs::canonicalize(root)
        .await
        .with_context(|| format!("working directory {} is not accessible", root.display()))?;

    let candidate = tokio::fs::canonicalize(root.join(relative))
        .await
        .with_context(|| format!("no such path: {relative}"))?;

    if !candidate.starts_with(&root) {
        bail!("access denied: {relative} is outside the working directory");
    }

    Ok(candidate)
}

fn truncate_chars(content: String, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content,
    }
}
