//! Markdown reference tables generated from a JSON token table.
//!
//! ```json
//! {
//!   "keywords": [{ "token": "struct", "description": "Declares a struct" }],
//!   "tokens": [{ "token": "=>", "description": "Match arm" }]
//! }
//! ```
//!
//! Each category becomes `<out>/<category>.md`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One documented token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDoc {
    /// The token text, rendered as inline code.
    pub token: String,

    /// What the token means.
    pub description: String,
}

/// Tokens grouped by category name.
pub type TokenTable = BTreeMap<String, Vec<TokenDoc>>;

/// Load a token table from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid token table.
pub fn load_tokens(path: &Path) -> Result<TokenTable> {
    let content = std::fs::read_to_string(path).map_err(Error::io(path))?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render one category as a Markdown page.
#[must_use]
pub fn render_category(name: &str, tokens: &[TokenDoc]) -> String {
    let mut out = format!("# {}\n", title_case(name));
    out.push_str("| Token | Description |\n");
    out.push_str("|:------|:------------|\n");
    for doc in tokens {
        let _ = writeln!(
            out,
            "| `{}` | {} |",
            escape_cell(&doc.token),
            escape_cell(&doc.description)
        );
    }
    out
}

/// Write one page per category into `out_dir`, returning the written paths.
///
/// # Errors
///
/// Returns an error if the directory or a page cannot be written.
pub fn write_docs(table: &TokenTable, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(Error::io(out_dir))?;

    let mut written = Vec::with_capacity(table.len());
    for (category, tokens) in table {
        let path = out_dir.join(format!("{category}.md"));
        std::fs::write(&path, render_category(category, tokens)).map_err(Error::io(&path))?;
        debug!(path = %path.display(), tokens = tokens.len(), "wrote syntax page");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token(token: &str, description: &str) -> TokenDoc {
        TokenDoc {
            token: token.into(),
            description: description.into(),
        }
    }

    #[test]
    fn renders_table() {
        let page = render_category("keywords", &[token("struct", "Declares a struct")]);
        assert_eq!(
            page,
            "# Keywords\n| Token | Description |\n|:------|:------------|\n| `struct` | Declares a struct |\n"
        );
    }

    #[test]
    fn pipes_are_escaped() {
        let page = render_category("tokens", &[token("|", "Union of types")]);
        assert!(page.contains("| `\\|` | Union of types |"));
    }

    #[test]
    fn writes_one_page_per_category() {
        let tmp = TempDir::new().unwrap();
        let tokens_path = tmp.path().join("syntax.json");
        std::fs::write(
            &tokens_path,
            r#"{
                "builtin": [{ "token": "str", "description": "UTF-8 string" }],
                "tokens": [{ "token": "=>", "description": "Match arm" }]
            }"#,
        )
        .unwrap();

        let table = load_tokens(&tokens_path).unwrap();
        let out = tmp.path().join("docs/src/syntax");
        let written = write_docs(&table, &out).unwrap();

        assert_eq!(written, vec![out.join("builtin.md"), out.join("tokens.md")]);
        let builtin = std::fs::read_to_string(out.join("builtin.md")).unwrap();
        assert!(builtin.starts_with("# Builtin\n"));
        assert!(builtin.contains("| `str` | UTF-8 string |"));
    }

    #[test]
    fn invalid_token_file_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let tokens_path = tmp.path().join("syntax.json");
        std::fs::write(&tokens_path, "{\"tokens\": 3}").unwrap();
        assert!(matches!(load_tokens(&tokens_path), Err(Error::Json { .. })));
    }
}
