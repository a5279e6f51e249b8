use std::fmt;
use std::path::Path;

/// Language hint handed to the editing widget. Detection looks at the file
/// extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    PlainText,
    Rust,
    JavaScript,
    TypeScript,
    Json,
    Html,
    Css,
    Markdown,
    Python,
    Toml,
    Yaml,
    Shell,
    C,
    Cpp,
    Go,
    Java,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "json" => Language::Json,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "md" | "markdown" => Language::Markdown,
            "py" => Language::Python,
            "toml" => Language::Toml,
            "yml" | "yaml" => Language::Yaml,
            "sh" | "bash" | "zsh" => Language::Shell,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Language::Cpp,
            "go" => Language::Go,
            "java" => Language::Java,
            _ => Language::PlainText,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Language::PlainText => "plaintext",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Json => "json",
            Language::Html => "html",
            Language::Css => "css",
            Language::Markdown => "markdown",
            Language::Python => "python",
            Language::Toml => "toml",
            Language::Yaml => "yaml",
            Language::Shell => "shell",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
