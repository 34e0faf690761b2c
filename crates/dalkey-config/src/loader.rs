//! Config file discovery and parsing.
//!
//! Loads `dalkey.config.js` or `vite.config.js` from a project root and
//! extracts the partial configuration from its `export default { ... }`
//! object literal. A `defineConfig({ ... })` wrapper around the object is
//! accepted too. The literal is JS, not JSON: unquoted keys, single
//! quotes, trailing commas, and comments are all accepted.
//!
//! ```js
//! export default {
//!   plugins: [],
//!   build: {
//!     entryPoints: ["./index.html"],
//!   },
//!   server: {
//!     host: false,
//!   },
//! };
//! ```
//!
//! Unlike a lenient extractor, shape violations here are hard errors: a
//! numeric `server.host` or a non-string entry point fails with the field
//! path instead of being dropped.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{PartialBuildOptions, PartialConfig, PartialServerOptions, PluginSpec};
use crate::error::ConfigError;
use crate::host::HostBinding;

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &["dalkey.config.js", "vite.config.js"];

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
}

/// Load the partial configuration from a config file in `root`.
///
/// If `config_path` is `Some`, that file is used (relative paths resolve
/// against `root`); otherwise the file is auto-discovered. Returns
/// `Ok(None)` when no config file exists, which callers treat as an
/// all-defaults configuration.
pub fn load_config(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, PartialConfig)>, ConfigError> {
    let path = match config_path {
        Some(p) => {
            let abs = if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            };
            if !abs.exists() {
                return Err(ConfigError::NotFound { path: abs });
            }
            abs
        }
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let partial = parse_config_source(&path, &source)?;
    Ok(Some((path, partial)))
}

/// Parse config file source into a partial configuration.
///
/// `path` is used for error reporting only; no filesystem access happens.
pub fn parse_config_source(path: &Path, source: &str) -> Result<PartialConfig, ConfigError> {
    let stripped = strip_comments(source);
    let literal =
        default_export_literal(&stripped).ok_or_else(|| ConfigError::Parse {
            path: path.to_path_buf(),
            message: "no `export default { ... }` found in config file".to_string(),
        })?;

    let value = LiteralParser::new(literal)
        .parse()
        .map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

    partial_from_value(&value)
}

/// Locate the object literal after `export default`, including its braces.
///
/// A single identifier-call wrapper around the object is skipped, so both
/// `export default { ... }` and Vite's `export default defineConfig({ ... })`
/// work. Expects comment-free source. Returns `None` when the marker is
/// missing or the braces never balance.
fn default_export_literal(source: &str) -> Option<&str> {
    let marker = "export default";
    let start = source.find(marker)? + marker.len();
    let mut rest = source[start..].trim_start();

    if !rest.starts_with('{') {
        // `defineConfig({ ... })` and friends: skip the identifier and the
        // opening paren, then expect the object literal.
        let ident_len = rest
            .find(|ch: char| !(ch.is_alphanumeric() || matches!(ch, '_' | '$')))
            .unwrap_or(rest.len());
        if ident_len == 0 {
            return None;
        }
        rest = rest[ident_len..].trim_start();
        rest = rest.strip_prefix('(')?.trim_start();
    }
    if !rest.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in rest.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => in_string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `//` and `/* */` comments while leaving string contents intact.
fn strip_comments(source: &str) -> String {
    enum State {
        Code,
        Str(char),
        Line,
        Block,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::Block;
                }
                '"' | '\'' | '`' => {
                    out.push(ch);
                    state = State::Str(ch);
                    escaped = false;
                }
                _ => out.push(ch),
            },
            State::Str(quote) => {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    state = State::Code;
                }
            }
            State::Line => {
                if ch == '\n' {
                    out.push('\n');
                    state = State::Code;
                }
            }
            State::Block => {
                if ch == '\n' {
                    // Keep line structure for error positions.
                    out.push('\n');
                } else if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }

    out
}

/// Recursive-descent parser for a JS object literal.
///
/// Produces a `serde_json::Value`. Accepts unquoted keys, single- and
/// backtick-quoted strings, trailing commas, and nested objects/arrays.
struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Value, String> {
        let value = self.parse_value()?;
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(format!("trailing input at position {}", self.pos));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"' | '\'' | '`') => self.parse_string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if ch.is_alphabetic() => self.parse_word(),
            Some(ch) => Err(format!("unexpected character '{ch}' at position {}", self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_object(&mut self) -> Result<Value, String> {
        self.bump(); // '{'
        let mut map = serde_json::Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            if self.peek().is_none() {
                return Err("unterminated object".to_string());
            }

            let key = self.parse_key()?;
            self.skip_ws();
            if self.bump() != Some(':') {
                return Err(format!("expected ':' after key `{key}`"));
            }
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') | None => {}
                Some(ch) => return Err(format!("expected ',' or '}}' in object, got '{ch}'")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, String> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            if self.peek().is_none() {
                return Err("unterminated array".to_string());
            }

            items.push(self.parse_value()?);

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') | None => {}
                Some(ch) => return Err(format!("expected ',' or ']' in array, got '{ch}'")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, String> {
        self.skip_ws();
        match self.peek() {
            Some('"' | '\'' | '`') => self.parse_string(),
            Some(ch) if ch.is_alphabetic() || matches!(ch, '_' | '$') => {
                let mut key = String::new();
                while let Some(ch) = self.peek() {
                    // Dots allowed for keys like `process.env.NODE_ENV`.
                    if ch.is_alphanumeric() || matches!(ch, '_' | '$' | '.') {
                        key.push(ch);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(key)
            }
            Some(ch) => Err(format!("expected object key, got '{ch}'")),
            None => Err("expected object key, got end of input".to_string()),
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or("expected string")?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some(ch) if ch == quote => out.push(ch),
                    Some(ch) => {
                        out.push('\\');
                        out.push(ch);
                    }
                    None => return Err("unterminated string escape".to_string()),
                },
                Some(ch) => out.push(ch),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else if ch == '.' && !is_float {
                is_float = true;
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        if is_float {
            let n: f64 = text.parse().map_err(|e| format!("invalid number '{text}': {e}"))?;
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| format!("invalid number '{text}'"))
        } else {
            let n: i64 = text.parse().map_err(|e| format!("invalid number '{text}': {e}"))?;
            Ok(Value::Number(n.into()))
        }
    }

    fn parse_word(&mut self) -> Result<Value, String> {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_alphanumeric() {
                break;
            }
            word.push(ch);
            self.bump();
        }
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            other => Err(format!("unexpected token `{other}`")),
        }
    }
}

/// Shape-check a parsed config object into a [`PartialConfig`].
///
/// Field paths in errors use the names as authored in the config file.
/// Unknown keys are ignored for forward compatibility.
fn partial_from_value(value: &Value) -> Result<PartialConfig, ConfigError> {
    let Some(obj) = value.as_object() else {
        return Err(ConfigError::shape("config", "expected an object"));
    };

    let mut partial = PartialConfig::default();

    if let Some(plugins) = obj.get("plugins") {
        let Some(items) = plugins.as_array() else {
            return Err(ConfigError::shape(
                "plugins",
                "expected an array of plugin descriptors",
            ));
        };
        partial.plugins = Some(items.iter().cloned().map(PluginSpec).collect());
    }

    if let Some(build) = obj.get("build") {
        let Some(build_obj) = build.as_object() else {
            return Err(ConfigError::shape("build", "expected an object"));
        };
        partial.build = Some(build_options_from_value(build_obj)?);
    }

    if let Some(server) = obj.get("server") {
        let Some(server_obj) = server.as_object() else {
            return Err(ConfigError::shape("server", "expected an object"));
        };
        let mut options = PartialServerOptions::default();
        if let Some(host) = server_obj.get("host") {
            options.host = Some(host_from_value(host)?);
        }
        partial.server = Some(options);
    }

    Ok(partial)
}

fn build_options_from_value(
    build: &serde_json::Map<String, Value>,
) -> Result<PartialBuildOptions, ConfigError> {
    let mut options = PartialBuildOptions::default();

    if let Some(entries) = build.get("entryPoints") {
        options.entry_points = Some(entry_list(entries, "build.entryPoints")?);
    } else if let Some(rollup) = build.get("rollupOptions") {
        // Vite compatibility: `build.rollupOptions.input`, string or array.
        let Some(rollup_obj) = rollup.as_object() else {
            return Err(ConfigError::shape("build.rollupOptions", "expected an object"));
        };
        if let Some(input) = rollup_obj.get("input") {
            let field = "build.rollupOptions.input";
            options.entry_points = Some(match input {
                Value::String(s) => vec![s.clone()],
                other => entry_list(other, field)?,
            });
        }
    }

    Ok(options)
}

fn entry_list(value: &Value, field: &str) -> Result<Vec<String>, ConfigError> {
    let Some(items) = value.as_array() else {
        return Err(ConfigError::shape(field, "expected an array of string paths"));
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ConfigError::shape(
                format!("{field}[{idx}]"),
                "expected a string path",
            )),
        })
        .collect()
}

fn host_from_value(value: &Value) -> Result<HostBinding, ConfigError> {
    match value {
        Value::Bool(true) => Ok(HostBinding::AllInterfaces),
        Value::Bool(false) => Ok(HostBinding::Loopback),
        Value::String(s) if !s.is_empty() => Ok(HostBinding::Addr(s.clone())),
        Value::String(_) => Err(ConfigError::shape("server.host", "host must not be empty")),
        _ => Err(ConfigError::shape(
            "server.host",
            "expected false, true, or a host string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<PartialConfig, ConfigError> {
        parse_config_source(Path::new("dalkey.config.js"), source)
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::write(dir.path().join("vite.config.js"), "export default {}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("vite.config.js")
        );

        // dalkey.config.js takes priority
        std::fs::write(dir.path().join("dalkey.config.js"), "export default {}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("dalkey.config.js")
        );
    }

    #[test]
    fn test_parse_full_config() {
        let source = r#"
            export default {
                plugins: [],
                build: {
                    entryPoints: ["./index.html", './admin.html'],
                },
                server: {
                    host: false,
                },
            };
        "#;
        let partial = parse(source).unwrap();
        assert_eq!(partial.plugins, Some(Vec::new()));
        assert_eq!(
            partial.build.unwrap().entry_points.unwrap(),
            vec!["./index.html", "./admin.html"]
        );
        assert_eq!(partial.server.unwrap().host, Some(HostBinding::Loopback));
    }

    #[test]
    fn test_parse_empty_config() {
        let partial = parse("export default {};").unwrap();
        assert_eq!(partial, PartialConfig::default());
    }

    #[test]
    fn test_parse_config_with_comments() {
        let source = r#"
            // project config
            /* entry points are
               HTML documents */
            export default {
                server: {
                    host: true, // expose to LAN
                },
            };
        "#;
        let partial = parse(source).unwrap();
        assert_eq!(
            partial.server.unwrap().host,
            Some(HostBinding::AllInterfaces)
        );
    }

    #[test]
    fn test_parse_host_string() {
        let source = r#"export default { server: { host: "192.168.1.5" } };"#;
        let partial = parse(source).unwrap();
        assert_eq!(
            partial.server.unwrap().host,
            Some(HostBinding::Addr("192.168.1.5".into()))
        );
    }

    #[test]
    fn test_numeric_host_is_shape_error() {
        let source = "export default { server: { host: 1 } };";
        match parse(source) {
            Err(ConfigError::Shape { field, .. }) => assert_eq!(field, "server.host"),
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_string_entry_is_shape_error() {
        let source = "export default { build: { entryPoints: ['a.html', 2] } };";
        match parse(source) {
            Err(ConfigError::Shape { field, .. }) => {
                assert_eq!(field, "build.entryPoints[1]");
            }
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_array_plugins_is_shape_error() {
        let source = "export default { plugins: 'oops' };";
        match parse(source) {
            Err(ConfigError::Shape { field, .. }) => assert_eq!(field, "plugins"),
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_vite_rollup_input_array() {
        let source = r#"
            export default {
                plugins: [],
                build: {
                    rollupOptions: {
                        input: ["./index.html"],
                    },
                },
                server: {
                    host: false,
                },
            };
        "#;
        let partial = parse(source).unwrap();
        assert_eq!(
            partial.build.unwrap().entry_points.unwrap(),
            vec!["./index.html"]
        );
    }

    #[test]
    fn test_vite_define_config_wrapper() {
        // A stock Vite config, verbatim: the object is wrapped in
        // defineConfig(...) rather than exported directly.
        let source = r#"import { defineConfig } from "vite";

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [],
  build: {
    rollupOptions: {
      input: ["./index.html"],
    },
  },
  server: {
    host: false, // Set to true to expose to other clients
  },
});
"#;
        let partial = parse(source).unwrap();
        assert_eq!(partial.plugins, Some(Vec::new()));
        assert_eq!(
            partial.build.unwrap().entry_points.unwrap(),
            vec!["./index.html"]
        );
        assert_eq!(partial.server.unwrap().host, Some(HostBinding::Loopback));
    }

    #[test]
    fn test_define_config_wrapper_whitespace() {
        let source = "export default defineConfig ( { server: { host: true } } );";
        let partial = parse(source).unwrap();
        assert_eq!(
            partial.server.unwrap().host,
            Some(HostBinding::AllInterfaces)
        );
    }

    #[test]
    fn test_wrapper_without_call_is_parse_error() {
        // A bare identifier export has no object literal to extract.
        assert!(matches!(
            parse("export default config;"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_vite_rollup_input_string() {
        let source = "export default { build: { rollupOptions: { input: './main.html' } } };";
        let partial = parse(source).unwrap();
        assert_eq!(
            partial.build.unwrap().entry_points.unwrap(),
            vec!["./main.html"]
        );
    }

    #[test]
    fn test_plugins_pass_through_opaque() {
        let source = r#"
            export default {
                plugins: [
                    { name: 'html-rewrite', enforce: 'pre' },
                    'legacy',
                ],
            };
        "#;
        let partial = parse(source).unwrap();
        let plugins = partial.plugins.unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].0["name"], "html-rewrite");
        assert_eq!(plugins[1].0, "legacy");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let source = r#"
            export default {
                base: '/app/',
                define: { __DEV__: 'true' },
                server: { host: false },
            };
        "#;
        let partial = parse(source).unwrap();
        assert_eq!(partial.server.unwrap().host, Some(HostBinding::Loopback));
        assert!(partial.build.is_none());
    }

    #[test]
    fn test_no_default_export() {
        assert!(matches!(
            parse("const config = {};"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_export_default_in_comment_ignored() {
        let source = "// export default { server: { host: 9 } }\nexport default {};";
        assert!(parse(source).is_ok());
    }

    #[test]
    fn test_load_config_auto_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dalkey.config.js"),
            "export default { server: { host: true } };",
        )
        .unwrap();

        let (path, partial) = load_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("dalkey.config.js"));
        assert_eq!(
            partial.server.unwrap().host,
            Some(HostBinding::AllInterfaces)
        );
    }

    #[test]
    fn test_load_config_none_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_load_config_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("custom.config.js"),
            "export default { build: { entryPoints: ['x.html'] } };",
        )
        .unwrap();

        let (_, partial) = load_config(dir.path(), Some(Path::new("custom.config.js")))
            .unwrap()
            .unwrap();
        assert_eq!(
            partial.build.unwrap().entry_points.unwrap(),
            vec!["x.html"]
        );
    }

    #[test]
    fn test_load_config_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path(), Some(Path::new("nope.config.js")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_strip_comments_preserves_strings() {
        let out = strip_comments("{ url: 'http://example.com' } // trailing");
        assert!(out.contains("http://example.com"));
        assert!(!out.contains("trailing"));
    }

    #[test]
    fn test_parser_trailing_commas_and_nesting() {
        let value = LiteralParser::new("{ a: [1, 2,], b: { c: null, }, }")
            .parse()
            .unwrap();
        assert_eq!(value["a"], serde_json::json!([1, 2]));
        assert_eq!(value["b"]["c"], Value::Null);
    }

    #[test]
    fn test_parser_rejects_garbage() {
        assert!(LiteralParser::new("{ a: !1 }").parse().is_err());
        assert!(LiteralParser::new("{ a: 1").parse().is_err());
    }
}
