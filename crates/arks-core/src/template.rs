//! Path templates.
//!
//! Templates are rendered with tera. Port trees are written with Go-style
//! actions (`{{.Version}}`, `{{prefix "-" .Variant}}`), which are rewritten
//! to tera syntax at compile time. Any other `{{ ... }}` is left for tera.

use crate::error::{Error, Result};
use arks_schema::Platform;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tera::{Context, Tera, Value};

const TEMPLATE_NAME: &str = "path";

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("valid action regex"));

static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("valid field regex"));

static PREFIX_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^prefix\s+"([^"]*)"\s+\.([A-Za-z_][A-Za-z0-9_]*)$"#).expect("valid prefix regex")
});

/// Signature of a template helper function.
pub type HelperFn = fn(&HashMap<String, Value>) -> tera::Result<Value>;

/// The set of helper functions a template is compiled with.
#[derive(Debug, Clone)]
pub struct Helpers {
    functions: Vec<(&'static str, HelperFn)>,
}

impl Helpers {
    /// No helpers at all.
    pub fn empty() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// The helpers port trees rely on: `prefix(p, v)`.
    pub fn standard() -> Self {
        Self::empty().with("prefix", prefix)
    }

    /// Add (or shadow) a helper.
    pub fn with(mut self, name: &'static str, function: HelperFn) -> Self {
        self.functions.push((name, function));
        self
    }

    fn install(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, *function);
        }
    }
}

impl Default for Helpers {
    fn default() -> Self {
        Self::standard()
    }
}

/// `prefix(p, v)`: `""` when `v` is empty, `p + v` otherwise.
fn prefix(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let arg = |key: &str| match args.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let (p, v) = (arg("p"), arg("v"));
    if v.is_empty() {
        Ok(Value::String(String::new()))
    } else {
        Ok(Value::String(p + &v))
    }
}

/// Rewrite Go-style actions into tera expressions.
pub fn to_tera(source: &str) -> String {
    ACTION
        .replace_all(source, |caps: &Captures<'_>| {
            let body = &caps[1];
            if let Some(field) = FIELD.captures(body) {
                format!("{{{{ {} }}}}", &field[1])
            } else if let Some(call) = PREFIX_CALL.captures(body) {
                format!("{{{{ prefix(p=\"{}\", v={}) }}}}", &call[1], &call[2])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Values a path template can reference.
#[derive(Debug, Clone, Copy)]
pub struct Vars<'a> {
    /// Inherited config path.
    pub path: &'a str,
    /// Artifact name.
    pub name: &'a str,
    /// Canonical version.
    pub version: &'a str,
    /// Resolved platform.
    pub platform: &'a Platform,
}

impl Vars<'_> {
    fn context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.insert("Path", self.path);
        ctx.insert("Name", self.name);
        ctx.insert("Version", self.version);
        ctx.insert("Os", self.platform.os.as_str());
        ctx.insert("Arch", self.platform.arch.as_str());
        ctx.insert("Variant", self.platform.variant.as_str());
        ctx.insert("Platform", &self.platform.to_string());
        ctx
    }
}

/// A compiled path template.
pub struct Template {
    source: String,
    tera: Tera,
}

impl Template {
    /// Compile `source` with the given helper set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template does not parse.
    pub fn compile(source: &str, helpers: &Helpers) -> Result<Self> {
        let mut tera = Tera::default();
        helpers.install(&mut tera);
        tera.add_raw_template(TEMPLATE_NAME, &to_tera(source))
            .map_err(|e| Error::Template {
                template: source.to_string(),
                source: e,
            })?;
        Ok(Self {
            source: source.to_string(),
            tera,
        })
    }

    /// The template as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with `vars`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if rendering fails, e.g. on an unknown
    /// variable.
    pub fn render(&self, vars: &Vars<'_>) -> Result<String> {
        self.tera
            .render(TEMPLATE_NAME, &vars.context())
            .map_err(|e| Error::Template {
                template: self.source.clone(),
                source: e,
            })
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").field("source", &self.source).finish()
    }
}

/// Join a target base and a rendered template, inserting one `/` when
/// neither side has one at the boundary.
pub fn join_target(base: &str, rendered: &str) -> String {
    if base.is_empty() {
        return rendered.to_string();
    }
    if rendered.is_empty() || base.ends_with('/') || rendered.starts_with('/') {
        return format!("{base}{rendered}");
    }
    format!("{base}/{rendered}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str, platform: &str) -> String {
        let platform = Platform::parse(platform);
        let vars = Vars {
            path: "github.com/x",
            name: "tool",
            version: "1.2.3",
            platform: &platform,
        };
        Template::compile(source, &Helpers::standard())
            .unwrap()
            .render(&vars)
            .unwrap()
    }

    #[test]
    fn test_go_style_fields() {
        assert_eq!(
            render("protoc-{{.Version}}-{{.Os}}-{{.Arch}}", "linux/arm64"),
            "protoc-1.2.3-linux-arm64"
        );
        assert_eq!(render("{{ .Name }}/{{.Platform}}", "linux/arm/v6"), "tool/linux/arm/v6");
    }

    #[test]
    fn test_prefix_helper() {
        let source = r#"tool-{{.Os}}-{{.Arch}}{{prefix "-" .Variant}}.tgz"#;
        assert_eq!(render(source, "linux/arm/v7"), "tool-linux-arm-v7.tgz");
        assert_eq!(render(source, "linux/amd64"), "tool-linux-amd64.tgz");
    }

    #[test]
    fn test_native_tera_passes_through() {
        assert_eq!(render("{{ Os | upper }}", "linux/amd64"), "LINUX");
        assert_eq!(to_tera("/v{{.Version}}/x"), "/v{{ Version }}/x");
    }

    #[test]
    fn test_errors() {
        let broken = Template::compile("{{ .Version", &Helpers::standard());
        assert!(matches!(broken, Err(Error::Template { .. })));

        let platform = Platform::parse("linux/amd64");
        let vars = Vars {
            path: "",
            name: "t",
            version: "1",
            platform: &platform,
        };
        let unknown = Template::compile("{{.Nope}}", &Helpers::standard()).unwrap();
        assert!(matches!(unknown.render(&vars), Err(Error::Template { .. })));

        let bare = Template::compile(r#"{{prefix "-" .Variant}}"#, &Helpers::empty()).unwrap();
        assert!(bare.render(&vars).is_err());
    }

    #[test]
    fn test_join_target() {
        assert_eq!(join_target("/dl", "protoc-33.4-linux-arm64"), "/dl/protoc-33.4-linux-arm64");
        assert_eq!(join_target("/dl", "/v1/x"), "/dl/v1/x");
        assert_eq!(join_target("/dl/", "x"), "/dl/x");
        assert_eq!(join_target("", "x"), "x");
        assert_eq!(join_target("/dl", ""), "/dl");
    }
}
