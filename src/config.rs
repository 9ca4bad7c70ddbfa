//! Loading evaluation contexts and subjects from TOML files.

use crate::subject::Subject;
use pyexpr_runtime::{Table, Value};
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid assignment {0:?}, expected NAME=VALUE")]
    Assignment(String),
}

impl ConfigError {
    /// Whether the error was caused by a missing or unreadable file.
    pub fn is_io(&self) -> bool {
        matches!(self, ConfigError::Io { .. })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Toml {
        path: path.to_owned(),
        source,
    })
}

/// Load a context from a TOML file. Top-level keys become top-level names.
pub fn load_context(path: impl AsRef<Path>) -> Result<Table, ConfigError> {
    let path = path.as_ref();
    let table: toml::Table = parse(path, &read(path)?)?;

    log::debug!("loaded {} name(s) from {}", table.len(), path.display());

    Ok(table_from_toml(table))
}

/// Load a SAML subject from a TOML file.
pub fn load_subject(path: impl AsRef<Path>) -> Result<Subject, ConfigError> {
    let path = path.as_ref();
    parse(path, &read(path)?)
}

/// Parse a `NAME=VALUE` assignment. The value is read as a TOML value if it is
/// one, and as a bare string otherwise, so `n=5` binds an integer while
/// `user=ada` binds a string.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value), ConfigError> {
    let (name, raw) = match assignment.split_once('=') {
        Some((name, raw)) if !name.trim().is_empty() => (name.trim(), raw),
        _ => return Err(ConfigError::Assignment(assignment.to_owned())),
    };

    let value = toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .map(value_from_toml)
        .unwrap_or_else(|| Value::from(raw));

    Ok((name.to_owned(), value))
}

fn table_from_toml(table: toml::Table) -> Table {
    table.into_iter().map(|(key, value)| (key, value_from_toml(value))).collect()
}

/// Convert a TOML value into an expression value. Tables become dicts, and
/// datetimes become strings.
pub fn value_from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => s.into(),
        toml::Value::Integer(i) => i.into(),
        toml::Value::Float(f) => f.into(),
        toml::Value::Boolean(b) => b.into(),
        toml::Value::Datetime(datetime) => datetime.to_string().into(),
        toml::Value::Array(items) => items.into_iter().map(value_from_toml).collect(),
        toml::Value::Table(table) => table_from_toml(table).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_values() {
        let table: toml::Table = toml::from_str(
            r#"
            name = "ada"
            age = 36
            ratio = 0.5
            admin = false
            since = 1979-05-27
            tags = ["a", "b"]

            [address]
            city = "London"
            "#,
        )
        .unwrap();
        let context = table_from_toml(table);

        assert_eq!(context.get("name"), Some(&Value::from("ada")));
        assert_eq!(context.get("age"), Some(&Value::Int(36)));
        assert_eq!(context.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(context.get("admin"), Some(&Value::Bool(false)));
        assert_eq!(context.get("since"), Some(&Value::from("1979-05-27")));
        assert_eq!(context.get("tags").unwrap().to_string(), "['a', 'b']");
        assert_eq!(context.get("address").unwrap().to_string(), "{'city': 'London'}");
    }

    #[test]
    fn assignments() {
        assert_eq!(parse_assignment("n=5").unwrap(), (String::from("n"), Value::Int(5)));
        assert_eq!(parse_assignment("flag=true").unwrap(), (String::from("flag"), Value::Bool(true)));
        assert_eq!(parse_assignment("user=ada").unwrap(), (String::from("user"), Value::from("ada")));
        assert_eq!(parse_assignment("s='x y'").unwrap(), (String::from("s"), Value::from("x y")));
        assert_eq!(
            parse_assignment("xs=[1, 2]").unwrap().1,
            Value::from(vec![Value::Int(1), Value::Int(2)])
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = load_context("/nonexistent/context.toml").unwrap_err();

        assert!(error.is_io());
    }
}
