//! Supported video-translation languages.
//!
//! The table ships inside the binary (`languages.csv`) and is parsed once per
//! process into two lowercase indices, by display name and by ISO code.
//! Source and target eligibility are independent flags.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

const BUILTIN_TABLE: &str = include_str!("languages.csv");

/// One supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Lowercase ISO 639-1 code, e.g. `en`.
    pub code: String,
    /// Display name as published, e.g. `English`.
    pub name: String,
    pub source_eligible: bool,
    pub target_eligible: bool,
}

impl Language {
    pub fn supports(&self, role: Role) -> bool {
        match role {
            Role::Source => self.source_eligible,
            Role::Target => self.target_eligible,
        }
    }
}

/// Which side of a translation a language is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Target,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("{role} language '{query}' is not supported")]
    Unsupported { role: Role, query: String },

    #[error("{role} language '{query}' ({code}) is not supported as a {role} language")]
    RoleMismatch {
        role: Role,
        query: String,
        code: String,
    },
}

/// Immutable language lookup.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    languages: Vec<Language>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl LanguageTable {
    /// The embedded table, parsed on first use.
    pub fn builtin() -> &'static LanguageTable {
        static TABLE: OnceLock<LanguageTable> = OnceLock::new();
        TABLE.get_or_init(|| LanguageTable::parse(BUILTIN_TABLE))
    }

    /// Parse `name,code,source,target` rows. Blank lines and `#` comments are
    /// skipped; malformed rows are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut table = LanguageTable::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let parsed = match fields.as_slice() {
                [name, code, source, target] => parse_flag(source)
                    .zip(parse_flag(target))
                    .map(|(source_eligible, target_eligible)| Language {
                        code: normalize(code),
                        name: name.trim().to_string(),
                        source_eligible,
                        target_eligible,
                    }),
                _ => None,
            };
            let Some(language) = parsed else {
                tracing::warn!(line = lineno + 1, "skipping malformed language row: {}", line);
                continue;
            };
            let idx = table.languages.len();
            table.by_name.insert(normalize(&language.name), idx);
            table.by_code.insert(language.code.clone(), idx);
            table.languages.push(language);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Languages in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn by_name(&self, name: &str) -> Option<&Language> {
        self.by_name.get(&normalize(name)).map(|&i| &self.languages[i])
    }

    pub fn by_code(&self, code: &str) -> Option<&Language> {
        self.by_code.get(&normalize(code)).map(|&i| &self.languages[i])
    }

    /// Name first, then code; trimmed and case-insensitive.
    pub fn lookup(&self, query: &str) -> Option<&Language> {
        self.by_name(query).or_else(|| self.by_code(query))
    }

    /// Lookup plus eligibility check for `role`.
    pub fn resolve(&self, query: &str, role: Role) -> Result<&Language, LanguageError> {
        let language = self.lookup(query).ok_or_else(|| LanguageError::Unsupported {
            role,
            query: query.to_string(),
        })?;
        if !language.supports(role) {
            return Err(LanguageError::RoleMismatch {
                role,
                query: query.to_string(),
                code: language.code.clone(),
            });
        }
        Ok(language)
    }

    /// Validate a source/target pair; source is checked first.
    pub fn resolve_pair(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(&Language, &Language), LanguageError> {
        Ok((
            self.resolve(source, Role::Source)?,
            self.resolve(target, Role::Target)?,
        ))
    }

    /// One `name, code, source, target` line per language.
    pub fn listing(&self) -> String {
        self.languages
            .iter()
            .map(|l| {
                format!(
                    "{}, {}, {}, {}\n",
                    l.name, l.code, l.source_eligible, l.target_eligible
                )
            })
            .collect()
    }
}
