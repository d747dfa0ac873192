use crate::error::ConfigurationError;

/// Language tag accepted in schema-info strings.
pub const BINDING_LANGUAGE: &str = "java";

/// Parses a schema-info string of the form `lang=TypeName` and returns
/// the trimmed type identifier.
///
/// The grammar allows several comma-separated `lang=TypeName` pairs, but
/// only a single pair using [`BINDING_LANGUAGE`] is accepted.
pub fn parse_schema_info(schema_info: &str) -> Result<&str, ConfigurationError> {
    if schema_info.trim().is_empty() {
        return Err(ConfigurationError::EmptySchemaInfo);
    }
    let entries: Vec<&str> = schema_info.split(',').collect();
    if entries.len() != 1 {
        return Err(ConfigurationError::MultipleLanguages(entries.len()));
    }
    let entry = entries[0];
    let mut parts = entry.split('=');
    let (language, type_identifier) = match (parts.next(), parts.next(), parts.next()) {
        (Some(language), Some(type_identifier), None) => (language.trim(), type_identifier.trim()),
        _ => return Err(ConfigurationError::MalformedEntry(entry.trim().to_string())),
    };
    if language != BINDING_LANGUAGE {
        return Err(ConfigurationError::UnsupportedLanguage {
            found: language.to_string(),
            expected: BINDING_LANGUAGE,
        });
    }
    if type_identifier.is_empty() {
        return Err(ConfigurationError::MalformedEntry(entry.trim().to_string()));
    }
    Ok(type_identifier)
}
