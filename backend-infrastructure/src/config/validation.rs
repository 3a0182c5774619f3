use anyhow::{anyhow, Result};

pub fn validate_database_url(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("database url is empty"));
    }
    if !value.starts_with("sqlite:") {
        return Err(anyhow!("database url must use the sqlite: scheme"));
    }
    Ok(())
}

/// Discord ids are unsigned 64-bit integers rendered as decimal strings.
pub fn validate_snowflake(value: &str, field: &str) -> Result<()> {
    if value.is_empty() || value.len() > 20 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("{} must be a numeric discord id", field));
    }
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|_| anyhow!("{} is out of range", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_requires_sqlite_scheme() {
        assert!(validate_database_url("sqlite://./tracker.db").is_ok());
        assert!(validate_database_url("sqlite::memory:").is_ok());
        assert!(validate_database_url("mysql://localhost/db").is_err());
        assert!(validate_database_url(" ").is_err());
    }

    #[test]
    fn snowflake_must_be_numeric() {
        assert!(validate_snowflake("123456789012345678", "guild_id").is_ok());
        assert!(validate_snowflake("12ab", "guild_id").is_err());
        assert!(validate_snowflake("99999999999999999999", "guild_id").is_err());
    }
}
