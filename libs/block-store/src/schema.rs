//! Table definitions

/// Last-known block values per device address
pub const CREATE_MODBUS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS modbus (
        ip TEXT PRIMARY KEY,
        di TEXT,
        co TEXT,
        ir TEXT,
        hr TEXT
    )
"#;

/// API credentials; the stored secret doubles as the bearer token
pub const CREATE_TOKENS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tokens (
        username TEXT PRIMARY KEY,
        password TEXT
    )
"#;
