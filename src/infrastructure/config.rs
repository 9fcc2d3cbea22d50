use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    /// InfluxQL template; `${measurement}`, `${id}`, `${name}` and `${time}`
    /// are substituted per request
    #[serde(default = "default_points_query")]
    pub points_query: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_measurement() -> String {
    "can_messages".to_string()
}

fn default_points_query() -> String {
    "SELECT \"value\" FROM \"${measurement}\" WHERE \"id\" = '${id}' AND \"name\" = '${name}' AND ${time} ORDER BY time ASC".to_string()
}

/// Load `config/server.*`, overridden by `TELEMETRY_*` environment variables
/// such as `TELEMETRY_INFLUX__TOKEN`.
pub fn load_config() -> anyhow::Result<AppConfig> {
    load_from(config::File::with_name("config/server"))
}

fn load_from<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("TELEMETRY").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("id".to_string(), "0x402".to_string());
        vars.insert("name".to_string(), "Bus Voltage".to_string());

        let query = "SELECT value FROM can_messages WHERE \"id\" = '${id}' AND \"name\" = '${name}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT value FROM can_messages WHERE \"id\" = '0x402' AND \"name\" = 'Bus Voltage'"
        );
    }

    #[test]
    fn test_load_with_defaults() {
        let toml = r#"
            [influx]
            host = "http://localhost:8086"
            token = "secret"
            database = "telemetry"
            retention_policy = "autogen"
        "#;
        let config = load_from(config::File::from_str(toml, config::FileFormat::Toml)).unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.influx.database, "telemetry");
        assert_eq!(config.influx.measurement, "can_messages");
        assert!(config.influx.points_query.contains("${time}"));
    }

    #[test]
    fn test_load_requires_influx() {
        let toml = r#"
            [server]
            bind = "127.0.0.1:9000"
        "#;
        assert!(load_from(config::File::from_str(toml, config::FileFormat::Toml)).is_err());
    }
}
