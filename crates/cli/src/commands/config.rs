use std::env;
use std::fs;
use std::path::Path;

use reqtrack_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct Field<'a> {
    key_path: &'static str,
    env_key: &'static str,
    value: &'a str,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let max_connections = config.database.max_connections.to_string();
    let timeout_secs = config.database.timeout_secs.to_string();
    let port = config.server.port.to_string();
    let graceful_shutdown_secs = config.server.graceful_shutdown_secs.to_string();
    let log_format = format!("{:?}", config.logging.format);

    let fields = [
        Field {
            key_path: "database.url",
            env_key: "REQTRACK_DATABASE_URL",
            value: &config.database.url,
        },
        Field {
            key_path: "database.max_connections",
            env_key: "REQTRACK_DATABASE_MAX_CONNECTIONS",
            value: &max_connections,
        },
        Field {
            key_path: "database.timeout_secs",
            env_key: "REQTRACK_DATABASE_TIMEOUT_SECS",
            value: &timeout_secs,
        },
        Field {
            key_path: "server.bind_address",
            env_key: "REQTRACK_SERVER_BIND_ADDRESS",
            value: &config.server.bind_address,
        },
        Field { key_path: "server.port", env_key: "REQTRACK_SERVER_PORT", value: &port },
        Field {
            key_path: "server.graceful_shutdown_secs",
            env_key: "REQTRACK_SERVER_GRACEFUL_SHUTDOWN_SECS",
            value: &graceful_shutdown_secs,
        },
        Field {
            key_path: "approvals.default_approver",
            env_key: "REQTRACK_APPROVALS_DEFAULT_APPROVER",
            value: &config.approvals.default_approver,
        },
        Field {
            key_path: "logging.level",
            env_key: "REQTRACK_LOGGING_LEVEL",
            value: &config.logging.level,
        },
        Field { key_path: "logging.format", env_key: "REQTRACK_LOGGING_FORMAT", value: &log_format },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields {
        let source = field_source(
            field.key_path,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, field.value, source));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
