use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:3000";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("MCP_ROUTER_URL", DEFAULT_URL.to_string()),
        model: env_opt("MCP_ROUTER_MODEL"),
        temperature: env_opt("MCP_ROUTER_TEMPERATURE").and_then(|v| v.parse::<f64>().ok()),
        debug: env_bool("MCP_ROUTER_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--model" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.model = Some(value.clone());
                    idx += 1;
                }
            }
            "--temp" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<f64>() {
                        cfg.temperature = Some(parsed);
                    }
                    idx += 1;
                }
            }
            "--debug" => {
                if let Some(value) = args.get(idx + 1) {
                    if value.starts_with('-') {
                        cfg.debug = true;
                    } else if let Ok(parsed) = value.parse::<bool>() {
                        cfg.debug = parsed;
                        idx += 1;
                    } else {
                        cfg.debug = true;
                    }
                } else {
                    cfg.debug = true;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
