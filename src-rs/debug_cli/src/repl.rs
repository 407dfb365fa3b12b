use std::io;

use serde_json::{json, Map, Value};

use crate::client::RpcClient;
use crate::models::{CLIConfig, ChatMessage, ToolInfo};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: RpcClient,
    pub history: Vec<ChatMessage>,
}

impl REPL {
    pub fn new(config: CLIConfig, client: RpcClient) -> Self {
        Self {
            config,
            client,
            history: Vec::new(),
        }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.chat(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "caps" => self.show("mcp.getCapabilities", Value::Null),
            "state" => self.show("mcp.getState", Value::Null),
            "tools" => self.list_tools(),
            "exec" => self.exec(rest),
            "review" => {
                let (language, code) = split_first(rest);
                if code.is_empty() {
                    render::error("usage: /review <language> <code>");
                } else {
                    let params = json!({
                        "code": code,
                        "language": language,
                        "options": self.hint(),
                    });
                    self.show("codeReview", params);
                }
            }
            "generate" => {
                if rest.is_empty() {
                    render::error("usage: /generate <prompt>");
                } else {
                    let params = json!({"prompt": rest, "options": self.hint()});
                    self.show("generateCode", params);
                }
            }
            "analyze" => {
                if rest.is_empty() {
                    render::error("usage: /analyze <code>");
                } else {
                    let params = json!({"code": rest, "options": self.hint()});
                    self.show("analyzeCode", params);
                }
            }
            "model" => match rest {
                "" => render::info(&format!("model: {:?}", self.config.model)),
                "-" => {
                    self.config.model = None;
                    render::info("model hint cleared");
                }
                name => {
                    self.config.model = Some(name.to_string());
                    render::info("model updated");
                }
            },
            "temp" => {
                if rest.is_empty() {
                    render::info(&format!("temperature: {:?}", self.config.temperature));
                } else if let Ok(val) = rest.parse::<f64>() {
                    self.config.temperature = Some(val);
                    render::info("temperature updated");
                } else {
                    render::error("invalid temperature");
                }
            }
            "debug" => {
                if rest.is_empty() {
                    self.config.debug = !self.config.debug;
                    render::info(&format!("debug: {}", self.config.debug));
                } else if let Some(flag) = parse_on_off(rest) {
                    self.config.debug = flag;
                    render::info(&format!("debug: {}", self.config.debug));
                } else {
                    render::error("invalid debug flag");
                }
            }
            "history" => render::history(&self.history),
            "reset" => {
                self.history.clear();
                render::info("history cleared");
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match RpcClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    /// Options object carrying only the model hint, if one is set.
    fn hint(&self) -> Value {
        let mut options = Map::new();
        if let Some(model) = &self.config.model {
            options.insert("model".to_string(), Value::String(model.clone()));
        }
        Value::Object(options)
    }

    fn chat(&mut self, line: &str) {
        self.history.push(ChatMessage {
            role: "user".to_string(),
            content: line.to_string(),
        });

        let mut options = self.hint();
        if let (Some(temp), Value::Object(map)) = (self.config.temperature, &mut options) {
            map.insert("temperature".to_string(), json!(temp));
        }
        let params = json!({"messages": self.history, "options": options});

        match self.client.call("chat", params) {
            Ok(resp) => {
                if self.config.debug {
                    render::info(&format!("id: {}", resp.id));
                }
                if let Some(err) = &resp.error {
                    settle_turn(&mut self.history, None);
                    render::rpc_error(err, self.config.debug);
                    return;
                }
                let result = resp.result.unwrap_or(Value::Null);
                settle_turn(&mut self.history, result.as_str());
                render::text(&result);
            }
            Err(err) => {
                settle_turn(&mut self.history, None);
                render::error(&err);
            }
        }
    }

    fn show(&self, method: &str, params: Value) {
        match self.client.call(method, params) {
            Ok(resp) => match (resp.error, resp.result) {
                (Some(err), _) => render::rpc_error(&err, self.config.debug),
                (None, Some(result)) => render::text(&result),
                (None, None) => render::info("(empty result)"),
            },
            Err(err) => render::error(&err),
        }
    }

    fn list_tools(&self) {
        let result = match self.client.call_result("mcp.listTools", Value::Null) {
            Ok(result) => result,
            Err(err) => return render::error(&err),
        };
        match serde_json::from_value::<Vec<ToolInfo>>(result["tools"].clone()) {
            Ok(tools) => render::tools(&tools),
            Err(_) => render::json(&result),
        }
    }

    fn exec(&self, rest: &str) {
        let (tool, rest) = split_first(rest);
        let (method, raw) = split_first(rest);
        if tool.is_empty() || method.is_empty() {
            render::error("usage: /exec <tool> <method> [json]");
            return;
        }
        let parameters = if raw.is_empty() {
            json!({})
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => value,
                Err(err) => return render::error(&format!("invalid json: {}", err)),
            }
        };
        let params = json!({"tool": tool, "method": method, "parameters": parameters});
        self.show("mcp.executeTool", params);
    }
}

/// Close the pending user turn: append the reply, or drop the turn when the
/// call produced no reply so history never holds two user turns in a row.
fn settle_turn(history: &mut Vec<ChatMessage>, reply: Option<&str>) {
    match reply {
        Some(text) => history.push(ChatMessage {
            role: "assistant".to_string(),
            content: text.to_string(),
        }),
        None => {
            if history.last().map(|m| m.role == "user").unwrap_or(false) {
                history.pop();
            }
        }
    }
}

fn split_first(value: &str) -> (&str, &str) {
    match value.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (value, ""),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
