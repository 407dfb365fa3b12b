use std::io::{self, Write};

use serde_json::Value;

use crate::models::{CLIConfig, ChatMessage, RpcError, ToolInfo};

pub fn banner(cfg: &CLIConfig) {
    println!("MCP Router Debug CLI");
    println!("Endpoint: {}", cfg.base_url);
    println!(
        "Model: {}  Temp: {}",
        cfg.model.clone().unwrap_or_else(|| "(any)".to_string()),
        temperature_label(cfg.temperature)
    );
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                          Show commands");
    println!("  /exit | /quit                  Exit");
    println!("  /caps                          mcp.getCapabilities");
    println!("  /state                         mcp.getState");
    println!("  /tools                         mcp.listTools");
    println!("  /exec <tool> <method> [json]   mcp.executeTool");
    println!("  /review <language> <code>      codeReview");
    println!("  /generate <prompt>             generateCode");
    println!("  /analyze <code>                analyzeCode");
    println!("  /model [name|-]                Set model hint (- clears)");
    println!("  /temp [float]                  Set chat temperature");
    println!("  /history                       Show chat history");
    println!("  /reset                         Clear chat history");
    println!("  /config                        Show current config");
    println!("  /base <url>                    Update endpoint");
    println!("  /debug [on|off]                Toggle raw envelope output");
    println!("Any other line is sent as a chat message.");
}

pub fn text(value: &Value) {
    match value {
        Value::String(s) => println!("assistant> {}", s),
        other => json(other),
    }
}

pub fn json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{}", value),
    }
}

pub fn rpc_error(err: &RpcError, debug: bool) {
    eprintln!("error [{}]: {}", err.code, err.message);
    if debug {
        if let Some(data) = &err.data {
            eprintln!("data: {}", data);
        }
    }
}

pub fn tools(items: &[ToolInfo]) {
    if items.is_empty() {
        println!("no tools");
        return;
    }
    for tool in items {
        println!("{}: {}", tool.name, tool.capabilities.methods.join(", "));
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  model: {}", cfg.model.clone().unwrap_or_default());
    println!("  temp: {}", temperature_label(cfg.temperature));
    println!("  debug: {}", cfg.debug);
}

pub fn history(items: &[ChatMessage]) {
    if items.is_empty() {
        println!("no history");
        return;
    }
    for msg in items {
        println!("{}> {}", msg.role, msg.content);
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

fn temperature_label(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{:.2}", t),
        None => "server default".to_string(),
    }
}
