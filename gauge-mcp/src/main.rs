//! Gauge MCP Server
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout. Logs go to stderr so
//! stdout carries nothing but protocol messages.
//!
//! Tools:
//! - convert: Convert a value between two units of a category
//! - list_categories: List unit categories
//! - list_units: List the units of a category
//! - call: Invoke any registered calculator by name
//! - help: Documentation for a calculator, or general help
//! - list_functions: List calculators, optionally by category
//!
//! Environment:
//! - RUST_LOG: log filter (default "info")
//! - GAUGE_PRECISION: decimal places in text output (default 6)

use gauge_core::Value;
use gauge_plugin::{EvalContext, PluginRegistry, DEFAULT_PRECISION};
use gauge_units::{describe_category, describe_units, ConversionRequest, UNITS};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "gauge";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC error codes
const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// Settings read once at startup
#[derive(Debug, Clone, PartialEq)]
struct Config {
    precision: usize,
}

impl Config {
    fn from_env() -> Self {
        Self::from_precision(env::var("GAUGE_PRECISION").ok().as_deref())
    }

    fn from_precision(raw: Option<&str>) -> Self {
        let precision = match raw.map(str::trim) {
            None | Some("") => DEFAULT_PRECISION,
            Some(text) => match text.parse::<usize>() {
                Ok(p) if p <= 15 => p,
                _ => {
                    warn!(value = text, "ignoring invalid GAUGE_PRECISION");
                    DEFAULT_PRECISION
                }
            },
        };
        Config { precision }
    }
}

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    /// Null when the request id could not be read
    id: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        McpError { code, message: message.into(), data: None }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

/// Registry with every calculator library loaded
fn create_registry() -> PluginRegistry {
    let registry = gauge_units::load_units_library(PluginRegistry::new());
    gauge_widgets::load_widgets_library(registry)
}

fn create_context(config: &Config) -> EvalContext {
    EvalContext::new(Arc::new(create_registry())).with_precision(config.precision)
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let ctx = create_context(&config);

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Gauge MCP server started");
    info!(
        categories = UNITS.categories().len(),
        functions = ctx.registry.function_names().len(),
        precision = config.precision,
        "registry loaded"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = serve(&ctx, stdin.lock(), stdout.lock()) {
        warn!(error = %e, "I/O error, stopping");
    }

    info!("Server shutting down");
}

/// Answer requests until EOF. Notifications (no id) get no response.
fn serve(ctx: &EvalContext, reader: impl BufRead, mut writer: impl Write) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(bytes = line.len(), "received");

        let response = match serde_json::from_str::<McpRequest>(line) {
            Ok(request) => {
                debug!(method = %request.method, "processing");
                let response = handle_request(ctx, &request);
                if request.id.is_none() {
                    debug!(method = %request.method, "notification processed");
                    continue;
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "unparsable request");
                McpResponse {
                    jsonrpc: "2.0".to_string(),
                    id: JsonValue::Null,
                    result: None,
                    error: Some(McpError::new(PARSE_ERROR, format!("Parse error: {}", e))),
                }
            }
        };

        let response_json = serde_json::to_string(&response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", response_json)?;
        writer.flush()?;
    }

    info!("Client disconnected (EOF)");
    Ok(())
}

fn handle_request(ctx: &EvalContext, request: &McpRequest) -> McpResponse {
    let result = if request.jsonrpc != "2.0" {
        Err(McpError::new(INVALID_REQUEST, format!("Unsupported jsonrpc version: {}", request.jsonrpc)))
    } else {
        match request.method.as_str() {
            // Lifecycle
            "initialize" => handle_initialize(&request.params),
            "initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => handle_tools_list(ctx),
            "tools/call" => handle_tool_call(ctx, &request.params),

            _ => Err(McpError::new(METHOD_NOT_FOUND, format!("Method not found: {}", request.method))),
        }
    };

    match result {
        Ok(r) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone().unwrap_or(JsonValue::Null),
            result: Some(r),
            error: None,
        },
        Err(e) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone().unwrap_or(JsonValue::Null),
            result: None,
            error: Some(e),
        },
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Unit conversion engine and everyday calculators"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Gauge converts quantities between units of the same category (length, weight, volume, density, data-size, temperature, ...). Use 'list_categories' and 'list_units' to discover units, 'convert' for conversions and 'call' for calculators such as heat_index or transfer_time."
    }))
}

fn handle_tools_list(ctx: &EvalContext) -> Result<JsonValue, McpError> {
    let category_names = UNITS.category_names();
    let function_categories: Vec<String> = {
        let mut cats: Vec<String> = ctx.registry.function_names().into_iter()
            .filter_map(|name| ctx.registry.get_function(name))
            .map(|f| f.meta().category.to_string())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    };

    Ok(json!({
        "tools": [
            {
                "name": "convert",
                "description": "Convert a value between two units of the same category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Unit category",
                            "enum": category_names
                        },
                        "from": {
                            "type": "string",
                            "description": "Source unit symbol or alias (e.g., \"km\")"
                        },
                        "to": {
                            "type": "string",
                            "description": "Target unit symbol or alias (e.g., \"mi\")"
                        },
                        "value": {
                            "type": "number",
                            "description": "Amount in the source unit"
                        }
                    },
                    "required": ["category", "from", "to", "value"]
                }
            },
            {
                "name": "list_categories",
                "description": "List unit categories with their base unit and units.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "list_units",
                "description": "List the units of one category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Category name or alias"
                        }
                    },
                    "required": ["category"]
                }
            },
            {
                "name": "call",
                "description": "Call a calculator function by name with positional arguments.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "function": {
                            "type": "string",
                            "description": "Function name (see list_functions)"
                        },
                        "args": {
                            "type": "array",
                            "description": "Positional arguments: numbers and unit strings",
                            "items": {}
                        }
                    },
                    "required": ["function"]
                }
            },
            {
                "name": "help",
                "description": "Get documentation for a function, or general help.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Function name. Omit for general help."
                        }
                    }
                }
            },
            {
                "name": "list_functions",
                "description": "List all available functions, optionally by category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter by function category",
                            "enum": function_categories
                        }
                    }
                }
            }
        ]
    }))
}

fn handle_tool_call(ctx: &EvalContext, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params.get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    match name {
        "convert" => tool_convert(ctx, args),
        "list_categories" => tool_list_categories(),
        "list_units" => tool_list_units(args),
        "call" => tool_call(ctx, args),
        "help" => tool_help(ctx, args),
        "list_functions" => tool_list_functions(ctx, args),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

/// Tool result carrying both readable text and structured data
fn tool_result(text: String, data: &Value) -> JsonValue {
    json!({
        "content": [{ "type": "text", "text": text }],
        "data": value_to_json(data),
        "isError": data.is_error()
    })
}

fn tool_convert(ctx: &EvalContext, args: JsonValue) -> Result<JsonValue, McpError> {
    let request: ConversionRequest = serde_json::from_value(args)
        .map_err(|e| McpError::invalid_params(format!("Invalid convert arguments: {}", e)))?;

    let value = match request.resolve(&UNITS) {
        Ok(result) => Value::Number(result),
        Err(e) => Value::Error(e.into()),
    };
    let text = match &value {
        Value::Number(result) => format!(
            "{} {} = {} {}",
            ctx.format(request.value),
            request.source_unit.trim(),
            ctx.format(*result),
            request.target_unit.trim()
        ),
        other => format_value(ctx, other),
    };
    Ok(tool_result(text, &value))
}

fn tool_list_categories() -> Result<JsonValue, McpError> {
    let categories: Vec<Value> = UNITS.categories().iter().map(describe_category).collect();
    let text = UNITS.categories().iter()
        .map(|c| {
            let units: Vec<&str> = c.units().iter().map(|u| u.symbol.as_str()).collect();
            format!("- {} (base {}): {}", c.name(), c.base_unit().symbol, units.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(tool_result(text, &Value::List(categories)))
}

fn tool_list_units(args: JsonValue) -> Result<JsonValue, McpError> {
    let name = args.get("category")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing category"))?;

    let (text, value) = match UNITS.category(name) {
        Ok(category) => (
            category.units().iter()
                .map(|u| format!("- {} ({})", u.symbol, u.name))
                .collect::<Vec<_>>()
                .join("\n"),
            describe_units(category),
        ),
        Err(e) => {
            let value = Value::Error(e.into());
            (format_value_plain(&value), value)
        }
    };
    Ok(tool_result(text, &value))
}

fn tool_call(ctx: &EvalContext, args: JsonValue) -> Result<JsonValue, McpError> {
    let function = args.get("function")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing function"))?;

    let call_args: Vec<Value> = match args.get("args") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items.iter().map(json_to_value).collect(),
        Some(_) => return Err(McpError::invalid_params("args must be an array")),
    };

    let result = ctx.registry.call_function(function, &call_args, ctx);
    Ok(tool_result(format_value(ctx, &result), &result))
}

fn tool_help(ctx: &EvalContext, args: JsonValue) -> Result<JsonValue, McpError> {
    let name = args.get("name").and_then(|v| v.as_str());
    let help = ctx.registry.help(name);
    Ok(tool_result(format_help(&help), &help))
}

fn format_help(help: &Value) -> String {
    match help {
        Value::Object(map) if map.contains_key("name") => {
            let mut out = String::new();
            if let Some(Value::Text(n)) = map.get("name") { out.push_str(&format!("# {}\n\n", n)); }
            if let Some(Value::Text(d)) = map.get("description") { out.push_str(&format!("{}\n\n", d)); }
            if let Some(Value::Text(u)) = map.get("usage") { out.push_str(&format!("**Usage:** `{}`\n\n", u)); }
            if let Some(Value::List(examples)) = map.get("examples") {
                for example in examples {
                    out.push_str(&format!("- `{}`\n", example));
                }
            }
            out
        }
        Value::Object(map) => {
            let mut out = String::from("# Gauge functions\n\n");
            if let Some(Value::Object(by_category)) = map.get("functions") {
                let mut categories: Vec<&String> = by_category.keys().collect();
                categories.sort();
                for category in categories {
                    out.push_str(&format!("**{}:** {}\n", category, by_category[category]));
                }
            }
            out
        }
        Value::Error(e) => format!("Error: {}", e.message),
        other => format!("{}", other),
    }
}

fn tool_list_functions(ctx: &EvalContext, args: JsonValue) -> Result<JsonValue, McpError> {
    let category = args.get("category").and_then(|v| v.as_str());
    let functions = ctx.registry.list_functions(category);
    let count = functions.as_list().map_or(0, |l| l.len());
    Ok(tool_result(format!("{} functions listed", count), &functions))
}

/// Text rendering with the configured precision
fn format_value(ctx: &EvalContext, value: &Value) -> String {
    match value {
        Value::Number(n) => ctx.format(*n),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.iter()
                .map(|k| format!("{}: {}", k, format_value(ctx, &map[*k])))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::List(items) => items.iter()
            .map(|v| format_value(ctx, v))
            .collect::<Vec<_>>()
            .join(", "),
        other => format_value_plain(other),
    }
}

fn format_value_plain(value: &Value) -> String {
    match value {
        Value::Error(e) => match &e.suggestion {
            Some(s) => format!("Error [{}]: {}. {}", e.code, e.message, s),
            None => format!("Error [{}]: {}", e.code, e.message),
        },
        other => other.to_string(),
    }
}

fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        // Numeric text stays text; calculators parse it where a number is expected
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()),
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => json!(n),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::List(l) => JsonValue::Array(l.iter().map(value_to_json).collect()),
        Value::Object(o) => JsonValue::Object(o.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect()),
        Value::Error(e) => json!({"_error": {"code": e.code, "message": e.message, "suggestion": e.suggestion}}),
    }
}
