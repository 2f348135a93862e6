//! Shared utilities for integration testing: a scripted JSON-RPC node.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use scilla_deployer::blockchain::{AccountAddress, InitParam, Wallet};
use scilla_deployer::config::DeployerConfig;

pub const TEST_PRIVATE_KEY: &str =
    "3375F915F3F9AE35E6B301B7670F53AD1A5BE15D8221EC7FD5E503F21D3450C8";
pub const TEST_ADDRESS: &str = "8254b2c9acdf181d5d6796d63320fbb20d4edd12";

/// Either a JSON-RPC `result` or an `(code, message)` error object.
pub type RpcReply = Result<Value, (i64, String)>;

type Handler = dyn Fn(&str, &Value) -> RpcReply + Send + Sync;

/// A mock node that answers every request through `handler` and records
/// each `(method, params)` pair it receives.
pub struct MockNode {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockNode {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> RpcReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = calls.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let handler = handler.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            serve(socket, handler, recorded).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| m.as_str() == method).count()
    }

    /// First positional parameter of the first call to `method`.
    pub fn first_param(&self, method: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .find(|(m, _)| m == method)
            .and_then(|(_, params)| params.get(0).cloned())
    }
}

async fn serve(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    recorded: Arc<Mutex<Vec<(String, Value)>>>,
) {
    let body = match read_body(&mut socket).await {
        Some(body) => body,
        None => return,
    };
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);
    recorded.lock().unwrap().push((method.clone(), params.clone()));

    let reply = match handler(&method, &params) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": code, "message": message}
        }),
    };
    let payload = reply.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}

/// Answers for a healthy node on chain 333 where the test account has
/// nonce 5 and every deployment confirms.
pub fn healthy_node(method: &str, _params: &Value) -> RpcReply {
    match method {
        "GetNetworkId" => Ok(json!("333")),
        "GetBalance" => Ok(json!({"balance": "1000", "nonce": 5})),
        "GetMinimumGasPrice" => Ok(json!("2000000000")),
        "CreateTransaction" => Ok(json!({
            "Info": "Contract Creation txn, sent to shard",
            "TranID": "c2ff0ad1e1d1a5c3e1d5b2e8f8a4c3b2f1e0d9c8b7a6f5e4d3c2b1a0f9e8d7c6",
            "ContractAddress": expected_contract_address(6),
        })),
        "GetTransaction" => Ok(json!({
            "ID": "c2ff0ad1e1d1a5c3e1d5b2e8f8a4c3b2f1e0d9c8b7a6f5e4d3c2b1a0f9e8d7c6",
            "receipt": {"success": true, "epoch_num": "1024", "cumulative_gas": "1500"}
        })),
        other => Err((-32601, format!("Method not found: {}", other))),
    }
}

pub fn expected_contract_address(tx_nonce: u64) -> String {
    let sender: AccountAddress = TEST_ADDRESS.parse().unwrap();
    AccountAddress::for_contract(&sender, tx_nonce).to_hex()
}

pub fn test_wallet() -> Wallet {
    let mut wallet = Wallet::new();
    wallet.add_by_private_key(TEST_PRIVATE_KEY).unwrap();
    wallet
}

pub fn test_init() -> Vec<InitParam> {
    vec![
        InitParam::new("_scilla_version", "Uint32", "0"),
        InitParam::new(
            "contractOwner",
            "ByStr20",
            "0x8254b2c9acdf181d5d6796d63320fbb20d4edd12",
        ),
        InitParam::new("name", "String", "ERC777"),
        InitParam::new("symbol", "String", "MoonCOIN"),
        InitParam::new("decimals", "Uint32", "1"),
        InitParam::new("default_operators", "String", ""),
    ]
}

pub fn test_config(node: &MockNode) -> DeployerConfig {
    let mut config = DeployerConfig::default();
    config.network.rpc_url = node.url();
    config.network.rpc_timeout_secs = Some(5);
    config.gas.gas_limit = "30000".to_string();
    config.confirmation.max_attempts = 3;
    config.confirmation.interval_ms = 10;
    config.contract.init = test_init();
    config
}
