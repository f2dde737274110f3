//! Shared helpers for the votelink conformance test suite.
//!
//! Provides [`spawn_chain`], which binds a `TcpListener` on an ephemeral
//! port and serves a scripted Ethereum JSON-RPC node from it, and returns
//! both the URL and a handle to the node's state so tests can change
//! accounts, owners and failures between requests.
//!
//! The node answers only what a session needs:
//!
//! | Method | Answer |
//! |--------|--------|
//! | `eth_chainId` | the configured chain id |
//! | `eth_accounts`, `eth_requestAccounts` | the scripted accounts, or the scripted error |
//! | `eth_call` | the scripted return data for `(to, selector)`, else a revert |
//! | anything else | `-32601 method not found` |

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use votelink::codec;
use votelink::DynSolValue;
use votelink::Address;
use votelink_rpc::wire::{self, CallObject, RpcRequest, RpcResponse};

/// Hardhat's default chain id.
pub const HARDHAT_CHAIN_ID: u64 = 31337;

/// Selector of `owner()`.
pub const OWNER_SELECTOR: [u8; 4] = [0x8d, 0xa5, 0xcb, 0x5b];

struct Script {
    chain_id: u64,
    accounts: Result<Vec<String>, (i64, String)>,
    calls: HashMap<(Address, [u8; 4]), Result<Vec<u8>, (i64, String)>>,
    http_status: Option<StatusCode>,
    log: Vec<RpcRequest>,
}

/// A scripted JSON-RPC node shared between the server task and the test.
pub struct FakeChain {
    script: RwLock<Script>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            script: RwLock::new(Script {
                chain_id: HARDHAT_CHAIN_ID,
                accounts: Ok(Vec::new()),
                calls: HashMap::new(),
                http_status: None,
                log: Vec::new(),
            }),
        }
    }

    pub fn set_accounts<I, S>(&self, accounts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write().accounts = Ok(accounts.into_iter().map(Into::into).collect());
    }

    /// Answer account requests with a JSON-RPC error, e.g. `4001`.
    pub fn reject_accounts(&self, code: i64, message: &str) {
        self.write().accounts = Err((code, message.to_string()));
    }

    /// Make `owner()` on `contract` return `owner`.
    pub fn set_owner(&self, contract: Address, owner: Address) {
        self.set_call_result(contract, OWNER_SELECTOR, &[codec::address(owner)]);
    }

    /// Make calls to `contract` with `selector` return `values`, encoded
    /// the way a function returns them.
    pub fn set_call_result(&self, contract: Address, selector: [u8; 4], values: &[DynSolValue]) {
        let data = codec::encode_outputs(values);
        self.write().calls.insert((contract, selector), Ok(data));
    }

    /// Make calls to `contract` with `selector` return raw `data`.
    pub fn set_call_data(&self, contract: Address, selector: [u8; 4], data: Vec<u8>) {
        self.write().calls.insert((contract, selector), Ok(data));
    }

    /// Make calls to `contract` with `selector` fail with a JSON-RPC error.
    pub fn fail_call(&self, contract: Address, selector: [u8; 4], code: i64, message: &str) {
        self.write()
            .calls
            .insert((contract, selector), Err((code, message.to_string())));
    }

    /// Answer every request with this HTTP status and an empty body.
    pub fn fail_http(&self, status: StatusCode) {
        self.write().http_status = Some(status);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.read().log.clone()
    }

    /// Method names of every request received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.read().log.iter().map(|r| r.method.clone()).collect()
    }

    fn answer(&self, request: RpcRequest) -> Response {
        let mut script = self.write();
        script.log.push(request.clone());

        if let Some(status) = script.http_status {
            return status.into_response();
        }

        let id = request.id.clone();
        let reply = match request.method.as_str() {
            "eth_chainId" => Ok(json!(wire::encode_quantity(script.chain_id))),
            "eth_accounts" | "eth_requestAccounts" => script.accounts.clone().map(|a| json!(a)),
            "eth_call" => eth_call(&script, &request.params),
            other => Err((-32601, format!("the method {other} does not exist"))),
        };

        let body = match reply {
            Ok(result) => RpcResponse::success(id, result),
            Err((code, message)) => RpcResponse::failure(id, code, message),
        };
        Json(body).into_response()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Script> {
        self.script.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Script> {
        self.script.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

fn eth_call(script: &Script, params: &Value) -> Result<Value, (i64, String)> {
    let invalid = |m: &str| (-32602, format!("invalid params: {m}"));

    let call: CallObject = params
        .get(0)
        .cloned()
        .ok_or_else(|| invalid("missing call object"))
        .and_then(|v| serde_json::from_value(v).map_err(|e| invalid(&e.to_string())))?;
    if params.get(1).and_then(Value::as_str) != Some(wire::LATEST) {
        return Err(invalid("only the 'latest' block is served"));
    }

    let data = wire::decode_data(&call.data).map_err(|e| invalid(&e.to_string()))?;
    let selector: [u8; 4] = data
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| invalid("call data shorter than a selector"))?;

    match script.calls.get(&(call.to, selector)) {
        Some(Ok(ret)) => Ok(json!(wire::encode_data(ret))),
        Some(Err(e)) => Err(e.clone()),
        None => Err((-32000, "execution reverted".into())),
    }
}

async fn rpc(State(chain): State<Arc<FakeChain>>, Json(request): Json<RpcRequest>) -> Response {
    chain.answer(request)
}

/// Start an ephemeral in-process JSON-RPC node and return `(url, chain)`.
///
/// The node runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`. The returned URL is e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_chain() -> (String, Arc<FakeChain>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let url = format!("http://{addr}");

    let chain = Arc::new(FakeChain::new());
    let router = Router::new()
        .route("/", post(rpc))
        .with_state(Arc::clone(&chain));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance chain error");
    });

    (url, chain)
}
