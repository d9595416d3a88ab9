//! Component A: an ordered pool of JSON-RPC 2.0 endpoints with per-call
//! failover. Grounded on `ethrpc`'s `web3`-backed transport, generalized to
//! a plain `reqwest`-based client since the only methods this pipeline
//! needs (`eth_blockNumber`, `trace_replayBlockTransactions`) aren't
//! exposed by `web3`'s typed namespaces.

use {
    chain_types::BlockNumber,
    serde::{Deserialize, Serialize},
    state_diff::TransactionResult,
    std::time::Duration,
    url::Url,
};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error calling {method}: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("endpoint returned a JSON-RPC error for {method}: {code} {message}")]
    Remote {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("malformed response for {method}: {reason}")]
    MalformedResponse { method: &'static str, reason: String },
    #[error("call to {method} timed out after {0:?}", .timeout)]
    Timeout { method: &'static str, timeout: Duration },
    #[error("every endpoint failed calling {method}")]
    AllEndpointsFailed { method: &'static str },
}

impl RpcError {
    /// All variants here are transient by the taxonomy of spec §7: retry
    /// next endpoint, then surface to the caller, never fatal on their own.
    pub fn is_transient(&self) -> bool {
        true
    }
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "rpc_pool")]
struct Metrics {
    /// Number of JSON-RPC calls grouped by method and whether they fell
    /// back past the first endpoint.
    #[metric(labels("method", "endpoint_index"))]
    calls: prometheus::IntCounterVec,
    /// Number of calls where every configured endpoint failed.
    #[metric(labels("method"))]
    all_endpoints_failed: prometheus::IntCounterVec,
}

/// Drives one or more upstream JSON-RPC endpoints with failover.
pub struct RpcPool {
    endpoints: Vec<Url>,
    client: reqwest::Client,
    timeout: Duration,
    metrics: &'static Metrics,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl RpcPool {
    pub fn new(endpoints: Vec<Url>, timeout: Duration) -> Self {
        assert!(!endpoints.is_empty(), "rpc pool requires at least one endpoint");
        Self {
            endpoints,
            client: reqwest::Client::new(),
            timeout,
            metrics: Metrics::instance(global_metrics::get_metric_storage_registry()).unwrap(),
        }
    }

    pub fn with_default_timeout(endpoints: Vec<Url>) -> Self {
        Self::new(endpoints, DEFAULT_TIMEOUT)
    }

    /// Tries every endpoint in order with a fresh timeout each. Fails only
    /// when all endpoints fail (spec §4.A).
    async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let mut last_err = None;
        for (index, endpoint) in self.endpoints.iter().enumerate() {
            self.metrics
                .calls
                .with_label_values(&[method, &index.to_string()])
                .inc();
            match self.call_one(endpoint, method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if index > 0 {
                        tracing::debug!(%endpoint, method, ?err, "rpc endpoint fallback");
                    } else {
                        tracing::debug!(%endpoint, method, ?err, "rpc endpoint call failed");
                    }
                    last_err = Some(err);
                }
            }
        }
        self.metrics.all_endpoints_failed.with_label_values(&[method]).inc();
        tracing::warn!(method, last_err = ?last_err, "all rpc endpoints failed");
        Err(RpcError::AllEndpointsFailed { method })
    }

    async fn call_one(
        &self,
        endpoint: &Url,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response = tokio::time::timeout(
            self.timeout,
            self.client.post(endpoint.clone()).json(&request).send(),
        )
        .await
        .map_err(|_| RpcError::Timeout {
            method,
            timeout: self.timeout,
        })?
        .map_err(|source| RpcError::Transport { method, source })?;

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|source| RpcError::Transport { method, source })?;

        if let Some(error) = body.error {
            return Err(RpcError::Remote {
                method,
                code: error.code,
                message: error.message,
            });
        }

        // A `null`/absent result is valid (spec §4.A "nil responses"); callers
        // decide what an empty result means for their method.
        Ok(body.result.unwrap_or(serde_json::Value::Null))
    }

    /// `eth_blockNumber` — the current chain head.
    pub async fn get_latest_block(&self) -> Result<BlockNumber, RpcError> {
        let result = self
            .call("eth_blockNumber", serde_json::json!([]))
            .await?;
        let hex = result.as_str().ok_or_else(|| RpcError::MalformedResponse {
            method: "eth_blockNumber",
            reason: "expected hex string result".into(),
        })?;
        BlockNumber::from_str_radix(hex.trim_start_matches("0x"), 16).map_err(|err| {
            RpcError::MalformedResponse {
                method: "eth_blockNumber",
                reason: err.to_string(),
            }
        })
    }

    /// `trace_replayBlockTransactions(blockNumber, ["stateDiff"])`. A
    /// structurally empty or absent diff is not an error (spec §4.A).
    pub async fn get_state_diff(
        &self,
        block: BlockNumber,
    ) -> Result<Vec<TransactionResult>, RpcError> {
        let params = serde_json::json!([format!("0x{block:x}"), ["stateDiff"]]);
        let result = self
            .call("trace_replayBlockTransactions", params)
            .await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        let raw: Vec<RawTrace> =
            serde_json::from_value(result).map_err(|err| RpcError::MalformedResponse {
                method: "trace_replayBlockTransactions",
                reason: err.to_string(),
            })?;
        Ok(raw
            .into_iter()
            .map(|trace| TransactionResult {
                transaction_hash: trace.transaction_hash,
                state_diff: trace.state_diff.unwrap_or_default(),
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct RawTrace {
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "stateDiff", default)]
    state_diff: Option<std::collections::BTreeMap<String, state_diff::AccountDiff>>,
}
