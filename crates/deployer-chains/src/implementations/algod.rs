//! algod REST client.
//!
//! Implements [`LedgerClient`] on top of the node's v2 HTTP API. Certificates
//! are always verified; an extra trusted root can be supplied for nodes that
//! use a private CA.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use deployer_types::{
	AccountInfo, Address, CompiledProgram, DeployError, LedgerClient, MicroAlgos,
	PendingTransactionInfo, Result, Round, SignedTransaction, SuggestedParams, TransactionId,
};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the node API token.
pub const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Number of rounds a transaction stays valid after the suggested first round.
pub const VALIDITY_WINDOW: u64 = 1000;

/// The node holds wait-for-block requests open for up to a minute.
const WAIT_FOR_BLOCK_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Deserialize)]
struct NodeStatus {
	#[serde(rename = "last-round")]
	last_round: u64,
}

#[derive(Deserialize)]
struct AccountResponse {
	amount: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ParamsResponse {
	fee: u64,
	min_fee: u64,
	last_round: u64,
	genesis_id: String,
	genesis_hash: String,
}

#[derive(Deserialize)]
struct CompileResponse {
	hash: String,
	result: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
	#[serde(rename = "txId")]
	tx_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
	message: String,
}

/// Client for a single algod endpoint.
pub struct AlgodClient {
	base_url: String,
	token: String,
	http: Client,
}

/// Builder for creating AlgodClient instances.
pub struct AlgodClientBuilder {
	base_url: String,
	token: String,
	request_timeout: Duration,
	ca_certificate: Option<PathBuf>,
}

impl AlgodClient {
	pub fn builder(base_url: &str) -> AlgodClientBuilder {
		AlgodClientBuilder {
			base_url: base_url.trim_end_matches('/').to_string(),
			token: String::new(),
			request_timeout: Duration::from_secs(30),
			ca_certificate: None,
		}
	}

	fn get(&self, path: &str) -> RequestBuilder {
		self.authorize(self.http.get(format!("{}{}", self.base_url, path)))
	}

	fn post(&self, path: &str) -> RequestBuilder {
		self.authorize(self.http.post(format!("{}{}", self.base_url, path)))
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		if self.token.is_empty() {
			request
		} else {
			request.header(API_TOKEN_HEADER, &self.token)
		}
	}

	async fn send<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> Result<T> {
		let response = request
			.send()
			.await
			.map_err(|e| DeployError::Network(format!("{} request failed: {}", what, e)))?;
		decode(what, response).await
	}
}

impl AlgodClientBuilder {
	pub fn token(mut self, token: impl Into<String>) -> Self {
		self.token = token.into();
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn ca_certificate(mut self, path: Option<PathBuf>) -> Self {
		self.ca_certificate = path;
		self
	}

	pub async fn build(self) -> Result<AlgodClient> {
		info!("Creating algod client for {}", self.base_url);

		let mut builder = Client::builder().timeout(self.request_timeout);

		if let Some(path) = &self.ca_certificate {
			let pem = tokio::fs::read(path).await.map_err(|e| {
				DeployError::Config(format!(
					"Failed to read CA certificate {}: {}",
					path.display(),
					e
				))
			})?;
			let certificate = reqwest::Certificate::from_pem(&pem)
				.map_err(|e| DeployError::Config(format!("Invalid CA certificate: {}", e)))?;
			builder = builder.add_root_certificate(certificate);
		}

		let http = builder
			.build()
			.map_err(|e| DeployError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(AlgodClient {
			base_url: self.base_url,
			token: self.token,
			http,
		})
	}
}

async fn decode<T: DeserializeOwned>(what: &str, response: Response) -> Result<T> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		let message = serde_json::from_str::<ErrorResponse>(&body)
			.map(|e| e.message)
			.unwrap_or(body);
		return Err(DeployError::Network(format!(
			"{} returned {}: {}",
			what, status, message
		)));
	}

	response
		.json::<T>()
		.await
		.map_err(|e| DeployError::Network(format!("Invalid {} response: {}", what, e)))
}

#[async_trait]
impl LedgerClient for AlgodClient {
	async fn current_round(&self) -> Result<Round> {
		let status: NodeStatus = self.send("status", self.get("/v2/status")).await?;
		Ok(Round(status.last_round))
	}

	async fn wait_for_round(&self, round: Round) -> Result<()> {
		debug!("Waiting for block after round {}", round);
		let request = self
			.get(&format!("/v2/status/wait-for-block-after/{}", round))
			.timeout(WAIT_FOR_BLOCK_TIMEOUT);
		let _: NodeStatus = self.send("wait for block", request).await?;
		Ok(())
	}

	async fn pending_transaction_info(
		&self,
		tx_id: &TransactionId,
	) -> Result<PendingTransactionInfo> {
		self.send(
			"pending transaction info",
			self.get(&format!("/v2/transactions/pending/{}", tx_id)),
		)
		.await
	}

	async fn account_info(&self, address: &Address) -> Result<AccountInfo> {
		let account: AccountResponse = self
			.send(
				"account info",
				self.get(&format!("/v2/accounts/{}", address)),
			)
			.await?;
		Ok(AccountInfo {
			address: *address,
			amount: MicroAlgos(account.amount),
		})
	}

	async fn suggested_params(&self) -> Result<SuggestedParams> {
		let params: ParamsResponse = self
			.send("suggested params", self.get("/v2/transactions/params"))
			.await?;

		let hash = BASE64
			.decode(&params.genesis_hash)
			.map_err(|e| DeployError::Network(format!("Invalid genesis hash: {}", e)))?;
		let genesis_hash: [u8; 32] = hash.try_into().map_err(|h: Vec<u8>| {
			DeployError::Network(format!("Genesis hash must be 32 bytes, got {}", h.len()))
		})?;

		let last_valid = params
			.last_round
			.checked_add(VALIDITY_WINDOW)
			.ok_or_else(|| {
				DeployError::Network(format!("Node reported impossible round {}", params.last_round))
			})?;

		Ok(SuggestedParams {
			fee: params.fee,
			min_fee: params.min_fee,
			first_valid: Round(params.last_round),
			last_valid: Round(last_valid),
			genesis_id: params.genesis_id,
			genesis_hash,
		})
	}

	async fn compile(&self, source: &str) -> Result<CompiledProgram> {
		let request = self
			.post("/v2/teal/compile")
			.header(CONTENT_TYPE, "text/plain")
			.body(source.to_string());
		let compiled: CompileResponse = self.send("compile", request).await?;

		let bytes = BASE64
			.decode(&compiled.result)
			.map_err(|e| DeployError::Network(format!("Invalid compiled program: {}", e)))?;

		Ok(CompiledProgram {
			hash: compiled.hash,
			bytes,
		})
	}

	async fn send_raw_transaction(&self, signed: &SignedTransaction) -> Result<TransactionId> {
		let request = self
			.post("/v2/transactions")
			.header(CONTENT_TYPE, "application/x-binary")
			.body(signed.bytes.clone());
		let submitted: SubmitResponse = self.send("submit transaction", request).await?;

		TransactionId::new(submitted.tx_id)
			.ok_or_else(|| DeployError::Network("Node returned an empty transaction id".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use httpmock::prelude::*;
	use serde_json::json;

	async fn client(server: &MockServer) -> AlgodClient {
		AlgodClient::builder(&server.base_url())
			.token("secret")
			.build()
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_current_round_sends_token() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/v2/status")
					.header("x-algo-api-token", "secret");
				then.status(200).json_body(json!({ "last-round": 100 }));
			})
			.await;

		let round = client(&server).await.current_round().await.unwrap();

		mock.assert_async().await;
		assert_eq!(round, Round(100));
	}

	#[tokio::test]
	async fn test_wait_for_round_path() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/status/wait-for-block-after/101");
				then.status(200).json_body(json!({ "last-round": 101 }));
			})
			.await;

		client(&server)
			.await
			.wait_for_round(Round(101))
			.await
			.unwrap();

		mock.assert_async().await;
	}

	#[tokio::test]
	async fn test_pending_transaction_info() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/transactions/pending/TXID");
				then.status(200).json_body(json!({
					"confirmed-round": 102,
					"application-index": 55,
					"pool-error": "",
					"txn": { "sig": "AAAA" }
				}));
			})
			.await;

		let info = client(&server)
			.await
			.pending_transaction_info(&TransactionId::new("TXID").unwrap())
			.await
			.unwrap();

		assert_eq!(info, PendingTransactionInfo::confirmed(102, Some(55)));
	}

	#[tokio::test]
	async fn test_error_status_maps_to_network_error() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/transactions/pending/MISSING");
				then.status(404)
					.json_body(json!({ "message": "txn does not exist" }));
			})
			.await;

		let err = client(&server)
			.await
			.pending_transaction_info(&TransactionId::new("MISSING").unwrap())
			.await
			.unwrap_err();

		match err {
			DeployError::Network(msg) => {
				assert!(msg.contains("404"));
				assert!(msg.contains("txn does not exist"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_account_info_amount() {
		let address = Address([5u8; 32]);
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET)
					.path(format!("/v2/accounts/{}", address));
				then.status(200)
					.json_body(json!({ "address": address.to_string(), "amount": 1_250_000 }));
			})
			.await;

		let info = client(&server).await.account_info(&address).await.unwrap();

		assert_eq!(info.address, address);
		assert_eq!(info.amount, MicroAlgos(1_250_000));
	}

	#[tokio::test]
	async fn test_suggested_params_validity_window() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/transactions/params");
				then.status(200).json_body(json!({
					"consensus-version": "v40",
					"fee": 0,
					"min-fee": 1000,
					"last-round": 200,
					"genesis-id": "testnet-v1.0",
					"genesis-hash": BASE64.encode([7u8; 32]),
				}));
			})
			.await;

		let params = client(&server).await.suggested_params().await.unwrap();

		assert_eq!(params.first_valid, Round(200));
		assert_eq!(params.last_valid, Round(200 + VALIDITY_WINDOW));
		assert_eq!(params.min_fee, 1000);
		assert_eq!(params.genesis_id, "testnet-v1.0");
		assert_eq!(params.genesis_hash, [7u8; 32]);
	}

	#[tokio::test]
	async fn test_suggested_params_rejects_short_genesis_hash() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/transactions/params");
				then.status(200).json_body(json!({
					"fee": 0,
					"min-fee": 1000,
					"last-round": 200,
					"genesis-id": "testnet-v1.0",
					"genesis-hash": BASE64.encode([7u8; 8]),
				}));
			})
			.await;

		let err = client(&server).await.suggested_params().await.unwrap_err();
		assert!(matches!(err, DeployError::Network(msg) if msg.contains("32 bytes")));
	}

	#[tokio::test]
	async fn test_suggested_params_rejects_round_overflow() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/v2/transactions/params");
				then.status(200).json_body(json!({
					"fee": 0,
					"min-fee": 1000,
					"last-round": u64::MAX,
					"genesis-id": "testnet-v1.0",
					"genesis-hash": BASE64.encode([7u8; 32]),
				}));
			})
			.await;

		let err = client(&server).await.suggested_params().await.unwrap_err();
		assert!(matches!(err, DeployError::Network(msg) if msg.contains("impossible round")));
	}

	#[tokio::test]
	async fn test_compile_posts_source() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/v2/teal/compile")
					.header("content-type", "text/plain")
					.body("#pragma version 6\nint 1");
				then.status(200).json_body(json!({
					"hash": "PROGRAMHASH",
					"result": BASE64.encode([0x06, 0x81, 0x01]),
				}));
			})
			.await;

		let compiled = client(&server)
			.await
			.compile("#pragma version 6\nint 1")
			.await
			.unwrap();

		mock.assert_async().await;
		assert_eq!(compiled.hash, "PROGRAMHASH");
		assert_eq!(compiled.bytes, vec![0x06, 0x81, 0x01]);
	}

	#[tokio::test]
	async fn test_send_raw_transaction() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/v2/transactions")
					.header("content-type", "application/x-binary");
				then.status(200).json_body(json!({ "txId": "NEWTXID" }));
			})
			.await;

		let signed = SignedTransaction {
			id: "NEWTXID".to_string(),
			bytes: vec![0x82, 0xa3],
		};
		let tx_id = client(&server)
			.await
			.send_raw_transaction(&signed)
			.await
			.unwrap();

		mock.assert_async().await;
		assert_eq!(tx_id.as_str(), "NEWTXID");
	}

	#[tokio::test]
	async fn test_missing_ca_certificate_is_config_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = AlgodClient::builder("https://node.example")
			.ca_certificate(Some(dir.path().join("missing.pem")))
			.build()
			.await
			.err()
			.unwrap();
		assert!(matches!(err, DeployError::Config(_)));
	}
}
