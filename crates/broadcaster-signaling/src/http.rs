//! Blocking HTTP implementation of the signaling contract.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use broadcaster_rtc::{MediaKind, TransportOptions};

use crate::{
    DataConsumerOptions, RouterCapabilities, SignalingClient, SignalingError, SignalingResult,
    TransportDirection, DEFAULT_REQUEST_TIMEOUT,
};

/// How much of an error body to keep for logging.
const ERROR_BODY_LIMIT: usize = 256;

/// Signaling client speaking the mediasoup broadcaster REST dialect over
/// HTTP(S).
pub struct HttpSignalingClient {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpSignalingClient {
    /// Creates a client for `base_url` (the room URL). `verify_ssl =
    /// false` accepts self-signed certificates, for lab deployments.
    pub fn new(base_url: &str, verify_ssl: bool) -> SignalingResult<Self> {
        Self::with_timeout(base_url, verify_ssl, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Same as [`Self::new`] with an explicit per-request budget.
    pub fn with_timeout(
        base_url: &str,
        verify_ssl: bool,
        timeout: Duration,
    ) -> SignalingResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| SignalingError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SignalingError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| SignalingError::Http(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn post(&self, url: Url, body: &Value) -> SignalingResult<Value> {
        debug!(%url, "signaling POST");
        let response = self.http.post(url).json(body).send()?;
        Self::parse_response(response)
    }

    fn parse_response(response: reqwest::blocking::Response) -> SignalingResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SignalingError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SignalingError::Malformed(e.to_string()))
    }

    fn extract_id(value: Value) -> SignalingResult<String> {
        value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SignalingError::Malformed("response has no \"id\" field".into()))
    }
}

impl SignalingClient for HttpSignalingClient {
    fn load_capabilities(&self) -> SignalingResult<RouterCapabilities> {
        let url = self.base_url.clone();
        debug!(%url, "signaling GET capabilities");
        let response = self.http.get(url).send()?;
        let body = Self::parse_response(response)?;

        // Some server versions wrap the capabilities, some return them
        // bare.
        match body.get("rtpCapabilities") {
            Some(caps) => Ok(caps.clone()),
            None => Ok(body),
        }
    }

    fn announce(&self, broadcaster_id: &str, rtp_capabilities: &Value) -> SignalingResult<()> {
        let body = json!({
            "id": broadcaster_id,
            "displayName": "broadcaster",
            "device": { "name": "sfu-broadcaster" },
            "rtpCapabilities": rtp_capabilities,
        });
        self.post(self.endpoint(&["broadcasters"]), &body)?;
        Ok(())
    }

    fn create_transport(
        &self,
        broadcaster_id: &str,
        direction: TransportDirection,
        enable_sctp: bool,
        sctp_capabilities: &Value,
    ) -> SignalingResult<TransportOptions> {
        debug!(direction = direction.name(), "creating server transport");
        let mut body = json!({
            "type": "webrtc",
            "rtcpMux": true,
        });
        if enable_sctp {
            body["sctpCapabilities"] = sctp_capabilities.clone();
        }

        let response = self.post(
            self.endpoint(&["broadcasters", broadcaster_id, "transports"]),
            &body,
        )?;
        serde_json::from_value(response).map_err(|e| SignalingError::Malformed(e.to_string()))
    }

    fn connect_transport(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        dtls_parameters: &Value,
    ) -> SignalingResult<()> {
        let body = json!({ "dtlsParameters": dtls_parameters });
        self.post(
            self.endpoint(&[
                "broadcasters",
                broadcaster_id,
                "transports",
                transport_id,
                "connect",
            ]),
            &body,
        )?;
        Ok(())
    }

    fn produce(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: &Value,
        app_data: &Value,
    ) -> SignalingResult<String> {
        let body = json!({
            "kind": kind,
            "rtpParameters": rtp_parameters,
            "appData": app_data,
        });
        let response = self.post(
            self.endpoint(&[
                "broadcasters",
                broadcaster_id,
                "transports",
                transport_id,
                "producers",
            ]),
            &body,
        )?;
        Self::extract_id(response)
    }

    fn produce_data(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        sctp_stream_parameters: &Value,
        label: &str,
        protocol: &str,
        app_data: &Value,
    ) -> SignalingResult<String> {
        let body = json!({
            "label": label,
            "protocol": protocol,
            "sctpStreamParameters": sctp_stream_parameters,
            "appData": app_data,
        });
        let response = self.post(
            self.endpoint(&[
                "broadcasters",
                broadcaster_id,
                "transports",
                transport_id,
                "produce_data",
            ]),
            &body,
        )?;
        Self::extract_id(response)
    }

    fn create_data_consumer(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        data_producer_id: &str,
    ) -> SignalingResult<DataConsumerOptions> {
        let mut url = self.endpoint(&[
            "broadcasters",
            broadcaster_id,
            "transports",
            transport_id,
            "consume_data",
        ]);
        url.query_pairs_mut()
            .append_pair("dataProducerId", data_producer_id);

        let response = self.post(url, &json!({}))?;
        serde_json::from_value(response).map_err(|e| SignalingError::Malformed(e.to_string()))
    }

    fn remove_broadcaster(&self, broadcaster_id: &str) -> SignalingResult<()> {
        let url = self.endpoint(&["broadcasters", broadcaster_id]);
        debug!(%url, "signaling DELETE");
        match self.http.delete(url).send() {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!(status = status.as_u16(), "broadcaster removal rejected");
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body[..end].to_string()
    }
}
