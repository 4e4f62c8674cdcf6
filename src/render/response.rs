//! Resolver responses.

use serde::{Deserialize, Serialize};

use super::metalink::metalink_failure_doc;
use super::urls::HostUrls;
use crate::error_handling::RequestError;
use crate::snapshot::HostId;

/// Kind of payload carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Mirrorlist,
    Metalink,
}

/// Response payload: ranked hosts with URLs, or a metalink document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseResults {
    Mirrors(HostUrls),
    Metalink(String),
}

/// The answer to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorListResponse {
    /// Diagnostic header, `#`-prefixed lines.
    pub message: Option<String>,
    pub resulttype: ResultType,
    /// 200, 400 or 404.
    pub returncode: u16,
    pub results: ResponseResults,
}

impl MirrorListResponse {
    /// A successful plain mirror list.
    pub fn mirrorlist(message: String, results: HostUrls) -> Self {
        Self {
            message: Some(message),
            resulttype: ResultType::Mirrorlist,
            returncode: 200,
            results: ResponseResults::Mirrors(results),
        }
    }

    /// A metalink document with its status code.
    pub fn metalink(returncode: u16, document: String) -> Self {
        Self {
            message: None,
            resulttype: ResultType::Metalink,
            returncode,
            results: ResponseResults::Metalink(document),
        }
    }

    /// A non-fatal error answered with status 200 and no hosts.
    ///
    /// Metalink requests get a failure document carrying the message.
    pub fn error(message: String, metalink: bool) -> Self {
        if metalink {
            Self {
                results: ResponseResults::Metalink(metalink_failure_doc(Some(&message))),
                message: Some(message),
                resulttype: ResultType::Metalink,
                returncode: 200,
            }
        } else {
            Self {
                message: Some(message),
                resulttype: ResultType::Mirrorlist,
                returncode: 200,
                results: ResponseResults::Mirrors(Vec::new()),
            }
        }
    }

    /// Response for a request that could not be decoded.
    pub fn bad_request(error: &RequestError) -> Self {
        Self {
            message: Some(format!("Bad Request: {}", error)),
            resulttype: ResultType::Mirrorlist,
            returncode: 400,
            results: ResponseResults::Mirrors(Vec::new()),
        }
    }

    /// Host ids in result order; empty for metalink responses.
    pub fn host_ids(&self) -> Vec<HostId> {
        match &self.results {
            ResponseResults::Mirrors(hosts) => hosts.iter().map(|(id, _)| *id).collect(),
            ResponseResults::Metalink(_) => Vec::new(),
        }
    }

    /// The metalink document, if this is a metalink response.
    pub fn document(&self) -> Option<&str> {
        match &self.results {
            ResponseResults::Metalink(doc) => Some(doc),
            ResponseResults::Mirrors(_) => None,
        }
    }
}
