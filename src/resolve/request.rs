//! Incoming mirror-list requests.

use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::MAX_REQUEST_LINE_LENGTH;
use crate::error_handling::RequestError;

/// A decoded request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorRequest {
    pub repo: Option<String>,
    pub arch: Option<String>,
    pub path: Option<String>,
    /// Comma-separated country list, as sent.
    pub country: Option<String>,
    /// `"1"` or absent enables the netblock tier.
    pub netblock: Option<String>,
    pub location: Option<String>,
    pub protocol: Option<String>,
    pub metalink: bool,
    /// Report the snapshot creation time in the header.
    pub time: bool,
    pub client_ip: String,
}

impl MirrorRequest {
    /// Builds a request from key/value pairs.
    ///
    /// Unknown keys and `path` combined with `repo`/`arch` are rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = MirrorRequest::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value: String = value.into();
            match key {
                "repo" => request.repo = Some(value),
                "arch" => request.arch = Some(value),
                "path" => request.path = Some(value),
                "country" => request.country = Some(value),
                "netblock" => request.netblock = Some(value),
                "location" => request.location = Some(value),
                "protocol" => request.protocol = Some(value),
                "metalink" => request.metalink = parse_bool(key, &value)?,
                "time" => request.time = parse_bool(key, &value)?,
                "client_ip" => request.client_ip = value,
                other => return Err(RequestError::UnknownField(other.to_string())),
            }
        }
        if request.path.is_some() && (request.repo.is_some() || request.arch.is_some()) {
            return Err(RequestError::ConflictingTarget);
        }
        Ok(request)
    }

    /// Parses a URL query string such as `repo=fedora-40&arch=x86_64&client_ip=…`.
    pub fn from_query(query: &str) -> Result<Self, RequestError> {
        if query.len() > MAX_REQUEST_LINE_LENGTH {
            return Err(RequestError::TooLong(query.len()));
        }
        let query = query.trim().trim_start_matches('?');
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Requested countries, upper-cased and deduplicated in order.
    ///
    /// `None` when no `country` field was sent or it names no country.
    pub fn requested_countries(&self) -> Option<Vec<String>> {
        let raw = self.country.as_ref()?;
        let mut seen = HashSet::new();
        let countries: Vec<String> = raw
            .split(',')
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .filter(|c| seen.insert(c.clone()))
            .collect();
        // `country=` or `country=,` names nothing
        (!countries.is_empty()).then_some(countries)
    }

    pub fn netblock_enabled(&self) -> bool {
        self.netblock.as_deref().is_none_or(|value| value == "1")
    }

    /// The client address, if it parses.
    pub fn client_addr(&self) -> Option<IpAddr> {
        self.client_ip.trim().parse().ok()
    }

    /// The requested protocol, if one was given.
    pub fn explicit_protocol(&self) -> Option<&str> {
        self.protocol.as_deref().filter(|p| !p.is_empty())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, RequestError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RequestError::InvalidBool {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
