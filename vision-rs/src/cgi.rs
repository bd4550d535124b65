//! CGI request decoding.
//!
//! When run as a CGI program, the standard CGI environment variables are
//! exposed to templates as `CGI::NAME`, and form fields from the query string
//! (`GET`) or request body (`POST`) as `GET::field` / `POST::field`.  A
//! `HEAD` request forces head-only output.

use std::collections::BTreeMap;
use std::env;
use std::io::{self, Read};

use tracing::debug;

use crate::script::{Interpreter, Value};

/// Environment variables copied into the `CGI` scope.
pub const CGI_VARIABLES: &[&str] = &[
    "AUTH_TYPE",
    "CONTENT_TYPE",
    "DOCUMENT_ROOT",
    "GATEWAY_INTERFACE",
    "HTTP_REFERER",
    "HTTP_USER_AGENT",
    "PATH_INFO",
    "PATH_TRANSLATED",
    "QUERY_STRING",
    "REMOTE_ADDR",
    "REMOTE_HOST",
    "REMOTE_IDENT",
    "REMOTE_USER",
    "REQUEST_METHOD",
    "SCRIPT_NAME",
    "SERVER_ADMIN",
    "SERVER_NAME",
    "SERVER_PORT",
    "SERVER_PROTOCOL",
    "SERVER_SOFTWARE",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Every name in [`CGI_VARIABLES`]; missing ones are empty.
    pub variables: BTreeMap<String, String>,
    pub content_length: usize,
    /// Decoded form fields, in request order.
    pub fields: Vec<(String, String)>,
}

impl Request {
    /// Read the request from the process environment, taking a `POST` body
    /// from `body`.
    pub fn from_env(body: &mut impl Read) -> io::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok(), body)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, body: &mut impl Read) -> io::Result<Self> {
        let variables: BTreeMap<String, String> = CGI_VARIABLES
            .iter()
            .map(|name| (name.to_string(), lookup(name).unwrap_or_default()))
            .collect();
        let content_length = lookup("CONTENT_LENGTH")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);

        let mut request = Request { variables, content_length, fields: Vec::new() };
        match request.method() {
            "GET" => {
                let query = request.variable("QUERY_STRING").to_string();
                request.fields = decode_form(query.as_bytes());
            }
            "POST" => {
                let mut raw = Vec::with_capacity(content_length);
                body.take(content_length as u64).read_to_end(&mut raw)?;
                request.fields = decode_form(&raw);
            }
            _ => {}
        }
        debug!(method = request.method(), fields = request.fields.len(), "decoded CGI request");
        Ok(request)
    }

    pub fn variable(&self, name: &str) -> &str {
        self.variables.get(name).map_or("", String::as_str)
    }

    pub fn method(&self) -> &str {
        self.variable("REQUEST_METHOD")
    }

    /// `HEAD` requests get only the header buffer.
    pub fn forces_head(&self) -> bool {
        self.method() == "HEAD"
    }

    /// Define the form fields under the request method's scope and the
    /// environment under `CGI`.
    pub fn define_into(&self, interp: &mut Interpreter) {
        if !self.method().is_empty() && !self.fields.is_empty() {
            interp.define_input(
                self.method(),
                self.fields.iter().map(|(k, v)| (k.clone(), Value::content(v.as_str()))),
            );
        }
        let variables = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::content(v.as_str())))
            .chain(std::iter::once((
                "CONTENT_LENGTH".to_string(),
                Value::Data(self.content_length as f64),
            )));
        interp.define_input("CGI", variables);
    }
}

/// Decode an `application/x-www-form-urlencoded` payload.
pub fn decode_form(raw: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw).into_owned().collect()
}
