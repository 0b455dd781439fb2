// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Known endpoint shapes per operation, in probing order.
//!
//! Deployments of the provider expose the same operation under different
//! routes. Each operation lists every shape it has been seen under; the
//! provider tries them in order and stops at the first 2xx.

use reqwest::Method;
use serde_json::{json, Value};

use courier_core::OutboundMessage;

/// One request shape to try.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl Candidate {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn with_query(mut self, key: &'static str, value: &str) -> Self {
        self.query.push((key, value.to_string()));
        self
    }
}

const SESSION_ROOTS: [&str; 3] = ["instances", "instance", "sessions"];

fn per_root(method: Method, remote_id: &str, action: &str) -> Vec<Candidate> {
    SESSION_ROOTS
        .iter()
        .map(|root| Candidate::new(method.clone(), format!("/{root}/{remote_id}/{action}")))
        .collect()
}

pub fn create(name: &str) -> Vec<Candidate> {
    ["/instances", "/instance"]
        .into_iter()
        .map(|p| Candidate::new(Method::POST, p.to_string()).with_body(json!({ "name": name })))
        .collect()
}

pub fn start(remote_id: &str) -> Vec<Candidate> {
    let mut list = per_root(Method::POST, remote_id, "start");
    list.push(Candidate::new(Method::GET, format!("/instances/{remote_id}")));
    list
}

pub fn stop(remote_id: &str) -> Vec<Candidate> {
    let mut list = per_root(Method::POST, remote_id, "stop");
    list.push(Candidate::new(Method::DELETE, format!("/instances/{remote_id}")));
    list
}

pub fn qr_code(remote_id: &str) -> Vec<Candidate> {
    per_root(Method::GET, remote_id, "qrcode")
}

pub fn status(remote_id: &str) -> Vec<Candidate> {
    let mut list = per_root(Method::GET, remote_id, "status");
    list.push(Candidate::new(Method::GET, "/status".to_string()).with_query("instance", remote_id));
    list
}

pub fn send(remote_id: &str, message: &OutboundMessage) -> Vec<Candidate> {
    let body = json!({ "to": message.to, "text": message.text, "type": message.kind });
    let mut list: Vec<Candidate> = per_root(Method::POST, remote_id, "send")
        .into_iter()
        .map(|c| c.with_body(body.clone()))
        .collect();
    list.push(
        Candidate::new(Method::POST, "/sendMessage".to_string())
            .with_query("instance", remote_id)
            .with_body(body),
    );
    list
}
