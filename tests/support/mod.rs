//! Scripted in-memory chain connection for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use blogchain::abi::{encode, Token};
use blogchain::session::{CapabilityError, CapabilityResult, ChainCapability};
use blogchain::Address;
use futures::channel::oneshot;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

pub fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

pub struct MockWallet {
    /// Result of `eth_requestAccounts`
    pub approved: RefCell<CapabilityResult<Vec<Address>>>,
    /// Result of `eth_accounts`
    pub authorized: RefCell<CapabilityResult<Vec<Address>>>,
    /// `eth_call` return data keyed by 4-byte selector
    pub returns: RefCell<HashMap<[u8; 4], Vec<u8>>>,
    /// Queued `eth_getTransactionReceipt` answers; empty queue answers null
    pub receipts: RefCell<VecDeque<Value>>,
    /// Gated `eth_requestAccounts` answers, consumed before `approved`
    pub gated: RefCell<VecDeque<oneshot::Receiver<Vec<Address>>>>,
    pub requests: RefCell<Vec<(String, Value)>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            approved: RefCell::new(Ok(Vec::new())),
            authorized: RefCell::new(Ok(Vec::new())),
            returns: RefCell::new(HashMap::new()),
            receipts: RefCell::new(VecDeque::new()),
            gated: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_approved(self, accounts: Vec<Address>) -> Self {
        *self.approved.borrow_mut() = Ok(accounts);
        self
    }

    pub fn with_authorized(self, accounts: CapabilityResult<Vec<Address>>) -> Self {
        *self.authorized.borrow_mut() = accounts;
        self
    }

    pub fn returning(self, selector: [u8; 4], tokens: &[Token]) -> Self {
        self.returns.borrow_mut().insert(selector, encode(tokens));
        self
    }

    pub fn shared(self) -> Rc<Self> { Rc::new(self) }

    pub fn count(&self, method: &str) -> usize {
        self.requests.borrow().iter().filter(|(m, _)| m == method).count()
    }

    /// Params of the last request with this method
    pub fn last(&self, method: &str) -> Option<Value> {
        self.requests.borrow().iter().rev().find(|(m, _)| m == method).map(|(_, p)| p.clone())
    }

    /// Calldata of the last transaction sent
    pub fn last_sent_data(&self) -> Vec<u8> {
        let params = self.last("eth_sendTransaction").expect("a sent transaction");
        let data = params[0]["data"].as_str().expect("data").trim_start_matches("0x").to_string();
        hex::decode(data).expect("hex data")
    }
}

#[async_trait(?Send)]
impl ChainCapability for MockWallet {
    async fn request(&self, method: &str, params: Value) -> CapabilityResult<Value> {
        self.requests.borrow_mut().push((method.to_string(), params.clone()));
        match method {
            "eth_requestAccounts" => {
                let gate = self.gated.borrow_mut().pop_front();
                let accounts = match gate {
                    Some(rx) => rx.await.map_err(|_| CapabilityError::Transport("gate dropped".into()))?,
                    None => self.approved.borrow().clone()?,
                };
                Ok(json!(accounts))
            }
            "eth_accounts" => Ok(json!(self.authorized.borrow().clone()?)),
            "eth_chainId" => Ok(json!("0x7a69")),
            "eth_call" => {
                let data = params[0]["data"].as_str().unwrap_or("0x");
                let raw = hex::decode(data.trim_start_matches("0x"))
                    .map_err(|e| CapabilityError::Malformed(e.to_string()))?;
                let selector: [u8; 4] = raw
                    .get(..4)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| CapabilityError::Malformed("short calldata".into()))?;
                match self.returns.borrow().get(&selector) {
                    Some(out) => Ok(json!(format!("0x{}", hex::encode(out)))),
                    None => Err(CapabilityError::from_rpc(-32000, "execution reverted")),
                }
            }
            "eth_sendTransaction" => {
                let n = self.count("eth_sendTransaction");
                Ok(json!(format!("0x{:064x}", n)))
            }
            "eth_getTransactionReceipt" => Ok(self.receipts.borrow_mut().pop_front().unwrap_or(Value::Null)),
            _ => Err(CapabilityError::from_rpc(-32601, format!("method not found: {}", method))),
        }
    }
}

/// Returns Pending once, waking itself, so sibling futures in a join get polled.
pub struct YieldOnce(bool);

pub fn yield_once() -> YieldOnce { YieldOnce(false) }

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
