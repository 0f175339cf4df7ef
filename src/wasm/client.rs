//! BlogClient: the browser-facing API
//!
//! Ids and amounts cross the boundary as decimal strings (uint256 does not fit
//! a JS number). Every async method returns a Promise.

use super::injected::InjectedCapability;
use super::log;
use crate::blog::{BlogContract, BlogDetail, PublishBlog};
use crate::config::ContractConfig;
use crate::core::ipfs::IpfsGateway;
use crate::core::routes::Route;
use crate::core::types::{Address, TxHash};
use crate::session::{ChainCapability, SessionError, WalletSession};
use js_sys::Promise;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

const INSTALL_WALLET_NOTICE: &str = "Please install a browser wallet extension (e.g. MetaMask) first.";

fn js_error(message: impl ToString) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn parse_id(raw: &str) -> Result<u128, JsValue> {
    raw.trim().parse().map_err(|_| js_error(format!("not a valid id: {}", raw)))
}

fn parse_address(raw: &str) -> Result<Address, JsValue> {
    raw.parse().map_err(js_error)
}

fn tx_js(hash: TxHash) -> JsValue { JsValue::from_str(&hash.to_string()) }

fn detail_json(detail: &BlogDetail, gateway: &IpfsGateway) -> Value {
    json!({
        "id": detail.id.to_string(),
        "owner": detail.owner,
        "name": detail.name,
        "intro": detail.intro,
        "ipfsCID": detail.ipfs_cid,
        "contentUrl": detail.content_url(gateway),
        "price": detail.price.to_string(),
        "viewCount": detail.view_count.to_string(),
        "publishDate": detail.publish_date.to_rfc3339(),
        "isHidden": detail.is_hidden,
        "path": detail.route().path(),
    })
}

/// Blocking notice for the user. Only the presentation boundary does this.
fn notify_user(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn with_blog<F, Fut>(session: &Rc<WalletSession>, call: F) -> Promise
where
    F: FnOnce(BlogContract) -> Fut + 'static,
    Fut: Future<Output = Result<JsValue, SessionError>> + 'static,
{
    let blog = BlogContract::from_session(session);
    future_to_promise(async move { call(blog.map_err(js_error)?).await.map_err(js_error) })
}

#[wasm_bindgen]
pub struct BlogClient {
    session: Rc<WalletSession>,
    gateway: IpfsGateway,
}

#[wasm_bindgen]
impl BlogClient {
    /// Client bound to `window.ethereum` (if present) and the fixed blog contract
    #[wasm_bindgen(constructor)]
    pub fn new(ipfs_gateway: Option<String>) -> Result<BlogClient, JsValue> {
        let capability = InjectedCapability::detect().map(|c| Rc::new(c) as Rc<dyn ChainCapability>);
        let contract = ContractConfig::blog().map_err(js_error)?;
        let gateway = ipfs_gateway.map(IpfsGateway::new).unwrap_or_default();
        Ok(BlogClient { session: Rc::new(WalletSession::new(capability, contract)), gateway })
    }

    #[wasm_bindgen(js_name = "hasWallet")]
    pub fn has_wallet(&self) -> bool {
        self.session.has_capability()
    }

    /// Connected account, if any
    pub fn account(&self) -> Option<String> {
        self.session.account().map(|a| a.to_string())
    }

    /// Explicit connect (call from a user gesture). Resolves to the account.
    pub fn connect(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            match session.connect().await {
                Ok(connection) => Ok(JsValue::from_str(&connection.signer.address().to_string())),
                Err(SessionError::CapabilityUnavailable) => {
                    notify_user(INSTALL_WALLET_NOTICE);
                    Err(js_error(SessionError::CapabilityUnavailable))
                }
                Err(e) => {
                    log!("[BlogClient] connect failed: {}", e);
                    Err(js_error(e))
                }
            }
        })
    }

    /// Startup probe. Resolves to the account or `null`; never rejects.
    #[wasm_bindgen(js_name = "silentReconnect")]
    pub fn silent_reconnect(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            Ok(match session.silent_reconnect().await {
                Some(account) => JsValue::from_str(&account.to_string()),
                None => JsValue::NULL,
            })
        })
    }

    #[wasm_bindgen(js_name = "claimTokens")]
    pub fn claim_tokens(&self) -> Promise {
        with_blog(&self.session, |blog| async move { blog.claim_tokens().await.map(tx_js) })
    }

    #[wasm_bindgen(js_name = "publishBlog")]
    pub fn publish_blog(&self, name: String, intro: String, ipfs_cid: String, price: String) -> Result<Promise, JsValue> {
        let request = PublishBlog { name, intro, ipfs_cid, price: parse_id(&price)? };
        Ok(with_blog(&self.session, move |blog| async move { blog.publish_blog(&request).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "purchaseBlog")]
    pub fn purchase_blog(&self, blog_id: String) -> Result<Promise, JsValue> {
        let id = parse_id(&blog_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.purchase_blog(id).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "viewBlog")]
    pub fn view_blog(&self, blog_id: String) -> Result<Promise, JsValue> {
        let id = parse_id(&blog_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.view_blog(id).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "addComment")]
    pub fn add_comment(&self, blog_id: String, content: String) -> Result<Promise, JsValue> {
        let id = parse_id(&blog_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.add_comment(id, &content).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "createHideProposal")]
    pub fn create_hide_proposal(&self, blog_id: String, reason: String) -> Result<Promise, JsValue> {
        let id = parse_id(&blog_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.create_hide_proposal(id, &reason).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "voteOnProposal")]
    pub fn vote_on_proposal(&self, proposal_id: String) -> Result<Promise, JsValue> {
        let id = parse_id(&proposal_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.vote_on_proposal(id).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "executeProposal")]
    pub fn execute_proposal(&self, proposal_id: String) -> Result<Promise, JsValue> {
        let id = parse_id(&proposal_id)?;
        Ok(with_blog(&self.session, move |blog| async move { blog.execute_proposal(id).await.map(tx_js) }))
    }

    #[wasm_bindgen(js_name = "balanceOf")]
    pub fn balance_of(&self, account: String) -> Result<Promise, JsValue> {
        let account = parse_address(&account)?;
        Ok(with_blog(&self.session, move |blog| async move {
            blog.balance_of(account).await.map(|b| JsValue::from_str(&b.to_string()))
        }))
    }

    #[wasm_bindgen(js_name = "hasPurchased")]
    pub fn has_purchased(&self, account: String, blog_id: String) -> Result<Promise, JsValue> {
        let account = parse_address(&account)?;
        let id = parse_id(&blog_id)?;
        Ok(with_blog(&self.session, move |blog| async move {
            blog.has_purchased(account, id).await.map(JsValue::from_bool)
        }))
    }

    #[wasm_bindgen(js_name = "blogDetail")]
    pub fn blog_detail(&self, blog_id: String) -> Result<Promise, JsValue> {
        let id = parse_id(&blog_id)?;
        let gateway = self.gateway.clone();
        let blog = BlogContract::from_session(&self.session);
        Ok(future_to_promise(async move {
            let detail = blog.map_err(js_error)?.get_blog_detail(id).await.map_err(js_error)?;
            to_js(&detail_json(&detail, &gateway))
        }))
    }

    #[wasm_bindgen(js_name = "publishedBlogs")]
    pub fn published_blogs(&self, user: String) -> Result<Promise, JsValue> {
        let user = parse_address(&user)?;
        let blog = BlogContract::from_session(&self.session);
        Ok(future_to_promise(async move {
            let ids = blog.map_err(js_error)?.get_user_published_blogs(user).await.map_err(js_error)?;
            to_js(&json!(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>()))
        }))
    }

    #[wasm_bindgen(js_name = "ipfsUrl")]
    pub fn ipfs_url(&self, cid: &str) -> String {
        self.gateway.url(cid)
    }

    /// Route name for a path, or `undefined` when nothing matches
    #[wasm_bindgen(js_name = "resolveRoute")]
    pub fn resolve_route(path: &str) -> Option<String> {
        Route::resolve(path).map(|r| r.name().to_string())
    }
}
