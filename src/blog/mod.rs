//! BlogContract - typed calls against the blog contract
//!
//! | Call | Kind | Returns |
//! |------|------|---------|
//! | `claim_tokens` | send | tx hash (faucet) |
//! | `publish_blog` | send | tx hash |
//! | `purchase_blog` / `view_blog` | send | tx hash |
//! | `add_comment` | send | tx hash |
//! | `create_hide_proposal` / `vote_on_proposal` / `execute_proposal` | send | tx hash (DAO) |
//! | `balance_of` | call | token balance |
//! | `has_purchased` | call | bool |
//! | `get_blog_detail` | call | [`BlogDetail`] |
//! | `get_user_published_blogs` | call | blog ids |

use crate::abi::Token;
use crate::core::constants::functions as f;
use crate::core::ipfs::IpfsGateway;
use crate::core::routes::Route;
use crate::core::types::{Address, TxHash};
use crate::session::{ContractHandle, SessionError, WalletSession};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishBlog {
    pub name: String,
    pub intro: String,
    pub ipfs_cid: String,
    pub price: u128,
}

impl PublishBlog {
    fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::InvalidArgument("blog name is empty".into()));
        }
        if self.ipfs_cid.trim().is_empty() {
            return Err(SessionError::InvalidArgument("ipfs cid is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogDetail {
    pub id: u128,
    pub owner: Address,
    pub name: String,
    pub intro: String,
    pub ipfs_cid: String,
    pub price: u128,
    pub view_count: u128,
    pub publish_date: DateTime<Utc>,
    pub is_hidden: bool,
}

impl BlogDetail {
    fn from_tokens(id: u128, tokens: Vec<Token>) -> Result<Self, SessionError> {
        let bad = || SessionError::UnexpectedOutput(f::GET_BLOG_DETAIL.into());
        let [owner, name, intro, ipfs_cid, price, view_count, publish_date, is_hidden]: [Token; 8] =
            tokens.try_into().map_err(|_| bad())?;
        let seconds = i64::try_from(publish_date.into_uint().ok_or_else(bad)?).map_err(|_| bad())?;
        Ok(Self {
            id,
            owner: owner.into_address().ok_or_else(bad)?,
            name: name.into_string().ok_or_else(bad)?,
            intro: intro.into_string().ok_or_else(bad)?,
            ipfs_cid: ipfs_cid.into_string().ok_or_else(bad)?,
            price: price.into_uint().ok_or_else(bad)?,
            view_count: view_count.into_uint().ok_or_else(bad)?,
            publish_date: Utc.timestamp_opt(seconds, 0).single().ok_or_else(bad)?,
            is_hidden: is_hidden.into_bool().ok_or_else(bad)?,
        })
    }

    pub fn content_url(&self, gateway: &IpfsGateway) -> String { gateway.url(&self.ipfs_cid) }

    pub fn route(&self) -> Route { Route::blog(self.id) }
}

#[derive(Clone, Debug)]
pub struct BlogContract {
    handle: ContractHandle,
}

impl BlogContract {
    pub fn new(handle: ContractHandle) -> Self { Self { handle } }

    /// Contract of the current session; `NoActiveSession` before connect
    pub fn from_session(session: &WalletSession) -> Result<Self, SessionError> {
        Ok(Self::new(session.contract()?))
    }

    pub fn handle(&self) -> &ContractHandle { &self.handle }

    pub async fn claim_tokens(&self) -> Result<TxHash, SessionError> {
        self.handle.send(f::CLAIM_TOKENS, &[]).await
    }

    pub async fn publish_blog(&self, blog: &PublishBlog) -> Result<TxHash, SessionError> {
        blog.validate()?;
        self.handle
            .send(
                f::PUBLISH_BLOG,
                &[
                    Token::String(blog.name.clone()),
                    Token::String(blog.intro.clone()),
                    Token::String(blog.ipfs_cid.clone()),
                    Token::Uint(blog.price),
                ],
            )
            .await
    }

    pub async fn purchase_blog(&self, blog_id: u128) -> Result<TxHash, SessionError> {
        self.handle.send(f::PURCHASE_BLOG, &[Token::Uint(blog_id)]).await
    }

    pub async fn view_blog(&self, blog_id: u128) -> Result<TxHash, SessionError> {
        self.handle.send(f::VIEW_BLOG, &[Token::Uint(blog_id)]).await
    }

    pub async fn add_comment(&self, blog_id: u128, content: &str) -> Result<TxHash, SessionError> {
        if content.trim().is_empty() {
            return Err(SessionError::InvalidArgument("comment is empty".into()));
        }
        self.handle.send(f::ADD_COMMENT, &[Token::Uint(blog_id), Token::String(content.into())]).await
    }

    pub async fn create_hide_proposal(&self, blog_id: u128, reason: &str) -> Result<TxHash, SessionError> {
        self.handle.send(f::CREATE_HIDE_PROPOSAL, &[Token::Uint(blog_id), Token::String(reason.into())]).await
    }

    pub async fn vote_on_proposal(&self, proposal_id: u128) -> Result<TxHash, SessionError> {
        self.handle.send(f::VOTE_ON_PROPOSAL, &[Token::Uint(proposal_id)]).await
    }

    pub async fn execute_proposal(&self, proposal_id: u128) -> Result<TxHash, SessionError> {
        self.handle.send(f::EXECUTE_PROPOSAL, &[Token::Uint(proposal_id)]).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<u128, SessionError> {
        let out = self.handle.call(f::BALANCE_OF, &[Token::Address(account)]).await?;
        single(out, f::BALANCE_OF)?.into_uint().ok_or_else(|| SessionError::UnexpectedOutput(f::BALANCE_OF.into()))
    }

    pub async fn has_purchased(&self, account: Address, blog_id: u128) -> Result<bool, SessionError> {
        let out = self.handle.call(f::HAS_PURCHASED, &[Token::Address(account), Token::Uint(blog_id)]).await?;
        single(out, f::HAS_PURCHASED)?.into_bool().ok_or_else(|| SessionError::UnexpectedOutput(f::HAS_PURCHASED.into()))
    }

    pub async fn get_blog_detail(&self, blog_id: u128) -> Result<BlogDetail, SessionError> {
        let out = self.handle.call(f::GET_BLOG_DETAIL, &[Token::Uint(blog_id)]).await?;
        BlogDetail::from_tokens(blog_id, out)
    }

    pub async fn get_user_published_blogs(&self, user: Address) -> Result<Vec<u128>, SessionError> {
        let bad = || SessionError::UnexpectedOutput(f::GET_USER_PUBLISHED_BLOGS.into());
        let out = self.handle.call(f::GET_USER_PUBLISHED_BLOGS, &[Token::Address(user)]).await?;
        single(out, f::GET_USER_PUBLISHED_BLOGS)?
            .into_array()
            .ok_or_else(bad)?
            .into_iter()
            .map(|t| t.into_uint().ok_or_else(bad))
            .collect()
    }
}

fn single(mut out: Vec<Token>, function: &str) -> Result<Token, SessionError> {
    if out.len() != 1 {
        return Err(SessionError::UnexpectedOutput(function.into()));
    }
    out.pop().ok_or_else(|| SessionError::UnexpectedOutput(function.into()))
}
