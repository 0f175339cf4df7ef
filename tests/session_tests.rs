//! Wallet session lifecycle
//!
//! 1. Absent capability: connect fails, silent reconnect degrades to "no session"
//! 2. Silent reconnect with pre-authorized accounts binds without prompting
//! 3. Query failures are absorbed and only visible in the log
//! 4. Contract access is guarded until a session exists
//! 5. Overlapping connects: last to resolve wins, never a torn session

mod support;

use blogchain::session::{CapabilityError, ChainCapability, SessionError, SessionState, WalletSession};
use blogchain::{Address, ContractConfig};
use futures::channel::oneshot;
use futures::executor::block_on;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use support::{addr, yield_once, MockWallet};
use tracing_subscriber::fmt::MakeWriter;

fn session_with(wallet: &Rc<MockWallet>) -> WalletSession {
    let capability: Rc<dyn ChainCapability> = wallet.clone();
    WalletSession::new(Some(capability), ContractConfig::blog().expect("blog contract"))
}

fn session_without_capability() -> WalletSession {
    WalletSession::new(None, ContractConfig::blog().expect("blog contract"))
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(|p| p.into_inner())).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;
    fn make_writer(&'a self) -> Self::Writer { self.clone() }
}

#[test]
fn no_capability_connect_fails_silent_returns_none() {
    let session = session_without_capability();
    assert!(!session.has_capability());

    let err = block_on(session.connect()).unwrap_err();
    assert!(matches!(err, SessionError::CapabilityUnavailable));

    assert_eq!(block_on(session.silent_reconnect()), None);
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(matches!(session.contract(), Err(SessionError::NoActiveSession)));
}

#[test]
fn contract_before_connect_is_no_active_session() {
    let wallet = MockWallet::new().with_approved(vec![addr(1)]).shared();
    let session = session_with(&wallet);
    assert!(matches!(session.contract(), Err(SessionError::NoActiveSession)));
    assert_eq!(session.account(), None);
    // Accessor never touches the capability
    assert!(wallet.requests.borrow().is_empty());
}

#[test]
fn silent_reconnect_with_one_authorized_account() {
    let account: Address = "0xabcabcabcabcabcabcabcabcabcabcabcabcabca".parse().unwrap();
    let wallet = MockWallet::new().with_authorized(Ok(vec![account])).shared();
    let session = session_with(&wallet);

    assert_eq!(block_on(session.silent_reconnect()), Some(account));
    assert_eq!(session.state(), SessionState::Connected { account });

    let contract = session.contract().expect("contract after reconnect");
    assert_eq!(contract.address(), session.contract_config().address);
    assert_eq!(contract.signer().address(), account);

    // No prompt on the silent path
    assert_eq!(wallet.count("eth_requestAccounts"), 0);
    assert_eq!(wallet.count("eth_accounts"), 1);
}

#[test]
fn silent_reconnect_picks_first_of_many() {
    let wallet = MockWallet::new().with_authorized(Ok(vec![addr(7), addr(8)])).shared();
    let session = session_with(&wallet);
    assert_eq!(block_on(session.silent_reconnect()), Some(addr(7)));
}

#[test]
fn silent_reconnect_with_zero_authorized_accounts() {
    let wallet = MockWallet::new().with_authorized(Ok(vec![])).shared();
    let session = session_with(&wallet);

    assert_eq!(block_on(session.silent_reconnect()), None);
    assert!(matches!(session.contract(), Err(SessionError::NoActiveSession)));
}

#[test]
fn silent_reconnect_query_failure_is_logged_not_raised() {
    let wallet = MockWallet::new()
        .with_authorized(Err(CapabilityError::Transport("wallet locked up".into())))
        .shared();
    let session = session_with(&wallet);

    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || block_on(session.silent_reconnect()));

    assert_eq!(result, None);
    assert_eq!(session.state(), SessionState::Uninitialized);
    let logs = capture.text();
    assert!(logs.contains("Silent reconnect failed"), "logs: {logs}");
    assert!(logs.contains("wallet locked up"), "logs: {logs}");
}

#[test]
fn connect_binds_provider_signer_contract_together() {
    let wallet = MockWallet::new().with_approved(vec![addr(1), addr(2)]).shared();
    let session = session_with(&wallet);

    let connection = block_on(session.connect()).expect("connect");
    assert_eq!(connection.signer.address(), addr(1));
    assert_eq!(connection.contract.signer().address(), addr(1));
    assert_eq!(connection.contract.address(), session.contract_config().address);
    assert_eq!(session.contract().unwrap().address(), connection.contract.address());
    assert_eq!(block_on(connection.provider.chain_id()).unwrap(), 31337);
}

#[test]
fn connect_always_requests_again() {
    let wallet = MockWallet::new().with_approved(vec![addr(1)]).shared();
    let session = session_with(&wallet);

    block_on(session.connect()).expect("first");
    *wallet.approved.borrow_mut() = Ok(vec![addr(2)]);
    block_on(session.connect()).expect("second");

    assert_eq!(wallet.count("eth_requestAccounts"), 2);
    assert_eq!(session.account(), Some(addr(2)));
    assert_eq!(session.contract().unwrap().signer().address(), addr(2));
}

#[test]
fn failed_connect_keeps_existing_session() {
    let wallet = MockWallet::new().with_approved(vec![addr(1)]).shared();
    let session = session_with(&wallet);
    block_on(session.connect()).expect("connect");

    *wallet.approved.borrow_mut() = Err(CapabilityError::from_rpc(4001, "User rejected the request."));
    let err = block_on(session.connect()).unwrap_err();
    assert!(matches!(err, SessionError::Capability(CapabilityError::Rejected)));
    assert_eq!(session.account(), Some(addr(1)));

    *wallet.approved.borrow_mut() = Ok(vec![]);
    assert!(matches!(block_on(session.connect()), Err(SessionError::NoAccounts)));
    assert_eq!(session.account(), Some(addr(1)));
}

#[test]
fn failed_silent_probe_keeps_existing_session() {
    let wallet = MockWallet::new().with_approved(vec![addr(3)]).shared();
    let session = session_with(&wallet);
    block_on(session.connect()).expect("connect");

    *wallet.authorized.borrow_mut() = Err(CapabilityError::Transport("down".into()));
    assert_eq!(block_on(session.silent_reconnect()), None);
    assert_eq!(session.account(), Some(addr(3)));
    assert!(session.contract().is_ok());
}

fn race(resolve_first_call_last: bool) -> Address {
    let wallet = MockWallet::new().shared();
    let (tx_a, rx_a) = oneshot::channel();
    let (tx_b, rx_b) = oneshot::channel();
    wallet.gated.borrow_mut().extend([rx_a, rx_b]);
    let session = session_with(&wallet);

    let driver = async move {
        if resolve_first_call_last {
            tx_b.send(vec![addr(0xbb)]).unwrap();
            yield_once().await;
            tx_a.send(vec![addr(0xaa)]).unwrap();
        } else {
            tx_a.send(vec![addr(0xaa)]).unwrap();
            yield_once().await;
            tx_b.send(vec![addr(0xbb)]).unwrap();
        }
    };
    let (a, b, ()) = block_on(async { futures::join!(session.connect(), session.connect(), driver) });
    assert_eq!(a.unwrap().signer.address(), addr(0xaa));
    assert_eq!(b.unwrap().signer.address(), addr(0xbb));

    let contract = session.contract().unwrap();
    let account = session.account().unwrap();
    // Never a signer from one connect with a contract from the other
    assert_eq!(contract.signer().address(), account);
    account
}

#[test]
fn concurrent_connects_last_to_resolve_wins() {
    assert_eq!(race(false), addr(0xbb));
    assert_eq!(race(true), addr(0xaa));
}
