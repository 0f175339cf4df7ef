//! Blogchain CLI - deploy and drive the blog contract from a terminal
//!
//! Chain operations go through a JSON-RPC node standing in for the wallet:
//!   blogchain deploy                      → Deploy the compiled artifact from account #0
//!   blogchain accounts                    → {"chainId": 31337, "accounts": [...]}
//!   blogchain call balanceOf '["0x.."]'   → Read-only call, decoded outputs
//!   blogchain send purchaseBlog '[3]'     → Transaction from the connected account
//!   blogchain detail <id>                 → Blog detail with its IPFS content URL
//!
//! Offline helpers:
//!   blogchain ipfs <cid>                  → Gateway URL for a CID
//!   blogchain selectors                   → Contract functions and their selectors
//!   blogchain config                      → Effective configuration
//!
//! Output format:
//!   --json     Output compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context, Result};
use blogchain::abi::{Function, Token};
use blogchain::core::encoding::to_hex_data;
use blogchain::deploy::{Artifact, Deployer, HardhatConfig};
use blogchain::logging::init_logging;
use blogchain::session::{ChainCapability, ContractHandle, Provider, WalletSession};
use blogchain::{Address, BlogContract, ClientConfig, HttpCapability};
use serde_json::{json, Value};
use std::env;
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("blogchain {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("deploy") => cmd_deploy(&opts),
        Some("accounts") => cmd_accounts(&opts),
        Some("call") => cmd_call(&opts),
        Some("send") => cmd_send(&opts),
        Some("detail") => cmd_detail(&opts),
        Some("ipfs") => cmd_ipfs(&opts),
        Some("selectors") => cmd_selectors(&opts),
        Some("config") => cmd_config(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    let render = |value: &Value| {
        if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .unwrap_or_else(|_| value.to_string())
    };

    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)})));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    target: Option<String>,
    data: Option<String>,
    // Connection options
    rpc_url: Option<String>,
    contract: Option<String>,
    from: Option<String>,
    ipfs_gateway: Option<String>,
    // Deploy options
    artifact: Option<String>,
    network: Option<String>,
    hardhat_config: Option<String>,
    poll_ms: Option<u64>,
    attempts: Option<u32>,
    // Output options
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

/// `KEY=value` pairs from a dotenv file. Blank lines, `#` comments and empty
/// values are skipped; an `export ` prefix and surrounding quotes are stripped.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.strip_prefix("export ").unwrap_or(line).split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches(|c| c == '"' || c == '\'')))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Apply a dotenv file without overriding variables already set
fn load_dotenv(path: &Path) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_dotenv(&contents) {
        if env::var(&key).is_err() {
            debug!(key = %key, "Loaded from {}", path.display());
            env::set_var(key, value);
        }
    }
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        load_dotenv(Path::new(".env"));

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--rpc" | "-r" if next.is_some() => {
                    opts.rpc_url = next;
                    i += 1;
                }
                "--contract" | "-c" if next.is_some() => {
                    opts.contract = next;
                    i += 1;
                }
                "--from" | "-f" if next.is_some() => {
                    opts.from = next;
                    i += 1;
                }
                "--ipfs" if next.is_some() => {
                    opts.ipfs_gateway = next;
                    i += 1;
                }
                "--artifact" | "-a" if next.is_some() => {
                    opts.artifact = next;
                    i += 1;
                }
                "--network" | "-n" if next.is_some() => {
                    opts.network = next;
                    i += 1;
                }
                "--hardhat-config" if next.is_some() => {
                    opts.hardhat_config = next;
                    i += 1;
                }
                "--poll-ms" if next.is_some() => {
                    opts.poll_ms = next.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--attempts" if next.is_some() => {
                    opts.attempts = next.and_then(|v| v.parse().ok());
                    i += 1;
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        // Second positional is the function, id or CID
        if !positional.is_empty() {
            opts.target = Some(positional.remove(0));
        }
        // Rest is data (joined)
        if !positional.is_empty() {
            opts.data = Some(positional.join(" "));
        }

        opts
    }
}

fn print_usage() {
    println!(
        r#"blogchain - Wallet session and contract calls for the on-chain blog

USAGE:
    blogchain <command> [target] [data] [options]

COMMANDS:
    deploy                  Deploy the compiled contract artifact
    accounts                List node accounts and chain id
    call <fn> [json-args]   Read-only contract call
    send <fn> [json-args]   State-changing contract call
    detail <id>             Blog detail by id
    ipfs <cid>              Gateway URL for a CID
    selectors               Contract functions and selectors
    config                  Show effective configuration

CONNECTION OPTIONS:
    --rpc, -r <url>         JSON-RPC node (env: BLOGCHAIN_RPC_URL)
    --contract, -c <addr>   Contract address (env: BLOGCHAIN_CONTRACT_ADDRESS)
    --from, -f <addr>       Sender account (default: first node account)
    --ipfs <url>            IPFS gateway (env: BLOGCHAIN_IPFS_GATEWAY)

DEPLOY OPTIONS:
    --artifact, -a <path>   Compiled artifact (env: BLOGCHAIN_ARTIFACT)
    --network, -n <name>    Network from the Hardhat config (default: localhost)
    --hardhat-config <path> Hardhat config as JSON
    --poll-ms <ms>          Receipt polling interval (default: 500)
    --attempts <n>          Receipt polling attempts (default: 120)

OUTPUT OPTIONS:
    --json                  Compact JSON output
    --pretty                Pretty-print JSON

LOGGING:
    RUST_LOG=debug          Log filter
    BLOGCHAIN_LOG_JSON=1    JSON log lines on stderr

EXAMPLES:
    blogchain deploy
    blogchain call getBlogDetail '[1]'
    blogchain send publishBlog '["Hello", "First post", "QmCid", 5]'
    blogchain detail 1 --ipfs https://ipfs.io/ipfs/
"#
    );
}

/// Env config with CLI flags applied on top
fn load_config(opts: &ParsedArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &opts.rpc_url {
        config = config.with_rpc_url(url);
    }
    if let Some(raw) = &opts.contract {
        config = config.with_contract_address(parse_address(raw)?);
    }
    if let Some(gateway) = &opts.ipfs_gateway {
        config = config.with_ipfs_gateway(gateway);
    }
    if let Some(path) = &opts.artifact {
        config = config.with_artifact_path(path);
    }
    Ok(config)
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.parse().with_context(|| format!("Invalid address: {}", raw))
}

/// Run a future on a current-thread runtime, aborting on Ctrl+C
fn run<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    rt.block_on(async {
        tokio::select! {
            result = future => result,
            _ = tokio::signal::ctrl_c() => Err(anyhow!("Interrupted")),
        }
    })
}

fn capability(config: &ClientConfig) -> Result<Rc<dyn ChainCapability>> {
    debug!(url = %config.rpc_url, "Using JSON-RPC node");
    Ok(Rc::new(HttpCapability::new(&config.rpc_url)?))
}

/// Contract handle for the `--from` account, or the connected session account
async fn contract_handle(opts: &ParsedArgs, config: &ClientConfig) -> Result<ContractHandle> {
    let capability = capability(config)?;
    if let Some(raw) = &opts.from {
        let signer = Provider::new(capability).signer_for(parse_address(raw)?);
        return Ok(ContractHandle::new(&config.contract, signer));
    }
    let session = WalletSession::new(Some(capability), config.contract.clone());
    session.connect().await?;
    Ok(session.contract()?)
}

/// JSON args (array or single value) converted against the function inputs
fn parse_args(function: &Function, data: Option<&str>) -> Result<Vec<Token>> {
    let values = match data.map(str::trim).filter(|d| !d.is_empty()) {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw).with_context(|| format!("Invalid JSON args: {}", raw))? {
            Value::Array(items) => items,
            single => vec![single],
        },
    };
    if values.len() != function.inputs.len() {
        bail!("{} expects {} argument(s), got {}", function.signature(), function.inputs.len(), values.len());
    }
    function
        .inputs
        .iter()
        .zip(&values)
        .map(|(param, value)| Token::from_json(value, &param.kind).map_err(Into::into))
        .collect()
}

fn cmd_deploy(opts: &ParsedArgs) -> Result<Value> {
    let mut config = load_config(opts)?;
    let hardhat = match &opts.hardhat_config {
        Some(path) => HardhatConfig::load(&PathBuf::from(path))?,
        None => HardhatConfig::default(),
    };
    let network = opts.network.as_deref().unwrap_or("localhost");
    if opts.rpc_url.is_none() && env::var(blogchain::core::constants::env::RPC_URL).is_err() {
        config = config.with_rpc_url(&hardhat.network(network)?.url);
    }

    let artifact = Artifact::load(&config.artifact_path)
        .with_context(|| format!("Failed to load artifact {}", config.artifact_path.display()))?;
    info!(
        contract = artifact.contract_name.as_deref().unwrap_or("unknown"),
        network,
        solc = %hardhat.solidity.version,
        "Deploying"
    );

    let mut deployer = Deployer::new(Provider::new(capability(&config)?));
    if let Some(raw) = &opts.from {
        deployer = deployer.with_sender(parse_address(raw)?);
    }
    if opts.poll_ms.is_some() || opts.attempts.is_some() {
        deployer = deployer.with_polling(
            Duration::from_millis(opts.poll_ms.unwrap_or(500)),
            opts.attempts.unwrap_or(120),
        );
    }

    let deployment = run(async { Ok(deployer.deploy(&artifact).await?) })?;
    Ok(serde_json::to_value(&deployment)?)
}

fn cmd_accounts(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let provider = Provider::new(capability(&config)?);
    run(async {
        let chain_id = provider.chain_id().await?;
        let accounts = provider.accounts().await?;
        Ok(json!({"chainId": chain_id, "accounts": accounts}))
    })
}

fn cmd_call(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let name = opts.target.as_deref().context("Usage: blogchain call <function> [json-args]")?;
    let function = config.contract.abi.function(name)?;
    let args = parse_args(function, opts.data.as_deref())?;
    run(async {
        let handle = contract_handle(opts, &config).await?;
        let outputs = handle.call(name, &args).await?;
        Ok(json!({
            "function": function.signature(),
            "outputs": outputs.iter().map(Token::to_json).collect::<Vec<_>>(),
        }))
    })
}

fn cmd_send(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let name = opts.target.as_deref().context("Usage: blogchain send <function> [json-args]")?;
    let function = config.contract.abi.function(name)?;
    let args = parse_args(function, opts.data.as_deref())?;
    run(async {
        let handle = contract_handle(opts, &config).await?;
        let tx = handle.send(name, &args).await?;
        info!(tx = %tx, function = %function.signature(), "Transaction sent");
        Ok(json!({"from": handle.signer().address(), "function": function.signature(), "tx": tx}))
    })
}

fn cmd_detail(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let raw = opts.target.as_deref().context("Usage: blogchain detail <id>")?;
    let id: u128 = raw.parse().with_context(|| format!("Invalid blog id: {}", raw))?;
    run(async {
        let blog = BlogContract::new(contract_handle(opts, &config).await?);
        let detail = blog.get_blog_detail(id).await?;
        let mut value = serde_json::to_value(&detail)?;
        value["content_url"] = json!(detail.content_url(&config.ipfs));
        value["route"] = json!(detail.route().path());
        Ok(value)
    })
}

fn cmd_ipfs(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let cid = opts.target.as_deref().unwrap_or("");
    Ok(json!({"cid": cid, "url": config.ipfs.url(cid)}))
}

fn cmd_selectors(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let functions: Vec<Value> = config
        .contract
        .abi
        .functions()
        .iter()
        .map(|f| {
            json!({
                "selector": to_hex_data(&f.selector()),
                "signature": f.signature(),
                "readOnly": f.is_read_only(),
            })
        })
        .collect();
    Ok(json!({"contract": config.contract.address, "functions": functions}))
}

fn cmd_config(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let hardhat = match &opts.hardhat_config {
        Some(path) => HardhatConfig::load(&PathBuf::from(path))?,
        None => HardhatConfig::default(),
    };
    Ok(json!({
        "rpcUrl": config.rpc_url,
        "contract": config.contract.address,
        "ipfsGateway": config.ipfs.base(),
        "artifact": config.artifact_path.display().to_string(),
        "hardhat": serde_json::to_value(&hardhat)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv() {
        let contents = r#"
# local dev node
BLOGCHAIN_RPC_URL="http://127.0.0.1:8545"
export BLOGCHAIN_IPFS_GATEWAY = 'https://ipfs.io/ipfs/'
BLOGCHAIN_ARTIFACT=
=orphan
not a pair
"#;
        assert_eq!(
            parse_dotenv(contents),
            vec![
                ("BLOGCHAIN_RPC_URL".to_string(), "http://127.0.0.1:8545".to_string()),
                ("BLOGCHAIN_IPFS_GATEWAY".to_string(), "https://ipfs.io/ipfs/".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_keeps_existing_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "BLOGCHAIN_DOTENV_SET=from-file\nBLOGCHAIN_DOTENV_NEW=from-file\n").unwrap();
        env::set_var("BLOGCHAIN_DOTENV_SET", "from-env");
        env::remove_var("BLOGCHAIN_DOTENV_NEW");

        load_dotenv(&path);
        assert_eq!(env::var("BLOGCHAIN_DOTENV_SET").unwrap(), "from-env");
        assert_eq!(env::var("BLOGCHAIN_DOTENV_NEW").unwrap(), "from-file");

        load_dotenv(&dir.path().join("missing.env"));
        env::remove_var("BLOGCHAIN_DOTENV_SET");
        env::remove_var("BLOGCHAIN_DOTENV_NEW");
    }
}
