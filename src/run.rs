use alloy_primitives::{Address, U256};
use alloy_provider::DynProvider;
use clap::Parser;
use dotenvy::dotenv;
use permit712::chain::{PermitToken, connect, fetch_chain_id, rpc_client};
use permit712::config::Config;
use permit712::eip712::{Domain, build_domain};
use permit712::permit::{PermitMessage, SignedPermit, recover_permit_signer, sign_permit};
use permit712::telemetry;
use permit712::types::amount::{TokenAmount, format_units};
use permit712::types::timestamp::UnixTimestamp;
use serde_json::json;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{CliArgs, Command};

/// Parses the command line, loads `.env` and the config file, and runs one command.
pub async fn run() -> Result<(), Box<dyn Error>> {
    // Load .env variables
    dotenv().ok();

    let args = CliArgs::parse();
    telemetry::init();

    match args.command {
        Command::Verify { permit } => verify(&permit),
        Command::Domain { check } => {
            let session = Session::open(&args.config).await?;
            domain(&session, check).await
        }
        Command::Nonce { owner } => {
            let session = Session::open(&args.config).await?;
            nonce(&session, owner).await
        }
        Command::Sign {
            spender,
            amount,
            nonce,
            deadline,
            out,
        } => {
            let session = Session::open(&args.config).await?;
            sign(&session, spender, amount, nonce, deadline, out).await
        }
        Command::Submit { permit } => {
            let session = Session::open(&args.config).await?;
            submit(&session, &permit).await
        }
    }
}

/// Everything a command that talks to the chain needs.
struct Session {
    config: Config,
    token: PermitToken<DynProvider>,
    domain: Domain,
}

impl Session {
    async fn open(config_path: &Path) -> Result<Self, Box<dyn Error>> {
        let config = Config::load_from_path(config_path)?;
        let client = rpc_client(config.rpc())?;
        let signer = config.signer().map(|key| key.signer()).transpose()?;
        let provider = connect(client, signer, config.chain_id());
        let chain_id = match config.chain_id() {
            Some(chain_id) => chain_id,
            None => fetch_chain_id(&provider).await?,
        };
        let token = PermitToken::new(config.token().address(), provider)
            .with_receipt_timeout(Duration::from_secs(config.receipt_timeout_secs()));
        let name = match config.token().name() {
            Some(name) => name.to_string(),
            None => token.name().await?,
        };
        let domain = build_domain(name, chain_id, token.address());
        tracing::info!(%domain, "Using token domain");
        Ok(Self {
            config,
            token,
            domain,
        })
    }

    fn signer_address(&self) -> Result<Address, Box<dyn Error>> {
        let key = self
            .config
            .signer()
            .ok_or("No signer configured; set \"signer\" in the config file")?;
        Ok(key.signer()?.address())
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_permit(path: &Path) -> Result<SignedPermit, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read permit file at {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

async fn domain(session: &Session, check: bool) -> Result<(), Box<dyn Error>> {
    let separator = session.domain.separator();
    if check {
        session.token.assert_domain(&session.domain).await?;
    }
    print_json(&json!({
        "domain": session.domain,
        "separator": separator,
        "matches_contract": check.then_some(true),
    }))
}

async fn nonce(session: &Session, owner: Option<Address>) -> Result<(), Box<dyn Error>> {
    let owner = match owner {
        Some(owner) => owner,
        None => session.signer_address()?,
    };
    let nonce = session.token.nonce(owner).await?;
    println!("{nonce}");
    Ok(())
}

async fn sign(
    session: &Session,
    spender: Address,
    amount: TokenAmount,
    nonce: Option<u64>,
    deadline: Option<u64>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let key = session.config.signer().ok_or("No signer configured; cannot sign")?;
    let signer = key.signer()?;
    let owner = signer.address();

    let decimals = match session.config.token().decimals() {
        Some(decimals) => decimals,
        None => session.token.decimals().await?,
    };
    let value = amount.to_units(decimals)?;
    let nonce = match nonce {
        Some(nonce) => U256::from(nonce),
        None => session.token.nonce(owner).await?,
    };
    let deadline = match deadline {
        Some(secs) => UnixTimestamp::from_secs(secs),
        None => UnixTimestamp::now() + session.config.permit_ttl_secs(),
    };

    let message = PermitMessage::new(owner, spender, value, nonce, deadline);
    let signed = sign_permit(&signer, &session.domain, message).await?;
    tracing::info!(
        owner = %owner,
        spender = %spender,
        value = %format_units(value, decimals),
        nonce = %nonce,
        deadline = %deadline,
        "Signed permit"
    );

    match out {
        Some(path) => {
            fs::write(&path, serde_json::to_string_pretty(&signed)?)
                .map_err(|e| format!("Failed to write permit file at {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "Permit written");
            Ok(())
        }
        None => print_json(&signed),
    }
}

fn verify(path: &Path) -> Result<(), Box<dyn Error>> {
    let signed = read_permit(path)?;
    let recovered = recover_permit_signer(&signed.domain, &signed.message, &signed.signature)?;
    let owner: Address = signed.message.owner.into();
    let expired = signed.message.deadline.is_past(UnixTimestamp::now());
    print_json(&json!({
        "domain": signed.domain,
        "separator": signed.domain.separator(),
        "owner": signed.message.owner,
        "recovered": recovered.to_checksum(None),
        "signed_by_owner": recovered == owner,
        "expired": expired,
    }))?;
    if recovered != owner {
        return Err(format!("Permit was signed by {recovered}, not by owner {owner}").into());
    }
    Ok(())
}

async fn submit(session: &Session, path: &Path) -> Result<(), Box<dyn Error>> {
    let signed = read_permit(path)?;
    if !signed.is_signed_by_owner()? {
        return Err("Permit signature does not recover to its owner".into());
    }
    if signed.message.deadline.is_past(UnixTimestamp::now()) {
        return Err(format!("Permit expired at {}", signed.message.deadline).into());
    }
    session.token.assert_domain(&signed.domain).await?;

    let owner: Address = signed.message.owner.into();
    let spender: Address = signed.message.spender.into();
    let current_nonce = session.token.nonce(owner).await?;
    if current_nonce != signed.message.nonce {
        return Err(format!(
            "Permit nonce {} does not match the owner's current nonce {current_nonce}",
            signed.message.nonce
        )
        .into());
    }

    session.token.simulate_permit(&signed).await?;
    let tx = session.token.submit_permit(&signed).await?;
    let allowance = session.token.allowance(owner, spender).await?;
    print_json(&json!({
        "transaction": tx,
        "owner": signed.message.owner,
        "spender": signed.message.spender,
        "allowance": allowance.to_string(),
    }))
}
