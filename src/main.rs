use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aboki_engine::api::{AbokiApi, HttpApi};
use aboki_engine::config::Config;
use aboki_engine::models::{HistoryQuery, SwapIntent};
use aboki_engine::onchain::{evm::EvmGateway, GatewayChain};
use aboki_engine::services::{
    shared_store, Confirmation, OrderHistoryService, SessionManager, SwapOrchestrator,
};
use aboki_engine::storage::LocalStore;
use aboki_engine::tokens::{find_currency, find_token, stable_token};
use aboki_engine::utils::{from_base_units, parse_amount};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aboki_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Aboki swap engine");
    tracing::info!("Environment: {}", config.environment);
    if config.is_testnet() {
        tracing::info!("Running against a test network (chain id {})", config.chain_id);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("swap") => run_swap(&config, &args[1..]).await,
        Some("rate") => run_rate(&config, &args[1..]).await,
        Some("banks") => run_banks(&config).await,
        Some("verify") => run_verify(&config, &args[1..]).await,
        Some("history") => run_history(&config).await,
        _ => {
            eprintln!("Usage:");
            eprintln!("  aboki-engine swap <TOKEN> <AMOUNT> <CURRENCY> [BANK_CODE ACCOUNT_NUMBER]");
            eprintln!("  aboki-engine rate <TOKEN> <CURRENCY>");
            eprintln!("  aboki-engine banks");
            eprintln!("  aboki-engine verify <BANK_CODE> <ACCOUNT_NUMBER>");
            eprintln!("  aboki-engine history");
            Ok(())
        }
    }
}

fn api_client(config: &Config) -> anyhow::Result<Arc<HttpApi>> {
    Ok(Arc::new(HttpApi::new(&config.api_base_url)?))
}

/// Full off-ramp flow: authenticate, estimate, gate on a bank destination,
/// then submit and poll the settlement to a terminal state.
async fn run_swap(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let [token_arg, amount_arg, currency_arg, rest @ ..] = args else {
        anyhow::bail!("usage: swap <TOKEN> <AMOUNT> <CURRENCY> [BANK_CODE ACCOUNT_NUMBER]");
    };

    let token = find_token(token_arg)?;
    let amount = parse_amount(amount_arg)?;
    let currency = find_currency(currency_arg)?;

    let api = api_client(config)?;
    let chain = Arc::new(EvmGateway::from_config(config)?);
    let store = shared_store(LocalStore::open(&config.storage_path)?);

    let wallet_address = format!("{:?}", chain.sender());
    let mut session = SessionManager::new(api.clone(), store.clone());
    if !session.restore().await? {
        session.login(&wallet_address).await?;
        tracing::info!("Authenticated as {}", wallet_address);
    }

    let mut orchestrator = SwapOrchestrator::new(
        chain,
        api.clone(),
        Duration::from_secs(config.poll_interval_secs),
    );

    let quoted_rate = api.conversion_rate(token.symbol, currency.code).await?;
    let intent = SwapIntent {
        source_token: token,
        source_amount: amount,
        fiat_currency: currency.code.to_string(),
        quoted_rate,
        bank_destination: None,
    };

    let estimate = orchestrator.quote(&intent).await?;
    let estimated_usdc = from_base_units(estimate.min_amount_out, stable_token().decimals)?;
    println!(
        "Estimated output: {} USDC minimum ({} {} at {} {}/USDC)",
        estimated_usdc, amount, token.symbol, quoted_rate, currency.code
    );

    if orchestrator.confirm(intent, estimate).await? == Confirmation::VerificationRequired {
        let [bank_code, account_number] = rest else {
            anyhow::bail!(
                "No verified bank destination on file; re-run with BANK_CODE and ACCOUNT_NUMBER \
                 (see `banks` for codes)"
            );
        };
        let institutions = orchestrator.institutions().await?;
        let institution = institutions
            .iter()
            .find(|i| i.code == *bank_code)
            .ok_or_else(|| anyhow::anyhow!("Unknown bank code {}", bank_code))?;
        let destination = orchestrator
            .complete_verification(institution, account_number)
            .await?;
        println!(
            "Verified {} / {} ({})",
            destination.bank_name, destination.account_number, destination.account_name
        );
    }

    let outcome = match orchestrator.execute().await {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.is_user_retryable() {
                tracing::info!("Swap halted; adjust the inputs and run the command again");
            }
            return Err(e.into());
        }
    };

    let history = OrderHistoryService::new(api, store);
    history.remember_current(&outcome.order_id, "COMPLETED", "offramp");
    history.remember_estimate(&estimated_usdc.to_string());

    println!("Swap transaction: {:?}", outcome.transaction_hash);
    println!("Order {} settled ({})", outcome.order_id, outcome.settlement_reference);
    Ok(())
}

async fn run_rate(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let [token_arg, currency_arg] = args else {
        anyhow::bail!("usage: rate <TOKEN> <CURRENCY>");
    };
    let token = find_token(token_arg)?;
    let currency = find_currency(currency_arg)?;

    let api = api_client(config)?;
    let rate = api.conversion_rate(token.symbol, currency.code).await?;
    println!("1 USDC = {} {} (for {} off-ramp)", rate, currency.code, token.symbol);
    Ok(())
}

async fn run_banks(config: &Config) -> anyhow::Result<()> {
    let api = api_client(config)?;
    let institutions = api.list_institutions().await?;
    for institution in institutions {
        println!("{}  {} ({})", institution.code, institution.name, institution.country);
    }
    Ok(())
}

async fn run_verify(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let [bank_code, account_number] = args else {
        anyhow::bail!("usage: verify <BANK_CODE> <ACCOUNT_NUMBER>");
    };
    let api = api_client(config)?;
    let verified = api.verify_account(bank_code, account_number).await?;
    println!("{} ({} / {})", verified.account_name, verified.bank_code, verified.account_number);
    Ok(())
}

async fn run_history(config: &Config) -> anyhow::Result<()> {
    let api = api_client(config)?;
    let store = shared_store(LocalStore::open(&config.storage_path)?);
    let history = OrderHistoryService::new(api, store);

    if let Some(last) = history.last_known_order() {
        println!(
            "Last order on this device: {} ({})",
            last.order_id,
            last.status.as_deref().unwrap_or("unknown")
        );
    }

    let page = history.list(&HistoryQuery::default()).await?;
    println!("Orders {}/{} (page {}):", page.items.len(), page.total, page.page);
    for record in page.items {
        println!(
            "  {}  {:<10} {:>12} {}  {}",
            record.order_id,
            record.status,
            record.amount,
            record.token,
            record
                .fiat_amount
                .map(|f| format!("→ {} {}", f, record.fiat_currency.unwrap_or_default()))
                .unwrap_or_default()
        );
    }
    Ok(())
}
