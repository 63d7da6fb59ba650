/// Application constants

// Token addresses (Base mainnet)
pub const TOKEN_WETH: &str = "0x4200000000000000000000000000000000000006";
pub const TOKEN_USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const TOKEN_CNGN: &str = "0x46C85152bFe9f96829aA94755D9f915F9B10EF5F";

// Sentinel address used for the native gas asset in swap intents. The
// gateway receives the native amount as transaction value instead.
pub const TOKEN_NATIVE: &str = "0x0000000000000000000000000000000000000000";

// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://aboki-api.onrender.com/api";
pub const API_CONNECT_TIMEOUT_SECS: u64 = 4;
pub const API_REQUEST_TIMEOUT_SECS: u64 = 15;

// Local device store keys (mirrors the browser storage layout)
pub const KEY_AUTH_TOKEN: &str = "authToken";
pub const KEY_TOKEN_EXPIRY: &str = "tokenExpiry";
pub const KEY_WALLET_ADDRESS: &str = "walletAddress";
pub const KEY_CURRENT_ORDER_ID: &str = "currentOrderId";
pub const KEY_ORDER_STATUS: &str = "orderStatus";
pub const KEY_ORDER_TYPE: &str = "orderType";
pub const KEY_ESTIMATED_USDC: &str = "estimatedUSDC";

// Slippage buffers, in basis points. Quotes shown to the user carry the
// tighter buffer; the custom-path submission uses the wider one.
pub const SLIPPAGE_ESTIMATE_BPS: u64 = 30;
pub const SLIPPAGE_SUBMIT_BPS: u64 = 50;
pub const BPS_DENOMINATOR: u64 = 10_000;

// Deal rates are fixed-point integers with two decimal places on-chain.
pub const RATE_SCALE: u32 = 2;

// Settlement polling
pub const SETTLEMENT_POLL_INTERVAL_SECS: u64 = 3;

// Auth token is refreshed this long before its known expiry.
pub const AUTH_REFRESH_LEAD_SECS: i64 = 300;

// Nigerian NUBAN account numbers are exactly ten digits; verification is
// triggered automatically once the entry reaches this length.
pub const NUBAN_ACCOUNT_DIGITS: usize = 10;

// Order history defaults
pub const HISTORY_DEFAULT_PAGE_SIZE: u32 = 20;
pub const HISTORY_MAX_PAGE_SIZE: u32 = 100;
