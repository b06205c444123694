// src/blockchain/services/search.rs

/// What a free-text search resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 20-byte address, casing exactly as typed.
    Account(String),
    /// 32-byte transaction hash.
    Transaction(String),
    /// Decimal block height, digits exactly as typed.
    Block(String),
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Account(_) => "account",
            Target::Transaction(_) => "transaction",
            Target::Block(_) => "block",
        }
    }

    /// The query text that matched, trimmed.
    pub fn value(&self) -> &str {
        match self {
            Target::Account(v) | Target::Transaction(v) | Target::Block(v) => v,
        }
    }

    /// Route of the detail view for this target.
    pub fn route(&self) -> String {
        match self {
            Target::Account(address) => format!("/account/{}", address),
            Target::Transaction(hash) => format!("/transaction/{}", hash),
            Target::Block(number) => format!("/block/{}", number),
        }
    }

    /// Block height when the target is a block that fits in a `u64`.
    pub fn height(&self) -> Option<u64> {
        match self {
            Target::Block(digits) => digits.parse().ok(),
            _ => None,
        }
    }
}

fn is_prefixed_hex(s: &str, digits: usize) -> bool {
    match s.strip_prefix("0x") {
        Some(body) => body.len() == digits && hex::decode(body).is_ok(),
        None => false,
    }
}

/// Classifies a search query as an address, a transaction hash or a block number.
///
/// Returns `None` for anything else, including an empty or all-whitespace query.
pub fn classify(query: &str) -> Option<Target> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_prefixed_hex(trimmed, 40) {
        return Some(Target::Account(trimmed.to_string()));
    }
    if is_prefixed_hex(trimmed, 64) {
        return Some(Target::Transaction(trimmed.to_string()));
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Target::Block(trimmed.to_string()));
    }
    None
}
