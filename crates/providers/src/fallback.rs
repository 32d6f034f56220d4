//! Canned replies used when the generative endpoint is unreachable or unconfigured.
//!
//! Matching is a plain case-insensitive substring scan over an ordered table:
//! the first category with any matching keyword wins, and the default reply
//! covers everything else.

/// One row of the fallback table. Keywords must be lower-case.
#[derive(Debug, Clone, Copy)]
pub struct FallbackCategory {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

impl FallbackCategory {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

pub const DEFAULT_RESPONSE: &str = "I'm not sure I caught that. I can help with **security**, \
**fees**, **supported assets**, **wallet recovery**, **getting started** and **staking**. \
For anything else, reach the WalletX team from `Settings > Help`.";

pub const WALLETX_CATEGORIES: &[FallbackCategory] = &[
    FallbackCategory {
        name: "security",
        keywords: &[
            "secur", "safe", "hack", "scam", "phishing", "protect", "private key", "2fa",
        ],
        response: "WalletX is **non-custodial**: your private keys are generated and \
encrypted on your device and never leave it. Enable *biometric unlock* and never share \
your recovery phrase. WalletX staff will never ask for it.",
    },
    FallbackCategory {
        name: "fees",
        keywords: &["fee", "cost", "price", "charge", "gas", "how much"],
        response: "WalletX has **no account fees**. Sending crypto only costs the network \
fee, and in-app swaps carry a *0.5%* service fee that is always shown before you confirm.",
    },
    FallbackCategory {
        name: "assets",
        keywords: &[
            "coin", "token", "bitcoin", "btc", "ethereum", "solana", "nft", "network", "chain",
        ],
        response: "WalletX supports **Bitcoin**, **Ethereum** and EVM networks (Polygon, \
Arbitrum, Optimism, BNB Chain), **Solana**, and thousands of tokens and NFTs on those chains.",
    },
    FallbackCategory {
        name: "recovery",
        keywords: &[
            "recover", "seed", "phrase", "backup", "back up", "lost", "forgot", "restore",
        ],
        response: "You can restore any wallet with its **12 or 24 word recovery phrase** \
from `Welcome > Import wallet`. Keep the phrase offline; without it nobody, including \
WalletX, can recover your funds.",
    },
    FallbackCategory {
        name: "getting_started",
        keywords: &[
            "start", "create", "set up", "setup", "download", "install", "sign up", "new wallet",
        ],
        response: "Getting started takes two minutes: **download WalletX**, tap *Create \
wallet*, write down your recovery phrase and confirm it. No email or sign-up required.",
    },
    FallbackCategory {
        name: "staking",
        keywords: &["stake", "staking", "yield", "reward", "apy", "interest"],
        response: "You can stake **ETH**, **SOL**, **ADA** and **DOT** from the *Earn* tab. \
Rewards are paid by the network and the estimated APY is shown before you commit.",
    },
    FallbackCategory {
        name: "support",
        keywords: &["help", "support", "contact", "problem", "issue", "bug", "human", "agent"],
        response: "Our support team is available **24/7**. Open `Settings > Help` in the \
app or email support@walletx.io and we'll get back to you quickly.",
    },
    FallbackCategory {
        name: "greeting",
        keywords: &[
            "hello", "hi ", "hey ", "good morning", "good afternoon", "good evening", "greetings",
        ],
        response: "Hello! Welcome to **WalletX**. How can I help you today?",
    },
];

/// Resolves free text to one of a fixed set of canned replies.
#[derive(Debug, Clone, Copy)]
pub struct FallbackResponder {
    categories: &'static [FallbackCategory],
    default_response: &'static str,
}

impl FallbackResponder {
    pub const fn new(
        categories: &'static [FallbackCategory],
        default_response: &'static str,
    ) -> Self {
        Self {
            categories,
            default_response,
        }
    }

    /// The shipped WalletX table
    pub const fn walletx() -> Self {
        Self::new(WALLETX_CATEGORIES, DEFAULT_RESPONSE)
    }

    pub fn resolve(&self, message: &str) -> &'static str {
        self.matching_category(message)
            .map(|c| c.response)
            .unwrap_or(self.default_response)
    }

    /// First category whose keywords match, in table order
    pub fn matching_category(&self, message: &str) -> Option<&'static FallbackCategory> {
        let lowered = message.to_lowercase();
        self.categories.iter().find(|c| c.matches(&lowered))
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::walletx()
    }
}
