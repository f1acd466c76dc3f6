use crate::prep::client::TokenUsage;

/// Per-million-token prices, in micro-USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub input_micro_usd_per_million: u64,
    pub output_micro_usd_per_million: u64,
}

impl Pricing {
    #[must_use]
    pub fn new(input_micro_usd_per_million: u64, output_micro_usd_per_million: u64) -> Self {
        Self {
            input_micro_usd_per_million,
            output_micro_usd_per_million,
        }
    }

    /// Gemini Flash list price: $0.30 in, $2.50 out.
    #[must_use]
    pub fn gemini_flash() -> Self {
        Self::new(300_000, 2_500_000)
    }

    #[must_use]
    pub fn cost_micro_usd(&self, usage: TokenUsage) -> u64 {
        estimate_cost_micro_usd(
            self.input_micro_usd_per_million,
            self.output_micro_usd_per_million,
            usage.prompt_tokens,
            usage.completion_tokens,
        )
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::gemini_flash()
    }
}

fn estimate_cost_micro_usd(
    input_micro_usd_per_million: u64,
    output_micro_usd_per_million: u64,
    prompt_tokens: u32,
    completion_tokens: u32,
) -> u64 {
    let prompt_cost = u64::from(prompt_tokens)
        .saturating_mul(input_micro_usd_per_million)
        / 1_000_000;
    let completion_cost = u64::from(completion_tokens)
        .saturating_mul(output_micro_usd_per_million)
        / 1_000_000;
    prompt_cost.saturating_add(completion_cost)
}

/// Convert dollars to micro-USD, clamping negatives to zero.
#[must_use]
pub fn usd_to_micro(usd: f64) -> u64 {
    if usd.is_sign_negative() || !usd.is_finite() {
        return 0;
    }
    (usd * 1_000_000.0).round() as u64
}

#[must_use]
pub fn micro_to_usd(micro: u64) -> f64 {
    micro as f64 / 1_000_000.0
}
