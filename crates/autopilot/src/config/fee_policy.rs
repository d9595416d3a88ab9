use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    shared::fee_factor::FeeFactor,
};

pub const fn default_max_partner_fee() -> FeeFactor {
    FeeFactor::new(0.01)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeePoliciesConfig {
    /// Describes how the protocol fees should be calculated.
    #[serde(default)]
    pub policies: Vec<FeePolicy>,

    /// Maximum partner fee allowed. If the partner fee specified is greater
    /// than this maximum, the partner fee will be capped.
    #[serde(default = "default_max_partner_fee")]
    pub max_partner_fee: FeeFactor,

    /// Fee policies that will become effective at a future timestamp.
    #[serde(default)]
    pub upcoming_policies: UpcomingFeePolicies,
}

impl Default for FeePoliciesConfig {
    fn default() -> Self {
        Self {
            policies: Default::default(),
            max_partner_fee: default_max_partner_fee(),
            upcoming_policies: Default::default(),
        }
    }
}

/// A fee policy to be used for orders based on its class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeePolicy {
    pub kind: FeePolicyKind,
    pub order_class: FeePolicyOrderClass,
}

/// Fee policies that will become effective at a future timestamp.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpcomingFeePolicies {
    #[serde(default)]
    pub policies: Vec<FeePolicy>,

    /// Timestamp from which the `policies` will become active.
    pub effective_from_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeePolicyKind {
    /// How much of the order's surplus should be taken as a protocol fee.
    #[serde(rename_all = "kebab-case")]
    Surplus {
        factor: FeeFactor,
        max_volume_factor: FeeFactor,
    },
    /// How much of the order's price improvement should be taken as a protocol
    /// fee where price improvement is a difference between the executed price
    /// and the best quote.
    #[serde(rename_all = "kebab-case")]
    PriceImprovement {
        factor: FeeFactor,
        max_volume_factor: FeeFactor,
    },
    /// How much of the order's volume should be taken as a protocol fee.
    Volume { factor: FeeFactor },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeePolicyOrderClass {
    /// If a fee policy needs to be applied to in-market orders.
    Market,
    /// If a fee policy needs to be applied to limit orders.
    Limit,
    /// If a fee policy needs to be applied regardless of the order class.
    Any,
}
