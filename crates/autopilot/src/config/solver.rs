use {
    alloy::primitives::Address,
    core::fmt,
    serde::{Deserialize, Deserializer, Serialize},
    std::fmt::{Display, Formatter},
    url::Url,
};

/// External solver driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Solver {
    pub name: String,
    pub url: Url,
    pub submission_account: Account,
}

impl Solver {
    pub fn new(name: String, url: Url, account: Account) -> Self {
        Self {
            name,
            url,
            submission_account: account,
        }
    }
}

impl Display for Solver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Account {
    /// AWS KMS is used to retrieve the solver public key
    #[serde(deserialize_with = "deserialize_arn")]
    Kms(Arn),
    /// Solver public key
    Address(Address),
}

// Wrapper type for AWS ARN identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Arn(pub String);

fn deserialize_arn<'de, D>(deserializer: D) -> Result<Arn, D::Error>
where
    D: Deserializer<'de>,
{
    let raw_arn = String::deserialize(deserializer)?;
    if raw_arn.starts_with("arn:aws:kms:") {
        Ok(Arn(raw_arn))
    } else {
        Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(raw_arn.as_str()),
            &"expected value starting with \"arn:aws:kms\"",
        ))
    }
}
