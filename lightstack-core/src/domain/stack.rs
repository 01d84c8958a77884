//! Stack domain types

use serde::{Deserialize, Deserializer, Serialize};

/// Topology requested by a caller
///
/// Has no identity until the provisioning script assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSpec {
    pub phoenixd_domain: String,
    pub lnbits_domain: String,
    #[serde(default)]
    pub use_real_certs: bool,
    #[serde(default)]
    pub use_postgres: bool,
    #[serde(default)]
    pub email: Option<String>,
}

impl StackSpec {
    /// Checks that every field can be written to the script's stdin safely
    ///
    /// Every field becomes one line of the transcript, so embedded line breaks
    /// would shift all following answers.
    pub fn validate(&self) -> Result<(), String> {
        if self.phoenixd_domain.trim().is_empty() {
            return Err("phoenixd_domain cannot be empty".to_string());
        }
        if self.lnbits_domain.trim().is_empty() {
            return Err("lnbits_domain cannot be empty".to_string());
        }

        let fields = [
            ("phoenixd_domain", Some(self.phoenixd_domain.as_str())),
            ("lnbits_domain", Some(self.lnbits_domain.as_str())),
            ("email", self.email.as_deref()),
        ];
        for (name, value) in fields {
            if value.is_some_and(|v| v.contains(['\n', '\r'])) {
                return Err(format!("{} cannot contain line breaks", name));
            }
        }

        Ok(())
    }
}

/// A provisioned stack as reported by the script's `list` operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub phoenixd_domain: String,
    pub lnbits_domain: String,
}

/// The script prints ids either quoted or bare
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s.trim().to_string(),
        RawId::Number(n) => n.to_string(),
    })
}
