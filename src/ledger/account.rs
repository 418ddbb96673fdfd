use serde::{Deserialize, Serialize};

/// Represents a money container whose `balance` is kept in step with the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Free-text label such as "CASH" or "CURRENT ACCOUNT".
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    /// Balance before any logged transaction; absent in data written by older versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<f64>,
}

impl Account {
    /// Creates an account whose opening balance equals `balance`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: String::new(),
            number: String::new(),
            balance,
            icon: None,
            holder_name: None,
            opening_balance: Some(balance),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder_name = Some(holder.into());
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub(crate) fn apply_delta(&mut self, delta: f64) {
        self.balance += delta;
    }
}

/// Partial update for [`Account`].
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub number: Option<String>,
    pub icon: Option<Option<String>>,
    pub holder_name: Option<Option<String>>,
    /// Manual balance correction; shifts the opening balance by the same delta.
    pub balance: Option<f64>,
}

impl AccountPatch {
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(kind) = &self.kind {
            account.kind = kind.clone();
        }
        if let Some(number) = &self.number {
            account.number = number.clone();
        }
        if let Some(icon) = &self.icon {
            account.icon = icon.clone();
        }
        if let Some(holder) = &self.holder_name {
            account.holder_name = holder.clone();
        }
        if let Some(balance) = self.balance {
            let delta = balance - account.balance;
            account.balance = balance;
            if let Some(opening) = account.opening_balance.as_mut() {
                *opening += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_balance_edit_moves_opening_balance() {
        let mut account = Account::new("acc_1", "Wallet", 100.0);
        account.apply_delta(-30.0);
        AccountPatch {
            balance: Some(200.0),
            ..AccountPatch::default()
        }
        .apply(&mut account);
        assert_eq!(account.balance, 200.0);
        assert_eq!(account.opening_balance, Some(230.0));
    }

    #[test]
    fn legacy_payload_without_opening_balance_parses() {
        let raw = r#"{"id":"acc_2","name":"Cash","type":"CASH","number":"----","balance":5000}"#;
        let account: Account = serde_json::from_str(raw).unwrap();
        assert_eq!(account.kind, "CASH");
        assert!(account.opening_balance.is_none());
    }
}
