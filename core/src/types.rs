//! Response DTOs for the login-information endpoint.
//!
//! Only `loginAccounts[].accountId` is needed by the client; the other fields
//! are kept optional so that schema additions on the remote side do not
//! break parsing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginInformation {
    #[serde(default)]
    pub login_accounts: Vec<LoginAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginAccount {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// DocuSign sends `"true"` / `"false"` as strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<String>,
}
