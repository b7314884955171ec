// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{delete_impl, insert_impl, list_all_impl, secondary_find_impl, update_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::utils::validate_email;
use crate::raise_error;
use crate::utc_now;
use crate::{decrypt, encrypt};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// How the worker authenticates against the tenant's inbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum AuthMethod {
    /// Plain IMAP login with an app password
    #[default]
    Password,
    /// Gmail REST API with OAuth2 refresh tokens
    OAuth2,
}

/// Per-tenant inbox polling configuration. At most one per company.
///
/// All credential fields are stored encrypted; `imap_password`,
/// `access_token` and `refresh_token` never hold plaintext once persisted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct MailboxConfig {
    #[primary_key]
    pub id: u64,
    /// Company (tenant) this mailbox belongs to
    #[secondary_key(unique)]
    pub company_id: u64,
    pub auth_method: AuthMethod,
    /// IMAP server hostname, e.g. "imap.gmail.com"
    pub imap_host: String,
    /// IMAP TLS port, usually 993
    pub imap_port: u16,
    /// Inbox login, an email address
    pub imap_username: String,
    /// Encrypted IMAP password (Password auth)
    pub imap_password: Option<String>,
    /// Encrypted OAuth2 access token (OAuth2 auth)
    pub access_token: Option<String>,
    /// Encrypted OAuth2 refresh token (OAuth2 auth)
    pub refresh_token: Option<String>,
    /// Access token expiry (epoch milliseconds)
    pub token_expiry: Option<i64>,
    /// Folder to poll, defaults to "INBOX"
    pub inbox_folder: String,
    /// Seconds between poll cycles, defaults to 300
    pub poll_interval_secs: u64,
    pub enabled: bool,
    /// When the worker last completed a poll cycle (epoch milliseconds)
    pub last_sync_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation payload; secrets arrive in plaintext and are encrypted before
/// the entity is stored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Object)]
pub struct MailboxConfigCreateRequest {
    pub company_id: u64,
    pub auth_method: AuthMethod,
    pub imap_host: String,
    pub imap_port: Option<u16>,
    pub imap_username: String,
    pub imap_password: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<i64>,
    pub inbox_folder: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub enabled: Option<bool>,
}

impl MailboxConfig {
    pub fn create(request: MailboxConfigCreateRequest) -> LeadGateResult<Self> {
        validate_email(&request.imap_username)?;
        match request.auth_method {
            AuthMethod::Password => {
                if request.imap_password.as_deref().unwrap_or_default().is_empty() {
                    return Err(raise_error!(
                        "Password auth requires 'imap_password'".into(),
                        ErrorCode::MissingConfiguration
                    ));
                }
            }
            AuthMethod::OAuth2 => {
                if request.refresh_token.as_deref().unwrap_or_default().is_empty() {
                    return Err(raise_error!(
                        "OAuth2 auth requires 'refresh_token'".into(),
                        ErrorCode::MissingRefreshToken
                    ));
                }
            }
        }
        let now = utc_now!();
        Ok(Self {
            id: id!(),
            company_id: request.company_id,
            auth_method: request.auth_method,
            imap_host: request.imap_host,
            imap_port: request.imap_port.unwrap_or(993),
            imap_username: request.imap_username,
            imap_password: request
                .imap_password
                .as_deref()
                .map(|p| encrypt!(p))
                .transpose()?,
            access_token: request
                .access_token
                .as_deref()
                .map(|t| encrypt!(t))
                .transpose()?,
            refresh_token: request
                .refresh_token
                .as_deref()
                .map(|t| encrypt!(t))
                .transpose()?,
            token_expiry: request.token_expiry,
            inbox_folder: request
                .inbox_folder
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| "INBOX".into()),
            poll_interval_secs: request
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            enabled: request.enabled.unwrap_or(true),
            last_sync_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn decrypted_password(&self) -> LeadGateResult<String> {
        let encrypted = self.imap_password.as_deref().ok_or_else(|| {
            raise_error!(
                format!(
                    "Mailbox for company {} has no stored password",
                    self.company_id
                ),
                ErrorCode::MissingConfiguration
            )
        })?;
        decrypt!(encrypted)
    }

    pub fn decrypted_access_token(&self) -> LeadGateResult<Option<String>> {
        self.access_token.as_deref().map(|t| decrypt!(t)).transpose()
    }

    pub fn decrypted_refresh_token(&self) -> LeadGateResult<String> {
        let encrypted = self.refresh_token.as_deref().ok_or_else(|| {
            raise_error!(
                format!(
                    "Mailbox for company {} has no stored refresh token",
                    self.company_id
                ),
                ErrorCode::MissingRefreshToken
            )
        })?;
        decrypt!(encrypted)
    }

    pub async fn find_by_company(company_id: u64) -> LeadGateResult<Option<MailboxConfig>> {
        secondary_find_impl::<MailboxConfig>(
            DB_MANAGER.meta_db(),
            MailboxConfigKey::company_id,
            company_id,
        )
        .await
    }

    pub async fn list_enabled() -> LeadGateResult<Vec<MailboxConfig>> {
        let all = list_all_impl::<MailboxConfig>(DB_MANAGER.meta_db()).await?;
        Ok(all.into_iter().filter(|c| c.enabled).collect())
    }

    pub async fn save(&self) -> LeadGateResult<()> {
        if Self::find_by_company(self.company_id).await?.is_some() {
            return Err(raise_error!(
                format!(
                    "A mailbox configuration for company {} already exists",
                    self.company_id
                ),
                ErrorCode::AlreadyExists
            ));
        }
        insert_impl(DB_MANAGER.meta_db(), self.to_owned()).await
    }

    /// Stores freshly refreshed OAuth2 tokens, re-encrypted.
    pub async fn update_tokens(
        company_id: u64,
        access_token: &str,
        refresh_token: Option<&str>,
        token_expiry: Option<i64>,
    ) -> LeadGateResult<()> {
        let access_token = encrypt!(access_token)?;
        let refresh_token = refresh_token.map(|t| encrypt!(t)).transpose()?;
        Self::modify(company_id, move |current| {
            let mut updated = current.clone();
            updated.access_token = Some(access_token);
            if let Some(token) = refresh_token {
                updated.refresh_token = Some(token);
            }
            updated.token_expiry = token_expiry;
            updated.updated_at = utc_now!();
            Ok(updated)
        })
        .await
    }

    /// Records a successful poll cycle.
    pub async fn mark_synced(company_id: u64) -> LeadGateResult<()> {
        Self::modify(company_id, move |current| {
            let mut updated = current.clone();
            updated.last_sync_at = Some(utc_now!());
            updated.updated_at = utc_now!();
            Ok(updated)
        })
        .await
    }

    pub async fn set_enabled(company_id: u64, enabled: bool) -> LeadGateResult<()> {
        Self::modify(company_id, move |current| {
            let mut updated = current.clone();
            updated.enabled = enabled;
            updated.updated_at = utc_now!();
            Ok(updated)
        })
        .await
    }

    pub async fn delete(company_id: u64) -> LeadGateResult<()> {
        delete_impl::<MailboxConfig>(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<MailboxConfig>(MailboxConfigKey::company_id, company_id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("No mailbox configuration for company {company_id}"),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }

    async fn modify(
        company_id: u64,
        updated: impl FnOnce(&MailboxConfig) -> LeadGateResult<MailboxConfig> + Send + 'static,
    ) -> LeadGateResult<()> {
        update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                rw.get()
                    .secondary::<MailboxConfig>(MailboxConfigKey::company_id, company_id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("No mailbox configuration for company {company_id}"),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            updated,
        )
        .await?;
        Ok(())
    }
}
