//! Unified error handling for the services layer.
//!
//! Every failure a service command can report maps onto [`ServiceError`],
//! which knows its metric/log label and the NOTICE lines shown to the user.

use crate::db::DbError;
use crate::services::ServiceEffect;
use thiserror::Error;

// ============================================================================
// Service Errors (command processing)
// ============================================================================

/// Errors that can occur while processing a service command.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("insufficient parameters for {command}")]
    MissingParameter {
        command: &'static str,
        usage: &'static str,
    },

    #[error("invalid parameters for {command}")]
    InvalidParameter {
        command: &'static str,
        syntax: &'static str,
    },

    #[error("not logged in")]
    NotAuthenticated,

    #[error("account not verified")]
    NotVerified,

    /// `founders` is `None` when ownership must not be disclosed.
    #[error("channel already registered: {channel}")]
    AlreadyExists {
        channel: String,
        founders: Option<String>,
    },

    #[error("missing privilege: {0}")]
    NoPrivilege(&'static str),

    #[error("unable to create channel: {0}")]
    InternalError(String),

    /// A policy hook vetoed the operation. The hook owns the user-facing
    /// messaging, so only its own effects are delivered.
    #[error("denied by policy hook {hook}")]
    PolicyDenied {
        hook: &'static str,
        effects: Vec<ServiceEffect>,
    },

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl ServiceError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::NotAuthenticated => "not_authenticated",
            Self::NotVerified => "not_verified",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NoPrivilege(_) => "no_privilege",
            Self::InternalError(_) => "internal_error",
            Self::PolicyDenied { .. } => "policy_denied",
            Self::Database(_) => "database_error",
        }
    }

    /// Protocol-level fault class, as reported to services clients.
    pub fn fault(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "needmoreparams",
            Self::InvalidParameter { .. } => "badparams",
            Self::NotAuthenticated | Self::NoPrivilege(_) | Self::PolicyDenied { .. } => {
                "noprivs"
            }
            Self::NotVerified => "notverified",
            Self::AlreadyExists { .. } => "alreadyexists",
            Self::InternalError(_) | Self::Database(_) => "internalerror",
        }
    }

    /// NOTICE lines to send to the user for this error.
    ///
    /// Returns an empty list for [`ServiceError::PolicyDenied`].
    pub fn notices(&self) -> Vec<String> {
        match self {
            Self::MissingParameter { command, usage } => vec![
                format!("Insufficient parameters for \x02{}\x02.", command),
                usage.to_string(),
            ],
            Self::InvalidParameter { command, syntax } => vec![
                format!("Invalid parameters for \x02{}\x02.", command),
                syntax.to_string(),
            ],
            Self::NotAuthenticated => vec!["You are not logged in.".to_string()],
            Self::NotVerified => vec![
                "You must verify your e-mail address before you may perform this operation."
                    .to_string(),
            ],
            Self::AlreadyExists {
                channel,
                founders: Some(founders),
            } => vec![format!(
                "\x02{}\x02 is already registered to \x02{}\x02.",
                channel, founders
            )],
            Self::AlreadyExists {
                channel,
                founders: None,
            } => vec![format!("\x02{}\x02 is already registered.", channel)],
            Self::NoPrivilege(privilege) => vec![format!(
                "You do not have the \x02{}\x02 privilege.",
                privilege
            )],
            Self::InternalError(channel) => {
                vec![format!("Unable to create channel \x02{}\x02.", channel)]
            }
            Self::PolicyDenied { .. } => Vec::new(),
            Self::Database(_) => vec!["Registration failed. Please try again later.".to_string()],
        }
    }
}

/// Result type for fallible service command steps.
pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// Channel Errors (network state operations)
// ============================================================================

/// Live channel operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("invalid channel name: {0}")]
    InvalidName(String),

    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("no such user: {0}")]
    NoSuchUser(String),

    #[error("user {0} is not on that channel")]
    UserNotInChannel(String),
}
