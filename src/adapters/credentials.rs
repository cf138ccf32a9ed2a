//! Database credential bundle: typed model for the credentials secret
//!
//! The secret payload is an untyped key/value byte map on the wire. This
//! module keeps that map at the boundary: `from_data` and `to_data` are
//! the only places that touch raw keys, and both are total functions.

use k8s_openapi::ByteString;
use rand::Rng;
use std::collections::BTreeMap;

/// Secret data key for the login user
pub const USER_KEY: &str = "USER";
/// Secret data key for the login password
pub const PASSWORD_KEY: &str = "PASSWORD";
/// Secret data key for the default database name
pub const DATABASE_KEY: &str = "DATABASE";
/// Secret data key for the administrative password
pub const ROOT_PASSWORD_KEY: &str = "ROOT_PASSWORD";
/// Secret data key for the replication user
pub const REPLICATION_USER_KEY: &str = "REPLICATION_USER";
/// Secret data key for the replication password
pub const REPLICATION_PASSWORD_KEY: &str = "REPLICATION_PASSWORD";
/// Secret data key for the derived connection URL
pub const CONNECT_URL_KEY: &str = "DB_CONNECT_URL";

/// Length of freshly generated credential strings
pub const GENERATED_LEN: usize = 16;

/// Source of random credential strings.
///
/// Injected into [`CredentialBundle::apply_defaults`] so tests can
/// substitute a deterministic source.
pub trait RandomSource: Send + Sync {
    /// Produce a random alphanumeric string of the given length
    fn alphanumeric(&self, len: usize) -> String;
}

/// Production randomness: thread-local OS-seeded CSPRNG over an
/// alphanumeric charset. The charset contains no URL delimiters, so
/// generated values never need escaping in the connection URL.
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn alphanumeric(&self, len: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::rng();
        (0..len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

/// The credential bundle stored in the cluster's credentials secret.
///
/// Six independently-defaultable fields plus one derived connection URL.
/// Constructed per reconciliation pass; never shared across passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    /// Database login user
    pub user: String,
    /// Password for `user`
    pub password: String,
    /// Default schema/database name
    pub database: String,
    /// Administrative password
    pub root_password: String,
    /// Replica-link login user
    pub replica_user: String,
    /// Password for `replica_user`
    pub replica_password: String,
    /// Derived connection URL, recomputed on every defaulting pass
    pub connect_url: String,
}

impl CredentialBundle {
    /// Decode a bundle from raw secret data.
    ///
    /// Tolerant by contract: absent keys decode to empty string, unknown
    /// keys are ignored, and byte values are read as UTF-8 without
    /// failing. The defaulting step fills whatever is left empty.
    pub fn from_data(data: &BTreeMap<String, ByteString>) -> Self {
        let field = |key: &str| {
            data.get(key)
                .map(|v| String::from_utf8_lossy(&v.0).into_owned())
                .unwrap_or_default()
        };

        Self {
            user: field(USER_KEY),
            password: field(PASSWORD_KEY),
            database: field(DATABASE_KEY),
            root_password: field(ROOT_PASSWORD_KEY),
            replica_user: field(REPLICATION_USER_KEY),
            replica_password: field(REPLICATION_PASSWORD_KEY),
            connect_url: String::new(),
        }
    }

    /// Fill empty fields with fresh random values and recompute the
    /// connection URL.
    ///
    /// Non-empty fields are never regenerated, so applying defaults
    /// twice with the same host is byte-identical to applying them once.
    pub fn apply_defaults(&mut self, host: &str, source: &dyn RandomSource) {
        for field in [
            &mut self.user,
            &mut self.password,
            &mut self.database,
            &mut self.root_password,
            &mut self.replica_user,
            &mut self.replica_password,
        ] {
            if field.is_empty() {
                *field = source.alphanumeric(GENERATED_LEN);
            }
        }

        self.connect_url = format!(
            "mysql://{}:{}@{}/{}",
            self.user, self.password, host, self.database
        );
    }

    /// Encode the bundle into secret data. Always emits all seven keys.
    pub fn to_data(&self) -> BTreeMap<String, ByteString> {
        BTreeMap::from([
            (USER_KEY.to_string(), ByteString(self.user.clone().into_bytes())),
            (
                PASSWORD_KEY.to_string(),
                ByteString(self.password.clone().into_bytes()),
            ),
            (
                DATABASE_KEY.to_string(),
                ByteString(self.database.clone().into_bytes()),
            ),
            (
                ROOT_PASSWORD_KEY.to_string(),
                ByteString(self.root_password.clone().into_bytes()),
            ),
            (
                REPLICATION_USER_KEY.to_string(),
                ByteString(self.replica_user.clone().into_bytes()),
            ),
            (
                REPLICATION_PASSWORD_KEY.to_string(),
                ByteString(self.replica_password.clone().into_bytes()),
            ),
            (
                CONNECT_URL_KEY.to_string(),
                ByteString(self.connect_url.clone().into_bytes()),
            ),
        ])
    }
}
