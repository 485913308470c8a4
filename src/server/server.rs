use crate::application_impl::{
    AccountMemberService, Argon2PasswordHasher, JwtConfig, JwtHs256Codec, SessionAuthService,
};
use crate::application_port::{AuthService, MemberService, TokenCodec};
use crate::domain_port::{MemberRepo, RefreshTokenStore, TokenBlacklist};
use crate::infra_memory::{
    ExpirySweep, MemoryMemberRepo, MemoryRefreshTokenStore, MemoryTokenBlacklist, spawn_sweeper,
};
use crate::infra_mysql::MySqlMemberRepo;
use crate::infra_redis::{RedisRefreshTokenStore, RedisTokenBlacklist};
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const DEV_SIGNING_KEY: &str = "bazaar-dev-signing-key";
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

const REFRESH_KEY_PREFIX: &str = "refresh";
const BLACKLIST_KEY_PREFIX: &str = "blacklist";

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub member_service: Arc<dyn MemberService>,
    pub token_codec: Arc<dyn TokenCodec>,
    pub token_blacklist: Arc<dyn TokenBlacklist>,
    pub local_signup_enabled: bool,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let signing_key = match &settings.auth.signing_key {
            Some(key) => key.clone().into_bytes(),
            None => match std::env::var("JWT_SIGNING_KEY") {
                Ok(key) => key.into_bytes(),
                Err(_) => {
                    warn!("JWT_SIGNING_KEY not set, using the development fallback key");
                    DEV_SIGNING_KEY.as_bytes().to_vec()
                }
            },
        };
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
            signing_key,
        }));

        let cancel = CancellationToken::new();
        let refresh_ttl = Duration::from_secs(settings.auth.refresh_ttl_secs);

        let refresh_store: Arc<dyn RefreshTokenStore>;
        let token_blacklist: Arc<dyn TokenBlacklist>;
        let mut sweeper_handle = None;
        match settings.store.backend.as_str() {
            "memory" => {
                let refresh = Arc::new(MemoryRefreshTokenStore::new(refresh_ttl));
                let blacklist = Arc::new(MemoryTokenBlacklist::new());
                sweeper_handle = Some(spawn_sweeper(
                    vec![
                        refresh.clone() as Arc<dyn ExpirySweep>,
                        blacklist.clone() as Arc<dyn ExpirySweep>,
                    ],
                    SWEEP_PERIOD,
                    cancel.clone(),
                ));
                refresh_store = refresh;
                token_blacklist = blacklist;
            }
            "redis" => {
                let redis_settings = settings
                    .redis
                    .as_ref()
                    .ok_or_else(|| anyhow!("store backend is redis but [redis] is missing"))?;
                let client = redis::Client::open(redis_settings.url.as_str())?;
                let manager = client.get_connection_manager().await?;
                let op_timeout = Duration::from_millis(redis_settings.op_timeout_ms);
                refresh_store = Arc::new(RedisRefreshTokenStore::new(
                    manager.clone(),
                    REFRESH_KEY_PREFIX,
                    refresh_ttl,
                    op_timeout,
                ));
                token_blacklist = Arc::new(RedisTokenBlacklist::new(
                    manager,
                    BLACKLIST_KEY_PREFIX,
                    op_timeout,
                ));
            }
            other => return Err(anyhow!("unknown store backend: {}", other)),
        }

        let mut pool = None;
        let member_repo: Arc<dyn MemberRepo> = match settings.member.backend.as_str() {
            "memory" => Arc::new(MemoryMemberRepo::new()),
            "mysql" => {
                let mysql_settings = settings
                    .mysql
                    .as_ref()
                    .ok_or_else(|| anyhow!("member backend is mysql but [mysql] is missing"))?;
                let mysql_pool = Pool::<MySql>::connect(&mysql_settings.url).await?;
                pool = Some(mysql_pool.clone());
                Arc::new(MySqlMemberRepo::new(mysql_pool))
            }
            other => return Err(anyhow!("unknown member backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(SessionAuthService::new(
            member_repo.clone(),
            refresh_store,
            token_blacklist.clone(),
            token_codec.clone(),
            Arc::new(Argon2PasswordHasher),
        ));
        let member_service: Arc<dyn MemberService> = Arc::new(AccountMemberService::new(
            member_repo,
            auth_service.clone(),
        ));

        info!(
            store = %settings.store.backend,
            member = %settings.member.backend,
            "server wired"
        );

        Ok(Self {
            auth_service,
            member_service,
            token_codec,
            token_blacklist,
            local_signup_enabled: settings.auth.local_signup,
            sweeper_handle: Mutex::new(sweeper_handle),
            cancel,
            pool,
        })
    }

    /// Assemble a server from pre-built components. Route tests wire the
    /// in-memory stack through this without touching settings.
    pub(crate) fn from_parts(
        auth_service: Arc<dyn AuthService>,
        member_service: Arc<dyn MemberService>,
        token_codec: Arc<dyn TokenCodec>,
        token_blacklist: Arc<dyn TokenBlacklist>,
        local_signup_enabled: bool,
    ) -> Self {
        Self {
            auth_service,
            member_service,
            token_codec,
            token_blacklist,
            local_signup_enabled,
            sweeper_handle: Mutex::new(None),
            cancel: CancellationToken::new(),
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = match self.sweeper_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
