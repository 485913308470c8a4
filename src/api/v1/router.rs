use super::error::*;
use super::handler;
use crate::application_port::TokenCodec;
use crate::domain_model::{AccessToken, MemberRole, Principal};
use crate::domain_port::TokenBlacklist;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_flag(server.local_signup_enabled))
        .and(with(server.auth_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let reissue = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("reissue"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::reissue);

    let logout = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_lenient_principal(server.token_codec.clone()))
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let my_profile = warp::get()
        .and(warp::path("members"))
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_principal(
            server.token_codec.clone(),
            server.token_blacklist.clone(),
        ))
        .and(with(server.member_service.clone()))
        .and_then(handler::my_profile);

    let withdraw = warp::delete()
        .and(warp::path("members"))
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_principal(
            server.token_codec.clone(),
            server.token_blacklist.clone(),
        ))
        .and(with(server.member_service.clone()))
        .and_then(handler::withdraw);

    let suspend = warp::post()
        .and(warp::path("admin"))
        .and(warp::path("members"))
        .and(warp::path::param::<i64>())
        .and(warp::path("suspend"))
        .and(warp::path::end())
        .and(with_admin(
            server.token_codec.clone(),
            server.token_blacklist.clone(),
        ))
        .and(with(server.member_service.clone()))
        .and_then(handler::suspend);

    signup
        .or(login)
        .or(reissue)
        .or(logout)
        .or(my_profile)
        .or(withdraw)
        .or(suspend)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_flag(enabled: bool) -> impl Filter<Extract = (bool,), Error = Infallible> + Clone {
    warp::any().map(move || enabled)
}

fn bearer_token(header: &str) -> Result<AccessToken, Rejection> {
    header
        .strip_prefix("Bearer ")
        .map(|t| AccessToken(t.to_string()))
        .ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))
}

/// The inbound gate. Routes composed with this filter require a live bearer
/// token: signature and expiry are checked by the codec, then the jti is
/// checked against the blacklist. Routes without it stay anonymous.
fn with_principal(
    codec: Arc<dyn TokenCodec>,
    blacklist: Arc<dyn TokenBlacklist>,
) -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        move |header: Option<String>| {
            let codec = codec.clone();
            let blacklist = blacklist.clone();
            async move {
                let header = header.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
                let token = bearer_token(&header)?;
                let claims = codec
                    .verify(&token)
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                if blacklist
                    .is_blacklisted(&claims.jti)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?
                {
                    return Err(reject::custom(ApiErrorCode::BlacklistedToken));
                }
                Principal::from_claims(&claims)
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)
            }
        },
    )
}

fn with_admin(
    codec: Arc<dyn TokenCodec>,
    blacklist: Arc<dyn TokenBlacklist>,
) -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    with_principal(codec, blacklist).and_then(|principal: Principal| async move {
        if principal.role == MemberRole::Admin {
            Ok(principal)
        } else {
            Err(reject::custom(ApiErrorCode::Forbidden))
        }
    })
}

/// Logout-only variant: expiry is not checked, so a client whose access
/// token already lapsed can still end its session. The blacklist is not
/// consulted either; repeating a logout is harmless.
fn with_lenient_principal(
    codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (AccessToken, Principal), Error = Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_ref())
        .and_then(move |header: Option<String>| {
            let codec = codec.clone();
            async move {
                let header = header.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
                let token = bearer_token(&header)?;
                let claims = codec
                    .verify_ignoring_expiry(&token)
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                let principal = Principal::from_claims(&claims)
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok::<_, Rejection>((token, principal))
            }
        })
        .untuple_one()
}
