use super::error::*;
use crate::application_port::{AuthService, LoginInput, MemberService, SignupInput};
use crate::domain_model::{AccessToken, DeviceId, MemberId, Principal, RefreshToken, TokenPair};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::reject;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub member_id: MemberId,
}

pub async fn signup(
    body: SignupRequest,
    enabled: bool,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !enabled {
        return Err(reject::custom(ApiErrorCode::Forbidden));
    }

    let member_id = auth_service
        .signup(SignupInput {
            email: body.email,
            password: body.password,
            nickname: body.nickname,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SignupResponse {
        member_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_id: Option<String>,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair = auth_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
            device_id: DeviceId::resolve(body.device_id),
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(pair)))
}

#[derive(Debug, Deserialize)]
pub struct ReissueRequest {
    pub refresh_token: String,
    pub member_id: i64,
    pub device_id: Option<String>,
}

pub async fn reissue(
    body: ReissueRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair: TokenPair = auth_service
        .reissue(
            &RefreshToken(body.refresh_token),
            MemberId(body.member_id),
            &DeviceId::resolve(body.device_id),
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(pair)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    access_token: AccessToken,
    principal: Principal,
    body: LogoutRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(
            &access_token,
            principal.member_id,
            &DeviceId::resolve(body.device_id),
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

pub async fn my_profile(
    principal: Principal,
    member_service: Arc<dyn MemberService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = member_service
        .profile(principal.member_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse;

pub async fn withdraw(
    principal: Principal,
    member_service: Arc<dyn MemberService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    member_service
        .withdraw(principal.member_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(WithdrawResponse)))
}

#[derive(Debug, Serialize)]
pub struct SuspendResponse;

pub async fn suspend(
    member_id: i64,
    _admin: Principal,
    member_service: Arc<dyn MemberService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    member_service
        .suspend(MemberId(member_id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(SuspendResponse)))
}
