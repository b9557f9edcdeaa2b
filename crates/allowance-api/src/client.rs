//! Typed backend operations.
//!
//! Login and registration go straight to the transport: a 401 there means
//! bad credentials, not an expired session. Everything else goes through the
//! [`AuthenticatedRequestGateway`].

use crate::config::ClientConfig;
use crate::endpoints::Endpoints;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthResponse, Child, CompleteItemRequest, CreateChildRequest, CreateItemRequest,
    CreateShoppingListRequest, DeductBalanceRequest, DeductPointsRequest, ListType, LoginRequest,
    MeProfile, RefreshTokenRequest, RegisterParentRequest, ShoppingList, ShoppingListItem,
    UpdateAllowanceRequest, UpdateItemRequest, UpdateProfileRequest, UpdateTitleRequest,
    VerifyItemRequest, VerifyItemResponse,
};
use crate::refresher::BackendTokenRefresher;
use crate::response::{classify, summarize_body, ResponseBody};
use crate::session::Session;
use crate::validation;
use auth_gateway::{
    ApiRequest, AuthPath, AuthenticatedRequestGateway, GatewayConfig, HttpTransport,
    ReqwestTransport, TokenStore, TransportConfig,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which of the signed-in child's lists to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBucket {
    /// Lists still being edited.
    Active,
    /// Lists submitted and awaiting a parent's decision.
    Pending,
    /// Approved and rejected lists.
    History,
}

impl ListBucket {
    fn as_segment(self) -> &'static str {
        match self {
            ListBucket::Active => "active",
            ListBucket::Pending => "pending",
            ListBucket::History => "history",
        }
    }
}

/// Client for the allowance backend.
pub struct AllowanceClient {
    gateway: AuthenticatedRequestGateway,
    transport: Arc<dyn HttpTransport>,
    session: Arc<Session>,
    endpoints: Endpoints,
}

impl AllowanceClient {
    /// Build a client with a reqwest transport from `config`.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> ApiResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(TransportConfig {
            timeout_secs: config.request_timeout_secs,
            ..Default::default()
        })?;
        let endpoints = Endpoints::new(&config.api_base_url)?;
        let gateway_config = GatewayConfig::default().with_refresh_timeout(config.refresh_timeout());
        Ok(Self::with_transport(
            Arc::new(transport),
            endpoints,
            session,
            gateway_config,
        ))
    }

    /// Build a client over any transport.
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        endpoints: Endpoints,
        session: Arc<Session>,
        gateway_config: GatewayConfig,
    ) -> Self {
        let refresher = Arc::new(BackendTokenRefresher::new(transport.clone(), endpoints.clone()));
        let gateway = AuthenticatedRequestGateway::new(
            transport.clone(),
            session.clone(),
            refresher,
            session.clone(),
            gateway_config,
        );
        Self {
            gateway,
            transport,
            session,
            endpoints,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn gateway(&self) -> &AuthenticatedRequestGateway {
        &self.gateway
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a parent account and sign in as it.
    pub async fn register_parent(&self, request: RegisterParentRequest) -> ApiResult<AuthResponse> {
        validation::email(&request.email)?;
        validation::password(&request.password)?;
        validation::non_empty("first name", &request.first_name)?;
        validation::non_empty("last name", &request.last_name)?;

        let http = ApiRequest::post(self.endpoints.register_parent()).with_json_body(to_json(&request)?);
        let auth: AuthResponse = decode(self.execute_public(&http, Some("Registration failed")).await?)?;
        self.session.sign_in(&auth);
        Ok(auth)
    }

    /// Sign in as a parent.
    pub async fn login_parent(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.login(self.endpoints.login(), email, password).await
    }

    /// Sign in as a child.
    pub async fn login_child(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.login(self.endpoints.login_child(), email, password).await
    }

    async fn login(&self, url: String, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let request = LoginRequest {
            email: validation::email(email)?.to_string(),
            password: validation::password(password)?.to_string(),
        };
        let http = ApiRequest::post(url).with_json_body(to_json(&request)?);
        let auth: AuthResponse = decode(self.execute_public(&http, Some("Login failed")).await?)?;
        self.session.sign_in(&auth);
        Ok(auth)
    }

    /// Revoke the refresh token on the backend and sign out locally.
    ///
    /// The revoke route is anonymous, so it goes straight to the transport
    /// without a bearer token or refresh. The local sign-out happens even if
    /// the backend call fails.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Some(refresh_token) = self.session.refresh_token() {
            let body = to_json(&RefreshTokenRequest { refresh_token })?;
            let http = ApiRequest::post(self.endpoints.logout()).with_json_body(body);
            match self.transport.send(http).await {
                Ok(response) if response.is_success() => debug!("Refresh token revoked"),
                Ok(response) => warn!(
                    status = response.status.as_u16(),
                    "Backend logout failed, signing out locally"
                ),
                Err(e) => warn!(error = %e, "Backend logout failed, signing out locally"),
            }
        }
        self.session.sign_out();
        Ok(())
    }

    // =========================================================================
    // Children (parent)
    // =========================================================================

    pub async fn create_child(&self, request: CreateChildRequest) -> ApiResult<Child> {
        validation::email(&request.email)?;
        validation::password(&request.password)?;
        validation::non_empty("first name", &request.first_name)?;
        validation::non_empty("last name", &request.last_name)?;
        validation::allowance(request.monthly_allowance)?;

        let http = ApiRequest::post(self.endpoints.children()).with_json_body(to_json(&request)?);
        decode(self.execute(&http, Some("Could not create child")).await?)
    }

    pub async fn list_children(&self) -> ApiResult<Vec<Child>> {
        let http = ApiRequest::get(self.endpoints.children());
        decode_list(self.execute(&http, None).await?)
    }

    pub async fn get_child(&self, child_id: &str) -> ApiResult<Child> {
        let child_id = validation::non_empty("child id", child_id)?;
        let http = ApiRequest::get(self.endpoints.child(child_id));
        decode(self.execute(&http, None).await?)
    }

    pub async fn update_child_allowance(&self, child_id: &str, monthly_allowance: f64) -> ApiResult<Child> {
        let child_id = validation::non_empty("child id", child_id)?;
        let body = UpdateAllowanceRequest {
            monthly_allowance: validation::allowance(monthly_allowance)?,
        };
        let http = ApiRequest::put(self.endpoints.child_allowance(child_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not update allowance")).await?)
    }

    pub async fn deduct_child_balance(&self, child_id: &str, amount: f64) -> ApiResult<Child> {
        let child_id = validation::non_empty("child id", child_id)?;
        let body = DeductBalanceRequest {
            amount: validation::amount(amount)?,
        };
        let http =
            ApiRequest::post(self.endpoints.child_deduct_balance(child_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not deduct balance")).await?)
    }

    pub async fn deduct_child_points(&self, child_id: &str, points: i32) -> ApiResult<Child> {
        let child_id = validation::non_empty("child id", child_id)?;
        let body = DeductPointsRequest {
            points: validation::points(points)?,
        };
        let http =
            ApiRequest::post(self.endpoints.child_deduct_points(child_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not deduct points")).await?)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub async fn get_profile(&self) -> ApiResult<MeProfile> {
        let http = ApiRequest::get(self.endpoints.me());
        decode(self.execute(&http, None).await?)
    }

    pub async fn update_profile(&self, request: UpdateProfileRequest) -> ApiResult<MeProfile> {
        if request.is_empty() {
            return Err(ApiError::Validation("nothing to update".into()));
        }
        if let Some(email) = &request.email {
            validation::email(email)?;
        }
        let http = ApiRequest::put(self.endpoints.me()).with_json_body(to_json(&request)?);
        decode(self.execute(&http, Some("Could not update profile")).await?)
    }

    // =========================================================================
    // Shopping lists (child)
    // =========================================================================

    pub async fn create_shopping_list(&self, title: &str, list_type: ListType) -> ApiResult<ShoppingList> {
        let body = CreateShoppingListRequest {
            title: validation::non_empty("title", title)?.to_string(),
            list_type,
        };
        let http = ApiRequest::post(self.endpoints.shopping_lists()).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not create list")).await?)
    }

    pub async fn my_lists(&self, bucket: ListBucket) -> ApiResult<Vec<ShoppingList>> {
        let http = ApiRequest::get(self.endpoints.my_lists(bucket.as_segment()));
        decode_list(self.execute(&http, None).await?)
    }

    pub async fn update_list_title(&self, list_id: &str, title: &str) -> ApiResult<ShoppingList> {
        let list_id = validation::non_empty("list id", list_id)?;
        let body = UpdateTitleRequest {
            title: validation::non_empty("title", title)?.to_string(),
        };
        let http = ApiRequest::put(self.endpoints.list_title(list_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not rename list")).await?)
    }

    pub async fn submit_list(&self, list_id: &str) -> ApiResult<ShoppingList> {
        let list_id = validation::non_empty("list id", list_id)?;
        let http = ApiRequest::post(self.endpoints.list_submit(list_id));
        decode(self.execute(&http, Some("Could not submit list")).await?)
    }

    pub async fn delete_list(&self, list_id: &str) -> ApiResult<()> {
        let list_id = validation::non_empty("list id", list_id)?;
        let http = ApiRequest::delete(self.endpoints.shopping_list(list_id));
        self.execute(&http, Some("Could not delete list")).await?;
        Ok(())
    }

    pub async fn add_item(&self, list_id: &str, name: &str) -> ApiResult<ShoppingListItem> {
        let list_id = validation::non_empty("list id", list_id)?;
        let body = CreateItemRequest {
            name: validation::non_empty("item name", name)?.to_string(),
        };
        let http = ApiRequest::post(self.endpoints.list_items(list_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not add item")).await?)
    }

    pub async fn update_item(
        &self,
        list_id: &str,
        item_id: &str,
        name: &str,
        price: Option<f64>,
    ) -> ApiResult<ShoppingListItem> {
        let list_id = validation::non_empty("list id", list_id)?;
        let item_id = validation::non_empty("item id", item_id)?;
        let body = UpdateItemRequest {
            name: validation::non_empty("item name", name)?.to_string(),
            price: price.map(validation::price).transpose()?,
        };
        let http = ApiRequest::put(self.endpoints.list_item(list_id, item_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not update item")).await?)
    }

    pub async fn delete_item(&self, list_id: &str, item_id: &str) -> ApiResult<()> {
        let list_id = validation::non_empty("list id", list_id)?;
        let item_id = validation::non_empty("item id", item_id)?;
        let http = ApiRequest::delete(self.endpoints.list_item(list_id, item_id));
        self.execute(&http, Some("Could not delete item")).await?;
        Ok(())
    }

    /// Mark an item bought at `price`.
    pub async fn complete_item(&self, list_id: &str, item_id: &str, price: f64) -> ApiResult<ShoppingList> {
        let list_id = validation::non_empty("list id", list_id)?;
        let item_id = validation::non_empty("item id", item_id)?;
        let body = CompleteItemRequest {
            price: validation::price(price)?,
        };
        let http =
            ApiRequest::post(self.endpoints.item_complete(list_id, item_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not complete item")).await?)
    }

    /// Check a photographed price tag against an item.
    pub async fn verify_item(
        &self,
        list_id: &str,
        item_id: &str,
        image_base64: &str,
    ) -> ApiResult<VerifyItemResponse> {
        let list_id = validation::non_empty("list id", list_id)?;
        let item_id = validation::non_empty("item id", item_id)?;
        let body = VerifyItemRequest {
            image_base64: validation::image_base64(image_base64)?.to_string(),
        };
        let http =
            ApiRequest::post(self.endpoints.item_verify(list_id, item_id)).with_json_body(to_json(&body)?);
        decode(self.execute(&http, Some("Could not verify item")).await?)
    }

    // =========================================================================
    // Shopping lists (parent)
    // =========================================================================

    pub async fn child_active_lists(&self, child_id: &str) -> ApiResult<Vec<ShoppingList>> {
        let child_id = validation::non_empty("child id", child_id)?;
        let http = ApiRequest::get(self.endpoints.child_lists(child_id, "active"));
        decode_list(self.execute(&http, None).await?)
    }

    pub async fn child_pending_lists(&self, child_id: &str) -> ApiResult<Vec<ShoppingList>> {
        let child_id = validation::non_empty("child id", child_id)?;
        let http = ApiRequest::get(self.endpoints.child_lists(child_id, "pending"));
        decode_list(self.execute(&http, None).await?)
    }

    pub async fn approve_list(&self, list_id: &str) -> ApiResult<ShoppingList> {
        let list_id = validation::non_empty("list id", list_id)?;
        let http = ApiRequest::put(self.endpoints.list_approve(list_id));
        decode(self.execute(&http, Some("Could not approve list")).await?)
    }

    pub async fn reject_list(&self, list_id: &str) -> ApiResult<ShoppingList> {
        let list_id = validation::non_empty("list id", list_id)?;
        let http = ApiRequest::put(self.endpoints.list_reject(list_id));
        decode(self.execute(&http, Some("Could not reject list")).await?)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Send through the gateway and map the outcome to the error taxonomy.
    async fn execute(&self, request: &ApiRequest, fallback: Option<&str>) -> ApiResult<ResponseBody> {
        let result = self.gateway.send(request).await?;
        match result.auth {
            AuthPath::RefreshUnavailable => {
                info!(url = %request.url, "Session expired");
                Err(ApiError::AuthExpired)
            }
            AuthPath::RetriedAfterRefresh if result.response.is_unauthorized() => {
                warn!(url = %request.url, "Unauthorized even after refresh");
                Err(ApiError::RetryExhausted)
            }
            _ => classify_logged(request, &result.response, fallback),
        }
    }

    /// Send without authentication or refresh.
    async fn execute_public(&self, request: &ApiRequest, fallback: Option<&str>) -> ApiResult<ResponseBody> {
        let response = self.transport.send(request.clone()).await?;
        classify_logged(request, &response, fallback)
    }
}

fn classify_logged(
    request: &ApiRequest,
    response: &auth_gateway::ApiResponse,
    fallback: Option<&str>,
) -> ApiResult<ResponseBody> {
    classify(response, fallback).map_err(|failure| {
        warn!(
            method = %request.method,
            url = %request.url,
            status = failure.status,
            body_summary = %summarize_body(&failure.raw_body),
            "Request failed"
        );
        ApiError::Operation(failure)
    })
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string(value).map_err(ApiError::from)
}

fn decode<T: DeserializeOwned>(body: ResponseBody) -> ApiResult<T> {
    match body {
        ResponseBody::Json(value) => {
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
        }
        ResponseBody::Empty => Err(ApiError::Decode("expected a JSON body, got none".into())),
        ResponseBody::Text(text) => Err(ApiError::Decode(format!(
            "expected a JSON body, got text ({})",
            summarize_body(&text)
        ))),
    }
}

/// Like [`decode`], but an empty body is an empty list.
fn decode_list<T: DeserializeOwned>(body: ResponseBody) -> ApiResult<Vec<T>> {
    match body {
        ResponseBody::Empty => Ok(Vec::new()),
        body => decode(body),
    }
}
