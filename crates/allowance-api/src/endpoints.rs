//! Backend routes.

use crate::error::{ApiError, ApiResult};
use url::Url;

/// URL builder for backend routes under `<base>/api`.
///
/// Path parameters are percent-encoded.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_root: Url,
}

impl Endpoints {
    /// Build from the backend origin, e.g. `http://localhost:5125`.
    ///
    /// A base that already ends in `/api` is used as is.
    pub fn new(api_base_url: &str) -> ApiResult<Self> {
        let mut api_root = Url::parse(api_base_url.trim())?;
        if api_root.cannot_be_a_base() || !matches!(api_root.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "API base URL must be an http(s) URL: {}",
                api_base_url
            )));
        }

        let has_api_suffix = api_root
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .is_some_and(|last| last.eq_ignore_ascii_case("api"));
        if let Ok(mut path) = api_root.path_segments_mut() {
            path.pop_if_empty();
            if !has_api_suffix {
                path.push("api");
            }
        }
        Ok(Self { api_root })
    }

    pub fn api_root(&self) -> &str {
        self.api_root.as_str()
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    // Auth

    pub fn register_parent(&self) -> String {
        self.url(&["Auth", "register-parent"])
    }

    pub fn login(&self) -> String {
        self.url(&["Auth", "login"])
    }

    pub fn login_child(&self) -> String {
        self.url(&["Auth", "login-child"])
    }

    pub fn refresh(&self) -> String {
        self.url(&["Auth", "refresh"])
    }

    pub fn logout(&self) -> String {
        self.url(&["Auth", "logout"])
    }

    // Children

    pub fn children(&self) -> String {
        self.url(&["Children"])
    }

    pub fn child(&self, child_id: &str) -> String {
        self.url(&["Children", child_id])
    }

    pub fn child_allowance(&self, child_id: &str) -> String {
        self.url(&["Children", child_id, "allowance"])
    }

    pub fn child_deduct_balance(&self, child_id: &str) -> String {
        self.url(&["Children", child_id, "deduct-balance"])
    }

    pub fn child_deduct_points(&self, child_id: &str) -> String {
        self.url(&["Children", child_id, "deduct-points"])
    }

    // Profile

    pub fn me(&self) -> String {
        self.url(&["Me"])
    }

    // Shopping lists

    pub fn shopping_lists(&self) -> String {
        self.url(&["ShoppingLists"])
    }

    pub fn shopping_list(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id])
    }

    pub fn list_title(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "title"])
    }

    pub fn list_submit(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "submit"])
    }

    pub fn list_approve(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "approve"])
    }

    pub fn list_reject(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "reject"])
    }

    pub fn list_items(&self, list_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "items"])
    }

    pub fn list_item(&self, list_id: &str, item_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "items", item_id])
    }

    pub fn item_complete(&self, list_id: &str, item_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "items", item_id, "complete"])
    }

    pub fn item_verify(&self, list_id: &str, item_id: &str) -> String {
        self.url(&["ShoppingLists", list_id, "items", item_id, "verify"])
    }

    /// The signed-in child's lists by bucket: `active`, `pending` or `history`.
    pub fn my_lists(&self, bucket: &str) -> String {
        self.url(&["ShoppingLists", bucket])
    }

    /// A child's lists as seen by the parent: `active` or `pending`.
    pub fn child_lists(&self, child_id: &str, bucket: &str) -> String {
        self.url(&["children", child_id, "shopping-lists", bucket])
    }
}
