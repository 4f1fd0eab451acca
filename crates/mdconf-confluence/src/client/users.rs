//! User lookups for Confluence API.

use tracing::{debug, info};

use super::{ConfluenceClient, encode_query};
use crate::error::ConfluenceError;
use crate::types::User;

impl ConfluenceClient {
    /// Look up a user by account ID, `None` when Confluence does not know it.
    pub fn get_user(&self, account_id: &str) -> Result<Option<User>, ConfluenceError> {
        let url = format!(
            "{}/user?accountId={}",
            self.api_url(),
            encode_query(account_id)
        );

        debug!("Looking up Confluence user {}", account_id);
        match self.get_json::<User>(&url) {
            Ok(user) if user.is_known() => Ok(Some(user)),
            Ok(_) | Err(ConfluenceError::HttpResponse { status: 404, .. }) => {
                info!("No Confluence user for {}", account_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Profile of the authenticated user.
    ///
    /// Used to check credentials before a run.
    pub fn current_user(&self) -> Result<User, ConfluenceError> {
        let url = format!("{}/user/current", self.api_url());
        let user: User = self.get_json(&url)?;
        if !user.is_known() {
            return Err(ConfluenceError::UnexpectedResponse(
                "current user is anonymous".to_owned(),
            ));
        }
        Ok(user)
    }
}
