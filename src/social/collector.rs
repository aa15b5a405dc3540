//! Collecting a postcard by scanning its QR code.
//!
//! A scan only records the code. The postcard is built and saved once the
//! next location fix arrives, stamped with that fix and the current time.

use std::sync::Arc;

use chrono::Utc;

use crate::core::constants::{DEFAULT_POSTCARD_IMAGE_URL, SCANNED_LOCATION_LABEL};
use crate::core::geo::LatLng;
use crate::social::records::Postcard;
use crate::social::service::UserService;
use crate::traits::SessionProvider;
use crate::{PostmapError, Result};

pub const SAVED_MESSAGE: &str = "Postcard saved successfully!";

pub struct PostcardCollector {
    session: Arc<dyn SessionProvider>,
    users: UserService,
    scanned_code: Option<String>,
    alert: Option<String>,
}

impl PostcardCollector {
    pub fn new(session: Arc<dyn SessionProvider>, users: UserService) -> Self {
        Self {
            session,
            users,
            scanned_code: None,
            alert: None,
        }
    }

    /// Remembers the code; the caller then requests a single fix
    pub fn handle_scanned_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        log::debug!("Scanned code {:?}", code);
        self.scanned_code = Some(code);
    }

    pub fn scanned_code(&self) -> Option<&str> {
        self.scanned_code.as_deref()
    }

    /// Alert to show after the last attempt
    pub fn alert_message(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Builds the postcard for `fix` and saves it for the signed-in user.
    /// Returns the stored postcard id.
    pub async fn handle_fix(&mut self, fix: LatLng) -> Result<String> {
        let result = self.save_at(fix).await;
        self.alert = Some(match &result {
            Ok(_) => SAVED_MESSAGE.to_string(),
            Err(PostmapError::NotLoggedIn) => PostmapError::NotLoggedIn.user_message(),
            Err(e) => format!("Failed to save postcard: {}", e),
        });
        result
    }

    /// The one-shot fix request failed
    pub fn handle_location_failure(&mut self, reason: &str) -> PostmapError {
        log::warn!("Location manager failed with error: {}", reason);
        let error = PostmapError::LocationUnavailable(reason.to_string());
        self.alert = Some(error.user_message());
        error
    }

    async fn save_at(&self, fix: LatLng) -> Result<String> {
        if !fix.is_valid() {
            return Err(PostmapError::InvalidCoordinates(format!("{:?}", fix)));
        }

        let postcard = Postcard::new(
            self.scanned_code
                .clone()
                .unwrap_or_else(|| DEFAULT_POSTCARD_IMAGE_URL.to_string()),
            SCANNED_LOCATION_LABEL,
            Utc::now(),
            fix,
        );

        let user_id = self
            .session
            .current_user_id()
            .ok_or(PostmapError::NotLoggedIn)?;

        self.users.save_postcard(&user_id, postcard).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::session::StaticSession;
    use crate::social::store::MemoryStore;
    use futures::executor::block_on;

    fn collector(session: StaticSession) -> (PostcardCollector, UserService) {
        let users = UserService::new(Arc::new(MemoryStore::new()));
        (PostcardCollector::new(Arc::new(session), users.clone()), users)
    }

    #[test]
    fn test_scan_then_fix_saves_postcard() {
        let (mut collector, users) = collector(StaticSession::signed_in("u1"));
        collector.handle_scanned_code("https://cards.example.com/42.jpg");

        let fix = LatLng::new(37.7749, -122.4194);
        let id = block_on(collector.handle_fix(fix)).unwrap();
        assert_eq!(collector.alert_message(), Some("Postcard saved successfully!"));

        let saved = block_on(users.store().postcards("u1")).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id.as_deref(), Some(id.as_str()));
        assert_eq!(saved[0].image_url, "https://cards.example.com/42.jpg");
        assert_eq!(saved[0].location, "Current Location");
        assert_eq!(saved[0].coordinate, fix);
    }

    #[test]
    fn test_missing_code_uses_default_image() {
        let (mut collector, users) = collector(StaticSession::signed_in("u1"));
        block_on(collector.handle_fix(LatLng::new(0.0, 0.0))).unwrap();

        let saved = block_on(users.store().postcards("u1")).unwrap();
        assert_eq!(saved[0].image_url, "https://example.com/default.jpg");
    }

    #[test]
    fn test_not_logged_in() {
        let (mut collector, users) = collector(StaticSession::signed_out());
        collector.handle_scanned_code("code");

        let err = block_on(collector.handle_fix(LatLng::new(1.0, 1.0))).unwrap_err();
        assert!(matches!(err, PostmapError::NotLoggedIn));
        assert_eq!(collector.alert_message(), Some("User not logged in"));
        assert!(block_on(users.store().postcards("u1")).unwrap().is_empty());
    }

    #[test]
    fn test_location_failure_sets_alert() {
        let (mut collector, _) = collector(StaticSession::signed_in("u1"));
        let err = collector.handle_location_failure("timeout");

        assert!(matches!(err, PostmapError::LocationUnavailable(_)));
        assert_eq!(collector.alert_message(), Some("Failed to get location: timeout"));

        collector.dismiss_alert();
        assert_eq!(collector.alert_message(), None);
    }

    #[test]
    fn test_invalid_fix_is_reported() {
        let (mut collector, _) = collector(StaticSession::signed_in("u1"));
        let err = block_on(collector.handle_fix(LatLng::new(200.0, 0.0))).unwrap_err();
        assert!(matches!(err, PostmapError::InvalidCoordinates(_)));
        assert!(collector
            .alert_message()
            .unwrap()
            .starts_with("Failed to save postcard: Invalid coordinates"));
    }
}
